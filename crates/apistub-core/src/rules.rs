//! Generator name inference
//!
//! Each ruler looks at one piece of descriptor metadata and may decide a
//! generator key. Decisions are merged in registration order, later ones
//! overwriting earlier ones.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::aliases;
use crate::descriptor::FieldDescriptor;

/// Decision of a single ruler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub name: String,
}

/// Inference rule, built only when its triggering metadata is present.
#[derive(Debug, Clone, PartialEq)]
pub enum Ruler {
    /// Declared type
    Type(String),
    /// Declared format, resolved through the alias table
    Format(String),
    /// Any non-empty pattern selects the pattern generator
    Pattern(String),
    /// Alias containment scoring over title and description
    Fuzzy { title: String, description: String },
    /// Rules of the innermost element of a (possibly nested) collection
    Items(Vec<Ruler>),
}

impl Ruler {
    #[must_use]
    pub fn for_type(type_name: &str) -> Option<Self> {
        (!type_name.is_empty()).then(|| Self::Type(type_name.to_string()))
    }

    #[must_use]
    pub fn for_format(format: &str) -> Option<Self> {
        (!format.is_empty()).then(|| Self::Format(format.to_string()))
    }

    #[must_use]
    pub fn for_pattern(pattern: Option<&str>) -> Option<Self> {
        pattern
            .filter(|p| !p.is_empty())
            .map(|p| Self::Pattern(p.to_string()))
    }

    #[must_use]
    pub fn for_fuzzy(title: &str, description: &str) -> Option<Self> {
        if title.is_empty() && description.is_empty() {
            return None;
        }
        Some(Self::Fuzzy {
            title: title.to_string(),
            description: description.to_string(),
        })
    }

    /// Rules for the innermost leaf reachable through `items`.
    #[must_use]
    pub fn for_items(items: Option<&dyn FieldDescriptor>) -> Option<Self> {
        let mut leaf = items?;
        while let Some(next) = leaf.items() {
            leaf = next;
        }
        let rules: Vec<Self> = [
            Self::for_type(leaf.type_name()),
            Self::for_format(leaf.format()),
            Self::for_pattern(leaf.pattern()),
        ]
        .into_iter()
        .flatten()
        .collect();
        (!rules.is_empty()).then_some(Self::Items(rules))
    }

    #[must_use]
    pub fn decide(&self) -> Option<Decision> {
        let name = match self {
            Self::Type(type_name) => type_decision(type_name)?.to_string(),
            Self::Format(format) => aliases::lookup(format)?.to_string(),
            Self::Pattern(_) => "pattern".to_string(),
            Self::Fuzzy { title, description } => fuzzy_decision(title, description)?.to_string(),
            Self::Items(rules) => infer(rules)?,
        };
        Some(Decision { name })
    }
}

// Names are handed to the registry as-is; `float64` canonicalizes there.
fn type_decision(type_name: &str) -> Option<&'static str> {
    match type_name {
        "string" => Some("sentence"),
        "boolean" => Some("bool"),
        "integer" => Some("int64"),
        "number" => Some("float64"),
        _ => None,
    }
}

/// Score every canonical key by how many of its aliases occur in `text`.
fn score(text: &str) -> BTreeMap<&'static str, usize> {
    let mut scores = BTreeMap::new();
    if text.is_empty() {
        return scores;
    }
    let text = text.to_lowercase();
    for (alias, key) in aliases::entries() {
        if text.contains(alias) {
            *scores.entry(key).or_insert(0) += 1;
        }
    }
    scores
}

fn fuzzy_decision(title: &str, description: &str) -> Option<&'static str> {
    let mut total = score(title);
    for (key, points) in score(description) {
        *total.entry(key).or_insert(0) += points;
    }
    trace!(?total, "fuzzy scores");
    elect(&total)
}

// Strictly highest score wins; on a tie the lexicographically first key stays.
fn elect(scores: &BTreeMap<&'static str, usize>) -> Option<&'static str> {
    let mut best: Option<(&'static str, usize)> = None;
    for (&key, &points) in scores {
        if points == 0 {
            continue;
        }
        if best.is_none_or(|(_, top)| points > top) {
            best = Some((key, points));
        }
    }
    best.map(|(key, _)| key)
}

/// Merge decisions left to right; the last non-empty one wins.
#[must_use]
pub fn merge(decisions: impl IntoIterator<Item = Decision>) -> Option<String> {
    decisions
        .into_iter()
        .filter(|d| !d.name.is_empty())
        .last()
        .map(|d| d.name)
}

/// Run `rules` in order and merge their decisions.
#[must_use]
pub fn infer(rules: &[Ruler]) -> Option<String> {
    let decisions = rules.iter().filter_map(|rule| {
        let decision = rule.decide();
        debug!(?rule, ?decision, "ruler decision");
        decision
    });
    merge(decisions)
}
