//! String policies: regex synthesis, pattern violation and length fitting

use apistub_core::{Constraints, Mode, StubError};
use rand::Rng;
use rand_regex::Regex as RandRegex;
use regex::Regex;
use tracing::warn;

use crate::entropy::EntropySource;

pub const CREDIT_CARD: &str =
    r"^(?:4[0-9]{12}(?:[0-9]{3})?|5[1-5][0-9]{14}|3[47][0-9]{13}|6(?:011|5[0-9]{2})[0-9]{12})$";
pub const HEXCOLOR: &str = r"^#?([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$";
pub const RGBCOLOR: &str = r"^rgb\((0|[1-9][0-9]?|1[0-9]{2}|2[0-4][0-9]|25[0-5]),(0|[1-9][0-9]?|1[0-9]{2}|2[0-4][0-9]|25[0-5]),(0|[1-9][0-9]?|1[0-9]{2}|2[0-4][0-9]|25[0-5])\)$";
pub const SSN: &str = r"^[0-9]{3}-[0-9]{2}-[0-9]{4}$";
pub const ISBN10: &str = r"^(?:[0-9]{9}X|[0-9]{10})$";
pub const ISBN13: &str = r"^(?:97[89][0-9]{10})$";
pub const UUID: &str = r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";
pub const UUID3: &str = r"^[0-9a-f]{8}-[0-9a-f]{4}-3[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$";
pub const UUID4: &str = r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$";
pub const UUID5: &str = r"^[0-9a-f]{8}-[0-9a-f]{4}-5[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$";

fn compile_check(pattern: &str) -> Result<Regex, StubError> {
    Regex::new(pattern).map_err(|e| StubError::PatternCompilation {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

// The sampler rejects anchors: strip an outer `^`/`\A` and `$`/`\z`.
fn strip_anchors(pattern: &str) -> &str {
    let p = pattern
        .strip_prefix('^')
        .or_else(|| pattern.strip_prefix(r"\A"))
        .unwrap_or(pattern);
    for suffix in ["$", r"\z"] {
        if let Some(body) = p.strip_suffix(suffix) {
            let escapes = body.chars().rev().take_while(|&c| c == '\\').count();
            if escapes % 2 == 0 {
                return body;
            }
        }
    }
    p
}

/// Compiled pattern able to both sample and match strings.
pub struct PatternSampler {
    matcher: Regex,
    sampler: RandRegex,
}

impl PatternSampler {
    /// # Errors
    ///
    /// [`StubError::PatternCompilation`] if either the matcher or the sampler
    /// rejects the pattern (the sampler refuses e.g. look-around).
    pub fn new(pattern: &str, max_repeat: u32) -> Result<Self, StubError> {
        let matcher = compile_check(pattern)?;
        let sampler = RandRegex::compile(strip_anchors(pattern), max_repeat).map_err(|e| {
            StubError::PatternCompilation {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self { matcher, sampler })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        rng.sample(&self.sampler)
    }

    #[must_use]
    pub fn is_match(&self, s: &str) -> bool {
        self.matcher.is_match(s)
    }
}

/// Sample `pattern`, preferring draws whose length already fits the
/// declared bounds.
///
/// # Errors
///
/// [`StubError::PatternCompilation`] for a pattern that cannot be compiled.
pub fn from_pattern(
    pattern: &str,
    constraints: &Constraints,
    entropy: &mut EntropySource,
    max_repeat: u32,
    retry_limit: u32,
) -> Result<String, StubError> {
    if pattern.is_empty() {
        return Ok(String::new());
    }
    let sampler = PatternSampler::new(pattern, max_repeat)?;
    let mut last = String::new();
    for _ in 0..retry_limit.clamp(1, 64) {
        last = sampler.sample(entropy.rng());
        if fits_length(&last, constraints) {
            break;
        }
    }
    Ok(last)
}

/// First candidate the declared pattern rejects.
///
/// Tries `first`, then random alphanumeric strings of growing length,
/// then strings of punctuation.
///
/// # Errors
///
/// [`StubError::ImpossibleInvalid`] when no pattern is declared or every
/// candidate matches.
pub fn violate_pattern(
    pattern: Option<&str>,
    first: String,
    entropy: &mut EntropySource,
    retry_limit: u32,
) -> Result<String, StubError> {
    let Some(pattern) = pattern.filter(|p| !p.is_empty()) else {
        return Err(StubError::ImpossibleInvalid(
            "pattern is not declared".to_string(),
        ));
    };
    let matcher = compile_check(pattern)?;
    if !matcher.is_match(&first) {
        return Ok(first);
    }
    for attempt in 0..retry_limit {
        let len = 1 + (attempt as usize % 16);
        let candidate = if attempt % 2 == 0 {
            entropy.alphanumeric(len)
        } else {
            "!@ #".repeat(len)
        };
        if !matcher.is_match(&candidate) {
            return Ok(candidate);
        }
    }
    if !matcher.is_match("") {
        return Ok(String::new());
    }
    warn!(pattern, "every candidate matched the pattern");
    Err(StubError::ImpossibleInvalid(format!(
        "pattern {pattern:?} accepts every candidate"
    )))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn fits_length(s: &str, c: &Constraints) -> bool {
    let len = char_len(s);
    c.min_length.is_none_or(|min| len >= min) && c.max_length.is_none_or(|max| len <= max)
}

fn truncate_chars(s: &mut String, len: usize) {
    if let Some((idx, _)) = s.char_indices().nth(len) {
        s.truncate(idx);
    }
}

fn pad(s: &mut String, len: usize, entropy: &mut EntropySource) {
    let missing = len.saturating_sub(char_len(s));
    s.push_str(&entropy.alphanumeric(missing));
}

/// Fit `s` into the declared length bounds, or push it outside them for
/// the length invalidity flags.
///
/// # Errors
///
/// [`StubError::ImpossibleInvalid`] when the targeted bound is undeclared
/// or (for the minimum) zero.
pub fn fit_length(
    mut s: String,
    constraints: &Constraints,
    mode: Mode,
    entropy: &mut EntropySource,
) -> Result<String, StubError> {
    if mode.has(Mode::INVALID_MAX_LENGTH) {
        let max = constraints.max_length.ok_or_else(|| {
            StubError::ImpossibleInvalid("maxLength is not declared".to_string())
        })?;
        let target = max + 1 + entropy.index(5);
        if char_len(&s) <= max {
            pad(&mut s, target, entropy);
        }
        return Ok(s);
    }
    if mode.has(Mode::INVALID_MIN_LENGTH) {
        let min = constraints
            .min_length
            .filter(|&m| m > 0)
            .ok_or_else(|| StubError::ImpossibleInvalid("minLength is not declared".to_string()))?;
        let target = entropy.index(min);
        if char_len(&s) >= min {
            truncate_chars(&mut s, target);
        }
        return Ok(s);
    }
    if let Some(min) = constraints.min_length {
        pad(&mut s, min, entropy);
    }
    if let Some(max) = constraints.max_length {
        truncate_chars(&mut s, max);
    }
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entropy() -> EntropySource {
        EntropySource::from_seed(42)
    }

    fn lengths(min: Option<usize>, max: Option<usize>) -> Constraints {
        Constraints {
            min_length: min,
            max_length: max,
            ..Constraints::default()
        }
    }

    #[test]
    fn anchors_are_stripped() {
        assert_eq!(strip_anchors("^[a-z]+$"), "[a-z]+");
        assert_eq!(strip_anchors(r"\Aab\z"), "ab");
        assert_eq!(strip_anchors(r"^price\$"), r"price\$");
        assert_eq!(strip_anchors(r"a\\$"), r"a\\");
        assert_eq!(strip_anchors("plain"), "plain");
    }

    #[test]
    fn builtin_patterns_round_trip() {
        let mut e = entropy();
        for pattern in [CREDIT_CARD, HEXCOLOR, RGBCOLOR, SSN, ISBN10, ISBN13, UUID, UUID3, UUID4, UUID5] {
            let sampler = PatternSampler::new(pattern, 32).unwrap();
            for _ in 0..20 {
                let s = sampler.sample(e.rng());
                assert!(sampler.is_match(&s), "{s} does not match {pattern}");
            }
        }
    }

    #[test]
    fn pattern_sampling_prefers_fitting_lengths() {
        let c = lengths(Some(3), Some(4));
        let mut e = entropy();
        for _ in 0..20 {
            let s = from_pattern("^[a-z]{1,8}$", &c, &mut e, 32, 1000).unwrap();
            assert!(s.chars().all(|ch| ch.is_ascii_lowercase()));
        }
    }

    #[test]
    fn bad_pattern() {
        let err = from_pattern("([a-z", &Constraints::default(), &mut entropy(), 32, 10).unwrap_err();
        assert!(matches!(err, StubError::PatternCompilation { .. }));
    }

    #[test]
    fn empty_pattern_gives_empty_string() {
        let s = from_pattern("", &Constraints::default(), &mut entropy(), 32, 10).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn violate_pattern_keeps_non_matching_first() {
        let s = violate_pattern(Some("^[0-9]+$"), "abc".into(), &mut entropy(), 10).unwrap();
        assert_eq!(s, "abc");
    }

    #[test]
    fn violate_pattern_finds_a_miss() {
        let s = violate_pattern(Some("^[a-zA-Z0-9]*$"), "abc".into(), &mut entropy(), 10).unwrap();
        assert!(!Regex::new("^[a-zA-Z0-9]*$").unwrap().is_match(&s));
    }

    #[test]
    fn violate_pattern_impossible() {
        let err = violate_pattern(Some(".*"), "abc".into(), &mut entropy(), 10).unwrap_err();
        assert!(matches!(err, StubError::ImpossibleInvalid(_)));
        let err = violate_pattern(None, "abc".into(), &mut entropy(), 10).unwrap_err();
        assert!(matches!(err, StubError::ImpossibleInvalid(_)));
    }

    #[test]
    fn fit_pads_and_truncates() {
        let mut e = entropy();
        let s = fit_length("ab".into(), &lengths(Some(5), None), Mode::VALID, &mut e).unwrap();
        assert_eq!(s.chars().count(), 5);
        assert!(s.starts_with("ab"));
        let s = fit_length("héllo wörld".into(), &lengths(None, Some(4)), Mode::VALID, &mut e).unwrap();
        assert_eq!(s, "héll");
    }

    #[test]
    fn invalid_lengths() {
        let mut e = entropy();
        let s = fit_length("abc".into(), &lengths(None, Some(4)), Mode::INVALID_MAX_LENGTH, &mut e).unwrap();
        assert!(s.chars().count() > 4);
        let s = fit_length("abcdef".into(), &lengths(Some(3), None), Mode::INVALID_MIN_LENGTH, &mut e).unwrap();
        assert!(s.chars().count() < 3);
    }

    #[test]
    fn invalid_lengths_need_declarations() {
        let mut e = entropy();
        let err = fit_length("abc".into(), &Constraints::default(), Mode::INVALID_MAX_LENGTH, &mut e).unwrap_err();
        assert!(matches!(err, StubError::ImpossibleInvalid(_)));
        let err = fit_length("abc".into(), &lengths(Some(0), None), Mode::INVALID_MIN_LENGTH, &mut e).unwrap_err();
        assert!(matches!(err, StubError::ImpossibleInvalid(_)));
    }
}
