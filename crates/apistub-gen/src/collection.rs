//! Array generation: item counts and uniqueness

use apistub_core::{Constraints, Mode, StubError};
use serde_json::Value;
use tracing::warn;

use crate::entropy::EntropySource;

const DEFAULT_MIN_ITEMS: usize = 1;
const DEFAULT_MAX_ITEMS: usize = 3;

/// Number of elements to produce.
///
/// # Errors
///
/// [`StubError::ImpossibleInvalid`] when the targeted bound is undeclared,
/// [`StubError::ImpossibleValid`] when `minItems > maxItems`.
pub fn item_count(c: &Constraints, mode: Mode, entropy: &mut EntropySource) -> Result<usize, StubError> {
    if mode.has(Mode::INVALID_MAX_ITEMS) {
        let max = c.max_items.ok_or_else(|| {
            StubError::ImpossibleInvalid("maxItems is not declared".to_string())
        })?;
        return Ok(max + 1 + entropy.index(3));
    }
    if mode.has(Mode::INVALID_MIN_ITEMS) {
        let min = c
            .min_items
            .filter(|&m| m > 0)
            .ok_or_else(|| StubError::ImpossibleInvalid("minItems is not declared".to_string()))?;
        return Ok(entropy.index(min));
    }
    let lo = match c.min_items {
        Some(min) => min,
        None => c.max_items.map_or(DEFAULT_MIN_ITEMS, |max| max.min(DEFAULT_MIN_ITEMS)),
    };
    let hi = c.max_items.unwrap_or(lo.max(DEFAULT_MAX_ITEMS));
    if lo > hi {
        return Err(StubError::ImpossibleValid(format!(
            "minItems {lo} exceeds maxItems {hi}"
        )));
    }
    Ok(if lo == hi { lo } else { entropy.uniform_int(lo, hi) })
}

/// Build an array, drawing each element from `element`.
///
/// # Errors
///
/// Propagates element failures; fails when uniqueness cannot be met
/// (valid mode) or violated (`INVALID_UNIQUE_ITEMS`).
pub fn build<F>(
    c: &Constraints,
    mode: Mode,
    entropy: &mut EntropySource,
    retry_limit: u32,
    mut element: F,
) -> Result<Vec<Value>, StubError>
where
    F: FnMut(&mut EntropySource) -> Result<Value, StubError>,
{
    if mode.has(Mode::INVALID_UNIQUE_ITEMS) {
        if !c.unique_items {
            return Err(StubError::ImpossibleInvalid(
                "uniqueItems is not declared".to_string(),
            ));
        }
        if c.max_items.is_some_and(|max| max < 2) {
            return Err(StubError::ImpossibleInvalid(
                "maxItems leaves no room for a duplicate".to_string(),
            ));
        }
        let count = item_count(c, Mode::VALID, entropy)?.max(2);
        let mut items = (0..count - 1)
            .map(|_| element(entropy))
            .collect::<Result<Vec<_>, _>>()?;
        let dup = items[entropy.index(items.len())].clone();
        items.push(dup);
        return Ok(items);
    }

    let count = item_count(c, mode, entropy)?;
    if !c.unique_items || mode.has(Mode::INVALID_MAX_ITEMS) {
        return (0..count).map(|_| element(entropy)).collect();
    }

    let mut items: Vec<Value> = Vec::with_capacity(count);
    let mut attempts = 0;
    while items.len() < count && attempts < retry_limit.max(count as u32) {
        attempts += 1;
        let v = element(entropy)?;
        if !items.contains(&v) {
            items.push(v);
        }
    }
    if items.len() < count {
        warn!(wanted = count, got = items.len(), "could not draw enough unique items");
        if c.min_items.is_some_and(|min| items.len() < min) {
            return Err(StubError::ImpossibleValid(format!(
                "only {} unique items available",
                items.len()
            )));
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entropy() -> EntropySource {
        EntropySource::from_seed(42)
    }

    fn items(min: Option<usize>, max: Option<usize>, unique: bool) -> Constraints {
        Constraints {
            min_items: min,
            max_items: max,
            unique_items: unique,
            ..Constraints::default()
        }
    }

    fn counter() -> impl FnMut(&mut EntropySource) -> Result<Value, StubError> {
        let mut n = 0;
        move |_| {
            n += 1;
            Ok(json!(n))
        }
    }

    #[test]
    fn default_count() {
        let mut e = entropy();
        for _ in 0..50 {
            let n = item_count(&Constraints::default(), Mode::VALID, &mut e).unwrap();
            assert!((1..=3).contains(&n));
        }
    }

    #[test]
    fn declared_bounds() {
        let mut e = entropy();
        for _ in 0..50 {
            let n = item_count(&items(Some(4), Some(6), false), Mode::VALID, &mut e).unwrap();
            assert!((4..=6).contains(&n));
        }
        assert_eq!(item_count(&items(None, Some(0), false), Mode::VALID, &mut e).unwrap(), 0);
        assert!(matches!(
            item_count(&items(Some(5), Some(2), false), Mode::VALID, &mut e),
            Err(StubError::ImpossibleValid(_))
        ));
    }

    #[test]
    fn invalid_counts() {
        let mut e = entropy();
        let n = item_count(&items(None, Some(2), false), Mode::INVALID_MAX_ITEMS, &mut e).unwrap();
        assert!(n > 2);
        let n = item_count(&items(Some(2), None, false), Mode::INVALID_MIN_ITEMS, &mut e).unwrap();
        assert!(n < 2);
        assert!(item_count(&Constraints::default(), Mode::INVALID_MAX_ITEMS, &mut e).is_err());
        assert!(item_count(&items(Some(0), None, false), Mode::INVALID_MIN_ITEMS, &mut e).is_err());
    }

    #[test]
    fn unique_items_are_distinct() {
        let mut flip = false;
        let two_values = move |_: &mut EntropySource| {
            flip = !flip;
            Ok(json!(flip))
        };
        let out = build(&items(Some(2), Some(2), true), Mode::VALID, &mut entropy(), 100, two_values).unwrap();
        assert_eq!(out.len(), 2);
        assert_ne!(out[0], out[1]);
    }

    #[test]
    fn unique_items_exhausted() {
        let constant = |_: &mut EntropySource| Ok(json!("same"));
        let err = build(&items(Some(3), Some(3), true), Mode::VALID, &mut entropy(), 20, constant).unwrap_err();
        assert!(matches!(err, StubError::ImpossibleValid(_)));
    }

    #[test]
    fn invalid_unique_items_duplicates() {
        let out = build(
            &items(None, Some(5), true),
            Mode::INVALID_UNIQUE_ITEMS,
            &mut entropy(),
            100,
            counter(),
        )
        .unwrap();
        assert!(out.len() >= 2);
        let last = out.last().unwrap();
        assert!(out[..out.len() - 1].contains(last));
    }

    #[test]
    fn invalid_unique_items_needs_declaration() {
        let err = build(&items(None, None, false), Mode::INVALID_UNIQUE_ITEMS, &mut entropy(), 100, counter())
            .unwrap_err();
        assert!(matches!(err, StubError::ImpossibleInvalid(_)));
        let err = build(&items(None, Some(1), true), Mode::INVALID_UNIQUE_ITEMS, &mut entropy(), 100, counter())
            .unwrap_err();
        assert!(matches!(err, StubError::ImpossibleInvalid(_)));
    }
}
