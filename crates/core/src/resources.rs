//! Typed, named numeric capacity/reservation bundles.

use im::HashMap as ImHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A mapping from resource-name to a non-negative number.
///
/// Used both as an executor's declared capacity and as a task's
/// reservation against that capacity. Backed by a persistent
/// (structurally-shared) map so that capturing a `Resources` value into
/// a pre-snapshot is O(1) rather than a deep copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Resources(pub ImHashMap<String, f64>);

impl Resources {
    /// An empty resource bundle.
    pub fn empty() -> Self {
        Resources(ImHashMap::new())
    }

    /// Build a `Resources` from an iterator of `(name, amount)` pairs.
    pub fn from_pairs<I: IntoIterator<Item = (String, f64)>>(pairs: I) -> Self {
        Resources(pairs.into_iter().collect())
    }

    /// Whether the bundle declares no resource keys at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Amount declared for `key`, or `0.0` if absent.
    pub fn get(&self, key: &str) -> f64 {
        self.0.get(key).copied().unwrap_or(0.0)
    }

    /// The set of resource-name keys present in this bundle.
    pub fn keys(&self) -> im::HashSet<String> {
        self.0.keys().cloned().collect()
    }

    /// Whether every value in the bundle is finite and non-negative.
    ///
    /// Used by executor registration (`InvalidResources`) — a NaN,
    /// infinite, or negative capacity is never meaningful.
    pub fn all_numeric_non_negative(&self) -> bool {
        self.0.values().all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Componentwise sum of `self` and `other`.
    pub fn add(&self, other: &Resources) -> Resources {
        let mut result = self.0.clone();
        for (k, v) in other.0.iter() {
            result
                .entry(k.clone())
                .and_modify(|existing| *existing += v)
                .or_insert(*v);
        }
        Resources(result)
    }

    /// Whether every key in `self` is `<=` the corresponding key in `capacity`.
    ///
    /// Keys absent from `self` are treated as `0`; keys absent from
    /// `capacity` are treated as `0` capacity (so any nonzero reservation
    /// against an undeclared resource always exceeds it).
    pub fn fits_within(&self, capacity: &Resources) -> bool {
        self.0.iter().all(|(k, v)| *v <= capacity.get(k))
    }
}

impl fmt::Display for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.0.keys().collect();
        keys.sort();
        let rendered: Vec<String> = keys
            .into_iter()
            .map(|k| format!("{}={}", k, self.0.get(k).unwrap()))
            .collect();
        write!(f, "{}", rendered.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_sorted_and_deterministic() {
        let r = Resources::from_pairs([("memory".to_string(), 100.0), ("cpu".to_string(), 8.0)]);
        assert_eq!(r.to_string(), "cpu=8, memory=100");
    }

    #[test]
    fn fits_within_treats_missing_keys_as_zero() {
        let capacity = Resources::from_pairs([("cpu".to_string(), 8.0)]);
        let over = Resources::from_pairs([("memory".to_string(), 1.0)]);
        assert!(!over.fits_within(&capacity));
        let under = Resources::from_pairs([("cpu".to_string(), 4.0)]);
        assert!(under.fits_within(&capacity));
    }

    #[test]
    fn all_numeric_non_negative_rejects_negative_and_nan() {
        let ok = Resources::from_pairs([("cpu".to_string(), 0.0)]);
        assert!(ok.all_numeric_non_negative());
        let neg = Resources::from_pairs([("cpu".to_string(), -1.0)]);
        assert!(!neg.all_numeric_non_negative());
        let nan = Resources::from_pairs([("cpu".to_string(), f64::NAN)]);
        assert!(!nan.all_numeric_non_negative());
    }
}
