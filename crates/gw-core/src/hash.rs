//! Fx hash map and set aliases used across the workspace.
//!
//! Every hot map in gitward is keyed by short strings (patterns, framework
//! ids, relative paths), which is the case the Fx hash from `rustc-hash` is
//! tuned for. None of these maps hold attacker-controlled keys at a scale
//! where hash flooding matters.
//!
//! # Examples
//!
//! ```
//! use gw_core::{FxHashMap, FxHashSet, fx_hash_map, fx_hash_set};
//!
//! let mut seen: FxHashSet<&str> = fx_hash_set();
//! assert!(seen.insert(".env"));
//! assert!(!seen.insert(".env"));
//!
//! let mut by_pattern: FxHashMap<&str, usize> = fx_hash_map();
//! *by_pattern.entry("node_modules/").or_default() += 1;
//! assert_eq!(by_pattern["node_modules/"], 1);
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates a new empty [`FxHashMap`].
#[inline]
#[must_use]
pub fn fx_hash_map<K, V>() -> FxHashMap<K, V> {
    FxHashMap::default()
}

/// Creates a new empty [`FxHashSet`].
#[inline]
#[must_use]
pub fn fx_hash_set<V>() -> FxHashSet<V> {
    FxHashSet::default()
}

/// Creates a new [`FxHashMap`] able to hold `capacity` entries without
/// reallocating.
#[inline]
#[must_use]
pub fn fx_hash_map_with_capacity<K, V>(capacity: usize) -> FxHashMap<K, V> {
    FxHashMap::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_hash_set_dedups_patterns() {
        let mut set: FxHashSet<String> = fx_hash_set();
        set.insert("dist/".to_owned());
        set.insert("dist/".to_owned());
        set.insert("*.log".to_owned());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_fx_hash_map_with_capacity() {
        let map: FxHashMap<String, Vec<String>> = fx_hash_map_with_capacity(64);
        assert!(map.capacity() >= 64);
    }
}
