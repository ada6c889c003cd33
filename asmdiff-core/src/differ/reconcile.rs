//! Key-based set reconciliation shared by every comparison level.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;

/// Outcome of pairing two collections by identity key.
///
/// `created` follows new-collection order, `removed` and `common` follow
/// old-collection order.
#[derive(Debug)]
pub struct Reconciliation<'a, T> {
    pub created: Vec<&'a T>,
    pub removed: Vec<&'a T>,
    pub common: Vec<(&'a T, &'a T)>,
}

impl<T> Reconciliation<'_, T> {
    pub fn is_unchanged(&self) -> bool {
        self.created.is_empty() && self.removed.is_empty()
    }
}

/// Pair `old` and `new` entities by the key `key` extracts.
///
/// Entities are never matched by position. When a collection repeats a
/// key, its first occurrence is used and the rest are skipped with a
/// warning.
pub fn reconcile<'a, T, K, F, O, N>(old: O, new: N, key: F) -> Reconciliation<'a, T>
where
    T: 'a,
    K: Eq + Hash + Display,
    F: Fn(&'a T) -> K,
    O: IntoIterator<Item = &'a T>,
    N: IntoIterator<Item = &'a T>,
{
    let old_keyed = distinct_by_key(old, &key);
    let new_keyed = distinct_by_key(new, &key);

    let old_index: HashMap<&K, &'a T> = old_keyed.iter().map(|(k, item)| (k, *item)).collect();
    let new_index: HashMap<&K, &'a T> = new_keyed.iter().map(|(k, item)| (k, *item)).collect();

    let created = new_keyed
        .iter()
        .filter(|(k, _)| !old_index.contains_key(k))
        .map(|(_, item)| *item)
        .collect();

    let removed = old_keyed
        .iter()
        .filter(|(k, _)| !new_index.contains_key(k))
        .map(|(_, item)| *item)
        .collect();

    let common = old_keyed
        .iter()
        .filter_map(|(k, old_item)| new_index.get(k).map(|new_item| (*old_item, *new_item)))
        .collect();

    Reconciliation {
        created,
        removed,
        common,
    }
}

/// Keys that occur more than once, each reported once, in encounter order.
pub fn duplicate_keys<'a, T, K, F, I>(items: I, key: F) -> Vec<K>
where
    T: 'a,
    K: Eq + Hash,
    F: Fn(&'a T) -> K,
    I: IntoIterator<Item = &'a T>,
{
    let keys: Vec<K> = items.into_iter().map(key).collect();
    let mut duplicate_at = Vec::new();
    {
        let mut seen = HashSet::with_capacity(keys.len());
        let mut reported = HashSet::new();
        for (i, k) in keys.iter().enumerate() {
            if !seen.insert(k) && reported.insert(k) {
                duplicate_at.push(i);
            }
        }
    }

    keys.into_iter()
        .enumerate()
        .filter(|(i, _)| duplicate_at.contains(i))
        .map(|(_, k)| k)
        .collect()
}

fn distinct_by_key<'a, T, K, F, I>(items: I, key: &F) -> Vec<(K, &'a T)>
where
    T: 'a,
    K: Eq + Hash + Display,
    F: Fn(&'a T) -> K,
    I: IntoIterator<Item = &'a T>,
{
    let keyed: Vec<(K, &'a T)> = items.into_iter().map(|item| (key(item), item)).collect();

    let mut keep = vec![true; keyed.len()];
    {
        let mut seen = HashSet::with_capacity(keyed.len());
        for (i, (k, _)) in keyed.iter().enumerate() {
            if !seen.insert(k) {
                tracing::warn!(key = %k, "Duplicate identity key, keeping first occurrence");
                keep[i] = false;
            }
        }
    }

    keyed
        .into_iter()
        .zip(keep)
        .filter_map(|(entry, keep)| keep.then_some(entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Item {
        key: &'static str,
        value: u32,
    }

    fn item(key: &'static str, value: u32) -> Item {
        Item { key, value }
    }

    #[test]
    fn test_reconcile_partitions_by_key() {
        let old = vec![item("a", 1), item("b", 2), item("c", 3)];
        let new = vec![item("d", 4), item("c", 30), item("a", 10)];

        let r = reconcile(&old, &new, |i| i.key);

        assert_eq!(r.created, vec![&new[0]]);
        assert_eq!(r.removed, vec![&old[1]]);
        assert_eq!(r.common.len(), 2);
        // old-collection order, paired by key rather than position
        assert_eq!(r.common[0], (&old[0], &new[2]));
        assert_eq!(r.common[1], (&old[2], &new[1]));
    }

    #[test]
    fn test_reconcile_preserves_collection_order() {
        let old = vec![item("z", 0), item("y", 0), item("x", 0)];
        let new = vec![item("c", 0), item("b", 0), item("a", 0)];

        let r = reconcile(&old, &new, |i| i.key);

        let created: Vec<_> = r.created.iter().map(|i| i.key).collect();
        let removed: Vec<_> = r.removed.iter().map(|i| i.key).collect();
        assert_eq!(created, vec!["c", "b", "a"]);
        assert_eq!(removed, vec!["z", "y", "x"]);
        assert!(r.common.is_empty());
    }

    #[test]
    fn test_reconcile_duplicate_first_wins() {
        let old = vec![item("a", 1), item("a", 2)];
        let new = vec![item("a", 3)];

        let r = reconcile(&old, &new, |i| i.key);

        assert!(r.is_unchanged());
        assert_eq!(r.common, vec![(&old[0], &new[0])]);
    }

    #[test]
    fn test_reconcile_owned_keys() {
        let old = vec![item("a", 1)];
        let new = vec![item("a", 1)];

        let r = reconcile(&old, &new, |i| format!("{}:{}", i.key, i.value));

        assert!(r.is_unchanged());
        assert_eq!(r.common.len(), 1);
    }

    #[test]
    fn test_reconcile_empty() {
        let empty: Vec<Item> = vec![];
        let r = reconcile(&empty, &empty, |i| i.key);
        assert!(r.is_unchanged());
        assert!(r.common.is_empty());
    }

    #[test]
    fn test_duplicate_keys_reported_once() {
        let items = vec![item("a", 0), item("b", 0), item("a", 0), item("a", 0), item("b", 0)];
        assert_eq!(duplicate_keys(&items, |i| i.key), vec!["a", "b"]);
        assert!(duplicate_keys(&items[..2], |i| i.key).is_empty());
    }
}
