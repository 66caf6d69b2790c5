//! Sorted name index over the type arena.
//!
//! Entries are kept sorted by normalized key. Lookup uses a lower-bound binary
//! search followed by an equality check; insertion uses an upper-bound binary
//! search. Both go through [`compare_keys`] so they can never disagree about
//! where a key belongs.

use smol_str::SmolStr;
use std::cmp::Ordering;

use crate::base::{TypeId, compare_keys};

/// One `key -> handle` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub key: SmolStr,
    pub id: TypeId,
}

/// Deduplicated, sorted `normalized name -> TypeId` index.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    entries: Vec<StoreEntry>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First slot whose key is not less than `key`.
    fn lower_bound(&self, key: &str) -> usize {
        self.entries
            .partition_point(|e| compare_keys(&e.key, key) == Ordering::Less)
    }

    /// First slot whose key is greater than `key`.
    fn upper_bound(&self, key: &str) -> usize {
        self.entries
            .partition_point(|e| compare_keys(&e.key, key) != Ordering::Greater)
    }

    /// Look up a normalized key.
    pub fn find(&self, key: &str) -> Option<TypeId> {
        let idx = self.lower_bound(key);
        self.entries
            .get(idx)
            .filter(|e| compare_keys(&e.key, key) == Ordering::Equal)
            .map(|e| e.id)
    }

    /// Insert `key -> id` at its sorted position.
    ///
    /// If the key is already present the existing handle is returned and the
    /// store is left unchanged, so at most one entry exists per key.
    pub fn insert_sorted(&mut self, key: &str, id: TypeId) -> TypeId {
        if let Some(existing) = self.find(key) {
            return existing;
        }
        let idx = self.upper_bound(key);
        self.entries.insert(
            idx,
            StoreEntry {
                key: SmolStr::new(key),
                id,
            },
        );
        id
    }

    /// Remove the entry for `key`, returning its handle.
    pub fn remove(&mut self, key: &str) -> Option<TypeId> {
        let idx = self.lower_bound(key);
        let entry = self.entries.get(idx)?;
        if compare_keys(&entry.key, key) != Ordering::Equal {
            return None;
        }
        Some(self.entries.remove(idx).id)
    }

    /// All entries whose key starts with `prefix`, in sorted order.
    pub fn prefix_run<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a StoreEntry> {
        let start = self.lower_bound(prefix);
        self.entries[start..]
            .iter()
            .take_while(move |e| e.key.starts_with(prefix))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StoreEntry> {
        self.entries.iter()
    }

    /// Returns true if entries are strictly increasing under [`compare_keys`].
    pub fn is_sorted(&self) -> bool {
        self.entries
            .windows(2)
            .all(|w| compare_keys(&w[0].key, &w[1].key) == Ordering::Less)
    }
}
