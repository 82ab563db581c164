use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use dashmap::DashMap;

use crate::sequence::SequenceView;
use crate::snowflake::Snowflake;

/// An entity addressable by a snowflake id.
pub trait Keyed {
    fn key(&self) -> Snowflake;
}

/// A keyed map of entities of one kind.
///
/// Insertion order is never semantically meaningful. Every structural
/// mutation bumps the store's generation counter, which is how outstanding
/// [`SequenceView`]s know to re-materialize. Lookups clone the stored
/// value out; callers never hold references into live map cells.
#[derive(Debug)]
pub struct Store<T> {
    entries: Arc<DashMap<Snowflake, T>>,
    generation: Arc<AtomicU64>,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<T: Keyed + Clone> Store<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by the entity's own key.
    pub fn insert(&self, entity: T) {
        self.entries.insert(entity.key(), entity);
        self.bump();
    }

    /// Remove and return the prior value. Absence is not an error: mutation
    /// events may legitimately reference entities that are already gone.
    pub fn remove(&self, id: Snowflake) -> Option<T> {
        let removed = self.entries.remove(&id).map(|(_, value)| value);
        if removed.is_some() {
            self.bump();
        }
        removed
    }

    pub fn get(&self, id: Snowflake) -> Option<T> {
        self.entries.get(&id).map(|entry| entry.value().clone())
    }

    /// Mutate the stored entry in place under the map shard lock. Returns
    /// whether an entry existed.
    pub fn update(&self, id: Snowflake, mutate: impl FnOnce(&mut T)) -> bool {
        let updated = match self.entries.get_mut(&id) {
            Some(mut entry) => {
                mutate(entry.value_mut());
                true
            }
            None => false,
        };
        if updated {
            self.bump();
        }
        updated
    }

    pub fn contains(&self, id: Snowflake) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insertion-order snapshot view over the store's values.
    pub fn values(&self) -> SequenceView<T> {
        SequenceView::new(Arc::clone(&self.entries), Arc::clone(&self.generation), None)
    }

    /// Sorted snapshot view over the store's values.
    pub fn values_sorted_by(
        &self,
        comparator: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    ) -> SequenceView<T> {
        SequenceView::new(
            Arc::clone(&self.entries),
            Arc::clone(&self.generation),
            Some(Arc::new(comparator)),
        )
    }

    /// Plain cloned snapshot of all values, for one-shot computations that
    /// don't warrant a cached view.
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Remove every entity matching `predicate` and return the removed
    /// values. Keys are collected before any removal so no map lock is
    /// held across shards.
    pub fn drain_matching(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let keys: Vec<Snowflake> = self
            .entries
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| *entry.key())
            .collect();

        let mut removed = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some((_, value)) = self.entries.remove(&key) {
                removed.push(value);
            }
        }
        if !removed.is_empty() {
            self.bump();
        }
        removed
    }

    fn bump(&self) {
        self.generation.fetch_add(1, AtomicOrdering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Widget {
        id: Snowflake,
        label: &'static str,
    }

    impl Keyed for Widget {
        fn key(&self) -> Snowflake {
            self.id
        }
    }

    fn widget(id: Snowflake, label: &'static str) -> Widget {
        Widget { id, label }
    }

    #[test]
    fn test_insert_is_upsert() {
        let store = Store::new();
        store.insert(widget(1, "a"));
        store.insert(widget(1, "b"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).unwrap().label, "b");
    }

    #[test]
    fn test_remove_returns_prior_value() {
        let store = Store::new();
        store.insert(widget(1, "a"));
        assert_eq!(store.remove(1), Some(widget(1, "a")));
        assert_eq!(store.remove(1), None);
    }

    #[test]
    fn test_update_in_place() {
        let store = Store::new();
        store.insert(widget(1, "a"));
        assert!(store.update(1, |w| w.label = "c"));
        assert!(!store.update(2, |w| w.label = "d"));
        assert_eq!(store.get(1).unwrap().label, "c");
    }

    #[test]
    fn test_views_track_mutation() {
        let store = Store::new();
        store.insert(widget(2, "b"));
        store.insert(widget(1, "a"));

        let view = store.values_sorted_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(view.to_vec(), vec![widget(1, "a"), widget(2, "b")]);

        // Store mutation bumps the generation; the view re-materializes.
        store.insert(widget(3, "c"));
        assert_eq!(view.len(), 3);
        assert_eq!(view.get(2), Some(widget(3, "c")));

        store.remove(1);
        assert_eq!(view.to_vec(), vec![widget(2, "b"), widget(3, "c")]);
    }

    #[test]
    fn test_drain_matching() {
        let store = Store::new();
        store.insert(widget(1, "keep"));
        store.insert(widget(2, "drop"));
        store.insert(widget(3, "drop"));

        let mut removed = store.drain_matching(|w| w.label == "drop");
        removed.sort_by_key(|w| w.id);
        assert_eq!(removed, vec![widget(2, "drop"), widget(3, "drop")]);
        assert_eq!(store.len(), 1);
        assert!(store.contains(1));
    }
}
