use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::snowflake::Snowflake;

/// Comparator applied when a view materializes in sorted mode.
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// A read-only ordered view over a live entity map.
///
/// The first read after construction, or after the owning store has
/// mutated, materializes one snapshot copy of the backing map (sorted by
/// the comparator, or in map iteration order when none is set). Subsequent
/// reads reuse that copy without re-sorting. Staleness is detected through
/// the store's generation counter, which the owner bumps on every
/// insert/remove; the view has no other way to observe external mutation.
///
/// All reads hand out clones, never references into live map cells.
pub struct SequenceView<T> {
    backing: Arc<DashMap<Snowflake, T>>,
    generation: Arc<AtomicU64>,
    comparator: Option<Comparator<T>>,
    cached: RwLock<Option<Materialized<T>>>,
}

struct Materialized<T> {
    generation: u64,
    items: Arc<Vec<T>>,
}

impl<T: Clone> SequenceView<T> {
    pub(crate) fn new(
        backing: Arc<DashMap<Snowflake, T>>,
        generation: Arc<AtomicU64>,
        comparator: Option<Comparator<T>>,
    ) -> Self {
        Self {
            backing,
            generation,
            comparator,
            cached: RwLock::new(None),
        }
    }

    /// Discard the cached copy so the next read re-materializes even if the
    /// generation counter has not moved.
    pub fn invalidate(&self) {
        *self.cached.write() = None;
    }

    fn materialize(&self) -> Arc<Vec<T>> {
        let current = self.generation.load(AtomicOrdering::Acquire);

        {
            let cached = self.cached.read();
            if let Some(copy) = cached.as_ref()
                && copy.generation == current
            {
                return Arc::clone(&copy.items);
            }
        }

        let mut items: Vec<T> = self.backing.iter().map(|entry| entry.value().clone()).collect();
        if let Some(comparator) = &self.comparator {
            items.sort_by(|a, b| comparator(a, b));
        }
        let items = Arc::new(items);

        *self.cached.write() = Some(Materialized {
            generation: current,
            items: Arc::clone(&items),
        });
        items
    }

    pub fn len(&self) -> usize {
        self.materialize().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index` in view order.
    pub fn get(&self, index: usize) -> Option<T> {
        self.materialize().get(index).cloned()
    }

    /// The whole view as an owned `Vec`, in view order.
    pub fn to_vec(&self) -> Vec<T> {
        self.materialize().as_ref().clone()
    }

    pub fn iter(&self) -> SequenceIter<T> {
        SequenceIter {
            items: self.materialize(),
            index: 0,
        }
    }

    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.materialize().contains(item)
    }

    /// Index of the first element equal to `item`, in view order.
    pub fn position(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.materialize().iter().position(|candidate| candidate == item)
    }

    /// Number of elements satisfying `predicate`.
    pub fn count_matching(&self, predicate: impl Fn(&T) -> bool) -> usize {
        self.materialize().iter().filter(|item| predicate(item)).count()
    }
}

/// Owned iterator over a materialized view copy.
pub struct SequenceIter<T> {
    items: Arc<Vec<T>>,
    index: usize,
}

impl<T: Clone> Iterator for SequenceIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.items.get(self.index).cloned();
        if item.is_some() {
            self.index += 1;
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.items.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<'a, T: Clone> IntoIterator for &'a SequenceView<T> {
    type Item = T;
    type IntoIter = SequenceIter<T>;

    fn into_iter(self) -> SequenceIter<T> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Arc<DashMap<Snowflake, u64>>, Arc<AtomicU64>) {
        let map = Arc::new(DashMap::new());
        map.insert(1, 30);
        map.insert(2, 10);
        map.insert(3, 20);
        (map, Arc::new(AtomicU64::new(0)))
    }

    fn sorted_view(
        map: &Arc<DashMap<Snowflake, u64>>,
        generation: &Arc<AtomicU64>,
    ) -> SequenceView<u64> {
        SequenceView::new(
            Arc::clone(map),
            Arc::clone(generation),
            Some(Arc::new(|a: &u64, b: &u64| a.cmp(b))),
        )
    }

    #[test]
    fn test_sorted_materialization() {
        let (map, generation) = setup();
        let view = sorted_view(&map, &generation);
        assert_eq!(view.to_vec(), vec![10, 20, 30]);
        assert_eq!(view.get(0), Some(10));
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn test_stable_across_reads_without_invalidation() {
        let (map, generation) = setup();
        let view = sorted_view(&map, &generation);
        let first = view.to_vec();

        // Backing mutated but generation untouched: the cached copy wins.
        map.insert(4, 5);
        assert_eq!(view.to_vec(), first);
    }

    #[test]
    fn test_generation_bump_triggers_rematerialization() {
        let (map, generation) = setup();
        let view = sorted_view(&map, &generation);
        assert_eq!(view.to_vec(), vec![10, 20, 30]);

        map.insert(4, 5);
        generation.fetch_add(1, AtomicOrdering::AcqRel);
        assert_eq!(view.to_vec(), vec![5, 10, 20, 30]);
    }

    #[test]
    fn test_explicit_invalidate() {
        let (map, generation) = setup();
        let view = sorted_view(&map, &generation);
        assert_eq!(view.len(), 3);

        map.remove(&1);
        view.invalidate();
        // Same generation, but the copy was dropped explicitly.
        assert_eq!(view.to_vec(), vec![10, 20]);
    }

    #[test]
    fn test_unsorted_view_snapshots() {
        let (map, generation) = setup();
        let view: SequenceView<u64> = SequenceView::new(map, generation, None);
        let mut items = view.to_vec();
        items.sort_unstable();
        assert_eq!(items, vec![10, 20, 30]);
        assert!(view.contains(&20));
        assert!(!view.contains(&99));
    }

    #[test]
    fn test_iteration_and_counting() {
        let (map, generation) = setup();
        let view = sorted_view(&map, &generation);
        let collected: Vec<u64> = view.iter().collect();
        assert_eq!(collected, vec![10, 20, 30]);
        assert_eq!(view.count_matching(|v| *v >= 20), 2);
        assert_eq!(view.position(&20), Some(1));
    }
}
