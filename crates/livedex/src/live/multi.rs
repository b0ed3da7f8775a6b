use crate::{
    collection::{CollectionEvent, CollectionObserver, ObservableCollection},
    config::IndexConfig,
    index::Index,
    key::{IndexKey, KeyExtractor, same_key},
    obs::sink::{IndexKind, MetricsEvent, record},
};
use std::{cell::RefCell, fmt, rc::Rc};

///
/// LiveIndex
///
/// Non-unique index over an `ObservableCollection`, updated in O(1)
/// amortized time per appended item and O(bucket) per removed item.
/// Each bucket lists its values in collection order; telling equal values
/// under one key apart, or placing a value inserted mid-collection, costs a
/// scan of the items before it.
///

pub struct LiveIndex<T, K, V> {
    state: Rc<LiveIndexState<T, K, V>>,
}

struct LiveIndexState<T, K, V> {
    index: RefCell<Index<K, V>>,
    extractor: KeyExtractor<T, K, V>,
    metrics: bool,
}

impl<T, K, V> LiveIndex<T, K, V>
where
    T: 'static,
    K: IndexKey + 'static,
    V: PartialEq + 'static,
{
    /// Scan `collection` once, then follow its mutations.
    pub fn attach(
        collection: &mut ObservableCollection<T>,
        extractor: KeyExtractor<T, K, V>,
    ) -> Self {
        Self::attach_with_config(collection, extractor, &IndexConfig::default())
    }

    pub fn attach_with_config(
        collection: &mut ObservableCollection<T>,
        extractor: KeyExtractor<T, K, V>,
        config: &IndexConfig,
    ) -> Self {
        let index = Index::build_with_config(
            collection.iter(),
            |item| extractor.key_of(item),
            |item| extractor.value_of(item),
            config,
        );

        tracing::debug!(
            rows = collection.len(),
            keys = index.len(),
            "live index attached"
        );

        let state = Rc::new(LiveIndexState {
            index: RefCell::new(index),
            extractor,
            metrics: config.metrics,
        });
        collection.subscribe(&state);

        Self { state }
    }
}

impl<T, K, V> LiveIndex<T, K, V>
where
    K: IndexKey,
    V: Clone,
{
    /// Values currently stored under `key`, in collection order.
    #[must_use]
    pub fn find(&self, key: &K) -> Vec<V> {
        self.state.index.borrow().find(key).to_vec()
    }
}

impl<T, K, V> LiveIndex<T, K, V>
where
    K: IndexKey,
{
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.state.index.borrow().contains(key)
    }

    /// Number of non-empty buckets, the null bucket included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.index.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.index.borrow().is_empty()
    }

    #[must_use]
    pub fn value_count(&self) -> usize {
        self.state.index.borrow().value_count()
    }
}

impl<T, K, V> LiveIndex<T, K, V>
where
    K: IndexKey + Clone,
    V: Clone,
{
    /// Detached copy of the current index state.
    #[must_use]
    pub fn snapshot(&self) -> Index<K, V> {
        self.state.index.borrow().clone()
    }
}

impl<T, K, V> LiveIndexState<T, K, V> {
    fn record(&self, event: MetricsEvent) {
        if self.metrics {
            record(event);
        }
    }
}

impl<T, K, V> LiveIndexState<T, K, V>
where
    K: IndexKey,
{
    // Bucket slot of the item at `preceding.len()`: the number of items
    // before it that share its key.
    fn slot_of(&self, key: &K, preceding: &[T]) -> usize {
        preceding
            .iter()
            .filter(|item| same_key(&self.extractor.key_of(item), key))
            .count()
    }
}

impl<T, K, V> CollectionObserver<T> for LiveIndexState<T, K, V>
where
    K: IndexKey,
    V: PartialEq,
{
    fn notify(&self, event: CollectionEvent<'_, T>, items: &[T]) {
        let mut index = self.index.borrow_mut();

        match event {
            CollectionEvent::Added { item, position } => {
                let key = self.extractor.key_of(item);
                let value = self.extractor.value_of(item);

                if position + 1 == items.len() {
                    index.insert(key, value);
                } else {
                    let slot = self.slot_of(&key, &items[..position]);
                    index.insert_at(key, slot, value);
                }
                self.record(MetricsEvent::IndexDelta {
                    kind: IndexKind::Index,
                    inserts: 1,
                    removes: 0,
                });
            }
            CollectionEvent::Removed { item, position } => {
                let key = self.extractor.key_of(item);
                let value = self.extractor.value_of(item);

                // Equal values under one key are told apart by position.
                let repeated = index
                    .find(&key)
                    .iter()
                    .filter(|candidate| **candidate == value)
                    .nth(1)
                    .is_some();
                let removed = if repeated {
                    let slot = self.slot_of(&key, &items[..position]);
                    index.remove_slot(&key, slot).is_some()
                } else {
                    index.remove_one(&key, &value)
                };

                if removed {
                    self.record(MetricsEvent::IndexDelta {
                        kind: IndexKind::Index,
                        inserts: 0,
                        removes: 1,
                    });
                }
            }
            CollectionEvent::Cleared => {
                index.clear();
                self.record(MetricsEvent::IndexCleared {
                    kind: IndexKind::Index,
                });
            }
        }
    }
}

impl<T, K, V> Clone for LiveIndex<T, K, V> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T, K, V> fmt::Debug for LiveIndex<T, K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveIndex")
            .field("index", &self.state.index)
            .finish_non_exhaustive()
    }
}
