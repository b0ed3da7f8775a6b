use crate::{
    collection::{CollectionEvent, CollectionObserver, ObservableCollection},
    config::IndexConfig,
    error::IndexError,
    index::UniqueIndex,
    key::{IndexKey, KeyExtractor, same_key},
    obs::sink::{IndexKind, MetricsEvent, record},
};
use std::{
    cell::RefCell,
    collections::HashSet,
    fmt::{self, Debug},
    rc::Rc,
};

///
/// LiveUniqueIndex
///
/// Unique index over an `ObservableCollection`.
///
/// Adding mutations are vetted before the collection changes: an item whose
/// key is already stored, or a batch that repeats a key, is rejected with
/// `IndexError::DuplicateKey` and the collection is left untouched.
///

pub struct LiveUniqueIndex<T, K, V> {
    state: Rc<LiveUniqueState<T, K, V>>,
}

struct LiveUniqueState<T, K, V> {
    index: RefCell<UniqueIndex<K, V>>,
    extractor: KeyExtractor<T, K, V>,
    metrics: bool,
}

impl<T, K, V> LiveUniqueIndex<T, K, V>
where
    T: 'static,
    K: IndexKey + Debug + 'static,
    V: 'static,
{
    /// Scan `collection` once, then follow its mutations. Fails if the
    /// collection already holds two items with the same key.
    pub fn attach(
        collection: &mut ObservableCollection<T>,
        extractor: KeyExtractor<T, K, V>,
    ) -> Result<Self, IndexError> {
        Self::attach_with_config(collection, extractor, &IndexConfig::default())
    }

    pub fn attach_with_config(
        collection: &mut ObservableCollection<T>,
        extractor: KeyExtractor<T, K, V>,
        config: &IndexConfig,
    ) -> Result<Self, IndexError> {
        let index = UniqueIndex::build_with_config(
            collection.iter(),
            |item| extractor.key_of(item),
            |item| extractor.value_of(item),
            config,
        )?;

        Ok(Self::observe(collection, index, extractor, config))
    }

    // Subscribe an already-built index to `collection`.
    pub(crate) fn observe(
        collection: &mut ObservableCollection<T>,
        index: UniqueIndex<K, V>,
        extractor: KeyExtractor<T, K, V>,
        config: &IndexConfig,
    ) -> Self {
        tracing::debug!(
            rows = collection.len(),
            keys = index.len(),
            "live unique index attached"
        );

        let state = Rc::new(LiveUniqueState {
            index: RefCell::new(index),
            extractor,
            metrics: config.metrics,
        });
        collection.subscribe(&state);

        Self { state }
    }
}

impl<T, K, V> LiveUniqueIndex<T, K, V>
where
    K: IndexKey + Debug,
    V: Clone,
{
    /// The value stored under `key`.
    pub fn find(&self, key: &K) -> Result<V, IndexError> {
        self.try_find(key).ok_or_else(|| IndexError::key_not_found(key))
    }
}

impl<T, K, V> LiveUniqueIndex<T, K, V>
where
    K: IndexKey,
    V: Clone,
{
    #[must_use]
    pub fn try_find(&self, key: &K) -> Option<V> {
        self.state.index.borrow().try_find(key).cloned()
    }
}

impl<T, K, V> LiveUniqueIndex<T, K, V>
where
    K: IndexKey,
{
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.state.index.borrow().contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.index.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.index.borrow().is_empty()
    }
}

impl<T, K, V> LiveUniqueIndex<T, K, V>
where
    K: IndexKey + Clone,
    V: Clone,
{
    /// Detached copy of the current index state.
    #[must_use]
    pub fn snapshot(&self) -> UniqueIndex<K, V> {
        self.state.index.borrow().clone()
    }
}

impl<T, K, V> LiveUniqueState<T, K, V>
where
    K: IndexKey + Debug,
{
    fn record(&self, event: MetricsEvent) {
        if self.metrics {
            record(event);
        }
    }

    fn violation(&self, key: &K) -> IndexError {
        self.record(MetricsEvent::UniqueViolation);
        IndexError::duplicate_key(key)
    }
}

impl<T, K, V> CollectionObserver<T> for LiveUniqueState<T, K, V>
where
    K: IndexKey + Debug,
{
    fn admit(&self, incoming: &[T], displaced: Option<&T>) -> Result<(), IndexError> {
        let index = self.index.borrow();
        let displaced_key = displaced.map(|item| self.extractor.key_of(item));

        let mut seen = HashSet::new();
        let mut seen_null = false;

        for item in incoming {
            let key = self.extractor.key_of(item);

            let frees_slot = displaced_key
                .as_ref()
                .is_some_and(|displaced| same_key(displaced, &key));
            if index.contains(&key) && !frees_slot {
                return Err(self.violation(&key));
            }

            if key.is_null() {
                if seen_null {
                    return Err(self.violation(&key));
                }
                seen_null = true;
            } else if seen.contains(&key) {
                return Err(self.violation(&key));
            } else {
                seen.insert(key);
            }
        }

        Ok(())
    }

    fn notify(&self, event: CollectionEvent<'_, T>, _: &[T]) {
        let mut index = self.index.borrow_mut();

        match event {
            CollectionEvent::Added { item, .. } => {
                let inserted =
                    index.insert(self.extractor.key_of(item), self.extractor.value_of(item));

                // Admission already rejected duplicates; a failure here means
                // the index diverged from the collection.
                debug_assert!(inserted.is_ok(), "live unique index diverged: {inserted:?}");
                if inserted.is_ok() {
                    self.record(MetricsEvent::IndexDelta {
                        kind: IndexKind::UniqueIndex,
                        inserts: 1,
                        removes: 0,
                    });
                }
            }
            CollectionEvent::Removed { item, .. } => {
                if index.remove(&self.extractor.key_of(item)).is_some() {
                    self.record(MetricsEvent::IndexDelta {
                        kind: IndexKind::UniqueIndex,
                        inserts: 0,
                        removes: 1,
                    });
                }
            }
            CollectionEvent::Cleared => {
                index.clear();
                self.record(MetricsEvent::IndexCleared {
                    kind: IndexKind::UniqueIndex,
                });
            }
        }
    }
}

impl<T, K, V> Clone for LiveUniqueIndex<T, K, V> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T, K, V> Debug for LiveUniqueIndex<T, K, V>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveUniqueIndex")
            .field("index", &self.state.index)
            .finish_non_exhaustive()
    }
}
