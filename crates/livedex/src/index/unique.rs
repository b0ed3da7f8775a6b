use crate::{
    config::IndexConfig,
    error::IndexError,
    key::IndexKey,
    obs::sink::{IndexKind, MetricsEvent, record},
};
use std::{
    collections::{HashMap, hash_map},
    fmt::Debug,
    ops,
};

///
/// UniqueIndex
///
/// Mapping from key to exactly one value. The null key owns a single
/// dedicated slot, so it is subject to the same uniqueness rule.
///

#[derive(Clone, Debug)]
pub struct UniqueIndex<K, V> {
    slots: HashMap<K, V>,
    null_slot: Option<V>,
}

impl<K, V> UniqueIndex<K, V>
where
    K: IndexKey + Debug,
{
    /// Scan `source` once, failing on the first repeated key.
    /// Nothing is returned on failure; a partial index is never observable.
    pub fn build<I>(
        source: I,
        key_fn: impl FnMut(&I::Item) -> K,
        value_fn: impl FnMut(I::Item) -> V,
    ) -> Result<Self, IndexError>
    where
        I: IntoIterator,
    {
        Self::build_with_config(source, key_fn, value_fn, &IndexConfig::default())
    }

    pub fn build_with_config<I>(
        source: I,
        mut key_fn: impl FnMut(&I::Item) -> K,
        mut value_fn: impl FnMut(I::Item) -> V,
        config: &IndexConfig,
    ) -> Result<Self, IndexError>
    where
        I: IntoIterator,
    {
        let mut index = Self::with_capacity(config.capacity);
        let mut rows = 0u64;

        for item in source {
            let key = key_fn(&item);
            if let Err(err) = index.insert(key, value_fn(item)) {
                if config.metrics {
                    record(MetricsEvent::UniqueViolation);
                }
                return Err(err);
            }
            rows += 1;
        }

        if config.metrics {
            record(MetricsEvent::IndexBuilt {
                kind: IndexKind::UniqueIndex,
                rows_scanned: rows,
            });
        }

        Ok(index)
    }

    /// The value stored under `key`.
    pub fn find(&self, key: &K) -> Result<&V, IndexError> {
        self.try_find(key).ok_or_else(|| IndexError::key_not_found(key))
    }

    // Store `value` under a key that must not be present yet.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<(), IndexError> {
        if key.is_null() {
            if self.null_slot.is_some() {
                return Err(IndexError::duplicate_key(&key));
            }
            self.null_slot = Some(value);

            return Ok(());
        }

        match self.slots.entry(key) {
            hash_map::Entry::Occupied(entry) => Err(IndexError::duplicate_key(entry.key())),
            hash_map::Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }
}

impl<K, V> UniqueIndex<K, V>
where
    K: IndexKey,
{
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: HashMap::with_capacity(capacity),
            null_slot: None,
        }
    }

    /// The value stored under `key`, if any.
    #[must_use]
    pub fn try_find(&self, key: &K) -> Option<&V> {
        if key.is_null() {
            self.null_slot.as_ref()
        } else {
            self.slots.get(key)
        }
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        if key.is_null() {
            self.null_slot.is_some()
        } else {
            self.slots.contains_key(key)
        }
    }

    /// Number of stored values, the null slot included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() + usize::from(self.null_slot.is_some())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-null keys, in unspecified order.
    pub fn keys(&self) -> hash_map::Keys<'_, K, V> {
        self.slots.keys()
    }

    /// Every stored entry; the null slot is reported with `None`.
    pub fn iter(&self) -> impl Iterator<Item = (Option<&K>, &V)> {
        self.slots
            .iter()
            .map(|(key, value)| (Some(key), value))
            .chain(self.null_slot.as_ref().map(|value| (None, value)))
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        if key.is_null() {
            self.null_slot.take()
        } else {
            self.slots.remove(key)
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots = HashMap::new();
        self.null_slot = None;
    }
}

impl<K, V> Default for UniqueIndex<K, V>
where
    K: IndexKey,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> PartialEq for UniqueIndex<K, V>
where
    K: IndexKey,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.null_slot == other.null_slot && self.slots == other.slots
    }
}

impl<K, V> Eq for UniqueIndex<K, V>
where
    K: IndexKey,
    V: Eq,
{
}

/// Indexer access; panics if `key` is absent, like `HashMap`.
impl<K, V> ops::Index<&K> for UniqueIndex<K, V>
where
    K: IndexKey,
{
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.try_find(key).expect("key not found in unique index")
    }
}
