use crate::{
    config::IndexConfig,
    key::IndexKey,
    obs::sink::{IndexKind, MetricsEvent, record},
};
use std::{
    collections::{HashMap, hash_map},
    ops,
};

///
/// Index
///
/// Non-unique mapping from key to the ordered values sharing it.
/// Encounter order within a bucket is preserved. Values with a null key live
/// in the null bucket; a bucket in the key map is never empty.
///

#[derive(Clone, Debug)]
pub struct Index<K, V> {
    buckets: HashMap<K, Vec<V>>,
    null_bucket: Vec<V>,
}

impl<K, V> Index<K, V>
where
    K: IndexKey,
{
    /// Scan `source` once, grouping `value_fn(item)` by `key_fn(&item)`.
    pub fn build<I>(
        source: I,
        key_fn: impl FnMut(&I::Item) -> K,
        value_fn: impl FnMut(I::Item) -> V,
    ) -> Self
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
    ) -> Self
    where
        I: IntoIterator,
    {
        let mut index = Self::with_capacity(config.capacity);
        let mut rows = 0u64;

        for item in source {
            let key = key_fn(&item);
            index.insert(key, value_fn(item));
            rows += 1;
        }

        if config.metrics {
            record(MetricsEvent::IndexBuilt {
                kind: IndexKind::Index,
                rows_scanned: rows,
            });
        }

        index
    }

    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: HashMap::with_capacity(capacity),
            null_bucket: Vec::new(),
        }
    }

    /// Values stored under `key` in encounter order; empty if never seen.
    #[must_use]
    pub fn find(&self, key: &K) -> &[V] {
        if key.is_null() {
            return &self.null_bucket;
        }

        self.buckets
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        if key.is_null() {
            !self.null_bucket.is_empty()
        } else {
            self.buckets.contains_key(key)
        }
    }

    /// Number of non-empty buckets, the null bucket included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len() + usize::from(!self.null_bucket.is_empty())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of stored values across all buckets.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum::<usize>() + self.null_bucket.len()
    }

    /// Non-null keys, in unspecified order.
    pub fn keys(&self) -> hash_map::Keys<'_, K, Vec<V>> {
        self.buckets.keys()
    }

    /// Every non-empty bucket; the null bucket is reported with `None`.
    pub fn iter(&self) -> impl Iterator<Item = (Option<&K>, &[V])> {
        let null = (!self.null_bucket.is_empty()).then_some((None, self.null_bucket.as_slice()));

        self.buckets
            .iter()
            .map(|(key, values)| (Some(key), values.as_slice()))
            .chain(null)
    }

    // Append to the key's bucket, creating it on first use.
    pub(crate) fn insert(&mut self, key: K, value: V) {
        if key.is_null() {
            self.null_bucket.push(value);
        } else {
            self.buckets.entry(key).or_default().push(value);
        }
    }

    // Place `value` at `slot` within the key's bucket; a slot past the end
    // appends.
    pub(crate) fn insert_at(&mut self, key: K, slot: usize, value: V) {
        let bucket = if key.is_null() {
            &mut self.null_bucket
        } else {
            self.buckets.entry(key).or_default()
        };
        bucket.insert(slot.min(bucket.len()), value);
    }

    // Remove the value at `slot` within the key's bucket. A bucket emptied by
    // the removal is dropped from the map.
    pub(crate) fn remove_slot(&mut self, key: &K, slot: usize) -> Option<V> {
        if key.is_null() {
            return (slot < self.null_bucket.len()).then(|| self.null_bucket.remove(slot));
        }

        let bucket = self.buckets.get_mut(key)?;
        let removed = (slot < bucket.len()).then(|| bucket.remove(slot));
        if bucket.is_empty() {
            self.buckets.remove(key);
        }

        removed
    }

    // Drop every bucket, resetting to fresh containers.
    pub(crate) fn clear(&mut self) {
        self.buckets = HashMap::new();
        self.null_bucket = Vec::new();
    }
}

impl<K, V> Index<K, V>
where
    K: IndexKey,
    V: PartialEq,
{
    // Remove the first occurrence of `value` under `key`. A bucket emptied by
    // the removal is dropped from the map.
    pub(crate) fn remove_one(&mut self, key: &K, value: &V) -> bool {
        if key.is_null() {
            return remove_first(&mut self.null_bucket, value);
        }

        let Some(bucket) = self.buckets.get_mut(key) else {
            return false;
        };
        let removed = remove_first(bucket, value);
        if bucket.is_empty() {
            self.buckets.remove(key);
        }

        removed
    }
}

impl<K, V> Default for Index<K, V>
where
    K: IndexKey,
{
    fn default() -> Self {
        Self::new()
    }
}

// Bucket order is significant: two indexes are equal only when every key
// holds the same values in the same order.
impl<K, V> PartialEq for Index<K, V>
where
    K: IndexKey,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.null_bucket == other.null_bucket && self.buckets == other.buckets
    }
}

impl<K, V> Eq for Index<K, V>
where
    K: IndexKey,
    V: Eq,
{
}

/// Indexer access; a key with no values yields an empty slice.
impl<K, V> ops::Index<&K> for Index<K, V>
where
    K: IndexKey,
{
    type Output = [V];

    fn index(&self, key: &K) -> &[V] {
        self.find(key)
    }
}

fn remove_first<V: PartialEq>(bucket: &mut Vec<V>, value: &V) -> bool {
    match bucket.iter().position(|candidate| candidate == value) {
        Some(pos) => {
            bucket.remove(pos);
            true
        }
        None => false,
    }
}
