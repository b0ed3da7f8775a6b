//! `KeyedCollection`: list storage with dictionary-style access by a key
//! derived from each item.


use crate::{
    collection::ObservableCollection,
    config::IndexConfig,
    error::IndexError,
    index::UniqueIndex,
    key::{IndexKey, KeyExtractor},
    live::LiveUniqueIndex,
};
use derive_more::{Deref, DerefMut};
use std::fmt::{self, Debug};

///
/// KeyedCollection
///
/// An `ObservableCollection` paired with one `LiveUniqueIndex` over it.
/// The collection is the source of truth for order and positions; the index
/// is a derived view that every list mutation keeps current.
///
/// Derefs to the collection, so positional reads and list mutations are
/// available directly and reach external subscribers as usual.
///

#[derive(Deref, DerefMut)]
pub struct KeyedCollection<K, T> {
    #[deref]
    #[deref_mut]
    items: ObservableCollection<T>,
    index: LiveUniqueIndex<T, K, T>,
}

impl<K, T> KeyedCollection<K, T>
where
    K: IndexKey + Debug + 'static,
    T: Clone + 'static,
{
    /// Empty collection keyed by `key_fn`.
    pub fn new(key_fn: impl Fn(&T) -> K + 'static) -> Self {
        let mut items = ObservableCollection::new();
        let index = LiveUniqueIndex::observe(
            &mut items,
            UniqueIndex::new(),
            KeyExtractor::new(key_fn),
            &IndexConfig::default(),
        );

        Self { items, index }
    }

    /// Collection over `items`; fails if two items share a key.
    pub fn from_vec(
        items: Vec<T>,
        key_fn: impl Fn(&T) -> K + 'static,
    ) -> Result<Self, IndexError> {
        let mut items = ObservableCollection::from_vec(items);
        let index = LiveUniqueIndex::attach(&mut items, KeyExtractor::new(key_fn))?;

        Ok(Self { items, index })
    }

    /// Copy of the item stored under `key`.
    pub fn get(&self, key: &K) -> Result<T, IndexError> {
        self.index.find(key)
    }

    #[must_use]
    pub fn try_get(&self, key: &K) -> Option<T> {
        self.index.try_find(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains(key)
    }

    /// Remove every item matching `predicate`, one at a time, so each removal
    /// is notified on its own. Returns the number removed.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let mut removed = 0;
        let mut position = 0;

        while position < self.items.len() {
            if predicate(&self.items[position]) {
                self.items.remove_at(position);
                removed += 1;
            } else {
                position += 1;
            }
        }

        removed
    }

    /// Clear the collection, returning how many items it held.
    pub fn remove_all(&mut self) -> usize {
        let count = self.items.len();
        self.items.clear();

        count
    }

    /// The index backing key lookups.
    #[must_use]
    pub const fn index(&self) -> &LiveUniqueIndex<T, K, T> {
        &self.index
    }

    #[must_use]
    pub const fn as_collection(&self) -> &ObservableCollection<T> {
        &self.items
    }
}

impl<K, T> KeyedCollection<K, T>
where
    K: IndexKey + Debug + 'static,
    T: Clone + PartialEq + 'static,
{
    #[must_use]
    pub fn contains_value(&self, value: &T) -> bool {
        self.items.contains(value)
    }

    /// Remove the item stored under `key`; `false` if there is none.
    pub fn remove_by_key(&mut self, key: &K) -> bool {
        self.index
            .try_find(key)
            .is_some_and(|value| self.items.remove(&value))
    }

    pub fn remove_value(&mut self, value: &T) -> bool {
        self.items.remove(value)
    }
}

impl<K, T> Debug for KeyedCollection<K, T>
where
    K: Debug,
    T: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedCollection")
            .field("items", &self.items)
            .field("index", &self.index)
            .finish()
    }
}
