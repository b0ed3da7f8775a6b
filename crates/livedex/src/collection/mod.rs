//! `ObservableCollection`: an ordered, mutable sequence that notifies its
//! subscribers synchronously on every mutation.
//!
//! Observers are held weakly, in registration order. Every notification for
//! a public call is delivered before that call returns.

mod observer;


pub use observer::{CollectionEvent, CollectionObserver, Subscription};

use crate::{
    error::IndexError,
    key::{IndexKey, KeyExtractor},
    live::{LiveIndex, LiveUniqueIndex},
    obs::sink::{MetricsEvent, record},
};
use observer::FnObserver;
use std::{
    fmt::{self, Debug},
    mem, ops,
    rc::{Rc, Weak},
    slice,
};

///
/// ObservableCollection
///

pub struct ObservableCollection<T> {
    items: Vec<T>,
    observers: Vec<Weak<dyn CollectionObserver<T>>>,
}

impl<T> ObservableCollection<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Take ownership of `items` without notifying anyone; there are no
    /// subscribers yet.
    #[must_use]
    pub const fn from_vec(items: Vec<T>) -> Self {
        Self {
            items,
            observers: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&T> {
        self.items.get(position)
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        self.items.as_slice()
    }

    /// Number of subscribers still alive.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers
            .iter()
            .filter(|observer| observer.strong_count() > 0)
            .count()
    }

    // ------------------------------------------------------------------
    // Subscription
    // ------------------------------------------------------------------

    /// Register `observer`, held weakly: it stays subscribed for as long as
    /// the caller keeps the `Rc` alive.
    pub fn subscribe<O>(&mut self, observer: &Rc<O>)
    where
        O: CollectionObserver<T> + 'static,
    {
        let weak: Weak<O> = Rc::downgrade(observer);
        let weak: Weak<dyn CollectionObserver<T>> = weak;
        self.prune();
        self.observers.push(weak);
    }

    /// Register a closure; it receives every event until the returned
    /// `Subscription` is dropped.
    pub fn watch<F>(&mut self, f: F) -> Subscription<T>
    where
        F: Fn(CollectionEvent<'_, T>) + 'static,
        T: 'static,
    {
        let observer: Rc<dyn CollectionObserver<T>> = Rc::new(FnObserver(f));
        self.prune();
        self.observers.push(Rc::downgrade(&observer));

        Subscription::new(observer)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Append `item`, notifying `Added`.
    pub fn add(&mut self, item: T) -> Result<(), IndexError> {
        self.prune();
        self.admit(slice::from_ref(&item), None)?;

        self.push(item);

        Ok(())
    }

    /// Append every item in order, notifying one `Added` per item.
    ///
    /// The batch is admitted as a whole: if any observer rejects it, no item
    /// is appended and nothing is notified.
    pub fn add_range(&mut self, items: impl IntoIterator<Item = T>) -> Result<(), IndexError> {
        let batch: Vec<T> = items.into_iter().collect();
        if batch.is_empty() {
            return Ok(());
        }

        self.prune();
        self.admit(&batch, None)?;

        self.items.reserve(batch.len());
        for item in batch {
            self.push(item);
        }

        Ok(())
    }

    /// Insert `item` at `position`, shifting later items right.
    pub fn insert(&mut self, position: usize, item: T) -> Result<(), IndexError> {
        if position > self.items.len() {
            return Err(IndexError::out_of_bounds(position, self.items.len()));
        }

        self.prune();
        self.admit(slice::from_ref(&item), None)?;

        self.items.insert(position, item);
        self.emit_added(position);

        Ok(())
    }

    /// Overwrite the item at `position`, returning the old one.
    /// Notifies `Removed(old)` then `Added(new)`.
    pub fn set(&mut self, position: usize, item: T) -> Result<T, IndexError> {
        if position >= self.items.len() {
            return Err(IndexError::out_of_bounds(position, self.items.len()));
        }

        self.prune();
        self.admit(slice::from_ref(&item), Some(&self.items[position]))?;

        let old = mem::replace(&mut self.items[position], item);
        emit(
            &self.observers,
            CollectionEvent::Removed {
                item: &old,
                position,
            },
            &self.items,
        );
        self.emit_added(position);

        Ok(old)
    }

    /// Remove the item at `position`, notifying `Removed`.
    /// Returns `None` without notifying if `position` is out of bounds.
    pub fn remove_at(&mut self, position: usize) -> Option<T> {
        if position >= self.items.len() {
            return None;
        }

        self.prune();
        let removed = self.items.remove(position);
        emit(
            &self.observers,
            CollectionEvent::Removed {
                item: &removed,
                position,
            },
            &self.items,
        );

        Some(removed)
    }

    /// Remove every item, notifying a single `Cleared`.
    pub fn clear(&mut self) {
        let removed = self.items.len();

        self.prune();
        self.items.clear();
        emit(&self.observers, CollectionEvent::Cleared, &self.items);

        tracing::debug!(removed, "observable collection cleared");
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    // Append one already-admitted item and notify it.
    fn push(&mut self, item: T) {
        self.items.push(item);
        self.emit_added(self.items.len() - 1);
    }

    fn emit_added(&self, position: usize) {
        emit(
            &self.observers,
            CollectionEvent::Added {
                item: &self.items[position],
                position,
            },
            &self.items,
        );
    }

    fn admit(&self, incoming: &[T], displaced: Option<&T>) -> Result<(), IndexError> {
        for observer in self.observers.iter().filter_map(Weak::upgrade) {
            observer.admit(incoming, displaced)?;
        }

        Ok(())
    }

    // Forget observers whose owners have been dropped.
    fn prune(&mut self) {
        let before = self.observers.len();
        self.observers.retain(|observer| observer.strong_count() > 0);

        let pruned = before - self.observers.len();
        if pruned > 0 {
            tracing::trace!(pruned, "dropped collection observers pruned");
        }
    }
}

impl<T: PartialEq> ObservableCollection<T> {
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    /// Position of the first item equal to `item`.
    #[must_use]
    pub fn position(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|candidate| candidate == item)
    }

    /// Remove the first item equal to `item`, notifying `Removed` only if one
    /// was found.
    pub fn remove(&mut self, item: &T) -> bool {
        self.position(item)
            .and_then(|position| self.remove_at(position))
            .is_some()
    }
}

impl<T: Clone> ObservableCollection<T> {
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }
}

impl<T: Clone + 'static> ObservableCollection<T> {
    /// Attach a live non-unique index over the items themselves.
    pub fn build_index<K>(&mut self, key_fn: impl Fn(&T) -> K + 'static) -> LiveIndex<T, K, T>
    where
        K: IndexKey + 'static,
        T: PartialEq,
    {
        LiveIndex::attach(self, KeyExtractor::new(key_fn))
    }

    /// Attach a live unique index over the items themselves.
    pub fn build_unique_index<K>(
        &mut self,
        key_fn: impl Fn(&T) -> K + 'static,
    ) -> Result<LiveUniqueIndex<T, K, T>, IndexError>
    where
        K: IndexKey + Debug + 'static,
    {
        LiveUniqueIndex::attach(self, KeyExtractor::new(key_fn))
    }
}

impl<T: 'static> ObservableCollection<T> {
    pub fn build_index_with<K, V>(
        &mut self,
        key_fn: impl Fn(&T) -> K + 'static,
        value_fn: impl Fn(&T) -> V + 'static,
    ) -> LiveIndex<T, K, V>
    where
        K: IndexKey + 'static,
        V: PartialEq + 'static,
    {
        LiveIndex::attach(self, KeyExtractor::with_value(key_fn, value_fn))
    }

    pub fn build_unique_index_with<K, V>(
        &mut self,
        key_fn: impl Fn(&T) -> K + 'static,
        value_fn: impl Fn(&T) -> V + 'static,
    ) -> Result<LiveUniqueIndex<T, K, V>, IndexError>
    where
        K: IndexKey + Debug + 'static,
        V: 'static,
    {
        LiveUniqueIndex::attach(self, KeyExtractor::with_value(key_fn, value_fn))
    }
}

// Deliver one event to every live observer in registration order.
fn emit<T>(
    observers: &[Weak<dyn CollectionObserver<T>>],
    event: CollectionEvent<'_, T>,
    items: &[T],
) {
    let mut notified = 0u64;
    for observer in observers.iter().filter_map(Weak::upgrade) {
        observer.notify(event, items);
        notified += 1;
    }

    record(MetricsEvent::Notify {
        kind: event.kind(),
        observers: notified,
    });
}

impl<T> Default for ObservableCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for ObservableCollection<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T> ops::Index<usize> for ObservableCollection<T> {
    type Output = T;

    fn index(&self, position: usize) -> &T {
        &self.items[position]
    }
}

impl<'a, T> IntoIterator for &'a ObservableCollection<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Debug> Debug for ObservableCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableCollection")
            .field("items", &self.items)
            .field("observers", &self.observer_count())
            .finish()
    }
}
