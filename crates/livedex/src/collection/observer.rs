use crate::{error::IndexError, obs::sink::NotifyKind};
use std::{fmt, rc::Rc};

///
/// CollectionEvent
///
/// One mutation notification. `Added` and `Removed` carry the affected item
/// and the position it occupies (or occupied) in the collection; a clear is a
/// single `Cleared`, never one `Removed` per item.
///

pub enum CollectionEvent<'a, T> {
    Added { item: &'a T, position: usize },
    Removed { item: &'a T, position: usize },
    Cleared,
}

impl<'a, T> CollectionEvent<'a, T> {
    #[must_use]
    pub const fn kind(&self) -> NotifyKind {
        match self {
            Self::Added { .. } => NotifyKind::Added,
            Self::Removed { .. } => NotifyKind::Removed,
            Self::Cleared => NotifyKind::Cleared,
        }
    }

    /// The added or removed item; `None` for `Cleared`.
    #[must_use]
    pub const fn item(&self) -> Option<&'a T> {
        match self {
            Self::Added { item, .. } | Self::Removed { item, .. } => Some(*item),
            Self::Cleared => None,
        }
    }
}

impl<T> Clone for CollectionEvent<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CollectionEvent<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for CollectionEvent<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { item, position } => f
                .debug_struct("Added")
                .field("item", item)
                .field("position", position)
                .finish(),
            Self::Removed { item, position } => f
                .debug_struct("Removed")
                .field("item", item)
                .field("position", position)
                .finish(),
            Self::Cleared => f.write_str("Cleared"),
        }
    }
}

///
/// CollectionObserver
///
/// Subscriber to an `ObservableCollection`.
///
/// `admit` runs before an adding mutation touches the collection and may veto
/// it; `notify` runs after the mutation has taken effect and cannot fail.
/// A vetoed mutation leaves the collection unchanged and notifies nobody.
///
/// `notify` also receives the collection contents as they stand when the
/// event is delivered. Items before the event's position are exactly those
/// that preceded the affected item when it was added or removed.
///

pub trait CollectionObserver<T> {
    /// Validate `incoming` items. `displaced` is the item being overwritten
    /// by a positional set, if any.
    fn admit(&self, incoming: &[T], displaced: Option<&T>) -> Result<(), IndexError> {
        let _ = (incoming, displaced);
        Ok(())
    }

    fn notify(&self, event: CollectionEvent<'_, T>, items: &[T]);
}

// Closure observers registered through `ObservableCollection::watch`.
pub(crate) struct FnObserver<F>(pub(crate) F);

impl<T, F> CollectionObserver<T> for FnObserver<F>
where
    F: Fn(CollectionEvent<'_, T>),
{
    fn notify(&self, event: CollectionEvent<'_, T>, _: &[T]) {
        (self.0)(event);
    }
}

///
/// Subscription
///
/// Keeps a `watch` closure registered. Dropping it unsubscribes; the
/// collection forgets the dead entry on its next mutation.
///

#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription<T> {
    _observer: Rc<dyn CollectionObserver<T>>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(observer: Rc<dyn CollectionObserver<T>>) -> Self {
        Self {
            _observer: observer,
        }
    }

    /// Explicitly end the subscription.
    pub fn unsubscribe(self) {}
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
