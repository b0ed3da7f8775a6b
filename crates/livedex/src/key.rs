//! Key extraction: the `IndexKey` trait that distinguishes the null key, and
//! `KeyExtractor`, the boxed projection pair a live index keeps for its
//! whole lifetime.

use std::{fmt, hash::Hash, rc::Rc, sync::Arc};

///
/// IndexKey
///
/// A hashable key. Exactly one family of values may report itself as null;
/// those values all land in the distinguished null bucket/slot of an index
/// rather than in the key map.
///
/// Caller key types opt in with an empty impl:
///
/// ```ignore
/// impl IndexKey for OrderId {}
/// ```
///

pub trait IndexKey: Eq + Hash {
    /// Returns `true` if this key is the null key.
    fn is_null(&self) -> bool {
        false
    }
}

// All null keys are one key as far as indexes are concerned.
pub(crate) fn same_key<K: IndexKey>(a: &K, b: &K) -> bool {
    if a.is_null() || b.is_null() {
        a.is_null() && b.is_null()
    } else {
        a == b
    }
}

impl<K: IndexKey> IndexKey for Option<K> {
    fn is_null(&self) -> bool {
        self.is_none()
    }
}

impl<A: IndexKey, B: IndexKey> IndexKey for (A, B) {}
impl<A: IndexKey, B: IndexKey, C: IndexKey> IndexKey for (A, B, C) {}

macro_rules! impl_index_key {
    ($($ty:ty),* $(,)?) => {
        $(impl IndexKey for $ty {})*
    };
}

impl_index_key!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    String,
    &'static str,
    Box<str>,
    Rc<str>,
    Arc<str>,
);

///
/// KeyExtractor
///
/// Key projection plus value projection over a borrowed item. Supplied by the
/// caller; never part of the index state it feeds.
///

pub struct KeyExtractor<T, K, V> {
    key: Box<dyn Fn(&T) -> K>,
    value: Box<dyn Fn(&T) -> V>,
}

impl<T, K> KeyExtractor<T, K, T>
where
    T: Clone + 'static,
{
    /// Key by `key_fn`, storing a clone of the item itself.
    pub fn new(key_fn: impl Fn(&T) -> K + 'static) -> Self {
        Self {
            key: Box::new(key_fn),
            value: Box::new(T::clone),
        }
    }
}

impl<T, K, V> KeyExtractor<T, K, V> {
    /// Key by `key_fn`, storing `value_fn(item)` instead of the item.
    pub fn with_value(
        key_fn: impl Fn(&T) -> K + 'static,
        value_fn: impl Fn(&T) -> V + 'static,
    ) -> Self {
        Self {
            key: Box::new(key_fn),
            value: Box::new(value_fn),
        }
    }

    pub fn key_of(&self, item: &T) -> K {
        (self.key)(item)
    }

    pub fn value_of(&self, item: &T) -> V {
        (self.value)(item)
    }
}

impl<T, K, V> fmt::Debug for KeyExtractor<T, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyExtractor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_none_is_null() {
        assert!(None::<u32>.is_null());
        assert!(!Some(0u32).is_null());
        assert!(!0u32.is_null());
        assert!(!String::new().is_null());
    }

    #[test]
    fn null_keys_compare_as_one_key() {
        assert!(same_key(&None::<u8>, &None));
        assert!(!same_key(&None, &Some(0u8)));
        assert!(same_key(&Some(3u8), &Some(3)));
    }

    #[test]
    fn tuple_keys_are_never_null() {
        assert!(!(None::<u8>, 1u8).is_null());
    }

    #[test]
    fn extractor_projects_key_and_value() {
        let by_len = KeyExtractor::with_value(|s: &String| s.len(), |s: &String| s.to_uppercase());
        let item = "abc".to_string();

        assert_eq!(by_len.key_of(&item), 3);
        assert_eq!(by_len.value_of(&item), "ABC");
    }

    #[test]
    fn identity_extractor_clones_item() {
        let by_first = KeyExtractor::new(|pair: &(u8, char)| pair.0);
        assert_eq!(by_first.value_of(&(7, 'x')), (7, 'x'));
    }
}
