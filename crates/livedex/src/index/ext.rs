use crate::{
    error::IndexError,
    index::{Index, UniqueIndex},
    key::IndexKey,
};
use std::fmt::Debug;

///
/// BuildIndexExt
///
/// Snapshot index construction on any `IntoIterator`. Live indexes over an
/// `ObservableCollection` are built from the collection itself instead.
///

pub trait BuildIndexExt: IntoIterator + Sized {
    /// Group the items themselves by `key_fn`.
    fn build_index<K>(self, key_fn: impl FnMut(&Self::Item) -> K) -> Index<K, Self::Item>
    where
        K: IndexKey,
    {
        Index::build(self, key_fn, |item| item)
    }

    fn build_index_with<K, V>(
        self,
        key_fn: impl FnMut(&Self::Item) -> K,
        value_fn: impl FnMut(Self::Item) -> V,
    ) -> Index<K, V>
    where
        K: IndexKey,
    {
        Index::build(self, key_fn, value_fn)
    }

    /// Key the items themselves by `key_fn`, failing on a repeated key.
    fn build_unique_index<K>(
        self,
        key_fn: impl FnMut(&Self::Item) -> K,
    ) -> Result<UniqueIndex<K, Self::Item>, IndexError>
    where
        K: IndexKey + Debug,
    {
        UniqueIndex::build(self, key_fn, |item| item)
    }

    fn build_unique_index_with<K, V>(
        self,
        key_fn: impl FnMut(&Self::Item) -> K,
        value_fn: impl FnMut(Self::Item) -> V,
    ) -> Result<UniqueIndex<K, V>, IndexError>
    where
        K: IndexKey + Debug,
    {
        UniqueIndex::build(self, key_fn, value_fn)
    }
}

impl<I: IntoIterator> BuildIndexExt for I {}
