//! In-memory secondary indexes over item collections.
//!
//! Snapshot indexes (`Index`, `UniqueIndex`) are built once from any
//! sequence. Live indexes (`LiveIndex`, `LiveUniqueIndex`) attach to an
//! `ObservableCollection` and stay consistent with it as items are added,
//! removed, or cleared. `KeyedCollection` pairs a collection with one live
//! unique index for list-plus-dictionary access.
//!
//! Everything here is single-threaded: a collection and the indexes attached
//! to it are owned by one logical thread, and every mutation finishes
//! updating its indexes before it returns.
#![warn(unreachable_pub)]

pub mod collection;
pub mod config;
pub mod error;
pub mod index;
pub mod key;
pub mod keyed;
pub mod live;
pub mod obs;

///
/// Prelude
///
/// Domain vocabulary only; errors and metrics stay behind their modules.
///

pub mod prelude {
    pub use crate::{
        collection::{CollectionEvent, ObservableCollection},
        index::{BuildIndexExt, Index, UniqueIndex},
        key::{IndexKey, KeyExtractor},
        keyed::KeyedCollection,
        live::{LiveIndex, LiveUniqueIndex},
    };
}
