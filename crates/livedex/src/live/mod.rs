//! Live indexes: snapshot indexes kept consistent with an
//! `ObservableCollection` by applying each mutation event incrementally.
//!
//! A live index is a cheap, cloneable handle. The collection holds only a
//! weak reference to the index state, so dropping every handle detaches the
//! index; dropping the collection simply freezes it.
//!
//! Reads return owned copies of keys' values; nothing borrowed from an index
//! outlives the read, so a collection can always be mutated afterwards.

mod multi;
mod unique;


pub use multi::LiveIndex;
pub use unique::LiveUniqueIndex;
