//! Snapshot indexes built once from a sequence.
//!
//! `Index` groups values by key (many values per key); `UniqueIndex` holds at
//! most one value per key and rejects duplicates. Both keep null-keyed values
//! apart from the key map. The live variants in `crate::live` wrap these and
//! drive the crate-private mutation methods.

mod ext;
mod multi;
mod unique;

#[cfg(test)]
mod tests;

pub use ext::BuildIndexExt;
pub use multi::Index;
pub use unique::UniqueIndex;
