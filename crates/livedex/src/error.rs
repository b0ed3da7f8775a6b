use std::fmt::Debug;
use thiserror::Error as ThisError;

///
/// IndexError
///
/// Failures surfaced by index construction, unique lookups, and collection
/// mutations. All failures are synchronous and returned to the immediate
/// caller; nothing is retried or swallowed.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum IndexError {
    /// A unique index already holds a value for this key.
    #[error("duplicate key in unique index: {key}")]
    DuplicateKey { key: String },

    /// A unique index holds no value for this key.
    #[error("key not found in unique index: {key}")]
    KeyNotFound { key: String },

    #[error("position {position} out of bounds for collection of length {len}")]
    PositionOutOfBounds { position: usize, len: usize },
}

impl IndexError {
    pub(crate) fn duplicate_key(key: &impl Debug) -> Self {
        Self::DuplicateKey {
            key: format!("{key:?}"),
        }
    }

    pub(crate) fn key_not_found(key: &impl Debug) -> Self {
        Self::KeyNotFound {
            key: format!("{key:?}"),
        }
    }

    pub(crate) const fn out_of_bounds(position: usize, len: usize) -> Self {
        Self::PositionOutOfBounds { position, len }
    }

    /// Returns `true` for duplicate-key rejections.
    #[must_use]
    pub const fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }

    /// Returns `true` for missing-key lookups.
    #[must_use]
    pub const fn is_key_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_message_renders_debug_key() {
        let err = IndexError::duplicate_key(&"alpha");
        assert!(err.is_duplicate_key());
        assert_eq!(err.to_string(), "duplicate key in unique index: \"alpha\"");
    }

    #[test]
    fn null_key_renders_as_none() {
        let err = IndexError::key_not_found(&None::<u32>);
        assert!(err.is_key_not_found());
        assert_eq!(err.to_string(), "key not found in unique index: None");
    }
}
