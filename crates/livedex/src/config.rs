use serde::{Deserialize, Serialize};

///
/// IndexConfig
///
/// Per-index tuning knobs. Every builder that does not take a config uses
/// `IndexConfig::default()`.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Number of distinct keys to reserve room for up front.
    pub capacity: usize,

    /// Emit metrics events for this index.
    pub metrics: bool,
}

impl IndexConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            capacity: 0,
            metrics: true,
        }
    }

    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use]
    pub const fn without_metrics(mut self) -> Self {
        self.metrics = false;
        self
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new()
    }
}
