//! Store configuration parameters.

use std::error::Error;
use std::fmt;

/// Configuration for an [`ArrayStore`](crate::ArrayStore) and its backend.
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum bytes of live owned storage across all arrays.
    ///
    /// Default: `usize::MAX` (bounded only by the system allocator).
    /// Copy views are owned by their callers and do not count.
    pub byte_budget: usize,

    /// Maximum number of descriptors a store may hold at once,
    /// deallocated-but-not-destroyed descriptors included.
    ///
    /// Default: 1_048_576.
    pub max_arrays: usize,
}

impl StoreConfig {
    /// Default byte budget: unbounded.
    pub const DEFAULT_BYTE_BUDGET: usize = usize::MAX;

    /// Default descriptor limit.
    pub const DEFAULT_MAX_ARRAYS: usize = 1 << 20;

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            byte_budget: Self::DEFAULT_BYTE_BUDGET,
            max_arrays: Self::DEFAULT_MAX_ARRAYS,
        }
    }

    /// Set the byte budget.
    pub fn with_byte_budget(mut self, byte_budget: usize) -> Self {
        self.byte_budget = byte_budget;
        self
    }

    /// Set the descriptor limit.
    pub fn with_max_arrays(mut self, max_arrays: usize) -> Self {
        self.max_arrays = max_arrays;
        self
    }

    /// Check that every limit admits at least one array.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_arrays == 0 {
            return Err(ConfigError {
                reason: "max_arrays must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`StoreConfig`] failed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    /// Which constraint was violated.
    pub reason: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid store config: {}", self.reason)
    }
}

impl Error for ConfigError {}
