//! Construction-time sizing for `HashChain`.

use crate::error::BuildError;

/// Bucket count used when none is given.
pub const DEFAULT_BUCKETS: usize = 2;

/// Longest key, in bytes, kept by the map. Longer keys are truncated.
pub const DEFAULT_MAX_KEY_LEN: usize = 1023;

/// Fixed parameters of a map. Neither value changes after construction.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MapConfig {
    pub buckets: usize,
    pub max_key_len: usize,
}

impl MapConfig {
    pub fn new() -> Self {
        Self {
            buckets: DEFAULT_BUCKETS,
            max_key_len: DEFAULT_MAX_KEY_LEN,
        }
    }

    pub fn with_buckets(mut self, buckets: usize) -> Self {
        self.buckets = buckets;
        self
    }

    pub fn with_max_key_len(mut self, max_key_len: usize) -> Self {
        self.max_key_len = max_key_len;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), BuildError> {
        if self.buckets == 0 {
            return Err(BuildError::ZeroBuckets);
        }
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new()
    }
}
