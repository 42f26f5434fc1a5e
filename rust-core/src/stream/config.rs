//! Engine configuration

use crate::error::EngineError;

/// Default block length in samples
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

/// Streaming engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Block length N (number of samples per FFT, must be power of 2)
    pub block_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl EngineConfig {
    /// Create config with a custom block size
    pub fn with_block_size(block_size: usize) -> Self {
        Self { block_size }
    }

    /// Check that the block can be split into four non-empty quarters
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.block_size < 4 || !self.block_size.is_power_of_two() {
            return Err(EngineError::InvalidBlockSize(self.block_size));
        }
        Ok(())
    }

    /// Length of one quarter-block (the filter mask length)
    pub fn quarter(&self) -> usize {
        self.block_size / 4
    }
}
