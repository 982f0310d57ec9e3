//! Adaptive arithmetic coder configuration.

use crate::range_coder::MAX_TOTAL;
use oxistream_core::{Result, StreamError};

/// Symbols in the model: 256 bytes plus end-of-stream.
pub const ALPHABET_SIZE: usize = 257;
/// End-of-stream symbol.
pub const EOS: usize = 256;

/// Adaptive arithmetic coder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArithmeticConfig {
    /// Amount added to a symbol's count each time it is coded.
    pub increment: u32,
    /// Ceiling on the sum of counts. Reaching it halves all counts.
    pub max_total: u32,
}

impl ArithmeticConfig {
    /// Balanced adaptation speed and precision.
    pub const DEFAULT: Self = Self {
        increment: 32,
        max_total: MAX_TOTAL,
    };

    /// Forget old statistics quickly; suits data whose distribution drifts.
    pub const FAST_ADAPT: Self = Self {
        increment: 32,
        max_total: 1 << 13,
    };

    /// Create a configuration.
    pub fn new(increment: u32, max_total: u32) -> Result<Self> {
        let config = Self {
            increment,
            max_total,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.increment == 0 {
            return Err(StreamError::invalid_config("increment must be at least 1"));
        }
        if self.max_total > MAX_TOTAL {
            return Err(StreamError::invalid_config(format!(
                "max_total {} exceeds coder precision limit {MAX_TOTAL}",
                self.max_total
            )));
        }
        let floor = ALPHABET_SIZE as u32 + self.increment;
        if self.max_total < floor {
            return Err(StreamError::invalid_config(format!(
                "max_total {} below {floor} (alphabet plus one increment)",
                self.max_total
            )));
        }
        Ok(())
    }
}

impl Default for ArithmeticConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
