//! Adaptive Huffman configuration.

use oxistream_core::{Result, StreamError};

/// Number of byte symbols.
pub const BYTE_SYMBOLS: usize = 256;
/// End-of-stream symbol.
pub const EOS: usize = 256;
/// Escape symbol, present only in escape mode.
pub const ESC: usize = 257;

/// Largest allowed `max_total`. Keeps every code length below 32 bits.
pub const MAX_TOTAL_LIMIT: u32 = 1 << 20;

/// Adaptive Huffman configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuffmanConfig {
    /// Ceiling on the sum of symbol counts. Reaching it halves all counts.
    pub max_total: u32,
    /// Start with only EOS and ESC active; unseen bytes are sent raw after
    /// ESC.
    pub escape: bool,
    /// Rebuild the code every this many updates (1 = after every symbol).
    pub rebuild_interval: u32,
}

impl HuffmanConfig {
    /// Rebuild rarely. Cheapest per byte.
    pub const FAST: Self = Self {
        max_total: 1 << 16,
        escape: false,
        rebuild_interval: 256,
    };

    /// Balanced default.
    pub const DEFAULT: Self = Self {
        max_total: 1 << 16,
        escape: false,
        rebuild_interval: 16,
    };

    /// Rebuild after every symbol, with escape coding for sparse alphabets.
    pub const BEST: Self = Self {
        max_total: 1 << 16,
        escape: true,
        rebuild_interval: 1,
    };

    /// Create a configuration.
    pub fn new(max_total: u32, escape: bool, rebuild_interval: u32) -> Result<Self> {
        let config = Self {
            max_total,
            escape,
            rebuild_interval,
        };
        config.validate()?;
        Ok(config)
    }

    /// Number of symbols in the model alphabet.
    pub fn alphabet_size(&self) -> usize {
        if self.escape { ESC + 1 } else { EOS + 1 }
    }

    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.rebuild_interval == 0 {
            return Err(StreamError::invalid_config("rebuild interval must be at least 1"));
        }
        if self.max_total > MAX_TOTAL_LIMIT {
            return Err(StreamError::invalid_config(format!(
                "max_total {} exceeds {MAX_TOTAL_LIMIT}",
                self.max_total
            )));
        }
        let floor = self.alphabet_size() as u32 * 2;
        if self.max_total < floor {
            return Err(StreamError::invalid_config(format!(
                "max_total {} below {floor}",
                self.max_total
            )));
        }
        Ok(())
    }
}

impl Default for HuffmanConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for config in [HuffmanConfig::FAST, HuffmanConfig::DEFAULT, HuffmanConfig::BEST] {
            assert!(config.validate().is_ok());
        }
        assert_eq!(HuffmanConfig::DEFAULT.alphabet_size(), 257);
        assert_eq!(HuffmanConfig::BEST.alphabet_size(), 258);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(HuffmanConfig::new(1 << 16, false, 0).is_err());
        assert!(HuffmanConfig::new(MAX_TOTAL_LIMIT + 1, false, 1).is_err());
        assert!(HuffmanConfig::new(300, false, 1).is_err());
        assert!(HuffmanConfig::new(1024, true, 8).is_ok());
    }
}
