//! LZ compression configuration.

use oxistream_core::{CompressionLevel, Result, StreamError};

/// Minimum match length.
pub const MIN_MATCH: usize = 3;

/// Maximum match length (length code 254).
pub const MAX_MATCH: usize = 257;

/// Length code reserved for the end-of-stream marker.
pub const END_CODE: u32 = 255;

/// Smallest supported window, 256 bytes.
pub const MIN_WINDOW_BITS: u8 = 8;

/// Largest supported window, 16 MiB.
pub const MAX_WINDOW_BITS: u8 = 24;

/// Window size, search depth and match policy for the LZ encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzConfig {
    /// Log2 of the history window. Distances are coded in this many bits.
    pub window_bits: u8,
    /// Hash chain entries examined per position. Zero disables matching.
    pub max_chain: usize,
    /// Defer a match by one byte when the next position matches longer.
    pub lazy: bool,
}

impl LzConfig {
    /// Level 0: literals only.
    pub const STORE: Self = Self::from_level_value(0);
    /// Level 1.
    pub const FAST: Self = Self::from_level_value(1);
    /// Level 6.
    pub const DEFAULT: Self = Self::from_level_value(6);
    /// Level 9: largest window, exhaustive chain search.
    pub const BEST: Self = Self::from_level_value(9);

    const fn from_level_value(level: u8) -> Self {
        let (window_bits, max_chain, lazy) = match level {
            0 => (12, 0, false),
            1 => (12, 4, false),
            2 => (13, 8, false),
            3 => (13, 16, false),
            4 => (14, 32, false),
            5 => (14, 64, true),
            6 => (15, 128, true),
            7 => (15, 256, true),
            8 => (16, 1024, true),
            _ => (16, 1 << 16, true),
        };
        Self {
            window_bits,
            max_chain,
            lazy,
        }
    }

    /// Settings for a compression level (0-9).
    pub fn from_level(level: CompressionLevel) -> Self {
        Self::from_level_value(level.level())
    }

    /// Create a custom configuration.
    pub fn new(window_bits: u8, max_chain: usize, lazy: bool) -> Result<Self> {
        let config = Self {
            window_bits,
            max_chain,
            lazy,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        check_window_bits(self.window_bits)
            .map_err(StreamError::invalid_config)
    }

    /// History window size in bytes.
    pub fn window_size(&self) -> usize {
        1 << self.window_bits
    }
}

impl Default for LzConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<CompressionLevel> for LzConfig {
    fn from(level: CompressionLevel) -> Self {
        Self::from_level(level)
    }
}

/// Range check shared by the constructor and the header parser.
pub(crate) fn check_window_bits(window_bits: u8) -> std::result::Result<(), String> {
    if (MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window_bits) {
        Ok(())
    } else {
        Err(format!(
            "window bits must be {MIN_WINDOW_BITS}..={MAX_WINDOW_BITS}, got {window_bits}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(LzConfig::from_level(CompressionLevel::NONE).max_chain, 0);
        assert!(!LzConfig::FAST.lazy);
        assert!(LzConfig::DEFAULT.lazy);
        assert_eq!(LzConfig::BEST.window_size(), 65536);

        let mut previous = LzConfig::STORE;
        for level in 1..=9 {
            let config = LzConfig::from_level(CompressionLevel::new(level));
            assert!(config.validate().is_ok());
            assert!(config.max_chain > previous.max_chain);
            assert!(config.window_bits >= previous.window_bits);
            previous = config;
        }
    }

    #[test]
    fn test_window_bounds() {
        assert!(LzConfig::new(7, 4, false).is_err());
        assert!(LzConfig::new(25, 4, false).is_err());
        assert!(LzConfig::new(8, 0, false).is_ok());
        assert!(LzConfig::new(24, 16, true).is_ok());
    }
}
