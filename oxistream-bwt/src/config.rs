//! BWT block configuration.

use oxistream_core::{Result, StreamError};

/// Smallest accepted block size.
pub const MIN_BLOCK_SIZE: usize = 1;

/// Largest accepted block size, 16 MiB.
pub const MAX_BLOCK_SIZE: usize = 1 << 24;

/// Block size for the Burrows-Wheeler transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BwtConfig {
    /// Bytes per block. Memory use is a small multiple of this.
    pub block_size: usize,
}

impl BwtConfig {
    /// 64 KiB blocks.
    pub const SMALL: Self = Self {
        block_size: 64 * 1024,
    };
    /// 256 KiB blocks.
    pub const DEFAULT: Self = Self {
        block_size: 256 * 1024,
    };
    /// 1 MiB blocks.
    pub const LARGE: Self = Self {
        block_size: 1024 * 1024,
    };

    /// Create a configuration with the given block size.
    pub fn new(block_size: usize) -> Result<Self> {
        let config = Self { block_size };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        check_block_size(self.block_size).map_err(StreamError::invalid_config)
    }
}

impl Default for BwtConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub(crate) fn check_block_size(block_size: usize) -> std::result::Result<(), String> {
    if (MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&block_size) {
        Ok(())
    } else {
        Err(format!(
            "block size must be {MIN_BLOCK_SIZE}..={MAX_BLOCK_SIZE}, got {block_size}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        for config in [BwtConfig::SMALL, BwtConfig::DEFAULT, BwtConfig::LARGE] {
            assert!(config.validate().is_ok());
        }
        assert_eq!(BwtConfig::default().block_size, 262_144);
    }

    #[test]
    fn test_bounds() {
        assert!(BwtConfig::new(0).is_err());
        assert!(BwtConfig::new(MAX_BLOCK_SIZE + 1).is_err());
        assert!(BwtConfig::new(7).is_ok());
    }
}
