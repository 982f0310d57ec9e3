//! Textual codec descriptors.
//!
//! A descriptor is a codec name with an optional `:` parameter:
//!
//! | Descriptor | Codec |
//! |------------|-------|
//! | `crc` | CRC-32 passthrough with a 4-byte trailer |
//! | `base64`, `base64:url`, `base64:mime` | Base64 text encoding |
//! | `huffman`, `huffman:fast`, `huffman:best`, `huffman:escape` | adaptive Huffman |
//! | `arith`, `arith:fast` | adaptive arithmetic coding |
//! | `lz`, `lz:0` .. `lz:9` | LZ dictionary compression |
//! | `bwt`, `bwt:64k`, `bwt:1m`, `bwt:<bytes>` | Burrows-Wheeler block transform |

use oxistream_arith::ArithmeticConfig;
use oxistream_base64::Base64Config;
use oxistream_bwt::BwtConfig;
use oxistream_core::{CompressionLevel, Result, StreamError};
use oxistream_huffman::HuffmanConfig;
use oxistream_lz::LzConfig;
use std::fmt;
use std::str::FromStr;

/// One transform in a chain, with its configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecSpec {
    /// CRC-32 checksum trailer.
    Crc,
    /// Base64 text encoding.
    Base64(Base64Config),
    /// Adaptive Huffman coding.
    Huffman(HuffmanConfig),
    /// Adaptive arithmetic coding.
    Arith(ArithmeticConfig),
    /// LZ compression at a level.
    Lz(u8),
    /// Burrows-Wheeler block transform.
    Bwt(BwtConfig),
}

impl CodecSpec {
    /// The codec's short name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Crc => "crc",
            Self::Base64(_) => "base64",
            Self::Huffman(_) => "huffman",
            Self::Arith(_) => "arith",
            Self::Lz(_) => "lz",
            Self::Bwt(_) => "bwt",
        }
    }

    /// LZ configuration for an `Lz` descriptor.
    pub fn lz_config(level: u8) -> LzConfig {
        LzConfig::from_level(CompressionLevel::new(level))
    }

    /// Check the configuration carried by this descriptor.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Crc => Ok(()),
            Self::Base64(config) => config.validate(),
            Self::Huffman(config) => config.validate(),
            Self::Arith(config) => config.validate(),
            Self::Lz(level) if *level <= 9 => Ok(()),
            Self::Lz(level) => Err(StreamError::invalid_config(format!(
                "lz level must be 0-9, got {level}"
            ))),
            Self::Bwt(config) => config.validate(),
        }
    }
}

fn parse_size(text: &str) -> Option<usize> {
    let lower = text.to_ascii_lowercase();
    let (digits, unit) = if let Some(digits) = lower.strip_suffix('k') {
        (digits.to_string(), 1024)
    } else if let Some(digits) = lower.strip_suffix('m') {
        (digits.to_string(), 1024 * 1024)
    } else {
        (lower, 1)
    };
    digits.parse::<usize>().ok()?.checked_mul(unit)
}

impl FromStr for CodecSpec {
    type Err = StreamError;

    fn from_str(text: &str) -> Result<Self> {
        let text = text.trim();
        let (name, param) = match text.split_once(':') {
            Some((name, param)) => (name, Some(param)),
            None => (text, None),
        };
        let bad_param = |param: &str| {
            StreamError::invalid_config(format!("unknown {name} parameter `{param}`"))
        };

        let spec = match (name.to_ascii_lowercase().as_str(), param) {
            ("crc" | "crc32", None) => Self::Crc,
            ("base64", None) => Self::Base64(Base64Config::STANDARD),
            ("base64", Some("url")) => Self::Base64(Base64Config::URL_SAFE),
            ("base64", Some("mime")) => Self::Base64(Base64Config::MIME),
            ("huffman", None) => Self::Huffman(HuffmanConfig::DEFAULT),
            ("huffman", Some("fast")) => Self::Huffman(HuffmanConfig::FAST),
            ("huffman", Some("best")) => Self::Huffman(HuffmanConfig::BEST),
            ("huffman", Some("escape")) => Self::Huffman(HuffmanConfig {
                escape: true,
                ..HuffmanConfig::DEFAULT
            }),
            ("arith", None) => Self::Arith(ArithmeticConfig::DEFAULT),
            ("arith", Some("fast")) => Self::Arith(ArithmeticConfig::FAST_ADAPT),
            ("lz", None) => Self::Lz(CompressionLevel::DEFAULT.level()),
            ("lz", Some(level)) => Self::Lz(level.parse().map_err(|_| bad_param(level))?),
            ("bwt", None) => Self::Bwt(BwtConfig::DEFAULT),
            ("bwt", Some(size)) => Self::Bwt(BwtConfig {
                block_size: parse_size(size).ok_or_else(|| bad_param(size))?,
            }),
            (
                "crc" | "crc32" | "base64" | "huffman" | "arith",
                Some(param),
            ) => return Err(bad_param(param)),
            _ => {
                return Err(StreamError::invalid_config(format!(
                    "unknown codec `{text}`"
                )));
            }
        };
        spec.validate()?;
        Ok(spec)
    }
}

impl fmt::Display for CodecSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crc => write!(f, "crc"),
            Self::Base64(config) if *config == Base64Config::URL_SAFE => write!(f, "base64:url"),
            Self::Base64(config) if *config == Base64Config::MIME => write!(f, "base64:mime"),
            Self::Base64(_) => write!(f, "base64"),
            Self::Huffman(config) if *config == HuffmanConfig::FAST => write!(f, "huffman:fast"),
            Self::Huffman(config) if *config == HuffmanConfig::BEST => write!(f, "huffman:best"),
            Self::Huffman(config) if config.escape => write!(f, "huffman:escape"),
            Self::Huffman(_) => write!(f, "huffman"),
            Self::Arith(config) if *config == ArithmeticConfig::FAST_ADAPT => {
                write!(f, "arith:fast")
            }
            Self::Arith(_) => write!(f, "arith"),
            Self::Lz(level) => write!(f, "lz:{level}"),
            Self::Bwt(config) if config.block_size % (1024 * 1024) == 0 => {
                write!(f, "bwt:{}m", config.block_size / (1024 * 1024))
            }
            Self::Bwt(config) if config.block_size % 1024 == 0 => {
                write!(f, "bwt:{}k", config.block_size / 1024)
            }
            Self::Bwt(config) => write!(f, "bwt:{}", config.block_size),
        }
    }
}
