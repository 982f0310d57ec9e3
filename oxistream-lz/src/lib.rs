//! # OxiStream-LZ: Dictionary Compression
//!
//! LZ77-style compression as a streaming transform. The encoder keeps a
//! sliding window of recent input indexed by hash chains and replaces
//! repeated byte sequences with (length, distance) back-references.
//!
//! ## Levels
//!
//! | Level | Window | Chain depth | Lazy |
//! |-------|--------|-------------|------|
//! | 0     | 4 KiB  | 0 (literals only) | no |
//! | 1-4   | 4-16 KiB | 4-32      | no   |
//! | 5-8   | 16-64 KiB | 64-1024  | yes  |
//! | 9     | 64 KiB | whole window | yes |
//!
//! ## Example
//!
//! ```rust
//! use oxistream_lz::{LzConfig, decode, encode};
//!
//! let data = b"to be or not to be, that is the question; to be or not to be";
//! let packed = encode(data, LzConfig::DEFAULT).unwrap();
//! assert!(packed.len() < data.len());
//! assert_eq!(decode(&packed).unwrap(), data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod codec;
mod config;
mod matcher;

pub use codec::LzCodec;
pub use config::{END_CODE, LzConfig, MAX_MATCH, MAX_WINDOW_BITS, MIN_MATCH, MIN_WINDOW_BITS};
pub use matcher::MatchFinder;

use oxistream_core::{ByteStream, Direction, MemoryStream, Result, copy};

/// LZ-compress `data`.
pub fn encode(data: &[u8], config: LzConfig) -> Result<Vec<u8>> {
    let mut encoder = LzCodec::new(MemoryStream::writer(), Direction::Encode, config)?;
    encoder.write(data)?;
    encoder.close()?;
    Ok(encoder.into_inner().into_inner())
}

/// Decompress a stream produced by [`encode`].
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = LzCodec::new(
        MemoryStream::reader(data.to_vec()),
        Direction::Decode,
        LzConfig::DEFAULT,
    )?;
    let mut sink = MemoryStream::writer_with_capacity(data.len() * 3);
    copy(&mut decoder, &mut sink)?;
    Ok(sink.into_inner())
}
