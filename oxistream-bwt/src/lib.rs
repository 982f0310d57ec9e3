//! # OxiStream-BWT: Burrows-Wheeler Block Transform
//!
//! The input is cut into fixed-size blocks; each block is replaced by the
//! last column of its sorted rotations plus the row index of the original
//! block. The output is the same size as the input (plus a few header
//! bytes) but groups similar contexts together, so an entropy coder
//! stacked below it compresses much better.
//!
//! Memory is bounded by one block regardless of stream length.
//!
//! ## Example
//!
//! ```rust
//! use oxistream_bwt::{BwtConfig, decode, encode};
//!
//! let data = b"she sells sea shells by the sea shore";
//! let transformed = encode(data, BwtConfig::SMALL).unwrap();
//! assert_eq!(decode(&transformed).unwrap(), data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod bwt;
mod codec;
mod config;

pub use codec::BwtCodec;
pub use config::{BwtConfig, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE};

use oxistream_core::{ByteStream, Direction, MemoryStream, Result, copy};

/// Transform `data` block by block.
pub fn encode(data: &[u8], config: BwtConfig) -> Result<Vec<u8>> {
    let mut encoder = BwtCodec::new(MemoryStream::writer(), Direction::Encode, config)?;
    encoder.write(data)?;
    encoder.close()?;
    Ok(encoder.into_inner().into_inner())
}

/// Invert a stream produced by [`encode`].
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = BwtCodec::new(
        MemoryStream::reader(data.to_vec()),
        Direction::Decode,
        BwtConfig::DEFAULT,
    )?;
    let mut sink = MemoryStream::writer_with_capacity(data.len());
    copy(&mut decoder, &mut sink)?;
    Ok(sink.into_inner())
}
