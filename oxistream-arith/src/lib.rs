//! # OxiStream-Arith: Adaptive Arithmetic Coding
//!
//! Order-0 adaptive arithmetic coding as a streaming transform. The model
//! covers the 256 byte values plus an end-of-stream symbol, so encoded
//! streams are self-terminating and carry no header.
//!
//! ## Model
//!
//! - Every symbol starts with a count of one
//! - Coding a symbol adds `increment` to its count
//! - When the total reaches `max_total`, all counts are halved (never
//!   below one); encoder and decoder do this at the same point
//!
//! ## Example
//!
//! ```rust
//! use oxistream_arith::{ArithmeticConfig, decode, encode};
//!
//! let data = b"mississippi mississippi mississippi";
//! let packed = encode(data, ArithmeticConfig::DEFAULT).unwrap();
//! assert_eq!(decode(&packed, ArithmeticConfig::DEFAULT).unwrap(), data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod codec;
mod config;
mod range_coder;

pub use codec::ArithmeticCodec;
pub use config::{ALPHABET_SIZE, ArithmeticConfig, EOS};
pub use range_coder::{MAX_PADDING_BITS, MAX_TOTAL, PRECISION, RangeDecoder, RangeEncoder};

use oxistream_core::{ByteStream, Direction, MemoryStream, Result, copy};

/// Arithmetic-encode `data`.
pub fn encode(data: &[u8], config: ArithmeticConfig) -> Result<Vec<u8>> {
    let mut encoder = ArithmeticCodec::new(MemoryStream::writer(), Direction::Encode, config)?;
    encoder.write(data)?;
    encoder.close()?;
    Ok(encoder.into_inner().into_inner())
}

/// Decode a stream produced by [`encode`].
pub fn decode(data: &[u8], config: ArithmeticConfig) -> Result<Vec<u8>> {
    let mut decoder =
        ArithmeticCodec::new(MemoryStream::reader(data.to_vec()), Direction::Decode, config)?;
    let mut sink = MemoryStream::writer_with_capacity(data.len() * 2);
    copy(&mut decoder, &mut sink)?;
    Ok(sink.into_inner())
}
