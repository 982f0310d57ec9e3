//! # OxiStream-Base64: Streaming Base64
//!
//! Byte-to-text transform over any [`ByteStream`](oxistream_core::ByteStream).
//!
//! ## Features
//!
//! - **Standard** (`+/`) and **URL-safe** (`-_`) alphabets
//! - **MIME** line wrapping with CRLF separators
//! - Writes of any size; partial groups carry over between calls
//! - Padded and unpadded input accepted on decode
//!
//! ## Example
//!
//! ```rust
//! use oxistream_base64::{Base64Config, decode, encode};
//!
//! let text = encode(b"Man", Base64Config::STANDARD).unwrap();
//! assert_eq!(text, b"TWFu");
//! assert_eq!(decode(b"TQ==", Base64Config::STANDARD).unwrap(), b"M");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod codec;
mod config;

pub use codec::Base64Codec;
pub use config::{Alphabet, Base64Config, PAD};

use oxistream_core::{ByteStream, Direction, MemoryStream, Result, copy};

/// Encode `data` to Base64 text.
pub fn encode(data: &[u8], config: Base64Config) -> Result<Vec<u8>> {
    let sink = MemoryStream::writer_with_capacity(config.encoded_len(data.len()));
    let mut encoder = Base64Codec::new(sink, Direction::Encode, config)?;
    encoder.write(data)?;
    encoder.close()?;
    Ok(encoder.into_inner().into_inner())
}

/// Decode Base64 `text`.
pub fn decode(text: &[u8], config: Base64Config) -> Result<Vec<u8>> {
    let source = MemoryStream::reader(text.to_vec());
    let mut decoder = Base64Codec::new(source, Direction::Decode, config)?;
    let mut sink = MemoryStream::writer_with_capacity(text.len() / 4 * 3 + 3);
    copy(&mut decoder, &mut sink)?;
    Ok(sink.into_inner())
}
