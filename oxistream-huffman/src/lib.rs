//! # OxiStream-Huffman: Adaptive Huffman Coding
//!
//! Single-pass adaptive Huffman coding as a streaming transform. No code
//! table is transmitted: encoder and decoder start from the same model and
//! update it identically after every symbol.
//!
//! ## Model
//!
//! - Alphabet: the 256 byte values, an end-of-stream symbol and (in escape
//!   mode) an escape symbol
//! - Counts live in a bounded [`FrequencyTable`](oxistream_core::FrequencyTable);
//!   reaching `max_total` halves every count
//! - The code is a canonical Huffman code rebuilt from the counts every
//!   `rebuild_interval` updates, after every rescale and whenever a new byte
//!   enters the alphabet
//!
//! ## Example
//!
//! ```rust
//! use oxistream_huffman::{HuffmanConfig, decode, encode};
//!
//! let data = b"abracadabra abracadabra abracadabra";
//! let packed = encode(data, HuffmanConfig::DEFAULT).unwrap();
//! assert_eq!(decode(&packed, HuffmanConfig::DEFAULT).unwrap(), data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod canonical;
mod codec;
mod config;
mod model;

pub use canonical::{CanonicalCode, MAX_CODE_LENGTH, build_lengths};
pub use codec::HuffmanCodec;
pub use config::{BYTE_SYMBOLS, EOS, ESC, HuffmanConfig, MAX_TOTAL_LIMIT};
pub use model::{AdaptiveHuffman, Symbol};

use oxistream_core::{ByteStream, Direction, MemoryStream, Result, copy};

/// Huffman-encode `data`.
pub fn encode(data: &[u8], config: HuffmanConfig) -> Result<Vec<u8>> {
    let mut encoder = HuffmanCodec::new(MemoryStream::writer(), Direction::Encode, config)?;
    encoder.write(data)?;
    encoder.close()?;
    Ok(encoder.into_inner().into_inner())
}

/// Decode a stream produced by [`encode`].
pub fn decode(data: &[u8], config: HuffmanConfig) -> Result<Vec<u8>> {
    let mut decoder = HuffmanCodec::new(MemoryStream::reader(data.to_vec()), Direction::Decode, config)?;
    let mut sink = MemoryStream::writer_with_capacity(data.len() * 2);
    copy(&mut decoder, &mut sink)?;
    Ok(sink.into_inner())
}
