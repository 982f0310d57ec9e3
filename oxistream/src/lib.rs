//! # OxiStream
//!
//! Composable streaming transforms in pure Rust.
//!
//! Every codec is a [`ByteStream`] layered on another `ByteStream`, so
//! transforms stack freely: a checksum over an entropy coder over a block
//! transform, fed writes of any size.
//!
//! | Crate | Transform |
//! |-------|-----------|
//! | [`foundation`] | streams, bit I/O, serialization, CRC-32, adaptive models |
//! | [`base64`] | Base64 text encoding |
//! | [`huffman`] | adaptive Huffman coding |
//! | [`arith`] | adaptive arithmetic coding |
//! | [`lz`] | LZ dictionary compression |
//! | [`bwt`] | Burrows-Wheeler block transform |
//!
//! ## Chains
//!
//! ```rust
//! use oxistream::{Chain, decode_all, encode_all};
//!
//! let data = b"how much wood would a woodchuck chuck ".repeat(50);
//! let packed = encode_all("lz:9,huffman,crc", &data).unwrap();
//! assert!(packed.len() < data.len() / 4);
//! assert_eq!(decode_all("lz:9,huffman,crc", &packed).unwrap(), data);
//!
//! let chain: Chain = "bwt:64k,arith".parse().unwrap();
//! assert_eq!(chain.decode_all(&chain.encode_all(&data).unwrap()).unwrap(), data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod chain;
mod spec;

pub use chain::{BoxedStream, Chain, decode_all, encode_all};
pub use spec::CodecSpec;

pub use oxistream_arith as arith;
pub use oxistream_base64 as base64;
pub use oxistream_bwt as bwt;
pub use oxistream_core as foundation;
pub use oxistream_huffman as huffman;
pub use oxistream_lz as lz;

pub use oxistream_core::{
    ByteStream, CompressionLevel, Crc32, Crc32Stream, Direction, ErrorKind, MemoryStream, Mode,
    ReaderStream, Result, StreamError, TransformStream, WriterStream, copy,
};
