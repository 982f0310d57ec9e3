//! # OxiStream Core
//!
//! Core components for the OxiStream transform library.
//!
//! This crate provides the building blocks every codec is made of:
//!
//! - [`traits`]: [`ByteStream`] and [`TransformStream`], stream modes and
//!   transform directions
//! - [`stream`]: in-memory and `std::io` endpoints plus the [`copy`] driver
//! - [`bitstream`]: bit cursor arithmetic and bit sink/source traits
//! - [`buffered`]: buffered byte and bit I/O over any stream
//! - [`serial`]: fixed and compact integer encodings for headers
//! - [`crc`]: CRC-32 and the checksumming stream
//! - [`model`]: adaptive frequency tables for entropy coders
//! - [`ringbuffer`]: sliding history window for LZ decoding
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! Transforms are stacked: each one owns (or borrows) the stream it reads
//! from or writes to, and is itself a stream.
//!
//! ```text
//! caller ──write──▶ Crc32Stream ──▶ Arith ──▶ Bwt ──▶ MemoryStream
//! caller ◀──read─── Crc32Stream ◀── Arith ◀── Bwt ◀── MemoryStream
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxistream_core::crc::Crc32;
//! use oxistream_core::stream::MemoryStream;
//! use oxistream_core::traits::ByteStream;
//!
//! let mut sink = MemoryStream::writer();
//! sink.write(b"Hello, World!").unwrap();
//! assert_eq!(Crc32::compute(sink.as_slice()), 0xEC4AC3D0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod buffered;
pub mod crc;
pub mod error;
pub mod model;
pub mod ringbuffer;
pub mod serial;
pub mod stream;
pub mod traits;

// Re-exports for convenience
pub use bitstream::{BitCursor, BitSink, BitSource};
pub use buffered::BufferedByteStream;
pub use crc::{Crc32, Crc32Stream};
pub use error::{ErrorKind, Result, StreamError};
pub use model::FrequencyTable;
pub use ringbuffer::RingBuffer;
pub use serial::IntEncoding;
pub use stream::{MemoryStream, ReaderStream, WriterStream, copy};
pub use traits::{ByteStream, CompressionLevel, Direction, Mode, TransformStream};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitSink, BitSource};
    pub use crate::buffered::BufferedByteStream;
    pub use crate::crc::{Crc32, Crc32Stream};
    pub use crate::error::{Result, StreamError};
    pub use crate::stream::{MemoryStream, ReaderStream, WriterStream};
    pub use crate::traits::{ByteStream, CompressionLevel, Direction, Mode, TransformStream};
}
