//! Core traits for byte streams and transforms.
//!
//! A [`ByteStream`] is a blocking endpoint opened either for reading or for
//! writing. A [`TransformStream`] is a `ByteStream` bound to another stream
//! (its target): in [`Direction::Encode`] bytes written to it are transformed
//! and forwarded to the target, in [`Direction::Decode`] bytes read from it
//! are pulled from the target and inverse-transformed.

use crate::error::{Result, StreamError};

/// The mode a stream was opened in. Fixed for the stream's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// The stream produces bytes through [`ByteStream::read`].
    Read,
    /// The stream consumes bytes through [`ByteStream::write`].
    Write,
}

impl Mode {
    /// Fail with [`StreamError::WrongMode`] unless `self == expected`.
    #[inline]
    pub fn ensure(self, expected: Mode, operation: &'static str) -> Result<()> {
        if self == expected {
            Ok(())
        } else {
            Err(StreamError::wrong_mode(operation, self))
        }
    }
}

/// Direction of a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Transform bytes written to the stream into the target.
    Encode,
    /// Inverse-transform bytes pulled from the target.
    Decode,
}

impl Direction {
    /// The mode of both the transform and its target for this direction.
    pub fn mode(self) -> Mode {
        match self {
            Self::Encode => Mode::Write,
            Self::Decode => Mode::Read,
        }
    }

    /// Check that `target` was opened in the mode this direction needs.
    pub fn check_target<S: ByteStream + ?Sized>(self, target: &S) -> Result<()> {
        let operation = match self {
            Self::Encode => "encode into",
            Self::Decode => "decode from",
        };
        target.mode().ensure(self.mode(), operation)
    }
}

/// A blocking, mode-switched byte endpoint.
///
/// Implementations must honor the following contract:
///
/// - `read` blocks until at least `min_len` bytes were stored in `buf`
///   (`min_len` is clamped to `buf.len()`) or end-of-data is reached, and
///   returns the number of bytes stored. A return value of 0 for a non-empty
///   `buf` means end-of-data.
/// - `write` consumes all of `buf` or fails.
/// - Calling `read` on a [`Mode::Write`] stream (or `write` on a
///   [`Mode::Read`] stream) fails with [`StreamError::WrongMode`].
/// - `close` is idempotent; other operations after `close` fail with
///   [`StreamError::Closed`].
pub trait ByteStream {
    /// The mode this stream was opened in.
    fn mode(&self) -> Mode;

    /// Read between `min_len` and `buf.len()` bytes.
    fn read(&mut self, buf: &mut [u8], min_len: usize) -> Result<usize>;

    /// Write all of `buf`.
    fn write(&mut self, buf: &[u8]) -> Result<()>;

    /// Whether end-of-data has been reached (read mode only).
    fn is_eof(&self) -> bool;

    /// Finish the stream. Encode-side transforms flush pending state and
    /// write their terminator before closing their target.
    fn close(&mut self) -> Result<()>;

    /// Fill `buf` completely unless end-of-data comes first.
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize> {
        let len = buf.len();
        self.read(buf, len)
    }
}

impl<S: ByteStream + ?Sized> ByteStream for &mut S {
    fn mode(&self) -> Mode {
        (**self).mode()
    }

    fn read(&mut self, buf: &mut [u8], min_len: usize) -> Result<usize> {
        (**self).read(buf, min_len)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        (**self).write(buf)
    }

    fn is_eof(&self) -> bool {
        (**self).is_eof()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<S: ByteStream + ?Sized> ByteStream for Box<S> {
    fn mode(&self) -> Mode {
        (**self).mode()
    }

    fn read(&mut self, buf: &mut [u8], min_len: usize) -> Result<usize> {
        (**self).read(buf, min_len)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        (**self).write(buf)
    }

    fn is_eof(&self) -> bool {
        (**self).is_eof()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// A byte stream layered on top of another byte stream.
pub trait TransformStream: ByteStream {
    /// The stream this transform reads from or writes to.
    type Target: ByteStream;

    /// The direction this transform was constructed with.
    fn direction(&self) -> Direction;

    /// Borrow the target stream.
    fn target(&self) -> &Self::Target;

    /// Mutably borrow the target stream.
    fn target_mut(&mut self) -> &mut Self::Target;

    /// Complete the transform without closing the target.
    ///
    /// In encode direction this flushes buffered input, pending bits and the
    /// terminator into the target; further writes fail with
    /// [`StreamError::Closed`]. In decode direction it is a no-op. Use this
    /// when the caller wants to append data to the target after the
    /// transformed payload.
    fn finish(&mut self) -> Result<()>;

    /// Pull every byte out of `source` until its end-of-data and write it
    /// into this stream. Returns the number of bytes copied.
    fn copy_data<R: ByteStream + ?Sized>(&mut self, source: &mut R) -> Result<u64>
    where
        Self: Sized,
    {
        crate::stream::copy(source, self)
    }
}

/// Compression level for algorithms that support it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// No match search.
    pub const NONE: Self = Self(0);
    /// Fastest compression.
    pub const FAST: Self = Self(1);
    /// Default compression (balanced).
    pub const DEFAULT: Self = Self(6);
    /// Best compression (slowest).
    pub const BEST: Self = Self(9);

    /// Create a custom compression level (0-9).
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    /// Get the level value.
    pub fn level(&self) -> u8 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryStream;

    #[test]
    fn test_compression_level() {
        assert_eq!(CompressionLevel::NONE.level(), 0);
        assert_eq!(CompressionLevel::FAST.level(), 1);
        assert_eq!(CompressionLevel::DEFAULT.level(), 6);
        assert_eq!(CompressionLevel::BEST.level(), 9);

        // Test clamping
        assert_eq!(CompressionLevel::new(100).level(), 9);
    }

    #[test]
    fn test_direction_mode() {
        assert_eq!(Direction::Encode.mode(), Mode::Write);
        assert_eq!(Direction::Decode.mode(), Mode::Read);
    }

    #[test]
    fn test_check_target() {
        let sink = MemoryStream::writer();
        let source = MemoryStream::reader(b"abc".to_vec());

        assert!(Direction::Encode.check_target(&sink).is_ok());
        assert!(Direction::Decode.check_target(&source).is_ok());

        let err = Direction::Encode.check_target(&source).unwrap_err();
        assert!(matches!(
            err,
            StreamError::WrongMode {
                mode: Mode::Read,
                ..
            }
        ));
    }

    #[test]
    fn test_blanket_impls() {
        let mut source = MemoryStream::reader(b"hello".to_vec());
        {
            let mut borrowed: &mut MemoryStream = &mut source;
            let mut buf = [0u8; 2];
            assert_eq!(ByteStream::read_full(&mut borrowed, &mut buf).unwrap(), 2);
            assert_eq!(&buf, b"he");
        }

        let mut boxed: Box<dyn ByteStream> = Box::new(source);
        let mut buf = [0u8; 8];
        assert_eq!(boxed.read(&mut buf, 1).unwrap(), 3);
        assert_eq!(&buf[..3], b"llo");
        assert!(boxed.is_eof());
    }
}
