//! Concrete byte stream endpoints and the generic copy driver.
//!
//! - [`MemoryStream`]: in-memory source or sink
//! - [`ReaderStream`]: read-mode adapter over any [`std::io::Read`]
//! - [`WriterStream`]: write-mode adapter over any [`std::io::Write`]
//!
//! Files and sockets enter the stream world through the two adapters; the
//! transforms never see anything but the [`ByteStream`] contract.

use crate::error::{Result, StreamError};
use crate::traits::{ByteStream, Mode};
use std::io::{self, Read, Write};

/// Chunk size used by [`copy`].
pub const COPY_CHUNK_SIZE: usize = 16 * 1024;

/// Pull every byte out of `source` until end-of-data and write it to `sink`.
///
/// Returns the number of bytes copied. The sink is not closed.
pub fn copy<R, W>(source: &mut R, sink: &mut W) -> Result<u64>
where
    R: ByteStream + ?Sized,
    W: ByteStream + ?Sized,
{
    let mut chunk = vec![0u8; COPY_CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let n = source.read(&mut chunk, 1)?;
        if n == 0 {
            break;
        }
        sink.write(&chunk[..n])?;
        total += n as u64;
    }

    tracing::trace!(bytes = total, "copy finished");
    Ok(total)
}

/// An in-memory byte stream.
///
/// A reader serves bytes from an owned buffer; a writer appends to a growable
/// buffer that can be recovered with [`MemoryStream::into_inner`].
#[derive(Debug, Clone)]
pub struct MemoryStream {
    data: Vec<u8>,
    position: usize,
    mode: Mode,
    closed: bool,
}

impl MemoryStream {
    /// Create a read-mode stream over `data`.
    pub fn reader(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            position: 0,
            mode: Mode::Read,
            closed: false,
        }
    }

    /// Create an empty write-mode stream.
    pub fn writer() -> Self {
        Self::writer_with_capacity(0)
    }

    /// Create an empty write-mode stream with preallocated capacity.
    pub fn writer_with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            position: 0,
            mode: Mode::Write,
            closed: false,
        }
    }

    /// All bytes held by the stream (written bytes for a writer, the whole
    /// source for a reader).
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Number of bytes a reader has not yet served.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Consume the stream and return its buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl ByteStream for MemoryStream {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn read(&mut self, buf: &mut [u8], _min_len: usize) -> Result<usize> {
        self.mode.ensure(Mode::Read, "read")?;
        if self.closed {
            return Err(StreamError::Closed);
        }

        // All data is present, so the request is satisfied at once.
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.position..self.position + n]);
        self.position += n;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.mode.ensure(Mode::Write, "write")?;
        if self.closed {
            return Err(StreamError::Closed);
        }
        self.data.extend_from_slice(buf);
        Ok(())
    }

    fn is_eof(&self) -> bool {
        self.mode == Mode::Read && self.position >= self.data.len()
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Read-mode adapter over a [`std::io::Read`] transport.
#[derive(Debug)]
pub struct ReaderStream<R: Read> {
    reader: R,
    eof: bool,
    closed: bool,
}

impl<R: Read> ReaderStream<R> {
    /// Wrap `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            eof: false,
            closed: false,
        }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Consume the adapter and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> ByteStream for ReaderStream<R> {
    fn mode(&self) -> Mode {
        Mode::Read
    }

    fn read(&mut self, buf: &mut [u8], min_len: usize) -> Result<usize> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        if buf.is_empty() || self.eof {
            return Ok(0);
        }

        // A zero minimum still blocks for one byte so that 0 means end-of-data.
        let wanted = min_len.clamp(1, buf.len());
        let mut filled = 0;
        while filled < wanted {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    fn write(&mut self, _buf: &[u8]) -> Result<()> {
        Err(StreamError::wrong_mode("write", Mode::Read))
    }

    fn is_eof(&self) -> bool {
        self.eof
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Write-mode adapter over a [`std::io::Write`] transport.
#[derive(Debug)]
pub struct WriterStream<W: Write> {
    writer: W,
    closed: bool,
}

impl<W: Write> WriterStream<W> {
    /// Wrap `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            closed: false,
        }
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consume the adapter and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ByteStream for WriterStream<W> {
    fn mode(&self) -> Mode {
        Mode::Write
    }

    fn read(&mut self, _buf: &mut [u8], _min_len: usize) -> Result<usize> {
        Err(StreamError::wrong_mode("read", Mode::Write))
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        self.writer.write_all(buf)?;
        Ok(())
    }

    fn is_eof(&self) -> bool {
        false
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.writer.flush()?;
        }
        Ok(())
    }
}
