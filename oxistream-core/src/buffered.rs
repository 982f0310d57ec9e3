//! Buffered byte stream with bit-granular access.
//!
//! [`BufferedByteStream`] wraps any [`ByteStream`] with a fixed-capacity
//! buffer. Small reads and writes (single bytes, single bits) are served from
//! the buffer; the underlying stream is only touched when the buffer is
//! exhausted (`underflow`) or full (`overflow`), each time with exactly one
//! call sized to the buffer capacity.
//!
//! The buffer keeps a read cursor `start` and a write cursor `end`
//! (`start <= end <= capacity`). In read mode `buffer[start..end]` holds the
//! unread bytes and `bit` counts bits already taken from `buffer[start]`. In
//! write mode `buffer[..end]` holds complete bytes waiting to be flushed and
//! `bit` counts bits already placed in the partial byte `buffer[end]`.

use crate::bitstream::{self, BitCursor, BitSink, BitSource};
use crate::error::{Result, StreamError};
use crate::traits::{ByteStream, Mode};

/// Default buffer capacity (8 KiB).
pub const DEFAULT_CAPACITY: usize = 8 * 1024;

/// A buffered wrapper around a [`ByteStream`] with bit-level I/O.
#[derive(Debug)]
pub struct BufferedByteStream<S: ByteStream> {
    inner: S,
    mode: Mode,
    buffer: Vec<u8>,
    start: usize,
    end: usize,
    bit: u8,
    /// Bytes that passed through earlier buffer generations.
    base: u64,
    eof: bool,
    closed: bool,
}

impl<S: ByteStream> BufferedByteStream<S> {
    /// Wrap `inner` with the default capacity.
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, DEFAULT_CAPACITY)
    }

    /// Wrap `inner` with a buffer of `capacity` bytes (at least 1).
    pub fn with_capacity(inner: S, capacity: usize) -> Self {
        let mode = inner.mode();
        Self {
            inner,
            mode,
            buffer: vec![0; capacity.max(1)],
            start: 0,
            end: 0,
            bit: 0,
            base: 0,
            eof: false,
            closed: false,
        }
    }

    /// Buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Get a mutable reference to the underlying stream.
    ///
    /// Bypassing the buffer while it holds data reorders bytes; callers
    /// must flush (write mode) or drain (read mode) first.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consume the wrapper and return the underlying stream.
    ///
    /// In write mode, unflushed bytes are lost; call [`Self::flush`] first.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Current bit position: bits consumed (read mode) or produced (write
    /// mode) since the wrapper was created.
    pub fn bit_position(&self) -> u64 {
        let cursor = match self.mode {
            Mode::Read => BitCursor::new(self.start, self.bit),
            Mode::Write => BitCursor::new(self.end, self.bit),
        };
        self.base * 8 + cursor.bit_offset()
    }

    /// Unread bytes held in the buffer (always 0 in write mode).
    ///
    /// Decoders use this to keep producing output without blocking on the
    /// underlying stream once the caller's minimum is met.
    pub fn available(&self) -> usize {
        match self.mode {
            Mode::Read => self.end - self.start,
            Mode::Write => 0,
        }
    }

    /// Whether the cursor is on a byte boundary.
    pub fn is_aligned(&self) -> bool {
        self.bit == 0
    }

    fn check(&self, expected: Mode, operation: &'static str) -> Result<()> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        self.mode.ensure(expected, operation)
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    /// Refill the buffer with one read of up to `capacity` bytes.
    ///
    /// Only valid when every buffered byte has been consumed. Returns
    /// `false` at end-of-data.
    pub fn underflow(&mut self) -> Result<bool> {
        self.check(Mode::Read, "read")?;
        debug_assert!(self.start == self.end, "underflow with unread bytes");

        if self.eof {
            return Ok(false);
        }

        self.base += self.end as u64;
        self.start = 0;
        self.bit = 0;
        self.end = self.inner.read(&mut self.buffer, 1)?;
        if self.end == 0 {
            self.eof = true;
        }
        Ok(self.end > 0)
    }

    /// Take one bit, or `None` at end-of-data.
    #[inline]
    pub fn get_bit(&mut self) -> Result<Option<bool>> {
        if self.start == self.end && !self.underflow()? {
            return Ok(None);
        }
        self.check(Mode::Read, "read")?;

        let cursor = BitCursor::new(self.start, self.bit);
        match bitstream::read_bit(&self.buffer[..self.end], cursor) {
            Some((bit, next)) => {
                self.start = next.byte;
                self.bit = next.bit;
                Ok(Some(bit))
            }
            None => Ok(None),
        }
    }

    /// Take one byte, or `None` at end-of-data.
    ///
    /// When the cursor is not byte-aligned the byte is assembled from the
    /// next 8 bits.
    pub fn get_byte(&mut self) -> Result<Option<u8>> {
        if self.bit != 0 {
            let mut value = 0u8;
            for taken in 0..8 {
                match self.get_bit()? {
                    Some(bit) => value = (value << 1) | u8::from(bit),
                    None if taken == 0 => return Ok(None),
                    None => return Err(StreamError::truncated("partial byte at end of data")),
                }
            }
            return Ok(Some(value));
        }

        if self.start == self.end && !self.underflow()? {
            return Ok(None);
        }
        let byte = self.buffer[self.start];
        self.start += 1;
        Ok(Some(byte))
    }

    /// Discard the unread bits of a partially consumed byte.
    pub fn align(&mut self) {
        if self.mode == Mode::Read && self.bit != 0 {
            self.start += 1;
            self.bit = 0;
        }
    }

    // ------------------------------------------------------------------
    // Write side
    // ------------------------------------------------------------------

    /// Write all complete buffered bytes to the underlying stream in one
    /// call. A partial byte stays in the buffer.
    pub fn overflow(&mut self) -> Result<()> {
        self.check(Mode::Write, "write")?;

        if self.end > 0 {
            self.inner.write(&self.buffer[..self.end])?;
            self.base += self.end as u64;
            if self.bit != 0 {
                self.buffer[0] = self.buffer[self.end];
            }
            self.end = 0;
        }
        Ok(())
    }

    /// Append one bit.
    #[inline]
    pub fn put_bit(&mut self, bit: bool) -> Result<()> {
        self.check(Mode::Write, "write")?;
        if self.end == self.buffer.len() {
            self.overflow()?;
        }

        let next = bitstream::write_bit(&mut self.buffer, BitCursor::new(self.end, self.bit), bit);
        self.end = next.byte;
        self.bit = next.bit;
        Ok(())
    }

    /// Append the low `count` bits of `value` (at most 32), MSB first.
    pub fn put_bits(&mut self, value: u32, count: u8) -> Result<()> {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");
        for shift in (0..count).rev() {
            self.put_bit((value >> shift) & 1 != 0)?;
        }
        Ok(())
    }

    /// Append one byte.
    pub fn put_byte(&mut self, byte: u8) -> Result<()> {
        if self.bit != 0 {
            return self.put_bits(u32::from(byte), 8);
        }

        self.check(Mode::Write, "write")?;
        if self.end == self.buffer.len() {
            self.overflow()?;
        }
        self.buffer[self.end] = byte;
        self.end += 1;
        Ok(())
    }

    /// Complete a partially filled byte by padding it with zero bits.
    ///
    /// Required at the end of every bit-oriented encode.
    pub fn flush_bits(&mut self) -> Result<()> {
        self.check(Mode::Write, "write")?;
        if self.bit != 0 {
            // The tail of the partial byte is already zero.
            self.end += 1;
            self.bit = 0;
        }
        Ok(())
    }

    /// Pad the final byte and write everything to the underlying stream
    /// without closing it.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_bits()?;
        self.overflow()
    }
}

impl<S: ByteStream> ByteStream for BufferedByteStream<S> {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn read(&mut self, buf: &mut [u8], min_len: usize) -> Result<usize> {
        self.check(Mode::Read, "read")?;

        let wanted = min_len.clamp(1, buf.len().max(1));
        let mut filled = 0;
        while filled < buf.len() {
            if self.bit != 0 {
                match self.get_byte()? {
                    Some(byte) => {
                        buf[filled] = byte;
                        filled += 1;
                        continue;
                    }
                    None => break,
                }
            }
            if self.start == self.end {
                // Never block for more than the caller asked for.
                if filled >= wanted || !self.underflow()? {
                    break;
                }
            }
            let n = (self.end - self.start).min(buf.len() - filled);
            buf[filled..filled + n].copy_from_slice(&self.buffer[self.start..self.start + n]);
            self.start += n;
            filled += n;
        }
        Ok(filled)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.check(Mode::Write, "write")?;

        if self.bit != 0 {
            for &byte in buf {
                self.put_bits(u32::from(byte), 8)?;
            }
            return Ok(());
        }

        let mut rest = buf;
        while !rest.is_empty() {
            if self.end == self.buffer.len() {
                self.overflow()?;
            }
            let n = (self.buffer.len() - self.end).min(rest.len());
            self.buffer[self.end..self.end + n].copy_from_slice(&rest[..n]);
            self.end += n;
            rest = &rest[n..];
        }
        Ok(())
    }

    fn is_eof(&self) -> bool {
        self.mode == Mode::Read && self.eof && self.start == self.end
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if self.mode == Mode::Write {
            self.flush()?;
        }
        self.closed = true;
        self.inner.close()
    }
}

impl<S: ByteStream> BitSink for BufferedByteStream<S> {
    #[inline]
    fn put_bit(&mut self, bit: bool) -> Result<()> {
        BufferedByteStream::put_bit(self, bit)
    }

    fn put_bits(&mut self, value: u32, count: u8) -> Result<()> {
        BufferedByteStream::put_bits(self, value, count)
    }
}

impl<S: ByteStream> BitSource for BufferedByteStream<S> {
    #[inline]
    fn get_bit(&mut self) -> Result<Option<bool>> {
        BufferedByteStream::get_bit(self)
    }
}
