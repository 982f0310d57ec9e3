//! Bit-level primitives for bit-oriented coders.
//!
//! Bit positions are tracked as a [`BitCursor`]: an explicit byte offset plus
//! the number of bits already used in that byte. The free functions in this
//! module are pure functions of `(buffer, cursor)` that return the advanced
//! cursor, which keeps the cursor arithmetic testable on its own.
//!
//! # Bit Ordering
//!
//! Bits are packed MSB-first: the first bit written lands in bit 7 of a
//! byte. Canonical Huffman codes and arithmetic coder output are both
//! naturally expressed most significant bit first.
//!
//! # Example
//!
//! ```
//! use oxistream_core::bitstream::{BitCursor, read_bits, write_bits};
//!
//! let mut buf = [0u8; 2];
//! let cursor = write_bits(&mut buf, BitCursor::default(), 0b101, 3);
//! let cursor = write_bits(&mut buf, cursor, 0b1100, 4);
//! assert_eq!(cursor, BitCursor::new(0, 7));
//! assert_eq!(buf[0], 0b1011_1000);
//!
//! let (value, _) = read_bits(&buf, BitCursor::default(), 7).unwrap();
//! assert_eq!(value, 0b101_1100);
//! ```

use crate::error::{Result, StreamError};
use std::collections::VecDeque;

/// Position of a bit inside a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BitCursor {
    /// Index of the current byte.
    pub byte: usize,
    /// Bits already consumed (or produced) in the current byte, 0-7.
    pub bit: u8,
}

impl BitCursor {
    /// Create a cursor at `byte`, `bit`.
    pub const fn new(byte: usize, bit: u8) -> Self {
        Self { byte, bit }
    }

    /// Whether the cursor sits on a byte boundary.
    #[inline]
    pub fn is_aligned(&self) -> bool {
        self.bit == 0
    }

    /// Absolute bit offset from the start of the buffer.
    #[inline]
    pub fn bit_offset(&self) -> u64 {
        self.byte as u64 * 8 + self.bit as u64
    }

    /// Number of bytes touched so far (a partial byte counts as one).
    #[inline]
    pub fn bytes_used(&self) -> usize {
        self.byte + usize::from(self.bit != 0)
    }

    /// The cursor one bit further on.
    #[inline]
    pub fn advance(self) -> Self {
        if self.bit == 7 {
            Self::new(self.byte + 1, 0)
        } else {
            Self::new(self.byte, self.bit + 1)
        }
    }

    /// The next byte boundary at or after this cursor.
    #[inline]
    pub fn align_up(self) -> Self {
        if self.bit == 0 {
            self
        } else {
            Self::new(self.byte + 1, 0)
        }
    }
}

/// Read the bit at `cursor`. Returns `None` past the end of `buf`.
#[inline]
pub fn read_bit(buf: &[u8], cursor: BitCursor) -> Option<(bool, BitCursor)> {
    let byte = *buf.get(cursor.byte)?;
    let bit = (byte >> (7 - cursor.bit)) & 1 != 0;
    Some((bit, cursor.advance()))
}

/// Read `count` bits (at most 32), first bit in the most significant position.
pub fn read_bits(buf: &[u8], mut cursor: BitCursor, count: u8) -> Option<(u32, BitCursor)> {
    debug_assert!(count <= 32, "Cannot read more than 32 bits at once");

    let mut value = 0u32;
    for _ in 0..count {
        let (bit, next) = read_bit(buf, cursor)?;
        value = (value << 1) | u32::from(bit);
        cursor = next;
    }
    Some((value, cursor))
}

/// Write one bit at `cursor`.
///
/// Starting a new byte clears it first, so the unused tail of a partial byte
/// is always zero.
///
/// # Panics
///
/// Panics if `cursor.byte` is outside `buf`.
#[inline]
pub fn write_bit(buf: &mut [u8], cursor: BitCursor, bit: bool) -> BitCursor {
    if cursor.bit == 0 {
        buf[cursor.byte] = 0;
    }
    if bit {
        buf[cursor.byte] |= 0x80 >> cursor.bit;
    }
    cursor.advance()
}

/// Write the low `count` bits of `value` (at most 32), most significant first.
pub fn write_bits(buf: &mut [u8], mut cursor: BitCursor, value: u32, count: u8) -> BitCursor {
    debug_assert!(count <= 32, "Cannot write more than 32 bits at once");

    for shift in (0..count).rev() {
        cursor = write_bit(buf, cursor, (value >> shift) & 1 != 0);
    }
    cursor
}

/// A destination for individual bits.
pub trait BitSink {
    /// Append one bit.
    fn put_bit(&mut self, bit: bool) -> Result<()>;

    /// Append the low `count` bits of `value` (at most 32), MSB first.
    fn put_bits(&mut self, value: u32, count: u8) -> Result<()> {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");
        for shift in (0..count).rev() {
            self.put_bit((value >> shift) & 1 != 0)?;
        }
        Ok(())
    }
}

/// A source of individual bits.
pub trait BitSource {
    /// Take the next bit, or `None` at end-of-data.
    fn get_bit(&mut self) -> Result<Option<bool>>;

    /// Take `count` bits (at most 32), MSB first.
    ///
    /// Running out of data part-way fails with [`StreamError::Truncated`].
    fn get_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");
        let mut value = 0u32;
        for _ in 0..count {
            let bit = self
                .get_bit()?
                .ok_or_else(|| StreamError::truncated(format!("expected {count} more bits")))?;
            value = (value << 1) | u32::from(bit);
        }
        Ok(value)
    }
}

impl BitSink for Vec<bool> {
    fn put_bit(&mut self, bit: bool) -> Result<()> {
        self.push(bit);
        Ok(())
    }
}

impl BitSource for VecDeque<bool> {
    fn get_bit(&mut self) -> Result<Option<bool>> {
        Ok(self.pop_front())
    }
}

impl<T: BitSink + ?Sized> BitSink for &mut T {
    fn put_bit(&mut self, bit: bool) -> Result<()> {
        (**self).put_bit(bit)
    }
}

impl<T: BitSource + ?Sized> BitSource for &mut T {
    fn get_bit(&mut self) -> Result<Option<bool>> {
        (**self).get_bit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bit_msb_first() {
        // 0b10110101 = 0xB5
        let buf = [0xB5];
        let mut cursor = BitCursor::default();
        let mut bits = Vec::new();
        while let Some((bit, next)) = read_bit(&buf, cursor) {
            bits.push(bit as u8);
            cursor = next;
        }
        assert_eq!(bits, vec![1, 0, 1, 1, 0, 1, 0, 1]);
        assert_eq!(cursor, BitCursor::new(1, 0));
    }

    #[test]
    fn test_write_bits_across_bytes() {
        let mut buf = [0xFFu8; 3];
        let mut cursor = BitCursor::default();
        cursor = write_bits(&mut buf, cursor, 0b101, 3);
        cursor = write_bits(&mut buf, cursor, 0x3FF, 10);
        assert_eq!(cursor, BitCursor::new(1, 5));
        assert_eq!(cursor.bytes_used(), 2);
        // 101 11111 | 11111 000 (tail cleared when the byte was started)
        assert_eq!(buf[0], 0b1011_1111);
        assert_eq!(buf[1], 0b1111_1000);
    }

    #[test]
    fn test_read_bits_roundtrip() {
        let mut buf = [0u8; 8];
        let values = [(0b1u32, 1u8), (0x5A, 8), (0x1234, 13), (0, 4), (0x7FFF_FFFF, 31)];
        let mut cursor = BitCursor::default();
        for &(value, count) in &values {
            cursor = write_bits(&mut buf, cursor, value, count);
        }
        let end = cursor;

        let mut cursor = BitCursor::default();
        for &(value, count) in &values {
            let (read, next) = read_bits(&buf, cursor, count).unwrap();
            assert_eq!(read, value);
            cursor = next;
        }
        assert_eq!(cursor, end);
    }

    #[test]
    fn test_read_past_end() {
        let buf = [0xAB];
        assert!(read_bits(&buf, BitCursor::new(0, 4), 5).is_none());
        assert!(read_bit(&buf, BitCursor::new(1, 0)).is_none());
    }

    #[test]
    fn test_align_up() {
        assert_eq!(BitCursor::new(3, 0).align_up(), BitCursor::new(3, 0));
        assert_eq!(BitCursor::new(3, 1).align_up(), BitCursor::new(4, 0));
        assert_eq!(BitCursor::new(2, 6).bit_offset(), 22);
    }

    #[test]
    fn test_vec_sink_and_deque_source() {
        let mut sink: Vec<bool> = Vec::new();
        sink.put_bits(0b1101, 4).unwrap();
        sink.put_bit(false).unwrap();

        let mut source: VecDeque<bool> = sink.into_iter().collect();
        assert_eq!(source.get_bits(3).unwrap(), 0b110);
        assert_eq!(source.get_bit().unwrap(), Some(true));
        assert_eq!(source.get_bit().unwrap(), Some(false));
        assert_eq!(source.get_bit().unwrap(), None);
        assert!(matches!(
            source.get_bits(2),
            Err(StreamError::Truncated { .. })
        ));
    }
}
