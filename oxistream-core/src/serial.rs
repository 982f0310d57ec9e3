//! Integer serialization for stream headers and trailers.
//!
//! Two encodings are supported:
//!
//! - **Fixed**: big-endian, full width (4 bytes for `u32`, 8 for `u64`).
//! - **Compact**: unsigned LEB128, 7 data bits per byte, low group first,
//!   high bit set on every byte except the last. A `u64` takes at most
//!   10 bytes.
//!
//! Readers report a stream that ends inside a value as
//! [`StreamError::Truncated`] and an overlong or overflowing varint as
//! [`StreamError::Malformed`].

use crate::error::{Result, StreamError};
use crate::traits::ByteStream;

/// Maximum encoded size of a compact `u64`.
pub const MAX_COMPACT_LEN: usize = 10;

/// Integer encoding selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IntEncoding {
    /// Big-endian 64-bit word.
    Fixed,
    /// Variable-length LEB128.
    #[default]
    Compact,
}

/// Encode `value` as LEB128 into `out`, returning the number of bytes used.
pub fn encode_compact(mut value: u64, out: &mut [u8; MAX_COMPACT_LEN]) -> usize {
    let mut len = 0;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out[len] = byte;
            return len + 1;
        }
        out[len] = byte | 0x80;
        len += 1;
    }
}

/// Number of bytes [`encode_compact`] produces for `value`.
pub fn compact_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Decode a LEB128 value from the front of `data`.
///
/// Returns the value and the number of bytes consumed, or `None` when
/// `data` ends inside the value.
pub fn decode_compact(data: &[u8]) -> Result<Option<(u64, usize)>> {
    let mut value = 0u64;
    for (i, &byte) in data.iter().enumerate() {
        value |= decode_group(i, byte)?;
        if byte & 0x80 == 0 {
            return Ok(Some((value, i + 1)));
        }
    }
    Ok(None)
}

/// Shift the 7 data bits of the `index`-th group into place.
fn decode_group(index: usize, byte: u8) -> Result<u64> {
    let payload = u64::from(byte & 0x7F);
    if index == MAX_COMPACT_LEN - 1 && (byte & 0x80 != 0 || payload > 1) {
        return Err(StreamError::malformed(
            index as u64,
            "compact integer exceeds 64 bits",
        ));
    }
    if index > 0 && byte == 0 {
        return Err(StreamError::malformed(
            index as u64,
            "overlong compact integer (trailing zero group)",
        ));
    }
    Ok(payload << (7 * index))
}

fn read_exact<S: ByteStream + ?Sized>(stream: &mut S, buf: &mut [u8], what: &str) -> Result<()> {
    let n = stream.read_full(buf)?;
    if n < buf.len() {
        return Err(StreamError::truncated(format!(
            "{what}: expected {} bytes, got {n}",
            buf.len()
        )));
    }
    Ok(())
}

/// Write a big-endian `u32`.
pub fn write_u32<S: ByteStream + ?Sized>(stream: &mut S, value: u32) -> Result<()> {
    stream.write(&value.to_be_bytes())
}

/// Read a big-endian `u32`.
pub fn read_u32<S: ByteStream + ?Sized>(stream: &mut S) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact(stream, &mut buf, "u32")?;
    Ok(u32::from_be_bytes(buf))
}

/// Write a big-endian `u64`.
pub fn write_u64<S: ByteStream + ?Sized>(stream: &mut S, value: u64) -> Result<()> {
    stream.write(&value.to_be_bytes())
}

/// Read a big-endian `u64`.
pub fn read_u64<S: ByteStream + ?Sized>(stream: &mut S) -> Result<u64> {
    let mut buf = [0u8; 8];
    read_exact(stream, &mut buf, "u64")?;
    Ok(u64::from_be_bytes(buf))
}

/// Write a compact (LEB128) integer.
pub fn write_compact<S: ByteStream + ?Sized>(stream: &mut S, value: u64) -> Result<()> {
    let mut buf = [0u8; MAX_COMPACT_LEN];
    let len = encode_compact(value, &mut buf);
    stream.write(&buf[..len])
}

/// Read a compact (LEB128) integer one byte at a time.
pub fn read_compact<S: ByteStream + ?Sized>(stream: &mut S) -> Result<u64> {
    let mut value = 0u64;
    let mut byte = [0u8; 1];
    for i in 0..MAX_COMPACT_LEN {
        if stream.read(&mut byte, 1)? == 0 {
            return Err(StreamError::truncated(format!(
                "compact integer ended after {i} bytes"
            )));
        }
        value |= decode_group(i, byte[0])?;
        if byte[0] & 0x80 == 0 {
            return Ok(value);
        }
    }
    // decode_group rejects a continuation bit on the last allowed byte.
    Err(StreamError::malformed(
        MAX_COMPACT_LEN as u64,
        "compact integer too long",
    ))
}

/// Write `value` using `encoding`.
pub fn write_uint<S: ByteStream + ?Sized>(
    stream: &mut S,
    value: u64,
    encoding: IntEncoding,
) -> Result<()> {
    match encoding {
        IntEncoding::Fixed => write_u64(stream, value),
        IntEncoding::Compact => write_compact(stream, value),
    }
}

/// Read a value written by [`write_uint`] with the same `encoding`.
pub fn read_uint<S: ByteStream + ?Sized>(stream: &mut S, encoding: IntEncoding) -> Result<u64> {
    match encoding {
        IntEncoding::Fixed => read_u64(stream),
        IntEncoding::Compact => read_compact(stream),
    }
}
