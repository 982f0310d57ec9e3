//! CRC-32 checksum and the checksumming pass-through stream.
//!
//! [`Crc32`] is the standard reflected CRC-32 (polynomial 0xEDB88320,
//! register initialized to all ones, final one's complement). Updates are
//! incremental: feeding `a` then `b` gives the same value as feeding `a‖b`.
//!
//! [`Crc32Stream`] accumulates the checksum over every byte that flows
//! through it. With a trailer enabled the encoder appends the value as a
//! big-endian `u32` and the decoder checks it.
//!
//! ## Performance
//!
//! Inputs of 16 bytes or more go through a slicing-by-8 loop that folds
//! eight bytes per step using eight precomputed tables; shorter inputs use
//! the single-table byte loop.

use crate::error::{Result, StreamError};
use crate::serial;
use crate::traits::{ByteStream, Direction, Mode, TransformStream};

const CRC32_POLY: u32 = 0xEDB8_8320;

/// CRC-32 lookup table (polynomial 0xEDB88320, reflected).
const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0usize;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ CRC32_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// Slicing-by-8 tables. Table `t` advances a byte through `t` further
/// zero bytes.
const CRC32_TABLE_SLICE: [[u32; 256]; 8] = {
    let mut tables = [[0u32; 256]; 8];
    tables[0] = CRC32_TABLE;

    let mut t = 1;
    while t < 8 {
        let mut i = 0usize;
        while i < 256 {
            let prev = tables[t - 1][i];
            tables[t][i] = CRC32_TABLE[(prev & 0xFF) as usize] ^ (prev >> 8);
            i += 1;
        }
        t += 1;
    }
    tables
};

/// CRC-32 calculator.
///
/// # Example
///
/// ```
/// use oxistream_core::crc::Crc32;
///
/// let mut crc = Crc32::new();
/// crc.update(b"Hello, World!");
/// assert_eq!(crc.finalize(), 0xEC4AC3D0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc32 {
    register: u32,
}

impl Crc32 {
    /// Create a new CRC-32 calculator.
    pub const fn new() -> Self {
        Self {
            register: 0xFFFF_FFFF,
        }
    }

    /// Reset to the initial state.
    pub fn reset(&mut self) {
        self.register = 0xFFFF_FFFF;
    }

    /// Feed one byte.
    #[inline(always)]
    pub fn update_byte(&mut self, byte: u8) {
        let index = ((self.register ^ u32::from(byte)) & 0xFF) as usize;
        self.register = CRC32_TABLE[index] ^ (self.register >> 8);
    }

    /// Feed a slice.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        if data.len() >= 16 {
            self.update_slice8(data);
        } else {
            for &byte in data {
                self.update_byte(byte);
            }
        }
    }

    fn update_slice8(&mut self, data: &[u8]) {
        let mut c = self.register;
        let mut chunks = data.chunks_exact(8);

        for bytes in &mut chunks {
            let folded = c ^ u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            c = CRC32_TABLE_SLICE[7][(folded & 0xFF) as usize]
                ^ CRC32_TABLE_SLICE[6][((folded >> 8) & 0xFF) as usize]
                ^ CRC32_TABLE_SLICE[5][((folded >> 16) & 0xFF) as usize]
                ^ CRC32_TABLE_SLICE[4][(folded >> 24) as usize]
                ^ CRC32_TABLE_SLICE[3][bytes[4] as usize]
                ^ CRC32_TABLE_SLICE[2][bytes[5] as usize]
                ^ CRC32_TABLE_SLICE[1][bytes[6] as usize]
                ^ CRC32_TABLE_SLICE[0][bytes[7] as usize];
        }

        self.register = c;
        for &byte in chunks.remainder() {
            self.update_byte(byte);
        }
    }

    /// Checksum of everything fed so far.
    #[inline(always)]
    pub fn value(&self) -> u32 {
        !self.register
    }

    /// Consume the calculator and return the checksum.
    #[inline(always)]
    pub fn finalize(self) -> u32 {
        self.value()
    }

    /// Compute the CRC-32 of `data` in one call.
    #[inline]
    pub fn compute(data: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(data);
        crc.finalize()
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Size of the trailer in bytes.
pub const TRAILER_LEN: usize = 4;

const REFILL_SIZE: usize = 8 * 1024;

/// Pass-through stream that checksums the bytes flowing through it.
///
/// In [`Direction::Encode`] every written byte is forwarded to the target;
/// [`TransformStream::finish`] appends the checksum when the trailer is
/// enabled. In [`Direction::Decode`] bytes are pulled from the target; with
/// a trailer the final four bytes of the target are withheld, and reaching
/// end-of-data (or calling [`Crc32Stream::verify`]) compares them with the
/// recomputed value.
///
/// ```
/// use oxistream_core::crc::Crc32Stream;
/// use oxistream_core::stream::MemoryStream;
/// use oxistream_core::traits::{ByteStream, Direction};
///
/// let mut enc = Crc32Stream::with_trailer(MemoryStream::writer(), Direction::Encode).unwrap();
/// enc.write(b"123456789").unwrap();
/// enc.close().unwrap();
/// let framed = enc.into_inner().into_inner();
/// assert_eq!(&framed[9..], &0xCBF43926u32.to_be_bytes());
///
/// let mut dec = Crc32Stream::with_trailer(MemoryStream::reader(framed), Direction::Decode).unwrap();
/// let mut out = [0u8; 16];
/// assert_eq!(dec.read_full(&mut out).unwrap(), 9);
/// assert_eq!(dec.verify().unwrap(), 0xCBF43926);
/// ```
#[derive(Debug)]
pub struct Crc32Stream<S: ByteStream> {
    target: S,
    direction: Direction,
    crc: Crc32,
    trailer: bool,
    /// Decode side: bytes read from the target but not yet released.
    staging: Vec<u8>,
    target_eof: bool,
    verified: bool,
    finished: bool,
    closed: bool,
}

impl<S: ByteStream> Crc32Stream<S> {
    /// Checksum without a trailer.
    pub fn new(target: S, direction: Direction) -> Result<Self> {
        Self::build(target, direction, false)
    }

    /// Checksum with a 4-byte trailer appended on encode and checked on
    /// decode.
    pub fn with_trailer(target: S, direction: Direction) -> Result<Self> {
        Self::build(target, direction, true)
    }

    fn build(target: S, direction: Direction, trailer: bool) -> Result<Self> {
        direction.check_target(&target)?;
        Ok(Self {
            target,
            direction,
            crc: Crc32::new(),
            trailer,
            staging: Vec::new(),
            target_eof: false,
            verified: false,
            finished: false,
            closed: false,
        })
    }

    /// Checksum of the payload bytes seen so far.
    pub fn checksum(&self) -> u32 {
        self.crc.value()
    }

    /// Whether this stream writes or expects a trailer.
    pub fn has_trailer(&self) -> bool {
        self.trailer
    }

    /// Consume the transform and return the target.
    pub fn into_inner(self) -> S {
        self.target
    }

    /// Read the rest of the payload and check the trailer.
    ///
    /// Returns the payload checksum. Without a trailer there is nothing to
    /// compare and the value is returned as is.
    pub fn verify(&mut self) -> Result<u32> {
        self.direction.mode().ensure(Mode::Read, "verify")?;

        let mut sink = vec![0u8; REFILL_SIZE];
        while self.read(&mut sink, 1)? > 0 {}
        self.check_trailer()?;
        Ok(self.crc.value())
    }

    fn check_trailer(&mut self) -> Result<()> {
        if !self.trailer || self.verified {
            return Ok(());
        }
        if self.staging.len() < TRAILER_LEN {
            return Err(StreamError::truncated(format!(
                "CRC trailer needs {TRAILER_LEN} bytes, found {}",
                self.staging.len()
            )));
        }

        let expected = u32::from_be_bytes([
            self.staging[0],
            self.staging[1],
            self.staging[2],
            self.staging[3],
        ]);
        let computed = self.crc.value();
        self.verified = true;
        if expected != computed {
            return Err(StreamError::integrity_mismatch(expected, computed));
        }

        tracing::debug!(crc = computed, "CRC trailer verified");
        Ok(())
    }

    fn holdback(&self) -> usize {
        if self.trailer { TRAILER_LEN } else { 0 }
    }

    fn refill(&mut self) -> Result<()> {
        let start = self.staging.len();
        self.staging.resize(start + REFILL_SIZE, 0);
        let got = self.target.read(&mut self.staging[start..], 1)?;
        self.staging.truncate(start + got);
        if got == 0 {
            self.target_eof = true;
        }
        Ok(())
    }
}

impl<S: ByteStream> ByteStream for Crc32Stream<S> {
    fn mode(&self) -> Mode {
        self.direction.mode()
    }

    fn read(&mut self, buf: &mut [u8], min_len: usize) -> Result<usize> {
        self.mode().ensure(Mode::Read, "read")?;
        if self.closed {
            return Err(StreamError::Closed);
        }
        if buf.is_empty() {
            return Ok(0);
        }

        if !self.trailer {
            let n = self.target.read(buf, min_len)?;
            self.crc.update(&buf[..n]);
            return Ok(n);
        }

        let wanted = min_len.clamp(1, buf.len());
        let mut filled = 0;
        loop {
            let releasable = self.staging.len().saturating_sub(self.holdback());
            let n = releasable.min(buf.len() - filled);
            if n > 0 {
                buf[filled..filled + n].copy_from_slice(&self.staging[..n]);
                self.crc.update(&self.staging[..n]);
                self.staging.drain(..n);
                filled += n;
            }
            if filled >= wanted || self.target_eof {
                break;
            }
            self.refill()?;
        }

        if filled == 0 && self.target_eof {
            self.check_trailer()?;
        }
        Ok(filled)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.mode().ensure(Mode::Write, "write")?;
        if self.closed || self.finished {
            return Err(StreamError::Closed);
        }
        self.crc.update(buf);
        self.target.write(buf)
    }

    fn is_eof(&self) -> bool {
        self.mode() == Mode::Read
            && self.target_eof
            && self.staging.len() <= self.holdback()
    }

    /// On decode with a trailer, drains the target and checks the trailer
    /// before closing.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if self.direction == Direction::Decode && self.trailer && !self.verified {
            self.verify()?;
        }
        self.finish()?;
        self.closed = true;
        self.target.close()
    }
}

impl<S: ByteStream> TransformStream for Crc32Stream<S> {
    type Target = S;

    fn direction(&self) -> Direction {
        self.direction
    }

    fn target(&self) -> &S {
        &self.target
    }

    fn target_mut(&mut self) -> &mut S {
        &mut self.target
    }

    fn finish(&mut self) -> Result<()> {
        if self.direction == Direction::Decode || self.finished {
            return Ok(());
        }
        self.finished = true;
        if self.trailer {
            serial::write_u32(&mut self.target, self.crc.value())?;
        }
        Ok(())
    }
}
