//! Sliding history window for LZ decoding.
//!
//! The window holds the most recent `capacity` output bytes. Back-references
//! are resolved one byte at a time, so a match whose length exceeds its
//! distance replicates the overlapping pattern exactly as the encoder saw it.

use crate::error::{Result, StreamError};

/// A power-of-two circular buffer of recent output.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    buffer: Vec<u8>,
    /// Next write index.
    position: usize,
    /// Valid bytes, up to capacity.
    size: usize,
    mask: usize,
    /// Bytes ever written; used for error offsets.
    total: u64,
}

impl RingBuffer {
    /// Largest supported window, 2^24 bytes.
    pub const MAX_WINDOW_BITS: u8 = 24;

    /// Create a window of `1 << window_bits` bytes.
    pub fn new(window_bits: u8) -> Result<Self> {
        if window_bits == 0 || window_bits > Self::MAX_WINDOW_BITS {
            return Err(StreamError::invalid_config(format!(
                "window bits must be 1..={}, got {window_bits}",
                Self::MAX_WINDOW_BITS
            )));
        }
        let capacity = 1usize << window_bits;
        Ok(Self {
            buffer: vec![0; capacity],
            position: 0,
            size: 0,
            mask: capacity - 1,
            total: 0,
        })
    }

    /// Window capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of bytes available for back-references.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Total bytes written since creation.
    pub fn total_written(&self) -> u64 {
        self.total
    }

    /// Append one byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buffer[self.position] = byte;
        self.position = (self.position + 1) & self.mask;
        if self.size < self.buffer.len() {
            self.size += 1;
        }
        self.total += 1;
    }

    /// The byte `distance` positions back (1 = most recent).
    pub fn read_at_distance(&self, distance: usize) -> Result<u8> {
        if distance == 0 || distance > self.size {
            return Err(StreamError::corrupt(
                self.total,
                format!(
                    "back-reference distance {distance} exceeds {} bytes of history",
                    self.size
                ),
            ));
        }
        Ok(self.buffer[self.position.wrapping_sub(distance) & self.mask])
    }

    /// Copy the byte `distance` back to the front of the window and return it.
    #[inline]
    pub fn copy_byte(&mut self, distance: usize) -> Result<u8> {
        let byte = self.read_at_distance(distance)?;
        self.write_byte(byte);
        Ok(byte)
    }

    /// The last `count` bytes in output order.
    pub fn last_bytes(&self, count: usize) -> Vec<u8> {
        let count = count.min(self.size);
        (0..count)
            .map(|i| self.buffer[self.position.wrapping_sub(count - i) & self.mask])
            .collect()
    }
}
