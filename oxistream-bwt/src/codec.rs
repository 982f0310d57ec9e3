//! Streaming block-sorting transform.
//!
//! Wire format:
//!
//! ```text
//! compact(block_size)
//! { compact(len) compact(primary) <len bytes> }*   1 <= len <= block_size
//! compact(0)
//! ```

use crate::bwt::{inverse_transform, transform};
use crate::config::{BwtConfig, check_block_size};
use oxistream_core::serial::{read_compact, write_compact};
use oxistream_core::{
    BufferedByteStream, ByteStream, Direction, Mode, Result, StreamError, TransformStream,
};

/// BWT encoder or decoder layered on a target stream.
#[derive(Debug)]
pub struct BwtCodec<S: ByteStream> {
    stream: BufferedByteStream<S>,
    direction: Direction,
    config: BwtConfig,
    /// Encode: input waiting for a full block. Decode: the current
    /// reconstructed block.
    block: Vec<u8>,
    block_pos: usize,
    blocks: u64,
    header_done: bool,
    ended: bool,
    finished: bool,
    closed: bool,
}

impl<S: ByteStream> BwtCodec<S> {
    /// Create a codec over `target`.
    ///
    /// The decoder takes the block size from the stream header.
    pub fn new(target: S, direction: Direction, config: BwtConfig) -> Result<Self> {
        config.validate()?;
        direction.check_target(&target)?;

        Ok(Self {
            stream: BufferedByteStream::new(target),
            direction,
            config,
            block: Vec::new(),
            block_pos: 0,
            blocks: 0,
            header_done: false,
            ended: false,
            finished: false,
            closed: false,
        })
    }

    /// The configuration in use (on decode, as read from the header).
    pub fn config(&self) -> &BwtConfig {
        &self.config
    }

    /// Blocks coded so far.
    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    /// Consume the codec and return the target.
    ///
    /// Call [`TransformStream::finish`] first when encoding.
    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }

    fn write_header(&mut self) -> Result<()> {
        if !self.header_done {
            write_compact(&mut self.stream, self.config.block_size as u64)?;
            self.header_done = true;
        }
        Ok(())
    }

    fn read_header(&mut self) -> Result<()> {
        if self.header_done {
            return Ok(());
        }
        let value = read_compact(&mut self.stream)?;
        let block_size = usize::try_from(value).unwrap_or(usize::MAX);
        check_block_size(block_size).map_err(|message| StreamError::malformed(0, message))?;

        self.config = BwtConfig { block_size };
        self.header_done = true;
        tracing::debug!(block_size, "bwt header parsed");
        Ok(())
    }

    fn flush_block(&mut self) -> Result<()> {
        if self.block.is_empty() {
            return Ok(());
        }
        let (last, primary) = transform(&self.block);
        write_compact(&mut self.stream, last.len() as u64)?;
        write_compact(&mut self.stream, primary as u64)?;
        self.stream.write(&last)?;
        self.blocks += 1;

        tracing::debug!(block = self.blocks, len = last.len(), primary, "bwt block flushed");
        self.block.clear();
        Ok(())
    }

    /// Read and invert the next block. Returns `false` at the terminator.
    fn next_block(&mut self) -> Result<bool> {
        let len = read_compact(&mut self.stream)?;
        if len == 0 {
            return Ok(false);
        }
        if len > self.config.block_size as u64 {
            return Err(StreamError::corrupt(
                self.stream.bit_position() / 8,
                format!(
                    "block length {len} exceeds block size {}",
                    self.config.block_size
                ),
            ));
        }
        let len = len as usize;
        let primary = read_compact(&mut self.stream)?;
        if primary >= len as u64 {
            return Err(StreamError::corrupt(
                self.stream.bit_position() / 8,
                format!("primary index {primary} outside block of {len} bytes"),
            ));
        }

        let mut last = vec![0u8; len];
        if self.stream.read_full(&mut last)? < len {
            return Err(StreamError::truncated(format!(
                "block {} ended early",
                self.blocks
            )));
        }
        self.block = inverse_transform(&last, primary as usize)?;
        self.block_pos = 0;
        self.blocks += 1;
        tracing::debug!(block = self.blocks, len, "bwt block decoded");
        Ok(true)
    }
}

impl<S: ByteStream> ByteStream for BwtCodec<S> {
    fn mode(&self) -> Mode {
        self.direction.mode()
    }

    fn read(&mut self, buf: &mut [u8], min_len: usize) -> Result<usize> {
        self.mode().ensure(Mode::Read, "read")?;
        if self.closed {
            return Err(StreamError::Closed);
        }
        self.read_header()?;
        if buf.is_empty() {
            return Ok(0);
        }

        let wanted = min_len.clamp(1, buf.len());
        let mut filled = 0;
        while filled < buf.len() {
            if self.block_pos < self.block.len() {
                let n = (self.block.len() - self.block_pos).min(buf.len() - filled);
                buf[filled..filled + n]
                    .copy_from_slice(&self.block[self.block_pos..self.block_pos + n]);
                self.block_pos += n;
                filled += n;
                continue;
            }
            if self.ended || (filled >= wanted && self.stream.available() == 0) {
                break;
            }
            if !self.next_block()? {
                self.ended = true;
                tracing::debug!(blocks = self.blocks, "bwt stream finished");
            }
        }
        Ok(filled)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.mode().ensure(Mode::Write, "write")?;
        if self.closed || self.finished {
            return Err(StreamError::Closed);
        }
        self.write_header()?;

        let mut rest = buf;
        while !rest.is_empty() {
            let n = (self.config.block_size - self.block.len()).min(rest.len());
            self.block.extend_from_slice(&rest[..n]);
            rest = &rest[n..];
            if self.block.len() == self.config.block_size {
                self.flush_block()?;
            }
        }
        Ok(())
    }

    fn is_eof(&self) -> bool {
        self.direction == Direction::Decode && self.ended && self.block_pos == self.block.len()
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.finish()?;
        self.closed = true;
        self.stream.close()
    }
}

impl<S: ByteStream> TransformStream for BwtCodec<S> {
    type Target = S;

    fn direction(&self) -> Direction {
        self.direction
    }

    fn target(&self) -> &S {
        self.stream.get_ref()
    }

    fn target_mut(&mut self) -> &mut S {
        self.stream.get_mut()
    }

    fn finish(&mut self) -> Result<()> {
        if self.direction == Direction::Decode || self.finished {
            return Ok(());
        }
        self.write_header()?;
        self.flush_block()?;
        write_compact(&mut self.stream, 0)?;
        self.stream.flush()?;
        self.finished = true;

        tracing::debug!(blocks = self.blocks, "bwt stream finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxistream_core::MemoryStream;

    fn encode(data: &[u8], config: BwtConfig) -> Vec<u8> {
        let mut enc = BwtCodec::new(MemoryStream::writer(), Direction::Encode, config).unwrap();
        enc.write(data).unwrap();
        enc.close().unwrap();
        enc.into_inner().into_inner()
    }

    fn decode(bytes: Vec<u8>) -> Result<Vec<u8>> {
        let mut dec = BwtCodec::new(MemoryStream::reader(bytes), Direction::Decode, BwtConfig::SMALL)?;
        let mut sink = MemoryStream::writer();
        oxistream_core::copy(&mut dec, &mut sink)?;
        Ok(sink.into_inner())
    }

    #[test]
    fn test_empty_stream() {
        let bytes = encode(b"", BwtConfig::DEFAULT);
        // compact(262144) is three bytes, then the zero terminator.
        assert_eq!(bytes, [0x80, 0x80, 0x10, 0x00]);
        assert_eq!(decode(bytes).unwrap(), b"");
    }

    #[test]
    fn test_single_block_layout() {
        let config = BwtConfig::new(16).unwrap();
        let bytes = encode(b"banana", config);
        assert_eq!(bytes, [16, 6, 3, b'n', b'n', b'b', b'a', b'a', b'a', 0]);
        assert_eq!(decode(bytes).unwrap(), b"banana");
    }

    #[test]
    fn test_block_boundaries() {
        let config = BwtConfig::new(5).unwrap();
        for len in [4usize, 5, 6, 10, 11] {
            let data: Vec<u8> = (0..len as u8).map(|i| b'a' + i % 3).collect();
            let mut enc = BwtCodec::new(MemoryStream::writer(), Direction::Encode, config).unwrap();
            enc.write(&data).unwrap();
            enc.finish().unwrap();
            assert_eq!(enc.blocks(), len.div_ceil(5) as u64);
            let bytes = enc.into_inner().into_inner();
            assert_eq!(decode(bytes).unwrap(), data);
        }
    }

    #[test]
    fn test_oversized_block_rejected() {
        // Header says 4-byte blocks, block claims 5 bytes.
        let bytes = vec![4, 5, 0, 1, 2, 3, 4, 5, 0];
        assert!(matches!(decode(bytes), Err(StreamError::Corrupt { .. })));
    }

    #[test]
    fn test_bad_primary_rejected() {
        let bytes = vec![4, 3, 3, b'a', b'b', b'c', 0];
        assert!(matches!(decode(bytes), Err(StreamError::Corrupt { .. })));
    }

    #[test]
    fn test_truncated_block() {
        let bytes = vec![16, 6, 3, b'n', b'n'];
        assert!(matches!(decode(bytes), Err(StreamError::Truncated { .. })));
        let missing_terminator = vec![16, 3, 0, b'a', b'b', b'c'];
        assert!(matches!(
            decode(missing_terminator),
            Err(StreamError::Truncated { .. })
        ));
    }

    #[test]
    fn test_bad_header() {
        assert!(matches!(decode(vec![0]), Err(StreamError::Malformed { .. })));
    }
}
