//! Streaming adaptive Huffman transform.
//!
//! Wire format: one flags byte (bit 0 = escape mode, other bits zero),
//! then the MSB-first code stream, terminated by the EOS code and zero
//! padding to a byte boundary.

use crate::config::HuffmanConfig;
use crate::model::{AdaptiveHuffman, Symbol};
use oxistream_core::{
    BufferedByteStream, ByteStream, Direction, Mode, Result, StreamError, TransformStream,
};

const FLAG_ESCAPE: u8 = 0x01;

/// Adaptive Huffman encoder or decoder layered on a target stream.
#[derive(Debug)]
pub struct HuffmanCodec<S: ByteStream> {
    stream: BufferedByteStream<S>,
    direction: Direction,
    config: HuffmanConfig,
    model: AdaptiveHuffman,
    header_done: bool,
    ended: bool,
    symbols: u64,
    finished: bool,
    closed: bool,
}

impl<S: ByteStream> HuffmanCodec<S> {
    /// Create a codec over `target`.
    ///
    /// On decode, the escape flag is taken from the stream header; the
    /// other parameters must match the encoder's.
    pub fn new(target: S, direction: Direction, config: HuffmanConfig) -> Result<Self> {
        config.validate()?;
        direction.check_target(&target)?;

        Ok(Self {
            stream: BufferedByteStream::new(target),
            direction,
            config,
            model: AdaptiveHuffman::new(config)?,
            header_done: false,
            ended: false,
            symbols: 0,
            finished: false,
            closed: false,
        })
    }

    /// The adaptive model.
    pub fn model(&self) -> &AdaptiveHuffman {
        &self.model
    }

    /// Consume the codec and return the target.
    ///
    /// Call [`TransformStream::finish`] first when encoding.
    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }

    fn write_header(&mut self) -> Result<()> {
        if !self.header_done {
            let flags = if self.config.escape { FLAG_ESCAPE } else { 0 };
            self.stream.put_byte(flags)?;
            self.header_done = true;
        }
        Ok(())
    }

    fn read_header(&mut self) -> Result<()> {
        if self.header_done {
            return Ok(());
        }
        let flags = self
            .stream
            .get_byte()?
            .ok_or_else(|| StreamError::truncated("missing Huffman header"))?;
        if flags & !FLAG_ESCAPE != 0 {
            return Err(StreamError::malformed(
                0,
                format!("unknown Huffman header flags {flags:#04x}"),
            ));
        }

        let escape = flags & FLAG_ESCAPE != 0;
        if escape != self.config.escape {
            self.config = HuffmanConfig {
                escape,
                ..self.config
            };
            self.config.validate()?;
            self.model = AdaptiveHuffman::new(self.config)?;
        }
        self.header_done = true;
        tracing::debug!(escape, "huffman header parsed");
        Ok(())
    }
}

impl<S: ByteStream> ByteStream for HuffmanCodec<S> {
    fn mode(&self) -> Mode {
        self.direction.mode()
    }

    fn read(&mut self, buf: &mut [u8], min_len: usize) -> Result<usize> {
        self.mode().ensure(Mode::Read, "read")?;
        if self.closed {
            return Err(StreamError::Closed);
        }
        self.read_header()?;
        if self.ended || buf.is_empty() {
            return Ok(0);
        }

        let wanted = min_len.clamp(1, buf.len());
        let mut filled = 0;
        while filled < buf.len() {
            if filled >= wanted && self.stream.available() == 0 {
                break;
            }
            match self.model.decode_symbol(&mut self.stream)? {
                Symbol::Byte(byte) => {
                    buf[filled] = byte;
                    filled += 1;
                    self.symbols += 1;
                }
                Symbol::End => {
                    self.ended = true;
                    tracing::debug!(bytes = self.symbols, "huffman stream finished");
                    break;
                }
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
        for &byte in buf {
            self.model.encode_byte(&mut self.stream, byte)?;
        }
        self.symbols += buf.len() as u64;
        Ok(())
    }

    fn is_eof(&self) -> bool {
        self.direction == Direction::Decode && self.ended
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

impl<S: ByteStream> TransformStream for HuffmanCodec<S> {
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
        self.model.encode_end(&mut self.stream)?;
        self.stream.flush()?;
        self.finished = true;

        tracing::debug!(
            bytes = self.symbols,
            rebuilds = self.model.rebuilds(),
            rescales = self.model.table().rescales(),
            "huffman stream finished"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxistream_core::MemoryStream;

    fn encode(data: &[u8], config: HuffmanConfig) -> Vec<u8> {
        let mut enc = HuffmanCodec::new(MemoryStream::writer(), Direction::Encode, config).unwrap();
        enc.write(data).unwrap();
        enc.close().unwrap();
        enc.into_inner().into_inner()
    }

    fn decode(bytes: Vec<u8>, config: HuffmanConfig) -> Result<Vec<u8>> {
        let mut dec = HuffmanCodec::new(MemoryStream::reader(bytes), Direction::Decode, config)?;
        let mut out = Vec::new();
        let mut buf = [0u8; 64];
        loop {
            let n = dec.read(&mut buf, 1)?;
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        Ok(out)
    }

    #[test]
    fn test_empty_input() {
        let bytes = encode(b"", HuffmanConfig::DEFAULT);
        // Header plus the EOS code padded to a byte.
        assert!(bytes.len() >= 2);
        assert_eq!(bytes[0], 0);
        assert_eq!(decode(bytes, HuffmanConfig::DEFAULT).unwrap(), b"");
    }

    #[test]
    fn test_header_selects_escape_mode() {
        let data = b"hello hello hello";
        let bytes = encode(data, HuffmanConfig::BEST);
        assert_eq!(bytes[0], FLAG_ESCAPE);
        // The decoder follows the header even if configured differently.
        let config = HuffmanConfig {
            escape: false,
            ..HuffmanConfig::BEST
        };
        assert_eq!(decode(bytes, config).unwrap(), data);
    }

    #[test]
    fn test_compresses_skewed_text() {
        let data = b"aaaaaaaabbbbccd".repeat(200);
        let bytes = encode(&data, HuffmanConfig::DEFAULT);
        assert!(bytes.len() < data.len() / 3, "{} bytes", bytes.len());
        assert_eq!(decode(bytes, HuffmanConfig::DEFAULT).unwrap(), data);
    }

    #[test]
    fn test_truncated_stream() {
        let data = b"some text that will be cut short".repeat(10);
        let mut bytes = encode(&data, HuffmanConfig::DEFAULT);
        bytes.truncate(bytes.len() / 2);
        assert!(matches!(
            decode(bytes, HuffmanConfig::DEFAULT),
            Err(StreamError::Truncated { .. })
        ));
        assert!(matches!(
            decode(Vec::new(), HuffmanConfig::DEFAULT),
            Err(StreamError::Truncated { .. })
        ));
    }

    #[test]
    fn test_unknown_flags_rejected() {
        assert!(matches!(
            decode(vec![0x80, 0x00], HuffmanConfig::DEFAULT),
            Err(StreamError::Malformed { .. })
        ));
    }

    #[test]
    fn test_finish_keeps_target_usable() {
        let mut enc =
            HuffmanCodec::new(MemoryStream::writer(), Direction::Encode, HuffmanConfig::FAST)
                .unwrap();
        enc.write(b"abc").unwrap();
        enc.finish().unwrap();
        assert!(matches!(enc.write(b"d"), Err(StreamError::Closed)));
        let payload_len = enc.target().as_slice().len();
        enc.target_mut().write(b"TAIL").unwrap();
        let bytes = enc.into_inner().into_inner();
        assert_eq!(&bytes[payload_len..], b"TAIL");
        assert_eq!(decode(bytes, HuffmanConfig::FAST).unwrap(), b"abc");
    }
}
