//! Streaming adaptive arithmetic transform.
//!
//! No header. The payload is the coder's bit stream, MSB-first, ending
//! with the end-of-stream symbol, the flush bits and zero padding.

use crate::config::{ALPHABET_SIZE, ArithmeticConfig, EOS};
use crate::range_coder::{RangeDecoder, RangeEncoder};
use oxistream_core::{
    BufferedByteStream, ByteStream, Direction, FrequencyTable, Mode, Result, StreamError,
    TransformStream,
};

#[derive(Debug)]
enum Coder {
    Encode(RangeEncoder),
    Decode(RangeDecoder),
}

/// Adaptive arithmetic encoder or decoder layered on a target stream.
#[derive(Debug)]
pub struct ArithmeticCodec<S: ByteStream> {
    stream: BufferedByteStream<S>,
    direction: Direction,
    config: ArithmeticConfig,
    model: FrequencyTable,
    coder: Coder,
    symbols: u64,
    ended: bool,
    finished: bool,
    closed: bool,
}

impl<S: ByteStream> ArithmeticCodec<S> {
    /// Create a codec over `target`.
    pub fn new(target: S, direction: Direction, config: ArithmeticConfig) -> Result<Self> {
        config.validate()?;
        direction.check_target(&target)?;

        let coder = match direction {
            Direction::Encode => Coder::Encode(RangeEncoder::new()),
            Direction::Decode => Coder::Decode(RangeDecoder::new()),
        };
        Ok(Self {
            stream: BufferedByteStream::new(target),
            direction,
            config,
            model: FrequencyTable::new(ALPHABET_SIZE, config.increment, config.max_total)?,
            coder,
            symbols: 0,
            ended: false,
            finished: false,
            closed: false,
        })
    }

    /// The adaptive frequency model.
    pub fn model(&self) -> &FrequencyTable {
        &self.model
    }

    /// The configuration in use.
    pub fn config(&self) -> &ArithmeticConfig {
        &self.config
    }

    /// Consume the codec and return the target.
    ///
    /// Call [`TransformStream::finish`] first when encoding.
    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }
}

impl<S: ByteStream> ByteStream for ArithmeticCodec<S> {
    fn mode(&self) -> Mode {
        self.direction.mode()
    }

    fn read(&mut self, buf: &mut [u8], min_len: usize) -> Result<usize> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let Coder::Decode(decoder) = &mut self.coder else {
            return Err(StreamError::wrong_mode("read", Mode::Write));
        };
        if self.ended || buf.is_empty() {
            return Ok(0);
        }

        let wanted = min_len.clamp(1, buf.len());
        let mut filled = 0;
        while filled < buf.len() {
            if filled >= wanted && self.stream.available() == 0 {
                break;
            }

            let total = self.model.total();
            let target = decoder.target(&mut self.stream, total)?;
            let (symbol, low, high) = self.model.find(target);
            decoder.consume(&mut self.stream, low, high, total)?;

            if symbol == EOS {
                self.ended = true;
                tracing::debug!(
                    bytes = self.symbols,
                    rescales = self.model.rescales(),
                    "arithmetic stream finished"
                );
                break;
            }
            self.model.update(symbol);
            buf[filled] = symbol as u8;
            filled += 1;
            self.symbols += 1;
        }
        Ok(filled)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        if self.closed || self.finished {
            return Err(StreamError::Closed);
        }
        let Coder::Encode(encoder) = &mut self.coder else {
            return Err(StreamError::wrong_mode("write", Mode::Read));
        };

        for &byte in buf {
            let symbol = usize::from(byte);
            let (low, high) = self.model.range(symbol);
            encoder.encode(&mut self.stream, low, high, self.model.total())?;
            self.model.update(symbol);
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

impl<S: ByteStream> TransformStream for ArithmeticCodec<S> {
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
        if self.finished {
            return Ok(());
        }
        let Coder::Encode(encoder) = &mut self.coder else {
            return Ok(());
        };

        let (low, high) = self.model.range(EOS);
        encoder.encode(&mut self.stream, low, high, self.model.total())?;
        encoder.finish(&mut self.stream)?;
        self.stream.flush()?;
        self.finished = true;

        tracing::debug!(
            bytes = self.symbols,
            rescales = self.model.rescales(),
            "arithmetic stream finished"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxistream_core::MemoryStream;

    fn encode(data: &[u8], config: ArithmeticConfig) -> Vec<u8> {
        let mut enc =
            ArithmeticCodec::new(MemoryStream::writer(), Direction::Encode, config).unwrap();
        enc.write(data).unwrap();
        enc.close().unwrap();
        enc.into_inner().into_inner()
    }

    fn decode(bytes: Vec<u8>, config: ArithmeticConfig) -> Result<Vec<u8>> {
        let mut dec = ArithmeticCodec::new(MemoryStream::reader(bytes), Direction::Decode, config)?;
        let mut out = Vec::new();
        let mut buf = [0u8; 100];
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
    fn test_empty_and_single_byte() {
        for data in [&b""[..], b"x"] {
            let bytes = encode(data, ArithmeticConfig::DEFAULT);
            assert!(!bytes.is_empty());
            assert_eq!(decode(bytes, ArithmeticConfig::DEFAULT).unwrap(), data);
        }
    }

    #[test]
    fn test_all_byte_values() {
        let data: Vec<u8> = (0..=255u8).cycle().take(2048).collect();
        let bytes = encode(&data, ArithmeticConfig::DEFAULT);
        assert_eq!(decode(bytes, ArithmeticConfig::DEFAULT).unwrap(), data);
    }

    #[test]
    fn test_repetitive_input_compresses() {
        let data = vec![b'z'; 10_000];
        let bytes = encode(&data, ArithmeticConfig::DEFAULT);
        assert!(bytes.len() < 200, "{} bytes", bytes.len());
        assert_eq!(decode(bytes, ArithmeticConfig::DEFAULT).unwrap(), data);
    }

    #[test]
    fn test_truncation_detected() {
        let data: Vec<u8> = (0..4000u32).map(|i| (i * 31 % 97) as u8).collect();
        let mut bytes = encode(&data, ArithmeticConfig::DEFAULT);
        bytes.truncate(bytes.len() / 2);
        assert!(matches!(
            decode(bytes, ArithmeticConfig::DEFAULT),
            Err(StreamError::Truncated { .. })
        ));
    }

    #[test]
    fn test_mode_checks() {
        let mut enc = ArithmeticCodec::new(
            MemoryStream::writer(),
            Direction::Encode,
            ArithmeticConfig::DEFAULT,
        )
        .unwrap();
        let mut buf = [0u8; 4];
        assert!(matches!(
            enc.read(&mut buf, 1),
            Err(StreamError::WrongMode { .. })
        ));
        enc.finish().unwrap();
        assert!(matches!(enc.write(b"x"), Err(StreamError::Closed)));
    }
}
