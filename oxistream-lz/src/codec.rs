//! Streaming LZ transform.
//!
//! Wire format: compact(window bits), then MSB-first tokens:
//!
//! ```text
//! literal  0 <byte:8>
//! match    1 <length - 3:8> <distance - 1:window_bits>
//! end      1 11111111
//! ```
//!
//! The encoder decides a token only when `LOOKAHEAD` bytes are buffered
//! past the current position (or at finish), so the output does not depend
//! on how the input was split across writes.

use crate::config::{END_CODE, LzConfig, MAX_MATCH, MIN_MATCH, check_window_bits};
use crate::matcher::MatchFinder;
use oxistream_core::serial::{read_compact, write_compact};
use oxistream_core::{
    BitSource, BufferedByteStream, ByteStream, Direction, Mode, Result, RingBuffer, StreamError,
    TransformStream,
};

/// Bytes needed past a position before the encoder commits to a token
/// there: a full match, the lazy probe one byte later and the hash of its
/// last position.
const LOOKAHEAD: u64 = (MAX_MATCH + MIN_MATCH) as u64;

#[derive(Debug)]
struct EncodeState {
    matcher: MatchFinder,
    pos: u64,
    literals: u64,
    matches: u64,
}

#[derive(Debug)]
struct DecodeState {
    window: Option<RingBuffer>,
    window_bits: u8,
    distance: usize,
    remaining: usize,
    ended: bool,
}

#[derive(Debug)]
enum State {
    Encode(EncodeState),
    Decode(DecodeState),
}

/// LZ encoder or decoder layered on a target stream.
#[derive(Debug)]
pub struct LzCodec<S: ByteStream> {
    stream: BufferedByteStream<S>,
    direction: Direction,
    config: LzConfig,
    state: State,
    header_done: bool,
    bytes: u64,
    finished: bool,
    closed: bool,
}

impl<S: ByteStream> LzCodec<S> {
    /// Create a codec over `target`.
    ///
    /// The decoder takes its window size from the stream header and
    /// ignores the rest of `config`.
    pub fn new(target: S, direction: Direction, config: LzConfig) -> Result<Self> {
        config.validate()?;
        direction.check_target(&target)?;

        let state = match direction {
            Direction::Encode => State::Encode(EncodeState {
                matcher: MatchFinder::new(&config),
                pos: 0,
                literals: 0,
                matches: 0,
            }),
            Direction::Decode => State::Decode(DecodeState {
                window: None,
                window_bits: 0,
                distance: 0,
                remaining: 0,
                ended: false,
            }),
        };
        Ok(Self {
            stream: BufferedByteStream::new(target),
            direction,
            config,
            state,
            header_done: false,
            bytes: 0,
            finished: false,
            closed: false,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &LzConfig {
        &self.config
    }

    /// Consume the codec and return the target.
    ///
    /// Call [`TransformStream::finish`] first when encoding.
    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }

    fn write_header(&mut self) -> Result<()> {
        if !self.header_done {
            write_compact(&mut self.stream, u64::from(self.config.window_bits))?;
            self.header_done = true;
        }
        Ok(())
    }

    fn read_header(&mut self) -> Result<()> {
        if self.header_done {
            return Ok(());
        }
        let State::Decode(state) = &mut self.state else {
            return Ok(());
        };
        let value = read_compact(&mut self.stream)?;
        let window_bits = u8::try_from(value).unwrap_or(u8::MAX);
        check_window_bits(window_bits).map_err(|message| StreamError::malformed(0, message))?;

        state.window = Some(RingBuffer::new(window_bits)?);
        state.window_bits = window_bits;
        self.header_done = true;
        tracing::debug!(window_bits, "lz header parsed");
        Ok(())
    }

    /// Emit tokens for every position that has enough lookahead.
    fn encode_pending(&mut self, finishing: bool) -> Result<()> {
        let State::Encode(state) = &mut self.state else {
            return Ok(());
        };
        let window_bits = self.config.window_bits;

        loop {
            let end = state.matcher.end();
            let pos = state.pos;
            if pos >= end || (!finishing && end - pos < LOOKAHEAD) {
                break;
            }
            let avail = (end - pos) as usize;

            state.matcher.insert_until(pos);
            let mut found = state.matcher.find(pos, avail);

            if let Some((length, _)) = found {
                if self.config.lazy && avail > 1 {
                    state.matcher.insert_until(pos + 1);
                    let next = state.matcher.find(pos + 1, avail - 1);
                    if next.is_some_and(|(next_len, _)| next_len > length + 1) {
                        found = None;
                    }
                }
            }

            match found {
                Some((length, distance)) => {
                    self.stream.put_bit(true)?;
                    self.stream.put_bits((length - MIN_MATCH) as u32, 8)?;
                    self.stream.put_bits((distance - 1) as u32, window_bits)?;
                    state.pos += length as u64;
                    state.matches += 1;
                }
                None => {
                    self.stream.put_bit(false)?;
                    self.stream.put_bits(u32::from(state.matcher.byte(pos)), 8)?;
                    state.pos += 1;
                    state.literals += 1;
                }
            }
        }

        state.matcher.compact(state.pos);
        Ok(())
    }
}

impl<S: ByteStream> ByteStream for LzCodec<S> {
    fn mode(&self) -> Mode {
        self.direction.mode()
    }

    fn read(&mut self, buf: &mut [u8], min_len: usize) -> Result<usize> {
        self.mode().ensure(Mode::Read, "read")?;
        if self.closed {
            return Err(StreamError::Closed);
        }
        self.read_header()?;
        let State::Decode(state) = &mut self.state else {
            return Err(StreamError::wrong_mode("read", Mode::Write));
        };
        if state.ended || buf.is_empty() {
            return Ok(0);
        }
        let Some(window) = state.window.as_mut() else {
            return Err(StreamError::truncated("missing LZ header"));
        };

        let wanted = min_len.clamp(1, buf.len());
        let mut filled = 0;
        while filled < buf.len() {
            if state.remaining > 0 {
                buf[filled] = window.copy_byte(state.distance)?;
                filled += 1;
                state.remaining -= 1;
                continue;
            }
            if filled >= wanted && self.stream.available() == 0 {
                break;
            }

            let flag = self
                .stream
                .get_bit()?
                .ok_or_else(|| StreamError::truncated("end of data before LZ end marker"))?;
            if !flag {
                let byte = self.stream.get_bits(8)? as u8;
                window.write_byte(byte);
                buf[filled] = byte;
                filled += 1;
                continue;
            }

            let code = self.stream.get_bits(8)?;
            if code == END_CODE {
                state.ended = true;
                break;
            }
            let distance = self.stream.get_bits(state.window_bits)? as usize + 1;
            if distance > window.len() {
                return Err(StreamError::corrupt(
                    window.total_written(),
                    format!(
                        "back-reference distance {distance} exceeds {} bytes of output",
                        window.len()
                    ),
                ));
            }
            state.distance = distance;
            state.remaining = code as usize + MIN_MATCH;
        }

        self.bytes += filled as u64;
        if state.ended {
            tracing::debug!(bytes = self.bytes, "lz stream finished");
        }
        Ok(filled)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.mode().ensure(Mode::Write, "write")?;
        if self.closed || self.finished {
            return Err(StreamError::Closed);
        }
        self.write_header()?;
        if let State::Encode(state) = &mut self.state {
            state.matcher.push(buf);
        }
        self.bytes += buf.len() as u64;
        self.encode_pending(false)
    }

    fn is_eof(&self) -> bool {
        matches!(&self.state, State::Decode(state) if state.ended && state.remaining == 0)
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

impl<S: ByteStream> TransformStream for LzCodec<S> {
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
        self.encode_pending(true)?;
        self.stream.put_bit(true)?;
        self.stream.put_bits(END_CODE, 8)?;
        self.stream.flush()?;
        self.finished = true;

        if let State::Encode(state) = &self.state {
            tracing::debug!(
                bytes = self.bytes,
                literals = state.literals,
                matches = state.matches,
                "lz stream finished"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxistream_core::MemoryStream;

    fn encode(data: &[u8], config: LzConfig) -> Vec<u8> {
        let mut enc = LzCodec::new(MemoryStream::writer(), Direction::Encode, config).unwrap();
        enc.write(data).unwrap();
        enc.close().unwrap();
        enc.into_inner().into_inner()
    }

    fn decode(bytes: Vec<u8>) -> Result<Vec<u8>> {
        let mut dec = LzCodec::new(MemoryStream::reader(bytes), Direction::Decode, LzConfig::DEFAULT)?;
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
        let bytes = encode(b"", LzConfig::DEFAULT);
        // Header byte plus a 9-bit end marker.
        assert_eq!(bytes.len(), 3);
        assert_eq!(decode(bytes).unwrap(), b"");
    }

    #[test]
    fn test_overlapping_run() {
        let data = vec![b'a'; 1000];
        let bytes = encode(&data, LzConfig::DEFAULT);
        assert!(bytes.len() < 30, "{} bytes", bytes.len());
        assert_eq!(decode(bytes).unwrap(), data);
    }

    #[test]
    fn test_store_level_is_literal_only() {
        let data = b"abcabcabcabcabcabc";
        let bytes = encode(data, LzConfig::STORE);
        // 1 header byte + 18 literals of 9 bits + 9-bit end marker.
        assert_eq!(bytes.len(), 1 + (18 * 9 + 9usize).div_ceil(8));
        assert_eq!(decode(bytes).unwrap(), data);
    }

    #[test]
    fn test_decoder_uses_header_window() {
        let config = LzConfig::new(10, 32, false).unwrap();
        let data = b"window window window window".repeat(20);
        let bytes = encode(&data, config);
        assert_eq!(bytes[0], 10);
        assert_eq!(decode(bytes).unwrap(), data);
    }

    #[test]
    fn test_distance_past_start_is_corrupt() {
        // Window bits 8, then a match token with distance 5 and no output.
        let mut stream = BufferedByteStream::new(MemoryStream::writer());
        stream.put_byte(8).unwrap();
        stream.put_bit(true).unwrap();
        stream.put_bits(0, 8).unwrap();
        stream.put_bits(4, 8).unwrap();
        stream.close().unwrap();
        let bytes = stream.into_inner().into_inner();

        assert!(matches!(decode(bytes), Err(StreamError::Corrupt { .. })));
    }

    #[test]
    fn test_bad_header() {
        assert!(matches!(decode(vec![3]), Err(StreamError::Malformed { .. })));
        assert!(matches!(decode(vec![]), Err(StreamError::Truncated { .. })));
    }

    #[test]
    fn test_missing_end_marker() {
        let mut bytes = encode(&b"hello hello hello".repeat(10), LzConfig::DEFAULT);
        bytes.truncate(bytes.len() - 2);
        assert!(matches!(decode(bytes), Err(StreamError::Truncated { .. })));
    }
}
