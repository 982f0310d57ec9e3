//! Streaming Base64 transform.

use crate::config::{Base64Config, PAD};
use oxistream_core::{ByteStream, Direction, Mode, Result, StreamError, TransformStream};

const READ_CHUNK: usize = 4 * 1024;

/// Base64 encoder or decoder layered on a target stream.
///
/// Encoding accepts writes of any size: a partial 3-byte group and the
/// position within the current output line carry over between calls.
/// Decoding accepts padded and unpadded input; a dangling single character
/// is malformed.
#[derive(Debug)]
pub struct Base64Codec<S: ByteStream> {
    target: S,
    direction: Direction,
    config: Base64Config,
    state: State,
    finished: bool,
    closed: bool,
}

#[derive(Debug)]
enum State {
    Encode(EncodeState),
    Decode(DecodeState),
}

#[derive(Debug, Default)]
struct EncodeState {
    group: [u8; 3],
    group_len: usize,
    /// Characters already on the current line.
    column: usize,
    out: Vec<u8>,
}

#[derive(Debug, Default)]
struct DecodeState {
    input: Vec<u8>,
    input_pos: usize,
    /// Characters consumed from the target so far.
    offset: u64,
    target_eof: bool,
    quad: [u8; 4],
    quad_len: usize,
    pads: usize,
    /// Decoded bytes not yet handed to the caller.
    ready: [u8; 3],
    ready_pos: usize,
    ready_len: usize,
    done: bool,
}

impl<S: ByteStream> Base64Codec<S> {
    /// Create a codec over `target`.
    pub fn new(target: S, direction: Direction, config: Base64Config) -> Result<Self> {
        config.validate()?;
        direction.check_target(&target)?;

        let state = match direction {
            Direction::Encode => State::Encode(EncodeState::default()),
            Direction::Decode => State::Decode(DecodeState::default()),
        };
        Ok(Self {
            target,
            direction,
            config,
            state,
            finished: false,
            closed: false,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &Base64Config {
        &self.config
    }

    /// Consume the codec and return the target.
    pub fn into_inner(self) -> S {
        self.target
    }
}

impl EncodeState {
    fn push_char(&mut self, c: u8, config: &Base64Config) {
        if let Some(width) = config.line_width {
            if self.column == width {
                self.out.extend_from_slice(b"\r\n");
                self.column = 0;
            }
        }
        self.out.push(c);
        self.column += 1;
    }

    /// Emit the 4 characters for a complete group.
    fn emit_group(&mut self, config: &Base64Config) {
        let chars = config.alphabet.chars();
        let [a, b, c] = self.group;
        let n = (u32::from(a) << 16) | (u32::from(b) << 8) | u32::from(c);
        for shift in [18, 12, 6, 0] {
            self.push_char(chars[((n >> shift) & 0x3F) as usize], config);
        }
        self.group_len = 0;
    }

    /// Emit a final partial group with padding.
    fn emit_tail(&mut self, config: &Base64Config) {
        if self.group_len == 0 {
            return;
        }
        let chars = config.alphabet.chars();
        let a = self.group[0];
        let b = if self.group_len > 1 { self.group[1] } else { 0 };
        let n = (u32::from(a) << 16) | (u32::from(b) << 8);

        self.push_char(chars[((n >> 18) & 0x3F) as usize], config);
        self.push_char(chars[((n >> 12) & 0x3F) as usize], config);
        if self.group_len == 2 {
            self.push_char(chars[((n >> 6) & 0x3F) as usize], config);
        } else {
            self.push_char(PAD, config);
        }
        self.push_char(PAD, config);
        self.group_len = 0;
    }
}

impl DecodeState {
    fn malformed(&self, message: impl Into<String>) -> StreamError {
        StreamError::malformed(self.offset.saturating_sub(1), message)
    }

    fn flush_quad(&mut self) {
        let [a, b, c, d] = self.quad;
        let n = (u32::from(a) << 18) | (u32::from(b) << 12) | (u32::from(c) << 6) | u32::from(d);
        self.ready = [(n >> 16) as u8, (n >> 8) as u8, n as u8];
        self.ready_pos = 0;
        // Two data characters carry one byte, three carry two.
        self.ready_len = self.quad_len - 1;
        self.quad = [0; 4];
        self.quad_len = 0;
    }

    /// Handle one input character. Returns with decoded bytes in `ready`
    /// whenever a group completes.
    fn push_char(&mut self, c: u8, config: &Base64Config) -> Result<()> {
        if config.wraps() && (c == b'\r' || c == b'\n') {
            return Ok(());
        }

        if self.done {
            return Err(self.malformed(format!("unexpected {:?} after padding", c as char)));
        }

        if c == PAD {
            if self.quad_len < 2 {
                return Err(self.malformed("padding too early in group"));
            }
            self.pads += 1;
            if self.quad_len + self.pads == 4 {
                self.flush_quad();
                self.done = true;
            }
            return Ok(());
        }

        if self.pads > 0 {
            return Err(self.malformed(format!("unexpected {:?} after padding", c as char)));
        }

        let value = config
            .alphabet
            .decode(c)
            .ok_or_else(|| self.malformed(format!("invalid Base64 character {:?}", c as char)))?;
        self.quad[self.quad_len] = value;
        self.quad_len += 1;
        if self.quad_len == 4 {
            self.flush_quad();
        }
        Ok(())
    }

    /// Handle end of input.
    fn finish_input(&mut self) -> Result<()> {
        if self.pads > 0 && !self.done {
            return Err(StreamError::malformed(self.offset, "incomplete padding"));
        }
        match self.quad_len {
            0 => {}
            1 => {
                return Err(StreamError::malformed(
                    self.offset,
                    "dangling character: input length is 1 mod 4",
                ));
            }
            _ => self.flush_quad(),
        }
        self.done = true;
        Ok(())
    }
}

impl<S: ByteStream> ByteStream for Base64Codec<S> {
    fn mode(&self) -> Mode {
        self.direction.mode()
    }

    fn read(&mut self, buf: &mut [u8], min_len: usize) -> Result<usize> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let State::Decode(state) = &mut self.state else {
            return Err(StreamError::wrong_mode("read", Mode::Write));
        };
        if buf.is_empty() {
            return Ok(0);
        }

        let wanted = min_len.clamp(1, buf.len());
        let mut filled = 0;
        loop {
            let n = (state.ready_len - state.ready_pos).min(buf.len() - filled);
            buf[filled..filled + n]
                .copy_from_slice(&state.ready[state.ready_pos..state.ready_pos + n]);
            state.ready_pos += n;
            filled += n;
            if filled == buf.len() {
                break;
            }

            if state.input_pos == state.input.len() {
                // Only block on the target while the caller's minimum is unmet.
                if state.target_eof || filled >= wanted {
                    break;
                }
                state.input.resize(READ_CHUNK, 0);
                let got = self.target.read(&mut state.input, 1)?;
                state.input.truncate(got);
                state.input_pos = 0;
                if got == 0 {
                    state.target_eof = true;
                    state.finish_input()?;
                    tracing::trace!(chars = state.offset, "base64 input finished");
                }
                continue;
            }

            let c = state.input[state.input_pos];
            state.input_pos += 1;
            state.offset += 1;
            state.push_char(c, &self.config)?;
        }
        Ok(filled)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        if self.closed || self.finished {
            return Err(StreamError::Closed);
        }
        let State::Encode(state) = &mut self.state else {
            return Err(StreamError::wrong_mode("write", Mode::Read));
        };

        for &byte in buf {
            state.group[state.group_len] = byte;
            state.group_len += 1;
            if state.group_len == 3 {
                state.emit_group(&self.config);
            }
        }
        if !state.out.is_empty() {
            self.target.write(&state.out)?;
            state.out.clear();
        }
        Ok(())
    }

    fn is_eof(&self) -> bool {
        match &self.state {
            State::Decode(state) => state.done && state.ready_pos == state.ready_len,
            State::Encode(_) => false,
        }
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.finish()?;
        self.closed = true;
        self.target.close()
    }
}

impl<S: ByteStream> TransformStream for Base64Codec<S> {
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
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        if let State::Encode(state) = &mut self.state {
            state.emit_tail(&self.config);
            if !state.out.is_empty() {
                self.target.write(&state.out)?;
                state.out.clear();
            }
        }
        Ok(())
    }
}
