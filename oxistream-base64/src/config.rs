//! Base64 alphabets and configuration.

use oxistream_core::{Result, StreamError};

const STANDARD_CHARS: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const URL_SAFE_CHARS: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Marks bytes outside the alphabet in a decode table.
pub(crate) const INVALID: u8 = 0xFF;

/// Padding character.
pub const PAD: u8 = b'=';

const fn decode_table(chars: &[u8; 64]) -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < 64 {
        table[chars[i] as usize] = i as u8;
        i += 1;
    }
    table
}

const STANDARD_DECODE: [u8; 256] = decode_table(STANDARD_CHARS);
const URL_SAFE_DECODE: [u8; 256] = decode_table(URL_SAFE_CHARS);

/// The 64-character alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alphabet {
    /// `A-Z a-z 0-9 + /`
    #[default]
    Standard,
    /// `A-Z a-z 0-9 - _`
    UrlSafe,
}

impl Alphabet {
    /// Encoding table.
    pub fn chars(self) -> &'static [u8; 64] {
        match self {
            Self::Standard => STANDARD_CHARS,
            Self::UrlSafe => URL_SAFE_CHARS,
        }
    }

    /// Value of `c`, or `None` if `c` is not in the alphabet.
    #[inline]
    pub fn decode(self, c: u8) -> Option<u8> {
        let table = match self {
            Self::Standard => &STANDARD_DECODE,
            Self::UrlSafe => &URL_SAFE_DECODE,
        };
        match table[c as usize] {
            INVALID => None,
            value => Some(value),
        }
    }
}

/// Base64 configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Base64Config {
    /// Character set.
    pub alphabet: Alphabet,
    /// Characters per output line; `None` disables wrapping. Lines are
    /// separated by CRLF.
    pub line_width: Option<usize>,
}

impl Base64Config {
    /// Standard alphabet, one unbroken line.
    pub const STANDARD: Self = Self {
        alphabet: Alphabet::Standard,
        line_width: None,
    };

    /// URL-safe alphabet, one unbroken line.
    pub const URL_SAFE: Self = Self {
        alphabet: Alphabet::UrlSafe,
        line_width: None,
    };

    /// Standard alphabet wrapped at 76 characters.
    pub const MIME: Self = Self {
        alphabet: Alphabet::Standard,
        line_width: Some(76),
    };

    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        match self.line_width {
            Some(width) if width == 0 || width % 4 != 0 => Err(StreamError::invalid_config(
                format!("line width must be a positive multiple of 4, got {width}"),
            )),
            _ => Ok(()),
        }
    }

    /// Whether CR and LF are line separators for this configuration.
    pub fn wraps(&self) -> bool {
        self.line_width.is_some()
    }

    /// Encoded length of `input_len` bytes, including padding and line
    /// separators.
    pub fn encoded_len(&self, input_len: usize) -> usize {
        let chars = input_len.div_ceil(3) * 4;
        match self.line_width {
            Some(width) if chars > 0 => chars + (chars - 1) / width * 2,
            _ => chars,
        }
    }
}

impl Default for Base64Config {
    fn default() -> Self {
        Self::STANDARD
    }
}
