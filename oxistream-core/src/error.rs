//! Error types for OxiStream operations.
//!
//! Every failure a stream or transform can report is one variant of
//! [`StreamError`]. Errors are fatal to the stream instance that raised
//! them: a caller that sees an error should discard the stream.

use crate::traits::Mode;
use std::io;
use thiserror::Error;

/// The class of a [`StreamError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input violates the codec's alphabet or format.
    MalformedInput,
    /// End-of-data reached before a required terminator or symbol.
    TruncatedStream,
    /// Internally inconsistent data (e.g. a back-reference before the start).
    CorruptData,
    /// Recomputed checksum differs from the transmitted one.
    IntegrityMismatch,
    /// Failure reported by the underlying transport.
    Transport,
    /// Misuse of the stream API (wrong mode, use after close, bad config).
    Usage,
}

/// The main error type for OxiStream operations.
#[derive(Debug, Error)]
pub enum StreamError {
    /// I/O error from the underlying transport, propagated unchanged.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// Input does not belong to the codec's alphabet or format.
    #[error("malformed input at offset {offset}: {message}")]
    Malformed {
        /// Byte offset (in the codec's input) where the problem was found.
        offset: u64,
        /// Description of the problem.
        message: String,
    },

    /// End-of-data was reached before the stream was complete.
    #[error("truncated stream: {message}")]
    Truncated {
        /// What was being read when the data ran out.
        message: String,
    },

    /// Data decoded without format errors but is internally inconsistent.
    #[error("corrupt data at offset {offset}: {message}")]
    Corrupt {
        /// Byte offset (in the decoded output) where corruption was detected.
        offset: u64,
        /// Description of the inconsistency.
        message: String,
    },

    /// CRC recomputed on decode differs from the transmitted value.
    #[error("integrity mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    IntegrityMismatch {
        /// Checksum carried by the stream.
        expected: u32,
        /// Checksum computed over the received data.
        computed: u32,
    },

    /// The operation is not valid for the stream's mode.
    #[error("cannot {operation} a stream opened in {mode:?} mode")]
    WrongMode {
        /// The attempted operation.
        operation: &'static str,
        /// The stream's mode.
        mode: Mode,
    },

    /// The stream was already closed.
    #[error("stream is closed")]
    Closed,

    /// A codec configuration was rejected.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Why the configuration is invalid.
        message: String,
    },
}

/// Result type alias for OxiStream operations.
pub type Result<T> = std::result::Result<T, StreamError>;

impl StreamError {
    /// Create a malformed input error.
    pub fn malformed(offset: u64, message: impl Into<String>) -> Self {
        Self::Malformed {
            offset,
            message: message.into(),
        }
    }

    /// Create a truncated stream error.
    pub fn truncated(message: impl Into<String>) -> Self {
        Self::Truncated {
            message: message.into(),
        }
    }

    /// Create a corrupt data error.
    pub fn corrupt(offset: u64, message: impl Into<String>) -> Self {
        Self::Corrupt {
            offset,
            message: message.into(),
        }
    }

    /// Create an integrity mismatch error.
    pub fn integrity_mismatch(expected: u32, computed: u32) -> Self {
        Self::IntegrityMismatch { expected, computed }
    }

    /// Create a wrong mode error.
    pub fn wrong_mode(operation: &'static str, mode: Mode) -> Self {
        Self::WrongMode { operation, mode }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// The taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::Malformed { .. } => ErrorKind::MalformedInput,
            Self::Truncated { .. } => ErrorKind::TruncatedStream,
            Self::Corrupt { .. } => ErrorKind::CorruptData,
            Self::IntegrityMismatch { .. } => ErrorKind::IntegrityMismatch,
            Self::WrongMode { .. } | Self::Closed | Self::InvalidConfig { .. } => ErrorKind::Usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StreamError::integrity_mismatch(0x12345678, 0xDEADBEEF);
        assert!(err.to_string().contains("0x12345678"));
        assert_eq!(err.kind(), ErrorKind::IntegrityMismatch);

        let err = StreamError::malformed(7, "invalid character '!'");
        assert!(err.to_string().contains("offset 7"));
        assert_eq!(err.kind(), ErrorKind::MalformedInput);

        let err = StreamError::wrong_mode("write", Mode::Read);
        assert!(err.to_string().contains("Read"));
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let err: StreamError = io_err.into();
        assert!(matches!(err, StreamError::Transport(_)));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
