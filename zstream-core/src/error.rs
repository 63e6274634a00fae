//! Error types for zstream operations.
//!
//! Every failure inside the codec is one of the variants below. The session
//! layer never lets these escape as panics: it converts them into a
//! [`Status`] code with [`ZStreamError::status`] and keeps the rendered
//! message for the caller.

use crate::traits::Status;
use std::io;
use thiserror::Error;

/// The main error type for zstream operations.
#[derive(Debug, Error)]
pub enum ZStreamError {
    /// I/O error from an underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed compressed data (bad block header, bad code, bad lengths).
    #[error("{message} (input offset {offset})")]
    CorruptedData {
        /// Byte offset into the compressed input where the error was found.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// A set of code lengths does not describe a usable prefix code.
    #[error("{message}")]
    InvalidCodeLengths {
        /// Which set was rejected and why.
        message: String,
    },

    /// Back-reference reaching before the start of the produced output.
    #[error("invalid distance too far back: {distance} exceeds history size {history_size}")]
    InvalidDistance {
        /// The offending distance.
        distance: usize,
        /// Bytes of history available at that point.
        history_size: usize,
    },

    /// Input ended before the compressed stream was complete.
    #[error("unexpected end of input: stream incomplete after {consumed} bytes")]
    UnexpectedEof {
        /// Number of input bytes consumed before running dry.
        consumed: u64,
    },

    /// The stream was used in a way its lifecycle does not permit.
    #[error("stream error: {message}")]
    StreamMisuse {
        /// Description of the misuse.
        message: String,
    },

    /// A configuration parameter is outside its accepted range.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: i64,
    },

    /// Internal buffers could not be allocated.
    #[error("insufficient memory: could not allocate {bytes} bytes")]
    Memory {
        /// Size of the failed allocation.
        bytes: usize,
    },
}

/// Result type alias for zstream operations.
pub type Result<T> = std::result::Result<T, ZStreamError>;

impl ZStreamError {
    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid code lengths error.
    pub fn invalid_code_lengths(message: impl Into<String>) -> Self {
        Self::InvalidCodeLengths {
            message: message.into(),
        }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create an unexpected end of input error.
    pub fn unexpected_eof(consumed: u64) -> Self {
        Self::UnexpectedEof { consumed }
    }

    /// Create a stream misuse error.
    pub fn stream_misuse(message: impl Into<String>) -> Self {
        Self::StreamMisuse {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: &'static str, value: impl Into<i64>) -> Self {
        Self::InvalidParameter {
            name,
            value: value.into(),
        }
    }

    /// Create an allocation failure error.
    pub fn memory(bytes: usize) -> Self {
        Self::Memory { bytes }
    }

    /// The status code this error is reported as at the stream boundary.
    pub fn status(&self) -> Status {
        match self {
            Self::Io(_) => Status::ErrNo,
            Self::CorruptedData { .. }
            | Self::InvalidCodeLengths { .. }
            | Self::InvalidDistance { .. } => Status::DataError,
            Self::UnexpectedEof { .. } => Status::BufError,
            Self::StreamMisuse { .. } | Self::InvalidParameter { .. } => Status::StreamError,
            Self::Memory { .. } => Status::MemError,
        }
    }

    /// Whether the stream that produced this error can still be resumed.
    pub fn is_recoverable(&self) -> bool {
        self.status() == Status::BufError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ZStreamError::corrupted(12, "invalid block type");
        assert!(err.to_string().contains("invalid block type"));
        assert!(err.to_string().contains("12"));

        let err = ZStreamError::invalid_distance(40, 3);
        assert!(err.to_string().contains("too far back"));

        let err = ZStreamError::invalid_parameter("window_bits", 20);
        assert!(err.to_string().contains("window_bits"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ZStreamError::corrupted(0, "x").status(), Status::DataError);
        assert_eq!(
            ZStreamError::invalid_code_lengths("over-subscribed").status(),
            Status::DataError
        );
        assert_eq!(
            ZStreamError::stream_misuse("not initialised").status(),
            Status::StreamError
        );
        assert_eq!(ZStreamError::memory(1 << 20).status(), Status::MemError);
        assert_eq!(ZStreamError::unexpected_eof(9).status(), Status::BufError);
        assert!(ZStreamError::unexpected_eof(9).is_recoverable());
        assert!(!ZStreamError::invalid_distance(2, 1).is_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: ZStreamError = io_err.into();
        assert!(matches!(err, ZStreamError::Io(_)));
        assert_eq!(err.status(), Status::ErrNo);
    }
}
