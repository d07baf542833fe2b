//! Point reader errors.

use crate::config::PointReaderConfigError;
use crate::format::RecordFormatError;
use std::io;
use thiserror::Error;

/// Result type for point reader operations
pub type PointResult<T> = std::result::Result<T, PointReadError>;

/// Errors surfaced by point readers.
///
/// Reaching the end of an unbounded stream on a record boundary is not an
/// error; it is `advance() == Ok(false)`. Everything here is fatal to the
/// reader instance.
#[derive(Debug, Error)]
pub enum PointReadError {
    /// Construction parameters were rejected.
    #[error("Invalid point reader config: {0}")]
    InvalidConfig(#[from] PointReaderConfigError),

    /// Opening the named resource failed.
    #[error("Failed to open point stream '{name}': {source}")]
    Open {
        /// Resource name
        name: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Seeking to the first record failed.
    #[error("Failed to seek point stream to byte offset {offset}: {source}")]
    Seek {
        /// Target byte offset
        offset: u64,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The stream ended mid-record, or before an exact record count was
    /// satisfied. Indicates a truncated stream or a wrong count.
    #[error(
        "Unexpected end of point stream at record {record}: read {bytes_read} of {record_size} bytes"
    )]
    UnexpectedEndOfStream {
        /// Absolute index of the record being read
        record: u64,
        /// Bytes of that record that were available
        bytes_read: usize,
        /// Bytes per record
        record_size: usize,
    },

    /// An exact count ran past the end of an in-memory point set.
    #[error("Point range ran past {len} in-memory points at record {record}")]
    PointsExhausted {
        /// Index of the point that was requested
        record: u64,
        /// Number of points held
        len: usize,
    },

    /// A full record could not be decoded.
    #[error("Malformed point record: {0}")]
    Format(#[from] RecordFormatError),

    /// Any other read failure.
    #[error("I/O error reading record {record}: {source}")]
    Io {
        /// Absolute index of the record being read
        record: u64,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Closing the stream failed.
    #[error("Failed to release point stream: {source}")]
    Release {
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// An earlier read failed, leaving the stream at an unknown position.
    /// The reader must be reopened.
    #[error("Point reader failed at record {record}; reopen to continue")]
    Failed {
        /// Absolute index of the record whose read failed
        record: u64,
    },

    /// The reader was used after `release`.
    #[error("Point reader already released")]
    Released,
}

impl PointReadError {
    /// Whether this error means the stream held fewer bytes than promised.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            PointReadError::UnexpectedEndOfStream { .. } | PointReadError::PointsExhausted { .. }
        )
    }
}
