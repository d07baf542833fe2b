//! Point reader configuration.
//!
//! Describes which slice of a spill stream a reader covers and how its
//! records are laid out.

use crate::format::{OrdWidth, RecordLayout};

/// How many records a reader yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordCount {
    /// Exactly this many records; running out of data first is an error.
    Exact(u64),
    /// Read until the stream ends on a record boundary.
    Unbounded,
}

impl RecordCount {
    /// Map a signed count where any negative value (conventionally `-1`)
    /// means "read to end of stream".
    pub fn from_signed(count: i64) -> Self {
        if count < 0 {
            RecordCount::Unbounded
        } else {
            RecordCount::Exact(count as u64)
        }
    }
}

/// Point reader configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointReaderConfig {
    /// Length of each record's packed value in bytes. Must be positive.
    pub packed_bytes_length: usize,

    /// Index of the first record to read (a record index, not a byte offset).
    pub start_record: u64,

    /// Number of records to read (default: unbounded).
    pub record_count: RecordCount,

    /// Width of the encoded ordinal (default: wide).
    pub ord_width: OrdWidth,
}

impl PointReaderConfig {
    /// Read the whole stream from record 0 with wide ordinals.
    pub fn new(packed_bytes_length: usize) -> Self {
        PointReaderConfig {
            packed_bytes_length,
            start_record: 0,
            record_count: RecordCount::Unbounded,
            ord_width: OrdWidth::Wide,
        }
    }

    /// Set the first record index (builder pattern).
    pub fn with_start_record(mut self, start_record: u64) -> Self {
        self.start_record = start_record;
        self
    }

    /// Set the record count (builder pattern).
    pub fn with_record_count(mut self, record_count: RecordCount) -> Self {
        self.record_count = record_count;
        self
    }

    /// Set the ordinal width (builder pattern).
    pub fn with_ord_width(mut self, ord_width: OrdWidth) -> Self {
        self.ord_width = ord_width;
        self
    }

    /// Record layout implied by this configuration.
    pub fn layout(&self) -> RecordLayout {
        RecordLayout::new(self.packed_bytes_length, self.ord_width)
    }

    /// Byte offset of the first record.
    pub fn start_offset(&self) -> Result<u64, PointReaderConfigError> {
        let layout = self.layout();
        layout
            .offset_of(self.start_record)
            .ok_or_else(|| PointReaderConfigError::StartOffsetOverflow {
                start_record: self.start_record,
                record_size: layout.record_size(),
            })
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), PointReaderConfigError> {
        if self.packed_bytes_length == 0 {
            return Err(PointReaderConfigError::EmptyPackedValue);
        }
        self.start_offset()?;
        Ok(())
    }

    /// Small two-byte records with narrow ordinals.
    pub fn for_testing() -> Self {
        PointReaderConfig::new(2).with_ord_width(OrdWidth::Narrow)
    }
}

/// Point reader configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointReaderConfigError {
    /// Packed value length is zero.
    #[error("Packed value length must be positive")]
    EmptyPackedValue,

    /// `start_record * record_size` does not fit a byte offset.
    #[error("Start record {start_record} with record size {record_size} overflows the byte offset")]
    StartOffsetOverflow {
        /// Requested start record
        start_record: u64,
        /// Bytes per record
        record_size: usize,
    },
}
