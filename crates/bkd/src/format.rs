//! Spill record format.
//!
//! A spill file is a flat sequence of fixed-width records. There is no
//! header, footer, delimiter or checksum, so a record is addressed purely by
//! its index: record `i` starts at byte `i * record_size`.
//!
//! # Record Layout
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────┬──────────────┐
//! │ Packed value (packed_bytes)  │ Ord (4 or 8, BE) │ DocId (4, BE)│
//! └──────────────────────────────┴──────────────────┴──────────────┘
//! ```
//!
//! Integers are big-endian. The ordinal width is a property of the stream
//! and must match what the producer wrote.

use byteorder::{BigEndian, ByteOrder};

/// Width of the doc id field in bytes
pub const DOC_ID_BYTES: usize = 4;

/// Encoded width of the ordinal field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrdWidth {
    /// 4-byte ordinals
    Narrow,
    /// 8-byte ordinals
    Wide,
}

impl OrdWidth {
    /// Select the width from a "long ords" flag.
    pub fn from_wide(wide: bool) -> Self {
        if wide {
            OrdWidth::Wide
        } else {
            OrdWidth::Narrow
        }
    }

    /// Number of bytes the ordinal occupies on disk.
    pub fn bytes(self) -> usize {
        match self {
            OrdWidth::Narrow => 4,
            OrdWidth::Wide => 8,
        }
    }

    /// Largest ordinal representable at this width.
    pub fn max_ord(self) -> u64 {
        match self {
            OrdWidth::Narrow => u32::MAX as u64,
            OrdWidth::Wide => u64::MAX,
        }
    }
}

/// Borrowed view of one point record.
///
/// The packed value borrows from whoever decoded the record. For a reader
/// that means the view is only valid until the next advance; copy the bytes
/// out if they must outlive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointRecord<'a> {
    /// Packed coordinate bytes
    pub packed_value: &'a [u8],
    /// Original insertion ordinal
    pub ord: u64,
    /// Owning document id
    pub doc_id: i32,
}

/// Fixed stride of the records in one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordLayout {
    packed_bytes_length: usize,
    ord_width: OrdWidth,
}

impl RecordLayout {
    /// Create a layout for `packed_bytes_length` bytes of packed value.
    pub fn new(packed_bytes_length: usize, ord_width: OrdWidth) -> Self {
        RecordLayout {
            packed_bytes_length,
            ord_width,
        }
    }

    /// Length of the packed value in bytes.
    pub fn packed_bytes_length(&self) -> usize {
        self.packed_bytes_length
    }

    /// Ordinal encoding width.
    pub fn ord_width(&self) -> OrdWidth {
        self.ord_width
    }

    /// Bytes per record: packed value + ordinal + doc id.
    pub fn record_size(&self) -> usize {
        self.packed_bytes_length + self.ord_width.bytes() + DOC_ID_BYTES
    }

    /// Byte offset of record `index`, or `None` if it overflows `u64`.
    pub fn offset_of(&self, index: u64) -> Option<u64> {
        index.checked_mul(self.record_size() as u64)
    }

    /// Append one encoded record to `out`.
    pub fn encode_into(
        &self,
        packed_value: &[u8],
        ord: u64,
        doc_id: i32,
        out: &mut Vec<u8>,
    ) -> Result<(), RecordFormatError> {
        if packed_value.len() != self.packed_bytes_length {
            return Err(RecordFormatError::PackedLength {
                expected: self.packed_bytes_length,
                actual: packed_value.len(),
            });
        }
        if ord > self.ord_width.max_ord() {
            return Err(RecordFormatError::OrdOverflow {
                ord,
                width: self.ord_width.bytes(),
            });
        }

        out.reserve(self.record_size());
        out.extend_from_slice(packed_value);

        let mut field = [0u8; 8];
        match self.ord_width {
            OrdWidth::Narrow => {
                BigEndian::write_u32(&mut field[..4], ord as u32);
                out.extend_from_slice(&field[..4]);
            }
            OrdWidth::Wide => {
                BigEndian::write_u64(&mut field, ord);
                out.extend_from_slice(&field);
            }
        }

        BigEndian::write_i32(&mut field[..DOC_ID_BYTES], doc_id);
        out.extend_from_slice(&field[..DOC_ID_BYTES]);
        Ok(())
    }

    /// Decode one record from exactly `record_size()` bytes.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<PointRecord<'a>, RecordFormatError> {
        if bytes.len() != self.record_size() {
            return Err(RecordFormatError::RecordLength {
                expected: self.record_size(),
                actual: bytes.len(),
            });
        }

        let (packed_value, rest) = bytes.split_at(self.packed_bytes_length);
        let (ord_bytes, doc_bytes) = rest.split_at(self.ord_width.bytes());
        let ord = match self.ord_width {
            OrdWidth::Narrow => BigEndian::read_u32(ord_bytes) as u64,
            OrdWidth::Wide => BigEndian::read_u64(ord_bytes),
        };

        Ok(PointRecord {
            packed_value,
            ord,
            doc_id: BigEndian::read_i32(doc_bytes),
        })
    }
}

/// Record encode/decode errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordFormatError {
    /// Packed value has the wrong length for this layout.
    #[error("Packed value length mismatch: expected {expected}, got {actual}")]
    PackedLength {
        /// Layout packed length
        expected: usize,
        /// Supplied length
        actual: usize,
    },

    /// Ordinal does not fit the layout's ordinal width.
    #[error("Ordinal {ord} does not fit in {width} bytes")]
    OrdOverflow {
        /// Ordinal that was rejected
        ord: u64,
        /// Ordinal width in bytes
        width: usize,
    },

    /// Buffer is not exactly one record long.
    #[error("Record length mismatch: expected {expected}, got {actual}")]
    RecordLength {
        /// Layout record size
        expected: usize,
        /// Supplied length
        actual: usize,
    },
}
