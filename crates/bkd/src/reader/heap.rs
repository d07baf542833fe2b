//! In-memory point source.
//!
//! Points that fit in memory are kept column-wise: one contiguous buffer of
//! packed values, plus parallel ordinal and doc id columns.
//!
//! Layout of the packed buffer: `[p0_b0, .., p0_bL, p1_b0, ..]`, each point
//! occupying `packed_bytes_length` consecutive bytes.

use super::PointRecordSource;
use crate::config::RecordCount;
use crate::error::{PointReadError, PointResult};
use crate::format::{PointRecord, RecordFormatError};

/// Columnar in-memory point storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapPoints {
    packed_bytes_length: usize,
    packed: Vec<u8>,
    ords: Vec<u64>,
    doc_ids: Vec<i32>,
}

impl HeapPoints {
    /// Create empty storage for `packed_bytes_length`-byte packed values.
    pub fn new(packed_bytes_length: usize) -> Self {
        Self::with_capacity(packed_bytes_length, 0)
    }

    /// Create empty storage with room for `capacity` points.
    pub fn with_capacity(packed_bytes_length: usize, capacity: usize) -> Self {
        HeapPoints {
            packed_bytes_length,
            packed: Vec::with_capacity(packed_bytes_length * capacity),
            ords: Vec::with_capacity(capacity),
            doc_ids: Vec::with_capacity(capacity),
        }
    }

    /// Append a point.
    pub fn push(
        &mut self,
        packed_value: &[u8],
        ord: u64,
        doc_id: i32,
    ) -> Result<(), RecordFormatError> {
        if packed_value.len() != self.packed_bytes_length {
            return Err(RecordFormatError::PackedLength {
                expected: self.packed_bytes_length,
                actual: packed_value.len(),
            });
        }
        self.packed.extend_from_slice(packed_value);
        self.ords.push(ord);
        self.doc_ids.push(doc_id);
        Ok(())
    }

    /// Number of points stored.
    pub fn len(&self) -> usize {
        self.ords.len()
    }

    /// Whether no points are stored.
    pub fn is_empty(&self) -> bool {
        self.ords.is_empty()
    }

    /// Packed value length in bytes.
    pub fn packed_bytes_length(&self) -> usize {
        self.packed_bytes_length
    }

    /// Point at `index`, if present.
    pub fn get(&self, index: usize) -> Option<PointRecord<'_>> {
        let ord = *self.ords.get(index)?;
        let start = index * self.packed_bytes_length;
        Some(PointRecord {
            packed_value: &self.packed[start..start + self.packed_bytes_length],
            ord,
            doc_id: self.doc_ids[index],
        })
    }

    /// Reader over `count` points starting at `start`.
    ///
    /// An exact count that runs past the stored points fails with
    /// `PointsExhausted` on the advance that overruns, and on every advance
    /// after it.
    pub fn reader(&self, start: usize, count: RecordCount) -> HeapPointReader<'_> {
        let end = match count {
            RecordCount::Exact(n) => {
                Some(start.saturating_add(usize::try_from(n).unwrap_or(usize::MAX)))
            }
            RecordCount::Unbounded => None,
        };
        HeapPointReader {
            points: self,
            next: start,
            end,
            current: None,
            released: false,
            blank: vec![0u8; self.packed_bytes_length],
        }
    }
}

/// Reads a range of a [`HeapPoints`].
#[derive(Debug)]
pub struct HeapPointReader<'a> {
    points: &'a HeapPoints,
    next: usize,
    /// Exclusive end for an exact count
    end: Option<usize>,
    current: Option<usize>,
    released: bool,
    /// Returned as the packed value before the first advance
    blank: Vec<u8>,
}

impl<'a> HeapPointReader<'a> {
    fn current(&self) -> Option<PointRecord<'a>> {
        let points = self.points;
        self.current.and_then(|index| points.get(index))
    }
}

impl PointRecordSource for HeapPointReader<'_> {
    fn advance(&mut self) -> PointResult<bool> {
        if self.released {
            return Err(PointReadError::Released);
        }

        match self.end {
            Some(end) if self.next >= end => return Ok(false),
            Some(_) if self.next >= self.points.len() => {
                return Err(PointReadError::PointsExhausted {
                    record: self.next as u64,
                    len: self.points.len(),
                });
            }
            None if self.next >= self.points.len() => return Ok(false),
            _ => {}
        }

        self.current = Some(self.next);
        self.next += 1;
        Ok(true)
    }

    fn packed_value(&self) -> &[u8] {
        match self.current() {
            Some(record) => record.packed_value,
            None => &self.blank,
        }
    }

    fn ord(&self) -> u64 {
        self.current().map_or(0, |record| record.ord)
    }

    fn doc_id(&self) -> i32 {
        self.current().map_or(0, |record| record.doc_id)
    }

    fn release(&mut self) -> PointResult<()> {
        self.released = true;
        Ok(())
    }
}
