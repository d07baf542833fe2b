//! Disk-backed point reader.
//!
//! Reads fixed-width point records back from a spill file, starting at a
//! record index and yielding either an exact number of records or
//! everything up to the end of the stream.
//!
//! ## Termination
//!
//! - Counted (`RecordCount::Exact`): stops after the declared count. If the
//!   stream runs out first the declared count was wrong or the file was
//!   truncated, and the reader fails with `UnexpectedEndOfStream`.
//! - Unbounded: stops when the stream ends exactly on a record boundary.
//!   Ending mid-record is `UnexpectedEndOfStream`.

use super::PointRecordSource;
use crate::config::{PointReaderConfig, RecordCount};
use crate::error::{PointReadError, PointResult};
use crate::format::RecordLayout;
use crate::store::{ByteStream, TempDirectory};
use std::io::{self, Seek, SeekFrom};
use tracing::{debug, trace, warn};

/// Termination state of an offline reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadMode {
    /// Exact count; `remaining` records are still owed.
    Counted { remaining: u64 },
    /// Read until a clean end of stream.
    Unbounded,
    /// Unbounded stream hit its end.
    Exhausted,
    /// A read failed; the stream position is no longer trustworthy.
    Failed {
        record: u64,
        remaining: Option<u64>,
    },
}

/// Reads points from a spill file in the fixed-width record format.
///
/// The reader owns its stream until [`release`](PointRecordSource::release)
/// or drop. The record buffer is reused across advances, so
/// [`packed_value`](PointRecordSource::packed_value) borrows from the reader
/// and cannot be held across the next `advance`.
pub struct OfflinePointReader {
    /// Resource name (for diagnostics)
    name: String,

    /// Underlying stream; `None` once released
    stream: Option<Box<dyn ByteStream>>,

    /// Record stride
    layout: RecordLayout,

    /// Termination state
    mode: ReadMode,

    /// Raw bytes of the current record
    record: Vec<u8>,

    ord: u64,
    doc_id: i32,

    /// Index of the first record this reader covers
    start_record: u64,

    /// Successful advances so far
    records_read: u64,
}

impl OfflinePointReader {
    /// Open `name` in `dir` and position at the configured start record.
    pub fn open<D>(dir: &D, name: &str, config: PointReaderConfig) -> PointResult<Self>
    where
        D: TempDirectory + ?Sized,
    {
        config.validate()?;

        let stream = dir.open_input(name).map_err(|source| PointReadError::Open {
            name: name.to_string(),
            source,
        })?;

        Self::from_stream(name, stream, config)
    }

    /// Wrap an already-open stream and seek to the configured start record.
    pub fn from_stream(
        name: impl Into<String>,
        mut stream: Box<dyn ByteStream>,
        config: PointReaderConfig,
    ) -> PointResult<Self> {
        config.validate()?;

        let name = name.into();
        let layout = config.layout();
        let offset = config.start_offset()?;

        stream
            .seek(SeekFrom::Start(offset))
            .map_err(|source| PointReadError::Seek { offset, source })?;

        let mode = match config.record_count {
            RecordCount::Exact(count) => ReadMode::Counted { remaining: count },
            RecordCount::Unbounded => ReadMode::Unbounded,
        };

        debug!(
            name = %name,
            offset,
            record_size = layout.record_size(),
            start_record = config.start_record,
            record_count = ?config.record_count,
            "Opened point reader"
        );

        Ok(OfflinePointReader {
            name,
            stream: Some(stream),
            layout,
            mode,
            record: vec![0u8; layout.record_size()],
            ord: 0,
            doc_id: 0,
            start_record: config.start_record,
            records_read: 0,
        })
    }

    /// Record stride of this stream.
    pub fn layout(&self) -> RecordLayout {
        self.layout
    }

    /// Records still owed in counted mode; `None` when unbounded.
    pub fn remaining(&self) -> Option<u64> {
        match self.mode {
            ReadMode::Counted { remaining } => Some(remaining),
            ReadMode::Failed { remaining, .. } => remaining,
            ReadMode::Unbounded | ReadMode::Exhausted => None,
        }
    }

    /// Number of successful advances.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Whether the stream has been released.
    pub fn is_released(&self) -> bool {
        self.stream.is_none()
    }

    /// Resource name this reader was opened on.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether an earlier read failed and the reader is unusable.
    pub fn is_failed(&self) -> bool {
        matches!(self.mode, ReadMode::Failed { .. })
    }

    fn read_next(&mut self) -> PointResult<bool> {
        let stream = self.stream.as_mut().ok_or(PointReadError::Released)?;

        let counted = match self.mode {
            ReadMode::Failed { record, .. } => return Err(PointReadError::Failed { record }),
            ReadMode::Exhausted | ReadMode::Counted { remaining: 0 } => return Ok(false),
            ReadMode::Counted { remaining } => {
                self.mode = ReadMode::Counted {
                    remaining: remaining - 1,
                };
                true
            }
            ReadMode::Unbounded => false,
        };

        let index = self.start_record + self.records_read;
        let filled = read_full(&mut **stream, &mut self.record)
            .map_err(|source| PointReadError::Io {
                record: index,
                source,
            })?;

        if filled < self.record.len() {
            if filled == 0 && !counted {
                self.mode = ReadMode::Exhausted;
                debug!(
                    name = %self.name,
                    records_read = self.records_read,
                    "Point stream exhausted"
                );
                return Ok(false);
            }

            warn!(
                name = %self.name,
                record = index,
                bytes_read = filled,
                record_size = self.record.len(),
                remaining = ?self.remaining(),
                "Point stream ended before the expected record"
            );
            return Err(PointReadError::UnexpectedEndOfStream {
                record: index,
                bytes_read: filled,
                record_size: self.record.len(),
            });
        }

        let decoded = self.layout.decode(&self.record)?;
        self.ord = decoded.ord;
        self.doc_id = decoded.doc_id;
        self.records_read += 1;

        trace!(record = index, ord = self.ord, doc_id = self.doc_id, "Point read");
        Ok(true)
    }
}

impl PointRecordSource for OfflinePointReader {
    fn advance(&mut self) -> PointResult<bool> {
        let result = self.read_next();
        if let Err(e) = &result {
            if !matches!(e, PointReadError::Released | PointReadError::Failed { .. }) {
                self.mode = ReadMode::Failed {
                    record: self.start_record + self.records_read,
                    remaining: self.remaining(),
                };
            }
        }
        result
    }

    fn packed_value(&self) -> &[u8] {
        &self.record[..self.layout.packed_bytes_length()]
    }

    fn ord(&self) -> u64 {
        self.ord
    }

    fn doc_id(&self) -> i32 {
        self.doc_id
    }

    fn release(&mut self) -> PointResult<()> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };

        debug!(
            name = %self.name,
            records_read = self.records_read,
            "Releasing point reader"
        );
        stream
            .close()
            .map_err(|source| PointReadError::Release { source })
    }
}

impl Drop for OfflinePointReader {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.close() {
                debug!(name = %self.name, error = %e, "Error closing unreleased point reader");
            }
        }
    }
}

impl std::fmt::Debug for OfflinePointReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflinePointReader")
            .field("name", &self.name)
            .field("layout", &self.layout)
            .field("mode", &self.mode)
            .field("start_record", &self.start_record)
            .field("records_read", &self.records_read)
            .field("released", &self.stream.is_none())
            .finish()
    }
}

/// Fill `buf` from `stream`, returning how many bytes were available.
///
/// Short only at end of stream.
fn read_full(stream: &mut dyn ByteStream, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
