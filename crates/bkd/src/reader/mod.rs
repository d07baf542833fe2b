//! Point record sources.
//!
//! A BKD build pulls points from whatever holds them: an in-memory heap
//! while the working set fits, spill files once it doesn't. Both are
//! exposed through [`PointRecordSource`] so the consumer never cares which
//! one it has.
//!
//! The protocol is pull-based:
//!
//! ```ignore
//! while source.advance()? {
//!     let record = source.record();
//!     // record.packed_value is only valid until the next advance
//! }
//! source.release()?;
//! ```

mod heap;
mod offline;

pub use crate::format::PointRecord;
pub use heap::{HeapPointReader, HeapPoints};
pub use offline::OfflinePointReader;

use crate::error::PointResult;

/// Forward-only source of point records.
///
/// Accessors describe the record produced by the most recent successful
/// [`advance`](PointRecordSource::advance). Their values are meaningless
/// before the first one.
pub trait PointRecordSource {
    /// Move to the next record.
    ///
    /// Returns `Ok(false)` once the source is exhausted; further calls keep
    /// returning `Ok(false)`.
    fn advance(&mut self) -> PointResult<bool>;

    /// Packed value of the current record.
    fn packed_value(&self) -> &[u8];

    /// Ordinal of the current record.
    fn ord(&self) -> u64;

    /// Doc id of the current record.
    fn doc_id(&self) -> i32;

    /// Release the underlying resource. No further `advance` is valid.
    fn release(&mut self) -> PointResult<()>;

    /// The current record as a single view.
    fn record(&self) -> PointRecord<'_> {
        PointRecord {
            packed_value: self.packed_value(),
            ord: self.ord(),
            doc_id: self.doc_id(),
        }
    }
}
