//! Point spill streams for BKD index construction
//!
//! When a BKD tree build has more points than fit in memory, the builder
//! spills them to temporary files as fixed-width records and reads them back
//! in ranges. This crate implements the read side:
//!
//! - `format`: the record layout (packed value, ordinal, doc id)
//! - `store`: the `ByteStream` / `TempDirectory` seam over temporary storage
//! - `reader`: the `PointRecordSource` capability with an offline
//!   (disk-backed) reader and an in-memory heap reader
//! - `config`: reader construction parameters and validation
//!
//! # Usage
//!
//! ```ignore
//! use strata_bkd::{FsTempDirectory, OfflinePointReader, PointReaderConfig, PointRecordSource};
//!
//! let dir = FsTempDirectory::new("/tmp/bkd");
//! let config = PointReaderConfig::new(8).with_start_record(100);
//! let mut reader = OfflinePointReader::open(&dir, "points.tmp", config)?;
//! while reader.advance()? {
//!     consume(reader.packed_value(), reader.ord(), reader.doc_id());
//! }
//! reader.release()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod format;
pub mod reader;
pub mod store;

pub use config::{PointReaderConfig, PointReaderConfigError, RecordCount};
pub use error::{PointReadError, PointResult};
pub use format::{OrdWidth, RecordFormatError, RecordLayout, DOC_ID_BYTES};
pub use reader::{
    HeapPointReader, HeapPoints, OfflinePointReader, PointRecord, PointRecordSource,
};
pub use store::{ByteStream, FsTempDirectory, TempDirectory};
