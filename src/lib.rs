//! Strata Points - offline point record streams for BKD index builds
//!
//! A disk-backed BKD build spills points to temporary files when they no
//! longer fit in memory, then reads them back in record ranges. This crate
//! exposes the readers for those spill files along with an in-memory source
//! that shares the same [`PointRecordSource`] capability.
//!
//! # Quick Start
//!
//! ```ignore
//! use strata_points::{FsTempDirectory, OfflinePointReader, PointReaderConfig, PointRecordSource, RecordCount};
//!
//! let dir = FsTempDirectory::new(spill_dir);
//! let config = PointReaderConfig::new(8).with_record_count(RecordCount::Exact(count));
//! let mut reader = OfflinePointReader::open(&dir, "points.tmp", config)?;
//! while reader.advance()? {
//!     let point = reader.record();
//! }
//! reader.release()?;
//! ```

// Re-export the public API from strata-bkd
pub use strata_bkd::*;
