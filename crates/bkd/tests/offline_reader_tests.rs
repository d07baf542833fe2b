//! Integration tests for the offline point reader
//!
//! These tests write spill files to a temporary directory and verify that
//! the reader:
//! 1. Yields every record, in order, for full and tail ranges
//! 2. Distinguishes counted from unbounded termination
//! 3. Decodes both ordinal widths
//! 4. Surfaces open, seek, read and release failures unchanged

use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use strata_bkd::{
    ByteStream, FsTempDirectory, OfflinePointReader, OrdWidth, PointReadError,
    PointReaderConfig, PointRecordSource, RecordCount, RecordLayout, TempDirectory,
};
use tempfile::TempDir;

type Point = (Vec<u8>, u64, i32);

/// Helper to write `points` as a spill file named `name`
fn write_spill(dir: &Path, name: &str, layout: RecordLayout, points: &[Point]) {
    let mut bytes = Vec::new();
    for (packed, ord, doc_id) in points {
        layout.encode_into(packed, *ord, *doc_id, &mut bytes).unwrap();
    }
    std::fs::write(dir.join(name), bytes).unwrap();
}

/// Helper to read everything a reader yields, then release it
fn drain(reader: &mut OfflinePointReader) -> Vec<Point> {
    let mut out = Vec::new();
    while reader.advance().unwrap() {
        out.push((reader.packed_value().to_vec(), reader.ord(), reader.doc_id()));
    }
    reader.release().unwrap();
    out
}

fn sample_points(n: usize, packed_len: usize) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let packed: Vec<u8> = (0..packed_len).map(|b| (i * 31 + b) as u8).collect();
            (packed, (i * 3) as u64, 1000 + i as i32)
        })
        .collect()
}

// ============================================================================
// Range Tests
// ============================================================================

#[test]
fn test_full_counted_read() {
    let temp_dir = TempDir::new().unwrap();
    let layout = RecordLayout::new(6, OrdWidth::Narrow);
    let points = sample_points(25, 6);
    write_spill(temp_dir.path(), "full.tmp", layout, &points);

    let dir = FsTempDirectory::new(temp_dir.path());
    let config = PointReaderConfig::new(6)
        .with_ord_width(OrdWidth::Narrow)
        .with_record_count(RecordCount::Exact(25));
    let mut reader = OfflinePointReader::open(&dir, "full.tmp", config).unwrap();

    assert_eq!(drain(&mut reader), points);
    assert_eq!(reader.records_read(), 25);
}

#[test]
fn test_tail_matches_full_read_skip() {
    let temp_dir = TempDir::new().unwrap();
    let layout = RecordLayout::new(4, OrdWidth::Wide);
    let points = sample_points(12, 4);
    write_spill(temp_dir.path(), "tail.tmp", layout, &points);

    let dir = FsTempDirectory::new(temp_dir.path());
    for k in 0..=points.len() {
        let config = PointReaderConfig::new(4)
            .with_start_record(k as u64)
            .with_record_count(RecordCount::Exact((points.len() - k) as u64));
        let mut reader = OfflinePointReader::open(&dir, "tail.tmp", config).unwrap();

        assert_eq!(drain(&mut reader), points[k..].to_vec(), "start_record = {}", k);
    }
}

#[test]
fn test_disjoint_ranges_cover_stream() {
    let temp_dir = TempDir::new().unwrap();
    let layout = RecordLayout::new(3, OrdWidth::Narrow);
    let points = sample_points(10, 3);
    write_spill(temp_dir.path(), "split.tmp", layout, &points);

    let dir = FsTempDirectory::new(temp_dir.path());
    let mut combined = Vec::new();
    for (start, count) in [(0u64, 4u64), (4, 3), (7, 3)] {
        let config = PointReaderConfig::new(3)
            .with_ord_width(OrdWidth::Narrow)
            .with_start_record(start)
            .with_record_count(RecordCount::Exact(count));
        let mut reader = OfflinePointReader::open(&dir, "split.tmp", config).unwrap();
        combined.extend(drain(&mut reader));
    }

    assert_eq!(combined, points);
}

#[test]
fn test_worked_example() {
    let temp_dir = TempDir::new().unwrap();
    let layout = RecordLayout::new(2, OrdWidth::Narrow);
    write_spill(
        temp_dir.path(),
        "example.tmp",
        layout,
        &[
            (vec![0x01, 0x02], 5, 100),
            (vec![0x03, 0x04], 6, 101),
            (vec![0x05, 0x06], 7, 102),
        ],
    );

    let dir = FsTempDirectory::new(temp_dir.path());
    let config = PointReaderConfig::for_testing()
        .with_start_record(1)
        .with_record_count(RecordCount::from_signed(2));
    let mut reader = OfflinePointReader::open(&dir, "example.tmp", config).unwrap();

    assert!(reader.advance().unwrap());
    assert_eq!((reader.ord(), reader.doc_id()), (6, 101));
    assert!(reader.advance().unwrap());
    assert_eq!((reader.ord(), reader.doc_id()), (7, 102));
    assert!(!reader.advance().unwrap());
    reader.release().unwrap();
}

// ============================================================================
// Termination Tests
// ============================================================================

#[test]
fn test_unbounded_read() {
    let temp_dir = TempDir::new().unwrap();
    let layout = RecordLayout::new(8, OrdWidth::Wide);
    let points = sample_points(7, 8);
    write_spill(temp_dir.path(), "unbounded.tmp", layout, &points);

    let dir = FsTempDirectory::new(temp_dir.path());
    let config = PointReaderConfig::new(8).with_record_count(RecordCount::from_signed(-1));
    let mut reader = OfflinePointReader::open(&dir, "unbounded.tmp", config).unwrap();

    assert_eq!(drain(&mut reader), points);
}

#[test]
fn test_declared_count_exceeds_stream() {
    let temp_dir = TempDir::new().unwrap();
    let layout = RecordLayout::new(2, OrdWidth::Narrow);
    write_spill(temp_dir.path(), "short.tmp", layout, &sample_points(3, 2));

    let dir = FsTempDirectory::new(temp_dir.path());
    let config = PointReaderConfig::for_testing().with_record_count(RecordCount::Exact(5));
    let mut reader = OfflinePointReader::open(&dir, "short.tmp", config).unwrap();

    for _ in 0..3 {
        assert!(reader.advance().unwrap());
    }
    let err = reader.advance().unwrap_err();
    assert!(err.is_truncation(), "expected truncation, got {:?}", err);
    assert_eq!(reader.remaining(), Some(1));
}

#[test]
fn test_truncated_unbounded_stream() {
    let temp_dir = TempDir::new().unwrap();
    let layout = RecordLayout::new(2, OrdWidth::Narrow);
    write_spill(temp_dir.path(), "torn.tmp", layout, &sample_points(2, 2));

    // Append half a record
    let path = temp_dir.path().join("torn.tmp");
    let mut bytes = std::fs::read(&path).unwrap();
    bytes.extend_from_slice(&[0xAB; 5]);
    std::fs::write(&path, bytes).unwrap();

    let dir = FsTempDirectory::new(temp_dir.path());
    let mut reader =
        OfflinePointReader::open(&dir, "torn.tmp", PointReaderConfig::for_testing()).unwrap();

    assert!(reader.advance().unwrap());
    assert!(reader.advance().unwrap());
    assert!(matches!(
        reader.advance(),
        Err(PointReadError::UnexpectedEndOfStream {
            record: 2,
            bytes_read: 5,
            record_size: 10
        })
    ));
}

// ============================================================================
// Ordinal Width Tests
// ============================================================================

#[test]
fn test_both_widths_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let dir = FsTempDirectory::new(temp_dir.path());

    for width in [OrdWidth::Narrow, OrdWidth::Wide] {
        let name = format!("{:?}.tmp", width);
        let points: Vec<Point> = (0..5u64)
            .map(|i| (vec![i as u8; 3], width.max_ord() - i, -(i as i32)))
            .collect();
        write_spill(temp_dir.path(), &name, RecordLayout::new(3, width), &points);

        let config = PointReaderConfig::new(3).with_ord_width(width);
        let mut reader = OfflinePointReader::open(&dir, &name, config).unwrap();
        assert_eq!(drain(&mut reader), points);
    }
}

#[test]
fn test_width_mismatch_does_not_panic() {
    let temp_dir = TempDir::new().unwrap();
    // 4 narrow records of 2 + 4 + 4 = 40 bytes; as wide records (14 bytes)
    // that is two whole records and a 12-byte tail.
    write_spill(
        temp_dir.path(),
        "mismatch.tmp",
        RecordLayout::new(2, OrdWidth::Narrow),
        &sample_points(4, 2),
    );

    let dir = FsTempDirectory::new(temp_dir.path());
    let config = PointReaderConfig::new(2).with_ord_width(OrdWidth::Wide);
    let mut reader = OfflinePointReader::open(&dir, "mismatch.tmp", config).unwrap();

    assert!(reader.advance().unwrap());
    assert!(reader.advance().unwrap());
    let err = reader.advance().unwrap_err();
    assert!(matches!(
        err,
        PointReadError::UnexpectedEndOfStream {
            bytes_read: 12,
            record_size: 14,
            ..
        }
    ));
}

// ============================================================================
// Failure Propagation Tests
// ============================================================================

/// Directory whose streams fail at a chosen step
#[derive(Default)]
struct FaultyDirectory {
    data: Vec<u8>,
    fail_open: bool,
    fail_seek: bool,
    fail_read: bool,
    fail_close: bool,
}

struct FaultyStream {
    inner: Cursor<Vec<u8>>,
    fail_seek: bool,
    fail_read: bool,
    fail_close: bool,
}

impl Read for FaultyStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.fail_read {
            return Err(io::Error::new(io::ErrorKind::Other, "injected read failure"));
        }
        self.inner.read(buf)
    }
}

impl Seek for FaultyStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        if self.fail_seek {
            return Err(io::Error::new(io::ErrorKind::Other, "injected seek failure"));
        }
        self.inner.seek(pos)
    }
}

impl ByteStream for FaultyStream {
    fn close(self: Box<Self>) -> io::Result<()> {
        if self.fail_close {
            return Err(io::Error::new(io::ErrorKind::Other, "injected close failure"));
        }
        Ok(())
    }
}

impl TempDirectory for FaultyDirectory {
    fn open_input(&self, name: &str) -> io::Result<Box<dyn ByteStream>> {
        if self.fail_open {
            return Err(io::Error::new(io::ErrorKind::NotFound, name.to_string()));
        }
        Ok(Box::new(FaultyStream {
            inner: Cursor::new(self.data.clone()),
            fail_seek: self.fail_seek,
            fail_read: self.fail_read,
            fail_close: self.fail_close,
        }))
    }
}

fn sample_bytes() -> Vec<u8> {
    let layout = RecordLayout::new(2, OrdWidth::Narrow);
    let mut bytes = Vec::new();
    for (packed, ord, doc_id) in sample_points(2, 2) {
        layout.encode_into(&packed, ord, doc_id, &mut bytes).unwrap();
    }
    bytes
}

#[test]
fn test_open_failure() {
    let dir = FaultyDirectory {
        fail_open: true,
        ..Default::default()
    };
    let err = OfflinePointReader::open(&dir, "gone.tmp", PointReaderConfig::for_testing())
        .unwrap_err();

    match err {
        PointReadError::Open { name, source } => {
            assert_eq!(name, "gone.tmp");
            assert_eq!(source.kind(), io::ErrorKind::NotFound);
        }
        other => panic!("expected Open, got {:?}", other),
    }
}

#[test]
fn test_open_missing_file_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let dir = FsTempDirectory::new(temp_dir.path());
    let err = OfflinePointReader::open(&dir, "nope.tmp", PointReaderConfig::for_testing())
        .unwrap_err();
    assert!(matches!(err, PointReadError::Open { .. }));
}

#[test]
fn test_seek_failure() {
    let dir = FaultyDirectory {
        data: sample_bytes(),
        fail_seek: true,
        ..Default::default()
    };
    let config = PointReaderConfig::for_testing().with_start_record(1);
    let err = OfflinePointReader::open(&dir, "p.tmp", config).unwrap_err();

    assert!(matches!(err, PointReadError::Seek { offset: 10, .. }));
}

#[test]
fn test_read_failure_is_not_end_of_stream() {
    let dir = FaultyDirectory {
        data: sample_bytes(),
        fail_read: true,
        ..Default::default()
    };
    let mut reader =
        OfflinePointReader::open(&dir, "p.tmp", PointReaderConfig::for_testing()).unwrap();

    let err = reader.advance().unwrap_err();
    assert!(matches!(err, PointReadError::Io { record: 0, .. }));
}

#[test]
fn test_release_failure() {
    let dir = FaultyDirectory {
        data: sample_bytes(),
        fail_close: true,
        ..Default::default()
    };
    let mut reader =
        OfflinePointReader::open(&dir, "p.tmp", PointReaderConfig::for_testing()).unwrap();

    assert!(reader.advance().unwrap());
    assert!(matches!(
        reader.release(),
        Err(PointReadError::Release { .. })
    ));

    // The stream is gone either way; a second release does nothing
    assert!(reader.is_released());
    reader.release().unwrap();
    assert_eq!(reader.doc_id(), 1000);
}

#[test]
fn test_drop_without_release() {
    let dir = FaultyDirectory {
        data: sample_bytes(),
        fail_close: true,
        ..Default::default()
    };
    let reader =
        OfflinePointReader::open(&dir, "p.tmp", PointReaderConfig::for_testing()).unwrap();
    drop(reader);
}
