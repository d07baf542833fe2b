//! Temporary storage seam.
//!
//! Spill files live in a temporary directory owned by the index builder.
//! Readers only need to open a named resource, seek, read bytes and close
//! it again; naming, creation and deletion belong to the caller.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A readable, seekable byte stream over one temporary resource.
///
/// # Thread Safety
///
/// Streams are `Send` so a reader can be handed to another thread, but a
/// stream is never shared: it is owned by exactly one reader.
pub trait ByteStream: Read + Seek + Send {
    /// Close the stream, surfacing any error the close produces.
    ///
    /// The default implementation just drops the stream.
    fn close(self: Box<Self>) -> io::Result<()> {
        Ok(())
    }
}

impl<T: AsRef<[u8]> + Send> ByteStream for Cursor<T> {}

/// Opens named temporary resources as byte streams.
pub trait TempDirectory {
    /// Open `name` for a single forward pass.
    fn open_input(&self, name: &str) -> io::Result<Box<dyn ByteStream>>;
}

/// Filesystem-backed temporary directory.
#[derive(Debug, Clone)]
pub struct FsTempDirectory {
    root: PathBuf,
}

impl FsTempDirectory {
    /// Use `root` as the directory holding spill files.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsTempDirectory { root: root.into() }
    }

    /// Directory holding spill files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of the spill file `name`.
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl TempDirectory for FsTempDirectory {
    fn open_input(&self, name: &str) -> io::Result<Box<dyn ByteStream>> {
        let path = self.file_path(name);
        let file = OpenOptions::new().read(true).open(&path)?;

        debug!(path = %path.display(), "Opened spill file for reading");

        Ok(Box::new(FileStream {
            reader: BufReader::new(file),
        }))
    }
}

/// Buffered read-only spill file.
struct FileStream {
    reader: BufReader<File>,
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Seek for FileStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.reader.seek(pos)
    }
}

impl ByteStream for FileStream {}
