//! Destination file sink with bounded buffering, and rollback of partial files.

use super::dirs::create_owner_dir_all;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Sequential writer for one destination file. Memory use is bounded by the
/// buffer capacity regardless of file size.
pub struct FileSink {
    writer: BufWriter<File>,
    path: PathBuf,
    written: u64,
}

impl FileSink {
    /// Creates parent directories (mode `0700`) and opens `path`, truncating
    /// any existing file.
    ///
    /// A sibling item's rollback may remove a shared, momentarily empty parent
    /// between directory creation and open; the open is retried once.
    pub fn create(path: &Path, buffer_size: usize) -> io::Result<Self> {
        let file = match open_with_parent(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => open_with_parent(path)?,
            other => other?,
        };
        Ok(FileSink {
            writer: BufWriter::with_capacity(buffer_size.max(1), file),
            path: path.to_path_buf(),
            written: 0,
        })
    }

    /// Appends `data` to the file.
    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Flushes buffered data and closes the file. Returns total bytes written.
    pub fn finish(mut self) -> io::Result<u64> {
        self.writer.flush()?;
        Ok(self.written)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }
}

fn open_with_parent(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_owner_dir_all(parent)?;
    }
    File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

/// Removes a partially written file and then its parent directory.
///
/// The parent is removed only if empty, so a directory still used by another
/// item survives. Already-missing paths are not errors.
pub fn remove_partial(file: &Path) -> io::Result<()> {
    match std::fs::remove_file(file) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    let Some(parent) = file.parent() else {
        return Ok(());
    };
    match std::fs::remove_dir(parent) {
        Ok(()) => Ok(()),
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::DirectoryNotEmpty
            ) =>
        {
            tracing::debug!(dir = %parent.display(), "kept parent directory: {}", e);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
