//! Append-only writer for streamed audio.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

/// Owns the destination file for the duration of one download.
///
/// The handle is closed by [`StreamWriter::finish`] on success and by `Drop` on every
/// other path (error or cancellation). Bytes already flushed are left on disk.
pub struct StreamWriter {
    path: PathBuf,
    file: BufWriter<File>,
    bytes_written: u64,
}

impl StreamWriter {
    /// Create (or truncate) `path`, creating missing parent directories first.
    pub async fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::write_failure(parent, format!("cannot create directory: {}", e))
            })?;
        }
        let file = File::create(&path)
            .await
            .map_err(|e| Error::write_failure(&path, format!("cannot open for writing: {}", e)))?;
        debug!(path = %path.display(), "output file opened");
        Ok(Self {
            path,
            file: BufWriter::new(file),
            bytes_written: 0,
        })
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.file
            .write_all(chunk)
            .await
            .map_err(|e| Error::write_failure(&self.path, e.to_string()))?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush, sync and close the file, returning the number of bytes written.
    pub async fn finish(mut self) -> Result<u64> {
        self.file
            .flush()
            .await
            .map_err(|e| Error::write_failure(&self.path, e.to_string()))?;
        let file = self.file.into_inner();
        file.sync_all()
            .await
            .map_err(|e| Error::write_failure(&self.path, e.to_string()))?;
        drop(file);
        Ok(self.bytes_written)
    }
}

/// Size of a closed output file; missing or empty files are write failures.
pub async fn verify_output(path: &Path) -> Result<u64> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| Error::write_failure(path, format!("output file missing: {}", e)))?;
    if !meta.is_file() || meta.len() == 0 {
        return Err(Error::write_failure(path, "output file is empty"));
    }
    Ok(meta.len())
}
