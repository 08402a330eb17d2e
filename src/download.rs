//! Save-as delivery of the translated document.
//!
//! [`FileDownloadSink`] writes the response bytes into a staging file
//! (`tempfile::NamedTempFile`) inside the output directory, then persists it
//! under the final name. The staging file is the only transient resource a
//! delivery creates. It is released exactly once: `persist` consumes it on
//! success, and dropping it removes it from disk on any failure, so repeated
//! submissions never leave stray files behind.
//!
//! All disk work runs on tokio's blocking pool, so a slow disk or a crowded
//! output directory never stalls the async workers.

use crate::error::TranslateError;
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Upper bound on `name (N).ext` candidates before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Delivers a finished document to the user.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Save `bytes` under `filename`, returning where they ended up.
    async fn deliver(&self, bytes: &[u8], filename: &str) -> Result<PathBuf, TranslateError>;
}

/// [`DownloadSink`] writing into a directory on disk.
#[derive(Debug, Clone)]
pub struct FileDownloadSink {
    dir: PathBuf,
    overwrite: bool,
}

impl FileDownloadSink {
    pub fn new(dir: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            dir: dir.into(),
            overwrite,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Pick the destination path for `filename`.
    ///
    /// With `overwrite` the plain name is always used. Otherwise the first of
    /// `name.ext`, `name (1).ext`, `name (2).ext`, … that does not exist yet.
    pub fn target_path(&self, filename: &str) -> Result<PathBuf, TranslateError> {
        let plain = self.dir.join(filename);
        if self.overwrite || !plain.exists() {
            return Ok(plain);
        }

        let (stem, ext) = match filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (filename, None),
        };
        for n in 1..=MAX_NAME_ATTEMPTS {
            let candidate = match ext {
                Some(ext) => format!("{stem} ({n}).{ext}"),
                None => format!("{stem} ({n})"),
            };
            let path = self.dir.join(candidate);
            if !path.exists() {
                return Ok(path);
            }
        }
        Err(TranslateError::OutputWriteFailed {
            path: plain,
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "no free file name left",
            ),
        })
    }

    /// Synchronous body of [`DownloadSink::deliver`].
    fn save_blocking(&self, bytes: &[u8], filename: &str) -> Result<PathBuf, TranslateError> {
        let target = self.target_path(filename)?;
        let write_err = |source: std::io::Error| TranslateError::OutputWriteFailed {
            path: target.clone(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(write_err)?;

        let mut staging = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        debug!("Staging download at {}", staging.path().display());
        staging.write_all(bytes).map_err(write_err)?;
        staging.flush().map_err(write_err)?;

        let persisted = if self.overwrite {
            staging.persist(&target)
        } else {
            staging.persist_noclobber(&target)
        };
        persisted.map_err(|e| write_err(e.error))?;

        info!("Saved {} bytes to {}", bytes.len(), target.display());
        Ok(target)
    }
}

#[async_trait]
impl DownloadSink for FileDownloadSink {
    async fn deliver(&self, bytes: &[u8], filename: &str) -> Result<PathBuf, TranslateError> {
        let sink = self.clone();
        let bytes = bytes.to_vec();
        let filename = filename.to_string();
        run_blocking(move || sink.save_blocking(&bytes, &filename)).await
    }
}

/// Run `job` on the blocking pool; a panic inside it becomes
/// [`TranslateError::Unexpected`].
async fn run_blocking<T, F>(job: F) -> Result<T, TranslateError>
where
    F: FnOnce() -> Result<T, TranslateError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| TranslateError::Unexpected(format!("Download task panicked: {e}")))?
}
