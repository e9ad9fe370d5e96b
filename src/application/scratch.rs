use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Per-request scratch directory holding the downloaded media file.
///
/// Dropping the guard removes the directory together with anything the
/// extractor left next to the media file. Removal is best-effort: failures
/// are logged, never returned.
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
    dir_path: PathBuf,
    media_path: PathBuf,
}

impl ScratchDir {
    pub fn new(parent: &Path, id: &str) -> io::Result<Self> {
        let prefix = format!("{}-", id);
        let dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(parent)?;
        let dir_path = dir.path().to_path_buf();
        let media_path = dir_path.join(format!("{}.mp4", id));
        Ok(Self {
            dir: Some(dir),
            dir_path,
            media_path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir_path
    }

    /// Where the extractor is asked to write the media file.
    pub fn media_path(&self) -> &Path {
        &self.media_path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        match dir.close() {
            Ok(()) => tracing::debug!(path = %self.dir_path.display(), "Removed scratch dir"),
            Err(e) => tracing::warn!(
                path = %self.dir_path.display(),
                error = %e,
                "Failed to remove scratch dir"
            ),
        }
    }
}
