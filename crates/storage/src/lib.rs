//! Storage Layer
//!
//! Persistence interfaces used by the capture pipeline and the file-backed
//! implementations shipped with it.

mod photo;
mod video;

pub use photo::JpegStore;
pub use video::RawVideoWriter;

use camera_capture::{FrameSize, PixelBuffer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Cannot create directory {path}: {reason}")]
    DirectoryCreate { path: PathBuf, reason: String },
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
    #[error("Encoder not prepared")]
    NotPrepared,
    #[error("Encoder not started")]
    NotStarted,
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

/// Saves composited photos
pub trait ImageStore: Send + Sync {
    /// Persist the image and return where it was written
    fn save(&self, image: &PixelBuffer) -> Result<PathBuf, StorageError>;
}

/// Video encoder session fed with composited frames
pub trait Encoder: Send {
    fn prepare(&mut self, size: FrameSize) -> Result<(), StorageError>;

    fn start(&mut self) -> Result<(), StorageError>;

    fn feed_frame(&mut self, frame: &PixelBuffer, timestamp_ms: u64) -> Result<(), StorageError>;

    /// Finalize the output and return its path
    fn stop(&mut self) -> Result<PathBuf, StorageError>;

    /// Abandon the session; nothing is kept on disk
    fn cancel(&mut self);
}

/// Output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for photos
    pub photo_dir: PathBuf,
    /// Directory for recordings
    pub video_dir: PathBuf,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            photo_dir: PathBuf::from("captures/photo"),
            video_dir: PathBuf::from("captures/video"),
            jpeg_quality: 100,
        }
    }
}

/// Create `dir` and its parents if missing
pub(crate) fn ensure_dir(dir: &Path) -> Result<(), StorageError> {
    std::fs::create_dir_all(dir).map_err(|e| StorageError::DirectoryCreate {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Unused `<unix-millis>[-n].<ext>` path inside `dir`
pub(crate) fn timestamped_path(dir: &Path, ext: &str) -> PathBuf {
    let stamp = chrono::Utc::now().timestamp_millis();
    let mut path = dir.join(format!("{}.{}", stamp, ext));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{}-{}.{}", stamp, n, ext));
        n += 1;
    }
    path
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::path::PathBuf;

    /// Fresh scratch directory for one test
    pub fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("arcam-storage-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }
}
