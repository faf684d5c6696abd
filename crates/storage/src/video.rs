//! Raw frame stream writer
//!
//! File layout: an ASCII header `ARCAMRAW <width> <height>\n`, then per
//! frame an 8-byte little-endian timestamp (ms) followed by the frame bytes.
//! Frames go to `<stem>.part` and the file is renamed to `<stem>.raw` only
//! when the session stops.

use camera_capture::{FrameSize, PixelBuffer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::{ensure_dir, timestamped_path, Encoder, StorageError};

/// Header magic
pub const RAW_MAGIC: &str = "ARCAMRAW";

struct Session {
    size: FrameSize,
    part_path: PathBuf,
    writer: BufWriter<File>,
    started: bool,
    frames: u64,
}

/// [`Encoder`] writing uncompressed frames to disk
pub struct RawVideoWriter {
    dir: PathBuf,
    session: Option<Session>,
}

impl RawVideoWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            session: None,
        }
    }

    /// Frames written in the current session
    pub fn frames_written(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.frames)
    }

    fn discard(&mut self) {
        if let Some(session) = self.session.take() {
            drop(session.writer);
            if let Err(e) = std::fs::remove_file(&session.part_path) {
                warn!("Failed to remove {}: {}", session.part_path.display(), e);
            }
        }
    }
}

impl Encoder for RawVideoWriter {
    fn prepare(&mut self, size: FrameSize) -> Result<(), StorageError> {
        // A session left over from an earlier run is abandoned
        self.discard();
        ensure_dir(&self.dir)?;

        let part_path = timestamped_path(&self.dir, "part");
        let mut writer = BufWriter::new(File::create(&part_path)?);
        writeln!(writer, "{} {} {}", RAW_MAGIC, size.width, size.height)?;

        debug!("Prepared raw stream {} ({}x{})", part_path.display(), size.width, size.height);
        self.session = Some(Session {
            size,
            part_path,
            writer,
            started: false,
            frames: 0,
        });
        Ok(())
    }

    fn start(&mut self) -> Result<(), StorageError> {
        let session = self.session.as_mut().ok_or(StorageError::NotPrepared)?;
        session.started = true;
        Ok(())
    }

    fn feed_frame(&mut self, frame: &PixelBuffer, timestamp_ms: u64) -> Result<(), StorageError> {
        let session = self.session.as_mut().ok_or(StorageError::NotPrepared)?;
        if !session.started {
            return Err(StorageError::NotStarted);
        }
        if frame.size() != session.size {
            return Err(StorageError::Encode(format!(
                "frame {}x{} does not match stream {}x{}",
                frame.width(),
                frame.height(),
                session.size.width,
                session.size.height
            )));
        }

        session.writer.write_all(&timestamp_ms.to_le_bytes())?;
        session.writer.write_all(frame.data())?;
        session.frames += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<PathBuf, StorageError> {
        let started = self.session.as_ref().ok_or(StorageError::NotPrepared)?.started;
        if !started {
            return Err(StorageError::NotStarted);
        }
        let Some(mut session) = self.session.take() else {
            return Err(StorageError::NotPrepared);
        };

        let flushed = session.writer.flush();
        drop(session.writer);

        let final_path = session.part_path.with_extension("raw");
        let finished = flushed.and_then(|_| std::fs::rename(&session.part_path, &final_path));
        if let Err(e) = finished {
            let _ = std::fs::remove_file(&session.part_path);
            return Err(e.into());
        }

        info!("Recording saved: {} ({} frames)", final_path.display(), session.frames);
        Ok(final_path)
    }

    fn cancel(&mut self) {
        if self.session.is_some() {
            info!("Recording cancelled, discarding output");
        }
        self.discard();
    }
}

impl Drop for RawVideoWriter {
    fn drop(&mut self) {
        self.discard();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::scratch_dir;
    use camera_capture::ChannelOrder;
    use std::path::Path;

    fn frame(size: FrameSize) -> PixelBuffer {
        PixelBuffer::blank(size.width, size.height, ChannelOrder::Rgba)
    }

    fn files_in(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .map(|entries| entries.flatten().map(|e| e.path()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_stop_keeps_stream() {
        let dir = scratch_dir("raw-stop");
        let size = FrameSize::new(2, 2);
        let mut writer = RawVideoWriter::new(&dir);

        writer.prepare(size).unwrap();
        writer.start().unwrap();
        writer.feed_frame(&frame(size), 0).unwrap();
        writer.feed_frame(&frame(size), 50).unwrap();
        assert_eq!(writer.frames_written(), 2);

        let path = writer.stop().unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("raw"));

        let bytes = std::fs::read(&path).unwrap();
        let header = b"ARCAMRAW 2 2\n";
        assert!(bytes.starts_with(header));
        assert_eq!(bytes.len(), header.len() + 2 * (8 + 16));
        assert_eq!(files_in(&dir), vec![path]);
    }

    #[test]
    fn test_cancel_leaves_nothing() {
        let dir = scratch_dir("raw-cancel");
        let size = FrameSize::new(2, 2);
        let mut writer = RawVideoWriter::new(&dir);

        writer.prepare(size).unwrap();
        writer.start().unwrap();
        writer.feed_frame(&frame(size), 0).unwrap();
        writer.cancel();

        assert!(files_in(&dir).is_empty());
        assert_eq!(writer.stop(), Err(StorageError::NotPrepared));
    }

    #[test]
    fn test_feed_requires_start() {
        let size = FrameSize::new(1, 1);
        let mut writer = RawVideoWriter::new(scratch_dir("raw-order"));

        assert_eq!(writer.feed_frame(&frame(size), 0), Err(StorageError::NotPrepared));
        writer.prepare(size).unwrap();
        assert_eq!(writer.feed_frame(&frame(size), 0), Err(StorageError::NotStarted));
        assert_eq!(writer.stop(), Err(StorageError::NotStarted));
    }

    #[test]
    fn test_rejects_wrong_frame_size() {
        let mut writer = RawVideoWriter::new(scratch_dir("raw-size"));
        writer.prepare(FrameSize::new(2, 2)).unwrap();
        writer.start().unwrap();

        let result = writer.feed_frame(&frame(FrameSize::new(1, 1)), 0);
        assert!(matches!(result, Err(StorageError::Encode(_))));
    }

    #[test]
    fn test_drop_discards_unfinished() {
        let dir = scratch_dir("raw-drop");
        {
            let mut writer = RawVideoWriter::new(&dir);
            writer.prepare(FrameSize::new(1, 1)).unwrap();
        }
        assert!(files_in(&dir).is_empty());
    }
}
