//! JPEG photo store

use camera_capture::PixelBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{ensure_dir, timestamped_path, ImageStore, StorageError};

/// Writes photos as `<unix-millis>.jpg` into a directory
#[derive(Debug, Clone)]
pub struct JpegStore {
    dir: PathBuf,
    quality: u8,
}

impl JpegStore {
    pub fn new(dir: impl Into<PathBuf>, quality: u8) -> Self {
        Self {
            dir: dir.into(),
            quality: quality.clamp(1, 100),
        }
    }

    fn write_jpeg(&self, image: &PixelBuffer, path: &Path) -> Result<(), StorageError> {
        // JPEG carries no alpha
        let rgb = DynamicImage::ImageRgba8(image.to_rgba_image()).to_rgb8();

        let mut writer = BufWriter::new(File::create(path)?);
        JpegEncoder::new_with_quality(&mut writer, self.quality)
            .encode_image(&rgb)
            .map_err(|e| StorageError::Encode(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }
}

impl ImageStore for JpegStore {
    fn save(&self, image: &PixelBuffer) -> Result<PathBuf, StorageError> {
        ensure_dir(&self.dir)?;

        let path = timestamped_path(&self.dir, "jpg");
        debug!("Encoding {}x{} photo to {}", image.width(), image.height(), path.display());

        if let Err(e) = self.write_jpeg(image, &path) {
            warn!("Photo save failed, removing partial file: {}", e);
            let _ = std::fs::remove_file(&path);
            return Err(e);
        }

        info!("Photo saved: {}", path.display());
        Ok(path)
    }
}
