//! Camera Capture Frame Types
//!
//! Raw pixel buffers exchanged between the camera, the 3D overlay renderer
//! and the capture pipeline, plus the interfaces those two producers expose.
//! Frame sizes used by the pipeline:
//! - Still photo (720x1280)
//! - Video recording (384x640)
//! - Face tracker preview reference (640x480)

pub mod frame;
pub mod source;

pub use frame::{ChannelOrder, OverlayFrame, OverlayKind, PackedFrame, PixelBuffer, BYTES_PER_PIXEL};
pub use source::{CameraSource, RenderSource};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Frame error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Buffer length {actual} does not match {width}x{height} frame (expected {expected})")]
    Length {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid frame dimensions {0}x{1}")]
    Dimensions(u32, u32),
}

/// Width and height of a frame in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size used for still photos
    pub const fn photo() -> Self {
        Self::new(720, 1280)
    }

    /// Size used for video recording and the overlay surface
    pub const fn video() -> Self {
        Self::new(384, 640)
    }

    /// Reference frame the face tracker reports coordinates in
    pub const fn preview() -> Self {
        Self::new(640, 480)
    }

    /// Number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
