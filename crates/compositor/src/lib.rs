//! Overlay Compositor
//!
//! Merges frames rendered by the 3D overlay engine into camera frames:
//! - Video path: packed overlay words, hard threshold on the alpha byte
//! - Still path: decoded overlay image, rescaled and alpha blended

mod still;
mod video;

pub use still::composite_still_frame;
pub use video::composite_video_frame;

use thiserror::Error;

/// Compositing error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositeError {
    #[error("Overlay has {overlay} pixels but base frame has {base}")]
    SizeMismatch { base: usize, overlay: usize },

    #[error("Overlay image is empty")]
    EmptyOverlay,
}
