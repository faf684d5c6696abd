//! Face Pose
//!
//! Turns face tracker callbacks into overlay controls:
//! - Overlay rotation from head roll/pitch/yaw
//! - Overlay translation from the face rectangle
//! - Overlay scale from the inter-eye distance
//! - Normalized landmarks for effects that track the face

pub mod config;
pub mod driver;
pub mod effects;
pub mod geometry;
pub mod resolver;
pub mod tracking;

pub use config::PoseConfig;
pub use driver::{PoseDriver, PoseTarget, TrackingOutcome};
pub use effects::{Effect, LandmarkConsumer, PlainEffect};
pub use resolver::{LandmarkSet, OverlayRotation, Pose, PoseResolver};
pub use tracking::{FaceActions, FaceDetection, Orientation, Rect, TrackingReport, TrackingSample};

use thiserror::Error;

/// Pose error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoseError {
    #[error("No face detected")]
    EmptyDetection,
}
