//! Pose mapping configuration

use camera_capture::FrameSize;
use serde::{Deserialize, Serialize};

/// Calibration of the tracking -> overlay pose mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// Reference frame the tracker reports rects and points in
    pub preview: FrameSize,

    /// Added to the tracker roll before it reaches the overlay (degrees)
    pub roll_offset_degrees: f32,

    /// Multiplier applied to the raw inter-eye distance
    pub eye_distance_factor: f32,

    /// Subtracted after scaling; maps the supported distance range to ~0..25
    pub eye_distance_offset: f32,

    /// Maps the ~0..25 range to ~0..1
    pub scale_normalize: f32,

    /// Overlay scale gain applied to the normalized distance
    pub scale_gain: f32,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            preview: FrameSize::preview(),
            roll_offset_degrees: 90.0,
            eye_distance_factor: 0.000_001,
            eye_distance_offset: 1115.0,
            scale_normalize: 0.04,
            scale_gain: 3.0,
        }
    }
}
