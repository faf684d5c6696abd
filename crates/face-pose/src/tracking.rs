//! Face tracker output types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer rectangle in tracker preview coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.right + self.left) as f32 / 2.0,
            (self.bottom + self.top) as f32 / 2.0,
        )
    }
}

/// Rotation of the tracked frame relative to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    Deg0,
    #[default]
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    /// Map a tracker orientation flag in degrees
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => Orientation::Deg90,
            180 => Orientation::Deg180,
            270 => Orientation::Deg270,
            _ => Orientation::Deg0,
        }
    }
}

/// One detected face
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaceDetection {
    /// Bounding rectangle
    pub rect: Rect,
    /// Ordered landmark points (preview coordinates)
    pub landmarks: Vec<(f32, f32)>,
}

/// Discrete facial action values reported alongside a detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FaceActions {
    pub face_id: i32,
    pub eye_blink: i32,
    pub mouth_open: i32,
    pub head_yaw: i32,
    pub head_pitch: i32,
    pub brow_jump: i32,
}

/// Everything the tracker delivers in one detection cycle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackingSample {
    /// Detected faces, most prominent first
    pub faces: Vec<FaceDetection>,
    /// Frame orientation
    pub orientation: Orientation,
    /// Raw inter-eye distance
    pub eye_distance: i32,
    /// Yaw (left-right rotation) in degrees
    pub yaw: f32,
    /// Pitch (up-down tilt) in degrees
    pub pitch: f32,
    /// Roll (side tilt) in degrees
    pub roll: f32,
    /// Detection latency in milliseconds
    pub latency_ms: i32,
    /// Facial action values
    pub actions: FaceActions,
}

/// Tracking figures shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingReport {
    pub latency_ms: i32,
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
    pub eye_distance: i32,
    pub actions: FaceActions,
}

impl From<&TrackingSample> for TrackingReport {
    fn from(sample: &TrackingSample) -> Self {
        Self {
            latency_ms: sample.latency_ms,
            pitch: sample.pitch,
            roll: sample.roll,
            yaw: sample.yaw,
            eye_distance: sample.eye_distance,
            actions: sample.actions,
        }
    }
}

impl fmt::Display for TrackingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TRACK: {} MS PITCH: {} ROLL: {} YAW: {} EYE_DIST: {} | ID: {} EYE_BLINK: {} MOUTH_AH: {} HEAD_YAW: {} HEAD_PITCH: {} BROW_JUMP: {}",
            self.latency_ms,
            self.pitch,
            self.roll,
            self.yaw,
            self.eye_distance,
            self.actions.face_id,
            self.actions.eye_blink,
            self.actions.mouth_open,
            self.actions.head_yaw,
            self.actions.head_pitch,
            self.actions.brow_jump,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_degrees() {
        assert_eq!(Orientation::from_degrees(270), Orientation::Deg270);
        assert_eq!(Orientation::from_degrees(-90), Orientation::Deg270);
        assert_eq!(Orientation::from_degrees(90), Orientation::Deg90);
        assert_eq!(Orientation::from_degrees(45), Orientation::Deg0);
    }

    #[test]
    fn test_rect_center() {
        assert_eq!(Rect::new(10, 20, 31, 40).center(), (20.5, 30.0));
    }

    #[test]
    fn test_report_mentions_latency() {
        let sample = TrackingSample {
            latency_ms: 12,
            ..Default::default()
        };
        let report = TrackingReport::from(&sample);
        assert!(report.to_string().starts_with("TRACK: 12 MS"));
    }
}
