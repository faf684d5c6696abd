//! Tracking -> overlay pose mapping

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::geometry::{upright_point, upright_rect};
use crate::tracking::TrackingSample;
use crate::{PoseConfig, PoseError};

/// Overlay rotation in the 3D engine's axes (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OverlayRotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Pose applied to the overlay for one tracking cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub rotation: OverlayRotation,
    /// Camera-space x, roughly -1..1
    pub x: f32,
    /// Camera-space y, roughly -1..1
    pub y: f32,
    pub scale: f32,
}

/// Face landmarks normalized to the upright output frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub points: Vec<(f32, f32)>,
    pub mouth_open: i32,
}

impl LandmarkSet {
    pub fn xs(&self) -> Vec<f32> {
        self.points.iter().map(|p| p.0).collect()
    }

    pub fn ys(&self) -> Vec<f32> {
        self.points.iter().map(|p| p.1).collect()
    }
}

/// Converts tracker measurements into overlay pose and landmarks
#[derive(Debug, Clone, Default)]
pub struct PoseResolver {
    config: PoseConfig,
}

impl PoseResolver {
    pub fn new(config: PoseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PoseConfig {
        &self.config
    }

    /// Full pose for a sample; fails when no face was detected
    pub fn resolve(&self, sample: &TrackingSample) -> Result<Pose, PoseError> {
        let rotation = self.rotation(sample.roll, sample.pitch, sample.yaw);
        let (x, y) = self.translation(sample)?;
        let scale = self.scale(sample.eye_distance, sample.yaw);
        Ok(Pose { rotation, x, y, scale })
    }

    /// The overlay faces forward by default, hence the roll offset and the
    /// swapped, negated yaw/pitch
    pub fn rotation(&self, roll: f32, pitch: f32, yaw: f32) -> OverlayRotation {
        OverlayRotation {
            x: roll + self.config.roll_offset_degrees,
            y: -yaw,
            z: -pitch,
        }
    }

    /// Center of the first face, normalized to -1..1
    pub fn translation(&self, sample: &TrackingSample) -> Result<(f32, f32), PoseError> {
        let face = sample.faces.first().ok_or(PoseError::EmptyDetection)?;
        let (width, height) = self.preview_dims();

        let rect = upright_rect(face.rect, sample.orientation, width as i32, height as i32);
        let (cx, cy) = rect.center();

        // After rotation the frame is height wide and width tall
        let x = (cx / height) * 2.0 - 1.0;
        let y = (cy / width) * 2.0 - 1.0;
        Ok((x, y))
    }

    /// Overlay scale from the inter-eye distance.
    ///
    /// The distance is divided by cos(yaw) to undo foreshortening. The
    /// division is unguarded: at +/-90 degrees cos(yaw) is about 6e-17 in
    /// f64, so the result is huge but finite.
    pub fn scale(&self, eye_distance: i32, yaw: f32) -> f32 {
        let raw = eye_distance as f32 * self.config.eye_distance_factor - self.config.eye_distance_offset;
        let raw = (raw as f64 / (PI * yaw as f64 / 180.0).cos()) as f32;
        let normalized = raw * self.config.scale_normalize;
        normalized * self.config.scale_gain + 1.0
    }

    /// Landmarks of every detected face, in detection order
    pub fn landmarks(&self, sample: &TrackingSample) -> Vec<LandmarkSet> {
        let (width, height) = self.preview_dims();

        sample
            .faces
            .iter()
            .map(|face| LandmarkSet {
                points: face
                    .landmarks
                    .iter()
                    .map(|&p| {
                        let (x, y) = upright_point(p, sample.orientation, width, height);
                        (1.0 - x / height, y / width)
                    })
                    .collect(),
                mouth_open: sample.actions.mouth_open,
            })
            .collect()
    }

    fn preview_dims(&self) -> (f32, f32) {
        (
            self.config.preview.width as f32,
            self.config.preview.height as f32,
        )
    }
}
