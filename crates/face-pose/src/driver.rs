//! Applies tracking results to the overlay and the active effect

use std::sync::Arc;
use tracing::{debug, info};

use crate::effects::Effect;
use crate::resolver::{OverlayRotation, Pose, PoseResolver};
use crate::tracking::{TrackingReport, TrackingSample};
use crate::PoseConfig;

/// Pose controls exposed by the overlay renderer
pub trait PoseTarget: Send + Sync {
    fn set_rotation(&self, rotation: OverlayRotation);

    fn set_translation(&self, x: f32, y: f32);

    fn set_scale(&self, scale: f32);
}

/// Result of one tracking cycle
#[derive(Debug, Clone)]
pub struct TrackingOutcome {
    /// Pose pushed to the overlay, `None` when the cycle was skipped
    pub pose: Option<Pose>,
    /// Figures for display
    pub report: TrackingReport,
}

/// Drives the overlay pose from tracker callbacks
pub struct PoseDriver {
    resolver: PoseResolver,
    target: Arc<dyn PoseTarget>,
    effect: Option<Box<dyn Effect>>,
    skipped_cycles: u64,
}

impl PoseDriver {
    pub fn new(config: PoseConfig, target: Arc<dyn PoseTarget>) -> Self {
        Self {
            resolver: PoseResolver::new(config),
            target,
            effect: None,
            skipped_cycles: 0,
        }
    }

    /// Replace the active effect
    pub fn set_effect(&mut self, effect: Box<dyn Effect>) {
        info!("Active effect: {}", effect.name());
        self.effect = Some(effect);
    }

    pub fn effect_name(&self) -> Option<&str> {
        self.effect.as_deref().map(|e| e.name())
    }

    /// Cycles skipped because no face was detected
    pub fn skipped_cycles(&self) -> u64 {
        self.skipped_cycles
    }

    /// Handle one tracker callback.
    ///
    /// A cycle without faces leaves the overlay and the effect untouched.
    pub fn handle(&mut self, sample: &TrackingSample) -> TrackingOutcome {
        let report = TrackingReport::from(sample);

        let pose = match self.resolver.resolve(sample) {
            Ok(pose) => pose,
            Err(e) => {
                self.skipped_cycles += 1;
                debug!("Skipping pose update: {}", e);
                return TrackingOutcome { pose: None, report };
            }
        };

        self.target.set_rotation(pose.rotation);
        self.target.set_translation(pose.x, pose.y);
        self.target.set_scale(pose.scale);
        debug!("Overlay pose: x={} y={} scale={}", pose.x, pose.y, pose.scale);

        if let Some(consumer) = self.effect.as_mut().and_then(|e| e.landmark_consumer()) {
            for set in self.resolver.landmarks(sample) {
                consumer.set_landmarks(&set.xs(), &set.ys());
                consumer.set_mouth_open(set.mouth_open);
            }
        }

        TrackingOutcome {
            pose: Some(pose),
            report,
        }
    }
}
