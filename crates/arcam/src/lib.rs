//! AR Camera Pipeline
//!
//! Wires the capture session, frame router, capture control and pose driver
//! into one [`Pipeline`] that device callbacks feed into.

pub mod config;
pub mod sim;

use anyhow::Context;
use camera_capture::{CameraSource, OverlayFrame, PixelBuffer, RenderSource};
use capture_session::{
    CaptureButton, CaptureSession, Collaborators, FrameRouter, Route, SessionError, UiEvent,
    UiSender,
};
use face_pose::{Effect, PoseDriver, PoseTarget, TrackingOutcome, TrackingSample};
use std::sync::{Arc, Mutex, PoisonError};
use storage::{Encoder, ImageStore, JpegStore, RawVideoWriter};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::{AppConfig, LoggingConfig};

/// Device-side collaborators
pub struct Devices {
    pub camera: Arc<dyn CameraSource>,
    pub render: Arc<dyn RenderSource>,
    pub pose_target: Arc<dyn PoseTarget>,
    pub store: Arc<dyn ImageStore>,
    pub encoder: Box<dyn Encoder>,
}

impl Devices {
    /// Devices saving to the directories in the storage configuration
    pub fn file_backed(
        config: &AppConfig,
        camera: Arc<dyn CameraSource>,
        render: Arc<dyn RenderSource>,
        pose_target: Arc<dyn PoseTarget>,
    ) -> Self {
        let storage = &config.storage;
        Self {
            camera,
            render,
            pose_target,
            store: Arc::new(JpegStore::new(&storage.photo_dir, storage.jpeg_quality)),
            encoder: Box::new(RawVideoWriter::new(&storage.video_dir)),
        }
    }
}

/// Entry points for camera, renderer, tracker and capture control
pub struct Pipeline {
    router: FrameRouter,
    button: CaptureButton,
    pose: Mutex<PoseDriver>,
    ui: UiSender,
}

impl Pipeline {
    pub fn new(config: &AppConfig, devices: Devices, ui: UiSender) -> Result<Self, SessionError> {
        let session = Arc::new(CaptureSession::new(
            config.session.clone(),
            Collaborators {
                camera: devices.camera,
                render: devices.render,
                store: devices.store,
                encoder: devices.encoder,
            },
            ui.clone(),
        )?);

        Ok(Self {
            router: FrameRouter::new(session.clone()),
            button: CaptureButton::new(session),
            pose: Mutex::new(PoseDriver::new(config.pose.clone(), devices.pose_target)),
            ui,
        })
    }

    /// Camera frame callback
    pub fn on_camera_frame(&self, frame: PixelBuffer, timestamp_ms: u64) -> Route {
        self.router.on_frame(frame, timestamp_ms)
    }

    /// Renderer overlay callback
    pub fn on_overlay(&self, frame: OverlayFrame) {
        self.router.session().on_overlay(frame);
    }

    /// Tracker callback. The tracking report goes to the UI every cycle.
    pub fn on_tracking(&self, sample: &TrackingSample) -> TrackingOutcome {
        let outcome = self
            .pose
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handle(sample);
        self.ui.send(UiEvent::Tracking(outcome.report.clone()));
        outcome
    }

    pub fn set_effect(&self, effect: Box<dyn Effect>) {
        self.pose
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_effect(effect);
    }

    /// Tracking cycles skipped for lack of a face
    pub fn skipped_tracking_cycles(&self) -> u64 {
        self.pose
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .skipped_cycles()
    }

    pub fn button(&self) -> &CaptureButton {
        &self.button
    }

    pub fn session(&self) -> &Arc<CaptureSession> {
        self.router.session()
    }

    /// (video, photo, dropped) camera frame counts
    pub fn frame_counts(&self) -> (u64, u64, u64) {
        self.router.counts()
    }

    /// Abort a pending photo and end any recording
    pub fn shutdown(&self) {
        info!("Shutting down capture pipeline");
        self.session().shutdown();
    }
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level: Level = config
        .level
        .parse()
        .with_context(|| format!("invalid log level '{}'", config.level))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.context("failed to set tracing subscriber")?;

    Ok(())
}
