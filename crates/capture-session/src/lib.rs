//! Capture Session
//!
//! Coordinates still photos and video recordings on top of two independent
//! frame producers:
//! - Camera frames routed to the photo or video path by session mode
//! - Overlay frames handed off through a single latest-value slot
//! - A paced recording loop on a dedicated worker thread
//! - User feedback marshalled to the UI owner over a channel

pub mod button;
pub mod config;
pub mod router;
pub mod session;
pub mod ui;
mod worker;

#[cfg(test)]
mod testing;

pub use button::{ButtonAction, CaptureButton};
pub use config::SessionConfig;
pub use router::{FrameRouter, Route};
pub use session::{CaptureSession, Collaborators, RecordingOutcome};
pub use ui::{ui_channel, UiEvent, UiEvents, UiSender};

use record_timer::TimerError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaptureMode {
    #[default]
    Idle,
    /// Waiting for the overlay snapshot and the photo frame
    PendingPhoto,
    Recording,
}

/// Session error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Capture session busy ({0:?})")]
    Busy(CaptureMode),

    #[error("Invalid timer configuration: {0}")]
    Timer(#[from] TimerError),

    #[error("Failed to spawn worker: {0}")]
    WorkerSpawn(String),

    #[error("Worker is no longer running")]
    WorkerUnavailable,
}
