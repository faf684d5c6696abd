//! User feedback channel
//!
//! Everything the user should see is sent as a [`UiEvent`]; the thread that
//! owns the UI drains [`UiEvents`]. Sending never blocks.

use face_pose::TrackingReport;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::debug;

/// Feedback for the UI owner
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Recording progress
    Progress { elapsed_ms: u64, total_ms: u64 },
    /// Recording ended, clear the progress indicator
    ProgressReset,
    PhotoSaved(PathBuf),
    PhotoFailed(String),
    RecordingSaved(PathBuf),
    /// Recording released before the minimum duration
    RecordingTooShort,
    RecordingFailed(String),
    /// Latest tracking figures
    Tracking(TrackingReport),
}

/// Create a connected sender/receiver pair
pub fn ui_channel() -> (UiSender, UiEvents) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiSender { tx }, UiEvents { rx })
}

/// Sending half, cheap to clone into callbacks
#[derive(Debug, Clone)]
pub struct UiSender {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl UiSender {
    pub fn send(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            debug!("UI receiver dropped, event discarded");
        }
    }
}

/// Receiving half, owned by the UI
#[derive(Debug)]
pub struct UiEvents {
    rx: mpsc::UnboundedReceiver<UiEvent>,
}

impl UiEvents {
    /// Receive the next event
    pub async fn next(&mut self) -> Option<UiEvent> {
        self.rx.recv().await
    }

    /// Receive an event if one is queued
    pub fn try_next(&mut self) -> Option<UiEvent> {
        self.rx.try_recv().ok()
    }
}
