//! Capture control
//!
//! A short press takes a photo. Holding past the long-press threshold
//! starts a recording, which runs until release.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

use crate::session::CaptureSession;

/// What a release did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// No press was in progress, or the session refused the action
    None,
    PhotoRequested,
    RecordingStopped,
}

/// How a press resolved on the waiter thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hold {
    /// Released before the long-press threshold
    Tap,
    /// Threshold reached and the recording started
    Recording,
    /// Threshold reached but the session refused to record
    Rejected,
}

struct Press {
    release_tx: mpsc::Sender<()>,
    waiter: JoinHandle<Hold>,
}

/// Press/release handling for the capture control
pub struct CaptureButton {
    session: Arc<CaptureSession>,
    long_press: Duration,
    press: Mutex<Option<Press>>,
}

impl CaptureButton {
    pub fn new(session: Arc<CaptureSession>) -> Self {
        let long_press = Duration::from_millis(session.config().long_press_ms);
        Self {
            session,
            long_press,
            press: Mutex::new(None),
        }
    }

    /// Control pressed. Repeated presses without a release are ignored.
    pub fn press(&self) {
        let mut press = self.press.lock().unwrap_or_else(PoisonError::into_inner);
        if press.is_some() {
            debug!("Press ignored, already held");
            return;
        }

        let (release_tx, release_rx) = mpsc::channel();
        let session = self.session.clone();
        let threshold = self.long_press;

        let waiter = thread::spawn(move || {
            match release_rx.recv_timeout(threshold) {
                Err(RecvTimeoutError::Timeout) => {
                    debug!("Long press, starting recording");
                    match session.start_recording() {
                        Ok(()) => Hold::Recording,
                        Err(e) => {
                            warn!("Recording not started: {}", e);
                            Hold::Rejected
                        }
                    }
                }
                _ => Hold::Tap,
            }
        });

        *press = Some(Press { release_tx, waiter });
    }

    /// Control released. Returns `None` when the press had no effect.
    pub fn release(&self) -> ButtonAction {
        let Some(press) = self
            .press
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return ButtonAction::None;
        };

        let _ = press.release_tx.send(());
        let hold = press.waiter.join().unwrap_or_else(|_| {
            warn!("Long-press waiter panicked");
            Hold::Rejected
        });

        match hold {
            Hold::Recording => {
                self.session.stop_recording();
                ButtonAction::RecordingStopped
            }
            Hold::Rejected => ButtonAction::None,
            Hold::Tap => match self.session.take_photo() {
                Ok(()) => ButtonAction::PhotoRequested,
                Err(e) => {
                    warn!("Photo not started: {}", e);
                    ButtonAction::None
                }
            },
        }
    }
}
