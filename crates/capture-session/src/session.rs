//! Capture session state machine
//!
//! Modes move Idle -> PendingPhoto -> Idle and Idle -> Recording -> Idle.
//! Camera frames, overlay frames and user actions arrive on different
//! threads; every mode transition happens under the state lock, and the
//! overlay slot is emptied whenever the session returns to Idle.

use camera_capture::{
    CameraSource, OverlayFrame, OverlayKind, PixelBuffer, RenderSource,
};
use compositor::{composite_still_frame, composite_video_frame};
use handoff::LatestSlot;
use record_timer::RecordTimer;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use storage::{Encoder, ImageStore, StorageError};
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::ui::{UiEvent, UiSender};
use crate::worker::Worker;
use crate::{CaptureMode, SessionError};

/// External components the session drives
pub struct Collaborators {
    pub camera: Arc<dyn CameraSource>,
    pub render: Arc<dyn RenderSource>,
    pub store: Arc<dyn ImageStore>,
    pub encoder: Box<dyn Encoder>,
}

/// How a recording ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingOutcome {
    Saved(PathBuf),
    /// Shorter than the minimum duration, output discarded
    TooShort,
    Failed(String),
}

#[derive(Debug, Default)]
struct SessionState {
    mode: CaptureMode,
    /// Camera frame cached while the overlay snapshot is outstanding
    pending_frame: Option<PixelBuffer>,
    /// Last timer tick of the current or most recent recording
    elapsed_ms: u64,
}

struct EncoderSlot {
    encoder: Box<dyn Encoder>,
    /// Frames are fed only between a successful start and stop/cancel
    active: bool,
    failure: Option<StorageError>,
}

struct Shared {
    config: SessionConfig,
    timer: RecordTimer,
    state: Mutex<SessionState>,
    overlay: LatestSlot<OverlayFrame>,
    record_requested: AtomicBool,
    encoder: Mutex<EncoderSlot>,
    camera: Arc<dyn CameraSource>,
    render: Arc<dyn RenderSource>,
    store: Arc<dyn ImageStore>,
    ui: UiSender,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Photo and recording coordinator
pub struct CaptureSession {
    shared: Arc<Shared>,
    worker: Worker,
}

impl CaptureSession {
    pub fn new(
        config: SessionConfig,
        collaborators: Collaborators,
        ui: UiSender,
    ) -> Result<Self, SessionError> {
        let timer = RecordTimer::new(config.timer)?;
        let worker = Worker::spawn("capture-worker")?;

        info!(
            "Capture session ready: photo {}x{}, video {}x{}",
            config.photo_size.width,
            config.photo_size.height,
            config.video_size.width,
            config.video_size.height
        );

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                timer,
                state: Mutex::new(SessionState::default()),
                overlay: LatestSlot::new(),
                record_requested: AtomicBool::new(false),
                encoder: Mutex::new(EncoderSlot {
                    encoder: collaborators.encoder,
                    active: false,
                    failure: None,
                }),
                camera: collaborators.camera,
                render: collaborators.render,
                store: collaborators.store,
                ui,
            }),
            worker,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    pub fn mode(&self) -> CaptureMode {
        lock(&self.shared.state).mode
    }

    /// Last timer tick of the current or most recent recording
    pub fn elapsed_ms(&self) -> u64 {
        lock(&self.shared.state).elapsed_ms
    }

    /// Begin a photo: request an overlay snapshot and a photo-sized frame.
    ///
    /// The photo is composited and saved once both have arrived, in either
    /// order.
    pub fn take_photo(&self) -> Result<(), SessionError> {
        {
            let mut state = lock(&self.shared.state);
            if state.mode != CaptureMode::Idle {
                return Err(SessionError::Busy(state.mode));
            }
            state.mode = CaptureMode::PendingPhoto;
            state.pending_frame = None;
        }

        info!("Photo requested");
        self.shared.render.request_snapshot();
        self.shared.camera.set_target_size(self.shared.config.photo_size);
        Ok(())
    }

    /// Give up on an outstanding photo
    pub fn abort_photo(&self) {
        let mut state = lock(&self.shared.state);
        if state.mode == CaptureMode::PendingPhoto {
            state.mode = CaptureMode::Idle;
            state.pending_frame = None;
            self.shared.overlay.clear();
            warn!("Photo aborted before completion");
        }
    }

    /// Overlay frame from the renderer.
    ///
    /// Still snapshots are accepted while a photo is pending, packed frames
    /// while recording. Anything else is dropped.
    pub fn on_overlay(&self, frame: OverlayFrame) {
        let state = lock(&self.shared.state);
        match (state.mode, frame.kind()) {
            (CaptureMode::PendingPhoto, OverlayKind::Still) => {
                self.shared.overlay.publish(frame);
                self.try_complete_photo(state);
            }
            (CaptureMode::Recording, OverlayKind::Video) => {
                self.shared.overlay.publish(frame);
            }
            (mode, kind) => {
                debug!("Dropping {:?} overlay in {:?} mode", kind, mode);
            }
        }
    }

    /// Camera frame on the photo path
    pub fn handle_photo_frame(&self, frame: PixelBuffer) {
        let mut state = lock(&self.shared.state);
        if state.mode != CaptureMode::PendingPhoto {
            debug!("Photo frame outside a pending photo, dropped");
            return;
        }
        if frame.size() != self.shared.config.photo_size {
            debug!("Camera not yet at photo size, frame skipped");
            return;
        }
        if state.pending_frame.replace(frame).is_some() {
            debug!("Replaced cached photo frame");
        }
        self.try_complete_photo(state);
    }

    /// Camera frame on the video path.
    ///
    /// Composites the newest overlay, if one is waiting, and feeds the
    /// encoder while it is active. The overlay is consumed by this frame.
    pub fn handle_video_frame(&self, mut frame: PixelBuffer, timestamp_ms: u64) {
        if self.mode() != CaptureMode::Recording {
            debug!("Video frame outside a recording, dropped");
            return;
        }
        // Frames captured before the camera switched sizes
        if frame.size() != self.shared.config.video_size {
            debug!("Camera not yet at video size, frame at {}ms skipped", timestamp_ms);
            return;
        }

        if let Some(OverlayFrame::Video(packed)) = self
            .shared
            .overlay
            .take_if(|f| f.kind() == OverlayKind::Video)
        {
            if let Err(e) = composite_video_frame(&mut frame, Some(&packed)) {
                warn!("Recording frame left uncomposited: {}", e);
            }
        }

        let mut slot = lock(&self.shared.encoder);
        if !slot.active {
            debug!("Encoder not active, frame at {}ms skipped", timestamp_ms);
            return;
        }
        if let Err(e) = slot.encoder.feed_frame(&frame, timestamp_ms) {
            error!("Encoder rejected frame at {}ms: {}", timestamp_ms, e);
            slot.active = false;
            slot.failure = Some(e);
        }
    }

    /// Start recording on the worker thread.
    ///
    /// Runs until [`stop_recording`](Self::stop_recording) is called, the
    /// timer reaches its limit, or the encoder fails.
    pub fn start_recording(&self) -> Result<(), SessionError> {
        {
            let mut state = lock(&self.shared.state);
            if state.mode != CaptureMode::Idle {
                return Err(SessionError::Busy(state.mode));
            }
            state.mode = CaptureMode::Recording;
            state.elapsed_ms = 0;
        }
        self.shared.record_requested.store(true, Ordering::SeqCst);

        let shared = self.shared.clone();
        if let Err(e) = self.worker.submit(move || {
            shared.run_recording();
        }) {
            error!("Cannot start recording: {}", e);
            self.shared.record_requested.store(false, Ordering::SeqCst);
            lock(&self.shared.state).mode = CaptureMode::Idle;
            return Err(e);
        }

        info!("Recording requested");
        Ok(())
    }

    /// Ask a running recording to finish. The outcome is reported on the UI
    /// channel once the worker has wrapped up.
    pub fn stop_recording(&self) {
        if self.shared.record_requested.swap(false, Ordering::SeqCst) {
            info!("Recording stop requested");
        }
    }

    /// Abort pending work; a running recording finishes at its next tick
    pub fn shutdown(&self) {
        self.abort_photo();
        self.stop_recording();
    }

    fn try_complete_photo(&self, mut state: MutexGuard<'_, SessionState>) {
        if state.pending_frame.is_none() {
            return;
        }
        let Some(OverlayFrame::Still(overlay)) = self
            .shared
            .overlay
            .take_if(|f| f.kind() == OverlayKind::Still)
        else {
            return;
        };
        let Some(frame) = state.pending_frame.take() else {
            return;
        };
        state.mode = CaptureMode::Idle;
        drop(state);

        debug!("Photo inputs complete, compositing on worker");
        let shared = self.shared.clone();
        if let Err(e) = self.worker.submit(move || shared.finish_photo(frame, overlay)) {
            error!("Photo dropped: {}", e);
            self.shared.ui.send(UiEvent::PhotoFailed(e.to_string()));
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Shared {
    fn finish_photo(&self, mut photo: PixelBuffer, overlay: image::RgbaImage) {
        if let Err(e) = composite_still_frame(&mut photo, Some(overlay)) {
            warn!("Saving photo without overlay: {}", e);
        }

        match self.store.save(&photo) {
            Ok(path) => {
                info!("Photo saved: {}", path.display());
                self.ui.send(UiEvent::PhotoSaved(path));
            }
            Err(e) => {
                error!("Failed to save photo: {}", e);
                self.ui.send(UiEvent::PhotoFailed(e.to_string()));
            }
        }
    }

    fn start_encoder(&self) -> Result<(), StorageError> {
        let mut slot = lock(&self.encoder);
        slot.failure = None;
        slot.encoder.prepare(self.config.video_size)?;
        slot.encoder.start()?;
        slot.active = true;
        Ok(())
    }

    fn encoder_failed(&self) -> bool {
        lock(&self.encoder).failure.is_some()
    }

    fn run_recording(&self) -> RecordingOutcome {
        if let Err(e) = self.start_encoder() {
            error!("Encoder failed to start: {}", e);
            lock(&self.encoder).failure = Some(e);
            return self.finish_recording(0);
        }
        self.camera.set_target_size(self.config.video_size);
        self.render.start_continuous_publish();

        let total_ms = self.config.timer.max_duration_ms;
        let elapsed = self.timer.run(
            || !self.record_requested.load(Ordering::SeqCst) || self.encoder_failed(),
            |elapsed_ms| {
                lock(&self.state).elapsed_ms = elapsed_ms;
                self.ui.send(UiEvent::Progress {
                    elapsed_ms,
                    total_ms,
                });
            },
        );

        self.finish_recording(elapsed)
    }

    /// Close out a recording that ran for `elapsed_ms`.
    ///
    /// Keeps the output only when the encoder is healthy and the recording
    /// reached the minimum duration; otherwise the encoder is cancelled.
    fn finish_recording(&self, elapsed_ms: u64) -> RecordingOutcome {
        self.record_requested.store(false, Ordering::SeqCst);
        self.render.stop_continuous_publish();
        {
            let mut state = lock(&self.state);
            state.mode = CaptureMode::Idle;
            state.elapsed_ms = elapsed_ms;
            self.overlay.clear();
        }

        let outcome = {
            let mut slot = lock(&self.encoder);
            slot.active = false;
            if let Some(failure) = slot.failure.take() {
                slot.encoder.cancel();
                RecordingOutcome::Failed(failure.to_string())
            } else if elapsed_ms < self.config.min_duration_ms {
                slot.encoder.cancel();
                RecordingOutcome::TooShort
            } else {
                match slot.encoder.stop() {
                    Ok(path) => RecordingOutcome::Saved(path),
                    Err(e) => {
                        slot.encoder.cancel();
                        RecordingOutcome::Failed(e.to_string())
                    }
                }
            }
        };

        self.ui.send(UiEvent::ProgressReset);
        match &outcome {
            RecordingOutcome::Saved(path) => {
                info!("Recording kept after {}ms: {}", elapsed_ms, path.display());
                self.ui.send(UiEvent::RecordingSaved(path.clone()));
            }
            RecordingOutcome::TooShort => {
                info!(
                    "Recording discarded after {}ms (minimum {}ms)",
                    elapsed_ms, self.config.min_duration_ms
                );
                self.ui.send(UiEvent::RecordingTooShort);
            }
            RecordingOutcome::Failed(reason) => {
                error!("Recording failed: {}", reason);
                self.ui.send(UiEvent::RecordingFailed(reason.clone()));
            }
        }
        outcome
    }
}
