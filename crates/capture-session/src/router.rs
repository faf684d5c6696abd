//! Camera frame dispatch

use camera_capture::PixelBuffer;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

use crate::session::CaptureSession;
use crate::CaptureMode;

/// Where a camera frame went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Video,
    Photo,
    Dropped,
}

/// Sends each camera frame to the handler for the current session mode
pub struct FrameRouter {
    session: Arc<CaptureSession>,
    video: AtomicU64,
    photo: AtomicU64,
    dropped: AtomicU64,
}

impl FrameRouter {
    pub fn new(session: Arc<CaptureSession>) -> Self {
        Self {
            session,
            video: AtomicU64::new(0),
            photo: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Camera callback entry point
    pub fn on_frame(&self, frame: PixelBuffer, timestamp_ms: u64) -> Route {
        match self.session.mode() {
            CaptureMode::Recording => {
                self.video.fetch_add(1, Ordering::Relaxed);
                self.session.handle_video_frame(frame, timestamp_ms);
                Route::Video
            }
            CaptureMode::PendingPhoto => {
                self.photo.fetch_add(1, Ordering::Relaxed);
                self.session.handle_photo_frame(frame);
                Route::Photo
            }
            CaptureMode::Idle => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                trace!("Idle, frame at {}ms dropped", timestamp_ms);
                Route::Dropped
            }
        }
    }

    /// (video, photo, dropped) frame counts
    pub fn counts(&self) -> (u64, u64, u64) {
        (
            self.video.load(Ordering::Relaxed),
            self.photo.load(Ordering::Relaxed),
            self.dropped.load(Ordering::Relaxed),
        )
    }

    pub fn session(&self) -> &Arc<CaptureSession> {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{harness, solid, test_config, wait_for};
    use crate::UiEvent;
    use camera_capture::{FrameSize, OverlayFrame};
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_idle_frames_dropped() {
        let h = harness(test_config());
        let router = FrameRouter::new(h.session.clone());

        for ts in 0..3 {
            assert_eq!(router.on_frame(solid(FrameSize::new(2, 2), [1; 4]), ts), Route::Dropped);
        }
        assert_eq!(router.counts(), (0, 0, 3));
        assert!(h.store.saved.lock().unwrap().is_empty());
        assert!(h.encoder.frames.lock().unwrap().is_empty());
    }

    #[test]
    fn test_pending_photo_routes_to_photo() {
        let mut h = harness(test_config());
        let router = FrameRouter::new(h.session.clone());

        h.session.take_photo().unwrap();
        h.session
            .on_overlay(OverlayFrame::Still(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]))));

        assert_eq!(router.on_frame(solid(FrameSize::new(2, 2), [9; 4]), 0), Route::Photo);
        // Photo completed, session is idle again
        assert_eq!(router.on_frame(solid(FrameSize::new(2, 2), [9; 4]), 1), Route::Dropped);

        assert!(matches!(
            wait_for(&mut h.events, |e| matches!(e, UiEvent::PhotoSaved(_))),
            Some(UiEvent::PhotoSaved(_))
        ));
        assert_eq!(h.store.saved.lock().unwrap()[0].pixel(0, 0), Some([9; 4]));
    }

    #[test]
    fn test_recording_routes_to_video() {
        let mut h = harness(test_config());
        let router = FrameRouter::new(h.session.clone());

        h.session.start_recording().unwrap();
        assert!(wait_for(&mut h.events, |e| matches!(e, UiEvent::Progress { .. })).is_some());
        assert_eq!(router.on_frame(solid(FrameSize::new(2, 2), [3; 4]), 40), Route::Video);
        h.session.stop_recording();

        assert!(wait_for(&mut h.events, |e| matches!(e, UiEvent::ProgressReset)).is_some());
        assert_eq!(router.counts().0, 1);
        assert_eq!(h.encoder.frames.lock().unwrap()[0].1, 40);
    }
}
