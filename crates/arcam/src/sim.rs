//! Synthetic devices
//!
//! Stand-ins for the camera, the 3D overlay renderer and the face tracker,
//! used to drive the pipeline end-to-end without hardware.

use camera_capture::{
    CameraSource, ChannelOrder, FrameSize, OverlayFrame, PackedFrame, PixelBuffer, RenderSource,
};
use face_pose::{
    Effect, FaceActions, FaceDetection, LandmarkConsumer, Orientation, OverlayRotation, PoseTarget,
    Rect, TrackingSample,
};
use image::{Rgba, RgbaImage};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Camera producing a moving gradient at the requested size
pub struct SimCamera {
    size: Mutex<FrameSize>,
}

impl SimCamera {
    pub fn new(initial: FrameSize) -> Self {
        Self {
            size: Mutex::new(initial),
        }
    }

    pub fn size(&self) -> FrameSize {
        *self.size.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Produce the frame for `timestamp_ms`
    pub fn capture(&self, timestamp_ms: u64) -> PixelBuffer {
        let size = self.size();
        let shift = (timestamp_ms / 10) as u32;
        let mut frame = PixelBuffer::blank(size.width, size.height, ChannelOrder::Rgba);
        let width = size.width.max(1) as usize;

        for (i, px) in frame.data_mut().chunks_exact_mut(4).enumerate() {
            let x = (i % width) as u32;
            let y = (i / width) as u32;
            px.copy_from_slice(&[
                (x.wrapping_add(shift) & 0xff) as u8,
                (y & 0xff) as u8,
                0x40,
                0xff,
            ]);
        }
        frame
    }
}

impl CameraSource for SimCamera {
    fn set_target_size(&self, size: FrameSize) {
        debug!("Camera resized to {}x{}", size.width, size.height);
        *self.size.lock().unwrap_or_else(PoisonError::into_inner) = size;
    }
}

#[derive(Debug, Clone, Copy)]
struct OverlayPose {
    x: f32,
    y: f32,
    scale: f32,
    rotation: OverlayRotation,
}

impl Default for OverlayPose {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation: OverlayRotation::default(),
        }
    }
}

/// Overlay renderer drawing a square "mask" that follows the pose
pub struct SimRenderer {
    still_size: FrameSize,
    video_size: FrameSize,
    pose: Mutex<OverlayPose>,
    snapshot_requested: AtomicBool,
    publishing: AtomicBool,
    rendered: AtomicU64,
}

impl SimRenderer {
    /// `still_size` is the native snapshot size; snapshots are rescaled to
    /// the photo downstream. Video overlays are produced at `video_size`.
    pub fn new(still_size: FrameSize, video_size: FrameSize) -> Self {
        Self {
            still_size,
            video_size,
            pose: Mutex::new(OverlayPose::default()),
            snapshot_requested: AtomicBool::new(false),
            publishing: AtomicBool::new(false),
            rendered: AtomicU64::new(0),
        }
    }

    /// Render one frame; returns the overlay to hand to the session, if any
    pub fn render(&self) -> Option<OverlayFrame> {
        let pose = *self.pose.lock().unwrap_or_else(PoisonError::into_inner);

        if self.snapshot_requested.swap(false, Ordering::SeqCst) {
            self.rendered.fetch_add(1, Ordering::Relaxed);
            let (x0, y0, x1, y1) = mask_bounds(self.still_size, &pose);
            let image = RgbaImage::from_fn(self.still_size.width, self.still_size.height, |x, y| {
                if x >= x0 && x < x1 && y >= y0 && y < y1 {
                    Rgba([240, 80, 160, 200])
                } else {
                    Rgba([0, 0, 0, 0])
                }
            });
            return Some(OverlayFrame::Still(image));
        }

        if self.publishing.load(Ordering::SeqCst) {
            self.rendered.fetch_add(1, Ordering::Relaxed);
            let size = self.video_size;
            let (x0, y0, x1, y1) = mask_bounds(size, &pose);
            let mask = u32::from_le_bytes([0xff, 240, 80, 160]);
            let words = (0..size.pixel_count())
                .map(|i| {
                    let x = (i % size.width as usize) as u32;
                    let y = (i / size.width as usize) as u32;
                    if x >= x0 && x < x1 && y >= y0 && y < y1 {
                        mask
                    } else {
                        0
                    }
                })
                .collect();
            return PackedFrame::new(words, size.width, size.height)
                .ok()
                .map(OverlayFrame::Video);
        }

        None
    }

    pub fn rendered(&self) -> u64 {
        self.rendered.load(Ordering::Relaxed)
    }

    pub fn is_publishing(&self) -> bool {
        self.publishing.load(Ordering::SeqCst)
    }
}

/// Mask rectangle for a pose: centered on the translation, side a quarter of
/// the short edge times the scale.
fn mask_bounds(size: FrameSize, pose: &OverlayPose) -> (u32, u32, u32, u32) {
    let (w, h) = (size.width as f32, size.height as f32);
    let half = (w.min(h) / 8.0 * pose.scale.clamp(0.1, 4.0)).max(1.0);
    let cx = (pose.x + 1.0) / 2.0 * w;
    let cy = (pose.y + 1.0) / 2.0 * h;

    let clamp = |v: f32, max: f32| v.clamp(0.0, max) as u32;
    (
        clamp(cx - half, w),
        clamp(cy - half, h),
        clamp(cx + half, w),
        clamp(cy + half, h),
    )
}

impl RenderSource for SimRenderer {
    fn request_snapshot(&self) {
        self.snapshot_requested.store(true, Ordering::SeqCst);
    }

    fn start_continuous_publish(&self) {
        self.publishing.store(true, Ordering::SeqCst);
    }

    fn stop_continuous_publish(&self) {
        self.publishing.store(false, Ordering::SeqCst);
    }
}

impl PoseTarget for SimRenderer {
    fn set_rotation(&self, rotation: OverlayRotation) {
        self.pose.lock().unwrap_or_else(PoisonError::into_inner).rotation = rotation;
    }

    fn set_translation(&self, x: f32, y: f32) {
        let mut pose = self.pose.lock().unwrap_or_else(PoisonError::into_inner);
        pose.x = x;
        pose.y = y;
    }

    fn set_scale(&self, scale: f32) {
        self.pose.lock().unwrap_or_else(PoisonError::into_inner).scale = scale;
    }
}

/// Tracker emitting a face that drifts across the preview
pub struct SimTracker {
    preview: FrameSize,
    empty_every: u64,
    cycle: u64,
}

impl SimTracker {
    pub fn new(preview: FrameSize, empty_every: u64) -> Self {
        Self {
            preview,
            empty_every,
            cycle: 0,
        }
    }

    /// Next tracker callback
    pub fn next_sample(&mut self) -> TrackingSample {
        self.cycle += 1;
        let t = self.cycle as f32 / 10.0;

        let mut sample = TrackingSample {
            orientation: Orientation::Deg90,
            eye_distance: 1_200_000_000 + (t.sin() * 1e8) as i32,
            yaw: t.sin() * 20.0,
            pitch: t.cos() * 10.0,
            roll: (t * 0.5).sin() * 15.0,
            latency_ms: 12 + (self.cycle % 5) as i32,
            actions: FaceActions {
                face_id: 1,
                eye_blink: i32::from(self.cycle % 7 == 0),
                mouth_open: i32::from(self.cycle % 3 == 0),
                ..FaceActions::default()
            },
            ..TrackingSample::default()
        };

        if self.empty_every == 0 || self.cycle % self.empty_every != 0 {
            let w = self.preview.width as i32;
            let h = self.preview.height as i32;
            let cx = w / 2 + (t.cos() * w as f32 / 6.0) as i32;
            let cy = h / 2 + (t.sin() * h as f32 / 6.0) as i32;
            let rect = Rect {
                left: cx - 60,
                top: cy - 60,
                right: cx + 60,
                bottom: cy + 60,
            };
            let landmarks = (0..5)
                .map(|i| ((cx - 40 + i * 20) as f32, (cy + (i % 2) * 10) as f32))
                .collect();
            sample.faces.push(FaceDetection { rect, landmarks });
        }

        sample
    }
}

/// Effect that tracks face landmarks
#[derive(Debug, Default)]
pub struct FaceMeshEffect {
    pub updates: u64,
    pub last_points: usize,
    pub mouth_open: i32,
}

impl Effect for FaceMeshEffect {
    fn name(&self) -> &str {
        "face-mesh"
    }

    fn landmark_consumer(&mut self) -> Option<&mut dyn LandmarkConsumer> {
        Some(self)
    }
}

impl LandmarkConsumer for FaceMeshEffect {
    fn set_landmarks(&mut self, xs: &[f32], ys: &[f32]) {
        self.updates += 1;
        self.last_points = xs.len().min(ys.len());
    }

    fn set_mouth_open(&mut self, value: i32) {
        self.mouth_open = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_follows_target_size() {
        let camera = SimCamera::new(FrameSize::preview());
        camera.set_target_size(FrameSize::new(4, 2));

        let frame = camera.capture(0);
        assert_eq!(frame.size(), FrameSize::new(4, 2));
        assert_eq!(frame.pixel(3, 1), Some([3, 1, 0x40, 0xff]));
    }

    #[test]
    fn test_renderer_publishes_by_mode() {
        let renderer = SimRenderer::new(FrameSize::new(8, 8), FrameSize::new(4, 4));
        assert!(renderer.render().is_none());

        renderer.request_snapshot();
        assert!(matches!(renderer.render(), Some(OverlayFrame::Still(img)) if img.dimensions() == (8, 8)));
        assert!(renderer.render().is_none());

        renderer.start_continuous_publish();
        let frame = renderer.render().unwrap();
        assert_eq!(frame.size(), FrameSize::new(4, 4));
        renderer.stop_continuous_publish();
        assert!(renderer.render().is_none());
        assert_eq!(renderer.rendered(), 2);
    }

    #[test]
    fn test_video_overlay_centered_mask() {
        let renderer = SimRenderer::new(FrameSize::new(8, 8), FrameSize::new(16, 16));
        renderer.start_continuous_publish();

        let Some(OverlayFrame::Video(packed)) = renderer.render() else {
            panic!("expected a video overlay");
        };
        let words = packed.words();
        // Centered, side 2 * 16/8
        assert_ne!(words[8 * 16 + 8], 0);
        assert_eq!(words[0], 0);
    }

    #[test]
    fn test_tracker_emits_empty_cycles() {
        let mut tracker = SimTracker::new(FrameSize::preview(), 3);
        let faces: Vec<usize> = (0..6).map(|_| tracker.next_sample().faces.len()).collect();
        assert_eq!(faces, vec![1, 1, 0, 1, 1, 0]);
    }
}
