//! Interfaces of the two frame producers
//!
//! Both producers deliver their frames asynchronously on their own threads;
//! the capture pipeline only ever calls these control methods.

use crate::FrameSize;

/// Camera device feeding the capture tap
pub trait CameraSource: Send + Sync {
    /// Resolution of frames delivered to the capture tap from now on
    fn set_target_size(&self, size: FrameSize);
}

/// 3D overlay renderer
pub trait RenderSource: Send + Sync {
    /// Ask for a one-shot still snapshot; it arrives later as an
    /// [`OverlayFrame::Still`](crate::OverlayFrame::Still)
    fn request_snapshot(&self);

    /// Publish a video overlay after every rendered frame
    fn start_continuous_publish(&self);

    /// Stop per-frame publishing
    fn stop_continuous_publish(&self);
}
