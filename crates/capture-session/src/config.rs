//! Session configuration

use camera_capture::FrameSize;
use record_timer::TimerConfig;
use serde::{Deserialize, Serialize};

/// Capture session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Recording length limit and tick step
    pub timer: TimerConfig,

    /// Recordings shorter than this are discarded (milliseconds)
    pub min_duration_ms: u64,

    /// Holding the capture control longer than this starts recording
    pub long_press_ms: u64,

    /// Camera frame size requested for photos
    pub photo_size: FrameSize,

    /// Camera frame and encoder size for recordings
    pub video_size: FrameSize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            min_duration_ms: 2000,
            long_press_ms: 500,
            photo_size: FrameSize::photo(),
            video_size: FrameSize::video(),
        }
    }
}
