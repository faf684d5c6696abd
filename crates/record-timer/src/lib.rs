//! Recording Timer
//!
//! Blocking loop that advances elapsed recording time in fixed steps,
//! reports each step and stops at the maximum duration or on cancellation.

mod timer;

pub use timer::{RecordTimer, TimerConfig};

use thiserror::Error;

/// Timer configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("Step must be greater than zero")]
    ZeroStep,

    #[error("Step {step_ms}ms exceeds maximum duration {max_duration_ms}ms")]
    StepTooLarge { step_ms: u64, max_duration_ms: u64 },
}
