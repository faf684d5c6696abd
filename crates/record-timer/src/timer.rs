//! Record Timer Implementation

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::TimerError;

/// Configuration for the recording timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Longest recording in milliseconds (default: 20000)
    pub max_duration_ms: u64,
    /// Tick interval in milliseconds (default: 50)
    pub step_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            max_duration_ms: 20_000,
            step_ms: 50,
        }
    }
}

impl TimerConfig {
    /// Check the step against the maximum duration
    pub fn validate(&self) -> Result<(), TimerError> {
        if self.step_ms == 0 {
            return Err(TimerError::ZeroStep);
        }
        if self.step_ms > self.max_duration_ms {
            return Err(TimerError::StepTooLarge {
                step_ms: self.step_ms,
                max_duration_ms: self.max_duration_ms,
            });
        }
        Ok(())
    }

    /// Number of ticks an uncancelled run performs
    pub fn tick_count(&self) -> u64 {
        self.max_duration_ms / self.step_ms + 1
    }
}

/// Paced recording loop.
///
/// Blocks the calling thread for the whole run; call it from a worker.
#[derive(Debug, Clone)]
pub struct RecordTimer {
    config: TimerConfig,
}

impl RecordTimer {
    /// Create a timer, rejecting a zero or oversized step
    pub fn new(config: TimerConfig) -> Result<Self, TimerError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Run the loop.
    ///
    /// Ticks at 0, step, 2*step, ... while elapsed <= max and `is_cancelled`
    /// returns false. After each tick it sleeps for the step minus the time
    /// the tick took, or not at all when the tick overran. Returns the
    /// elapsed value of the last tick, 0 if cancelled before the first.
    pub fn run<C, T>(&self, mut is_cancelled: C, mut on_tick: T) -> u64
    where
        C: FnMut() -> bool,
        T: FnMut(u64),
    {
        let step = Duration::from_millis(self.config.step_ms);
        info!(
            "Starting record timer: max={}ms, step={}ms",
            self.config.max_duration_ms, self.config.step_ms
        );

        let mut elapsed = 0;
        let mut last_tick = 0;

        while elapsed <= self.config.max_duration_ms && !is_cancelled() {
            let start = Instant::now();
            on_tick(elapsed);
            last_tick = elapsed;

            let spent = start.elapsed();
            if let Some(remaining) = step.checked_sub(spent) {
                std::thread::sleep(remaining);
            } else {
                debug!("Tick at {}ms overran step by {:?}", elapsed, spent - step);
            }

            elapsed += self.config.step_ms;
        }

        info!("Record timer stopped at {}ms", last_tick);
        last_tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn timer(max_duration_ms: u64, step_ms: u64) -> RecordTimer {
        RecordTimer::new(TimerConfig {
            max_duration_ms,
            step_ms,
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = TimerConfig::default();
        assert_eq!(config.max_duration_ms, 20_000);
        assert_eq!(config.step_ms, 50);
        assert_eq!(config.tick_count(), 401);
    }

    #[test]
    fn test_runs_to_max_inclusive() {
        let mut ticks = Vec::new();
        let elapsed = timer(200, 50).run(|| false, |t| ticks.push(t));

        assert_eq!(ticks, vec![0, 50, 100, 150, 200]);
        assert_eq!(elapsed, 200);
    }

    #[test]
    fn test_cancel_after_second_tick() {
        let ticks = Cell::new(0);
        let elapsed = timer(200, 50).run(|| ticks.get() >= 2, |_| ticks.set(ticks.get() + 1));

        assert_eq!(ticks.get(), 2);
        assert_eq!(elapsed, 50);
    }

    #[test]
    fn test_cancelled_before_start() {
        let mut ticks = 0;
        let elapsed = timer(200, 50).run(|| true, |_| ticks += 1);
        assert_eq!(ticks, 0);
        assert_eq!(elapsed, 0);
    }

    #[test]
    fn test_paces_steps() {
        let start = Instant::now();
        timer(100, 20).run(|| false, |_| {});
        // 6 ticks, each padded to the full step
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn test_overrunning_tick_skips_sleep() {
        let start = Instant::now();
        let mut ticks = 0;
        timer(20, 10).run(
            || false,
            |_| {
                ticks += 1;
                std::thread::sleep(Duration::from_millis(15));
            },
        );
        assert_eq!(ticks, 3);
        // No extra sleep on top of the 15ms ticks
        assert!(start.elapsed() < Duration::from_millis(45 + 30));
    }

    #[test]
    fn test_invalid_step() {
        assert_eq!(
            RecordTimer::new(TimerConfig {
                max_duration_ms: 100,
                step_ms: 0
            })
            .unwrap_err(),
            TimerError::ZeroStep
        );
        assert!(RecordTimer::new(TimerConfig {
            max_duration_ms: 10,
            step_ms: 50
        })
        .is_err());
    }
}
