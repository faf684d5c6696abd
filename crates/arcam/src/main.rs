//! AR Camera Pipeline - Main Entry Point
//!
//! Runs the pipeline against simulated devices: one tap for a photo, then
//! a held press for a recording.

use anyhow::Context;
use arcam::config::load_config;
use arcam::sim::{FaceMeshEffect, SimCamera, SimRenderer, SimTracker};
use arcam::{init_logging, Devices, Pipeline};
use camera_capture::FrameSize;
use capture_session::{ui_channel, UiEvent, UiEvents};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_logging(&config.logging)?;

    info!("=== ARCam Pipeline v{} ===", env!("CARGO_PKG_VERSION"));
    debug!("Configuration: {}", serde_json::to_string(&config)?);

    let camera = Arc::new(SimCamera::new(FrameSize::preview()));
    let renderer = Arc::new(SimRenderer::new(
        FrameSize::preview(),
        config.session.video_size,
    ));
    let devices = Devices::file_backed(&config, camera.clone(), renderer.clone(), renderer.clone());

    let (ui, mut events) = ui_channel();
    let pipeline = Arc::new(Pipeline::new(&config, devices, ui)?);
    pipeline.set_effect(Box::new(FaceMeshEffect::default()));

    let running = Arc::new(AtomicBool::new(true));
    let frame_interval = Duration::from_millis(config.simulation.frame_interval_ms);
    let tracking_interval = Duration::from_millis(config.simulation.tracking_interval_ms);

    // Camera + renderer device thread
    let device_thread = {
        let pipeline = pipeline.clone();
        let running = running.clone();
        thread::Builder::new()
            .name("sim-devices".to_string())
            .spawn(move || {
                let start = Instant::now();
                while running.load(Ordering::SeqCst) {
                    if let Some(overlay) = renderer.render() {
                        pipeline.on_overlay(overlay);
                    }
                    let ts = start.elapsed().as_millis() as u64;
                    pipeline.on_camera_frame(camera.capture(ts), ts);
                    thread::sleep(frame_interval);
                }
            })?
    };

    // Face tracker thread
    let tracker_thread = {
        let pipeline = pipeline.clone();
        let running = running.clone();
        let mut tracker = SimTracker::new(config.pose.preview, config.simulation.empty_every);
        thread::Builder::new()
            .name("sim-tracker".to_string())
            .spawn(move || {
                while running.load(Ordering::SeqCst) {
                    pipeline.on_tracking(&tracker.next_sample());
                    thread::sleep(tracking_interval);
                }
            })?
    };

    info!("Tap: taking a photo");
    pipeline.button().press();
    pipeline.button().release();
    let photo = wait_for_result(&mut events, Duration::from_secs(10)).await;

    info!("Hold: recording for {}ms", config.simulation.record_hold_ms);
    pipeline.button().press();
    tokio::time::sleep(Duration::from_millis(config.simulation.record_hold_ms)).await;
    pipeline.button().release();
    let limit = Duration::from_millis(config.session.timer.max_duration_ms + 5000);
    let recording = wait_for_result(&mut events, limit).await;

    pipeline.shutdown();
    running.store(false, Ordering::SeqCst);
    for handle in [device_thread, tracker_thread] {
        if handle.join().is_err() {
            error!("Simulation thread panicked");
        }
    }

    let (video, photo_frames, dropped) = pipeline.frame_counts();
    info!(
        "Frames: {} video, {} photo, {} dropped; {} tracking cycles without a face",
        video,
        photo_frames,
        dropped,
        pipeline.skipped_tracking_cycles()
    );

    match (photo, recording) {
        (Some(photo), Some(recording)) => {
            info!("Photo: {:?}", photo);
            info!("Recording: {:?}", recording);
            Ok(())
        }
        _ => anyhow::bail!("capture did not complete in time"),
    }
}

/// Drain UI events until a photo or recording result arrives
async fn wait_for_result(events: &mut UiEvents, limit: Duration) -> Option<UiEvent> {
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        let event = match tokio::time::timeout_at(deadline, events.next()).await {
            Ok(Some(event)) => event,
            Ok(None) => return None,
            Err(_) => {
                warn!("Timed out waiting for capture result");
                return None;
            }
        };

        match event {
            UiEvent::Tracking(report) => debug!("{}", report),
            UiEvent::Progress {
                elapsed_ms,
                total_ms,
            } => {
                if elapsed_ms % 1000 == 0 {
                    info!("Recording {}/{}ms", elapsed_ms, total_ms);
                }
            }
            UiEvent::ProgressReset => debug!("Progress reset"),
            result @ (UiEvent::PhotoSaved(_)
            | UiEvent::PhotoFailed(_)
            | UiEvent::RecordingSaved(_)
            | UiEvent::RecordingTooShort
            | UiEvent::RecordingFailed(_)) => return Some(result),
        }
    }
}
