//! Test doubles for the session collaborators

use camera_capture::{CameraSource, ChannelOrder, FrameSize, PixelBuffer, RenderSource};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use storage::{Encoder, ImageStore, StorageError};

use crate::session::{CaptureSession, Collaborators};
use crate::ui::{ui_channel, UiEvent, UiEvents};
use crate::SessionConfig;

#[derive(Default)]
pub struct MockCamera {
    pub sizes: Mutex<Vec<FrameSize>>,
}

impl CameraSource for MockCamera {
    fn set_target_size(&self, size: FrameSize) {
        self.sizes.lock().unwrap().push(size);
    }
}

#[derive(Default)]
pub struct MockRender {
    pub calls: Mutex<Vec<&'static str>>,
}

impl RenderSource for MockRender {
    fn request_snapshot(&self) {
        self.calls.lock().unwrap().push("snapshot");
    }

    fn start_continuous_publish(&self) {
        self.calls.lock().unwrap().push("start");
    }

    fn stop_continuous_publish(&self) {
        self.calls.lock().unwrap().push("stop");
    }
}

#[derive(Default)]
pub struct MockStore {
    pub saved: Mutex<Vec<PixelBuffer>>,
    pub fail: AtomicBool,
}

impl ImageStore for MockStore {
    fn save(&self, image: &PixelBuffer) -> Result<PathBuf, StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Io("disk full".to_string()));
        }
        let mut saved = self.saved.lock().unwrap();
        saved.push(image.clone());
        Ok(PathBuf::from(format!("photo-{}.jpg", saved.len())))
    }
}

/// Shared log of what the session asked the encoder to do
#[derive(Default)]
pub struct EncoderLog {
    pub calls: Mutex<Vec<&'static str>>,
    pub frames: Mutex<Vec<(PixelBuffer, u64)>>,
    pub fail_prepare: AtomicBool,
    pub fail_feed: AtomicBool,
}

impl EncoderLog {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

pub struct MockEncoder {
    pub log: Arc<EncoderLog>,
}

impl Encoder for MockEncoder {
    fn prepare(&mut self, _size: FrameSize) -> Result<(), StorageError> {
        self.log.calls.lock().unwrap().push("prepare");
        if self.log.fail_prepare.load(Ordering::SeqCst) {
            return Err(StorageError::DirectoryCreate {
                path: PathBuf::from("/nope"),
                reason: "read-only".to_string(),
            });
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), StorageError> {
        self.log.calls.lock().unwrap().push("start");
        Ok(())
    }

    fn feed_frame(&mut self, frame: &PixelBuffer, timestamp_ms: u64) -> Result<(), StorageError> {
        if self.log.fail_feed.load(Ordering::SeqCst) {
            return Err(StorageError::Encode("codec error".to_string()));
        }
        self.log.frames.lock().unwrap().push((frame.clone(), timestamp_ms));
        Ok(())
    }

    fn stop(&mut self) -> Result<PathBuf, StorageError> {
        self.log.calls.lock().unwrap().push("stop");
        Ok(PathBuf::from("clip.raw"))
    }

    fn cancel(&mut self) {
        self.log.calls.lock().unwrap().push("cancel");
    }
}

pub struct Harness {
    pub session: Arc<CaptureSession>,
    pub events: UiEvents,
    pub camera: Arc<MockCamera>,
    pub render: Arc<MockRender>,
    pub store: Arc<MockStore>,
    pub encoder: Arc<EncoderLog>,
}

/// Small frames and a fast timer so recordings finish quickly
pub fn test_config() -> SessionConfig {
    let mut config = SessionConfig {
        photo_size: FrameSize::new(2, 2),
        video_size: FrameSize::new(2, 2),
        min_duration_ms: 40,
        long_press_ms: 30,
        ..SessionConfig::default()
    };
    config.timer.max_duration_ms = 100;
    config.timer.step_ms = 10;
    config
}

pub fn harness(config: SessionConfig) -> Harness {
    let camera = Arc::new(MockCamera::default());
    let render = Arc::new(MockRender::default());
    let store = Arc::new(MockStore::default());
    let encoder = Arc::new(EncoderLog::default());
    let (ui, events) = ui_channel();

    let session = CaptureSession::new(
        config,
        Collaborators {
            camera: camera.clone(),
            render: render.clone(),
            store: store.clone(),
            encoder: Box::new(MockEncoder { log: encoder.clone() }),
        },
        ui,
    )
    .unwrap();

    Harness {
        session: Arc::new(session),
        events,
        camera,
        render,
        store,
        encoder,
    }
}

pub fn solid(size: FrameSize, px: [u8; 4]) -> PixelBuffer {
    let data = px.repeat(size.pixel_count());
    PixelBuffer::new(data, size.width, size.height, ChannelOrder::Rgba).unwrap()
}

/// Poll the UI channel until `accept` matches an event or the deadline passes
pub fn wait_for(events: &mut UiEvents, mut accept: impl FnMut(&UiEvent) -> bool) -> Option<UiEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        match events.try_next() {
            Some(event) if accept(&event) => return Some(event),
            Some(_) => {}
            None => std::thread::sleep(Duration::from_millis(2)),
        }
    }
    None
}
