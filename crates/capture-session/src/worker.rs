//! Dedicated capture worker thread

use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::SessionError;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs submitted jobs one at a time on its own thread
pub(crate) struct Worker {
    tx: Option<mpsc::UnboundedSender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub(crate) fn spawn(name: &str) -> Result<Self, SessionError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Some(job) = rx.blocking_recv() {
                    job();
                }
                debug!("Worker queue closed");
            })
            .map_err(|e| SessionError::WorkerSpawn(e.to_string()))?;

        info!("Started worker thread '{}'", name);
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    pub(crate) fn submit(&self, job: impl FnOnce() + Send + 'static) -> Result<(), SessionError> {
        let tx = self.tx.as_ref().ok_or(SessionError::WorkerUnavailable)?;
        tx.send(Box::new(job)).map_err(|_| SessionError::WorkerUnavailable)
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Closing the queue lets the thread finish its current job and exit
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Capture worker panicked");
            }
        }
    }
}
