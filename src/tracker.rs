use crate::storage::Config;
use anyhow::{Context, Result};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const SAMPLE_PERIOD: Duration = Duration::from_secs(5);

/// Window position and size, in terminal cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometry {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

pub type SharedGeometry = Arc<Mutex<Geometry>>;
pub type SharedConfig = Arc<Mutex<Config>>;

/// Background timer copying the window geometry into the config record.
pub struct PositionTracker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PositionTracker {
    pub fn start(window: SharedGeometry, config: SharedConfig) -> Result<Self> {
        Self::with_period(window, config, SAMPLE_PERIOD)
    }

    pub fn with_period(
        window: SharedGeometry,
        config: SharedConfig,
        period: Duration,
    ) -> Result<Self> {
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("position-tracker".into())
            .spawn(move || loop {
                match stopped.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => sample(&window, &config),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .context("spawning position tracker")?;
        tracing::debug!(period_ms = period.as_millis() as u64, "position tracker started");
        Ok(PositionTracker {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Stops the timer and waits for the thread to exit.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("position tracker thread panicked");
            }
            tracing::debug!("position tracker stopped");
        }
    }
}

impl Drop for PositionTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Copies the current window geometry into the config record.
pub fn sample(window: &SharedGeometry, config: &SharedConfig) {
    let geometry = *lock(window);
    let mut config = lock(config);
    config.left = geometry.left;
    config.top = geometry.top;
    config.width = geometry.width;
    config.height = geometry.height;
}

/// Locks `mutex`, recovering the data if a holder panicked.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
