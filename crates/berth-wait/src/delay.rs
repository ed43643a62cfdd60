//! Delay providers
//!
//! Pollers never call `std::thread::sleep` directly. They suspend through a
//! [`Delay`] so tests can drive them without elapsed time.

use std::sync::Mutex;
use std::time::Duration;

/// Suspends the calling thread between polls
pub trait Delay: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Real delay backed by the OS scheduler
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Records requested delays and returns immediately
#[derive(Debug, Default)]
pub struct RecordingDelay {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested delays in call order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.sleeps.lock().map(|s| s.len()).unwrap_or_default()
    }

    /// Time that would have elapsed with a real delay
    pub fn total(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

impl Delay for RecordingDelay {
    fn sleep(&self, duration: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
    }
}
