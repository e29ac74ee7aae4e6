//! Progress reporting for conversions.
//!
//! Callers inject a [`ProgressCallback`]; the pipeline reports `(percent, message)` pairs
//! through a [`ProgressReporter`], which keeps the sequence strictly increasing, holds
//! back 100 until [`ProgressReporter::complete`], and contains panics raised by the
//! callback so that reporting stays best-effort.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ProgressEstimator`] | Chunk-driven estimate inside the 40–90 band |
//! | [`StreamSession`] | Estimator bound to the wall clock for one download |
//! | [`NoopProgress`] | Discards all updates |
//! | [`RecordingProgress`] | Keeps every update in memory |

mod estimator;
mod session;

pub use estimator::{ProgressEstimator, ProgressTuning, SizeTier};
pub use session::StreamSession;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::RwLock;
use tracing::warn;

pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, percent: u8, message: &str);
}

impl<F> ProgressCallback for F
where
    F: Fn(u8, &str) + Send + Sync,
{
    fn on_progress(&self, percent: u8, message: &str) {
        self(percent, message)
    }
}

pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_progress(&self, _percent: u8, _message: &str) {}
}

/// In-memory callback, mostly for tests.
#[derive(Default)]
pub struct RecordingProgress {
    events: RwLock<Vec<(u8, String)>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(u8, String)> {
        self.events.read().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn percentages(&self) -> Vec<u8> {
        self.events().into_iter().map(|(p, _)| p).collect()
    }

    pub fn last(&self) -> Option<u8> {
        self.percentages().last().copied()
    }
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, percent: u8, message: &str) {
        if let Ok(mut events) = self.events.write() {
            events.push((percent, message.to_string()));
        }
    }
}

/// Monotonic, panic-contained front for a [`ProgressCallback`].
pub struct ProgressReporter<'a> {
    callback: &'a dyn ProgressCallback,
    last: Option<u8>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(callback: &'a dyn ProgressCallback) -> Self {
        Self {
            callback,
            last: None,
        }
    }

    /// Report `percent` (capped at 99) if it moves the indicator forward.
    pub fn report(&mut self, percent: u8, message: &str) {
        self.emit(percent.min(99), message);
    }

    /// Report 100; only called once the output has been verified.
    pub fn complete(&mut self, message: &str) {
        self.emit(100, message);
    }

    pub fn last(&self) -> Option<u8> {
        self.last
    }

    fn emit(&mut self, percent: u8, message: &str) {
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        let callback = self.callback;
        if catch_unwind(AssertUnwindSafe(|| callback.on_progress(percent, message))).is_err() {
            warn!(percent, "progress callback panicked; continuing conversion");
        }
    }
}
