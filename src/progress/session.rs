use super::estimator::{ProgressEstimator, ProgressTuning};
use std::time::{Duration, Instant};

/// Per-conversion download state.
///
/// Created when the response headers arrive and dropped when the body stream ends, so it
/// never outlives a single conversion and is never shared.
#[derive(Debug)]
pub struct StreamSession {
    started: Instant,
    estimator: ProgressEstimator,
}

impl StreamSession {
    pub fn begin(declared_total: Option<u64>, tuning: ProgressTuning) -> Self {
        Self {
            started: Instant::now(),
            estimator: ProgressEstimator::with_tuning(declared_total, tuning),
        }
    }

    /// Record a received chunk against the wall clock.
    pub fn record_chunk(&mut self, len: usize) -> Option<u8> {
        let elapsed = self.started.elapsed();
        self.estimator.record(len, elapsed)
    }

    pub fn bytes_downloaded(&self) -> u64 {
        self.estimator.downloaded()
    }

    pub fn total_known(&self) -> bool {
        self.estimator.declared_total().is_some()
    }

    pub fn last_percent(&self) -> u8 {
        self.estimator.last_reported()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
