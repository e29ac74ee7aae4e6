//! Chunk-driven completion estimate for a streamed download.
//!
//! Two regimes share the `[band_start, band_end]` window (40–90 by default):
//!
//! - **Declared length**: linear in `downloaded / content_length`, reported only once it
//!   moves by more than `declared_hysteresis` points (or reaches the band end).
//! - **Unknown length**: a blend of elapsed time and received size, weighted by a size
//!   tier, floored at `last + 1` so that every emission moves forward. Emissions are
//!   rate-limited to one per `emit_interval` or per new `emit_boundary_bytes` boundary.

use std::time::Duration;

const MIB: f64 = 1024.0 * 1024.0;

/// Weights of the time and size components for one size tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeTier {
    /// Points the time component saturates at.
    pub time_cap: f64,
    /// Seconds after which the time component is saturated.
    pub time_horizon_secs: f64,
    /// Points the size component saturates at.
    pub size_cap: f64,
    pub points_per_mib: f64,
}

impl SizeTier {
    fn time_component(&self, elapsed: Duration) -> f64 {
        (elapsed.as_secs_f64() / self.time_horizon_secs * self.time_cap).min(self.time_cap)
    }

    fn size_component(&self, downloaded: u64) -> f64 {
        (downloaded as f64 / MIB * self.points_per_mib).min(self.size_cap)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressTuning {
    pub band_start: f64,
    pub band_end: f64,
    pub declared_hysteresis: f64,
    pub emit_interval: Duration,
    pub emit_boundary_bytes: u64,
    /// Received sizes at or above this use the medium tier.
    pub medium_from_bytes: u64,
    /// Received sizes strictly above this use the large tier.
    pub large_above_bytes: u64,
    pub small: SizeTier,
    pub medium: SizeTier,
    pub large: SizeTier,
}

impl Default for ProgressTuning {
    fn default() -> Self {
        Self {
            band_start: 40.0,
            band_end: 90.0,
            declared_hysteresis: 1.0,
            emit_interval: Duration::from_millis(500),
            emit_boundary_bytes: 64 * 1024,
            medium_from_bytes: 1024 * 1024,
            large_above_bytes: 2 * 1024 * 1024,
            small: SizeTier {
                time_cap: 30.0,
                time_horizon_secs: 12.0,
                size_cap: 20.0,
                points_per_mib: 8.0,
            },
            medium: SizeTier {
                time_cap: 35.0,
                time_horizon_secs: 10.0,
                size_cap: 15.0,
                points_per_mib: 3.0,
            },
            large: SizeTier {
                time_cap: 40.0,
                time_horizon_secs: 8.0,
                size_cap: 10.0,
                points_per_mib: 2.0,
            },
        }
    }
}

impl ProgressTuning {
    pub fn tier_for(&self, downloaded: u64) -> &SizeTier {
        if downloaded > self.large_above_bytes {
            &self.large
        } else if downloaded >= self.medium_from_bytes {
            &self.medium
        } else {
            &self.small
        }
    }

    /// Raw blended estimate for the unknown-length regime, capped at `band_end`.
    pub fn blended_estimate(&self, downloaded: u64, elapsed: Duration) -> f64 {
        let tier = self.tier_for(downloaded);
        let raw = self.band_start + tier.time_component(elapsed) + tier.size_component(downloaded);
        raw.min(self.band_end)
    }
}

#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    tuning: ProgressTuning,
    declared_total: Option<u64>,
    downloaded: u64,
    last_reported: f64,
    last_emit_at: Duration,
    last_boundary: u64,
}

impl ProgressEstimator {
    /// A declared total of zero is treated as unknown.
    pub fn new(declared_total: Option<u64>) -> Self {
        Self::with_tuning(declared_total, ProgressTuning::default())
    }

    pub fn with_tuning(declared_total: Option<u64>, tuning: ProgressTuning) -> Self {
        Self {
            declared_total: declared_total.filter(|t| *t > 0),
            downloaded: 0,
            last_reported: tuning.band_start,
            last_emit_at: Duration::ZERO,
            last_boundary: 0,
            tuning,
        }
    }

    /// Account for `chunk_len` new bytes, `elapsed` after the stream started.
    ///
    /// Returns the percentage to report, or `None` when nothing should be emitted.
    /// Returned values are strictly increasing and never leave the working band.
    pub fn record(&mut self, chunk_len: usize, elapsed: Duration) -> Option<u8> {
        self.downloaded = self.downloaded.saturating_add(chunk_len as u64);
        match self.declared_total {
            Some(total) => self.record_declared(total),
            None => self.record_undeclared(elapsed),
        }
    }

    fn record_declared(&mut self, total: u64) -> Option<u8> {
        let t = &self.tuning;
        let span = t.band_end - t.band_start;
        let pct = (t.band_start + self.downloaded.min(total) as f64 * span / total as f64)
            .clamp(t.band_start, t.band_end);

        let reached_end = pct >= t.band_end && self.last_reported < t.band_end;
        if pct - self.last_reported > t.declared_hysteresis || reached_end {
            self.last_reported = pct;
            Some(pct.floor() as u8)
        } else {
            None
        }
    }

    fn record_undeclared(&mut self, elapsed: Duration) -> Option<u8> {
        let boundary = self.downloaded / self.tuning.emit_boundary_bytes.max(1);
        let interval_due = elapsed.saturating_sub(self.last_emit_at) >= self.tuning.emit_interval;
        if !interval_due && boundary <= self.last_boundary {
            return None;
        }
        self.last_emit_at = elapsed;
        self.last_boundary = boundary;

        if self.last_reported >= self.tuning.band_end {
            return None;
        }

        let estimate = self.tuning.blended_estimate(self.downloaded, elapsed);
        let next = estimate
            .max(self.last_reported + 1.0)
            .min(self.tuning.band_end);
        self.last_reported = next;
        Some(next.floor() as u8)
    }

    pub fn downloaded(&self) -> u64 {
        self.downloaded
    }

    pub fn declared_total(&self) -> Option<u64> {
        self.declared_total
    }

    pub fn last_reported(&self) -> u8 {
        self.last_reported.floor() as u8
    }

    pub fn tuning(&self) -> &ProgressTuning {
        &self.tuning
    }
}
