//! Clock and timing utilities for frame-driven playback.
//!
//! The engine never reads the wall clock on its own; the host passes a
//! monotonic timestamp into every frame callback. This module provides:
//! - Frame delta derivation from monotonic timestamps
//! - Drift measurement between two time sources
//! - A throttle for collapsing rapid events

/// Derives per-frame deltas from monotonic host timestamps (seconds).
///
/// The first frame after [`FrameClock::reset`] yields a zero delta so a
/// resumed loop never integrates the time spent paused.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_frame_secs: Option<f64>,
    max_delta_secs: Option<f64>,
}

impl FrameClock {
    /// Create a clock with no upper bound on frame deltas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock that clamps deltas to `max_delta_secs`.
    ///
    /// Hosts throttle background tabs/windows; a single huge delta would
    /// otherwise teleport the playhead.
    pub fn with_max_delta(max_delta_secs: f64) -> Self {
        Self {
            last_frame_secs: None,
            max_delta_secs: Some(max_delta_secs),
        }
    }

    /// Forget the previous frame timestamp.
    pub fn reset(&mut self) {
        self.last_frame_secs = None;
    }

    /// Record a frame at `now_secs` and return the elapsed delta.
    ///
    /// Non-monotonic timestamps produce a zero delta.
    pub fn tick(&mut self, now_secs: f64) -> f64 {
        let delta = match self.last_frame_secs {
            None => 0.0,
            Some(last) => (now_secs - last).max(0.0),
        };
        self.last_frame_secs = Some(now_secs);
        match self.max_delta_secs {
            Some(max) => delta.min(max),
            None => delta,
        }
    }

    /// Timestamp of the last recorded frame.
    pub fn last_frame(&self) -> Option<f64> {
        self.last_frame_secs
    }
}

/// Drift measurement between two time sources (seconds).
#[derive(Debug, Clone, Copy)]
pub struct DriftMeasurement {
    /// Time according to the reference (authoritative) source.
    pub reference_secs: f64,
    /// Time according to the measured source.
    pub measured_secs: f64,
}

impl DriftMeasurement {
    /// Drift in seconds (positive = measured is ahead).
    pub fn drift_secs(&self) -> f64 {
        self.measured_secs - self.reference_secs
    }

    /// Drift in milliseconds.
    pub fn drift_ms(&self) -> f64 {
        self.drift_secs() * 1000.0
    }

    /// Whether drift exceeds an acceptable threshold.
    pub fn exceeds_threshold_secs(&self, threshold_secs: f64) -> bool {
        self.drift_secs().abs() > threshold_secs
    }
}

/// Rate limiter for collapsing rapid events into one per interval.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: u64,
    last_fire_ms: Option<u64>,
}

impl Throttle {
    /// Create a throttle that fires at most once per `interval_ms`.
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fire_ms: None,
        }
    }

    /// Check if enough time has passed since the last fire.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_fire(&mut self, now_ms: u64) -> bool {
        match self.last_fire_ms {
            None => {
                self.last_fire_ms = Some(now_ms);
                true
            }
            Some(last) if now_ms >= last + self.interval_ms => {
                self.last_fire_ms = Some(now_ms);
                true
            }
            _ => false,
        }
    }

    /// Make the next call fire regardless of timing.
    pub fn reset(&mut self) {
        self.last_fire_ms = None;
    }

    /// Throttle interval in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}
