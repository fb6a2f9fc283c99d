//! Drift correction between the clock and a reference media handle.
//!
//! The clock is blended a fraction of the way toward the reference each
//! frame, and snapped only when the two are far apart.

use clipstage_common::clock::DriftMeasurement;

use crate::config::PlaybackConfig;

/// What the corrector decided for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriftAction {
    /// Within the dead zone.
    Hold,
    /// Move the clock to `time` without a discontinuity.
    Blend { time: f64, drift_secs: f64 },
    /// Snap the clock to the reference.
    Resync { time: f64, drift_secs: f64 },
}

impl DriftAction {
    /// Corrected clock time, if any.
    pub fn time(&self) -> Option<f64> {
        match self {
            DriftAction::Hold => None,
            DriftAction::Blend { time, .. } | DriftAction::Resync { time, .. } => Some(*time),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DriftCorrector {
    blend: f64,
    hard_resync_secs: f64,
    dead_zone_secs: f64,
}

impl DriftCorrector {
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            blend: config.drift_blend.clamp(0.0, 1.0),
            hard_resync_secs: config.hard_resync_secs,
            dead_zone_secs: config.drift_dead_zone_secs,
        }
    }

    /// Compare the clock time with the reference handle's time (both in
    /// timeline seconds).
    pub fn correct(&self, clock_secs: f64, reference_secs: f64) -> DriftAction {
        if !reference_secs.is_finite() {
            return DriftAction::Hold;
        }
        let measurement = DriftMeasurement {
            reference_secs: clock_secs,
            measured_secs: reference_secs,
        };
        let drift_secs = measurement.drift_secs();

        if !measurement.exceeds_threshold_secs(self.dead_zone_secs) {
            return DriftAction::Hold;
        }
        if measurement.exceeds_threshold_secs(self.hard_resync_secs) {
            tracing::debug!(drift_ms = measurement.drift_ms(), "Hard re-sync to reference");
            return DriftAction::Resync {
                time: reference_secs,
                drift_secs,
            };
        }
        DriftAction::Blend {
            time: clock_secs + drift_secs * self.blend,
            drift_secs,
        }
    }
}
