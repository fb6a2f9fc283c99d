//! Typed playback configuration.

use clipstage_common::config::PlaybackDefaults;

/// Clock and sync thresholds.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Fraction of measured drift applied per frame.
    pub drift_blend: f64,

    /// Drift beyond which the clock snaps to the measured time.
    pub hard_resync_secs: f64,

    /// Drift below which nothing is corrected.
    pub drift_dead_zone_secs: f64,

    /// How far a freely running handle may stray before it is seeked.
    pub seek_epsilon_secs: f64,

    /// Upper bound on a single frame's delta.
    pub max_frame_delta_secs: f64,
}

impl From<&PlaybackDefaults> for PlaybackConfig {
    fn from(defaults: &PlaybackDefaults) -> Self {
        Self {
            drift_blend: defaults.drift_blend,
            hard_resync_secs: defaults.hard_resync_secs,
            drift_dead_zone_secs: defaults.drift_dead_zone_secs,
            seek_epsilon_secs: defaults.seek_epsilon_secs,
            max_frame_delta_secs: defaults.max_frame_delta_secs,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self::from(&PlaybackDefaults::default())
    }
}
