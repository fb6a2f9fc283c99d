//! Typed timeline configuration.

use clipstage_common::config::TimelineDefaults;
use clipstage_project_model::lane::LaneKind;

/// Snapping, trimming, and lane geometry parameters.
#[derive(Debug, Clone)]
pub struct TimelineConfig {
    /// Grid interval in seconds.
    pub grid_interval_secs: f64,

    /// Snap distance in screen pixels.
    pub snap_threshold_px: f64,

    /// Frame rate of the fallback frame snap.
    pub frame_rate: f64,

    /// Shortest clip trim/split may produce.
    pub min_clip_duration_secs: f64,

    /// Lane drop-zone geometry.
    pub layout: LaneLayout,
}

/// Rendered lane geometry used to map pointer y to lanes.
#[derive(Debug, Clone)]
pub struct LaneLayout {
    /// "New lane" zone above the first lane.
    pub top_zone_px: f64,
    /// "New lane" seam straddling each boundary between two lanes.
    pub seam_px: f64,
    pub video_height_px: f64,
    pub audio_height_px: f64,
    pub text_height_px: f64,
}

impl LaneLayout {
    /// Rendered height of a lane of `kind`.
    pub fn height_of(&self, kind: LaneKind) -> f64 {
        match kind {
            LaneKind::Video => self.video_height_px,
            LaneKind::Audio => self.audio_height_px,
            LaneKind::Text => self.text_height_px,
        }
    }
}

impl From<&TimelineDefaults> for TimelineConfig {
    fn from(defaults: &TimelineDefaults) -> Self {
        Self {
            grid_interval_secs: defaults.grid_interval_secs,
            snap_threshold_px: defaults.snap_threshold_px,
            frame_rate: defaults.frame_rate,
            min_clip_duration_secs: defaults.min_clip_duration_secs,
            layout: LaneLayout {
                top_zone_px: defaults.top_zone_px,
                seam_px: defaults.seam_px,
                video_height_px: defaults.video_lane_height_px,
                audio_height_px: defaults.audio_lane_height_px,
                text_height_px: defaults.text_lane_height_px,
            },
        }
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self::from(&TimelineDefaults::default())
    }
}

impl TimelineConfig {
    /// Round `t` to the nearest grid line.
    pub fn snap_to_grid(&self, t: f64) -> f64 {
        if self.grid_interval_secs > 0.0 {
            (t / self.grid_interval_secs).round() * self.grid_interval_secs
        } else {
            t
        }
    }

    /// Smallest grid line at or after `t`.
    pub fn ceil_to_grid(&self, t: f64) -> f64 {
        if self.grid_interval_secs > 0.0 {
            let snapped = self.snap_to_grid(t);
            if snapped < t {
                snapped + self.grid_interval_secs
            } else {
                snapped
            }
        } else {
            t
        }
    }
}
