//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Timeline editing defaults (snapping, lane geometry).
    pub timeline: TimelineDefaults,

    /// Playback synchronization thresholds.
    pub playback: PlaybackDefaults,

    /// Undo/redo limits.
    pub history: HistoryDefaults,

    /// Subtitle segmentation and presentation parameters.
    pub subtitles: SubtitleDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Timeline snapping and layout defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineDefaults {
    /// Grid interval in seconds.
    pub grid_interval_secs: f64,

    /// Snap distance in screen pixels. Converted to seconds via zoom.
    pub snap_threshold_px: f64,

    /// Frame rate used for the fallback frame snap.
    pub frame_rate: f64,

    /// Shortest clip a trim or split may produce.
    pub min_clip_duration_secs: f64,

    /// Height of the "new lane" drop zone above the first lane.
    pub top_zone_px: f64,

    /// Height of the "new lane" seam between two lanes.
    pub seam_px: f64,

    /// Rendered lane heights by kind.
    pub video_lane_height_px: f64,
    pub audio_lane_height_px: f64,
    pub text_lane_height_px: f64,
}

/// Playback clock and media sync thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackDefaults {
    /// Fraction of observed drift applied per frame, in `(0.0, 1.0]`.
    pub drift_blend: f64,

    /// Drift (seconds) above which the clock snaps instead of blending.
    pub hard_resync_secs: f64,

    /// Drift (seconds) below which no correction is applied.
    pub drift_dead_zone_secs: f64,

    /// Handle drift (seconds) tolerated while playing continuously.
    pub seek_epsilon_secs: f64,

    /// Largest frame delta accepted from the host (seconds).
    pub max_frame_delta_secs: f64,
}

/// Undo/redo history limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryDefaults {
    /// Maximum number of undo snapshots retained.
    pub max_depth: usize,

    /// Minimum spacing between throttled snapshots.
    pub throttle_ms: u64,
}

/// Subtitle beat segmentation and presentation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleDefaults {
    /// Maximum words per beat group.
    pub max_words: usize,

    /// Maximum span of one beat group in seconds.
    pub max_span_secs: f64,

    /// Gap between words that always starts a new group.
    pub long_pause_secs: f64,

    /// Longest ALL-CAPS token still treated as emphasis.
    pub emphasis_max_chars: usize,

    /// Pop-in animation length in seconds.
    pub pop_in_secs: f64,

    /// Tolerance window for the per-word highlight scan.
    pub highlight_epsilon_secs: f64,

    /// Payload limit of the transcription collaborator.
    pub max_transcription_payload_bytes: u64,

    /// Estimated encoded audio bytes per second sent for transcription.
    pub transcription_bytes_per_sec: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "clipstage=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for TimelineDefaults {
    fn default() -> Self {
        Self {
            grid_interval_secs: 0.25,
            snap_threshold_px: 6.0,
            frame_rate: 30.0,
            min_clip_duration_secs: 0.1,
            top_zone_px: 12.0,
            seam_px: 6.0,
            video_lane_height_px: 64.0,
            audio_lane_height_px: 44.0,
            text_lane_height_px: 32.0,
        }
    }
}

impl Default for PlaybackDefaults {
    fn default() -> Self {
        Self {
            drift_blend: 0.12,
            hard_resync_secs: 0.3,
            drift_dead_zone_secs: 0.005,
            seek_epsilon_secs: 0.15,
            max_frame_delta_secs: 0.25,
        }
    }
}

impl Default for HistoryDefaults {
    fn default() -> Self {
        Self {
            max_depth: 100,
            throttle_ms: 350,
        }
    }
}

impl Default for SubtitleDefaults {
    fn default() -> Self {
        Self {
            max_words: 5,
            max_span_secs: 1.6,
            long_pause_secs: 0.45,
            emphasis_max_chars: 6,
            pop_in_secs: 0.18,
            highlight_epsilon_secs: 0.03,
            max_transcription_payload_bytes: 24 * 1024 * 1024,
            transcription_bytes_per_sec: 32_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("clipstage").join("config.json")
}
