//! Clips, the assets they reference, and per-clip settings.
//!
//! Timeline values (`start_time`, `duration`) are in logical timeline
//! seconds. `start_offset` is in asset-native seconds, before speed
//! scaling: a clip at speed 2.0 consumes two asset seconds per timeline
//! second.

use serde::{Deserialize, Serialize};

use crate::lane::{LaneId, LaneKind};

/// Clip identifier.
pub type ClipId = String;

/// Asset identifier.
pub type AssetId = String;

/// Media kind of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Video,
    Audio,
    Image,
    Text,
}

impl AssetKind {
    /// The lane kind clips of this asset live on.
    pub fn lane_kind(self) -> LaneKind {
        match self {
            AssetKind::Video | AssetKind::Image => LaneKind::Video,
            AssetKind::Audio => LaneKind::Audio,
            AssetKind::Text => LaneKind::Text,
        }
    }

    /// Whether the asset has a native timeline (and therefore a playback handle).
    pub fn is_timed(self) -> bool {
        matches!(self, AssetKind::Video | AssetKind::Audio)
    }
}

/// An externally owned media record. The engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub kind: AssetKind,
    pub url: String,
    /// Native duration in seconds; `None` for stills and text.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
}

impl Asset {
    pub fn new(id: impl Into<AssetId>, kind: AssetKind, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            url: url.into(),
            duration: None,
            width: None,
            height: None,
            aspect_ratio: None,
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        if height > 0 {
            self.aspect_ratio = Some(width as f64 / height as f64);
        }
        self
    }

    /// Longest timeline duration a clip starting at `start_offset` can
    /// have at `speed`. Unbounded for untimed assets.
    pub fn max_timeline_duration(&self, start_offset: f64, speed: f64) -> f64 {
        match self.duration {
            Some(duration) if self.kind.is_timed() => {
                ((duration - start_offset).max(0.0)) / speed.max(ClipSettings::MIN_SPEED)
            }
            _ => f64::INFINITY,
        }
    }
}

/// Read access to asset records owned by the asset collaborator.
pub trait AssetLookup {
    fn asset(&self, asset_id: &str) -> Option<&Asset>;
}

impl AssetLookup for [Asset] {
    fn asset(&self, asset_id: &str) -> Option<&Asset> {
        self.iter().find(|a| a.id == asset_id)
    }
}

impl AssetLookup for Vec<Asset> {
    fn asset(&self, asset_id: &str) -> Option<&Asset> {
        self.as_slice().asset(asset_id)
    }
}

/// A timed reference to an asset placed on a lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub asset_id: AssetId,
    pub lane_id: LaneId,
    /// Timeline position of the left edge (seconds).
    pub start_time: f64,
    /// Timeline length (seconds). Always positive.
    pub duration: f64,
    /// Asset time shown at `start_time` (asset seconds).
    #[serde(default)]
    pub start_offset: f64,
    /// Explicit stacking order within a lane tier; higher draws on top.
    #[serde(default)]
    pub z_index: i32,
}

impl Clip {
    pub fn new(
        id: impl Into<ClipId>,
        asset_id: impl Into<AssetId>,
        lane_id: impl Into<LaneId>,
        start_time: f64,
        duration: f64,
    ) -> Self {
        Self {
            id: id.into(),
            asset_id: asset_id.into(),
            lane_id: lane_id.into(),
            start_time,
            duration,
            start_offset: 0.0,
            z_index: 0,
        }
    }

    /// Timeline position of the right edge.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Whether the clip is visible at timeline time `t` (half-open span).
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start_time && t < self.end_time()
    }

    /// Whether two clips' spans intersect.
    pub fn overlaps(&self, other: &Clip) -> bool {
        self.start_time < other.end_time() && other.start_time < self.end_time()
    }
}

/// Per-corner radii in stage pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CornerRadii {
    pub top_left: f64,
    pub top_right: f64,
    pub bottom_right: f64,
    pub bottom_left: f64,
}

impl CornerRadii {
    pub fn uniform(radius: f64) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        }
    }
}

/// Color grading adjustments. `0.0` means unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorAdjustments {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
}

/// Playback settings for video/audio/image clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipSettings {
    /// Playback rate multiplier in `[0.1, 4.0]`.
    pub speed: f64,
    /// Linear gain in `[0.0, 2.0]`.
    pub volume: f64,
    pub muted: bool,
    pub fade_in_secs: f64,
    pub fade_out_secs: f64,
    pub corner_radii: CornerRadii,
    pub color: ColorAdjustments,
}

impl ClipSettings {
    pub const MIN_SPEED: f64 = 0.1;
    pub const MAX_SPEED: f64 = 4.0;

    /// Clamp a requested speed into the supported range.
    pub fn clamp_speed(speed: f64) -> f64 {
        if speed.is_finite() {
            speed.clamp(Self::MIN_SPEED, Self::MAX_SPEED)
        } else {
            1.0
        }
    }

    /// The effective (clamped) speed.
    pub fn effective_speed(&self) -> f64 {
        Self::clamp_speed(self.speed)
    }

    /// Gain actually applied to audio output.
    pub fn effective_volume(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume.clamp(0.0, 2.0)
        }
    }
}

impl Default for ClipSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            volume: 1.0,
            muted: false,
            fade_in_secs: 0.0,
            fade_out_secs: 0.0,
            corner_radii: CornerRadii::default(),
            color: ColorAdjustments::default(),
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Styling for text and subtitle clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextClipSettings {
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    /// CSS-style color string (for example `#ffffff`).
    pub color: String,
    pub align: TextAlign,
}

impl Default for TextClipSettings {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: "Inter".to_string(),
            font_size: 48.0,
            color: "#ffffff".to_string(),
            align: TextAlign::Center,
        }
    }
}
