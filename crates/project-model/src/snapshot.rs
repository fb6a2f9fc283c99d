//! The editor snapshot: every mutable collection the engine owns.
//!
//! A snapshot is the unit of undo/redo and of persistence. Keyed
//! collections are `BTreeMap`s so serialization order is deterministic
//! and a serialize/deserialize/serialize cycle is byte-identical.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::clip::{Clip, ClipId, ClipSettings, TextClipSettings};
use crate::lane::{Lane, LaneId, LaneKind};
use crate::subtitle::SubtitleSegment;
use crate::transform::ClipTransform;

/// Current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Selected clips in selection order.
    pub clip_ids: Vec<ClipId>,
    /// Lane last focused by the user.
    #[serde(default)]
    pub lane_id: Option<LaneId>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.clip_ids.is_empty()
    }

    pub fn contains(&self, clip_id: &str) -> bool {
        self.clip_ids.iter().any(|id| id == clip_id)
    }

    /// Replace the selection with a single clip.
    pub fn select_only(&mut self, clip_id: impl Into<ClipId>) {
        self.clip_ids = vec![clip_id.into()];
    }

    /// Add or remove a clip (shift-click).
    pub fn toggle(&mut self, clip_id: &str) {
        if let Some(pos) = self.clip_ids.iter().position(|id| id == clip_id) {
            self.clip_ids.remove(pos);
        } else {
            self.clip_ids.push(clip_id.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.clip_ids.clear();
        self.lane_id = None;
    }
}

/// Deep-cloneable aggregate of all engine state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorSnapshot {
    /// Lanes, top to bottom.
    pub lanes: Vec<Lane>,
    pub clips: Vec<Clip>,
    #[serde(default)]
    pub transforms: BTreeMap<ClipId, ClipTransform>,
    #[serde(default)]
    pub settings: BTreeMap<ClipId, ClipSettings>,
    #[serde(default)]
    pub text_settings: BTreeMap<ClipId, TextClipSettings>,
    /// Subtitle content keyed by the text clip displaying it.
    #[serde(default)]
    pub subtitles: BTreeMap<ClipId, SubtitleSegment>,
    #[serde(default)]
    pub selection: Selection,
    /// Counter backing id allocation; survives undo and reload.
    #[serde(default)]
    pub next_id: u64,
}

impl EditorSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id of the form `{prefix}-{n}`.
    pub fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    pub fn clip(&self, clip_id: &str) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == clip_id)
    }

    pub fn clip_mut(&mut self, clip_id: &str) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == clip_id)
    }

    pub fn lane(&self, lane_id: &str) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.id == lane_id)
    }

    pub fn lane_index(&self, lane_id: &str) -> Option<usize> {
        self.lanes.iter().position(|l| l.id == lane_id)
    }

    /// Kind of the lane a clip currently sits on.
    pub fn lane_kind_of(&self, clip_id: &str) -> Option<LaneKind> {
        let clip = self.clip(clip_id)?;
        self.lane(&clip.lane_id).map(|l| l.kind)
    }

    /// Clips on a lane, in storage order.
    pub fn clips_on_lane<'a>(&'a self, lane_id: &'a str) -> impl Iterator<Item = &'a Clip> + 'a {
        self.clips.iter().filter(move |c| c.lane_id == lane_id)
    }

    pub fn lane_is_empty(&self, lane_id: &str) -> bool {
        self.clips_on_lane(lane_id).next().is_none()
    }

    /// Effective playback speed of a clip (1.0 without settings).
    pub fn speed_of(&self, clip_id: &str) -> f64 {
        self.settings
            .get(clip_id)
            .map(ClipSettings::effective_speed)
            .unwrap_or(1.0)
    }

    pub fn is_subtitle(&self, clip_id: &str) -> bool {
        self.subtitles.contains_key(clip_id)
    }

    /// Subtitle clips transcribed from `source_clip_id`.
    pub fn dependent_subtitles(&self, source_clip_id: &str) -> Vec<ClipId> {
        self.subtitles
            .values()
            .filter(|s| s.source_clip_id.as_deref() == Some(source_clip_id))
            .map(|s| s.clip_id.clone())
            .collect()
    }

    /// End of the last clip on the timeline.
    pub fn duration(&self) -> f64 {
        self.clips.iter().map(Clip::end_time).fold(0.0, f64::max)
    }

    /// Move a clip by `delta` seconds, keeping its subtitle record aligned.
    pub fn shift_clip(&mut self, clip_id: &str, delta: f64) {
        if let Some(clip) = self.clip_mut(clip_id) {
            clip.start_time += delta;
        }
        if let Some(segment) = self.subtitles.get_mut(clip_id) {
            segment.shift(delta);
        }
    }

    /// Remove a clip and every per-clip record keyed by it.
    ///
    /// Returns the removed clip. Dependent subtitles are not touched; the
    /// caller decides whether to cascade.
    pub fn remove_clip_records(&mut self, clip_id: &str) -> Option<Clip> {
        let pos = self.clips.iter().position(|c| c.id == clip_id)?;
        let clip = self.clips.remove(pos);
        self.transforms.remove(clip_id);
        self.settings.remove(clip_id);
        self.text_settings.remove(clip_id);
        self.subtitles.remove(clip_id);
        self.selection.clip_ids.retain(|id| id != clip_id);
        Some(clip)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
