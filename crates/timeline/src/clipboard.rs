//! Copy and paste of clips with their per-clip records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use clipstage_common::error::{ClipstageError, ClipstageResult};
use clipstage_project_model::clip::{Clip, ClipId, ClipSettings, TextClipSettings};
use clipstage_project_model::lane::{LaneId, LaneKind};
use clipstage_project_model::snapshot::EditorSnapshot;
use clipstage_project_model::subtitle::SubtitleSegment;
use clipstage_project_model::transform::ClipTransform;

use crate::config::TimelineConfig;
use crate::lanes::{create_lane, zone_bounds};

/// One copied clip and everything keyed by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    pub clip: Clip,
    pub lane_kind: LaneKind,
    /// Position of the source lane at copy time, for ordering fresh lanes.
    pub lane_index: usize,
    #[serde(default)]
    pub transform: Option<ClipTransform>,
    #[serde(default)]
    pub settings: Option<ClipSettings>,
    #[serde(default)]
    pub text_settings: Option<TextClipSettings>,
    #[serde(default)]
    pub subtitle: Option<SubtitleSegment>,
}

/// Clips captured by a copy, ready to paste any number of times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clipboard {
    pub entries: Vec<ClipboardEntry>,
}

impl Clipboard {
    /// Capture `clip_ids` from the snapshot.
    pub fn copy(snapshot: &EditorSnapshot, clip_ids: &[ClipId]) -> ClipstageResult<Self> {
        let mut entries = Vec::with_capacity(clip_ids.len());
        for id in clip_ids {
            let clip = snapshot
                .clip(id)
                .ok_or_else(|| ClipstageError::clip_not_found(id))?;
            let lane_index = snapshot
                .lane_index(&clip.lane_id)
                .ok_or_else(|| ClipstageError::lane_not_found(&clip.lane_id))?;
            entries.push(ClipboardEntry {
                clip: clip.clone(),
                lane_kind: snapshot.lanes[lane_index].kind,
                lane_index,
                transform: snapshot.transforms.get(id).copied(),
                settings: snapshot.settings.get(id).cloned(),
                text_settings: snapshot.text_settings.get(id).cloned(),
                subtitle: snapshot.subtitles.get(id).cloned(),
            });
        }
        entries.sort_by(|a, b| {
            a.lane_index
                .cmp(&b.lane_index)
                .then(a.clip.start_time.total_cmp(&b.clip.start_time))
        });
        tracing::debug!(count = entries.len(), "Clips copied");
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Paste at timeline time `at` (grid-snapped), returning the new ids.
    ///
    /// Every distinct source lane gets a fresh lane at the top of its
    /// kind's zone, so pasting never collides with existing clips.
    /// Relative offsets between the copied clips are preserved.
    pub fn paste(
        &self,
        snapshot: &mut EditorSnapshot,
        config: &TimelineConfig,
        at: f64,
    ) -> ClipstageResult<Vec<ClipId>> {
        if self.entries.is_empty() {
            return Err(ClipstageError::edit("Clipboard is empty"));
        }
        let origin = self
            .entries
            .iter()
            .map(|e| e.clip.start_time)
            .fold(f64::INFINITY, f64::min);
        let place_at = config.snap_to_grid(at.max(0.0)).max(0.0);
        let offset = place_at - origin;

        let mut lane_map: BTreeMap<LaneId, LaneId> = BTreeMap::new();
        let mut created_per_kind: BTreeMap<u8, usize> = BTreeMap::new();
        for entry in &self.entries {
            if lane_map.contains_key(&entry.clip.lane_id) {
                continue;
            }
            let created = created_per_kind.entry(entry.lane_kind.priority()).or_default();
            let (lo, _) = zone_bounds(&snapshot.lanes, entry.lane_kind);
            let lane_id = create_lane(snapshot, entry.lane_kind, lo + *created);
            *created += 1;
            lane_map.insert(entry.clip.lane_id.clone(), lane_id);
        }

        let mut id_map: BTreeMap<ClipId, ClipId> = BTreeMap::new();
        for entry in &self.entries {
            let new_id = snapshot.allocate_id("clip");
            id_map.insert(entry.clip.id.clone(), new_id);
        }

        let mut pasted = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let new_id = id_map[&entry.clip.id].clone();
            let mut clip = entry.clip.clone();
            clip.id = new_id.clone();
            clip.lane_id = lane_map[&entry.clip.lane_id].clone();
            clip.start_time += offset;
            snapshot.clips.push(clip);

            if let Some(transform) = entry.transform {
                snapshot.transforms.insert(new_id.clone(), transform);
            }
            if let Some(settings) = &entry.settings {
                snapshot.settings.insert(new_id.clone(), settings.clone());
            }
            if let Some(text) = &entry.text_settings {
                snapshot.text_settings.insert(new_id.clone(), text.clone());
            }
            if let Some(segment) = &entry.subtitle {
                let mut segment = segment.clone();
                segment.clip_id = new_id.clone();
                segment.shift(offset);
                segment.source_clip_id = segment.source_clip_id.and_then(|src| {
                    match id_map.get(&src) {
                        Some(remapped) => Some(remapped.clone()),
                        None if snapshot.clip(&src).is_some() => Some(src),
                        None => None,
                    }
                });
                snapshot.subtitles.insert(new_id.clone(), segment);
            }
            pasted.push(new_id);
        }

        snapshot.selection.clip_ids = pasted.clone();
        tracing::debug!(
            count = pasted.len(),
            lanes = lane_map.len(),
            at = place_at,
            "Clips pasted"
        );
        Ok(pasted)
    }
}
