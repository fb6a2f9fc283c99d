//! Drag placement: preview while dragging, collision resolution on release.
//!
//! # Algorithm
//!
//! 1. **Begin:** capture each dragged clip's origin and the sibling edges
//!    it may snap to. The data model is not touched while dragging.
//! 2. **Update:** convert the pointer delta to seconds, snap, and resolve
//!    the hovered lane. The last valid preview is remembered.
//! 3. **Commit:** move the clip onto its lane (creating it if needed),
//!    sweep the lane left-to-right pushing overlapping clips forward, and
//!    translate dependent subtitles by the same deltas.
//!
//! Group drags move every member by one shared, clamped delta and skip
//! collision resolution.

use std::collections::HashSet;

use clipstage_common::error::{ClipstageError, ClipstageResult};
use clipstage_project_model::clip::ClipId;
use clipstage_project_model::lane::{LaneId, LaneKind};
use clipstage_project_model::snapshot::EditorSnapshot;

use crate::config::TimelineConfig;
use crate::lanes::{apply_lane_target, prune_empty_lanes, resolve_lane_target, LaneTarget};
use crate::snapping::{collect_edges, snap_exclusions, SnapKind, Snapper};

/// Pointer state relative to where the drag started.
#[derive(Debug, Clone, Copy)]
pub struct DragPointer {
    /// Horizontal movement since drag start, in pixels.
    pub dx_px: f64,
    /// Vertical position from the top of the lane area, in pixels.
    /// `None` when the pointer has left the lane area.
    pub y_px: Option<f64>,
    /// Current zoom.
    pub pixels_per_second: f64,
}

/// Where the dragged clip would land if released now.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementPreview {
    pub lane: LaneTarget,
    /// Start time of the primary clip.
    pub start_time: f64,
    /// Snap guide to draw, if any.
    pub guide: Option<f64>,
    pub snap: SnapKind,
}

#[derive(Debug, Clone)]
struct DragOrigin {
    clip_id: ClipId,
    lane_id: LaneId,
    start_time: f64,
}

/// Result of a committed drag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitOutcome {
    /// Lane the primary clip ended on.
    pub lane_id: Option<LaneId>,
    /// Lane created for this drop, if any.
    pub created_lane: Option<LaneId>,
    /// Every clip whose start changed, with its delta in seconds.
    pub moved: Vec<(ClipId, f64)>,
    /// Lanes removed because the drag emptied them.
    pub pruned_lanes: Vec<LaneId>,
}

/// An in-progress drag of one clip or a selected group.
#[derive(Debug, Clone)]
pub struct DragSession {
    primary: ClipId,
    kind: LaneKind,
    duration: f64,
    origins: Vec<DragOrigin>,
    edges: Vec<f64>,
    timeline_extent: f64,
    last_valid: Option<PlacementPreview>,
}

impl DragSession {
    /// Start dragging `clip_ids`, with `primary` under the pointer.
    ///
    /// `timeline_extent` bounds group drags on the right.
    pub fn begin(
        snapshot: &EditorSnapshot,
        clip_ids: &[ClipId],
        primary: &str,
        timeline_extent: f64,
    ) -> ClipstageResult<Self> {
        let primary_clip = snapshot
            .clip(primary)
            .ok_or_else(|| ClipstageError::clip_not_found(primary))?;
        let kind = snapshot
            .lane_kind_of(primary)
            .ok_or_else(|| ClipstageError::lane_not_found(&primary_clip.lane_id))?;

        let mut ids: Vec<ClipId> = vec![primary.to_string()];
        ids.extend(clip_ids.iter().filter(|id| id.as_str() != primary).cloned());

        let mut origins = Vec::with_capacity(ids.len());
        for id in &ids {
            let clip = snapshot
                .clip(id)
                .ok_or_else(|| ClipstageError::clip_not_found(id))?;
            origins.push(DragOrigin {
                clip_id: clip.id.clone(),
                lane_id: clip.lane_id.clone(),
                start_time: clip.start_time,
            });
        }

        let excluded = snap_exclusions(snapshot, &ids);
        let edges = collect_edges(snapshot, &excluded);

        tracing::debug!(
            primary,
            members = origins.len(),
            edges = edges.len(),
            "Drag started"
        );

        Ok(Self {
            primary: primary.to_string(),
            kind,
            duration: primary_clip.duration,
            origins,
            edges,
            timeline_extent: timeline_extent.max(snapshot.duration()),
            last_valid: None,
        })
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn is_group(&self) -> bool {
        self.origins.len() > 1
    }

    /// The last valid preview, used when a release happens somewhere invalid.
    pub fn last_valid(&self) -> Option<&PlacementPreview> {
        self.last_valid.as_ref()
    }

    /// Recompute the preview for the current pointer position.
    ///
    /// Returns `None` when the pointer is somewhere no placement is
    /// possible; the previous valid preview is kept.
    pub fn update(
        &mut self,
        snapshot: &EditorSnapshot,
        config: &TimelineConfig,
        pointer: DragPointer,
    ) -> Option<&PlacementPreview> {
        if !(pointer.dx_px.is_finite() && pointer.pixels_per_second > 0.0) {
            return None;
        }
        let origin = &self.origins[0];
        let raw_start = origin.start_time + pointer.dx_px / pointer.pixels_per_second;
        let snapper = Snapper::new(config, pointer.pixels_per_second, self.edges.clone());
        let snapped = snapper.snap_span(raw_start, self.duration);

        let preview = if self.is_group() {
            let delta = self.group_delta(snapped.time - origin.start_time);
            PlacementPreview {
                lane: LaneTarget::Existing(origin.lane_id.clone()),
                start_time: origin.start_time + delta,
                guide: snapped.guide.filter(|_| delta == snapped.time - origin.start_time),
                snap: snapped.kind,
            }
        } else {
            let y = pointer.y_px.filter(|y| y.is_finite())?;
            PlacementPreview {
                lane: resolve_lane_target(&snapshot.lanes, &config.layout, y, self.kind),
                start_time: snapped.time,
                guide: snapped.guide,
                snap: snapped.kind,
            }
        };

        self.last_valid = Some(preview);
        self.last_valid.as_ref()
    }

    /// Clamp a raw group delta so no member starts before 0 or after the
    /// timeline extent.
    pub fn group_delta(&self, raw_delta: f64) -> f64 {
        let min_start = self
            .origins
            .iter()
            .map(|o| o.start_time)
            .fold(f64::INFINITY, f64::min);
        let max_start = self
            .origins
            .iter()
            .map(|o| o.start_time)
            .fold(f64::NEG_INFINITY, f64::max);
        let lower = -min_start;
        let upper = (self.timeline_extent - max_start).max(lower);
        raw_delta.clamp(lower, upper)
    }

    /// Apply the last valid preview to the snapshot.
    ///
    /// A drag that never produced a valid preview is a no-op.
    pub fn commit(self, snapshot: &mut EditorSnapshot) -> ClipstageResult<CommitOutcome> {
        let Some(preview) = self.last_valid.clone() else {
            tracing::debug!(primary = %self.primary, "Drag released without a valid preview");
            return Ok(CommitOutcome::default());
        };

        if self.is_group() {
            return Ok(self.commit_group(snapshot, &preview));
        }

        let origin = &self.origins[0];
        let current = snapshot
            .clip(&origin.clip_id)
            .ok_or_else(|| ClipstageError::clip_not_found(&origin.clip_id))?;
        let delta = preview.start_time - current.start_time;

        let (lane_id, created) = apply_lane_target(snapshot, &preview.lane, self.kind);
        if let Some(clip) = snapshot.clip_mut(&origin.clip_id) {
            clip.lane_id = lane_id.clone();
        }
        snapshot.shift_clip(&origin.clip_id, delta);

        let mut moved = vec![(origin.clip_id.clone(), delta)];
        moved.extend(resolve_collisions(snapshot, &lane_id, Some(&origin.clip_id)));
        let moved: Vec<(ClipId, f64)> = moved.into_iter().filter(|(_, d)| *d != 0.0).collect();
        translate_dependents(snapshot, &moved, &HashSet::new());

        let pruned_lanes = if origin.lane_id != lane_id {
            prune_empty_lanes(snapshot, std::slice::from_ref(&origin.lane_id))
        } else {
            Vec::new()
        };

        tracing::debug!(
            clip_id = %origin.clip_id,
            lane_id = %lane_id,
            start = preview.start_time,
            pushed = moved.len().saturating_sub(1),
            "Drag committed"
        );

        Ok(CommitOutcome {
            lane_id: Some(lane_id.clone()),
            created_lane: created.then_some(lane_id),
            moved,
            pruned_lanes,
        })
    }

    fn commit_group(&self, snapshot: &mut EditorSnapshot, preview: &PlacementPreview) -> CommitOutcome {
        let delta = preview.start_time - self.origins[0].start_time;
        let members: HashSet<ClipId> = self.origins.iter().map(|o| o.clip_id.clone()).collect();
        let mut moved = Vec::new();
        if delta != 0.0 {
            for origin in &self.origins {
                if let Some(clip) = snapshot.clip(&origin.clip_id) {
                    let member_delta = origin.start_time + delta - clip.start_time;
                    snapshot.shift_clip(&origin.clip_id, member_delta);
                    moved.push((origin.clip_id.clone(), member_delta));
                }
            }
            translate_dependents(snapshot, &moved, &members);
        }
        tracing::debug!(members = members.len(), delta, "Group drag committed");
        CommitOutcome {
            lane_id: Some(self.origins[0].lane_id.clone()),
            created_lane: None,
            moved,
            pruned_lanes: Vec::new(),
        }
    }
}

/// Sweep a lane left-to-right so no two clips overlap.
///
/// Clips are ordered by start time, with `priority` first on ties; any
/// clip starting before the running cursor is pushed to it. Returns the
/// clips that moved and by how much.
pub fn resolve_collisions(
    snapshot: &mut EditorSnapshot,
    lane_id: &str,
    priority: Option<&str>,
) -> Vec<(ClipId, f64)> {
    let mut order: Vec<(ClipId, f64, f64)> = snapshot
        .clips_on_lane(lane_id)
        .map(|c| (c.id.clone(), c.start_time, c.duration))
        .collect();
    order.sort_by(|a, b| {
        a.1.total_cmp(&b.1).then_with(|| {
            let a_first = Some(a.0.as_str()) == priority;
            let b_first = Some(b.0.as_str()) == priority;
            b_first.cmp(&a_first)
        })
    });

    let mut moved = Vec::new();
    let mut cursor = f64::NEG_INFINITY;
    for (id, start, duration) in order {
        let new_start = start.max(cursor);
        if new_start != start {
            snapshot.shift_clip(&id, new_start - start);
            if let Some(clip) = snapshot.clip_mut(&id) {
                clip.start_time = new_start;
            }
            moved.push((id, new_start - start));
        }
        cursor = new_start + duration;
    }
    moved
}

/// Translate subtitles transcribed from moved clips by the same delta.
///
/// Subtitles already in `skip` (for example, dragged alongside their
/// source) are left alone.
pub fn translate_dependents(
    snapshot: &mut EditorSnapshot,
    moved: &[(ClipId, f64)],
    skip: &HashSet<ClipId>,
) {
    for (source_id, delta) in moved {
        for dependent in snapshot.dependent_subtitles(source_id) {
            if skip.contains(&dependent) || moved.iter().any(|(id, _)| id == &dependent) {
                continue;
            }
            snapshot.shift_clip(&dependent, *delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipstage_project_model::clip::Clip;
    use clipstage_project_model::lane::Lane;
    use clipstage_project_model::subtitle::SubtitleSegment;

    fn snapshot() -> EditorSnapshot {
        let mut snap = EditorSnapshot::new();
        snap.lanes = vec![
            Lane::new("lt", LaneKind::Text),
            Lane::new("lv", LaneKind::Video),
            Lane::new("lv2", LaneKind::Video),
        ];
        snap.clips.push(Clip::new("a", "asset", "lv", 0.0, 10.0));
        snap.clips.push(Clip::new("b", "asset", "lv2", 20.0, 4.0));
        snap.clips.push(Clip::new("c", "asset", "lv", 12.0, 3.0));
        snap.clips.push(Clip::new("sub", "text", "lt", 20.5, 1.0));
        let mut seg = SubtitleSegment::new("sub", "hi", 20.5, 21.5);
        seg.source_clip_id = Some("b".to_string());
        snap.subtitles.insert("sub".to_string(), seg);
        snap
    }

    fn pointer(dx_px: f64, y_px: f64) -> DragPointer {
        DragPointer {
            dx_px,
            y_px: Some(y_px),
            pixels_per_second: 12.0,
        }
    }

    #[test]
    fn test_drag_snaps_to_neighbor_edge() {
        let snap = snapshot();
        let config = TimelineConfig::default();
        let mut session = DragSession::begin(&snap, &[], "b", 60.0).unwrap();
        // 20.0 -> 10.3 is -9.7s = -116.4px; lv starts at y=44.
        let preview = session.update(&snap, &config, pointer(-116.4, 60.0)).unwrap();
        assert_eq!(preview.start_time, 10.0);
        assert_eq!(preview.guide, Some(10.0));
        assert_eq!(preview.lane, LaneTarget::Existing("lv".to_string()));
    }

    #[test]
    fn test_commit_pushes_overlapping_clip_and_moves_subtitle() {
        let mut snap = snapshot();
        let config = TimelineConfig::default();
        let mut session = DragSession::begin(&snap, &[], "b", 60.0).unwrap();
        session.update(&snap, &config, pointer(-116.4, 60.0));
        let outcome = session.commit(&mut snap).unwrap();

        let b = snap.clip("b").unwrap();
        assert_eq!(b.lane_id, "lv");
        assert_eq!(b.start_time, 10.0);
        // c (12..15) collided with b (10..14) and is pushed to 14.
        assert_eq!(snap.clip("c").unwrap().start_time, 14.0);
        // Subtitle follows b by -10s.
        assert!((snap.clip("sub").unwrap().start_time - 10.5).abs() < 1e-9);
        assert!((snap.subtitles["sub"].start_time - 10.5).abs() < 1e-9);
        // lv2 emptied and pruned.
        assert_eq!(outcome.pruned_lanes, vec!["lv2".to_string()]);
        assert!(snap.lane("lv2").is_none());
    }

    #[test]
    fn test_release_outside_uses_last_valid_preview() {
        let mut snap = snapshot();
        let config = TimelineConfig::default();
        let mut session = DragSession::begin(&snap, &[], "c", 60.0).unwrap();
        session.update(&snap, &config, pointer(120.0, 60.0));
        let last = session.last_valid().cloned().unwrap();
        let outside = DragPointer {
            dx_px: 500.0,
            y_px: None,
            pixels_per_second: 12.0,
        };
        assert!(session.update(&snap, &config, outside).is_none());
        session.commit(&mut snap).unwrap();
        assert_eq!(snap.clip("c").unwrap().start_time, last.start_time);
    }

    #[test]
    fn test_commit_without_preview_is_noop() {
        let mut snap = snapshot();
        let before = snap.clone();
        let session = DragSession::begin(&snap, &[], "c", 60.0).unwrap();
        let outcome = session.commit(&mut snap).unwrap();
        assert_eq!(outcome, CommitOutcome::default());
        assert_eq!(snap, before);
    }

    #[test]
    fn test_drop_on_top_zone_creates_lane() {
        let mut snap = snapshot();
        let config = TimelineConfig::default();
        let mut session = DragSession::begin(&snap, &[], "c", 60.0).unwrap();
        session.update(&snap, &config, pointer(0.0, 2.0));
        let outcome = session.commit(&mut snap).unwrap();
        let created = outcome.created_lane.unwrap();
        assert_eq!(snap.lane_index(&created), Some(1));
        assert_eq!(snap.clip("c").unwrap().lane_id, created);
    }

    #[test]
    fn test_group_delta_clamps_at_zero() {
        let mut snap = snapshot();
        let config = TimelineConfig::default();
        let ids = vec!["a".to_string(), "b".to_string()];
        let mut session = DragSession::begin(&snap, &ids, "b", 60.0).unwrap();
        assert!(session.is_group());
        session.update(&snap, &config, pointer(-1000.0, 0.0));
        session.commit(&mut snap).unwrap();
        // a was at 0 so the group cannot move left at all.
        assert_eq!(snap.clip("a").unwrap().start_time, 0.0);
        assert_eq!(snap.clip("b").unwrap().start_time, 20.0);
    }

    #[test]
    fn test_group_drag_skips_collision_resolution() {
        let mut snap = snapshot();
        let config = TimelineConfig::default();
        let ids = vec!["a".to_string(), "b".to_string()];
        let mut session = DragSession::begin(&snap, &ids, "a", 60.0).unwrap();
        // +6s: a becomes 6..16, overlapping c at 12..15.
        session.update(&snap, &config, pointer(72.0, 0.0));
        let outcome = session.commit(&mut snap).unwrap();
        assert_eq!(snap.clip("a").unwrap().start_time, 6.0);
        assert_eq!(snap.clip("c").unwrap().start_time, 12.0);
        assert_eq!(snap.clip("b").unwrap().start_time, 26.0);
        assert!((snap.clip("sub").unwrap().start_time - 26.5).abs() < 1e-9);
        assert_eq!(outcome.moved.len(), 2);
    }

    #[test]
    fn test_group_delta_clamps_at_extent() {
        let snap = snapshot();
        let ids = vec!["a".to_string(), "b".to_string()];
        let session = DragSession::begin(&snap, &ids, "a", 30.0).unwrap();
        assert_eq!(session.group_delta(100.0), 10.0);
        assert_eq!(session.group_delta(-5.0), 0.0);
    }

    #[test]
    fn test_resolve_collisions_ties_prefer_priority() {
        let mut snap = EditorSnapshot::new();
        snap.lanes = vec![Lane::new("l", LaneKind::Video)];
        snap.clips.push(Clip::new("x", "a", "l", 5.0, 2.0));
        snap.clips.push(Clip::new("y", "a", "l", 5.0, 2.0));
        let moved = resolve_collisions(&mut snap, "l", Some("y"));
        assert_eq!(moved, vec![("x".to_string(), 2.0)]);
        assert_eq!(snap.clip("y").unwrap().start_time, 5.0);
    }
}
