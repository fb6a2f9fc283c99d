//! Lane creation, pruning, and pointer-to-lane resolution.
//!
//! Every function that inserts a lane clamps the insertion index into the
//! zone reserved for that lane kind, so the text > video > audio order
//! holds after any lane mutation without a re-sort.

use clipstage_project_model::lane::{lanes_are_ordered, Lane, LaneId, LaneKind};
use clipstage_project_model::snapshot::EditorSnapshot;

use crate::config::LaneLayout;

/// Where a dragged clip should land, lane-wise.
#[derive(Debug, Clone, PartialEq)]
pub enum LaneTarget {
    /// An existing, compatible lane.
    Existing(LaneId),
    /// A lane of `kind` to be created at `index` (already clamped).
    New { index: usize, kind: LaneKind },
}

/// Range of insertion indices that keep `kind` inside its ordering zone.
///
/// Returns `(lo, hi)`, both inclusive: `lo` is the number of lanes that
/// must stay above `kind`, `hi` the number that may.
pub fn zone_bounds(lanes: &[Lane], kind: LaneKind) -> (usize, usize) {
    let p = kind.priority();
    let lo = lanes.iter().filter(|l| l.kind.priority() < p).count();
    let hi = lanes.iter().filter(|l| l.kind.priority() <= p).count();
    (lo, hi)
}

/// Clamp a desired insertion index into the zone for `kind`.
pub fn clamp_insert_index(lanes: &[Lane], kind: LaneKind, desired: usize) -> usize {
    let (lo, hi) = zone_bounds(lanes, kind);
    desired.clamp(lo, hi)
}

/// Create a lane of `kind` as close to `desired_index` as ordering allows.
pub fn create_lane(snapshot: &mut EditorSnapshot, kind: LaneKind, desired_index: usize) -> LaneId {
    let id = snapshot.allocate_id(kind.id_prefix());
    let index = clamp_insert_index(&snapshot.lanes, kind, desired_index);
    snapshot.lanes.insert(index, Lane::new(id.clone(), kind));
    debug_assert!(lanes_are_ordered(&snapshot.lanes));
    tracing::debug!(lane_id = %id, ?kind, index, "Lane created");
    id
}

/// First lane of `kind`, creating one at the top of its zone if none exists.
pub fn find_or_create_lane(snapshot: &mut EditorSnapshot, kind: LaneKind) -> LaneId {
    if let Some(lane) = snapshot.lanes.iter().find(|l| l.kind == kind) {
        return lane.id.clone();
    }
    create_lane(snapshot, kind, 0)
}

/// Materialize a [`LaneTarget`] for a clip of `kind`, returning the lane
/// id and whether it was newly created.
pub fn apply_lane_target(
    snapshot: &mut EditorSnapshot,
    target: &LaneTarget,
    kind: LaneKind,
) -> (LaneId, bool) {
    match target {
        LaneTarget::Existing(id) if snapshot.lane(id).is_some() => (id.clone(), false),
        LaneTarget::Existing(id) => {
            tracing::warn!(lane_id = %id, "Preview lane missing at commit; recreating");
            (create_lane(snapshot, kind, 0), true)
        }
        LaneTarget::New { index, kind } => (create_lane(snapshot, *kind, *index), true),
    }
}

/// Remove the given lanes if they hold no clips. Returns removed ids.
pub fn prune_empty_lanes(snapshot: &mut EditorSnapshot, candidates: &[LaneId]) -> Vec<LaneId> {
    let mut removed = Vec::new();
    for lane_id in candidates {
        if snapshot.lane(lane_id).is_some() && snapshot.lane_is_empty(lane_id) {
            snapshot.lanes.retain(|l| &l.id != lane_id);
            if snapshot.selection.lane_id.as_deref() == Some(lane_id.as_str()) {
                snapshot.selection.lane_id = None;
            }
            tracing::debug!(lane_id = %lane_id, "Empty lane pruned");
            removed.push(lane_id.clone());
        }
    }
    removed
}

/// Map a vertical pointer offset (pixels from the top of the lane area)
/// to a lane target for a clip of `kind`.
///
/// The top zone, the seams between lanes, and the area below the last
/// lane all mean "create a lane here". Hovering an incompatible lane
/// walks to the nearest compatible one on the correct side: audio looks
/// downward only, video and text look upward only.
pub fn resolve_lane_target(
    lanes: &[Lane],
    layout: &LaneLayout,
    pointer_y: f64,
    kind: LaneKind,
) -> LaneTarget {
    let new_at = |index: usize| LaneTarget::New {
        index: clamp_insert_index(lanes, kind, index),
        kind,
    };

    if lanes.is_empty() || pointer_y < layout.top_zone_px {
        return new_at(0);
    }

    let half_seam = layout.seam_px / 2.0;
    let mut top = layout.top_zone_px;
    let mut hovered = None;
    for (i, lane) in lanes.iter().enumerate() {
        let bottom = top + layout.height_of(lane.kind);
        let is_internal_boundary = i + 1 < lanes.len();
        if is_internal_boundary && (pointer_y - bottom).abs() <= half_seam {
            return new_at(i + 1);
        }
        if pointer_y >= top && pointer_y < bottom {
            hovered = Some(i);
            break;
        }
        top = bottom;
    }

    let Some(index) = hovered else {
        return new_at(lanes.len());
    };

    if lanes[index].kind == kind {
        return LaneTarget::Existing(lanes[index].id.clone());
    }

    let compatible = match kind {
        LaneKind::Audio => lanes[index + 1..].iter().find(|l| l.kind == kind),
        LaneKind::Video | LaneKind::Text => lanes[..index].iter().rev().find(|l| l.kind == kind),
    };
    match compatible {
        Some(lane) => LaneTarget::Existing(lane.id.clone()),
        None => match kind {
            LaneKind::Audio => new_at(index + 1),
            LaneKind::Video | LaneKind::Text => new_at(index),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimelineConfig;
    use clipstage_project_model::clip::Clip;

    fn lanes() -> Vec<Lane> {
        vec![
            Lane::new("t1", LaneKind::Text),
            Lane::new("v1", LaneKind::Video),
            Lane::new("v2", LaneKind::Video),
            Lane::new("a1", LaneKind::Audio),
        ]
    }

    // Default layout: top 12, text 32, video 64, audio 44, seam 6.
    // t1: [12, 44)  v1: [44, 108)  v2: [108, 172)  a1: [172, 216)

    #[test]
    fn test_zone_bounds() {
        assert_eq!(zone_bounds(&lanes(), LaneKind::Text), (0, 1));
        assert_eq!(zone_bounds(&lanes(), LaneKind::Video), (1, 3));
        assert_eq!(zone_bounds(&lanes(), LaneKind::Audio), (3, 4));
    }

    #[test]
    fn test_create_lane_clamps_into_zone() {
        let mut snap = EditorSnapshot::new();
        snap.lanes = lanes();
        let id = create_lane(&mut snap, LaneKind::Audio, 0);
        assert_eq!(snap.lane_index(&id), Some(3));
        let id = create_lane(&mut snap, LaneKind::Text, 10);
        assert_eq!(snap.lane_index(&id), Some(1));
        assert!(lanes_are_ordered(&snap.lanes));
    }

    #[test]
    fn test_top_zone_creates_lane() {
        let layout = TimelineConfig::default().layout;
        let target = resolve_lane_target(&lanes(), &layout, 4.0, LaneKind::Video);
        assert_eq!(
            target,
            LaneTarget::New {
                index: 1,
                kind: LaneKind::Video
            }
        );
    }

    #[test]
    fn test_hover_compatible_lane() {
        let layout = TimelineConfig::default().layout;
        let target = resolve_lane_target(&lanes(), &layout, 140.0, LaneKind::Video);
        assert_eq!(target, LaneTarget::Existing("v2".to_string()));
    }

    #[test]
    fn test_seam_creates_lane_between() {
        let layout = TimelineConfig::default().layout;
        let target = resolve_lane_target(&lanes(), &layout, 107.0, LaneKind::Video);
        assert_eq!(
            target,
            LaneTarget::New {
                index: 2,
                kind: LaneKind::Video
            }
        );
    }

    #[test]
    fn test_video_over_audio_walks_upward() {
        let layout = TimelineConfig::default().layout;
        let target = resolve_lane_target(&lanes(), &layout, 200.0, LaneKind::Video);
        assert_eq!(target, LaneTarget::Existing("v2".to_string()));
    }

    #[test]
    fn test_audio_over_video_walks_downward() {
        let layout = TimelineConfig::default().layout;
        let target = resolve_lane_target(&lanes(), &layout, 60.0, LaneKind::Audio);
        assert_eq!(target, LaneTarget::Existing("a1".to_string()));
    }

    #[test]
    fn test_video_over_text_creates_lane_in_zone() {
        let layout = TimelineConfig::default().layout;
        let target = resolve_lane_target(&lanes(), &layout, 20.0, LaneKind::Video);
        assert_eq!(
            target,
            LaneTarget::New {
                index: 1,
                kind: LaneKind::Video
            }
        );
    }

    #[test]
    fn test_below_last_lane_creates_lane() {
        let layout = TimelineConfig::default().layout;
        let target = resolve_lane_target(&lanes(), &layout, 500.0, LaneKind::Audio);
        assert_eq!(
            target,
            LaneTarget::New {
                index: 4,
                kind: LaneKind::Audio
            }
        );
    }

    #[test]
    fn test_prune_only_empty_lanes() {
        let mut snap = EditorSnapshot::new();
        snap.lanes = lanes();
        snap.clips.push(Clip::new("c1", "a", "v1", 0.0, 1.0));
        let removed = prune_empty_lanes(&mut snap, &["v1".to_string(), "v2".to_string()]);
        assert_eq!(removed, vec!["v2".to_string()]);
        assert!(snap.lane("v1").is_some());
    }
}
