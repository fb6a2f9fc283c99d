//! Which clip is on top at a given time.
//!
//! Within a lane tier (all lanes of one kind) the highest `z_index` wins;
//! ties go to the upper lane. Text tiers paint above video tiers.

use std::cmp::Ordering;

use clipstage_project_model::clip::{Clip, ClipId};
use clipstage_project_model::lane::LaneKind;
use clipstage_project_model::snapshot::EditorSnapshot;

/// Stacking comparison: `Greater` means `a` draws above `b`.
fn stack_cmp(snapshot: &EditorSnapshot, a: &Clip, b: &Clip) -> Ordering {
    let lane_a = snapshot.lane_index(&a.lane_id).unwrap_or(usize::MAX);
    let lane_b = snapshot.lane_index(&b.lane_id).unwrap_or(usize::MAX);
    a.z_index
        .cmp(&b.z_index)
        .then_with(|| lane_b.cmp(&lane_a))
}

fn visible_in_tier<'a>(
    snapshot: &'a EditorSnapshot,
    t: f64,
    tier: LaneKind,
) -> impl Iterator<Item = &'a Clip> + 'a {
    snapshot.clips.iter().filter(move |c| {
        c.contains(t) && snapshot.lane(&c.lane_id).map(|l| l.kind) == Some(tier)
    })
}

/// The clip on top of `tier` at time `t`.
pub fn top_clip_at(snapshot: &EditorSnapshot, t: f64, tier: LaneKind) -> Option<&Clip> {
    visible_in_tier(snapshot, t, tier).max_by(|a, b| stack_cmp(snapshot, a, b))
}

/// The clip a tap or scrub at `t` selects: top text clip, else top video.
pub fn pick_at(snapshot: &EditorSnapshot, t: f64) -> Option<&Clip> {
    top_clip_at(snapshot, t, LaneKind::Text).or_else(|| top_clip_at(snapshot, t, LaneKind::Video))
}

/// Visual clips under `t` in paint order, bottom first.
pub fn render_order(snapshot: &EditorSnapshot, t: f64) -> Vec<ClipId> {
    let mut order = Vec::new();
    for tier in [LaneKind::Video, LaneKind::Text] {
        let mut clips: Vec<&Clip> = visible_in_tier(snapshot, t, tier).collect();
        clips.sort_by(|a, b| stack_cmp(snapshot, a, b));
        order.extend(clips.into_iter().map(|c| c.id.clone()));
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipstage_project_model::lane::Lane;

    fn snapshot() -> EditorSnapshot {
        let mut snap = EditorSnapshot::new();
        snap.lanes = vec![
            Lane::new("lt", LaneKind::Text),
            Lane::new("v1", LaneKind::Video),
            Lane::new("v2", LaneKind::Video),
            Lane::new("a1", LaneKind::Audio),
        ];
        snap.clips.push(Clip::new("low", "x", "v2", 0.0, 10.0));
        snap.clips.push(Clip::new("high", "x", "v1", 0.0, 10.0));
        snap.clips.push(Clip::new("title", "t", "lt", 2.0, 1.0));
        snap.clips.push(Clip::new("music", "m", "a1", 0.0, 10.0));
        snap
    }

    #[test]
    fn test_tie_goes_to_upper_lane() {
        let snap = snapshot();
        assert_eq!(top_clip_at(&snap, 5.0, LaneKind::Video).unwrap().id, "high");
    }

    #[test]
    fn test_z_index_beats_lane_order() {
        let mut snap = snapshot();
        snap.clip_mut("low").unwrap().z_index = 3;
        assert_eq!(top_clip_at(&snap, 5.0, LaneKind::Video).unwrap().id, "low");
    }

    #[test]
    fn test_pick_prefers_text() {
        let snap = snapshot();
        assert_eq!(pick_at(&snap, 2.5).unwrap().id, "title");
        assert_eq!(pick_at(&snap, 5.0).unwrap().id, "high");
    }

    #[test]
    fn test_render_order_excludes_audio() {
        let snap = snapshot();
        assert_eq!(render_order(&snap, 2.5), vec!["low", "high", "title"]);
    }
}
