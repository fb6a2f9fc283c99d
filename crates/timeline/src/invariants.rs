//! Structural checks over a snapshot.
//!
//! Used by tests, by `clipstage validate`, and after loading a project.
//! Same-lane overlaps are reported separately because they are legal
//! between commits.

use clipstage_project_model::clip::Clip;
use clipstage_project_model::lane::lanes_are_ordered;
use clipstage_project_model::snapshot::EditorSnapshot;

/// A broken structural invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("Lanes are out of order (text, video, audio)")]
    LaneOrder,

    #[error("Duplicate id: {id}")]
    DuplicateId { id: String },

    #[error("Clip {clip_id} has non-positive duration {duration}")]
    NonPositiveDuration { clip_id: String, duration: f64 },

    #[error("Clip {clip_id} starts before zero ({start_time})")]
    NegativeStart { clip_id: String, start_time: f64 },

    #[error("Clip {clip_id} references missing lane {lane_id}")]
    MissingLane { clip_id: String, lane_id: String },

    #[error("Subtitle {clip_id} has no clip")]
    OrphanSubtitle { clip_id: String },

    #[error("Subtitle {clip_id} points at missing source {source_clip_id}")]
    DanglingSource {
        clip_id: String,
        source_clip_id: String,
    },

    #[error("Clips {first} and {second} overlap on lane {lane_id}")]
    Overlap {
        lane_id: String,
        first: String,
        second: String,
    },
}

/// Every hard invariant violation in `snapshot`.
pub fn check_invariants(snapshot: &EditorSnapshot) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    if !lanes_are_ordered(&snapshot.lanes) {
        violations.push(InvariantViolation::LaneOrder);
    }

    let mut seen = std::collections::HashSet::new();
    let ids = snapshot
        .lanes
        .iter()
        .map(|l| &l.id)
        .chain(snapshot.clips.iter().map(|c| &c.id));
    for id in ids {
        if !seen.insert(id.as_str()) {
            violations.push(InvariantViolation::DuplicateId { id: id.clone() });
        }
    }

    for clip in &snapshot.clips {
        if !clip.duration.is_finite() || clip.duration <= 0.0 {
            violations.push(InvariantViolation::NonPositiveDuration {
                clip_id: clip.id.clone(),
                duration: clip.duration,
            });
        }
        if clip.start_time < 0.0 {
            violations.push(InvariantViolation::NegativeStart {
                clip_id: clip.id.clone(),
                start_time: clip.start_time,
            });
        }
        if snapshot.lane(&clip.lane_id).is_none() {
            violations.push(InvariantViolation::MissingLane {
                clip_id: clip.id.clone(),
                lane_id: clip.lane_id.clone(),
            });
        }
    }

    for (clip_id, segment) in &snapshot.subtitles {
        if snapshot.clip(clip_id).is_none() {
            violations.push(InvariantViolation::OrphanSubtitle {
                clip_id: clip_id.clone(),
            });
        }
        if let Some(source) = &segment.source_clip_id {
            if snapshot.clip(source).is_none() {
                violations.push(InvariantViolation::DanglingSource {
                    clip_id: clip_id.clone(),
                    source_clip_id: source.clone(),
                });
            }
        }
    }

    violations
}

/// Same-lane overlaps, in lane order.
pub fn find_overlaps(snapshot: &EditorSnapshot) -> Vec<InvariantViolation> {
    let mut overlaps = Vec::new();
    for lane in &snapshot.lanes {
        let mut clips: Vec<_> = snapshot.clips_on_lane(&lane.id).collect();
        clips.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        // A long clip can cover several later ones, so compare each clip
        // with the earlier clip that reaches furthest.
        let mut reach: Option<&Clip> = None;
        for clip in clips {
            if let Some(prev) = reach {
                if prev.overlaps(clip) {
                    overlaps.push(InvariantViolation::Overlap {
                        lane_id: lane.id.clone(),
                        first: prev.id.clone(),
                        second: clip.id.clone(),
                    });
                }
            }
            if reach.map_or(true, |r| clip.end_time() > r.end_time()) {
                reach = Some(clip);
            }
        }
    }
    overlaps
}
