//! Clip edits: drop, trim, split, duplicate, delete, asset cascade, speed and
//! z-order.
//!
//! Asset-duration violations are clamped, never rejected. Operations that
//! cannot produce a sensible result (a split too close to an edge, an
//! unknown clip) return an error and leave the snapshot untouched.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use clipstage_common::error::{ClipstageError, ClipstageResult};
use clipstage_project_model::clip::{
    Asset, AssetLookup, Clip, ClipId, ClipSettings, TextClipSettings,
};
use clipstage_project_model::lane::{LaneId, LaneKind};
use clipstage_project_model::snapshot::EditorSnapshot;
use clipstage_project_model::transform::ClipTransform;

use crate::config::TimelineConfig;
use crate::lanes::{apply_lane_target, find_or_create_lane, prune_empty_lanes, LaneTarget};
use crate::placement::{resolve_collisions, translate_dependents};
use crate::snapping::{collect_edges, snap_exclusions, SnapKind, SnapResult, Snapper};

/// Which edge of a clip a trim gesture holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimEdge {
    Start,
    End,
}

/// Clip geometry after a trim.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimOutcome {
    pub start_time: f64,
    pub duration: f64,
    pub start_offset: f64,
    /// Snap guide for the dragged edge.
    pub guide: Option<f64>,
}

/// Build a snapper for trimming `clip_id`, ignoring its own edges and
/// those of its dependent subtitles.
pub fn trim_snapper(
    snapshot: &EditorSnapshot,
    config: &TimelineConfig,
    clip_id: &str,
    pixels_per_second: f64,
) -> Snapper {
    let excluded = snap_exclusions(snapshot, &[clip_id.to_string()]);
    Snapper::new(config, pixels_per_second, collect_edges(snapshot, &excluded))
}

/// Move one edge of a clip to `target` (timeline seconds).
///
/// The start edge cannot move past the beginning of the asset or the
/// timeline; the end edge cannot move past the end of the asset. Both
/// keep at least `min_clip_duration_secs`.
pub fn trim_clip<A: AssetLookup + ?Sized>(
    snapshot: &mut EditorSnapshot,
    assets: &A,
    config: &TimelineConfig,
    clip_id: &str,
    edge: TrimEdge,
    target: f64,
    snapper: Option<&Snapper>,
) -> ClipstageResult<TrimOutcome> {
    let clip = snapshot
        .clip(clip_id)
        .ok_or_else(|| ClipstageError::clip_not_found(clip_id))?
        .clone();
    if !target.is_finite() {
        return Err(ClipstageError::edit(format!(
            "Trim target for {clip_id} is not finite"
        )));
    }

    let speed = snapshot.speed_of(clip_id);
    let asset = assets.asset(&clip.asset_id);
    let timed = asset.is_some_and(|a| a.kind.is_timed() && a.duration.is_some());
    let min = config.min_clip_duration_secs;

    let snapped = match snapper {
        Some(snapper) => snapper.snap_point(target),
        None => SnapResult {
            time: target.max(0.0),
            guide: None,
            kind: SnapKind::None,
        },
    };

    let (start_time, duration, start_offset) = match edge {
        TrimEdge::Start => {
            let end = clip.end_time();
            let earliest = if timed {
                (clip.start_time - clip.start_offset / speed).max(0.0)
            } else {
                0.0
            };
            let latest = end - min;
            let new_start = snapped.time.min(latest).max(earliest);
            let delta = new_start - clip.start_time;
            let offset = if timed {
                (clip.start_offset + delta * speed).max(0.0)
            } else {
                clip.start_offset
            };
            (new_start, end - new_start, offset)
        }
        TrimEdge::End => {
            let max_duration = asset
                .map(|a| a.max_timeline_duration(clip.start_offset, speed))
                .unwrap_or(f64::INFINITY);
            let requested = snapped.time - clip.start_time;
            let duration = requested.min(max_duration).max(min.min(max_duration));
            (clip.start_time, duration, clip.start_offset)
        }
    };

    if duration <= 0.0 {
        return Err(ClipstageError::edit(format!(
            "Trim of {clip_id} would leave no duration"
        )));
    }

    if let Some(c) = snapshot.clip_mut(clip_id) {
        c.start_time = start_time;
        c.duration = duration;
        c.start_offset = start_offset;
    }
    if let Some(segment) = snapshot.subtitles.get_mut(clip_id) {
        segment.trim_to(start_time, start_time + duration);
        if segment.words.is_some() {
            if let Some(text) = snapshot.text_settings.get_mut(clip_id) {
                text.text = segment.text.clone();
            }
        }
    }

    tracing::debug!(clip_id, ?edge, start_time, duration, start_offset, "Clip trimmed");

    Ok(TrimOutcome {
        start_time,
        duration,
        start_offset,
        guide: snapped.guide,
    })
}

/// Split a clip at timeline time `t`, returning the id of the right half.
///
/// The right half inherits settings, transform and text styling. A
/// subtitle clip's words are partitioned at `t`, and subtitles
/// transcribed from the clip that start after `t` follow the right half.
pub fn split_clip(
    snapshot: &mut EditorSnapshot,
    config: &TimelineConfig,
    clip_id: &str,
    t: f64,
) -> ClipstageResult<ClipId> {
    let clip = snapshot
        .clip(clip_id)
        .ok_or_else(|| ClipstageError::clip_not_found(clip_id))?
        .clone();
    let min = config.min_clip_duration_secs;
    if !t.is_finite() || t - clip.start_time < min || clip.end_time() - t < min {
        return Err(ClipstageError::edit(format!(
            "Cannot split {clip_id} at {t:.3}s: within {min}s of an edge"
        )));
    }

    let speed = snapshot.speed_of(clip_id);
    let left_duration = t - clip.start_time;
    let right_id = snapshot.allocate_id("clip");

    let mut right = clip.clone();
    right.id = right_id.clone();
    right.start_time = t;
    right.start_offset = clip.start_offset + left_duration * speed;
    right.duration = clip.duration - left_duration;

    let position = snapshot
        .clips
        .iter()
        .position(|c| c.id == clip_id)
        .map_or(snapshot.clips.len(), |p| p + 1);
    snapshot.clips.insert(position, right);
    if let Some(left) = snapshot.clip_mut(clip_id) {
        left.duration = left_duration;
    }

    if let Some(transform) = snapshot.transforms.get(clip_id).copied() {
        snapshot.transforms.insert(right_id.clone(), transform);
    }
    if let Some(settings) = snapshot.settings.get(clip_id).cloned() {
        snapshot.settings.insert(right_id.clone(), settings);
    }
    if let Some(text) = snapshot.text_settings.get(clip_id).cloned() {
        snapshot.text_settings.insert(right_id.clone(), text);
    }

    if let Some(segment) = snapshot.subtitles.get(clip_id).cloned() {
        let (left, right) = segment.split_at(t, right_id.clone());
        if left.words.is_some() {
            if let Some(text) = snapshot.text_settings.get_mut(clip_id) {
                text.text = left.text.clone();
            }
            if let Some(text) = snapshot.text_settings.get_mut(&right_id) {
                text.text = right.text.clone();
            }
        }
        snapshot.subtitles.insert(clip_id.to_string(), left);
        snapshot.subtitles.insert(right_id.clone(), right);
    }

    for segment in snapshot.subtitles.values_mut() {
        if segment.source_clip_id.as_deref() == Some(clip_id) && segment.start_time >= t {
            segment.source_clip_id = Some(right_id.clone());
        }
    }

    tracing::debug!(clip_id, right_id = %right_id, at = t, "Clip split");
    Ok(right_id)
}

/// Duplicate `clip_ids` after the end of the selection.
///
/// Copies keep their relative offsets, reuse their source lane (a lane is
/// created only when the source lane is gone), and collisions on every
/// affected lane are resolved. The copies become the selection.
pub fn duplicate_clips<A: AssetLookup + ?Sized>(
    snapshot: &mut EditorSnapshot,
    assets: &A,
    config: &TimelineConfig,
    clip_ids: &[ClipId],
) -> ClipstageResult<Vec<ClipId>> {
    let mut sources = Vec::with_capacity(clip_ids.len());
    for id in clip_ids {
        let clip = snapshot
            .clip(id)
            .ok_or_else(|| ClipstageError::clip_not_found(id))?;
        sources.push(clip.clone());
    }
    if sources.is_empty() {
        return Err(ClipstageError::edit("Nothing to duplicate"));
    }

    let selection_start = sources.iter().map(|c| c.start_time).fold(f64::INFINITY, f64::min);
    let selection_end = sources.iter().map(|c| c.end_time()).fold(0.0, f64::max);
    let offset = config.ceil_to_grid(selection_end) - selection_start;

    let mut id_map: BTreeMap<ClipId, ClipId> = BTreeMap::new();
    for source in &sources {
        let new_id = snapshot.allocate_id("clip");
        id_map.insert(source.id.clone(), new_id);
    }

    let mut affected: BTreeSet<LaneId> = BTreeSet::new();
    let mut copies = Vec::with_capacity(sources.len());
    for source in &sources {
        let new_id = id_map[&source.id].clone();
        let lane_id = if snapshot.lane(&source.lane_id).is_some() {
            source.lane_id.clone()
        } else {
            let kind = clip_lane_kind(snapshot, assets, &source.id, &source.asset_id);
            find_or_create_lane(snapshot, kind)
        };

        let mut copy = source.clone();
        copy.id = new_id.clone();
        copy.lane_id = lane_id.clone();
        copy.start_time += offset;
        snapshot.clips.push(copy);
        affected.insert(lane_id);

        if let Some(transform) = snapshot.transforms.get(&source.id).copied() {
            snapshot.transforms.insert(new_id.clone(), transform);
        }
        if let Some(settings) = snapshot.settings.get(&source.id).cloned() {
            snapshot.settings.insert(new_id.clone(), settings);
        }
        if let Some(text) = snapshot.text_settings.get(&source.id).cloned() {
            snapshot.text_settings.insert(new_id.clone(), text);
        }
        if let Some(segment) = snapshot.subtitles.get(&source.id).cloned() {
            let mut segment = segment;
            segment.clip_id = new_id.clone();
            segment.shift(offset);
            if let Some(remapped) = segment
                .source_clip_id
                .as_ref()
                .and_then(|src| id_map.get(src))
            {
                segment.source_clip_id = Some(remapped.clone());
            }
            snapshot.subtitles.insert(new_id.clone(), segment);
        }
        copies.push(new_id);
    }

    let skip: HashSet<ClipId> = copies.iter().cloned().collect();
    for lane_id in &affected {
        let moved = resolve_collisions(snapshot, lane_id, None);
        translate_dependents(snapshot, &moved, &skip);
    }

    snapshot.selection.clip_ids = copies.clone();
    tracing::debug!(count = copies.len(), offset, "Clips duplicated");
    Ok(copies)
}

/// Timeline length given to stills and text when first dropped.
pub const DEFAULT_STILL_DURATION_SECS: f64 = 5.0;

/// Create a clip for `asset` at `start_time`.
///
/// `lane` is the drop target from [`crate::lanes::resolve_lane_target`];
/// without one (or when it names a lane of another kind) the first lane
/// of the asset's kind is used. Visual clips are fitted to a stage of
/// `stage_aspect` (width / height). Collisions on the lane are resolved
/// with the new clip first on ties, and it becomes the selection.
pub fn drop_asset(
    snapshot: &mut EditorSnapshot,
    config: &TimelineConfig,
    asset: &Asset,
    lane: Option<&LaneTarget>,
    start_time: f64,
    stage_aspect: f64,
) -> ClipstageResult<ClipId> {
    if !start_time.is_finite() {
        return Err(ClipstageError::placement(format!(
            "Drop time for {} is not finite",
            asset.id
        )));
    }
    let kind = asset.kind.lane_kind();
    let compatible = lane.filter(|target| match target {
        LaneTarget::Existing(id) => snapshot.lane(id).is_some_and(|l| l.kind == kind),
        LaneTarget::New { kind: target_kind, .. } => *target_kind == kind,
    });
    let lane_id = match compatible {
        Some(target) => apply_lane_target(snapshot, target, kind).0,
        None => find_or_create_lane(snapshot, kind),
    };

    let duration = match asset.duration {
        Some(d) if asset.kind.is_timed() && d.is_finite() => d.max(config.min_clip_duration_secs),
        _ => DEFAULT_STILL_DURATION_SECS,
    };
    let id = snapshot.allocate_id("clip");
    snapshot.clips.push(Clip::new(
        id.clone(),
        asset.id.clone(),
        lane_id.clone(),
        start_time.max(0.0),
        duration,
    ));

    match kind {
        LaneKind::Video => {
            let aspect = asset.aspect_ratio.or_else(|| match (asset.width, asset.height) {
                (Some(w), Some(h)) if h > 0 => Some(w as f64 / h as f64),
                _ => None,
            });
            let transform = aspect
                .map(|a| ClipTransform::fit(a, stage_aspect))
                .unwrap_or(ClipTransform::FULL);
            snapshot.transforms.insert(id.clone(), transform);
        }
        LaneKind::Text => {
            snapshot.transforms.insert(id.clone(), ClipTransform::FULL);
            snapshot
                .text_settings
                .insert(id.clone(), TextClipSettings::default());
        }
        LaneKind::Audio => {}
    }
    if asset.kind.is_timed() {
        snapshot.settings.insert(id.clone(), ClipSettings::default());
    }

    let moved = resolve_collisions(snapshot, &lane_id, Some(&id));
    translate_dependents(snapshot, &moved, &HashSet::new());
    snapshot.selection.select_only(id.clone());

    tracing::debug!(clip_id = %id, asset_id = %asset.id, lane_id = %lane_id, "Asset dropped");
    Ok(id)
}

/// Lane kind for a clip whose lane may no longer exist.
pub(crate) fn clip_lane_kind<A: AssetLookup + ?Sized>(
    snapshot: &EditorSnapshot,
    assets: &A,
    clip_id: &str,
    asset_id: &str,
) -> LaneKind {
    if let Some(kind) = snapshot.lane_kind_of(clip_id) {
        return kind;
    }
    if snapshot.is_subtitle(clip_id) || snapshot.text_settings.contains_key(clip_id) {
        return LaneKind::Text;
    }
    assets
        .asset(asset_id)
        .map(|a| a.kind.lane_kind())
        .unwrap_or(LaneKind::Video)
}

/// Result of a delete or asset-removal cascade.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOutcome {
    pub removed: Vec<ClipId>,
    pub pruned_lanes: Vec<LaneId>,
}

/// Delete clips along with subtitles transcribed from them.
///
/// Unknown ids are ignored. Lanes left empty are pruned.
pub fn delete_clips(snapshot: &mut EditorSnapshot, clip_ids: &[ClipId]) -> DeleteOutcome {
    let mut targets: Vec<ClipId> = Vec::new();
    for id in clip_ids {
        if !targets.contains(id) {
            targets.push(id.clone());
        }
        for dependent in snapshot.dependent_subtitles(id) {
            if !targets.contains(&dependent) {
                targets.push(dependent);
            }
        }
    }

    let mut removed = Vec::new();
    let mut lanes: Vec<LaneId> = Vec::new();
    for id in targets {
        if let Some(clip) = snapshot.remove_clip_records(&id) {
            if !lanes.contains(&clip.lane_id) {
                lanes.push(clip.lane_id);
            }
            removed.push(id);
        }
    }
    let pruned_lanes = prune_empty_lanes(snapshot, &lanes);

    tracing::debug!(
        removed = removed.len(),
        pruned = pruned_lanes.len(),
        "Clips deleted"
    );
    DeleteOutcome {
        removed,
        pruned_lanes,
    }
}

/// Delete every clip referencing `asset_id`, cascading as [`delete_clips`].
pub fn remove_asset(snapshot: &mut EditorSnapshot, asset_id: &str) -> DeleteOutcome {
    let ids: Vec<ClipId> = snapshot
        .clips
        .iter()
        .filter(|c| c.asset_id == asset_id)
        .map(|c| c.id.clone())
        .collect();
    tracing::info!(asset_id, clips = ids.len(), "Removing asset from timeline");
    delete_clips(snapshot, &ids)
}

/// Point a clip at a different asset of a compatible kind.
///
/// The start offset and duration are clamped so the clip stays inside
/// the new asset.
pub fn replace_asset<A: AssetLookup + ?Sized>(
    snapshot: &mut EditorSnapshot,
    assets: &A,
    config: &TimelineConfig,
    clip_id: &str,
    new_asset_id: &str,
) -> ClipstageResult<()> {
    let asset = assets
        .asset(new_asset_id)
        .ok_or_else(|| ClipstageError::asset_not_found(new_asset_id))?;
    let lane_kind = snapshot
        .lane_kind_of(clip_id)
        .ok_or_else(|| ClipstageError::clip_not_found(clip_id))?;
    if asset.kind.lane_kind() != lane_kind {
        return Err(ClipstageError::edit(format!(
            "Asset {new_asset_id} ({:?}) cannot replace a clip on a {lane_kind:?} lane",
            asset.kind
        )));
    }

    let speed = snapshot.speed_of(clip_id);
    let min = config.min_clip_duration_secs;
    let Some(clip) = snapshot.clip_mut(clip_id) else {
        return Err(ClipstageError::clip_not_found(clip_id));
    };

    if let (true, Some(asset_duration)) = (asset.kind.is_timed(), asset.duration) {
        let latest_offset = (asset_duration - min * speed).max(0.0);
        clip.start_offset = clip.start_offset.min(latest_offset);
    } else {
        clip.start_offset = 0.0;
    }
    let max_duration = asset.max_timeline_duration(clip.start_offset, speed);
    clip.duration = clip.duration.min(max_duration);
    clip.asset_id = new_asset_id.to_string();

    tracing::debug!(
        clip_id,
        asset_id = new_asset_id,
        duration = clip.duration,
        "Clip asset replaced"
    );
    Ok(())
}

/// Change a clip's speed, keeping the span of asset it plays.
///
/// Returns the new timeline duration, clamped to the asset bound.
pub fn set_speed<A: AssetLookup + ?Sized>(
    snapshot: &mut EditorSnapshot,
    assets: &A,
    config: &TimelineConfig,
    clip_id: &str,
    speed: f64,
) -> ClipstageResult<f64> {
    let clip = snapshot
        .clip(clip_id)
        .ok_or_else(|| ClipstageError::clip_not_found(clip_id))?
        .clone();
    let old_speed = snapshot.speed_of(clip_id);
    let new_speed = ClipSettings::clamp_speed(speed);

    let asset_span = clip.duration * old_speed;
    let max_duration = assets
        .asset(&clip.asset_id)
        .map(|a| a.max_timeline_duration(clip.start_offset, new_speed))
        .unwrap_or(f64::INFINITY);
    let duration = (asset_span / new_speed)
        .min(max_duration)
        .max(config.min_clip_duration_secs.min(max_duration));

    snapshot.settings.entry(clip_id.to_string()).or_default().speed = new_speed;
    if let Some(c) = snapshot.clip_mut(clip_id) {
        c.duration = duration;
    }

    tracing::debug!(clip_id, speed = new_speed, duration, "Clip speed changed");
    Ok(duration)
}

/// Stacking change requested from the clip context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrderChange {
    Forward,
    Backward,
    ToFront,
    ToBack,
}

/// Change a clip's z-index relative to other clips in the same lane tier.
///
/// Returns the new z-index.
pub fn reorder_z(
    snapshot: &mut EditorSnapshot,
    clip_id: &str,
    change: ZOrderChange,
) -> ClipstageResult<i32> {
    let tier = snapshot
        .lane_kind_of(clip_id)
        .ok_or_else(|| ClipstageError::clip_not_found(clip_id))?;
    let current = snapshot.clip(clip_id).map(|c| c.z_index).unwrap_or_default();

    let others: Vec<i32> = snapshot
        .clips
        .iter()
        .filter(|c| c.id != clip_id)
        .filter(|c| snapshot.lane(&c.lane_id).map(|l| l.kind) == Some(tier))
        .map(|c| c.z_index)
        .collect();

    let z = match change {
        ZOrderChange::Forward => current.saturating_add(1),
        ZOrderChange::Backward => current.saturating_sub(1),
        ZOrderChange::ToFront => others
            .iter()
            .max()
            .map_or(current, |max| current.max(max.saturating_add(1))),
        ZOrderChange::ToBack => others
            .iter()
            .min()
            .map_or(current, |min| current.min(min.saturating_sub(1))),
    };

    if let Some(clip) = snapshot.clip_mut(clip_id) {
        clip.z_index = z;
    }
    tracing::debug!(clip_id, ?change, z, "Clip z-order changed");
    Ok(z)
}
