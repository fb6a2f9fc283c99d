//! Snap guides for drag and trim.
//!
//! Priority order:
//! 1. **Edge:** a sibling clip's start or end within the pixel threshold.
//! 2. **Grid:** the nearest grid line, if within the same threshold.
//! 3. **Frame:** round to the nearest frame boundary.
//!
//! The pixel threshold is converted to seconds with the current zoom so
//! snapping feels the same at every zoom level.

use std::collections::HashSet;

use clipstage_project_model::clip::ClipId;
use clipstage_project_model::snapshot::EditorSnapshot;

use crate::config::TimelineConfig;

/// What a candidate time snapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapKind {
    Edge,
    Grid,
    Frame,
    None,
}

/// A snapped candidate time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped time (never negative).
    pub time: f64,
    /// Timeline position of the guide line to draw, if any.
    pub guide: Option<f64>,
    pub kind: SnapKind,
}

impl SnapResult {
    fn unsnapped(time: f64) -> Self {
        Self {
            time: time.max(0.0),
            guide: None,
            kind: SnapKind::None,
        }
    }
}

/// Snaps candidate times against a fixed set of sibling edges.
#[derive(Debug, Clone)]
pub struct Snapper {
    grid_interval_secs: f64,
    frame_rate: f64,
    threshold_secs: f64,
    edges: Vec<f64>,
}

impl Snapper {
    /// Build a snapper for the given zoom (`pixels_per_second`).
    pub fn new(config: &TimelineConfig, pixels_per_second: f64, mut edges: Vec<f64>) -> Self {
        let threshold_secs = if pixels_per_second > 0.0 {
            config.snap_threshold_px / pixels_per_second
        } else {
            0.0
        };
        edges.retain(|e| e.is_finite());
        edges.sort_by(f64::total_cmp);
        edges.dedup();
        Self {
            grid_interval_secs: config.grid_interval_secs,
            frame_rate: config.frame_rate,
            threshold_secs,
            edges,
        }
    }

    /// Snap distance in seconds at the current zoom.
    pub fn threshold_secs(&self) -> f64 {
        self.threshold_secs
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Snap the start of a span of `duration` seconds.
    ///
    /// Both the span's start and its end are tested against sibling
    /// edges; the closer match wins.
    pub fn snap_span(&self, raw_start: f64, duration: f64) -> SnapResult {
        if !raw_start.is_finite() {
            return SnapResult::unsnapped(0.0);
        }

        let mut best: Option<(f64, f64, f64)> = None; // (distance, start, guide)
        for &edge in &self.edges {
            for (distance, start) in [
                ((raw_start - edge).abs(), edge),
                ((raw_start + duration - edge).abs(), edge - duration),
            ] {
                if distance <= self.threshold_secs
                    && best.map_or(true, |(d, _, _)| distance < d)
                {
                    best = Some((distance, start, edge));
                }
            }
        }
        if let Some((_, start, guide)) = best {
            if start >= 0.0 {
                return SnapResult {
                    time: start,
                    guide: Some(guide),
                    kind: SnapKind::Edge,
                };
            }
        }

        self.snap_grid_or_frame(raw_start)
    }

    /// Snap a single point (a trim edge or the playhead).
    pub fn snap_point(&self, raw: f64) -> SnapResult {
        self.snap_span(raw, 0.0)
    }

    fn snap_grid_or_frame(&self, raw: f64) -> SnapResult {
        if self.grid_interval_secs > 0.0 {
            let grid = (raw / self.grid_interval_secs).round() * self.grid_interval_secs;
            if (grid - raw).abs() <= self.threshold_secs {
                return SnapResult {
                    time: grid.max(0.0),
                    guide: Some(grid.max(0.0)),
                    kind: SnapKind::Grid,
                };
            }
        }
        if self.frame_rate > 0.0 {
            let frame = (raw * self.frame_rate).round() / self.frame_rate;
            return SnapResult {
                time: frame.max(0.0),
                guide: None,
                kind: SnapKind::Frame,
            };
        }
        SnapResult::unsnapped(raw)
    }
}

/// Clips whose edges must not attract a drag of `dragged`.
///
/// That is the dragged clips themselves, subtitles transcribed from them,
/// and, for a dragged subtitle, the other subtitles of the same source.
pub fn snap_exclusions(snapshot: &EditorSnapshot, dragged: &[ClipId]) -> HashSet<ClipId> {
    let mut excluded: HashSet<ClipId> = dragged.iter().cloned().collect();
    for clip_id in dragged {
        excluded.extend(snapshot.dependent_subtitles(clip_id));
        if let Some(source) = snapshot
            .subtitles
            .get(clip_id)
            .and_then(|s| s.source_clip_id.as_deref())
        {
            excluded.extend(snapshot.dependent_subtitles(source));
        }
    }
    excluded
}

/// Start and end times of every clip not in `excluded`, plus zero.
pub fn collect_edges(snapshot: &EditorSnapshot, excluded: &HashSet<ClipId>) -> Vec<f64> {
    let mut edges = vec![0.0];
    for clip in snapshot.clips.iter().filter(|c| !excluded.contains(&c.id)) {
        edges.push(clip.start_time);
        edges.push(clip.end_time());
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipstage_project_model::clip::Clip;
    use clipstage_project_model::subtitle::SubtitleSegment;

    fn config() -> TimelineConfig {
        TimelineConfig {
            grid_interval_secs: 1.0,
            snap_threshold_px: 6.0,
            frame_rate: 30.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_edge_snap_at_zoom() {
        // 6px at 12px/s is half a second.
        let snapper = Snapper::new(&config(), 12.0, vec![0.0, 10.0]);
        assert!((snapper.threshold_secs() - 0.5).abs() < 1e-12);
        let result = snapper.snap_span(10.3, 4.0);
        assert_eq!(result.time, 10.0);
        assert_eq!(result.guide, Some(10.0));
        assert_eq!(result.kind, SnapKind::Edge);
    }

    #[test]
    fn test_end_edge_snap() {
        let snapper = Snapper::new(&config(), 12.0, vec![20.0]);
        let result = snapper.snap_span(15.8, 4.0);
        assert!((result.time - 16.0).abs() < 1e-12);
        assert_eq!(result.guide, Some(20.0));
    }

    #[test]
    fn test_grid_snap_when_no_edge() {
        let snapper = Snapper::new(&config(), 12.0, vec![]);
        let result = snapper.snap_span(6.8, 1.0);
        assert_eq!(result.kind, SnapKind::Grid);
        assert!((result.time - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_frame_snap_fallback() {
        // At 100px/s the threshold is 0.06s, too small to reach the grid.
        let snapper = Snapper::new(&config(), 100.0, vec![]);
        let result = snapper.snap_span(6.51, 1.0);
        assert_eq!(result.kind, SnapKind::Frame);
        assert!((result.time * 30.0 - (result.time * 30.0).round()).abs() < 1e-9);
        assert!(result.guide.is_none());
    }

    #[test]
    fn test_never_negative() {
        let snapper = Snapper::new(&config(), 100.0, vec![]);
        assert_eq!(snapper.snap_span(-3.0, 1.0).time, 0.0);
    }

    #[test]
    fn test_exclusions_cover_subtitle_group() {
        let mut snap = EditorSnapshot::new();
        snap.clips.push(Clip::new("v", "a", "lv", 0.0, 10.0));
        snap.clips.push(Clip::new("s1", "t", "lt", 0.0, 1.0));
        snap.clips.push(Clip::new("s2", "t", "lt", 1.0, 1.0));
        for id in ["s1", "s2"] {
            let mut seg = SubtitleSegment::new(id, "x", 0.0, 1.0);
            seg.source_clip_id = Some("v".to_string());
            snap.subtitles.insert(id.to_string(), seg);
        }

        let from_source = snap_exclusions(&snap, &["v".to_string()]);
        assert!(from_source.contains("s1") && from_source.contains("s2"));

        let from_subtitle = snap_exclusions(&snap, &["s1".to_string()]);
        assert!(from_subtitle.contains("s2"));
        assert!(!from_subtitle.contains("v"));

        let edges = collect_edges(&snap, &from_subtitle);
        assert!(edges.contains(&10.0));
        assert!(!edges.contains(&2.0));
    }
}
