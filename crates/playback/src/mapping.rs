//! Timeline time <-> asset time mapping.
//!
//! A clip shows `[start_offset, start_offset + duration * speed)` of its
//! asset over `[start_time, start_time + duration)` of the timeline.

use clipstage_project_model::clip::Clip;
use clipstage_project_model::snapshot::EditorSnapshot;

/// The timing of one clip, detached from the snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipTiming {
    pub start_time: f64,
    pub duration: f64,
    pub start_offset: f64,
    pub speed: f64,
}

impl ClipTiming {
    pub fn new(start_time: f64, duration: f64, start_offset: f64, speed: f64) -> Self {
        Self {
            start_time,
            duration,
            start_offset,
            speed,
        }
    }

    pub fn from_clip(clip: &Clip, speed: f64) -> Self {
        Self::new(clip.start_time, clip.duration, clip.start_offset, speed)
    }

    /// Timing of `clip_id` with its effective speed.
    pub fn of(snapshot: &EditorSnapshot, clip_id: &str) -> Option<Self> {
        snapshot
            .clip(clip_id)
            .map(|clip| Self::from_clip(clip, snapshot.speed_of(clip_id)))
    }

    /// Last asset time this clip shows.
    pub fn asset_end(&self) -> f64 {
        self.start_offset + self.duration * self.speed
    }

    /// Asset time shown at timeline time `t`, clamped to the clip's span.
    pub fn timeline_to_asset(&self, t: f64) -> f64 {
        let raw = self.start_offset + (t - self.start_time) * self.speed;
        raw.clamp(self.start_offset, self.asset_end().max(self.start_offset))
    }

    /// Timeline time at which asset time `a` is shown, clamped to the clip.
    pub fn asset_to_timeline(&self, a: f64) -> f64 {
        if self.speed <= 0.0 {
            return self.start_time;
        }
        let raw = self.start_time + (a - self.start_offset) / self.speed;
        raw.clamp(self.start_time, self.start_time + self.duration.max(0.0))
    }
}

/// Asset time for `clip` at timeline time `t` and playback `speed`.
pub fn timeline_to_asset_time(clip: &Clip, speed: f64, t: f64) -> f64 {
    ClipTiming::from_clip(clip, speed).timeline_to_asset(t)
}

/// Timeline time for `clip` showing asset time `a` at playback `speed`.
pub fn asset_to_timeline_time(clip: &Clip, speed: f64, a: f64) -> f64 {
    ClipTiming::from_clip(clip, speed).asset_to_timeline(a)
}
