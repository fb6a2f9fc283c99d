//! Per-frame playback driver.
//!
//! Each frame: advance the clock, blend it toward the media backing the
//! active subtitle, then bring every handle in line with the result.

use clipstage_project_model::clip::ClipId;
use clipstage_project_model::lane::LaneKind;
use clipstage_project_model::snapshot::EditorSnapshot;

use crate::clock::{LoopToken, PlaybackClock};
use crate::config::PlaybackConfig;
use crate::drift::{DriftAction, DriftCorrector};
use crate::mapping::ClipTiming;
use crate::stacking::top_clip_at;
use crate::sync::{HandleRegistry, MediaSync, SyncReport};

/// Outcome of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Timeline time after correction.
    pub time: f64,
    /// Clip whose media served as the drift reference.
    pub reference_clip: Option<ClipId>,
    pub drift: DriftAction,
    pub sync: SyncReport,
    /// Playback stopped at the end of the timeline this frame.
    pub ended: bool,
}

/// Clock, drift corrector, and handle sync bundled together.
#[derive(Debug)]
pub struct PlaybackEngine {
    clock: PlaybackClock,
    corrector: DriftCorrector,
    sync: MediaSync,
    handles: HandleRegistry,
}

impl PlaybackEngine {
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            clock: PlaybackClock::new(config.max_frame_delta_secs),
            corrector: DriftCorrector::new(config),
            sync: MediaSync::new(config.seek_epsilon_secs),
            handles: HandleRegistry::new(),
        }
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut PlaybackClock {
        &mut self.clock
    }

    pub fn handles(&self) -> &HandleRegistry {
        &self.handles
    }

    pub fn handles_mut(&mut self) -> &mut HandleRegistry {
        &mut self.handles
    }

    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    /// Start playback over `snapshot`, returning the loop token.
    pub fn play(&mut self, snapshot: &EditorSnapshot) -> LoopToken {
        self.clock.set_duration(snapshot.duration());
        self.clock.play()
    }

    pub fn pause(&mut self) {
        self.clock.pause();
        self.handles.pause_all();
    }

    /// Jump to `t` and re-seek visible handles immediately.
    pub fn seek(&mut self, snapshot: &EditorSnapshot, t: f64) -> SyncReport {
        self.clock.set_duration(snapshot.duration());
        self.clock.seek(t);
        self.clock.take_discontinuity();
        self.sync
            .sync(&mut self.handles, snapshot, self.clock.time(), self.clock.is_playing(), true)
    }

    /// Run one frame of the loop identified by `token`.
    ///
    /// Returns `None` when the token is stale (the loop was torn down).
    pub fn frame(
        &mut self,
        snapshot: &EditorSnapshot,
        token: LoopToken,
        now_secs: f64,
    ) -> Option<FrameReport> {
        self.clock.set_duration(snapshot.duration());
        let was_playing = self.clock.is_current(token);
        let time = self.clock.tick(token, now_secs)?;
        let ended = was_playing && !self.clock.is_playing();

        let mut drift = DriftAction::Hold;
        let reference_clip = self.reference_clip(snapshot, time);
        if self.clock.is_playing() && !self.clock.is_scrubbing() {
            if let Some(reference_time) = reference_clip
                .as_deref()
                .and_then(|id| self.reference_time(snapshot, id))
            {
                drift = self.corrector.correct(time, reference_time);
                if let Some(corrected) = drift.time() {
                    self.clock.nudge(corrected);
                }
            }
        }

        let discontinuity = self.clock.take_discontinuity();
        let sync = self.sync.sync(
            &mut self.handles,
            snapshot,
            self.clock.time(),
            self.clock.is_playing(),
            discontinuity,
        );

        Some(FrameReport {
            time: self.clock.time(),
            reference_clip,
            drift,
            sync,
            ended,
        })
    }

    /// Source clip of the subtitle on top at `t`, if it has a handle.
    fn reference_clip(&self, snapshot: &EditorSnapshot, t: f64) -> Option<ClipId> {
        let subtitle = top_clip_at(snapshot, t, LaneKind::Text)?;
        let source = snapshot.subtitles.get(&subtitle.id)?.source_clip_id.as_ref()?;
        self.handles.get(source).map(|_| source.clone())
    }

    /// Timeline time reported by the reference handle.
    fn reference_time(&self, snapshot: &EditorSnapshot, clip_id: &str) -> Option<f64> {
        let handle = self.handles.get(clip_id)?;
        if handle.is_paused() || handle.is_seeking() {
            return None;
        }
        let timing = ClipTiming::of(snapshot, clip_id)?;
        Some(timing.asset_to_timeline(handle.current_time()))
    }
}
