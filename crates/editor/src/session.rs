//! The editor session.
//!
//! [`Editor`] owns one project and everything that acts on it: timeline
//! edits, gestures, history, playback, subtitle presentation,
//! transcription and export. Every committed edit records the prior
//! snapshot for undo; an edit that fails leaves the snapshot as it was.

use std::path::Path;

use clipstage_common::config::AppConfig;
use clipstage_common::error::{ClipstageError, ClipstageResult};
use clipstage_playback::mapping::ClipTiming;
use clipstage_playback::stacking::pick_at;
use clipstage_playback::{FrameReport, LoopToken, PlaybackConfig, PlaybackEngine, SyncReport};
use clipstage_project_model::clip::{Asset, ClipId, ClipSettings, TextClipSettings};
use clipstage_project_model::lane::LaneKind;
use clipstage_project_model::project::{EditorProjectState, ExportStage};
use clipstage_project_model::snapshot::EditorSnapshot;
use clipstage_project_model::transform::ClipTransform;
use clipstage_subtitles::presentation::{PresentOutcome, PresentationPort, SubtitlePresenter};
use clipstage_subtitles::transcript::{
    plan_chunks, ChunkRange, Transcription, TranscriptionResult, TranscriptionStatus,
};
use clipstage_subtitles::{PresentationMode, PresenterConfig};
use clipstage_timeline::editing::{
    delete_clips, drop_asset, duplicate_clips, remove_asset, reorder_z, replace_asset, set_speed,
    split_clip, trim_clip, trim_snapper, DeleteOutcome, TrimOutcome,
};
use clipstage_timeline::lanes::resolve_lane_target;
use clipstage_timeline::snapping::Snapper;
use clipstage_timeline::{
    check_invariants, Clipboard, CommitOutcome, DragPointer, DragSession, InvariantViolation,
    PlacementPreview, TimelineConfig, TrimEdge, ZOrderChange,
};

use crate::export::{poll_export, start_export, wait_until_ready, ExportBackend};
use crate::gesture::{GestureKind, GestureSlot, TransformOp};
use crate::history::History;

#[derive(Debug, Clone)]
struct TrimState {
    clip_id: ClipId,
    edge: TrimEdge,
    snapper: Snapper,
}

#[derive(Debug)]
pub struct Editor {
    project: EditorProjectState,
    timeline: TimelineConfig,
    engine: PlaybackEngine,
    presenter: SubtitlePresenter,
    history: History,
    gesture: GestureSlot,
    drag: Option<DragSession>,
    trim: Option<TrimState>,
    clipboard: Option<Clipboard>,
    transcription: Transcription,
    subtitle_style: TextClipSettings,
}

impl Editor {
    pub fn new(project: EditorProjectState, config: &AppConfig) -> Self {
        Self {
            project,
            timeline: TimelineConfig::from(&config.timeline),
            engine: PlaybackEngine::new(&PlaybackConfig::from(&config.playback)),
            presenter: SubtitlePresenter::new(PresenterConfig::from(&config.subtitles)),
            history: History::from(&config.history),
            gesture: GestureSlot::new(),
            drag: None,
            trim: None,
            clipboard: None,
            transcription: Transcription::new(),
            subtitle_style: TextClipSettings::default(),
        }
    }

    pub fn with_defaults(project: EditorProjectState) -> Self {
        Self::new(project, &AppConfig::default())
    }

    /// Load a project file into a new session.
    pub fn open(path: impl AsRef<Path>, config: &AppConfig) -> ClipstageResult<Self> {
        let project = EditorProjectState::load(path)
            .map_err(|e| ClipstageError::project(e.to_string()))?;
        Ok(Self::new(project, config))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ClipstageResult<()> {
        self.project
            .save(path)
            .map_err(|e| ClipstageError::project(e.to_string()))
    }

    pub fn project(&self) -> &EditorProjectState {
        &self.project
    }

    pub fn into_project(self) -> EditorProjectState {
        self.project
    }

    pub fn snapshot(&self) -> &EditorSnapshot {
        &self.project.snapshot
    }

    pub fn assets(&self) -> &[Asset] {
        &self.project.assets
    }

    /// Register or update an asset record.
    pub fn upsert_asset(&mut self, asset: Asset) {
        match self.project.assets.iter_mut().find(|a| a.id == asset.id) {
            Some(existing) => *existing = asset,
            None => self.project.assets.push(asset),
        }
    }

    pub fn timeline_config(&self) -> &TimelineConfig {
        &self.timeline
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    /// Mutable engine access, for registering playback handles.
    pub fn engine_mut(&mut self) -> &mut PlaybackEngine {
        &mut self.engine
    }

    pub fn active_gesture(&self) -> Option<(GestureKind, &str)> {
        self.gesture.active()
    }

    pub fn clipboard(&self) -> Option<&Clipboard> {
        self.clipboard.as_ref()
    }

    /// Invariant violations in the current snapshot.
    pub fn check(&self) -> Vec<InvariantViolation> {
        check_invariants(&self.project.snapshot)
    }

    fn stage_aspect(&self) -> f64 {
        let config = &self.project.export.config;
        if config.height == 0 {
            return 1.0;
        }
        config.width as f64 / config.height as f64
    }

    fn ensure_idle(&self) -> ClipstageResult<()> {
        match self.gesture.active() {
            Some((kind, clip_id)) => Err(ClipstageError::GestureActive {
                active: format!("{kind} on {clip_id}"),
            }),
            None => Ok(()),
        }
    }

    fn after_change(&mut self) {
        let stale = self.engine.handles_mut().prune(&self.project.snapshot);
        if !stale.is_empty() {
            tracing::debug!(handles = stale.len(), "Dropped handles of removed clips");
        }
        self.presenter.invalidate();
    }

    fn commit(&mut self, before: EditorSnapshot) {
        self.history.push_entry(before);
        self.project.project.touch();
        self.after_change();
    }

    /// Run one edit, recording history on success and rolling back on error.
    fn edit<T>(
        &mut self,
        what: &'static str,
        f: impl FnOnce(&mut EditorSnapshot, &[Asset], &TimelineConfig) -> ClipstageResult<T>,
    ) -> ClipstageResult<T> {
        self.ensure_idle()?;
        let before = self.project.snapshot.clone();
        match f(&mut self.project.snapshot, &self.project.assets, &self.timeline) {
            Ok(value) => {
                tracing::debug!(edit = what, "Edit applied");
                self.commit(before);
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(edit = what, error = %e, "Edit rejected");
                self.project.snapshot = before;
                Err(e)
            }
        }
    }

    /// Like [`Editor::edit`], but bursts within the history throttle
    /// interval share one undo entry.
    fn edit_throttled<T>(
        &mut self,
        now_ms: u64,
        f: impl FnOnce(&mut EditorSnapshot, &[Asset], &TimelineConfig) -> ClipstageResult<T>,
    ) -> ClipstageResult<T> {
        self.ensure_idle()?;
        let before = self.project.snapshot.clone();
        match f(&mut self.project.snapshot, &self.project.assets, &self.timeline) {
            Ok(value) => {
                self.history.push_throttled(&before, now_ms);
                self.project.project.touch();
                self.after_change();
                Ok(value)
            }
            Err(e) => {
                self.project.snapshot = before;
                Err(e)
            }
        }
    }

    fn selected(&self) -> ClipstageResult<Vec<ClipId>> {
        let ids = self.project.snapshot.selection.clip_ids.clone();
        if ids.is_empty() {
            return Err(ClipstageError::edit("Nothing selected"));
        }
        Ok(ids)
    }

    // Selection

    pub fn select(&mut self, clip_id: &str, additive: bool) -> ClipstageResult<()> {
        if self.project.snapshot.clip(clip_id).is_none() {
            return Err(ClipstageError::clip_not_found(clip_id));
        }
        let selection = &mut self.project.snapshot.selection;
        if additive {
            selection.toggle(clip_id);
        } else {
            selection.select_only(clip_id);
        }
        Ok(())
    }

    /// Select whatever a tap at `t` hits: the top text clip, else the top
    /// video clip.
    pub fn select_at(&mut self, t: f64) -> Option<ClipId> {
        let hit = pick_at(&self.project.snapshot, t).map(|c| c.id.clone());
        match &hit {
            Some(id) => self.project.snapshot.selection.select_only(id.clone()),
            None => self.project.snapshot.selection.clear(),
        }
        hit
    }

    pub fn clear_selection(&mut self) {
        self.project.snapshot.selection.clear();
    }

    // Edits

    /// Drop `asset_id` onto the timeline. `y_px` is the pointer height over
    /// the lane area; without it the asset goes to the first lane of its
    /// kind.
    pub fn drop_asset(
        &mut self,
        asset_id: &str,
        y_px: Option<f64>,
        start_time: f64,
    ) -> ClipstageResult<ClipId> {
        let asset = self
            .project
            .asset(asset_id)
            .cloned()
            .ok_or_else(|| ClipstageError::asset_not_found(asset_id))?;
        let target = y_px.filter(|y| y.is_finite()).map(|y| {
            resolve_lane_target(
                &self.project.snapshot.lanes,
                &self.timeline.layout,
                y,
                asset.kind.lane_kind(),
            )
        });
        let aspect = self.stage_aspect();
        self.edit("drop", |snapshot, _, config| {
            drop_asset(snapshot, config, &asset, target.as_ref(), start_time, aspect)
        })
    }

    pub fn split(&mut self, clip_id: &str, t: f64) -> ClipstageResult<ClipId> {
        self.edit("split", |snapshot, _, config| {
            split_clip(snapshot, config, clip_id, t)
        })
    }

    pub fn split_at_playhead(&mut self, clip_id: &str) -> ClipstageResult<ClipId> {
        let t = self.engine.time();
        self.split(clip_id, t)
    }

    pub fn duplicate_selection(&mut self) -> ClipstageResult<Vec<ClipId>> {
        let ids = self.selected()?;
        self.edit("duplicate", |snapshot, assets, config| {
            duplicate_clips(snapshot, assets, config, &ids)
        })
    }

    pub fn delete_selection(&mut self) -> ClipstageResult<DeleteOutcome> {
        let ids = self.selected()?;
        self.edit("delete", |snapshot, _, _| Ok(delete_clips(snapshot, &ids)))
    }

    /// Copy the selection to the session clipboard. Returns the clip count.
    pub fn copy_selection(&mut self) -> ClipstageResult<usize> {
        let ids = self.selected()?;
        let clipboard = Clipboard::copy(&self.project.snapshot, &ids)?;
        let count = clipboard.len();
        self.clipboard = Some(clipboard);
        Ok(count)
    }

    /// Paste the clipboard at `at`, or at the playhead.
    pub fn paste(&mut self, at: Option<f64>) -> ClipstageResult<Vec<ClipId>> {
        let clipboard = self
            .clipboard
            .clone()
            .ok_or_else(|| ClipstageError::edit("Clipboard is empty"))?;
        let at = at.unwrap_or_else(|| self.engine.time());
        self.edit("paste", |snapshot, _, config| {
            clipboard.paste(snapshot, config, at)
        })
    }

    /// Remove every clip using `asset_id`, with their dependent subtitles.
    ///
    /// The asset record itself belongs to the asset collaborator and is
    /// kept.
    pub fn remove_asset(&mut self, asset_id: &str) -> ClipstageResult<DeleteOutcome> {
        self.edit("remove_asset", |snapshot, _, _| Ok(remove_asset(snapshot, asset_id)))
    }

    pub fn replace_asset(&mut self, clip_id: &str, asset_id: &str) -> ClipstageResult<()> {
        self.edit("replace_asset", |snapshot, assets, config| {
            replace_asset(snapshot, assets, config, clip_id, asset_id)
        })
    }

    /// Change playback speed. Slider bursts share one undo entry.
    pub fn set_speed(&mut self, clip_id: &str, speed: f64, now_ms: u64) -> ClipstageResult<f64> {
        self.edit_throttled(now_ms, |snapshot, assets, config| {
            set_speed(snapshot, assets, config, clip_id, speed)
        })
    }

    /// Edit a clip's audio/visual settings. Speed is left as is; it
    /// changes duration and goes through [`Editor::set_speed`].
    pub fn update_settings(
        &mut self,
        clip_id: &str,
        now_ms: u64,
        f: impl FnOnce(&mut ClipSettings),
    ) -> ClipstageResult<()> {
        self.edit_throttled(now_ms, |snapshot, _, _| {
            match snapshot.lane_kind_of(clip_id) {
                None => return Err(ClipstageError::clip_not_found(clip_id)),
                Some(LaneKind::Text) => {
                    return Err(ClipstageError::edit(format!(
                        "Text clip {clip_id} has no media settings"
                    )))
                }
                Some(_) => {}
            }
            let settings = snapshot.settings.entry(clip_id.to_string()).or_default();
            let speed = settings.speed;
            f(settings);
            settings.speed = speed;
            settings.volume = settings.volume.clamp(0.0, 2.0);
            Ok(())
        })
    }

    /// Edit a text clip's content or style. Changing a subtitle's text
    /// drops its word timing.
    pub fn update_text(
        &mut self,
        clip_id: &str,
        now_ms: u64,
        f: impl FnOnce(&mut TextClipSettings),
    ) -> ClipstageResult<()> {
        self.edit_throttled(now_ms, |snapshot, _, _| {
            if snapshot.lane_kind_of(clip_id) != Some(LaneKind::Text) {
                return Err(ClipstageError::edit(format!("{clip_id} is not a text clip")));
            }
            let settings = snapshot.text_settings.entry(clip_id.to_string()).or_default();
            f(settings);
            let text = settings.text.clone();
            if let Some(segment) = snapshot.subtitles.get_mut(clip_id) {
                if segment.text != text {
                    segment.text = text;
                    segment.words = None;
                }
            }
            Ok(())
        })
    }

    pub fn reorder_z(&mut self, clip_id: &str, change: ZOrderChange) -> ClipstageResult<i32> {
        self.edit("reorder_z", |snapshot, _, _| reorder_z(snapshot, clip_id, change))
    }

    // Gestures

    /// Start dragging `clip_id`. If it is part of a multi-clip selection the
    /// whole selection moves as a group.
    pub fn begin_drag(&mut self, clip_id: &str) -> ClipstageResult<()> {
        self.ensure_idle()?;
        let snapshot = &self.project.snapshot;
        let ids = if snapshot.selection.contains(clip_id) && snapshot.selection.clip_ids.len() > 1 {
            snapshot.selection.clip_ids.clone()
        } else {
            vec![clip_id.to_string()]
        };
        let session = DragSession::begin(snapshot, &ids, clip_id, snapshot.duration())?;
        self.gesture.begin(GestureKind::Drag, clip_id, snapshot)?;
        self.drag = Some(session);
        Ok(())
    }

    /// Feed a pointer move. Returns the preview to draw, if the pointer is
    /// somewhere a drop is possible.
    pub fn update_drag(&mut self, pointer: DragPointer) -> ClipstageResult<Option<PlacementPreview>> {
        self.gesture.expect(GestureKind::Drag)?;
        let session = self
            .drag
            .as_mut()
            .ok_or_else(|| ClipstageError::placement("No drag in progress"))?;
        Ok(session
            .update(&self.project.snapshot, &self.timeline, pointer)
            .cloned())
    }

    /// Release the drag at its last valid preview.
    pub fn end_drag(&mut self) -> ClipstageResult<CommitOutcome> {
        self.gesture.expect(GestureKind::Drag)?;
        let session = self
            .drag
            .take()
            .ok_or_else(|| ClipstageError::placement("No drag in progress"))?;
        match session.commit(&mut self.project.snapshot) {
            Ok(outcome) => {
                let before = self.gesture.finish(GestureKind::Drag)?;
                if before != self.project.snapshot {
                    self.commit(before);
                }
                Ok(outcome)
            }
            Err(e) => {
                self.gesture.cancel(&mut self.project.snapshot);
                Err(e)
            }
        }
    }

    pub fn begin_trim(
        &mut self,
        clip_id: &str,
        edge: TrimEdge,
        pixels_per_second: f64,
    ) -> ClipstageResult<()> {
        self.ensure_idle()?;
        if self.project.snapshot.clip(clip_id).is_none() {
            return Err(ClipstageError::clip_not_found(clip_id));
        }
        let snapper = trim_snapper(&self.project.snapshot, &self.timeline, clip_id, pixels_per_second);
        self.gesture
            .begin(GestureKind::Trim, clip_id, &self.project.snapshot)?;
        self.trim = Some(TrimState {
            clip_id: clip_id.to_string(),
            edge,
            snapper,
        });
        Ok(())
    }

    /// Move the held edge to `target` (timeline seconds).
    pub fn update_trim(&mut self, target: f64) -> ClipstageResult<TrimOutcome> {
        self.gesture.expect(GestureKind::Trim)?;
        let trim = self
            .trim
            .as_ref()
            .ok_or_else(|| ClipstageError::edit("No trim in progress"))?;
        trim_clip(
            &mut self.project.snapshot,
            &self.project.assets,
            &self.timeline,
            &trim.clip_id,
            trim.edge,
            target,
            Some(&trim.snapper),
        )
    }

    pub fn end_trim(&mut self) -> ClipstageResult<()> {
        let before = self.gesture.finish(GestureKind::Trim)?;
        self.trim = None;
        if before != self.project.snapshot {
            self.commit(before);
        }
        Ok(())
    }

    /// Start moving, scaling or rotating a visual clip on the stage.
    pub fn begin_transform(&mut self, clip_id: &str) -> ClipstageResult<()> {
        self.ensure_idle()?;
        match self.project.snapshot.lane_kind_of(clip_id) {
            None => return Err(ClipstageError::clip_not_found(clip_id)),
            Some(LaneKind::Audio) => {
                return Err(ClipstageError::edit(format!(
                    "Audio clip {clip_id} has no stage transform"
                )))
            }
            Some(_) => {}
        }
        self.gesture
            .begin(GestureKind::Transform, clip_id, &self.project.snapshot)
    }

    /// Apply `op` relative to the transform the clip had at gesture start.
    pub fn update_transform(&mut self, op: TransformOp) -> ClipstageResult<ClipTransform> {
        let clip_id = self.gesture.expect(GestureKind::Transform)?.to_string();
        let origin = self
            .gesture
            .before()
            .and_then(|b| b.transforms.get(&clip_id))
            .copied()
            .unwrap_or_default();
        let transform = op.apply(&origin);
        self.project.snapshot.transforms.insert(clip_id, transform);
        Ok(transform)
    }

    pub fn end_transform(&mut self) -> ClipstageResult<()> {
        let before = self.gesture.finish(GestureKind::Transform)?;
        if before != self.project.snapshot {
            self.commit(before);
        }
        Ok(())
    }

    /// Abort the running gesture and restore the pre-gesture snapshot.
    pub fn cancel_gesture(&mut self) -> Option<GestureKind> {
        self.drag = None;
        self.trim = None;
        let kind = self.gesture.cancel(&mut self.project.snapshot)?;
        self.presenter.invalidate();
        Some(kind)
    }

    // History

    pub fn undo(&mut self) -> ClipstageResult<bool> {
        self.ensure_idle()?;
        let undone = self.history.undo(&mut self.project.snapshot);
        if undone {
            self.after_change();
        }
        Ok(undone)
    }

    pub fn redo(&mut self) -> ClipstageResult<bool> {
        self.ensure_idle()?;
        let redone = self.history.redo(&mut self.project.snapshot);
        if redone {
            self.after_change();
        }
        Ok(redone)
    }

    // Playback

    /// Start a fresh playback loop. Frames must carry the returned token.
    pub fn play(&mut self) -> LoopToken {
        self.engine.play(&self.project.snapshot)
    }

    pub fn pause(&mut self) {
        self.engine.pause();
    }

    pub fn seek(&mut self, t: f64) -> SyncReport {
        self.engine.seek(&self.project.snapshot, t)
    }

    pub fn begin_scrub(&mut self) {
        self.engine.clock_mut().begin_scrub();
    }

    /// Move the playhead while scrubbing; ignored otherwise.
    pub fn scrub_to(&mut self, t: f64) -> Option<SyncReport> {
        if !self.engine.clock().is_scrubbing() {
            return None;
        }
        Some(self.engine.seek(&self.project.snapshot, t))
    }

    pub fn end_scrub(&mut self) {
        self.engine.clock_mut().end_scrub();
    }

    /// Run one animation frame: advance playback, then present subtitles.
    pub fn frame(
        &mut self,
        token: LoopToken,
        now_secs: f64,
        port: &mut dyn PresentationPort,
    ) -> Option<FrameReport> {
        let report = self.engine.frame(&self.project.snapshot, token, now_secs)?;
        self.presenter.tick(&self.project.snapshot, report.time, port);
        Some(report)
    }

    /// Present subtitles at the current time without advancing playback.
    pub fn present(&mut self, port: &mut dyn PresentationPort) -> PresentOutcome {
        let t = self.engine.time();
        self.presenter.tick(&self.project.snapshot, t, port)
    }

    pub fn set_presentation_mode(&mut self, mode: PresentationMode) {
        self.presenter.set_mode(mode);
        self.presenter.invalidate();
    }

    // Transcription

    pub fn transcription_status(&self) -> &TranscriptionStatus {
        self.transcription.status()
    }

    pub fn set_subtitle_style(&mut self, style: TextClipSettings) {
        self.subtitle_style = style;
    }

    /// Start transcribing `source_clip_id`: returns the asset ranges to
    /// request, each within `max_payload_bytes`.
    pub fn begin_transcription(
        &mut self,
        source_clip_id: &str,
        bytes_per_sec: f64,
        max_payload_bytes: u64,
    ) -> ClipstageResult<Vec<ChunkRange>> {
        let timing = ClipTiming::of(&self.project.snapshot, source_clip_id)
            .ok_or_else(|| ClipstageError::clip_not_found(source_clip_id))?;
        let chunks = plan_chunks(
            timing.start_offset,
            timing.asset_end(),
            bytes_per_sec,
            max_payload_bytes,
        )?;
        self.transcription.begin();
        Ok(chunks)
    }

    /// Turn a transcription into subtitle clips linked to `source_clip_id`.
    pub fn apply_transcription(
        &mut self,
        source_clip_id: &str,
        result: &TranscriptionResult,
    ) -> ClipstageResult<Vec<ClipId>> {
        self.ensure_idle()?;
        let before = self.project.snapshot.clone();
        let created = self.transcription.complete(
            &mut self.project.snapshot,
            source_clip_id,
            result,
            &self.subtitle_style,
        )?;
        self.commit(before);
        Ok(created)
    }

    pub fn fail_transcription(&mut self, message: impl Into<String>) {
        self.transcription.fail(message);
    }

    // Export

    pub fn start_export(&mut self, backend: &mut dyn ExportBackend) -> ClipstageResult<String> {
        start_export(backend, &mut self.project)
    }

    pub fn poll_export(&mut self, backend: &mut dyn ExportBackend) -> ClipstageResult<ExportStage> {
        poll_export(backend, &mut self.project.export)
    }

    /// Seek to `t` and pump the host until every visible handle shows its
    /// frame.
    pub fn wait_until_ready(
        &mut self,
        t: f64,
        tolerance_secs: f64,
        max_polls: u32,
        pump: impl FnMut(&mut PlaybackEngine),
    ) -> ClipstageResult<u32> {
        wait_until_ready(
            &mut self.engine,
            &self.project.snapshot,
            t,
            tolerance_secs,
            max_polls,
            pump,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipstage_project_model::clip::AssetKind;

    fn editor() -> Editor {
        let mut project = EditorProjectState::new("Session");
        project
            .assets
            .push(Asset::new("vid", AssetKind::Video, "v.mp4").with_duration(20.0));
        project
            .assets
            .push(Asset::new("aud", AssetKind::Audio, "a.mp3").with_duration(60.0));
        project.assets.push(Asset::new("title", AssetKind::Text, ""));
        Editor::with_defaults(project)
    }

    #[test]
    fn test_edit_records_history() {
        let mut ed = editor();
        let id = ed.drop_asset("vid", None, 0.0).unwrap();
        assert_eq!(ed.snapshot().clips.len(), 1);
        assert!(ed.history().can_undo());

        ed.split(&id, 5.0).unwrap();
        assert_eq!(ed.snapshot().clips.len(), 2);
        assert!(ed.undo().unwrap());
        assert_eq!(ed.snapshot().clips.len(), 1);
        assert!(ed.redo().unwrap());
        assert_eq!(ed.snapshot().clips.len(), 2);
    }

    #[test]
    fn test_failed_edit_leaves_no_history() {
        let mut ed = editor();
        let id = ed.drop_asset("vid", None, 0.0).unwrap();
        let depth = ed.history().undo_depth();
        assert!(ed.split(&id, 0.01).is_err());
        assert_eq!(ed.history().undo_depth(), depth);
    }

    #[test]
    fn test_gesture_blocks_edits_until_done() {
        let mut ed = editor();
        let id = ed.drop_asset("vid", None, 0.0).unwrap();
        ed.begin_trim(&id, TrimEdge::End, 100.0).unwrap();
        assert!(matches!(
            ed.begin_drag(&id),
            Err(ClipstageError::GestureActive { .. })
        ));
        assert!(ed.undo().is_err());

        ed.update_trim(8.0).unwrap();
        assert_eq!(ed.snapshot().clip(&id).unwrap().duration, 8.0);
        ed.end_trim().unwrap();
        assert!(ed.active_gesture().is_none());
        ed.undo().unwrap();
        assert_eq!(ed.snapshot().clip(&id).unwrap().duration, 20.0);
    }

    #[test]
    fn test_cancel_transform_restores() {
        let mut ed = editor();
        let id = ed.drop_asset("vid", None, 0.0).unwrap();
        let before = ed.snapshot().clone();
        ed.begin_transform(&id).unwrap();
        ed.update_transform(TransformOp::Move { dx: 0.1, dy: 0.0 }).unwrap();
        ed.update_transform(TransformOp::Move { dx: 0.2, dy: 0.0 }).unwrap();
        assert_ne!(ed.snapshot(), &before);
        assert_eq!(ed.cancel_gesture(), Some(GestureKind::Transform));
        assert_eq!(ed.snapshot(), &before);
    }

    #[test]
    fn test_audio_has_no_transform() {
        let mut ed = editor();
        let id = ed.drop_asset("aud", None, 0.0).unwrap();
        assert!(ed.begin_transform(&id).is_err());
        assert!(ed.active_gesture().is_none());
    }

    #[test]
    fn test_settings_slider_burst_is_one_undo() {
        let mut ed = editor();
        let id = ed.drop_asset("aud", None, 0.0).unwrap();
        let depth = ed.history().undo_depth();
        for (i, volume) in [0.9, 0.7, 0.5].into_iter().enumerate() {
            ed.update_settings(&id, 10_000 + i as u64 * 50, |s| s.volume = volume)
                .unwrap();
        }
        assert_eq!(ed.history().undo_depth(), depth + 1);
        assert_eq!(ed.snapshot().settings[&id].volume, 0.5);
        ed.undo().unwrap();
        assert_eq!(ed.snapshot().settings[&id].volume, 1.0);
    }

    #[test]
    fn test_split_between_slider_changes_keeps_own_undo() {
        let mut ed = editor();
        let id = ed.drop_asset("vid", None, 0.0).unwrap();
        ed.update_settings(&id, 0, |s| s.volume = 0.8).unwrap();
        let right = ed.split(&id, 5.0).unwrap();
        ed.update_settings(&id, 100, |s| s.volume = 0.3).unwrap();

        ed.undo().unwrap();
        assert_eq!(ed.snapshot().clips.len(), 2);
        assert!(ed.snapshot().clip(&right).is_some());
        assert_eq!(ed.snapshot().settings[&id].volume, 0.8);
    }

    #[test]
    fn test_copy_paste_and_delete() {
        let mut ed = editor();
        let id = ed.drop_asset("vid", None, 0.0).unwrap();
        ed.select(&id, false).unwrap();
        assert_eq!(ed.copy_selection().unwrap(), 1);
        let pasted = ed.paste(Some(30.0)).unwrap();
        assert_eq!(ed.snapshot().lanes.len(), 2);
        assert_eq!(ed.snapshot().selection.clip_ids, pasted);

        let outcome = ed.delete_selection().unwrap();
        assert_eq!(outcome.removed, pasted);
        assert_eq!(ed.snapshot().lanes.len(), 1);
        assert!(ed.check().is_empty());
    }

    #[test]
    fn test_select_at_prefers_text() {
        let mut ed = editor();
        ed.drop_asset("vid", None, 0.0).unwrap();
        let title = ed.drop_asset("title", None, 1.0).unwrap();
        assert_eq!(ed.select_at(2.0), Some(title));
        assert_eq!(ed.select_at(100.0), None);
        assert!(ed.snapshot().selection.is_empty());
    }
}
