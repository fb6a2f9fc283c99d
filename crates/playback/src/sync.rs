//! Keeping independently buffered media handles in step with the clock.
//!
//! One handle exists per timed clip. Each sync pass:
//! - pauses handles whose clip is not under the playhead
//! - seeks visible handles when the clock is idle or just jumped
//! - lets visible handles run freely while playing, seeking only when
//!   they stray beyond `seek_epsilon_secs`

use std::collections::BTreeMap;

use clipstage_project_model::clip::ClipId;
use clipstage_project_model::snapshot::EditorSnapshot;

use crate::mapping::ClipTiming;

/// The contract a media element (video or audio) exposes to the engine.
///
/// Times are asset seconds.
pub trait PlaybackHandle {
    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, t: f64);

    /// Native duration, once known.
    fn duration(&self) -> Option<f64>;

    fn set_playback_rate(&mut self, rate: f64);

    fn play(&mut self);

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    /// Whether a seek is still in flight.
    fn is_seeking(&self) -> bool {
        false
    }
}

/// Handles keyed by the clip they play.
#[derive(Default)]
pub struct HandleRegistry {
    handles: BTreeMap<ClipId, Box<dyn PlaybackHandle>>,
}

impl std::fmt::Debug for HandleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("clips", &self.handles.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handle for `clip_id`, replacing any previous one.
    pub fn register(&mut self, clip_id: impl Into<ClipId>, handle: Box<dyn PlaybackHandle>) {
        let clip_id = clip_id.into();
        tracing::debug!(clip_id = %clip_id, "Playback handle registered");
        self.handles.insert(clip_id, handle);
    }

    pub fn unregister(&mut self, clip_id: &str) -> Option<Box<dyn PlaybackHandle>> {
        self.handles.remove(clip_id)
    }

    pub fn get(&self, clip_id: &str) -> Option<&dyn PlaybackHandle> {
        self.handles.get(clip_id).map(|h| h.as_ref())
    }

    pub fn get_mut(&mut self, clip_id: &str) -> Option<&mut (dyn PlaybackHandle + 'static)> {
        self.handles.get_mut(clip_id).map(|h| h.as_mut())
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Pause and drop handles whose clip no longer exists.
    pub fn prune(&mut self, snapshot: &EditorSnapshot) -> Vec<ClipId> {
        let stale: Vec<ClipId> = self
            .handles
            .keys()
            .filter(|id| snapshot.clip(id).is_none())
            .cloned()
            .collect();
        for id in &stale {
            if let Some(mut handle) = self.handles.remove(id) {
                handle.pause();
            }
        }
        stale
    }

    /// Pause every handle.
    pub fn pause_all(&mut self) {
        for handle in self.handles.values_mut() {
            if !handle.is_paused() {
                handle.pause();
            }
        }
    }
}

/// What one sync pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub seeked: Vec<ClipId>,
    pub started: Vec<ClipId>,
    pub paused: Vec<ClipId>,
}

impl SyncReport {
    pub fn is_quiet(&self) -> bool {
        self.seeked.is_empty() && self.started.is_empty() && self.paused.is_empty()
    }
}

/// Drives handles toward the clock each frame.
#[derive(Debug, Clone)]
pub struct MediaSync {
    seek_epsilon_secs: f64,
}

/// Seeks closer than this are skipped when idle.
const SEEK_TOLERANCE_SECS: f64 = 1e-3;

impl MediaSync {
    pub fn new(seek_epsilon_secs: f64) -> Self {
        Self { seek_epsilon_secs }
    }

    /// Bring every registered handle in line with timeline time `t`.
    pub fn sync(
        &self,
        registry: &mut HandleRegistry,
        snapshot: &EditorSnapshot,
        t: f64,
        playing: bool,
        discontinuity: bool,
    ) -> SyncReport {
        let mut report = SyncReport::default();

        for (clip_id, handle) in registry.handles.iter_mut() {
            let visible = snapshot.clip(clip_id).is_some_and(|c| c.contains(t));
            let timing = ClipTiming::of(snapshot, clip_id);

            let Some(timing) = timing.filter(|_| visible) else {
                if !handle.is_paused() {
                    handle.pause();
                    report.paused.push(clip_id.clone());
                }
                continue;
            };

            let target = timing.timeline_to_asset(t);
            let target = match handle.duration() {
                Some(duration) if duration.is_finite() => target.min(duration),
                _ => target,
            };
            let error = (handle.current_time() - target).abs();

            if !playing || discontinuity {
                if error > SEEK_TOLERANCE_SECS {
                    handle.set_current_time(target);
                    report.seeked.push(clip_id.clone());
                }
                if !playing && !handle.is_paused() {
                    handle.pause();
                    report.paused.push(clip_id.clone());
                }
            } else if handle.is_paused() {
                if error > SEEK_TOLERANCE_SECS {
                    handle.set_current_time(target);
                    report.seeked.push(clip_id.clone());
                }
            } else if error > self.seek_epsilon_secs && !handle.is_seeking() {
                tracing::debug!(clip_id = %clip_id, error, "Handle strayed; seeking");
                handle.set_current_time(target);
                report.seeked.push(clip_id.clone());
            }

            if playing {
                handle.set_playback_rate(timing.speed);
                if handle.is_paused() {
                    handle.play();
                    report.started.push(clip_id.clone());
                }
            }
        }

        report
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::PlaybackHandle;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shared-state fake so tests can inspect a handle after boxing it.
    #[derive(Debug, Default)]
    pub struct FakeState {
        pub time: f64,
        pub rate: f64,
        pub paused: bool,
        pub seeks: usize,
    }

    pub struct FakeHandle(pub Rc<RefCell<FakeState>>);

    impl FakeHandle {
        pub fn pair() -> (Self, Rc<RefCell<FakeState>>) {
            let state = Rc::new(RefCell::new(FakeState {
                rate: 1.0,
                paused: true,
                ..Default::default()
            }));
            (Self(state.clone()), state)
        }
    }

    impl PlaybackHandle for FakeHandle {
        fn current_time(&self) -> f64 {
            self.0.borrow().time
        }
        fn set_current_time(&mut self, t: f64) {
            let mut s = self.0.borrow_mut();
            s.time = t;
            s.seeks += 1;
        }
        fn duration(&self) -> Option<f64> {
            None
        }
        fn set_playback_rate(&mut self, rate: f64) {
            self.0.borrow_mut().rate = rate;
        }
        fn play(&mut self) {
            self.0.borrow_mut().paused = false;
        }
        fn pause(&mut self) {
            self.0.borrow_mut().paused = true;
        }
        fn is_paused(&self) -> bool {
            self.0.borrow().paused
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeHandle;
    use super::*;
    use clipstage_project_model::clip::{Clip, ClipSettings};
    use clipstage_project_model::lane::{Lane, LaneKind};

    fn snapshot() -> EditorSnapshot {
        let mut snap = EditorSnapshot::new();
        snap.lanes = vec![Lane::new("lv", LaneKind::Video)];
        snap.clips.push(Clip::new("a", "x", "lv", 0.0, 10.0));
        snap.clips.push(Clip::new("b", "x", "lv", 10.0, 10.0));
        snap.settings.insert(
            "a".to_string(),
            ClipSettings {
                speed: 2.0,
                ..Default::default()
            },
        );
        snap
    }

    #[test]
    fn test_idle_sync_seeks_visible_and_pauses_hidden() {
        let snap = snapshot();
        let mut registry = HandleRegistry::new();
        let (a, a_state) = FakeHandle::pair();
        let (b, b_state) = FakeHandle::pair();
        registry.register("a", Box::new(a));
        registry.register("b", Box::new(b));
        b_state.borrow_mut().paused = false;

        let report = MediaSync::new(0.15).sync(&mut registry, &snap, 4.0, false, false);
        assert_eq!(report.seeked, vec!["a".to_string()]);
        assert_eq!(report.paused, vec!["b".to_string()]);
        assert!((a_state.borrow().time - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_playing_handles_run_freely_within_epsilon() {
        let snap = snapshot();
        let mut registry = HandleRegistry::new();
        let (a, a_state) = FakeHandle::pair();
        registry.register("a", Box::new(a));
        let sync = MediaSync::new(0.15);

        let report = sync.sync(&mut registry, &snap, 4.0, true, true);
        assert_eq!(report.started, vec!["a".to_string()]);
        assert_eq!(a_state.borrow().rate, 2.0);
        let seeks = a_state.borrow().seeks;

        // Handle slightly behind: left alone.
        a_state.borrow_mut().time = 8.1;
        sync.sync(&mut registry, &snap, 4.1, true, false);
        assert_eq!(a_state.borrow().seeks, seeks);

        // Far behind: seeked.
        a_state.borrow_mut().time = 7.0;
        sync.sync(&mut registry, &snap, 4.1, true, false);
        assert_eq!(a_state.borrow().seeks, seeks + 1);
    }

    #[test]
    fn test_prune_drops_removed_clips() {
        let mut snap = snapshot();
        let mut registry = HandleRegistry::new();
        registry.register("a", Box::new(FakeHandle::pair().0));
        registry.register("gone", Box::new(FakeHandle::pair().0));
        snap.clips.retain(|c| c.id != "b");
        assert_eq!(registry.prune(&snap), vec!["gone".to_string()]);
        assert_eq!(registry.len(), 1);
    }
}
