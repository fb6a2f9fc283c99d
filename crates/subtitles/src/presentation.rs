//! Imperative subtitle presentation.
//!
//! The presenter runs every playback tick, works out what the subtitle
//! overlay should show, and writes to a [`PresentationPort`] only when
//! that differs from what it wrote last. Beat layouts are cached by the
//! content they were computed from.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use clipstage_playback::stacking::render_order;
use clipstage_project_model::clip::{ClipId, TextClipSettings};
use clipstage_project_model::snapshot::EditorSnapshot;
use clipstage_project_model::subtitle::WordTiming;

use crate::animation::{PopIn, PopInFrame};
use crate::beats::{beat_at, segment_beats, BeatGroup};
use crate::config::{BeatConfig, PresentationMode, PresenterConfig};
use crate::highlight::WordHighlighter;

/// What the overlay shows at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleFrame {
    pub clip_id: ClipId,
    pub text: String,
    pub emphasis: bool,
    /// Beat index in beats mode.
    pub beat: Option<usize>,
    /// Spoken word index in word-highlight mode.
    pub highlight: Option<usize>,
    pub pop: PopInFrame,
    pub style: Option<TextClipSettings>,
}

/// Sink for subtitle frames, bypassing any retained scene graph.
pub trait PresentationPort {
    fn show(&mut self, frame: &SubtitleFrame);

    fn clear(&mut self);
}

/// Beat layouts keyed by the words and limits they were computed from.
///
/// A repeated key overwrites the previous entry.
#[derive(Debug, Default)]
pub struct BeatCache {
    entries: HashMap<u64, Vec<BeatGroup>>,
    capacity: usize,
}

impl BeatCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Content key for a word list under `config`.
    pub fn key(words: &[WordTiming], config: &BeatConfig) -> u64 {
        let mut hasher = DefaultHasher::new();
        for word in words {
            word.start.to_bits().hash(&mut hasher);
            word.end.to_bits().hash(&mut hasher);
            word.word.hash(&mut hasher);
        }
        config.max_words.hash(&mut hasher);
        config.max_span_secs.to_bits().hash(&mut hasher);
        config.long_pause_secs.to_bits().hash(&mut hasher);
        config.emphasis_max_chars.hash(&mut hasher);
        hasher.finish()
    }

    pub fn insert(&mut self, key: u64, beats: Vec<BeatGroup>) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            tracing::debug!(entries = self.entries.len(), "Beat cache full; clearing");
            self.entries.clear();
        }
        self.entries.insert(key, beats);
    }

    /// Beats for `words`, computing them on a miss.
    pub fn beats(&mut self, words: &[WordTiming], config: &BeatConfig) -> &[BeatGroup] {
        let key = Self::key(words, config);
        if !self.entries.contains_key(&key) {
            self.insert(key, segment_beats(words, config));
        }
        self.entries.get(&key).map(Vec::as_slice).unwrap_or_default()
    }
}

/// What a presenter tick did to the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Unchanged,
    Shown,
    Cleared,
}

/// Drives the subtitle overlay from the snapshot and playback time.
#[derive(Debug)]
pub struct SubtitlePresenter {
    config: PresenterConfig,
    pop: PopIn,
    highlighter: WordHighlighter,
    cache: BeatCache,
    last: Option<SubtitleFrame>,
}

const BEAT_CACHE_CAPACITY: usize = 256;

impl SubtitlePresenter {
    pub fn new(config: PresenterConfig) -> Self {
        Self {
            pop: PopIn::new(config.pop_in_secs),
            highlighter: WordHighlighter::new(config.highlight_epsilon_secs),
            cache: BeatCache::new(BEAT_CACHE_CAPACITY),
            config,
            last: None,
        }
    }

    pub fn set_mode(&mut self, mode: PresentationMode) {
        if self.config.mode != mode {
            self.config.mode = mode;
            self.highlighter.reset();
        }
    }

    pub fn cache(&self) -> &BeatCache {
        &self.cache
    }

    /// The frame last written to the port.
    pub fn last_frame(&self) -> Option<&SubtitleFrame> {
        self.last.as_ref()
    }

    /// Compute the frame for `t` and write it if it changed.
    pub fn tick(
        &mut self,
        snapshot: &EditorSnapshot,
        t: f64,
        port: &mut dyn PresentationPort,
    ) -> PresentOutcome {
        let frame = self.frame_at(snapshot, t);
        if frame == self.last {
            return PresentOutcome::Unchanged;
        }
        let outcome = match &frame {
            Some(frame) => {
                port.show(frame);
                PresentOutcome::Shown
            }
            None => {
                port.clear();
                PresentOutcome::Cleared
            }
        };
        self.last = frame;
        outcome
    }

    /// Forget what was written so the next tick writes unconditionally.
    pub fn invalidate(&mut self) {
        self.last = None;
        self.highlighter.reset();
    }

    fn frame_at(&mut self, snapshot: &EditorSnapshot, t: f64) -> Option<SubtitleFrame> {
        let clip_id = render_order(snapshot, t)
            .into_iter()
            .rev()
            .find(|id| snapshot.is_subtitle(id))?;
        let segment = snapshot.subtitles.get(&clip_id)?;
        let style = snapshot.text_settings.get(&clip_id).cloned();

        let words = segment.words.as_deref().filter(|w| !w.is_empty());
        let frame = match (words, self.config.mode) {
            (Some(words), PresentationMode::Beats) => {
                let beats = self.cache.beats(words, &self.config.beats);
                let idx = beat_at(beats, t)?;
                let beat = &beats[idx];
                SubtitleFrame {
                    clip_id,
                    text: beat.text.clone(),
                    emphasis: beat.emphasis,
                    beat: Some(idx),
                    highlight: None,
                    pop: self.pop.frame(t - beat.start),
                    style,
                }
            }
            (Some(words), PresentationMode::WordHighlight) => {
                self.highlighter.update(words, t);
                SubtitleFrame {
                    clip_id,
                    text: segment.text.clone(),
                    emphasis: false,
                    beat: None,
                    highlight: self.highlighter.current(),
                    pop: self.pop.frame(t - segment.start_time),
                    style,
                }
            }
            (None, _) => SubtitleFrame {
                clip_id,
                text: segment.text.clone(),
                emphasis: false,
                beat: None,
                highlight: None,
                pop: self.pop.frame(t - segment.start_time),
                style,
            },
        };
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipstage_project_model::clip::Clip;
    use clipstage_project_model::lane::{Lane, LaneKind};
    use clipstage_project_model::subtitle::SubtitleSegment;

    #[derive(Default)]
    struct RecordingPort {
        shown: Vec<SubtitleFrame>,
        clears: usize,
    }

    impl PresentationPort for RecordingPort {
        fn show(&mut self, frame: &SubtitleFrame) {
            self.shown.push(frame.clone());
        }
        fn clear(&mut self) {
            self.clears += 1;
        }
    }

    fn snapshot() -> EditorSnapshot {
        let mut snap = EditorSnapshot::new();
        snap.lanes = vec![Lane::new("lt", LaneKind::Text)];
        snap.clips.push(Clip::new("s", "t", "lt", 0.0, 3.0));
        let mut seg = SubtitleSegment::new("s", "hello there. big world", 0.0, 3.0);
        seg.words = Some(vec![
            WordTiming::new(0.0, 0.3, "hello"),
            WordTiming::new(0.35, 0.7, "there."),
            WordTiming::new(1.0, 1.3, "big"),
            WordTiming::new(1.35, 1.7, "world"),
        ]);
        snap.subtitles.insert("s".to_string(), seg);
        snap
    }

    #[test]
    fn test_writes_only_on_change() {
        let snap = snapshot();
        let mut presenter = SubtitlePresenter::new(PresenterConfig::default());
        let mut port = RecordingPort::default();

        assert_eq!(presenter.tick(&snap, 0.5, &mut port), PresentOutcome::Shown);
        // Pop-in is over; same beat, same frame.
        assert_eq!(presenter.tick(&snap, 0.6, &mut port), PresentOutcome::Unchanged);
        assert_eq!(port.shown.len(), 1);
        assert_eq!(port.shown[0].text, "hello there.");

        assert_eq!(presenter.tick(&snap, 1.5, &mut port), PresentOutcome::Shown);
        assert_eq!(port.shown[1].text, "big world");

        assert_eq!(presenter.tick(&snap, 5.0, &mut port), PresentOutcome::Cleared);
        assert_eq!(port.clears, 1);
    }

    #[test]
    fn test_highlight_mode_shows_full_text() {
        let snap = snapshot();
        let mut presenter = SubtitlePresenter::new(PresenterConfig::default());
        presenter.set_mode(PresentationMode::WordHighlight);
        let mut port = RecordingPort::default();
        presenter.tick(&snap, 1.1, &mut port);
        let frame = presenter.last_frame().unwrap();
        assert_eq!(frame.text, "hello there. big world");
        assert_eq!(frame.highlight, Some(2));
    }

    #[test]
    fn test_cache_is_content_keyed() {
        let snap = snapshot();
        let mut presenter = SubtitlePresenter::new(PresenterConfig::default());
        let mut port = RecordingPort::default();
        presenter.tick(&snap, 0.5, &mut port);
        presenter.tick(&snap, 1.5, &mut port);
        assert_eq!(presenter.cache().len(), 1);
    }
}
