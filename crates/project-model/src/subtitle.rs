//! Subtitle segments and word-level timing.
//!
//! Segment and word times are timeline seconds. A segment optionally
//! points at the audio/video clip it was transcribed from so the two can
//! move together.

use serde::{Deserialize, Serialize};

use crate::clip::ClipId;

/// A single spoken word with timeline timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub start: f64,
    pub end: f64,
    pub word: String,
}

impl WordTiming {
    pub fn new(start: f64, end: f64, word: impl Into<String>) -> Self {
        Self {
            start,
            end,
            word: word.into(),
        }
    }
}

/// Subtitle content attached to a text clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleSegment {
    /// The text clip displaying this segment.
    pub clip_id: ClipId,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    /// Clip this segment was transcribed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_clip_id: Option<ClipId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<WordTiming>>,
}

impl SubtitleSegment {
    pub fn new(clip_id: impl Into<ClipId>, text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            clip_id: clip_id.into(),
            text: text.into(),
            start_time: start,
            end_time: end,
            source_clip_id: None,
            words: None,
        }
    }

    /// Move the segment (and its words) by `delta` seconds.
    pub fn shift(&mut self, delta: f64) {
        self.start_time += delta;
        self.end_time += delta;
        if let Some(words) = self.words.as_mut() {
            for word in words {
                word.start += delta;
                word.end += delta;
            }
        }
    }

    /// Narrow the segment to `[start, end)`.
    ///
    /// Words wholly outside the span are dropped and the rest are clamped
    /// to it. Text is rebuilt when word timing exists.
    pub fn trim_to(&mut self, start: f64, end: f64) {
        self.start_time = start;
        self.end_time = end;
        if let Some(words) = self.words.as_mut() {
            words.retain(|w| w.end > start && w.start < end);
            for word in words.iter_mut() {
                word.start = word.start.max(start);
                word.end = word.end.min(end);
            }
            self.text = join_words(words);
        }
    }

    /// Partition the segment at time `t`.
    ///
    /// Words starting before `t` stay left. Text is rebuilt from words
    /// when word timing exists; otherwise both halves keep the full text.
    pub fn split_at(&self, t: f64, right_clip_id: impl Into<ClipId>) -> (Self, Self) {
        let mut left = self.clone();
        let mut right = self.clone();
        right.clip_id = right_clip_id.into();
        left.end_time = t;
        right.start_time = t;

        if let Some(words) = &self.words {
            let (before, after): (Vec<WordTiming>, Vec<WordTiming>) =
                words.iter().cloned().partition(|w| w.start < t);
            left.text = join_words(&before);
            right.text = join_words(&after);
            left.words = Some(before);
            right.words = Some(after);
        }
        (left, right)
    }
}

/// Join word tokens with single spaces.
pub fn join_words(words: &[WordTiming]) -> String {
    words
        .iter()
        .map(|w| w.word.trim())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
