//! Transcription ingest.
//!
//! A transcription service returns `{start, end, text}` entries relative to
//! the asset it listened to. Ingest chunks the requested source range to
//! respect a payload limit, moves the entries onto the timeline through the
//! source clip's mapping, and materializes them as subtitle clips linked to
//! that source.
//!
//! Failures never touch existing subtitles; they only move the status to
//! [`TranscriptionStatus::Error`].

use serde::{Deserialize, Serialize};

use clipstage_common::error::{ClipstageError, ClipstageResult};
use clipstage_playback::mapping::ClipTiming;
use clipstage_project_model::clip::{Clip, ClipId, TextClipSettings};
use clipstage_project_model::lane::LaneKind;
use clipstage_project_model::snapshot::EditorSnapshot;
use clipstage_project_model::subtitle::{join_words, SubtitleSegment, WordTiming};
use clipstage_timeline::editing::delete_clips;
use clipstage_timeline::lanes::{create_lane, zone_bounds};

use crate::beats::ends_sentence;

/// Asset id carried by subtitle clips; they have no backing media.
pub const SUBTITLE_ASSET_ID: &str = "subtitle";

/// Progress of a transcription request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum TranscriptionStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error {
        message: String,
    },
}

/// One transcribed span, in asset seconds unless stated otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl TranscriptEntry {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// What the transcription collaborator returns: segments, words, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    #[serde(default)]
    pub segments: Vec<TranscriptEntry>,
    #[serde(default)]
    pub words: Vec<TranscriptEntry>,
}

impl TranscriptionResult {
    pub fn from_json(json: &str) -> ClipstageResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.words.is_empty()
    }

    /// Append a chunk's result, rebasing it from chunk to asset time.
    pub fn extend_from_chunk(&mut self, chunk: &ChunkRange, result: TranscriptionResult) {
        self.segments.extend(chunk.rebase(result.segments));
        self.words.extend(chunk.rebase(result.words));
    }
}

/// A slice of the source range small enough for one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChunkRange {
    pub start: f64,
    pub end: f64,
}

impl ChunkRange {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Shift chunk-relative entries to asset time.
    pub fn rebase(&self, entries: Vec<TranscriptEntry>) -> Vec<TranscriptEntry> {
        entries
            .into_iter()
            .map(|e| TranscriptEntry::new(e.start + self.start, e.end + self.start, e.text))
            .collect()
    }
}

/// Split `[range_start, range_end)` into chunks whose encoded size stays
/// under `max_payload_bytes` at `bytes_per_sec`.
pub fn plan_chunks(
    range_start: f64,
    range_end: f64,
    bytes_per_sec: f64,
    max_payload_bytes: u64,
) -> ClipstageResult<Vec<ChunkRange>> {
    if !(bytes_per_sec.is_finite() && bytes_per_sec > 0.0) {
        return Err(ClipstageError::subtitle(format!(
            "Invalid source bitrate: {bytes_per_sec} bytes/s"
        )));
    }
    let chunk_secs = max_payload_bytes as f64 / bytes_per_sec;
    if chunk_secs <= 0.0 {
        return Err(ClipstageError::subtitle("Payload limit too small for any audio"));
    }

    let mut chunks = Vec::new();
    let mut start = range_start.max(0.0);
    while start < range_end {
        let end = (start + chunk_secs).min(range_end);
        chunks.push(ChunkRange { start, end });
        start = end;
    }
    tracing::debug!(
        chunks = chunks.len(),
        chunk_secs,
        "Transcription range planned"
    );
    Ok(chunks)
}

/// Move asset-relative entries onto the timeline via `timing`.
///
/// Entries are clipped to the part of the asset the clip shows; entries
/// entirely outside it are dropped.
pub fn offset_entries(entries: &[TranscriptEntry], timing: &ClipTiming) -> Vec<TranscriptEntry> {
    let asset_start = timing.start_offset;
    let asset_end = timing.asset_end();
    entries
        .iter()
        .filter_map(|entry| {
            let start = entry.start.max(asset_start);
            let end = entry.end.min(asset_end);
            if end <= start {
                return None;
            }
            Some(TranscriptEntry::new(
                timing.asset_to_timeline(start),
                timing.asset_to_timeline(end),
                entry.text.trim(),
            ))
        })
        .collect()
}

/// Timeline segments with the words spoken inside each.
fn assemble(
    segments: Vec<TranscriptEntry>,
    words: Vec<TranscriptEntry>,
) -> Vec<(TranscriptEntry, Vec<WordTiming>)> {
    let words: Vec<WordTiming> = words
        .into_iter()
        .filter(|w| !w.text.is_empty())
        .map(|w| WordTiming::new(w.start, w.end, w.text))
        .collect();

    if segments.is_empty() {
        return sentences(words);
    }

    let count = segments.len();
    let mut assembled: Vec<(TranscriptEntry, Vec<WordTiming>)> =
        segments.into_iter().map(|s| (s, Vec::new())).collect();
    for word in words {
        let slot = assembled.iter().position(|(seg, _)| {
            word.start >= seg.start && word.start < seg.end
        });
        let slot = slot.or_else(|| {
            let (last, _) = &assembled[count - 1];
            (word.start >= last.start && word.start <= last.end).then_some(count - 1)
        });
        if let Some(slot) = slot {
            assembled[slot].1.push(word);
        }
    }
    assembled
}

/// Word-only results: one segment per sentence.
fn sentences(words: Vec<WordTiming>) -> Vec<(TranscriptEntry, Vec<WordTiming>)> {
    let mut out = Vec::new();
    let mut current: Vec<WordTiming> = Vec::new();
    for word in words {
        let closes = ends_sentence(&word.word);
        current.push(word);
        if closes {
            out.push(sentence_entry(std::mem::take(&mut current)));
        }
    }
    if !current.is_empty() {
        out.push(sentence_entry(current));
    }
    out
}

fn sentence_entry(words: Vec<WordTiming>) -> (TranscriptEntry, Vec<WordTiming>) {
    let start = words.first().map(|w| w.start).unwrap_or_default();
    let end = words.iter().map(|w| w.end).fold(start, f64::max);
    (TranscriptEntry::new(start, end, join_words(&words)), words)
}

/// Replace the subtitles transcribed from `source_clip_id` with `result`.
///
/// New subtitle clips land on a fresh text lane at the top of the text
/// zone. Returns the created clip ids in time order.
pub fn build_segments(
    snapshot: &mut EditorSnapshot,
    source_clip_id: &str,
    result: &TranscriptionResult,
    style: &TextClipSettings,
) -> ClipstageResult<Vec<ClipId>> {
    let timing = ClipTiming::of(snapshot, source_clip_id)
        .ok_or_else(|| ClipstageError::clip_not_found(source_clip_id))?;
    let kind = snapshot
        .lane_kind_of(source_clip_id)
        .ok_or_else(|| ClipstageError::clip_not_found(source_clip_id))?;
    if kind == LaneKind::Text {
        return Err(ClipstageError::subtitle(format!(
            "Clip {source_clip_id} has no audio to transcribe"
        )));
    }

    let mut segments = offset_entries(&result.segments, &timing);
    segments.retain(|s| !s.text.is_empty());
    segments.sort_by(|a, b| a.start.total_cmp(&b.start));
    let words = offset_entries(&result.words, &timing);
    let assembled = assemble(segments, words);

    let previous = snapshot.dependent_subtitles(source_clip_id);
    if !previous.is_empty() {
        delete_clips(snapshot, &previous);
    }
    if assembled.is_empty() {
        return Ok(Vec::new());
    }

    let (lo, _) = zone_bounds(&snapshot.lanes, LaneKind::Text);
    let lane_id = create_lane(snapshot, LaneKind::Text, lo);

    let mut created = Vec::with_capacity(assembled.len());
    for (entry, words) in assembled {
        let id = snapshot.allocate_id("clip");
        snapshot.clips.push(Clip::new(
            id.clone(),
            SUBTITLE_ASSET_ID,
            lane_id.clone(),
            entry.start,
            entry.end - entry.start,
        ));
        let mut segment = SubtitleSegment::new(id.clone(), entry.text.clone(), entry.start, entry.end);
        segment.source_clip_id = Some(source_clip_id.to_string());
        segment.words = (!words.is_empty()).then_some(words);
        snapshot.subtitles.insert(id.clone(), segment);
        snapshot.text_settings.insert(
            id.clone(),
            TextClipSettings {
                text: entry.text,
                ..style.clone()
            },
        );
        created.push(id);
    }

    tracing::info!(
        source = %source_clip_id,
        segments = created.len(),
        replaced = previous.len(),
        "Subtitles built from transcript"
    );
    Ok(created)
}

/// Tracks one transcription request and applies its outcome.
#[derive(Debug, Clone, Default)]
pub struct Transcription {
    status: TranscriptionStatus,
}

impl Transcription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &TranscriptionStatus {
        &self.status
    }

    pub fn begin(&mut self) {
        self.status = TranscriptionStatus::Loading;
    }

    /// Record a collaborator failure.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "Transcription failed");
        self.status = TranscriptionStatus::Error { message };
    }

    /// Apply `result` to `snapshot`. On error the snapshot is unchanged.
    pub fn complete(
        &mut self,
        snapshot: &mut EditorSnapshot,
        source_clip_id: &str,
        result: &TranscriptionResult,
        style: &TextClipSettings,
    ) -> ClipstageResult<Vec<ClipId>> {
        let mut staged = snapshot.clone();
        match build_segments(&mut staged, source_clip_id, result, style) {
            Ok(created) => {
                *snapshot = staged;
                self.status = TranscriptionStatus::Ready;
                Ok(created)
            }
            Err(e) => {
                self.fail(e.to_string());
                Err(e)
            }
        }
    }
}
