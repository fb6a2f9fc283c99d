//! Show subtitle beat segmentation.

use std::path::PathBuf;

use serde::Serialize;

use clipstage_common::config::AppConfig;
use clipstage_project_model::project::EditorProjectState;
use clipstage_subtitles::{segment_beats, BeatConfig, BeatGroup};

#[derive(Serialize)]
struct SegmentBeats<'a> {
    clip_id: &'a str,
    text: &'a str,
    beats: Vec<BeatGroup>,
}

pub fn run(
    path: PathBuf,
    clip: Option<String>,
    json: bool,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let state =
        EditorProjectState::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    let beat_config = BeatConfig::from(&config.subtitles);

    let mut segments: Vec<_> = state
        .snapshot
        .subtitles
        .values()
        .filter(|s| clip.as_deref().map_or(true, |id| s.clip_id == id))
        .collect();
    if let Some(id) = &clip {
        if segments.is_empty() {
            return Err(anyhow::anyhow!("No subtitle clip {id}"));
        }
    }
    segments.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    let report: Vec<SegmentBeats> = segments
        .iter()
        .map(|s| SegmentBeats {
            clip_id: &s.clip_id,
            text: &s.text,
            beats: s
                .words
                .as_deref()
                .map(|words| segment_beats(words, &beat_config))
                .unwrap_or_default(),
        })
        .collect();
    tracing::debug!(segments = report.len(), "Beats computed");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for segment in &report {
        println!("{}: \"{}\"", segment.clip_id, segment.text);
        if segment.beats.is_empty() {
            println!("  (no word timing)");
        }
        for beat in &segment.beats {
            let marker = if beat.emphasis { " *" } else { "" };
            println!(
                "  {:>7.2}s - {:>7.2}s  {}{}",
                beat.start, beat.end, beat.text, marker
            );
        }
    }
    Ok(())
}
