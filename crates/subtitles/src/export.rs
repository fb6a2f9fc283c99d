//! Subtitle file output in SRT and WebVTT formats.

use std::path::Path;

use serde::Serialize;

use clipstage_common::error::ClipstageResult;
use clipstage_project_model::snapshot::EditorSnapshot;

/// One timed caption in timeline seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleCue {
    pub start_secs: f64,
    pub end_secs: f64,
    pub text: String,
}

/// Subtitle segments of `snapshot` as cues, in timeline order.
///
/// Segments whose clip no longer exists or whose text is blank are skipped.
pub fn cues_from_snapshot(snapshot: &EditorSnapshot) -> Vec<SubtitleCue> {
    let mut cues: Vec<SubtitleCue> = snapshot
        .subtitles
        .values()
        .filter(|s| snapshot.clip(&s.clip_id).is_some())
        .filter(|s| !s.text.trim().is_empty())
        .map(|s| SubtitleCue {
            start_secs: s.start_time,
            end_secs: s.end_time,
            text: s.text.trim().to_string(),
        })
        .collect();
    cues.sort_by(|a, b| {
        a.start_secs
            .total_cmp(&b.start_secs)
            .then_with(|| a.end_secs.total_cmp(&b.end_secs))
    });
    cues
}

/// Generate SRT content from cues.
pub fn generate_srt(cues: &[SubtitleCue]) -> String {
    let mut output = String::new();

    for (i, cue) in cues.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_time(cue.start_secs),
            format_srt_time(cue.end_secs),
        ));
        output.push_str(&cue.text);
        output.push_str("\n\n");
    }

    output
}

/// Generate WebVTT content from cues.
pub fn generate_vtt(cues: &[SubtitleCue]) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for cue in cues {
        output.push_str(&format!(
            "{} --> {}\n",
            format_vtt_time(cue.start_secs),
            format_vtt_time(cue.end_secs),
        ));
        output.push_str(&cue.text);
        output.push_str("\n\n");
    }

    output
}

fn split_millis(secs: f64) -> (u64, u64, u64, u64) {
    let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
    (
        total_ms / 3_600_000,
        (total_ms % 3_600_000) / 60_000,
        (total_ms % 60_000) / 1000,
        total_ms % 1000,
    )
}

/// Format seconds as SRT timestamp: HH:MM:SS,mmm
fn format_srt_time(secs: f64) -> String {
    let (hours, minutes, seconds, millis) = split_millis(secs);
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// Format seconds as VTT timestamp: HH:MM:SS.mmm
fn format_vtt_time(secs: f64) -> String {
    let (hours, minutes, seconds, millis) = split_millis(secs);
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Save cues to `path`, choosing the format by extension (SRT by default).
pub fn save_subtitles(cues: &[SubtitleCue], path: &Path) -> ClipstageResult<()> {
    let content = match path.extension().and_then(|e| e.to_str()) {
        Some("vtt") => generate_vtt(cues),
        _ => generate_srt(cues),
    };
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), cues = cues.len(), "Subtitles written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipstage_project_model::clip::Clip;
    use clipstage_project_model::lane::{Lane, LaneKind};
    use clipstage_project_model::subtitle::SubtitleSegment;

    fn cue(start: f64, end: f64, text: &str) -> SubtitleCue {
        SubtitleCue {
            start_secs: start,
            end_secs: end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_srt_generation() {
        let cues = vec![cue(0.0, 2.5, "Hello world"), cue(3.0, 5.0, "This is a test")];
        let srt = generate_srt(&cues);
        assert!(srt.contains("1\n00:00:00,000 --> 00:00:02,500\nHello world"));
        assert!(srt.contains("2\n00:00:03,000 --> 00:00:05,000\nThis is a test"));
    }

    #[test]
    fn test_vtt_generation() {
        let vtt = generate_vtt(&[cue(61.5, 63.0, "One minute in")]);
        assert!(vtt.starts_with("WEBVTT\n"));
        assert!(vtt.contains("00:01:01.500 --> 00:01:03.000"));
    }

    #[test]
    fn test_time_formatting() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(3661.5), "01:01:01,500");
        assert_eq!(format_vtt_time(3661.5), "01:01:01.500");
        assert_eq!(format_srt_time(0.1 + 0.2), "00:00:00,300");
        assert_eq!(format_srt_time(-1.0), "00:00:00,000");
    }

    #[test]
    fn test_cues_follow_timeline_order() {
        let mut snap = EditorSnapshot::new();
        snap.lanes = vec![Lane::new("lt", LaneKind::Text)];
        snap.clips.push(Clip::new("b", "subtitle", "lt", 5.0, 1.0));
        snap.clips.push(Clip::new("a", "subtitle", "lt", 1.0, 1.0));
        snap.subtitles
            .insert("b".to_string(), SubtitleSegment::new("b", "second", 5.0, 6.0));
        snap.subtitles
            .insert("a".to_string(), SubtitleSegment::new("a", " first ", 1.0, 2.0));
        snap.subtitles
            .insert("gone".to_string(), SubtitleSegment::new("gone", "orphan", 0.0, 1.0));

        let cues = cues_from_snapshot(&snap);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "first");
        assert_eq!(cues[1].text, "second");
    }

    #[test]
    fn test_save_by_extension() {
        let dir = std::env::temp_dir().join("clipstage_subtitle_export");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.vtt");
        save_subtitles(&[cue(0.0, 1.0, "hi")], &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("WEBVTT"));
        std::fs::remove_file(&path).ok();
    }
}
