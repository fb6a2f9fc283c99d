//! Clipstage Subtitles
//!
//! Word-timed captions from transcript to screen:
//! - **Beats:** Segment word timings into short on-screen groups
//! - **Animation:** Pop-in easing for each freshly shown beat
//! - **Highlight:** Track the spoken word in full-segment mode
//! - **Presentation:** Write frames to a port only when they change
//! - **Transcript:** Chunk, offset and materialize transcription results
//! - **Export:** SRT/VTT output from subtitle segments

pub mod animation;
pub mod beats;
pub mod config;
pub mod export;
pub mod highlight;
pub mod presentation;
pub mod transcript;

pub use animation::{PopIn, PopInFrame};
pub use beats::{beat_at, segment_beats, BeatGroup};
pub use config::{BeatConfig, PresentationMode, PresenterConfig};
pub use export::{cues_from_snapshot, generate_srt, generate_vtt, save_subtitles, SubtitleCue};
pub use highlight::WordHighlighter;
pub use presentation::{PresentOutcome, PresentationPort, SubtitleFrame, SubtitlePresenter};
pub use transcript::{Transcription, TranscriptionResult, TranscriptionStatus};
