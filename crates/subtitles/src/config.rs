//! Typed subtitle configuration.

use clipstage_common::config::SubtitleDefaults;

/// Beat segmentation limits.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatConfig {
    /// Most words in one beat.
    pub max_words: usize,
    /// Longest span of one beat, first word start to last word end.
    pub max_span_secs: f64,
    /// A gap at least this long always starts a new beat.
    pub long_pause_secs: f64,
    /// Longest ALL-CAPS token treated as emphasis.
    pub emphasis_max_chars: usize,
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self::from(&SubtitleDefaults::default())
    }
}

impl From<&SubtitleDefaults> for BeatConfig {
    fn from(defaults: &SubtitleDefaults) -> Self {
        Self {
            max_words: defaults.max_words.max(1),
            max_span_secs: defaults.max_span_secs,
            long_pause_secs: defaults.long_pause_secs,
            emphasis_max_chars: defaults.emphasis_max_chars,
        }
    }
}

/// How the presenter renders a segment that has word timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentationMode {
    /// Show one beat at a time with a pop-in.
    #[default]
    Beats,
    /// Show the whole segment and highlight the spoken word.
    WordHighlight,
}

/// Presenter configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenterConfig {
    pub beats: BeatConfig,
    pub mode: PresentationMode,
    pub pop_in_secs: f64,
    pub highlight_epsilon_secs: f64,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self::from(&SubtitleDefaults::default())
    }
}

impl From<&SubtitleDefaults> for PresenterConfig {
    fn from(defaults: &SubtitleDefaults) -> Self {
        Self {
            beats: BeatConfig::from(defaults),
            mode: PresentationMode::default(),
            pop_in_secs: defaults.pop_in_secs,
            highlight_epsilon_secs: defaults.highlight_epsilon_secs,
        }
    }
}
