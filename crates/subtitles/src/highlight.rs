//! Word highlight mode: which word is being spoken.

use clipstage_project_model::subtitle::WordTiming;

/// Tracks the spoken word and reports only when it changes.
#[derive(Debug, Clone)]
pub struct WordHighlighter {
    epsilon_secs: f64,
    current: Option<usize>,
}

impl WordHighlighter {
    pub fn new(epsilon_secs: f64) -> Self {
        Self {
            epsilon_secs,
            current: None,
        }
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Index of the word spoken at `t`, widened by the epsilon window.
    pub fn locate(&self, words: &[WordTiming], t: f64) -> Option<usize> {
        words
            .iter()
            .position(|w| t >= w.start - self.epsilon_secs && t < w.end + self.epsilon_secs)
    }

    /// Update for time `t`. Returns `Some(new_index)` only on change.
    pub fn update(&mut self, words: &[WordTiming], t: f64) -> Option<Option<usize>> {
        let index = self.locate(words, t);
        if index == self.current {
            return None;
        }
        self.current = index;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words() -> Vec<WordTiming> {
        vec![
            WordTiming::new(0.0, 0.4, "one"),
            WordTiming::new(0.5, 0.9, "two"),
            WordTiming::new(1.0, 1.4, "three"),
        ]
    }

    #[test]
    fn test_reports_only_on_change() {
        let mut hl = WordHighlighter::new(0.03);
        assert_eq!(hl.update(&words(), 0.1), Some(Some(0)));
        assert_eq!(hl.update(&words(), 0.2), None);
        assert_eq!(hl.update(&words(), 0.6), Some(Some(1)));
        assert_eq!(hl.update(&words(), 0.45), Some(None));
    }

    #[test]
    fn test_epsilon_window() {
        let hl = WordHighlighter::new(0.03);
        assert_eq!(hl.locate(&words(), 0.48), Some(1));
        assert_eq!(hl.locate(&words(), 0.42), Some(0));
        assert_eq!(hl.locate(&words(), 0.45), None);
    }
}
