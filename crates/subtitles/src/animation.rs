//! Pop-in animation for a freshly shown beat.

use serde::Serialize;

/// Visual state of a subtitle at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PopInFrame {
    pub opacity: f64,
    /// Vertical offset in stage pixels; positive is below the rest position.
    pub translate_y: f64,
    pub scale: f64,
}

impl PopInFrame {
    /// Fully settled.
    pub const REST: Self = Self {
        opacity: 1.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    pub fn is_settled(&self) -> bool {
        *self == Self::REST
    }
}

/// Eased opacity/translate/scale driven by seconds since the beat began.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopIn {
    pub duration_secs: f64,
    pub start_translate_y: f64,
    pub start_scale: f64,
}

impl PopIn {
    pub fn new(duration_secs: f64) -> Self {
        Self {
            duration_secs,
            start_translate_y: 8.0,
            start_scale: 0.92,
        }
    }

    /// Frame at `elapsed_secs` after the beat started.
    pub fn frame(&self, elapsed_secs: f64) -> PopInFrame {
        if self.duration_secs <= 0.0 || elapsed_secs >= self.duration_secs {
            return PopInFrame::REST;
        }
        let progress = ease_out_cubic((elapsed_secs / self.duration_secs).clamp(0.0, 1.0));
        PopInFrame {
            opacity: progress,
            translate_y: self.start_translate_y * (1.0 - progress),
            scale: self.start_scale + (1.0 - self.start_scale) * progress,
        }
    }
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_hidden_and_settles() {
        let pop = PopIn::new(0.18);
        let first = pop.frame(0.0);
        assert_eq!(first.opacity, 0.0);
        assert_eq!(first.scale, 0.92);
        assert!(pop.frame(0.18).is_settled());
        assert!(pop.frame(5.0).is_settled());
    }

    #[test]
    fn test_monotonic_progress() {
        let pop = PopIn::new(0.2);
        let a = pop.frame(0.05);
        let b = pop.frame(0.1);
        assert!(b.opacity > a.opacity);
        assert!(b.translate_y < a.translate_y);
    }

    #[test]
    fn test_negative_elapsed_clamps() {
        let pop = PopIn::new(0.2);
        assert_eq!(pop.frame(-1.0).opacity, 0.0);
    }
}
