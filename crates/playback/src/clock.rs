//! The authoritative playback clock.
//!
//! State machine: `Idle -> Playing -> Idle`, with scrubbing orthogonal to
//! both. The frame loop is modelled by a [`LoopToken`]: every pause (or
//! reaching the end) invalidates the current token, so a late tick from
//! a torn-down loop is ignored and resuming starts from the stored time.

use serde::Serialize;

use clipstage_common::clock::FrameClock;

/// Whether the clock is advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockState {
    Idle,
    Playing,
}

/// Identifies one run of the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopToken(u64);

/// Canonical timeline time, owned by the engine.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    time: f64,
    duration: f64,
    state: ClockState,
    scrubbing: bool,
    generation: u64,
    frames: FrameClock,
    discontinuity: bool,
}

impl PlaybackClock {
    pub fn new(max_frame_delta_secs: f64) -> Self {
        Self {
            time: 0.0,
            duration: 0.0,
            state: ClockState::Idle,
            scrubbing: false,
            generation: 0,
            frames: FrameClock::with_max_delta(max_frame_delta_secs),
            discontinuity: true,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == ClockState::Playing
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    /// Update the timeline extent, clamping the current time into it.
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration.max(0.0);
        if self.time > self.duration {
            self.time = self.duration;
            self.discontinuity = true;
        }
    }

    /// Start (or restart) the frame loop.
    ///
    /// Playing from the end rewinds to zero first. Returns the token the
    /// new loop must present on every tick.
    pub fn play(&mut self) -> LoopToken {
        if self.duration > 0.0 && self.time >= self.duration {
            self.time = 0.0;
            self.discontinuity = true;
        }
        self.state = ClockState::Playing;
        self.generation += 1;
        self.frames.reset();
        tracing::debug!(time = self.time, generation = self.generation, "Playback started");
        LoopToken(self.generation)
    }

    /// Stop advancing and invalidate the running loop.
    pub fn pause(&mut self) {
        if self.state == ClockState::Playing {
            tracing::debug!(time = self.time, "Playback paused");
        }
        self.state = ClockState::Idle;
        self.generation += 1;
    }

    /// Whether `token` belongs to the running loop.
    pub fn is_current(&self, token: LoopToken) -> bool {
        self.state == ClockState::Playing && token.0 == self.generation
    }

    /// Advance by the frame delta at host time `now_secs`.
    ///
    /// Returns `None` for a stale token. Reaching the end stops playback
    /// and invalidates the loop.
    pub fn tick(&mut self, token: LoopToken, now_secs: f64) -> Option<f64> {
        if !self.is_current(token) {
            return None;
        }
        let delta = self.frames.tick(now_secs);
        if !self.scrubbing {
            self.time += delta;
        }
        if self.time >= self.duration {
            self.time = self.duration;
            self.state = ClockState::Idle;
            self.generation += 1;
            tracing::debug!(time = self.time, "Playback reached end");
        }
        Some(self.time)
    }

    /// Jump to `t`; handles are re-seeked on the next sync.
    pub fn seek(&mut self, t: f64) {
        let t = if t.is_finite() { t } else { 0.0 };
        self.time = t.clamp(0.0, self.duration);
        self.discontinuity = true;
        self.frames.reset();
    }

    /// Adjust time without marking a discontinuity (drift correction).
    pub fn nudge(&mut self, t: f64) {
        if t.is_finite() {
            self.time = t.clamp(0.0, self.duration);
        }
    }

    pub fn begin_scrub(&mut self) {
        self.scrubbing = true;
    }

    /// Scrub to `t`. Ignored unless a scrub is active.
    pub fn scrub_to(&mut self, t: f64) {
        if self.scrubbing {
            self.seek(t);
        }
    }

    pub fn end_scrub(&mut self) {
        self.scrubbing = false;
        self.frames.reset();
    }

    /// Consume the pending discontinuity flag.
    pub fn take_discontinuity(&mut self) -> bool {
        std::mem::take(&mut self.discontinuity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> PlaybackClock {
        let mut clock = PlaybackClock::new(0.25);
        clock.set_duration(10.0);
        clock
    }

    #[test]
    fn test_ticks_advance_while_playing() {
        let mut clock = clock();
        let token = clock.play();
        assert_eq!(clock.tick(token, 100.0), Some(0.0));
        let t = clock.tick(token, 100.1).unwrap();
        assert!((t - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_stale_token_ignored_after_pause() {
        let mut clock = clock();
        let token = clock.play();
        clock.tick(token, 1.0);
        clock.pause();
        assert_eq!(clock.tick(token, 2.0), None);

        // Resume re-reads the stored time; the paused interval is skipped.
        let fresh = clock.play();
        assert_ne!(fresh, token);
        assert_eq!(clock.tick(fresh, 50.0), Some(0.0));
    }

    #[test]
    fn test_stops_at_end() {
        let mut clock = clock();
        clock.seek(9.9);
        let token = clock.play();
        clock.tick(token, 0.0);
        assert_eq!(clock.tick(token, 0.2), Some(10.0));
        assert_eq!(clock.state(), ClockState::Idle);
        assert_eq!(clock.tick(token, 0.3), None);
    }

    #[test]
    fn test_play_from_end_rewinds() {
        let mut clock = clock();
        clock.seek(10.0);
        clock.play();
        assert_eq!(clock.time(), 0.0);
    }

    #[test]
    fn test_frame_delta_is_bounded() {
        let mut clock = clock();
        let token = clock.play();
        clock.tick(token, 0.0);
        let t = clock.tick(token, 5.0).unwrap();
        assert!((t - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_seek_marks_discontinuity_once() {
        let mut clock = clock();
        clock.take_discontinuity();
        clock.seek(4.0);
        assert!(clock.take_discontinuity());
        assert!(!clock.take_discontinuity());
        clock.nudge(4.1);
        assert!(!clock.take_discontinuity());
    }

    #[test]
    fn test_scrub_holds_time_while_playing() {
        let mut clock = clock();
        let token = clock.play();
        clock.tick(token, 0.0);
        clock.begin_scrub();
        clock.scrub_to(6.0);
        assert_eq!(clock.tick(token, 0.1), Some(6.0));
        clock.end_scrub();
        assert!(clock.is_playing());
    }
}
