//! Undo/redo over whole-snapshot copies.
//!
//! The past holds the states before each recorded edit, oldest first, and
//! is bounded; the oldest entries fall off. Any new record clears the
//! future. Undo and redo swap the full snapshot.

use std::collections::VecDeque;

use clipstage_common::clock::Throttle;
use clipstage_common::config::HistoryDefaults;
use clipstage_project_model::snapshot::EditorSnapshot;

#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<EditorSnapshot>,
    future: Vec<EditorSnapshot>,
    max_depth: usize,
    throttle: Throttle,
}

impl History {
    pub fn new(max_depth: usize, throttle_ms: u64) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            max_depth: max_depth.max(1),
            throttle: Throttle::new(throttle_ms),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Record `snapshot` as the state to return to on undo.
    pub fn push(&mut self, snapshot: &EditorSnapshot) {
        self.push_entry(snapshot.clone());
    }

    /// Record `snapshot` unless another throttled record happened within
    /// the throttle interval. Returns whether it was recorded.
    ///
    /// Continuous edits (slider drags) call this before every change so a
    /// burst collapses into the state before its first change.
    pub fn push_throttled(&mut self, snapshot: &EditorSnapshot, now_ms: u64) -> bool {
        if !self.throttle.should_fire(now_ms) {
            return false;
        }
        self.record(snapshot.clone());
        true
    }

    /// Record a discrete edit. It closes any open throttled burst, so the
    /// next throttled change gets its own entry.
    pub(crate) fn push_entry(&mut self, snapshot: EditorSnapshot) {
        self.record(snapshot);
        self.throttle.reset();
    }

    fn record(&mut self, snapshot: EditorSnapshot) {
        self.past.push_back(snapshot);
        while self.past.len() > self.max_depth {
            self.past.pop_front();
        }
        self.future.clear();
    }

    /// Swap `current` with the previous state. Returns false when there is
    /// nothing to undo.
    pub fn undo(&mut self, current: &mut EditorSnapshot) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        self.future.push(std::mem::replace(current, previous));
        self.throttle.reset();
        true
    }

    /// Swap `current` with the next state. Returns false when there is
    /// nothing to redo.
    pub fn redo(&mut self, current: &mut EditorSnapshot) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        self.past.push_back(std::mem::replace(current, next));
        while self.past.len() > self.max_depth {
            self.past.pop_front();
        }
        self.throttle.reset();
        true
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.throttle.reset();
    }
}

impl From<&HistoryDefaults> for History {
    fn from(defaults: &HistoryDefaults) -> Self {
        Self::new(defaults.max_depth, defaults.throttle_ms)
    }
}

impl Default for History {
    fn default() -> Self {
        Self::from(&HistoryDefaults::default())
    }
}
