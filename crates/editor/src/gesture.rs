//! Single-gesture bookkeeping.
//!
//! Drag, trim and transform gestures mutate the snapshot continuously
//! between pointer-down and pointer-up. Only one may run at a time; the
//! slot keeps the snapshot from before it started so cancellation can
//! restore it exactly and commit can hand it to history.

use std::fmt;

use serde::Serialize;

use clipstage_common::error::{ClipstageError, ClipstageResult};
use clipstage_project_model::clip::ClipId;
use clipstage_project_model::snapshot::EditorSnapshot;
use clipstage_project_model::transform::ClipTransform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureKind {
    Drag,
    Trim,
    Transform,
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GestureKind::Drag => "drag",
            GestureKind::Trim => "trim",
            GestureKind::Transform => "transform",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
struct ActiveGesture {
    kind: GestureKind,
    clip_id: ClipId,
    before: EditorSnapshot,
}

/// Holds at most one in-progress gesture.
#[derive(Debug, Clone, Default)]
pub struct GestureSlot {
    active: Option<ActiveGesture>,
}

impl GestureSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Kind and clip of the running gesture.
    pub fn active(&self) -> Option<(GestureKind, &str)> {
        self.active
            .as_ref()
            .map(|g| (g.kind, g.clip_id.as_str()))
    }

    /// Snapshot from before the running gesture started.
    pub fn before(&self) -> Option<&EditorSnapshot> {
        self.active.as_ref().map(|g| &g.before)
    }

    /// Start a gesture on `clip_id`. Fails if another is running.
    pub fn begin(
        &mut self,
        kind: GestureKind,
        clip_id: &str,
        snapshot: &EditorSnapshot,
    ) -> ClipstageResult<()> {
        if let Some(active) = &self.active {
            return Err(ClipstageError::GestureActive {
                active: format!("{} on {}", active.kind, active.clip_id),
            });
        }
        tracing::debug!(%kind, clip_id, "Gesture started");
        self.active = Some(ActiveGesture {
            kind,
            clip_id: clip_id.to_string(),
            before: snapshot.clone(),
        });
        Ok(())
    }

    /// Fail unless a gesture of `kind` is running.
    pub fn expect(&self, kind: GestureKind) -> ClipstageResult<&str> {
        match &self.active {
            Some(g) if g.kind == kind => Ok(&g.clip_id),
            Some(g) => Err(ClipstageError::GestureActive {
                active: format!("{} on {}", g.kind, g.clip_id),
            }),
            None => Err(ClipstageError::edit(format!("No {kind} gesture in progress"))),
        }
    }

    /// End the running gesture of `kind`, returning the pre-gesture snapshot.
    pub fn finish(&mut self, kind: GestureKind) -> ClipstageResult<EditorSnapshot> {
        self.expect(kind)?;
        let gesture = self
            .active
            .take()
            .ok_or_else(|| ClipstageError::edit(format!("No {kind} gesture in progress")))?;
        tracing::debug!(%kind, clip_id = %gesture.clip_id, "Gesture finished");
        Ok(gesture.before)
    }

    /// Abort the running gesture, restoring `snapshot` to its state before
    /// the gesture began. Returns the aborted kind.
    pub fn cancel(&mut self, snapshot: &mut EditorSnapshot) -> Option<GestureKind> {
        let gesture = self.active.take()?;
        tracing::debug!(kind = %gesture.kind, clip_id = %gesture.clip_id, "Gesture cancelled");
        *snapshot = gesture.before;
        Some(gesture.kind)
    }
}

/// One step of a transform gesture, relative to the transform the clip had
/// when the gesture began.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    /// Translate by a normalized stage delta.
    Move { dx: f64, dy: f64 },
    /// Scale around the center.
    Scale { factor: f64 },
    /// Resize from the top-left corner to a normalized size.
    Resize { width: f64, height: f64 },
    /// Rotate to an absolute angle in degrees.
    Rotate { degrees: f64 },
}

impl TransformOp {
    pub fn apply(self, origin: &ClipTransform) -> ClipTransform {
        match self {
            TransformOp::Move { dx, dy } => origin.translated(dx, dy),
            TransformOp::Scale { factor } => origin.scaled(factor),
            TransformOp::Resize { width, height } => {
                ClipTransform::new(origin.x, origin.y, width, height, origin.rotation)
            }
            TransformOp::Rotate { degrees } => origin.rotated_to(degrees),
        }
    }
}
