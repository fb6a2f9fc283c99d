//! Clipstage Editor
//!
//! The session layer that ties the engine crates together:
//! - **Session:** One project, its edits, gestures, playback and subtitles
//! - **History:** Bounded snapshot undo/redo with throttled bursts
//! - **Gestures:** Single active drag/trim/transform with exact cancel
//! - **Export:** Sanitized render requests and frame readiness checks

pub mod export;
pub mod gesture;
pub mod history;
pub mod session;

pub use export::{
    poll_export, sanitize_for_export, start_export, visually_ready, wait_until_ready,
    ExportBackend, ExportRequest, ExportStatus,
};
pub use gesture::{GestureKind, GestureSlot, TransformOp};
pub use history::History;
pub use session::Editor;
