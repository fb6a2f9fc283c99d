//! Clipstage Project Model
//!
//! Defines the core data contracts for Clipstage projects:
//! - **Lanes:** Ordered tracks of one kind (text, video, audio)
//! - **Clips:** Timed references to assets, plus per-clip settings
//! - **Subtitles:** Segments with optional word timing
//! - **Snapshot:** The deep-cloneable unit of undo/redo and persistence
//! - **Project:** Metadata, assets, and export status
//!
//! Stage coordinates are normalized to `[0.0, 1.0]` so transforms survive
//! changes of output resolution.

pub mod clip;
pub mod lane;
pub mod project;
pub mod snapshot;
pub mod subtitle;
pub mod transform;

pub use clip::*;
pub use lane::*;
pub use project::*;
pub use snapshot::*;
pub use subtitle::*;
pub use transform::*;
