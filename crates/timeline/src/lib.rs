//! Clipstage Timeline: Lane Placement & Editing
//!
//! Turns pointer gestures into snapshot mutations:
//! - **Lanes:** Pointer-to-lane resolution, ordered lane creation, pruning
//! - **Snapping:** Sibling-edge, grid and frame snap with guides
//! - **Placement:** Drag preview, collision resolution, group drag
//! - **Editing:** Drop, trim, split, duplicate, delete, speed and z-order
//! - **Clipboard:** Copy/paste onto fresh lanes
//!
//! Nothing here touches the snapshot until a gesture commits.

pub mod clipboard;
pub mod config;
pub mod editing;
pub mod invariants;
pub mod lanes;
pub mod placement;
pub mod snapping;

pub use clipboard::Clipboard;
pub use config::{LaneLayout, TimelineConfig};
pub use editing::{drop_asset, TrimEdge, ZOrderChange};
pub use invariants::{check_invariants, find_overlaps, InvariantViolation};
pub use lanes::LaneTarget;
pub use placement::{CommitOutcome, DragPointer, DragSession, PlacementPreview};
pub use snapping::{SnapKind, SnapResult, Snapper};
