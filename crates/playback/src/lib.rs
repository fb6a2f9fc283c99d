//! Clipstage Playback: Clock & Media Sync
//!
//! Keeps N independently buffered media handles in lockstep with one
//! logical timeline time:
//! - **Clock:** Authoritative time advanced by monotonic frame deltas
//! - **Mapping:** Timeline time <-> asset time through offset and speed
//! - **Drift:** Blend toward the reference handle, snap only when far off
//! - **Sync:** Pause hidden handles, seek after jumps, let playing ones run
//! - **Stacking:** Top-of-stack resolution for rendering and picking
//!
//! The engine never reads the wall clock; hosts pass timestamps in.

pub mod clock;
pub mod config;
pub mod drift;
pub mod engine;
pub mod mapping;
pub mod stacking;
pub mod sync;

pub use clock::{ClockState, LoopToken, PlaybackClock};
pub use config::PlaybackConfig;
pub use drift::{DriftAction, DriftCorrector};
pub use engine::{FrameReport, PlaybackEngine};
pub use mapping::{asset_to_timeline_time, timeline_to_asset_time, ClipTiming};
pub use sync::{HandleRegistry, MediaSync, PlaybackHandle, SyncReport};
