//! Error types shared across Clipstage crates.

use std::path::PathBuf;

/// Top-level error type for Clipstage engine operations.
#[derive(Debug, thiserror::Error)]
pub enum ClipstageError {
    #[error("Placement error: {message}")]
    Placement { message: String },

    #[error("Edit error: {message}")]
    Edit { message: String },

    #[error("Playback error: {message}")]
    Playback { message: String },

    #[error("Subtitle error: {message}")]
    Subtitle { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Project error: {message}")]
    Project { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Another gesture is already active: {active}")]
    GestureActive { active: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ClipstageError.
pub type ClipstageResult<T> = Result<T, ClipstageError>;

impl ClipstageError {
    pub fn placement(msg: impl Into<String>) -> Self {
        Self::Placement {
            message: msg.into(),
        }
    }

    pub fn edit(msg: impl Into<String>) -> Self {
        Self::Edit {
            message: msg.into(),
        }
    }

    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback {
            message: msg.into(),
        }
    }

    pub fn subtitle(msg: impl Into<String>) -> Self {
        Self::Subtitle {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn project(msg: impl Into<String>) -> Self {
        Self::Project {
            message: msg.into(),
        }
    }

    pub fn clip_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Clip",
            id: id.into(),
        }
    }

    pub fn lane_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Lane",
            id: id.into(),
        }
    }

    pub fn asset_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Asset",
            id: id.into(),
        }
    }
}
