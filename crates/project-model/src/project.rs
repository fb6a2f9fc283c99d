//! Project metadata and the persisted project state blob.
//!
//! The engine does not care where a project lives; it only guarantees
//! that [`EditorProjectState`] round-trips through JSON unchanged. The
//! file helpers here are a convenience for the CLI and tests.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::clip::{Asset, AssetKind};
use crate::snapshot::EditorSnapshot;

/// Current schema version written to new projects.
pub const PROJECT_SCHEMA_VERSION: &str = "1.0";

/// Project metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    /// Schema version.
    pub version: String,

    /// Human-readable project name.
    pub name: String,

    /// Unique project identifier (UUID).
    pub id: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Last modified timestamp (ISO 8601).
    pub modified_at: String,
}

/// Output settings handed to the export collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output resolution (width x height in pixels).
    pub width: u32,
    pub height: u32,

    /// Output frame rate.
    pub fps: u32,

    /// Font families the renderer must load before drawing text.
    pub fonts: Vec<String>,

    /// Whether subtitle clips are drawn into the output.
    pub burn_subtitles: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
            fonts: vec!["Inter".to_string()],
            burn_subtitles: true,
        }
    }
}

/// Stages of an export job as reported by the collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStage {
    #[default]
    Idle,
    Queued,
    Rendering,
    Encoding,
    Complete,
    Failed,
}

impl ExportStage {
    /// Whether the job has stopped making progress.
    pub fn is_terminal(self) -> bool {
        matches!(self, ExportStage::Complete | ExportStage::Failed)
    }
}

/// Persisted export status.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportState {
    pub config: ExportConfig,
    pub stage: ExportStage,
    /// Job id returned by the export collaborator.
    pub job_id: Option<String>,
    /// Progress in `[0.0, 1.0]`.
    pub progress: f64,
    /// Download location once complete.
    pub output_url: Option<String>,
    /// Last error message reported by the collaborator.
    pub error: Option<String>,
}

/// Everything the persistence collaborator stores for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorProjectState {
    pub project: ProjectMeta,
    pub snapshot: EditorSnapshot,
    /// Asset records referenced by clips.
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub export: ExportState,
}

impl ProjectMeta {
    /// Create metadata for a new project.
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: PROJECT_SCHEMA_VERSION.to_string(),
            name: name.into(),
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now.clone(),
            modified_at: now,
        }
    }

    /// Bump the modification timestamp.
    pub fn touch(&mut self) {
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }
}

impl EditorProjectState {
    /// Create an empty project.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            project: ProjectMeta::new(name),
            snapshot: EditorSnapshot::new(),
            assets: Vec::new(),
            export: ExportState::default(),
        }
    }

    pub fn asset(&self, asset_id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == asset_id)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a project from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref().to_path_buf();
        let json = std::fs::read_to_string(&path).map_err(|e| ProjectError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let state = Self::from_json(&json).map_err(|e| ProjectError::ParseError {
            path: path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), clips = state.snapshot.clips.len(), "Project loaded");
        Ok(state)
    }

    /// Save the project to a JSON file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ProjectError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = self.to_json().map_err(|e| ProjectError::ParseError {
            path: path.clone(),
            source: e,
        })?;
        std::fs::write(&path, json).map_err(|e| ProjectError::IoError { path, source: e })
    }

    /// Report clips whose asset is missing or whose asset kind does not
    /// match the lane they sit on.
    pub fn validate_references(&self) -> Vec<String> {
        let mut errors = vec![];
        for clip in &self.snapshot.clips {
            let Some(lane) = self.snapshot.lane(&clip.lane_id) else {
                errors.push(format!("Clip {} references missing lane {}", clip.id, clip.lane_id));
                continue;
            };
            // Subtitle clips reference a synthetic text asset.
            if self.snapshot.is_subtitle(&clip.id) {
                continue;
            }
            match self.asset(&clip.asset_id) {
                None => errors.push(format!(
                    "Clip {} references missing asset {}",
                    clip.id, clip.asset_id
                )),
                Some(asset) if asset.kind.lane_kind() != lane.kind => errors.push(format!(
                    "Clip {} ({:?}) sits on a {:?} lane",
                    clip.id, asset.kind, lane.kind
                )),
                Some(_) => {}
            }
        }
        for segment in self.snapshot.subtitles.values() {
            if let Some(source) = &segment.source_clip_id {
                if self.snapshot.clip(source).is_none() {
                    errors.push(format!(
                        "Subtitle {} references missing source clip {}",
                        segment.clip_id, source
                    ));
                }
            }
        }
        errors
    }

    /// Count assets by kind (for `info` output).
    pub fn asset_count(&self, kind: AssetKind) -> usize {
        self.assets.iter().filter(|a| a.kind == kind).count()
    }
}

/// Errors that can occur when working with projects.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid project: {message}")]
    ValidationError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::Clip;
    use crate::lane::{Lane, LaneKind};

    fn sample() -> EditorProjectState {
        let mut state = EditorProjectState::new("Test Edit");
        state
            .assets
            .push(Asset::new("asset-1", AssetKind::Video, "https://cdn/a.mp4").with_duration(12.0));
        state.snapshot.lanes.push(Lane::new("lane-video-1", LaneKind::Video));
        state
            .snapshot
            .clips
            .push(Clip::new("clip-1", "asset-1", "lane-video-1", 0.0, 4.0));
        state
    }

    #[test]
    fn test_project_creation() {
        let state = EditorProjectState::new("Test Edit");
        assert_eq!(state.project.name, "Test Edit");
        assert_eq!(state.project.version, PROJECT_SCHEMA_VERSION);
        assert_eq!(state.export.stage, ExportStage::Idle);
    }

    #[test]
    fn test_project_round_trip_is_byte_identical() {
        let state = sample();
        let first = state.to_json().unwrap();
        let second = EditorProjectState::from_json(&first)
            .unwrap()
            .to_json()
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join("clipstage_test_project");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("project.json");

        let state = sample();
        state.save(&path).unwrap();
        let loaded = EditorProjectState::load(&path).unwrap();
        assert_eq!(loaded, state);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = EditorProjectState::load("/nonexistent/clipstage/project.json").unwrap_err();
        assert!(matches!(err, ProjectError::IoError { .. }));
    }

    #[test]
    fn test_validate_references_reports_missing_asset() {
        let mut state = sample();
        state
            .snapshot
            .clips
            .push(Clip::new("clip-2", "gone", "lane-video-1", 5.0, 1.0));
        let errors = state.validate_references();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("missing asset gone"));
    }

    #[test]
    fn test_legacy_file_without_export_defaults() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value.as_object_mut().unwrap().remove("export");
        let parsed: EditorProjectState = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.export.config.fps, 30);
    }
}
