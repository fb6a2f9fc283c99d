//! Validate a Clipstage project file.

use std::path::PathBuf;

use clipstage_project_model::project::EditorProjectState;
use clipstage_timeline::{check_invariants, find_overlaps};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating project at: {}", path.display());

    let state =
        EditorProjectState::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    println!("  Name: {}", state.project.name);
    println!("  Lanes: {}", state.snapshot.lanes.len());
    println!("  Clips: {}", state.snapshot.clips.len());

    let mut issues = state.validate_references();
    issues.extend(check_invariants(&state.snapshot).iter().map(|v| v.to_string()));
    issues.extend(find_overlaps(&state.snapshot).iter().map(|v| v.to_string()));

    if issues.is_empty() {
        println!("\nProject is valid.");
        return Ok(());
    }

    println!("\nValidation issues:");
    for issue in &issues {
        println!("  - {issue}");
    }
    Err(anyhow::anyhow!("{} issue(s) found", issues.len()))
}
