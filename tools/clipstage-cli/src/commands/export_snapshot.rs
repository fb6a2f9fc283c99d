//! Write the render request for a project.

use std::path::PathBuf;

use clipstage_editor::ExportRequest;
use clipstage_project_model::project::EditorProjectState;

pub fn run(path: PathBuf, output: Option<PathBuf>, burn_subtitles: bool) -> anyhow::Result<()> {
    let mut state =
        EditorProjectState::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    state.export.config.burn_subtitles = burn_subtitles;

    let request = ExportRequest::from_project(&state)
        .map_err(|e| anyhow::anyhow!("Cannot export {}: {e}", path.display()))?;
    let json = serde_json::to_string_pretty(&request)?;

    match output {
        Some(out) => {
            std::fs::write(&out, json)?;
            println!(
                "Wrote render request ({}x{} @ {}fps, {} frames) to {}",
                request.width,
                request.height,
                request.fps,
                request.total_frames(),
                out.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
