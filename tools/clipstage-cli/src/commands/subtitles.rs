//! Write a project's subtitles as SRT or WebVTT.

use std::path::PathBuf;

use clipstage_project_model::project::EditorProjectState;
use clipstage_subtitles::{cues_from_snapshot, generate_srt, save_subtitles};

pub fn run(path: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let state =
        EditorProjectState::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    let cues = cues_from_snapshot(&state.snapshot);
    if cues.is_empty() {
        println!("No subtitles in {}", path.display());
        return Ok(());
    }

    match output {
        Some(out) => {
            save_subtitles(&cues, &out)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", out.display()))?;
            println!("Wrote {} cue(s) to {}", cues.len(), out.display());
        }
        None => print!("{}", generate_srt(&cues)),
    }
    Ok(())
}
