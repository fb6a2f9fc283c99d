//! Create a new Clipstage project file.

use std::path::PathBuf;

use clipstage_project_model::project::EditorProjectState;

pub fn run(name: String, output: PathBuf, width: u32, height: u32, fps: u32) -> anyhow::Result<()> {
    if width == 0 || height == 0 || fps == 0 {
        return Err(anyhow::anyhow!(
            "Invalid output format {width}x{height} @ {fps} fps"
        ));
    }

    let path = output.join(format!("{name}.json"));
    if path.exists() {
        return Err(anyhow::anyhow!("{} already exists", path.display()));
    }
    println!("Creating project '{}' at {}", name, path.display());

    let mut project = EditorProjectState::new(&name);
    project.export.config.width = width;
    project.export.config.height = height;
    project.export.config.fps = fps;
    project
        .save(&path)
        .map_err(|e| anyhow::anyhow!("Failed to create project: {e}"))?;

    println!("Project created successfully:");
    println!("  ID: {}", project.project.id);
    println!("  Output: {width}x{height} @ {fps}fps");
    Ok(())
}
