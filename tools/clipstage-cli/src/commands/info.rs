//! Show project information.

use std::path::PathBuf;

use clipstage_project_model::project::EditorProjectState;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let state =
        EditorProjectState::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    let p = &state.project;
    let snap = &state.snapshot;

    println!("Project: {}", p.name);
    println!("  ID: {}", p.id);
    println!("  Schema: {}", p.version);
    println!("  Created: {}", p.created_at);
    println!("  Modified: {}", p.modified_at);
    println!();

    println!("Assets:");
    for asset in &state.assets {
        match asset.duration {
            Some(d) => println!("  {} {:?} {} ({d:.1}s)", asset.id, asset.kind, asset.url),
            None => println!("  {} {:?} {}", asset.id, asset.kind, asset.url),
        }
    }
    println!();

    println!("Timeline ({:.2}s):", snap.duration());
    for lane in &snap.lanes {
        let clips: Vec<_> = snap.clips_on_lane(&lane.id).collect();
        println!("  Lane {} [{:?}]: {} clip(s)", lane.id, lane.kind, clips.len());
        for clip in clips {
            let marker = if snap.is_subtitle(&clip.id) { " (subtitle)" } else { "" };
            println!(
                "    {} {:.2}s -> {:.2}s  asset={} speed={}{}",
                clip.id,
                clip.start_time,
                clip.end_time(),
                clip.asset_id,
                snap.speed_of(&clip.id),
                marker
            );
        }
    }
    println!("  Subtitles: {}", snap.subtitles.len());
    println!("  Selected: {}", snap.selection.clip_ids.len());
    println!();

    let export = &state.export;
    println!("Export:");
    println!(
        "  Output: {}x{} @ {}fps",
        export.config.width, export.config.height, export.config.fps
    );
    println!("  Burn subtitles: {}", export.config.burn_subtitles);
    println!("  Stage: {:?}", export.stage);
    if let Some(url) = &export.output_url {
        println!("  Result: {url}");
    }

    Ok(())
}
