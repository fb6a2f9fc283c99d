//! Clipstage CLI: inspect and prepare editor projects.
//!
//! Usage:
//!   clipstage init <NAME>              Create an empty project file
//!   clipstage info <PATH>              Show project information
//!   clipstage validate <PATH>          Check references and timeline invariants
//!   clipstage beats <PATH>             Show subtitle beat segmentation
//!   clipstage subtitles <PATH>         Write subtitles as SRT or VTT
//!   clipstage export-snapshot <PATH>   Write the sanitized render request

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use clipstage_common::config::{AppConfig, LoggingConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "clipstage",
    about = "Timeline, playback and subtitle engine for short-form video editing",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the standard location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new empty project
    Init {
        /// Project name
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Export width
        #[arg(long, default_value = "1080")]
        width: u32,

        /// Export height
        #[arg(long, default_value = "1920")]
        height: u32,

        /// Export FPS
        #[arg(long, default_value = "30")]
        fps: u32,
    },

    /// Show project information
    Info {
        /// Path to the project file
        path: PathBuf,
    },

    /// Validate asset references and timeline invariants
    Validate {
        /// Path to the project file
        path: PathBuf,
    },

    /// Show how subtitle words group into on-screen beats
    Beats {
        /// Path to the project file
        path: PathBuf,

        /// Only this subtitle clip
        #[arg(long)]
        clip: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Write subtitle segments as SRT or VTT
    Subtitles {
        /// Path to the project file
        path: PathBuf,

        /// Output file; the extension picks the format (.srt or .vtt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the render request an export backend would receive
    ExportSnapshot {
        /// Path to the project file
        path: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave subtitles out of the render
        #[arg(long)]
        no_burn_subtitles: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    clipstage_common::logging::init_logging(&LoggingConfig {
        level: log_level,
        ..config.logging.clone()
    });

    match cli.command {
        Commands::Init {
            name,
            output,
            width,
            height,
            fps,
        } => commands::init::run(name, output, width, height, fps),
        Commands::Info { path } => commands::info::run(path),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Beats { path, clip, json } => commands::beats::run(path, clip, json, &config),
        Commands::Subtitles { path, output } => commands::subtitles::run(path, output),
        Commands::ExportSnapshot {
            path,
            output,
            no_burn_subtitles,
        } => commands::export_snapshot::run(path, output, !no_burn_subtitles),
    }
}
