//! Pixpress CLI: run a batch over local image files and write the ZIP archive.
//!
//! The remote backend needs CLAID_API_KEY (read from the environment or `.env`).

use anyhow::Context;
use clap::{Parser, Subcommand};
use pixpress_cli::{init_tracing, load_sources, render_summary, run_batch};
use pixpress_core::{
    default_preset, find_preset, Config, DecompressMode, ProcessingBackend, ProcessingOptions,
    RestorationOptions, UpscaleMethod, DEFAULT_QUALITY,
};
use pixpress_services::editor_from_config;
use pixpress_worker::BatchOrchestrator;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pixpress", about = "Batch image resizing for social media presets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process image files and write the results as one ZIP archive
    Process {
        /// Image files to process
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output preset name, e.g. "Instagram Story"
        #[arg(long)]
        preset: Option<String>,
        /// Output quality, 0-100
        #[arg(long, default_value_t = DEFAULT_QUALITY)]
        quality: u8,
        /// smart_enhance, smart_resize, digital_art, faces, photo or none
        #[arg(long, default_value = "none")]
        upscale: UpscaleMethod,
        /// moderate, strong, auto or none
        #[arg(long, default_value = "none")]
        decompress: DecompressMode,
        #[arg(long)]
        polish: bool,
        /// Resize locally instead of calling the Claid API
        #[arg(long)]
        local: bool,
        /// Archive path, or a directory to write it into
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            files,
            preset,
            quality,
            upscale,
            decompress,
            polish,
            local,
            output,
        } => {
            let mut config = Config::from_env().context("Failed to load configuration")?;
            if local {
                config.processing_backend = ProcessingBackend::Local;
            }

            let preset = match preset.as_deref() {
                Some(name) => find_preset(name)
                    .with_context(|| format!("Unknown preset '{}'", name))?,
                None => default_preset(),
            };
            let options = ProcessingOptions::new(preset, quality)?.with_restorations(
                RestorationOptions {
                    upscale,
                    decompress,
                    polish,
                },
            );

            let editor = editor_from_config(&config)?;
            tracing::info!(backend = editor.name(), files = files.len(), "Starting batch");
            let orchestrator = BatchOrchestrator::new(editor, config.batch_queue_size);

            let sources = load_sources(&files)?;
            let run = run_batch(&orchestrator, sources, options, output.as_deref()).await?;

            print!("{}", render_summary(&run));
            if run.archive_path.is_none() {
                anyhow::bail!("No images were processed successfully");
            }
        }
    }

    Ok(())
}
