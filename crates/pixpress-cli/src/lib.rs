//! Batch runner behind the `pixpress` binary: load local files, run them
//! through the orchestrator and write the resulting archive.

use anyhow::{Context, Result};
use pixpress_core::{
    format_bytes, size_change_percent, ImageRecord, ImageStatus, ProcessingOptions, SourceFile,
};
use pixpress_worker::{BatchArchive, BatchOrchestrator, RunReport};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .without_time()
        .compact()
        .init();
}

/// MIME type guessed from the file extension
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

pub fn load_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    paths
        .iter()
        .map(|path| {
            let data = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            Ok(SourceFile::new(file_name, content_type_for(path), data))
        })
        .collect()
}

/// Where to write the archive: inside `output` when it is a directory,
/// at `output` itself otherwise, and in the working directory by default.
pub fn archive_destination(output: Option<&Path>, archive_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(archive_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(archive_name),
    }
}

/// Outcome of one CLI run
#[derive(Debug)]
pub struct BatchRun {
    pub report: RunReport,
    pub records: Vec<ImageRecord>,
    /// `None` when no image completed
    pub archive_path: Option<PathBuf>,
}

/// Add `sources`, process them all with `options` and write the archive.
pub async fn run_batch(
    orchestrator: &BatchOrchestrator,
    sources: Vec<SourceFile>,
    options: ProcessingOptions,
    output: Option<&Path>,
) -> Result<BatchRun> {
    orchestrator.add(sources).await?;
    let report = orchestrator.process_all(options).await?;
    let records = orchestrator.records().await;

    let archive_path = if report.completed > 0 {
        let BatchArchive {
            file_name, data, ..
        } = orchestrator.download_archive().await?;
        let destination = archive_destination(output, &file_name);
        std::fs::write(&destination, data)
            .with_context(|| format!("Failed to write {}", destination.display()))?;
        Some(destination)
    } else {
        None
    };

    Ok(BatchRun {
        report,
        records,
        archive_path,
    })
}

/// Per-image lines followed by batch totals.
pub fn render_summary(run: &BatchRun) -> String {
    let mut out = String::new();
    let mut total_original = 0u64;
    let mut total_processed = 0u64;

    for record in &run.records {
        total_original += record.original_size();
        match record.status() {
            ImageStatus::Completed => {
                let processed = record.processed_size().unwrap_or(0);
                total_processed += processed;
                let change = size_change_percent(record.original_size(), processed)
                    .map(|p| format!(" ({:+}%)", p))
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "  ok    {}  {} -> {}{}",
                    record.file_name(),
                    format_bytes(record.original_size()),
                    format_bytes(processed),
                    change
                );
            }
            ImageStatus::Error => {
                let _ = writeln!(
                    out,
                    "  error {}  {}",
                    record.file_name(),
                    record.error_message().unwrap_or("unknown error")
                );
            }
            status => {
                let _ = writeln!(out, "  {:<5} {}", status, record.file_name());
            }
        }
    }

    let _ = writeln!(
        out,
        "{} processed, {} failed. Original: {}, processed: {}",
        run.report.completed,
        run.report.failed,
        format_bytes(total_original),
        format_bytes(total_processed)
    );
    if let Some(path) = &run.archive_path {
        let _ = writeln!(out, "Archive written to {}", path.display());
    }
    out
}
