use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use pixpress_core::{AppError, ImageRecord};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

const ENTRY_PREFIX: &str = "processed_";

/// Sanitize filename for archive entry to prevent path traversal.
/// Extracts only the base name (strips path components like `../`).
fn sanitize_archive_filename(filename: &str, fallback: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// `processed_<name>`, with `_<n>` inserted before the extension when the
/// name was already used in this archive.
fn unique_entry_name(base: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = format!("{}{}", ENTRY_PREFIX, base);
    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (base, None),
    };

    let mut n = 2;
    while used.contains(&candidate) {
        candidate = match ext {
            Some(ext) => format!("{}{}_{}.{}", ENTRY_PREFIX, stem, n, ext),
            None => format!("{}{}_{}", ENTRY_PREFIX, stem, n),
        };
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}

/// Download name of the archive, e.g. `processed-images-1718000000000.zip`
pub fn archive_file_name(at: DateTime<Utc>) -> String {
    format!("processed-images-{}.zip", at.timestamp_millis())
}

/// Create a ZIP archive holding every completed record with a non-empty
/// processed blob. Other records are skipped. No qualifying records still
/// yields a valid, empty archive.
pub fn create_zip_archive<'a, I>(records: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a ImageRecord>,
{
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    let mut buffer = Vec::new();
    let mut entries = 0usize;
    {
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        let mut used = HashSet::new();

        for record in records {
            let Some(processed) = record.processed().filter(|_| record.is_archivable()) else {
                continue;
            };

            let safe_filename =
                sanitize_archive_filename(record.file_name(), &format!("unnamed_{}", record.id()));
            let entry_name = unique_entry_name(&safe_filename, &mut used);

            zip.start_file(entry_name.as_str(), options)
                .with_context(|| format!("Failed to add file to ZIP: {}", entry_name))?;
            zip.write_all(&processed.data)
                .with_context(|| format!("Failed to write file data to ZIP: {}", entry_name))?;
            entries += 1;
        }

        zip.finish().context("Failed to finalize ZIP archive")?;
    }

    tracing::debug!(entries, size = buffer.len(), "Built ZIP archive");
    Ok(buffer)
}

/// [`create_zip_archive`] with failures mapped into [`AppError::Archive`]
pub fn build_archive<'a, I>(records: I) -> Result<Vec<u8>, AppError>
where
    I: IntoIterator<Item = &'a ImageRecord>,
{
    create_zip_archive(records).map_err(|e| AppError::Archive(format!("{:#}", e)))
}
