//! Multipart form reading shared by the upload handlers.

use axum::extract::Multipart;
use pixpress_core::{AppError, SourceFile};
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::HttpAppError;

/// Files and text fields of one multipart request
#[derive(Debug, Default)]
pub struct UploadForm {
    files: Vec<(String, SourceFile)>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Read the whole form. Parts with a file name are files, everything else
    /// is a text field. Each file is checked against `max_file_size`.
    pub async fn read(mut multipart: Multipart, max_file_size: usize) -> Result<Self, HttpAppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(|s| s.to_string()).unwrap_or_default();

            if let Some(file_name) = field.file_name().map(|s| s.to_string()) {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await?;
                validate_file_size(&file_name, data.len(), max_file_size)?;
                form.files
                    .push((name, SourceFile::new(file_name, content_type, data)));
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// First file sent under `name`
    pub fn take_file(&mut self, name: &str) -> Option<SourceFile> {
        let index = self.files.iter().position(|(field, _)| field == name)?;
        Some(self.files.remove(index).1)
    }

    pub fn into_files(self) -> Vec<SourceFile> {
        self.files.into_iter().map(|(_, file)| file).collect()
    }

    /// Non-empty text value of `name`
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Parse an optional field; a present but malformed value is a 400.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        self.text(name)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| AppError::InvalidInput(format!("Invalid {} value '{}'", name, raw)))
            })
            .transpose()
    }

    /// Checkbox semantics: only the literal `true` enables the flag
    pub fn flag(&self, name: &str) -> bool {
        self.text(name) == Some("true")
    }
}

fn validate_file_size(file_name: &str, size: usize, max_size: usize) -> Result<(), AppError> {
    if size > max_size {
        return Err(AppError::InvalidInput(format!(
            "File '{}' exceeds maximum allowed size of {} MB",
            file_name,
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}
