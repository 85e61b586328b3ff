//! Claid image editing client
//!
//! Uploads a single image together with its edit operations to Claid's
//! upload endpoint, then fetches the processed result from the temporary
//! URL returned in the response.
//! API: https://docs.claid.ai/image-editing-api/upload-api

use bytes::Bytes;
use pixpress_core::{AppError, EditOperations, SourceFile};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::fmt::{Debug, Formatter, Result as FmtResult};

pub use pixpress_core::config::DEFAULT_CLAID_API_URL;

const UPLOAD_PATH: &str = "/v1/image/edit/upload";
const DEFAULT_OUTPUT_MIME: &str = "image/jpeg";

#[derive(Clone)]
pub struct ClaidConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl ClaidConfig {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.into(),
        }
    }
}

impl Debug for ClaidConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ClaidConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl From<&pixpress_core::Config> for ClaidConfig {
    fn from(config: &pixpress_core::Config) -> Self {
        Self::new(config.claid_api_key.clone(), config.claid_api_url.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("CLAID_API_KEY not configured")]
    MissingApiKey,

    #[error("Claid API error: {status}")]
    Upstream { status: u16, body: String },

    #[error("Failed to download processed image: {0}")]
    Download(String),

    #[error("Request to Claid failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid Claid response: {0}")]
    InvalidResponse(String),
}

impl From<EditError> for AppError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::MissingApiKey => AppError::Configuration(err.to_string()),
            EditError::Upstream { status, body } => AppError::Upstream { status, body },
            EditError::Download(msg) => AppError::Download(msg),
            EditError::Transport(e) => AppError::UpstreamConnect(e.to_string()),
            EditError::InvalidResponse(msg) => AppError::Processing(msg),
        }
    }
}

/// Processed image fetched from the temporary output URL
#[derive(Debug, Clone)]
pub struct ProcessedEdit {
    pub data: Bytes,
    pub content_type: String,
    pub original_size: u64,
    pub new_size: u64,
    /// The upstream `data` object
    pub metadata: Value,
}

#[derive(Debug, Clone)]
pub enum EditOutcome {
    Processed(ProcessedEdit),
    /// The response carried no temporary URL; it is handed back untouched
    Raw(Value),
}

pub struct ClaidClient {
    http_client: reqwest::Client,
    config: ClaidConfig,
}

impl Debug for ClaidClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ClaidClient")
            .field("config", &self.config)
            .finish()
    }
}

impl ClaidClient {
    pub fn new(config: ClaidConfig) -> Result<Self, EditError> {
        let http_client = reqwest::Client::builder().build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn upload_url(&self) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), UPLOAD_PATH)
    }

    #[tracing::instrument(skip(self, file, operations), fields(file_name = %file.file_name, size = file.data.len()))]
    pub async fn edit(
        &self,
        file: &SourceFile,
        operations: &EditOperations,
    ) -> Result<EditOutcome, EditError> {
        let api_key = self.config.api_key.as_deref().ok_or(EditError::MissingApiKey)?;

        let payload = operations.to_payload();
        tracing::debug!(operations = %payload, "Sending image to Claid");

        let part = Part::bytes(file.data.to_vec()).file_name(file.file_name.clone());
        let part = match part.mime_str(&file.content_type) {
            Ok(part) => part,
            Err(_) => Part::bytes(file.data.to_vec()).file_name(file.file_name.clone()),
        };
        let form = Form::new().part("file", part).text("data", payload.to_string());

        let response = self
            .http_client
            .post(self.upload_url())
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = status.as_u16(), body = %body, "Claid API request failed");
            return Err(EditError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| EditError::InvalidResponse(e.to_string()))?;

        let data = body.get("data");
        let output = data.and_then(|d| d.get("output"));
        let Some(tmp_url) = output
            .and_then(|o| o.get("tmp_url"))
            .and_then(Value::as_str)
        else {
            tracing::warn!("Claid response has no tmp_url, returning raw payload");
            return Ok(EditOutcome::Raw(body));
        };

        let content_type = output
            .and_then(|o| o.get("mime"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_OUTPUT_MIME)
            .to_string();
        let metadata = data.cloned().unwrap_or(Value::Null);

        let data = self.download(tmp_url).await?;

        tracing::info!(
            original_size = file.data.len(),
            new_size = data.len(),
            content_type = %content_type,
            "Claid edit completed"
        );

        Ok(EditOutcome::Processed(ProcessedEdit {
            original_size: file.data.len() as u64,
            new_size: data.len() as u64,
            data,
            content_type,
            metadata,
        }))
    }

    async fn download(&self, url: &str) -> Result<Bytes, EditError> {
        tracing::debug!(url = %url, "Downloading processed image");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| EditError::Download(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EditError::Download(format!(
                "output URL returned {}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| EditError::Download(e.to_string()))
    }
}
