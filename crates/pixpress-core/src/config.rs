//! Configuration module
//!
//! Configuration is read once at startup (`Config::from_env`) and then passed
//! explicitly to the components that need it. Business logic never reads the
//! process environment directly; the Claid credential in particular is injected
//! into the edit client at construction time.

use std::env;
use std::fmt;
use std::str::FromStr;

// Common constants
const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_MAX_FILE_SIZE_MB: usize = 25;
const DEFAULT_BATCH_QUEUE_SIZE: usize = 64;
pub const DEFAULT_CLAID_API_URL: &str = "https://api.claid.ai";

/// Which editor the batch orchestrator sends images to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingBackend {
    /// Claid image-editing API (requires `CLAID_API_KEY`)
    #[default]
    Remote,
    /// In-process cover resize + JPEG re-encode
    Local,
}

impl ProcessingBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingBackend::Remote => "remote",
            ProcessingBackend::Local => "local",
        }
    }
}

impl FromStr for ProcessingBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remote" | "claid" => Ok(ProcessingBackend::Remote),
            "local" => Ok(ProcessingBackend::Local),
            other => Err(anyhow::anyhow!(
                "Unsupported PROCESSING_BACKEND '{}'. Expected 'remote' or 'local'",
                other
            )),
        }
    }
}

impl fmt::Display for ProcessingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub max_file_size_bytes: usize,
}

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    pub base: BaseConfig,
    /// Claid API key. `None` means the remote edit path answers with a configuration error.
    pub claid_api_key: Option<String>,
    pub claid_api_url: String,
    pub processing_backend: ProcessingBackend,
    /// Bound of the orchestrator's job channel
    pub batch_queue_size: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base", &self.base)
            .field(
                "claid_api_key",
                &self.claid_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("claid_api_url", &self.claid_api_url)
            .field("processing_backend", &self.processing_backend)
            .field("batch_queue_size", &self.batch_queue_size)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base: BaseConfig {
                server_port: DEFAULT_SERVER_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
            },
            claid_api_key: None,
            claid_api_url: DEFAULT_CLAID_API_URL.to_string(),
            processing_backend: ProcessingBackend::Remote,
            batch_queue_size: DEFAULT_BATCH_QUEUE_SIZE,
        }
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or(defaults.base.environment);

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let server_port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid port number, got '{}'", raw))?,
            None => DEFAULT_SERVER_PORT,
        };

        let max_file_size_mb = match lookup("MAX_FILE_SIZE_MB") {
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                anyhow::anyhow!("MAX_FILE_SIZE_MB must be a positive integer, got '{}'", raw)
            })?,
            None => DEFAULT_MAX_FILE_SIZE_MB,
        };

        let processing_backend = match lookup("PROCESSING_BACKEND") {
            Some(raw) => raw.parse()?,
            None => ProcessingBackend::default(),
        };

        let batch_queue_size = lookup("BATCH_QUEUE_SIZE")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_BATCH_QUEUE_SIZE)
            .max(1);

        let claid_api_key = lookup("CLAID_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let claid_api_url = lookup("CLAID_API_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or(defaults.claid_api_url);

        let config = Config {
            base: BaseConfig {
                server_port,
                cors_origins,
                environment,
                max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            },
            claid_api_key,
            claid_api_url,
            processing_backend,
            batch_queue_size,
        };
        config.validate()?;

        Ok(config)
    }

    /// Sanity checks that cannot be expressed by parsing alone.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.max_file_size_bytes == 0 {
            anyhow::bail!("MAX_FILE_SIZE_MB must be greater than zero");
        }

        if !self.claid_api_url.starts_with("http://") && !self.claid_api_url.starts_with("https://")
        {
            anyhow::bail!(
                "CLAID_API_URL must be an http(s) URL, got '{}'",
                self.claid_api_url
            );
        }

        if self.processing_backend == ProcessingBackend::Remote && self.claid_api_key.is_none() {
            tracing::warn!(
                "CLAID_API_KEY is not set; remote edit requests will fail with a configuration error"
            );
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.base.max_file_size_bytes
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }
}
