//! Application state shared by all handlers.

use pixpress_core::Config;
use pixpress_services::ClaidClient;
use pixpress_worker::BatchOrchestrator;

pub struct AppState {
    pub config: Config,
    /// Client for the `/api/claid-upload` proxy; it reports a configuration
    /// error per request when no key is set.
    pub claid: ClaidClient,
    pub batch: BatchOrchestrator,
}

impl AppState {
    pub fn max_file_size(&self) -> usize {
        self.config.max_file_size_bytes()
    }
}
