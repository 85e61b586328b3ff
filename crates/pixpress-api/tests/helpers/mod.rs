//! Test helpers: build the router against an in-memory batch for integration tests.
//!
//! Run from workspace root: `cargo test -p pixpress-api`.

pub mod fixtures;

use axum_test::TestServer;
use pixpress_api::setup::initialize_app;
use pixpress_core::{BaseConfig, Config, ProcessingBackend};

pub const TEST_API_KEY: &str = "test-claid-key";

/// Configuration for tests; `claid_url` is usually a mockito server.
pub fn test_config(
    backend: ProcessingBackend,
    claid_url: &str,
    api_key: Option<&str>,
) -> Config {
    Config {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            max_file_size_bytes: 5 * 1024 * 1024,
        },
        claid_api_key: api_key.map(String::from),
        claid_api_url: claid_url.to_string(),
        processing_backend: backend,
        batch_queue_size: 4,
    }
}

pub fn server_from_config(config: Config) -> TestServer {
    let (_state, router) = initialize_app(config).expect("app should initialize");
    TestServer::new(router).expect("test server should start")
}

/// Local-backend server; the Claid URL points nowhere and is never called.
pub fn local_server() -> TestServer {
    server_from_config(test_config(
        ProcessingBackend::Local,
        "http://127.0.0.1:9",
        None,
    ))
}

/// Remote-backend server whose Claid calls go to `claid_url`.
pub fn remote_server(claid_url: &str) -> TestServer {
    server_from_config(test_config(
        ProcessingBackend::Remote,
        claid_url,
        Some(TEST_API_KEY),
    ))
}
