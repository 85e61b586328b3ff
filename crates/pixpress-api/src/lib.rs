//! Pixpress API Library
//!
//! HTTP handlers, OpenAPI docs and application setup.

mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;
mod telemetry;

pub mod error;
pub mod state;

pub use error::ErrorResponse;
pub use telemetry::init_telemetry;
