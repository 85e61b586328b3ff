//! Pixpress Worker – batch orchestration.
//!
//! Holds the in-memory batch of image records and runs Process All through a
//! single-worker job queue. The API and CLI drive the batch only through
//! [`BatchOrchestrator`].

mod orchestrator;
mod queue;
mod store;

pub use orchestrator::{BatchArchive, BatchOrchestrator};
pub use queue::{BatchJob, BatchJobQueue, RunReport};
pub use store::{BatchStore, BatchSummary};
