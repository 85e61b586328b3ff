//! Pixpress Services Library
//!
//! External-facing services: the Claid editing client, the local editor
//! behind the same [`ImageEditor`] trait, and the ZIP archive builder.

pub mod archive;
pub mod claid;
pub mod editor;

pub use archive::{archive_file_name, build_archive, create_zip_archive};
pub use claid::{ClaidClient, ClaidConfig, EditError, EditOutcome, ProcessedEdit};
pub use editor::{editor_from_config, ImageEditor, LocalEditor, RemoteEditor};
