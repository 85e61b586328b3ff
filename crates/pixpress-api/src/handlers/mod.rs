pub mod batch;
pub mod claid_upload;
pub mod form;
pub mod health;
pub mod presets;
pub mod process;
