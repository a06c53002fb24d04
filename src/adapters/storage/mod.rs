//! Storage Adapter
//!
//! File-backed output sink and document reader.

mod json_file;

pub use json_file::{JsonFileStore, DEFAULT_OUTPUT_PATH};
