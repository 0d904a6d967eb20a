//! Output module for exporting records and reporting on a scrape
//!
//! This module handles:
//! - Writing business records to CSV
//! - Formatting the end-of-run summary

mod csv;
mod summary;

pub use self::csv::{default_output_path, write_records, write_records_csv};
pub use summary::format_summary;

use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
