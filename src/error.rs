//! Error Handling Module
//!
//! This module defines custom error types for dmarc-insight using the `thiserror` crate.
//! Per-file parse failures are recoverable (the batch skips the file and continues);
//! an empty batch and output write failures are fatal for the run.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DmarcError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("File too large: {0}")]
    FileTooLarge(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("Failed to parse {file}: {reason}")]
    Parse { file: String, reason: String },

    #[error("No DMARC records found in any input file")]
    EmptyBatch,

    #[error("Failed to write output: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, DmarcError>;
