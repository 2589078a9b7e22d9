//! Error types for the PDF combine library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF combine library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Nothing selected to combine
    #[error("No input files provided")]
    NoInputs,

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// No files matched pattern
    #[error("No PDF files found matching pattern: {0}")]
    NoFilesMatched(String),

    /// Zero-based index outside the selection list
    #[error("Index {index} is out of range for a list of {len}")]
    InvalidIndex { index: usize, len: usize },

    /// One-based position, as shown to the user, outside the selection list
    #[error("No file at position {position} (list has {len})")]
    InvalidPosition { position: usize, len: usize },

    /// A new order that is not a permutation of the current list
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Unparseable command line in an interactive session
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Known command with missing or malformed arguments
    #[error("Usage: {0}")]
    Usage(String),

    /// General error
    #[error("{0}")]
    General(String),
}
