//! PDF Combine Library
//!
//! Pick PDF files, put them in order, and combine them into one PDF.
//! This library provides:
//! - An ordered, duplicate-free selection of input files
//! - Command handlers that apply user actions to that selection
//! - An interactive line-oriented session over any reader and writer
//! - Ordered PDF merging into `combined.pdf`, `combined (1).pdf`, ... without
//!   ever overwriting an existing file
//!
//! # Example
//!
//! ```no_run
//! use pdf_combine::commands::{handle, Command, Outcome};
//! use pdf_combine::pdf::OutputTarget;
//! use pdf_combine::selection::SelectionList;
//!
//! let mut selection = SelectionList::new();
//! selection.add("A.pdf");
//! selection.add("B.pdf");
//!
//! let outcome = handle(&mut selection, &OutputTarget::default(), Command::Combine)
//!     .expect("Failed to combine");
//! if let Outcome::Combined(path) = outcome {
//!     println!("wrote {}", path.display());
//! }
//! ```

pub mod commands;
pub mod error;
pub mod pdf;
pub mod selection;
pub mod shell;

// Re-export commonly used items
pub use error::{Error, Result};
