//! PDF manipulation module

pub mod merge;
pub mod metadata;
pub mod naming;

// Re-export commonly used items
pub use merge::{combine_pdfs, merge_documents, CombineOptions};
pub use metadata::{count_pages, extract_metadata, PdfMetadata};
pub use naming::{next_available_path, OutputName, OutputTarget, DEFAULT_OUTPUT_NAME};
