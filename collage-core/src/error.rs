//! Error types for collage operations.

use thiserror::Error;

/// Result type for collage operations.
pub type CollageResult<T> = Result<T, CollageError>;

/// Errors that can occur in collage operations.
#[derive(Debug, Error)]
pub enum CollageError {
    /// A label grid has rows of unequal length.
    #[error("Ragged layout: row {row} has {len} cells, expected {expected}")]
    RaggedLayout {
        /// Index of the offending row.
        row: usize,
        /// Actual cell count of that row.
        len: usize,
        /// Cell count of the first row, which every row must match.
        expected: usize,
    },

    /// No catalog entry exists for the requested layout id.
    #[error("Layout not found: {0}")]
    LayoutNotFound(String),

    /// A save/share export was requested while one is already running.
    #[error("Export already in progress")]
    ExportInProgress,

    /// A save/share export was requested with no layout or no image assigned.
    #[error("Nothing to export: {0}")]
    NothingToExport(String),
}
