//! Error types for flow operations.

use thiserror::Error;

/// Result type for flow operations.
pub type FlowResult<T> = Result<T, FlowError>;

/// Errors that can occur in the authoring flow and its stores.
#[derive(Debug, Error)]
pub enum FlowError {
    /// An error from the synchronous core.
    #[error(transparent)]
    Core(#[from] collage_core::CollageError),

    /// The capture collaborator failed to render the collage.
    #[error("Capture failed: {0}")]
    Capture(String),

    /// A gallery item was not found.
    #[error("Image not found: {0}")]
    ImageNotFound(String),

    /// An I/O error during store persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A store blob failed to serialize or deserialize.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
