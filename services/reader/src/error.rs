//! services/reader/src/error.rs
//!
//! Defines the primary error type for the entire reader service.

use crate::config::ConfigError;
use crate::session::upload::ValidationError;
use epub_reader_core::ports::PortError;

/// The primary error type for the `reader` service.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the core storage port.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a rejected upload batch.
    #[error("Upload validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Represents a standard Input/Output error (e.g., creating the store directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
