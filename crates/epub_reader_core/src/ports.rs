//! crates/epub_reader_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like the browser's
//! key-value store or an on-disk directory.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Bookmark, ReadingProgress, ReadingSettings};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external backends (e.g., filesystem).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The injected storage interface the session persists through.
///
/// Loads return the absent value (`None` / empty list) when a key is missing or
/// its stored record cannot be deserialized; an `Err` is reserved for backend
/// failures (I/O, serialization of an outgoing value). Persisted records carry
/// no schema-version tag, so a future field-shape change has no defined
/// migration path.
#[async_trait]
pub trait StorageService: Send + Sync {
    // --- Reading Progress ---
    async fn save_progress(&self, book_id: Uuid, progress: &ReadingProgress) -> PortResult<()>;

    async fn load_progress(&self, book_id: Uuid) -> PortResult<Option<ReadingProgress>>;

    // --- Bookmarks ---
    async fn save_bookmarks(&self, book_id: Uuid, bookmarks: &[Bookmark]) -> PortResult<()>;

    async fn load_bookmarks(&self, book_id: Uuid) -> PortResult<Vec<Bookmark>>;

    // --- Settings ---
    async fn save_settings(&self, settings: &ReadingSettings) -> PortResult<()>;

    async fn load_settings(&self) -> PortResult<Option<ReadingSettings>>;
}
