//! services/reader/src/lib.rs
//!
//! The reader service: session state, upload validation, and storage adapters
//! for the EPUB reading application. The UI surface and the EPUB renderer are
//! external collaborators; this crate owns everything between a UI event and
//! the persisted store.

pub mod adapters;
pub mod config;
pub mod error;
pub mod session;
pub mod trace;

use std::sync::Arc;

use adapters::FileStoreAdapter;
use config::Config;
use error::ReaderError;
use session::ReaderSession;

/// Wires a file-backed store to a new reader session using the given
/// configuration.
pub async fn open_session(config: &Config) -> Result<ReaderSession, ReaderError> {
    let storage = Arc::new(FileStoreAdapter::new(
        &config.storage_root,
        config.namespace.clone(),
    )?);
    Ok(ReaderSession::from_config(storage, config).await)
}
