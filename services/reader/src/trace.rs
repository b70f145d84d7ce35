//! services/reader/src/trace.rs
//!
//! Tracing subscriber setup for the reader service.

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber at the given level.
///
/// Uses `try_init` so repeated calls (tests, embedders that already installed
/// a subscriber) are harmless.
pub fn init_tracing(level: Level) {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
