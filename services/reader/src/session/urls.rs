//! services/reader/src/session/urls.rs
//!
//! The access-URL table for uploaded files: temporary, revocable references
//! that address a file's in-memory bytes without re-reading them. Every
//! allocated URL must be revoked exactly once, on file removal or at session
//! teardown.

use bytes::Bytes;
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

#[derive(Default)]
pub struct UrlRegistry {
    live: HashMap<String, Bytes>,
}

impl UrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh URL over the given bytes.
    pub fn allocate(&mut self, data: Bytes) -> String {
        let url = format!("blob:{}", Uuid::new_v4());
        self.live.insert(url.clone(), data);
        url
    }

    /// Returns the bytes behind a live URL. `Bytes` clones are cheap
    /// reference-count bumps, not copies.
    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        self.live.get(url).cloned()
    }

    /// Revokes a URL, returning whether it was live. Revoking an unknown or
    /// already-revoked URL is a logged no-op.
    pub fn revoke(&mut self, url: &str) -> bool {
        if self.live.remove(url).is_some() {
            true
        } else {
            warn!("Ignoring revoke of unknown or already revoked URL {url}");
            false
        }
    }

    /// Revokes every remaining URL, returning how many were live.
    pub fn revoke_all(&mut self) -> usize {
        let count = self.live.len();
        self.live.clear();
        count
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocated_urls_resolve_until_revoked() {
        let mut registry = UrlRegistry::new();
        let url = registry.allocate(Bytes::from_static(b"epub bytes"));

        assert_eq!(registry.resolve(&url).unwrap(), "epub bytes");
        assert!(registry.revoke(&url));
        assert!(registry.resolve(&url).is_none());
    }

    #[test]
    fn double_revoke_is_a_no_op() {
        let mut registry = UrlRegistry::new();
        let url = registry.allocate(Bytes::new());

        assert!(registry.revoke(&url));
        assert!(!registry.revoke(&url));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn revoke_all_drains_the_table() {
        let mut registry = UrlRegistry::new();
        let first = registry.allocate(Bytes::from_static(b"a"));
        let second = registry.allocate(Bytes::from_static(b"b"));

        assert_eq!(registry.revoke_all(), 2);
        assert!(registry.resolve(&first).is_none());
        assert!(registry.resolve(&second).is_none());
        // A second teardown pass finds nothing left to revoke.
        assert_eq!(registry.revoke_all(), 0);
    }
}
