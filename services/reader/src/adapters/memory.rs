//! services/reader/src/adapters/memory.rs
//!
//! An in-memory implementation of the `StorageService` port. Used as the
//! injected fake in tests; also usable as a throwaway store for sessions that
//! should not touch the filesystem. Keys and serialized values match the
//! file-backed adapter exactly.

use async_trait::async_trait;
use epub_reader_core::domain::{Bookmark, ReadingProgress, ReadingSettings};
use epub_reader_core::ports::{PortError, PortResult, StorageService};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use super::records::{
    bookmarks_key, progress_key, settings_key, BookmarkRecord, ProgressRecord, SettingsRecord,
};

pub struct MemoryStoreAdapter {
    namespace: String,
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    write_count: AtomicUsize,
}

impl MemoryStoreAdapter {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: Mutex::new(HashMap::new()),
            fail_writes: AtomicBool::new(false),
            write_count: AtomicUsize::new(0),
        }
    }

    /// Makes every subsequent save fail, for exercising the degraded paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of saves that reached the store.
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    async fn read_record<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.entries.lock().await;
        let data = entries.get(key)?;
        match serde_json::from_str(data) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("Discarding unreadable record {}: {}", key, err);
                None
            }
        }
    }

    async fn write_record<T: Serialize>(&self, key: &str, record: &T) -> PortResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("injected write failure".to_string()));
        }
        let contents = serde_json::to_string(record)
            .map_err(|e| PortError::Serialization(e.to_string()))?;
        self.entries.lock().await.insert(key.to_string(), contents);
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl StorageService for MemoryStoreAdapter {
    async fn save_progress(&self, book_id: Uuid, progress: &ReadingProgress) -> PortResult<()> {
        let key = progress_key(&self.namespace, book_id);
        self.write_record(&key, &ProgressRecord::from_domain(progress))
            .await
    }

    async fn load_progress(&self, book_id: Uuid) -> PortResult<Option<ReadingProgress>> {
        let key = progress_key(&self.namespace, book_id);
        Ok(self
            .read_record::<ProgressRecord>(&key)
            .await
            .map(ProgressRecord::to_domain))
    }

    async fn save_bookmarks(&self, book_id: Uuid, bookmarks: &[Bookmark]) -> PortResult<()> {
        let key = bookmarks_key(&self.namespace, book_id);
        let records: Vec<BookmarkRecord> =
            bookmarks.iter().map(BookmarkRecord::from_domain).collect();
        self.write_record(&key, &records).await
    }

    async fn load_bookmarks(&self, book_id: Uuid) -> PortResult<Vec<Bookmark>> {
        let key = bookmarks_key(&self.namespace, book_id);
        let records: Vec<BookmarkRecord> = self.read_record(&key).await.unwrap_or_default();
        Ok(records.into_iter().map(BookmarkRecord::to_domain).collect())
    }

    async fn save_settings(&self, settings: &ReadingSettings) -> PortResult<()> {
        let key = settings_key(&self.namespace);
        self.write_record(&key, &SettingsRecord::from_domain(settings))
            .await
    }

    async fn load_settings(&self) -> PortResult<Option<ReadingSettings>> {
        let key = settings_key(&self.namespace);
        Ok(self
            .read_record::<SettingsRecord>(&key)
            .await
            .map(SettingsRecord::to_domain))
    }
}
