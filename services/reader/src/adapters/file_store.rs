//! services/reader/src/adapters/file_store.rs
//!
//! This module contains the file-backed storage adapter, which is the concrete
//! implementation of the `StorageService` port from the `core` crate. Each key
//! of the persisted store becomes one JSON document under the store root.

use async_trait::async_trait;
use epub_reader_core::domain::{Bookmark, ReadingProgress, ReadingSettings};
use epub_reader_core::ports::{PortError, PortResult, StorageService};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

use super::records::{
    bookmarks_key, progress_key, settings_key, BookmarkRecord, ProgressRecord, SettingsRecord,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A storage adapter that implements the `StorageService` port over a
/// directory of JSON files.
#[derive(Clone)]
pub struct FileStoreAdapter {
    root: PathBuf,
    namespace: String,
}

impl FileStoreAdapter {
    /// Creates a new `FileStoreAdapter`, creating the root directory if needed.
    pub fn new(root: impl AsRef<Path>, namespace: impl Into<String>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            namespace: namespace.into(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Reads and deserializes one record. A missing file or an unreadable
    /// record both come back as `None`; the persisted store is a best-effort
    /// mirror and never blocks the session.
    async fn read_record<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let data = tokio::fs::read_to_string(self.path_for(key)).await.ok()?;
        match serde_json::from_str(&data) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("Discarding unreadable record {}: {}", key, err);
                None
            }
        }
    }

    async fn write_record<T: Serialize>(&self, key: &str, record: &T) -> PortResult<()> {
        let contents = serde_json::to_string(record)
            .map_err(|e| PortError::Serialization(e.to_string()))?;
        tokio::fs::write(self.path_for(key), contents)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

//=========================================================================================
// `StorageService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StorageService for FileStoreAdapter {
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

#[cfg(test)]
mod tests {
    use super::*;
    use epub_reader_core::domain::{BookmarkColor, Theme};

    struct TempRoot(PathBuf);

    impl TempRoot {
        fn new() -> Self {
            let path = std::env::temp_dir().join(format!("reader-store-{}", Uuid::new_v4()));
            Self(path)
        }
    }

    impl Drop for TempRoot {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn sample_progress() -> ReadingProgress {
        ReadingProgress {
            current_page: 42,
            total_pages: 180,
            percentage: 23.3,
            current_chapter: "Chapter 3".to_string(),
            estimated_time_left_secs: 5400,
        }
    }

    #[tokio::test]
    async fn progress_round_trips_per_book() {
        let root = TempRoot::new();
        let store = FileStoreAdapter::new(&root.0, "epub-reader").unwrap();
        let book_a = Uuid::new_v4();
        let book_b = Uuid::new_v4();

        store.save_progress(book_a, &sample_progress()).await.unwrap();

        assert_eq!(
            store.load_progress(book_a).await.unwrap(),
            Some(sample_progress())
        );
        // Keys are scoped per book id.
        assert_eq!(store.load_progress(book_b).await.unwrap(), None);
    }

    #[tokio::test]
    async fn bookmarks_round_trip_and_missing_key_is_empty() {
        let root = TempRoot::new();
        let store = FileStoreAdapter::new(&root.0, "epub-reader").unwrap();
        let book_id = Uuid::new_v4();

        assert!(store.load_bookmarks(book_id).await.unwrap().is_empty());

        let bookmark = Bookmark {
            id: Uuid::new_v4(),
            book_id,
            title: "a quote".to_string(),
            cfi_range: "epubcfi(/6/4!/4/2,/1:0,/1:12)".to_string(),
            selected_text: "twelve chars".to_string(),
            note: "revisit".to_string(),
            color: BookmarkColor::Blue,
            created_at: chrono::Utc::now(),
        };
        store
            .save_bookmarks(book_id, std::slice::from_ref(&bookmark))
            .await
            .unwrap();

        assert_eq!(store.load_bookmarks(book_id).await.unwrap(), vec![bookmark]);
    }

    #[tokio::test]
    async fn corrupt_record_degrades_to_absent() {
        let root = TempRoot::new();
        let store = FileStoreAdapter::new(&root.0, "epub-reader").unwrap();
        let book_id = Uuid::new_v4();

        let path = store.path_for(&progress_key("epub-reader", book_id));
        tokio::fs::write(&path, "{not json").await.unwrap();

        assert_eq!(store.load_progress(book_id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let root = TempRoot::new();
        let store = FileStoreAdapter::new(&root.0, "epub-reader").unwrap();

        assert_eq!(store.load_settings().await.unwrap(), None);

        let mut settings = ReadingSettings::default();
        settings.theme = Theme::Dark;
        settings.font_size = 18;
        store.save_settings(&settings).await.unwrap();

        assert_eq!(store.load_settings().await.unwrap(), Some(settings));
    }
}
