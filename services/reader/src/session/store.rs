//! services/reader/src/session/store.rs
//!
//! The reading state store: the single owned object holding current session
//! state and orchestrating reads/writes through the storage port. In-memory
//! state is the source of truth for the session; the persisted store is a
//! best-effort mirror consulted only when a file is selected.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use epub_reader_core::domain::{
    Bookmark, BookmarkColor, BookmarkDraft, ReadingProgress, ReadingSettings, SelectionContext,
    SettingsPatch, UploadedFile,
};
use epub_reader_core::ports::StorageService;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use uuid::Uuid;

use super::upload::{process_batch, RawUpload, UploadOutcome, ValidationError};
use super::urls::UrlRegistry;
use crate::config::Config;

/// Quiet period after the last progress update before the value is persisted.
pub const PROGRESS_DEBOUNCE: Duration = Duration::from_secs(2);

/// Characters of selected text used for a selection-derived bookmark title.
const BOOKMARK_TITLE_CHARS: usize = 50;

/// The single-slot pending progress write. Scheduling a new write cancels and
/// replaces any unfired one; shutdown flushes the last one.
struct PendingWrite {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct ReaderSession {
    storage: Arc<dyn StorageService>,
    max_files: usize,
    files: Vec<UploadedFile>,
    urls: UrlRegistry,
    current: Option<Uuid>,
    progress: ReadingProgress,
    selected_text: String,
    selection: Option<SelectionContext>,
    bookmarks: Vec<Bookmark>,
    settings: ReadingSettings,
    last_error: Option<String>,
    pending_write: Option<PendingWrite>,
}

impl ReaderSession {
    /// Opens a session over the given storage, merging persisted settings
    /// over the defaults.
    pub async fn open(storage: Arc<dyn StorageService>, max_files: usize) -> Self {
        let settings = match storage.load_settings().await {
            Ok(Some(saved)) => saved,
            Ok(None) => ReadingSettings::default(),
            Err(err) => {
                error!("Failed to load persisted settings: {err}");
                ReadingSettings::default()
            }
        };

        Self {
            storage,
            max_files,
            files: Vec::new(),
            urls: UrlRegistry::new(),
            current: None,
            progress: ReadingProgress::zero(),
            selected_text: String::new(),
            selection: None,
            bookmarks: Vec::new(),
            settings,
            last_error: None,
            pending_write: None,
        }
    }

    pub async fn from_config(storage: Arc<dyn StorageService>, config: &Config) -> Self {
        Self::open(storage, config.max_uploaded_files).await
    }

    //=====================================================================================
    // File Management
    //=====================================================================================

    /// Runs the validation pipeline over a batch and adds each accepted file.
    pub fn upload(&mut self, uploads: Vec<RawUpload>) -> Result<UploadOutcome, ValidationError> {
        let outcome = process_batch(uploads, self.files.len(), self.max_files, &mut self.urls)?;
        for file in &outcome.accepted {
            self.add_file(file.clone());
        }
        Ok(outcome)
    }

    /// Inserts a file into the uploaded set; a duplicate identifier is a no-op.
    pub fn add_file(&mut self, file: UploadedFile) {
        if self.files.iter().any(|f| f.id == file.id) {
            return;
        }
        info!("Added '{}'", file.metadata.title);
        self.files.push(file);
    }

    /// Removes a file, revoking its access URL. Removing the current file
    /// resets the reading progress to zero-state and clears the current-file
    /// reference, the selection, and the bookmark list.
    pub fn remove_file(&mut self, id: Uuid) {
        let Some(position) = self.files.iter().position(|f| f.id == id) else {
            return;
        };
        let file = self.files.remove(position);
        self.urls.revoke(&file.access_url);

        if self.current == Some(id) {
            // Any unfired write belongs to the removed book; drop it.
            self.cancel_pending_write();
            self.current = None;
            self.progress = ReadingProgress::zero();
            self.selected_text.clear();
            self.selection = None;
            self.bookmarks.clear();
        }
        info!("Removed '{}'", file.file_name);
    }

    /// Makes `id` the current file. The previous file's progress is persisted
    /// fire-and-forget before switching; the new file's saved progress and
    /// bookmarks are loaded, falling back to zero-state / empty list. Failures
    /// surface through [`Self::last_error`], never as an `Err`.
    pub async fn select_file(&mut self, id: Uuid) {
        self.last_error = None;
        let Some(file_name) = self
            .files
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.file_name.clone())
        else {
            self.last_error = Some(format!("File {id} is not in the library"));
            return;
        };

        if let Some(previous) = self.current {
            if previous != id {
                // The switch-away save supersedes any pending debounced write.
                self.cancel_pending_write();
                self.persist_progress_detached(previous, self.progress.clone());
            }
        }
        self.current = Some(id);

        self.progress = match self.storage.load_progress(id).await {
            Ok(Some(saved)) => saved,
            Ok(None) => ReadingProgress::zero(),
            Err(err) => {
                error!("Failed to load reading progress for {id}: {err}");
                self.last_error = Some("Failed to restore reading position".to_string());
                ReadingProgress::zero()
            }
        };

        self.bookmarks = match self.storage.load_bookmarks(id).await {
            Ok(list) => list,
            Err(err) => {
                error!("Failed to load bookmarks for {id}: {err}");
                self.last_error = Some("Failed to load bookmarks".to_string());
                Vec::new()
            }
        };

        info!("Opened '{file_name}'");
    }

    //=====================================================================================
    // Reading Progress
    //=====================================================================================

    /// Replaces the in-memory progress immediately and schedules the debounced
    /// persist. A call within the quiet period cancels and replaces the
    /// pending write, so only the latest value of a burst is ever written.
    pub fn update_progress(&mut self, progress: ReadingProgress) {
        self.progress = progress.clone();
        let Some(book_id) = self.current else {
            return;
        };

        self.cancel_pending_write();
        let token = CancellationToken::new();
        let task_token = token.clone();
        let storage = self.storage.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = task_token.cancelled() => {}
                _ = tokio::time::sleep(PROGRESS_DEBOUNCE) => {
                    if let Err(err) = storage.save_progress(book_id, &progress).await {
                        error!("Failed to persist reading progress for {book_id}: {err}");
                    }
                }
            }
        });
        self.pending_write = Some(PendingWrite { token, handle });
    }

    fn cancel_pending_write(&mut self) {
        if let Some(pending) = self.pending_write.take() {
            pending.token.cancel();
        }
    }

    fn persist_progress_detached(&self, book_id: Uuid, progress: ReadingProgress) {
        let storage = self.storage.clone();
        tokio::spawn(async move {
            if let Err(err) = storage.save_progress(book_id, &progress).await {
                error!("Failed to persist reading progress for {book_id}: {err}");
            }
        });
    }

    //=====================================================================================
    // Text Selection
    //=====================================================================================

    /// Sets the selected text and its context together.
    pub fn handle_text_selection(&mut self, text: String, context: SelectionContext) {
        info!(
            "Selected {} characters in '{}'",
            text.chars().count(),
            context.chapter_title
        );
        self.selected_text = text;
        self.selection = Some(context);
    }

    pub fn clear_selection(&mut self) {
        self.selected_text.clear();
        self.selection = None;
    }

    //=====================================================================================
    // Bookmarks
    //=====================================================================================

    /// Appends a bookmark for the current file and persists the full list
    /// immediately. Returns `None` when no file is open.
    pub async fn add_bookmark(&mut self, draft: BookmarkDraft) -> Option<Bookmark> {
        let book_id = self.current?;
        let bookmark = Bookmark {
            id: Uuid::new_v4(),
            book_id,
            title: draft.title,
            cfi_range: draft.cfi_range,
            selected_text: draft.selected_text,
            note: draft.note,
            color: draft.color,
            created_at: Utc::now(),
        };
        info!("Bookmarked '{}'", bookmark.title);
        self.bookmarks.push(bookmark.clone());
        self.persist_bookmarks(book_id).await;
        Some(bookmark)
    }

    /// Creates a bookmark from the current selection, titled with the first
    /// 50 characters of the selected text, then clears the selection.
    pub async fn bookmark_from_selection(
        &mut self,
        note: String,
        color: BookmarkColor,
    ) -> Option<Bookmark> {
        if self.selected_text.is_empty() {
            return None;
        }
        let context = self.selection.clone()?;
        let draft = BookmarkDraft {
            title: truncate_title(&self.selected_text),
            cfi_range: context.cfi_range,
            selected_text: self.selected_text.clone(),
            note,
            color,
        };
        let bookmark = self.add_bookmark(draft).await?;
        self.clear_selection();
        Some(bookmark)
    }

    /// Removes a bookmark by id and persists the remaining list immediately.
    pub async fn remove_bookmark(&mut self, id: Uuid) {
        let Some(book_id) = self.current else {
            return;
        };
        self.bookmarks.retain(|b| b.id != id);
        self.persist_bookmarks(book_id).await;
    }

    async fn persist_bookmarks(&self, book_id: Uuid) {
        if let Err(err) = self.storage.save_bookmarks(book_id, &self.bookmarks).await {
            error!("Failed to persist bookmarks for {book_id}: {err}");
        }
    }

    //=====================================================================================
    // Settings
    //=====================================================================================

    /// Merges the patch into the current settings and persists immediately.
    pub async fn update_settings(&mut self, patch: SettingsPatch) {
        self.settings.apply(patch);
        if let Err(err) = self.storage.save_settings(&self.settings).await {
            error!("Failed to persist reading settings: {err}");
        }
    }

    //=====================================================================================
    // Teardown
    //=====================================================================================

    /// Tears the session down: flushes the pending progress write, then
    /// revokes every remaining access URL exactly once.
    pub async fn shutdown(&mut self) {
        if let Some(pending) = self.pending_write.take() {
            if !pending.handle.is_finished() {
                pending.token.cancel();
                if let Some(book_id) = self.current {
                    if let Err(err) = self.storage.save_progress(book_id, &self.progress).await {
                        error!("Failed to flush reading progress for {book_id}: {err}");
                    }
                }
            }
        }

        let revoked = self.urls.revoke_all();
        if revoked > 0 {
            info!("Revoked {revoked} remaining access URLs");
        }
        self.files.clear();
        self.current = None;
    }

    //=====================================================================================
    // Accessors
    //=====================================================================================

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn current_file(&self) -> Option<&UploadedFile> {
        self.current
            .and_then(|id| self.files.iter().find(|f| f.id == id))
    }

    pub fn progress(&self) -> &ReadingProgress {
        &self.progress
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn settings(&self) -> &ReadingSettings {
        &self.settings
    }

    pub fn selected_text(&self) -> &str {
        &self.selected_text
    }

    pub fn selection(&self) -> Option<&SelectionContext> {
        self.selection.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn has_selected_text(&self) -> bool {
        !self.selected_text.is_empty()
    }

    pub fn can_navigate(&self) -> bool {
        self.current.is_some()
    }

    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    /// Resolves an access URL to the file's bytes, for handing to the
    /// external renderer.
    pub fn resolve_access_url(&self, url: &str) -> Option<Bytes> {
        self.urls.resolve(url)
    }
}

fn truncate_title(text: &str) -> String {
    let mut chars = text.chars();
    let title: String = chars.by_ref().take(BOOKMARK_TITLE_CHARS).collect();
    if chars.next().is_some() {
        format!("{title}...")
    } else {
        title
    }
}
