//! crates/epub_reader_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage backend or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Placeholder metadata derived for an uploaded book.
///
/// Real metadata extraction is delegated to an external EPUB renderer; until a
/// book is opened there, the title comes from the filename and the remaining
/// fields carry fixed placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub language: String,
}

/// A user-supplied EPUB accepted by the upload pipeline.
///
/// `access_url` is a revocable reference into the session's URL registry; it
/// must be revoked exactly once, either when the file is removed or when the
/// session shuts down.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub id: Uuid,
    pub file_name: String,
    pub size_bytes: u64,
    pub metadata: BookMetadata,
    pub access_url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Position within one book, overwritten on every navigation event.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingProgress {
    pub current_page: u32,
    pub total_pages: u32,
    pub percentage: f32,
    pub current_chapter: String,
    pub estimated_time_left_secs: u32,
}

impl ReadingProgress {
    /// The zero-state a book starts from before any navigation happens.
    pub fn zero() -> Self {
        Self {
            current_page: 0,
            total_pages: 0,
            percentage: 0.0,
            current_chapter: String::new(),
            estimated_time_left_secs: 0,
        }
    }
}

impl Default for ReadingProgress {
    fn default() -> Self {
        Self::zero()
    }
}

/// Where a text selection was made, reported by the external renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionContext {
    pub chapter_title: String,
    pub page_number: Option<u32>,
    /// CFI range locating the span inside the book's content.
    pub cfi_range: String,
}

/// Color tag attached to a bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookmarkColor {
    #[default]
    Yellow,
    Green,
    Blue,
    Red,
    Purple,
}

/// A saved point of interest inside one book.
#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    pub id: Uuid,
    pub book_id: Uuid,
    pub title: String,
    pub cfi_range: String,
    pub selected_text: String,
    pub note: String,
    pub color: BookmarkColor,
    pub created_at: DateTime<Utc>,
}

/// The caller-supplied part of a bookmark; id and timestamp are synthesized
/// by the session when the bookmark is created.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkDraft {
    pub title: String,
    pub cfi_range: String,
    pub selected_text: String,
    pub note: String,
    pub color: BookmarkColor,
}

/// Display theme for the reading surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Sepia,
}

/// Horizontal sizing of the reading column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageWidth {
    #[default]
    Auto,
    Narrow,
    Wide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarginSize {
    Small,
    #[default]
    Medium,
    Large,
}

/// User display preferences, merged with persisted overrides at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingSettings {
    pub font_size: u32,
    pub font_family: String,
    pub line_height: f32,
    pub theme: Theme,
    pub page_width: PageWidth,
    pub margin: MarginSize,
}

impl Default for ReadingSettings {
    fn default() -> Self {
        Self {
            font_size: 16,
            font_family: "Georgia, serif".to_string(),
            line_height: 1.6,
            theme: Theme::Light,
            page_width: PageWidth::Auto,
            margin: MarginSize::Medium,
        }
    }
}

/// A partial settings update; each present field replaces the current value
/// (shallow, last-write-wins per field).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub font_size: Option<u32>,
    pub font_family: Option<String>,
    pub line_height: Option<f32>,
    pub theme: Option<Theme>,
    pub page_width: Option<PageWidth>,
    pub margin: Option<MarginSize>,
}

impl ReadingSettings {
    /// Merge a patch into these settings, field by field.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(font_size) = patch.font_size {
            self.font_size = font_size;
        }
        if let Some(font_family) = patch.font_family {
            self.font_family = font_family;
        }
        if let Some(line_height) = patch.line_height {
            self.line_height = line_height;
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(page_width) = patch.page_width {
            self.page_width = page_width;
        }
        if let Some(margin) = patch.margin {
            self.margin = margin;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_progress_is_the_default() {
        let progress = ReadingProgress::default();
        assert_eq!(progress, ReadingProgress::zero());
        assert_eq!(progress.current_page, 0);
        assert_eq!(progress.percentage, 0.0);
        assert!(progress.current_chapter.is_empty());
    }

    #[test]
    fn settings_patch_is_shallow_last_write_wins() {
        let mut settings = ReadingSettings::default();
        settings.apply(SettingsPatch {
            font_size: Some(20),
            theme: Some(Theme::Dark),
            ..SettingsPatch::default()
        });

        assert_eq!(settings.font_size, 20);
        assert_eq!(settings.theme, Theme::Dark);
        // Untouched fields keep their previous values.
        assert_eq!(settings.font_family, "Georgia, serif");
        assert_eq!(settings.margin, MarginSize::Medium);
    }

    #[test]
    fn bookmark_color_defaults_to_yellow() {
        assert_eq!(BookmarkColor::default(), BookmarkColor::Yellow);
    }
}
