//! services/reader/src/adapters/records.rs
//!
//! "Impure" serialized record structs shared by the storage adapters, plus the
//! key layout of the persisted store. The records mirror the pure domain types
//! one-to-one; adapters convert at the boundary so the core stays free of
//! serde. No record carries a schema-version field.

use chrono::{DateTime, Utc};
use epub_reader_core::domain::{
    Bookmark, BookmarkColor, MarginSize, PageWidth, ReadingProgress, ReadingSettings, Theme,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Key Layout
//=========================================================================================

pub(crate) fn progress_key(namespace: &str, book_id: Uuid) -> String {
    format!("{namespace}-progress-{book_id}")
}

pub(crate) fn bookmarks_key(namespace: &str, book_id: Uuid) -> String {
    format!("{namespace}-bookmarks-{book_id}")
}

pub(crate) fn settings_key(namespace: &str) -> String {
    format!("{namespace}-settings")
}

//=========================================================================================
// Serialized Record Structs
//=========================================================================================

#[derive(Serialize, Deserialize)]
pub(crate) struct ProgressRecord {
    current_page: u32,
    total_pages: u32,
    percentage: f32,
    current_chapter: String,
    estimated_time_left_secs: u32,
}

impl ProgressRecord {
    pub(crate) fn from_domain(progress: &ReadingProgress) -> Self {
        Self {
            current_page: progress.current_page,
            total_pages: progress.total_pages,
            percentage: progress.percentage,
            current_chapter: progress.current_chapter.clone(),
            estimated_time_left_secs: progress.estimated_time_left_secs,
        }
    }

    pub(crate) fn to_domain(self) -> ReadingProgress {
        ReadingProgress {
            current_page: self.current_page,
            total_pages: self.total_pages,
            percentage: self.percentage,
            current_chapter: self.current_chapter,
            estimated_time_left_secs: self.estimated_time_left_secs,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ColorRecord {
    Yellow,
    Green,
    Blue,
    Red,
    Purple,
}

impl ColorRecord {
    fn from_domain(color: BookmarkColor) -> Self {
        match color {
            BookmarkColor::Yellow => Self::Yellow,
            BookmarkColor::Green => Self::Green,
            BookmarkColor::Blue => Self::Blue,
            BookmarkColor::Red => Self::Red,
            BookmarkColor::Purple => Self::Purple,
        }
    }

    fn to_domain(self) -> BookmarkColor {
        match self {
            Self::Yellow => BookmarkColor::Yellow,
            Self::Green => BookmarkColor::Green,
            Self::Blue => BookmarkColor::Blue,
            Self::Red => BookmarkColor::Red,
            Self::Purple => BookmarkColor::Purple,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub(crate) struct BookmarkRecord {
    id: Uuid,
    book_id: Uuid,
    title: String,
    cfi_range: String,
    selected_text: String,
    note: String,
    color: ColorRecord,
    created_at: DateTime<Utc>,
}

impl BookmarkRecord {
    pub(crate) fn from_domain(bookmark: &Bookmark) -> Self {
        Self {
            id: bookmark.id,
            book_id: bookmark.book_id,
            title: bookmark.title.clone(),
            cfi_range: bookmark.cfi_range.clone(),
            selected_text: bookmark.selected_text.clone(),
            note: bookmark.note.clone(),
            color: ColorRecord::from_domain(bookmark.color),
            created_at: bookmark.created_at,
        }
    }

    pub(crate) fn to_domain(self) -> Bookmark {
        Bookmark {
            id: self.id,
            book_id: self.book_id,
            title: self.title,
            cfi_range: self.cfi_range,
            selected_text: self.selected_text,
            note: self.note,
            color: self.color.to_domain(),
            created_at: self.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ThemeRecord {
    Light,
    Dark,
    Sepia,
}

#[derive(Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PageWidthRecord {
    Auto,
    Narrow,
    Wide,
}

#[derive(Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub(crate) enum MarginRecord {
    Small,
    Medium,
    Large,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct SettingsRecord {
    font_size: u32,
    font_family: String,
    line_height: f32,
    theme: ThemeRecord,
    page_width: PageWidthRecord,
    margin: MarginRecord,
}

impl SettingsRecord {
    pub(crate) fn from_domain(settings: &ReadingSettings) -> Self {
        Self {
            font_size: settings.font_size,
            font_family: settings.font_family.clone(),
            line_height: settings.line_height,
            theme: match settings.theme {
                Theme::Light => ThemeRecord::Light,
                Theme::Dark => ThemeRecord::Dark,
                Theme::Sepia => ThemeRecord::Sepia,
            },
            page_width: match settings.page_width {
                PageWidth::Auto => PageWidthRecord::Auto,
                PageWidth::Narrow => PageWidthRecord::Narrow,
                PageWidth::Wide => PageWidthRecord::Wide,
            },
            margin: match settings.margin {
                MarginSize::Small => MarginRecord::Small,
                MarginSize::Medium => MarginRecord::Medium,
                MarginSize::Large => MarginRecord::Large,
            },
        }
    }

    pub(crate) fn to_domain(self) -> ReadingSettings {
        ReadingSettings {
            font_size: self.font_size,
            font_family: self.font_family,
            line_height: self.line_height,
            theme: match self.theme {
                ThemeRecord::Light => Theme::Light,
                ThemeRecord::Dark => Theme::Dark,
                ThemeRecord::Sepia => Theme::Sepia,
            },
            page_width: match self.page_width {
                PageWidthRecord::Auto => PageWidth::Auto,
                PageWidthRecord::Narrow => PageWidth::Narrow,
                PageWidthRecord::Wide => PageWidth::Wide,
            },
            margin: match self.margin {
                MarginRecord::Small => MarginSize::Small,
                MarginRecord::Medium => MarginSize::Medium,
                MarginRecord::Large => MarginSize::Large,
            },
        }
    }
}
