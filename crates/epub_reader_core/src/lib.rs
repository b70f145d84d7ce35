pub mod domain;
pub mod ports;

pub use domain::{
    BookMetadata, Bookmark, BookmarkColor, BookmarkDraft, MarginSize, PageWidth, ReadingProgress,
    ReadingSettings, SelectionContext, SettingsPatch, Theme, UploadedFile,
};
pub use ports::{PortError, PortResult, StorageService};
