//! services/reader/src/session/upload.rs
//!
//! The upload/validation pipeline. Validates raw file handles, synthesizes
//! placeholder metadata, and emits `UploadedFile`s with revocable access URLs.
//! Real metadata extraction belongs to the external EPUB renderer; nothing
//! here inspects file content.

use bytes::Bytes;
use chrono::Utc;
use epub_reader_core::domain::{BookMetadata, UploadedFile};
use tracing::{info, warn};
use uuid::Uuid;

use super::urls::UrlRegistry;

/// Fixed per-file size ceiling: 100 MiB.
pub const MAX_EPUB_BYTES: u64 = 100 * 1024 * 1024;

const EPUB_SUFFIX: &str = ".epub";
const EXPECTED_CONTENT_TYPES: [&str; 2] = ["application/epub+zip", "application/zip"];
// Some shippers report plain zip, so content type is advisory only.
const PLACEHOLDER_AUTHOR: &str = "Unknown";
const DEFAULT_LANGUAGE: &str = "ja";

/// A raw file handle as it arrives from the picker or drop target.
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("'{0}' is not an .epub file")]
    InvalidExtension(String),

    #[error("'{name}' is {size} bytes, above the {limit} byte ceiling")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    #[error("batch of {requested} would exceed the {max} file limit ({existing} already uploaded)")]
    TooManyFiles {
        requested: usize,
        existing: usize,
        max: usize,
    },
}

/// One input that failed validation; the rest of the batch is unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedUpload {
    pub name: String,
    pub reason: ValidationError,
}

#[derive(Debug, Default)]
pub struct UploadOutcome {
    pub accepted: Vec<UploadedFile>,
    pub rejected: Vec<RejectedUpload>,
}

/// Runs the pipeline over one batch.
///
/// A batch that would push the uploaded-file count past `max_files` is
/// rejected whole. Otherwise each file is validated independently: a bad
/// extension or an oversized file rejects that file only. Accepted files get
/// placeholder metadata and an access URL from the registry.
pub fn process_batch(
    uploads: Vec<RawUpload>,
    existing_count: usize,
    max_files: usize,
    urls: &mut UrlRegistry,
) -> Result<UploadOutcome, ValidationError> {
    if existing_count + uploads.len() > max_files {
        return Err(ValidationError::TooManyFiles {
            requested: uploads.len(),
            existing: existing_count,
            max: max_files,
        });
    }

    let mut outcome = UploadOutcome::default();
    for upload in uploads {
        match validate(&upload) {
            Ok(()) => {
                let size_bytes = upload.bytes.len() as u64;
                let metadata = placeholder_metadata(&upload.name);
                let access_url = urls.allocate(upload.bytes);
                info!(
                    "Accepted upload '{}' ({})",
                    metadata.title,
                    format_file_size(size_bytes)
                );
                outcome.accepted.push(UploadedFile {
                    id: Uuid::new_v4(),
                    file_name: upload.name,
                    size_bytes,
                    metadata,
                    access_url,
                    uploaded_at: Utc::now(),
                });
            }
            Err(reason) => {
                warn!("Rejected upload '{}': {}", upload.name, reason);
                outcome.rejected.push(RejectedUpload {
                    name: upload.name,
                    reason,
                });
            }
        }
    }
    Ok(outcome)
}

fn validate(upload: &RawUpload) -> Result<(), ValidationError> {
    if !upload.name.to_ascii_lowercase().ends_with(EPUB_SUFFIX) {
        return Err(ValidationError::InvalidExtension(upload.name.clone()));
    }

    let size = upload.bytes.len() as u64;
    if size > MAX_EPUB_BYTES {
        return Err(ValidationError::FileTooLarge {
            name: upload.name.clone(),
            size,
            limit: MAX_EPUB_BYTES,
        });
    }

    if let Some(content_type) = upload.content_type.as_deref() {
        if !EXPECTED_CONTENT_TYPES.contains(&content_type) {
            warn!(
                "Unexpected content type '{}' for '{}'",
                content_type, upload.name
            );
        }
    }

    Ok(())
}

/// Filename-derived title plus fixed placeholders, until the external
/// renderer opens the book and reports real metadata.
fn placeholder_metadata(file_name: &str) -> BookMetadata {
    let title = file_name[..file_name.len() - EPUB_SUFFIX.len()].to_string();
    BookMetadata {
        title,
        author: PLACEHOLDER_AUTHOR.to_string(),
        publisher: PLACEHOLDER_AUTHOR.to_string(),
        language: DEFAULT_LANGUAGE.to_string(),
    }
}

/// Human-readable byte count for log lines and file cards.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let exponent = (bytes.ilog2() / 10).min(UNITS.len() as u32 - 1);
    if exponent == 0 {
        return format!("{bytes} B");
    }
    let value = bytes as f64 / f64::powi(1024.0, exponent as i32);
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[exponent as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epub(name: &str, len: usize) -> RawUpload {
        RawUpload {
            name: name.to_string(),
            content_type: Some("application/epub+zip".to_string()),
            bytes: Bytes::from(vec![0u8; len]),
        }
    }

    #[test]
    fn accepts_epub_and_derives_title_from_filename() {
        let mut urls = UrlRegistry::new();
        let outcome = process_batch(vec![epub("book.epub", 10)], 0, 10, &mut urls).unwrap();

        assert_eq!(outcome.accepted.len(), 1);
        assert!(outcome.rejected.is_empty());
        let file = &outcome.accepted[0];
        assert_eq!(file.metadata.title, "book");
        assert_eq!(file.metadata.author, "Unknown");
        assert_eq!(file.size_bytes, 10);
        assert!(urls.resolve(&file.access_url).is_some());
    }

    #[test]
    fn rejects_wrong_extension_without_touching_the_rest_of_the_batch() {
        let mut urls = UrlRegistry::new();
        let outcome = process_batch(
            vec![epub("book.txt", 10), epub("other.EPUB", 10)],
            0,
            10,
            &mut urls,
        )
        .unwrap();

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].file_name, "other.EPUB");
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(
            outcome.rejected[0].reason,
            ValidationError::InvalidExtension("book.txt".to_string())
        );
        // The rejected file got no access URL.
        assert_eq!(urls.live_count(), 1);
    }

    #[test]
    fn rejects_oversized_file() {
        let mut urls = UrlRegistry::new();
        let mut upload = epub("big.epub", 1);
        upload.bytes = Bytes::from(vec![0u8; (MAX_EPUB_BYTES + 1) as usize]);

        let outcome = process_batch(vec![upload], 0, 10, &mut urls).unwrap();

        assert!(outcome.accepted.is_empty());
        assert!(matches!(
            outcome.rejected[0].reason,
            ValidationError::FileTooLarge { .. }
        ));
    }

    #[test]
    fn rejects_whole_batch_over_the_file_limit() {
        let mut urls = UrlRegistry::new();
        let batch = vec![epub("a.epub", 1), epub("b.epub", 1)];

        let err = process_batch(batch, 9, 10, &mut urls).unwrap_err();

        assert_eq!(
            err,
            ValidationError::TooManyFiles {
                requested: 2,
                existing: 9,
                max: 10,
            }
        );
        assert_eq!(urls.live_count(), 0);
    }

    #[test]
    fn zero_byte_files_pass_and_unexpected_content_type_is_advisory() {
        let mut urls = UrlRegistry::new();
        let upload = RawUpload {
            name: "empty.epub".to_string(),
            content_type: Some("text/plain".to_string()),
            bytes: Bytes::new(),
        };

        let outcome = process_batch(vec![upload], 0, 10, &mut urls).unwrap();

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].size_bytes, 0);
    }

    #[test]
    fn duplicate_filenames_get_independent_identifiers() {
        let mut urls = UrlRegistry::new();
        let outcome = process_batch(
            vec![epub("same.epub", 1), epub("same.epub", 1)],
            0,
            10,
            &mut urls,
        )
        .unwrap();

        assert_eq!(outcome.accepted.len(), 2);
        assert_ne!(outcome.accepted[0].id, outcome.accepted[1].id);
        assert_ne!(outcome.accepted[0].access_url, outcome.accepted[1].access_url);
    }

    #[test]
    fn file_sizes_format_in_binary_units() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
    }
}
