pub mod store;
pub mod upload;
pub mod urls;

// Re-export the session store and the upload pipeline types to make them
// easily accessible to embedders of the library.
pub use store::{ReaderSession, PROGRESS_DEBOUNCE};
pub use upload::{RawUpload, RejectedUpload, UploadOutcome, ValidationError};
pub use urls::UrlRegistry;
