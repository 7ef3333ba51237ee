//! Uploaded file handling and attachment staging
//!
//! Campaign attachments arrive in memory via multipart parsing, get
//! validated (size, count, MIME via magic numbers), are staged to a
//! temp directory for the duration of one send, and are removed
//! afterwards.

mod attachments;
mod validation;

pub use attachments::{AttachmentStore, StagedAttachment};
pub use validation::MimeValidator;

use thiserror::Error;

/// Content types allowed as campaign attachments
pub const ALLOWED_ATTACHMENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Errors that can occur during file handling
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error during a storage operation
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid file path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// File size exceeds limit
    #[error("File size {actual} exceeds limit of {limit} bytes")]
    FileSizeExceeded {
        /// Actual file size
        actual: u64,
        /// Maximum allowed size
        limit: u64,
    },

    /// Invalid MIME type
    #[error("Invalid MIME type: expected {expected:?}, got {actual}")]
    InvalidMimeType {
        /// Expected MIME types
        expected: Vec<String>,
        /// Actual MIME type
        actual: String,
    },

    /// Too many files in one upload
    #[error("Upload contains {actual} files, maximum is {max}")]
    TooManyFiles {
        /// Actual count
        actual: usize,
        /// Maximum allowed
        max: usize,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A file that has been uploaded but not yet staged to disk
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original filename from the upload
    pub filename: String,

    /// MIME content type as declared by the client
    pub content_type: String,

    /// File data as bytes
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Creates a new uploaded file
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Returns the size of the file in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Validates the file size against a maximum limit
    ///
    /// # Errors
    ///
    /// Returns `StorageError::FileSizeExceeded` if the file is larger
    /// than `max_bytes`
    pub fn validate_size(&self, max_bytes: u64) -> StorageResult<()> {
        let size = self.size();
        if size > max_bytes {
            return Err(StorageError::FileSizeExceeded {
                actual: size,
                limit: max_bytes,
            });
        }
        Ok(())
    }

    /// Validates the declared MIME type against an allowlist
    ///
    /// Checks only the client-provided content type; combine with
    /// [`MimeValidator`] for magic-number verification.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidMimeType` if the content type is
    /// not in `allowed_types`
    pub fn validate_mime(&self, allowed_types: &[&str]) -> StorageResult<()> {
        if !allowed_types.contains(&self.content_type.as_str()) {
            return Err(StorageError::InvalidMimeType {
                expected: allowed_types.iter().map(|s| (*s).to_string()).collect(),
                actual: self.content_type.clone(),
            });
        }
        Ok(())
    }

    /// Extracts the file extension from the filename
    ///
    /// Returns `None` if the filename has no extension
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let parts: Vec<&str> = self.filename.rsplitn(2, '.').collect();
        if parts.len() == 2 {
            Some(parts[0])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_counts_bytes() {
        let file = UploadedFile::new("test.txt", "text/plain", vec![1, 2, 3, 4, 5]);
        assert_eq!(file.size(), 5);
    }

    #[test]
    fn validate_size_enforces_limit() {
        let file = UploadedFile::new("test.txt", "text/plain", vec![1, 2, 3]);
        assert!(file.validate_size(10).is_ok());
        assert!(matches!(
            file.validate_size(2),
            Err(StorageError::FileSizeExceeded { actual: 3, limit: 2 })
        ));
    }

    #[test]
    fn validate_mime_checks_allowlist() {
        let file = UploadedFile::new("photo.jpg", "image/jpeg", vec![]);
        assert!(file.validate_mime(&["image/jpeg", "image/png"]).is_ok());
        assert!(file.validate_mime(&["image/png"]).is_err());
    }

    #[test]
    fn extension_extraction() {
        let file = UploadedFile::new("document.pdf", "application/pdf", vec![]);
        assert_eq!(file.extension(), Some("pdf"));

        let no_ext = UploadedFile::new("README", "text/plain", vec![]);
        assert_eq!(no_ext.extension(), None);
    }

    #[test]
    fn allowlist_covers_spec_types() {
        for mime in [
            "image/jpeg",
            "image/png",
            "image/gif",
            "image/webp",
            "application/pdf",
        ] {
            assert!(ALLOWED_ATTACHMENT_TYPES.contains(&mime));
        }
        assert!(!ALLOWED_ATTACHMENT_TYPES.contains(&"application/zip"));
    }
}
