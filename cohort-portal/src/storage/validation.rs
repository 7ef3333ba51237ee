//! MIME type validation with magic number checking
//!
//! The Content-Type header is client-provided and easily forged, so
//! attachment validation also examines file signatures (magic
//! numbers) via the `infer` crate.

use super::{StorageError, StorageResult, UploadedFile};

/// MIME type validator using magic number detection
#[derive(Debug, Clone, Default)]
pub struct MimeValidator {
    /// Whether to strictly enforce magic number matches
    strict: bool,
}

impl MimeValidator {
    /// Creates a validator in strict mode
    ///
    /// In strict mode a file whose type cannot be detected from its
    /// content is rejected.
    #[must_use]
    pub const fn new() -> Self {
        Self { strict: true }
    }

    /// Creates a validator in permissive mode
    ///
    /// If the magic number cannot be detected, the validator falls
    /// back to checking the Content-Type header.
    #[must_use]
    pub const fn permissive() -> Self {
        Self { strict: false }
    }

    /// Detects the actual MIME type from file content
    ///
    /// Returns `None` if the file type cannot be determined.
    #[must_use]
    pub fn detect_mime(&self, file: &UploadedFile) -> Option<&'static str> {
        infer::get(&file.data).map(|kind| kind.mime_type())
    }

    /// Validates file content against allowed MIME types
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidMimeType` if:
    /// - The detected type is not in `allowed_types`
    /// - In strict mode: the file type cannot be detected
    pub fn validate_against_magic(
        &self,
        file: &UploadedFile,
        allowed_types: &[&str],
    ) -> StorageResult<()> {
        match self.detect_mime(file) {
            Some(detected_type) => {
                if !allowed_types.contains(&detected_type) {
                    return Err(StorageError::InvalidMimeType {
                        expected: allowed_types.iter().map(|s| (*s).to_string()).collect(),
                        actual: detected_type.to_string(),
                    });
                }
                Ok(())
            }
            None => {
                if self.strict {
                    Err(StorageError::InvalidMimeType {
                        expected: allowed_types.iter().map(|s| (*s).to_string()).collect(),
                        actual: "unknown (could not detect from content)".to_string(),
                    })
                } else {
                    file.validate_mime(allowed_types)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    const PDF_MAGIC: &[u8] = b"%PDF-1.4";
    const ZIP_MAGIC: &[u8] = &[0x50, 0x4B, 0x03, 0x04];

    #[test]
    fn detects_jpeg() {
        let file = UploadedFile::new("test.jpg", "image/jpeg", JPEG_MAGIC.to_vec());
        let validator = MimeValidator::new();
        assert_eq!(validator.detect_mime(&file), Some("image/jpeg"));
    }

    #[test]
    fn detects_pdf() {
        let file = UploadedFile::new("test.pdf", "application/pdf", PDF_MAGIC.to_vec());
        let validator = MimeValidator::new();
        assert_eq!(validator.detect_mime(&file), Some("application/pdf"));
    }

    #[test]
    fn accepts_allowed_type() {
        let file = UploadedFile::new("photo.png", "image/png", PNG_MAGIC.to_vec());
        let validator = MimeValidator::new();
        assert!(validator
            .validate_against_magic(&file, &["image/png", "image/jpeg"])
            .is_ok());
    }

    #[test]
    fn rejects_disallowed_type() {
        let file = UploadedFile::new("photo.jpg", "image/jpeg", JPEG_MAGIC.to_vec());
        let validator = MimeValidator::new();
        let result = validator.validate_against_magic(&file, &["image/png"]);
        assert!(matches!(
            result,
            Err(StorageError::InvalidMimeType { .. })
        ));
    }

    #[test]
    fn rejects_forged_extension() {
        // A ZIP renamed to photo.jpg with a forged Content-Type header
        let file = UploadedFile::new("photo.jpg", "image/jpeg", ZIP_MAGIC.to_vec());
        let validator = MimeValidator::new();
        assert!(validator
            .validate_against_magic(&file, &["image/jpeg"])
            .is_err());
    }

    #[test]
    fn strict_mode_rejects_undetectable() {
        let file = UploadedFile::new("test.txt", "text/plain", b"hello".to_vec());
        let validator = MimeValidator::new();
        assert!(validator
            .validate_against_magic(&file, &["text/plain"])
            .is_err());
    }

    #[test]
    fn permissive_mode_falls_back_to_header() {
        let file = UploadedFile::new("test.txt", "text/plain", b"hello".to_vec());
        let validator = MimeValidator::permissive();
        assert!(validator
            .validate_against_magic(&file, &["text/plain"])
            .is_ok());
    }
}
