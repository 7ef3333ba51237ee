//! Attachment staging for campaign sends
//!
//! Uploaded attachments are written to a temp directory for the
//! duration of one send call, referenced by path from the outgoing
//! emails, and discarded once the dispatch loop finishes.

use std::path::PathBuf;

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::email::EmailAttachment;

use super::{StorageResult, UploadedFile};

/// An attachment staged on disk for one campaign send
#[derive(Debug, Clone)]
pub struct StagedAttachment {
    /// Original upload filename (shown to recipients)
    pub filename: String,

    /// MIME content type
    pub content_type: String,

    /// Size in bytes
    pub size: u64,

    /// Staged location on disk
    pub path: PathBuf,
}

impl StagedAttachment {
    /// Convert into the attachment shape the email builder expects
    #[must_use]
    pub fn to_email_attachment(&self) -> EmailAttachment {
        EmailAttachment {
            filename: self.filename.clone(),
            content_type: self.content_type.clone(),
            path: self.path.clone(),
        }
    }
}

/// Staging area for campaign attachments
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::PathBuf;
/// use cohort_portal::storage::{AttachmentStore, UploadedFile};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = AttachmentStore::new(PathBuf::from("./uploads/email-attachments"))?;
///
/// let file = UploadedFile::new("report.pdf", "application/pdf", vec![/* ... */]);
/// let staged = store.stage(&file).await?;
///
/// // ... dispatch the campaign ...
///
/// store.discard(&[staged]).await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    /// Base directory for staged files
    dir: PathBuf,
}

impl AttachmentStore {
    /// Creates a staging area rooted at `dir`
    ///
    /// The directory is created lazily on first stage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` if `dir` exists and is not
    /// a directory.
    pub fn new(dir: PathBuf) -> StorageResult<Self> {
        if dir.exists() && !dir.is_dir() {
            return Err(super::StorageError::InvalidPath(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        Ok(Self { dir })
    }

    /// Write an uploaded file to the staging directory
    ///
    /// The staged name is unique per call (`attachment-<uuid>.<ext>`)
    /// so concurrent sends cannot collide; the original filename is
    /// preserved in the returned metadata.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created or the
    /// file cannot be written.
    pub async fn stage(&self, file: &UploadedFile) -> StorageResult<StagedAttachment> {
        fs::create_dir_all(&self.dir).await?;

        let staged_name = file.extension().map_or_else(
            || format!("attachment-{}", Uuid::new_v4()),
            |ext| format!("attachment-{}.{ext}", Uuid::new_v4()),
        );
        let path = self.dir.join(staged_name);

        let mut f = fs::File::create(&path).await?;
        f.write_all(&file.data).await?;
        f.flush().await?;

        Ok(StagedAttachment {
            filename: file.filename.clone(),
            content_type: file.content_type.clone(),
            size: file.size(),
            path,
        })
    }

    /// Stage several uploaded files
    ///
    /// # Errors
    ///
    /// Returns the first I/O error; files staged before the failure
    /// are discarded so a failed request leaves nothing behind.
    pub async fn stage_all(
        &self,
        files: &[UploadedFile],
    ) -> StorageResult<Vec<StagedAttachment>> {
        let mut staged = Vec::with_capacity(files.len());
        for file in files {
            match self.stage(file).await {
                Ok(attachment) => staged.push(attachment),
                Err(error) => {
                    self.discard(&staged).await;
                    return Err(error);
                }
            }
        }
        Ok(staged)
    }

    /// Remove staged files after a send
    ///
    /// Best effort: a failed unlink is logged and never surfaced to
    /// the caller.
    pub async fn discard(&self, attachments: &[StagedAttachment]) {
        for attachment in attachments {
            if let Err(error) = fs::remove_file(&attachment.path).await {
                tracing::warn!(
                    path = %attachment.path.display(),
                    %error,
                    "failed to delete staged attachment"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stage_writes_file_with_original_metadata() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = AttachmentStore::new(dir.path().to_path_buf()).expect("store");

        let file = UploadedFile::new("report.pdf", "application/pdf", b"%PDF-1.4".to_vec());
        let staged = store.stage(&file).await.expect("stage");

        assert_eq!(staged.filename, "report.pdf");
        assert_eq!(staged.content_type, "application/pdf");
        assert_eq!(staged.size, 8);
        assert!(staged.path.exists());
        assert!(staged
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("attachment-") && n.ends_with(".pdf")));
    }

    #[tokio::test]
    async fn staged_names_are_unique() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = AttachmentStore::new(dir.path().to_path_buf()).expect("store");

        let file = UploadedFile::new("a.png", "image/png", vec![1, 2, 3]);
        let first = store.stage(&file).await.expect("stage first");
        let second = store.stage(&file).await.expect("stage second");

        assert_ne!(first.path, second.path);
    }

    #[tokio::test]
    async fn discard_removes_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = AttachmentStore::new(dir.path().to_path_buf()).expect("store");

        let file = UploadedFile::new("a.gif", "image/gif", b"GIF89a".to_vec());
        let staged = store.stage(&file).await.expect("stage");
        assert!(staged.path.exists());

        store.discard(std::slice::from_ref(&staged)).await;
        assert!(!staged.path.exists());
    }

    #[tokio::test]
    async fn discard_tolerates_missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = AttachmentStore::new(dir.path().to_path_buf()).expect("store");

        let ghost = StagedAttachment {
            filename: "ghost.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size: 0,
            path: dir.path().join("attachment-missing.pdf"),
        };

        // Must not panic or error
        store.discard(&[ghost]).await;
    }

    #[test]
    fn new_rejects_non_directory() {
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        let result = AttachmentStore::new(file.path().to_path_buf());
        assert!(result.is_err());
    }
}
