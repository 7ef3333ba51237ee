//! Multipart extractor for campaign preview/send requests
//!
//! The campaign endpoints accept a multipart form with text fields
//! (`recipientIds`, `subject`, `headerTitle`, `bodyContent`) and up
//! to five `attachments` files. Attachment count, per-file size, and
//! MIME type (declared header plus magic-number check) are enforced
//! here, before any handler logic runs.

use axum::extract::{FromRequest, Multipart, Request};
use uuid::Uuid;

use crate::{
    error::ApiError,
    state::AppState,
    storage::{MimeValidator, StorageError, UploadedFile, ALLOWED_ATTACHMENT_TYPES},
};

/// Parsed campaign form
#[derive(Debug, Default)]
pub struct CampaignForm {
    /// Recipient user ids, in request order
    pub recipient_ids: Vec<Uuid>,

    /// Email subject
    pub subject: String,

    /// Branded header title (may be blank)
    pub header_title: String,

    /// Body template with `{{...}}` tokens
    pub body_content: String,

    /// Validated attachments, still in memory
    pub attachments: Vec<UploadedFile>,
}

impl FromRequest<AppState> for CampaignForm {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart form: {e}")))?;

        let max_files = state.config().uploads.max_files;
        let max_file_bytes = state.config().uploads.max_file_bytes;
        let validator = MimeValidator::new();

        let mut form = Self::default();
        let mut recipient_ids_raw = String::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart form: {e}")))?
        {
            if let Some(filename) = field.file_name() {
                if form.attachments.len() >= max_files {
                    return Err(StorageError::TooManyFiles {
                        actual: form.attachments.len() + 1,
                        max: max_files,
                    }
                    .into());
                }

                let filename = filename.to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid attachment: {e}")))?;

                let file = UploadedFile::new(filename, content_type, data.to_vec());
                file.validate_size(max_file_bytes)?;
                file.validate_mime(ALLOWED_ATTACHMENT_TYPES)?;
                validator.validate_against_magic(&file, ALLOWED_ATTACHMENT_TYPES)?;

                form.attachments.push(file);
                continue;
            }

            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Invalid form field: {e}")))?;

            match name.as_str() {
                "recipientIds" => recipient_ids_raw = value,
                "subject" => form.subject = value,
                "headerTitle" => form.header_title = value,
                "bodyContent" => form.body_content = value,
                _ => {}
            }
        }

        form.recipient_ids = parse_recipient_ids(&recipient_ids_raw)?;

        Ok(form)
    }
}

/// Parse the `recipientIds` field
///
/// Accepts either a JSON array of id strings or a comma-separated
/// list. Blank entries are skipped; anything that is not a UUID is a
/// `BadRequest`.
///
/// # Errors
///
/// Returns `BadRequest` naming the first malformed id.
pub fn parse_recipient_ids(raw: &str) -> Result<Vec<Uuid>, ApiError> {
    let candidates: Vec<String> = serde_json::from_str(raw)
        .unwrap_or_else(|_| raw.split(',').map(|s| s.trim().to_string()).collect());

    candidates
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(&s)
                .map_err(|_| ApiError::BadRequest(format!("Invalid recipient ID format: {s}")))
        })
        .collect()
}
