//! Email campaign handlers
//!
//! The send flow runs validate → resolve → dispatch → cleanup →
//! report. HTTP-level success is reported as long as the loop ran,
//! even when individual sends failed; per-recipient failures travel
//! in the response body.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    auth::AdminClaims,
    campaign::{
        dispatch_campaign,
        recipients::{find_recipients, resolve_recipient, resolve_recipients},
        template::{render_campaign, TemplateVars},
        CampaignContent, RecipientQuery,
    },
    email::EmailAttachment,
    error::ApiError,
    extractors::CampaignForm,
    state::AppState,
    storage::StagedAttachment,
};

/// `GET /admin/campaign/recipients`
///
/// Unpaginated recipient selection view.
///
/// # Errors
///
/// Returns `BadRequest` for an unparseable unit id.
pub async fn recipients(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Query(query): Query<RecipientQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let recipients = find_recipients(state.db(), &query).await?;

    Ok(Json(json!({
        "success": true,
        "data": recipients,
    })))
}

/// `POST /admin/campaign/preview`
///
/// Renders the first selected recipient's version of the campaign.
/// Never sends mail and never stages attachments to disk.
///
/// # Errors
///
/// Returns `BadRequest` when no recipients are selected or the first
/// one does not resolve.
pub async fn preview(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    form: CampaignForm,
) -> Result<impl IntoResponse, ApiError> {
    let first = form
        .recipient_ids
        .first()
        .copied()
        .ok_or_else(|| ApiError::bad_request("At least one recipient is required for preview"))?;

    let recipient = resolve_recipient(state.db(), first)
        .await?
        .ok_or_else(|| ApiError::bad_request("Recipient not found"))?;

    let vars = TemplateVars::for_recipient(&recipient);
    let preview_html =
        render_campaign(&form.subject, &form.header_title, &form.body_content, &vars);

    let attachments: Vec<_> = form
        .attachments
        .iter()
        .map(|file| {
            json!({
                "filename": file.filename,
                "size": file.size(),
                "type": file.content_type,
            })
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "data": {
            "previewHtml": preview_html,
            "previewRecipient": {
                "name": recipient.name,
                "email": recipient.email,
            },
            "attachments": attachments,
        },
    })))
}

/// `POST /admin/campaign/send`
///
/// # Errors
///
/// Returns `BadRequest` when validation fails before any send;
/// per-recipient failures are reported in the body, not as errors.
pub async fn send(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    form: CampaignForm,
) -> Result<impl IntoResponse, ApiError> {
    if form.recipient_ids.is_empty() {
        return Err(ApiError::bad_request("At least one recipient is required"));
    }

    if form.subject.trim().is_empty() || form.body_content.trim().is_empty() {
        return Err(ApiError::bad_request("Subject and body content are required"));
    }

    // Ids that don't resolve to a live user are silently absent here.
    let recipients = resolve_recipients(state.db(), &form.recipient_ids).await?;

    let staged = state.attachments().stage_all(&form.attachments).await?;
    let email_attachments: Vec<EmailAttachment> = staged
        .iter()
        .map(StagedAttachment::to_email_attachment)
        .collect();

    let content = CampaignContent {
        subject: form.subject,
        header_title: form.header_title,
        body: form.body_content,
    };

    let outcome = dispatch_campaign(
        state.mailer().as_ref(),
        &state.config().smtp.from,
        &content,
        &recipients,
        &email_attachments,
    )
    .await;

    // Cleanup runs regardless of per-recipient outcomes; failures are
    // logged inside discard and never surfaced.
    state.attachments().discard(&staged).await;

    tracing::info!(
        admin = %claims.sub,
        sent = outcome.sent,
        failed = outcome.failed,
        attachments = staged.len(),
        "email campaign dispatched"
    );

    let message = if outcome.failed > 0 {
        format!(
            "Email sent to {} recipients ({} failed)",
            outcome.sent, outcome.failed
        )
    } else {
        format!("Email sent to {} recipients", outcome.sent)
    };

    Ok(Json(json!({
        "success": true,
        "message": message,
        "data": outcome,
    })))
}
