use crate::api::notification::email::{EmailDispatcher, EmailRecipient};
use crate::api::notification::error::NotificationError;
use crate::api::notification::interfaces::{
    CreateNotificationRequest, CreateTemplateRequest, ListEmailsParams, ListNotificationsParams,
    MarkAllReadResponse, NotificationStatsResponse, RetryDueResponse, SendTemplateEmailRequest,
    UpdatePreferencesRequest, UpdateTemplateRequest, clamp_limit,
};
use crate::api::notification::templates::{
    RenderedEmail, TemplateContext, new_comment_email, new_upload_email, render_stored,
    system_email,
};
use crate::database::DbError;
use crate::database::album::album::Album;
use crate::database::interaction::UploadComment;
use crate::database::notification::{
    EmailNotification, EmailStatus, NewNotification, Notification, NotificationPreference,
    NotificationType,
};
use crate::database::notification_store::NotificationStore;
use crate::database::notification_template::{
    NewNotificationTemplate, NotificationTemplate, TemplateType,
};
use crate::database::template_store::TemplateStore;
use crate::database::upload::Upload;
use crate::database::user_store::UserStore;
use app_state::AppSettings;
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const RECENT_NOTIFICATIONS: i64 = 5;
const TEMPLATE_NAME_COLUMN: &str = "notification_template.name";
const MAX_TEMPLATE_NAME_LEN: usize = 100;
const MAX_SUBJECT_LEN: usize = 200;

async fn insert_notification(
    pool: &SqlitePool,
    notification: &NewNotification,
) -> Result<Notification, NotificationError> {
    let id = Uuid::new_v4().to_string();
    Ok(NotificationStore::insert(pool, &id, notification, Utc::now()).await?)
}

//================================================================================
// In-app Notifications
//================================================================================

#[instrument(skip(pool))]
pub async fn list_notifications(
    pool: &SqlitePool,
    user_id: i64,
    params: &ListNotificationsParams,
) -> Result<Vec<Notification>, NotificationError> {
    Ok(NotificationStore::list_for_recipient(
        pool,
        user_id,
        params.unread_only,
        clamp_limit(params.limit),
    )
    .await?)
}

#[instrument(skip(pool))]
pub async fn get_notification(
    pool: &SqlitePool,
    user_id: i64,
    notification_id: &str,
) -> Result<Notification, NotificationError> {
    NotificationStore::find_for_recipient(pool, notification_id, user_id)
        .await?
        .ok_or_else(|| NotificationError::NotFound(notification_id.to_owned()))
}

#[instrument(skip(pool))]
pub async fn mark_read(
    pool: &SqlitePool,
    user_id: i64,
    notification_id: &str,
) -> Result<Notification, NotificationError> {
    NotificationStore::mark_read(pool, notification_id, user_id, Utc::now())
        .await?
        .ok_or_else(|| NotificationError::NotFound(notification_id.to_owned()))
}

#[instrument(skip(pool))]
pub async fn mark_all_read(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<MarkAllReadResponse, NotificationError> {
    let updated = NotificationStore::mark_all_read(pool, user_id, Utc::now()).await?;
    Ok(MarkAllReadResponse { updated })
}

#[instrument(skip(pool))]
pub async fn get_stats(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<NotificationStatsResponse, NotificationError> {
    let (total, unread) = NotificationStore::counts_for_recipient(pool, user_id).await?;
    let recent =
        NotificationStore::list_for_recipient(pool, user_id, false, RECENT_NOTIFICATIONS).await?;
    Ok(NotificationStatsResponse {
        total_notifications: total,
        unread_notifications: unread,
        recent_notifications: recent,
    })
}

/// Admin-issued notification, optionally mailed as well.
#[instrument(skip(pool, mailer, request), fields(recipient_id = request.recipient_id))]
pub async fn create_notification(
    pool: &SqlitePool,
    mailer: &EmailDispatcher,
    request: CreateNotificationRequest,
) -> Result<Notification, NotificationError> {
    if request.title.trim().is_empty() {
        return Err(NotificationError::BadRequest("title is required".into()));
    }
    let recipient = UserStore::find_by_id(pool, request.recipient_id)
        .await?
        .ok_or_else(|| NotificationError::NotFound(format!("user {}", request.recipient_id)))?;

    let notification = insert_notification(
        pool,
        &NewNotification {
            recipient_id: recipient.id,
            notification_type: request.notification_type,
            title: request.title.trim().to_owned(),
            message: request.message.clone(),
            album_id: request.album_id.clone(),
            upload_id: request.upload_id.clone(),
            data: if request.data.is_null() {
                json!({})
            } else {
                request.data
            },
        },
    )
    .await?;

    if request.send_email {
        let content = system_email(&recipient.name, &notification.title, &notification.message);
        let recipient = EmailRecipient {
            email: recipient.email,
            name: recipient.name,
            user_id: Some(recipient.id),
            album_id: request.album_id,
            upload_id: request.upload_id,
        };
        if let Err(e) = mailer.queue_and_send(pool, recipient, content).await {
            warn!("Could not queue email for notification {}: {e}", notification.id);
        }
    }

    Ok(notification)
}

//================================================================================
// Preferences
//================================================================================

/// Stored preferences of a user, or the defaults when none were saved.
#[instrument(skip(pool))]
pub async fn get_preferences(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<NotificationPreference, NotificationError> {
    Ok(NotificationStore::find_preference(pool, user_id)
        .await?
        .unwrap_or_else(|| NotificationPreference::defaults_for(user_id)))
}

#[instrument(skip(pool, request))]
pub async fn update_preferences(
    pool: &SqlitePool,
    user_id: i64,
    request: &UpdatePreferencesRequest,
) -> Result<NotificationPreference, NotificationError> {
    let updated = request.apply(get_preferences(pool, user_id).await?);
    NotificationStore::upsert_preference(pool, &updated, Utc::now()).await?;
    Ok(updated)
}

//================================================================================
// Email Queue
//================================================================================

#[instrument(skip(pool))]
pub async fn list_emails(
    pool: &SqlitePool,
    params: &ListEmailsParams,
) -> Result<Vec<EmailNotification>, NotificationError> {
    Ok(NotificationStore::list_emails(pool, params.status, clamp_limit(params.limit)).await?)
}

/// Re-sends one failed email, ignoring its backoff.
#[instrument(skip(pool, mailer))]
pub async fn retry_email(
    pool: &SqlitePool,
    mailer: &EmailDispatcher,
    email_id: &str,
) -> Result<EmailNotification, NotificationError> {
    let email = NotificationStore::find_email(pool, email_id)
        .await?
        .ok_or_else(|| NotificationError::NotFound(email_id.to_owned()))?;
    if !email.can_retry() {
        return Err(NotificationError::NotRetryable(email_id.to_owned()));
    }
    mailer.deliver(pool, email).await
}

/// Re-sends every failed email whose backoff has elapsed.
#[instrument(skip(pool, mailer))]
pub async fn retry_due_emails(
    pool: &SqlitePool,
    mailer: &EmailDispatcher,
) -> Result<RetryDueResponse, NotificationError> {
    let now = Utc::now();
    let due: Vec<EmailNotification> = NotificationStore::list_retryable_emails(pool)
        .await?
        .into_iter()
        .filter(|email| email.is_retry_due(now))
        .collect();

    let mut outcome = RetryDueResponse {
        attempted: due.len(),
        ..RetryDueResponse::default()
    };
    for email in due {
        let delivered = mailer.deliver(pool, email).await?;
        if delivered.status == EmailStatus::Sent {
            outcome.sent += 1;
        } else {
            outcome.failed += 1;
        }
    }
    info!(
        "Retried {} due emails: {} sent, {} failed",
        outcome.attempted, outcome.sent, outcome.failed
    );
    Ok(outcome)
}

//================================================================================
// Templates
//================================================================================

fn validate_template(name: &str, subject: &str, html: &str) -> Result<(), NotificationError> {
    if name.is_empty() || name.chars().count() > MAX_TEMPLATE_NAME_LEN {
        return Err(NotificationError::BadRequest(format!(
            "name must be 1 to {MAX_TEMPLATE_NAME_LEN} characters"
        )));
    }
    if subject.is_empty() || subject.chars().count() > MAX_SUBJECT_LEN {
        return Err(NotificationError::BadRequest(format!(
            "subject must be 1 to {MAX_SUBJECT_LEN} characters"
        )));
    }
    if html.trim().is_empty() {
        return Err(NotificationError::BadRequest("htmlContent is required".into()));
    }
    Ok(())
}

fn name_conflict(err: DbError, name: &str) -> NotificationError {
    if err.violates_unique(TEMPLATE_NAME_COLUMN) {
        NotificationError::Conflict(format!("template \"{name}\" already exists"))
    } else {
        err.into()
    }
}

#[instrument(skip(pool))]
pub async fn list_templates(
    pool: &SqlitePool,
) -> Result<Vec<NotificationTemplate>, NotificationError> {
    Ok(TemplateStore::list(pool).await?)
}

#[instrument(skip(pool))]
pub async fn get_template(
    pool: &SqlitePool,
    template_id: i64,
) -> Result<NotificationTemplate, NotificationError> {
    TemplateStore::find_by_id(pool, template_id)
        .await?
        .ok_or_else(|| NotificationError::NotFound(format!("template {template_id}")))
}

#[instrument(skip(pool, request), fields(name = %request.name))]
pub async fn create_template(
    pool: &SqlitePool,
    request: CreateTemplateRequest,
) -> Result<NotificationTemplate, NotificationError> {
    let template = NewNotificationTemplate {
        name: request.name.trim().to_owned(),
        template_type: request.template_type,
        subject: request.subject.trim().to_owned(),
        html_content: request.html_content,
        text_content: request.text_content,
        available_variables: request.available_variables,
        is_active: request.is_active,
    };
    validate_template(&template.name, &template.subject, &template.html_content)?;

    let created = TemplateStore::insert(pool, &template, Utc::now())
        .await
        .map_err(|e| name_conflict(e, &template.name))?;
    info!("Created notification template {} ({})", created.id, created.name);
    Ok(created)
}

#[instrument(skip(pool, request))]
pub async fn update_template(
    pool: &SqlitePool,
    template_id: i64,
    request: UpdateTemplateRequest,
) -> Result<NotificationTemplate, NotificationError> {
    let mut updated = request.apply(get_template(pool, template_id).await?);
    updated.name = updated.name.trim().to_owned();
    updated.subject = updated.subject.trim().to_owned();
    validate_template(&updated.name, &updated.subject, &updated.html_content)?;

    TemplateStore::update(pool, &updated, Utc::now())
        .await
        .map_err(|e| name_conflict(e, &updated.name))?
        .ok_or_else(|| NotificationError::NotFound(format!("template {template_id}")))
}

/// Emails already sent from the template keep their content; their
/// `templateId` is cleared.
#[instrument(skip(pool))]
pub async fn delete_template(pool: &SqlitePool, template_id: i64) -> Result<(), NotificationError> {
    if TemplateStore::delete(pool, template_id).await? {
        info!("Deleted notification template {template_id}");
        Ok(())
    } else {
        Err(NotificationError::NotFound(format!("template {template_id}")))
    }
}

/// Renders a named template with the given context and emails it.
#[instrument(skip(pool, mailer, request), fields(template = %request.template_name))]
pub async fn send_template_email(
    pool: &SqlitePool,
    mailer: &EmailDispatcher,
    request: SendTemplateEmailRequest,
) -> Result<EmailNotification, NotificationError> {
    let recipient_email = request.recipient_email.trim().to_owned();
    if !recipient_email.contains('@') {
        return Err(NotificationError::BadRequest(
            "recipientEmail is not an email address".into(),
        ));
    }
    let template = TemplateStore::find_by_name(pool, request.template_name.trim())
        .await?
        .ok_or_else(|| NotificationError::NotFound(format!("template {}", request.template_name)))?;
    if !template.is_active {
        return Err(NotificationError::BadRequest(format!(
            "template {} is inactive",
            template.name
        )));
    }

    let mut context = TemplateContext::from_json(&request.context);
    if !request.recipient_name.is_empty() {
        context.set_default("user.name", request.recipient_name.clone());
    }
    let content = render_stored(&template, &context);
    let user_id = UserStore::find_by_email(pool, &recipient_email)
        .await?
        .map(|user| user.id);

    let recipient = EmailRecipient {
        email: recipient_email,
        name: request.recipient_name,
        user_id,
        album_id: request.album_id,
        upload_id: request.upload_id,
    };
    mailer.queue_and_send(pool, recipient, content).await
}

/// Renders the active stored template for an event, or the built-in email
/// when there is none.
async fn event_email(
    pool: &SqlitePool,
    template_type: TemplateType,
    context: &TemplateContext,
    built_in: impl FnOnce() -> RenderedEmail,
) -> Result<RenderedEmail, NotificationError> {
    match TemplateStore::find_active_by_type(pool, template_type).await? {
        Some(template) => {
            debug!("Rendering stored template {} for {template_type:?}", template.name);
            Ok(render_stored(&template, context))
        }
        None => Ok(built_in()),
    }
}

//================================================================================
// Event Fan-out
//================================================================================

/// Tells the album owner about a new upload, in-app and by email, as their
/// preferences allow.
#[instrument(skip_all, fields(album_id = %album.id, upload_id = %upload.id))]
pub async fn notify_new_upload(
    pool: &SqlitePool,
    settings: &AppSettings,
    mailer: &EmailDispatcher,
    album: &Album,
    upload: &Upload,
) -> Result<(), NotificationError> {
    let Some(owner) = UserStore::find_by_id(pool, album.owner_id).await? else {
        debug!("Owner {} of album {} not found", album.owner_id, album.id);
        return Ok(());
    };
    let preference = get_preferences(pool, owner.id).await?;
    let uploader = upload.uploader_display_name();

    if preference.app_new_upload {
        insert_notification(
            pool,
            &NewNotification {
                recipient_id: owner.id,
                notification_type: NotificationType::Upload,
                title: "New upload".to_owned(),
                message: format!(
                    "{uploader} uploaded {} to \"{}\"",
                    upload.original_filename, album.title
                ),
                album_id: Some(album.id.clone()),
                upload_id: Some(upload.id.clone()),
                data: json!({
                    "fileType": upload.file_type,
                    "uploaderName": uploader,
                    "status": upload.status,
                }),
            },
        )
        .await?;
    }

    if preference.email_new_upload && !owner.email.is_empty() {
        let album_url = settings.albums.upload_url(&album.access_code);
        let context = TemplateContext::default()
            .with("user.name", owner.name.as_str())
            .with("album.title", album.title.as_str())
            .with("album.url", album_url.as_str())
            .with("upload.original_filename", upload.original_filename.as_str())
            .with("upload.uploader_name", uploader);
        let content = event_email(pool, TemplateType::NewUpload, &context, || {
            new_upload_email(
                &owner.name,
                &album.title,
                uploader,
                &upload.original_filename,
                &album_url,
            )
        })
        .await?;
        let recipient = EmailRecipient {
            email: owner.email,
            name: owner.name,
            user_id: Some(owner.id),
            album_id: Some(album.id.clone()),
            upload_id: Some(upload.id.clone()),
        };
        mailer.queue_and_send(pool, recipient, content).await?;
    }
    Ok(())
}

/// Tells the registered uploader of an upload about a new comment, unless they
/// wrote it themselves.
#[instrument(skip_all, fields(upload_id = %upload.id, comment_id = comment.id))]
pub async fn notify_new_comment(
    pool: &SqlitePool,
    mailer: &EmailDispatcher,
    album: &Album,
    upload: &Upload,
    comment: &UploadComment,
) -> Result<(), NotificationError> {
    let Some(recipient_id) = upload
        .uploader_user_id
        .filter(|id| *id != comment.author_id)
    else {
        return Ok(());
    };
    let Some(recipient) = UserStore::find_by_id(pool, recipient_id).await? else {
        return Ok(());
    };
    let preference = get_preferences(pool, recipient.id).await?;

    if preference.app_new_comment {
        insert_notification(
            pool,
            &NewNotification {
                recipient_id: recipient.id,
                notification_type: NotificationType::Comment,
                title: "New comment".to_owned(),
                message: format!(
                    "{} commented on {}",
                    comment.author_name, upload.original_filename
                ),
                album_id: Some(album.id.clone()),
                upload_id: Some(upload.id.clone()),
                data: json!({ "commentId": comment.id, "authorId": comment.author_id }),
            },
        )
        .await?;
    }

    if preference.email_new_comment && !recipient.email.is_empty() {
        let context = TemplateContext::default()
            .with("user.name", recipient.name.as_str())
            .with("album.title", album.title.as_str())
            .with("upload.original_filename", upload.original_filename.as_str())
            .with("comment.author_name", comment.author_name.as_str())
            .with("comment.content", comment.content.as_str());
        let content = event_email(pool, TemplateType::NewComment, &context, || {
            new_comment_email(
                &recipient.name,
                &comment.author_name,
                &album.title,
                &upload.original_filename,
                &comment.content,
            )
        })
        .await?;
        let recipient = EmailRecipient {
            email: recipient.email,
            name: recipient.name,
            user_id: Some(recipient.id),
            album_id: Some(album.id.clone()),
            upload_id: Some(upload.id.clone()),
        };
        mailer.queue_and_send(pool, recipient, content).await?;
    }
    Ok(())
}
