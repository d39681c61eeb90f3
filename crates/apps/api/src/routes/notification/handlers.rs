use crate::api_state::ApiContext;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use common_services::api::notification::error::NotificationError;
use common_services::api::notification::interfaces::{
    CreateNotificationRequest, CreateTemplateRequest, EmailIdParams, ListEmailsParams,
    ListNotificationsParams, MarkAllReadResponse, NotificationIdParams, NotificationStatsResponse,
    RetryDueResponse, SendTemplateEmailRequest, TemplateIdParams, UpdatePreferencesRequest,
    UpdateTemplateRequest,
};
use common_services::api::notification::service::{
    create_notification, create_template, delete_template, get_notification, get_preferences,
    get_stats, get_template, list_emails, list_notifications, list_templates, mark_all_read,
    mark_read, retry_due_emails, retry_email, send_template_email, update_preferences,
    update_template,
};
use common_services::database::app_user::User;
use common_services::database::notification::{
    EmailNotification, Notification, NotificationPreference,
};
use common_services::database::notification_template::NotificationTemplate;
use tracing::instrument;

//==============================================================================
// Recipient endpoints
//==============================================================================

/// List the user's notifications, newest first.
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "Notification",
    params(ListNotificationsParams),
    responses(
        (status = 200, description = "The user's notifications.", body = Vec<Notification>),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_notifications_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Query(params): Query<ListNotificationsParams>,
) -> Result<Json<Vec<Notification>>, NotificationError> {
    Ok(Json(
        list_notifications(&context.pool, user.id, &params).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/notifications/stats",
    tag = "Notification",
    responses(
        (status = 200, description = "Total and unread counts plus the latest notifications.", body = NotificationStatsResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_notification_stats_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
) -> Result<Json<NotificationStatsResponse>, NotificationError> {
    Ok(Json(get_stats(&context.pool, user.id).await?))
}

#[utoipa::path(
    get,
    path = "/notifications/{notification_id}",
    tag = "Notification",
    params(NotificationIdParams),
    responses(
        (status = 200, description = "The notification.", body = Notification),
        (status = 404, description = "No such notification for this user."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_notification_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<NotificationIdParams>,
) -> Result<Json<Notification>, NotificationError> {
    Ok(Json(
        get_notification(&context.pool, user.id, &params.notification_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/notifications/{notification_id}/read",
    tag = "Notification",
    params(NotificationIdParams),
    responses(
        (status = 200, description = "The notification, marked as read.", body = Notification),
        (status = 404, description = "No such notification for this user."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user), fields(user_id = user.id))]
pub async fn mark_read_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<NotificationIdParams>,
) -> Result<Json<Notification>, NotificationError> {
    Ok(Json(
        mark_read(&context.pool, user.id, &params.notification_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/notifications/mark-all-read",
    tag = "Notification",
    responses(
        (status = 200, description = "How many notifications were marked.", body = MarkAllReadResponse),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user), fields(user_id = user.id))]
pub async fn mark_all_read_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
) -> Result<Json<MarkAllReadResponse>, NotificationError> {
    Ok(Json(mark_all_read(&context.pool, user.id).await?))
}

/// Get the user's notification preferences. Users without stored preferences get the defaults.
#[utoipa::path(
    get,
    path = "/notifications/preferences",
    tag = "Notification",
    responses(
        (status = 200, description = "The user's preferences.", body = NotificationPreference),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_preferences_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
) -> Result<Json<NotificationPreference>, NotificationError> {
    Ok(Json(get_preferences(&context.pool, user.id).await?))
}

/// Update the user's notification preferences. Omitted fields keep their value.
#[utoipa::path(
    put,
    path = "/notifications/preferences",
    tag = "Notification",
    request_body = UpdatePreferencesRequest,
    responses(
        (status = 200, description = "The updated preferences.", body = NotificationPreference),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user, payload), fields(user_id = user.id))]
pub async fn update_preferences_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Json(payload): Json<UpdatePreferencesRequest>,
) -> Result<Json<NotificationPreference>, NotificationError> {
    Ok(Json(
        update_preferences(&context.pool, user.id, &payload).await?,
    ))
}

//==============================================================================
// Admin endpoints
//==============================================================================

/// Send a notification to a user, optionally by email too.
#[utoipa::path(
    post,
    path = "/notifications/send",
    tag = "Notification",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification created.", body = Notification),
        (status = 400, description = "Missing title."),
        (status = 404, description = "Recipient not found."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, payload))]
pub async fn send_notification_handler(
    State(context): State<ApiContext>,
    Json(payload): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>), NotificationError> {
    let notification = create_notification(&context.pool, &context.mailer, payload).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

#[utoipa::path(
    get,
    path = "/notifications/emails",
    tag = "Notification",
    params(ListEmailsParams),
    responses(
        (status = 200, description = "Outbound emails, newest first.", body = Vec<EmailNotification>),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_emails_handler(
    State(context): State<ApiContext>,
    Query(params): Query<ListEmailsParams>,
) -> Result<Json<Vec<EmailNotification>>, NotificationError> {
    Ok(Json(list_emails(&context.pool, &params).await?))
}

/// Send one failed email again, ignoring its backoff.
#[utoipa::path(
    post,
    path = "/notifications/emails/{email_id}/retry",
    tag = "Notification",
    params(EmailIdParams),
    responses(
        (status = 200, description = "The email after the attempt.", body = EmailNotification),
        (status = 404, description = "Email not found."),
        (status = 409, description = "The email was sent or has no retries left."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context))]
pub async fn retry_email_handler(
    State(context): State<ApiContext>,
    Path(params): Path<EmailIdParams>,
) -> Result<Json<EmailNotification>, NotificationError> {
    Ok(Json(
        retry_email(&context.pool, &context.mailer, &params.email_id).await?,
    ))
}

/// Retry every failed email whose backoff has elapsed.
///
/// There is no background scheduler; call this periodically from an external timer.
#[utoipa::path(
    post,
    path = "/notifications/emails/retry-due",
    tag = "Notification",
    responses(
        (status = 200, description = "Outcome of the retry pass.", body = RetryDueResponse),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context))]
pub async fn retry_due_emails_handler(
    State(context): State<ApiContext>,
) -> Result<Json<RetryDueResponse>, NotificationError> {
    Ok(Json(
        retry_due_emails(&context.pool, &context.mailer).await?,
    ))
}

//==============================================================================
// Template endpoints (admin)
//==============================================================================

#[utoipa::path(
    get,
    path = "/notifications/templates",
    tag = "Notification",
    responses(
        (status = 200, description = "All stored email templates.", body = Vec<NotificationTemplate>),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_templates_handler(
    State(context): State<ApiContext>,
) -> Result<Json<Vec<NotificationTemplate>>, NotificationError> {
    Ok(Json(list_templates(&context.pool).await?))
}

/// Store a new email template. An active template of type `new_upload` or
/// `new_comment` replaces the built-in email for that event.
#[utoipa::path(
    post,
    path = "/notifications/templates",
    tag = "Notification",
    request_body = CreateTemplateRequest,
    responses(
        (status = 201, description = "Template created.", body = NotificationTemplate),
        (status = 400, description = "Missing name, subject or HTML body."),
        (status = 409, description = "A template with this name exists."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, payload))]
pub async fn create_template_handler(
    State(context): State<ApiContext>,
    Json(payload): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<NotificationTemplate>), NotificationError> {
    let template = create_template(&context.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

#[utoipa::path(
    get,
    path = "/notifications/templates/{template_id}",
    tag = "Notification",
    params(TemplateIdParams),
    responses(
        (status = 200, description = "The template.", body = NotificationTemplate),
        (status = 404, description = "Template not found."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_template_handler(
    State(context): State<ApiContext>,
    Path(params): Path<TemplateIdParams>,
) -> Result<Json<NotificationTemplate>, NotificationError> {
    Ok(Json(get_template(&context.pool, params.template_id).await?))
}

#[utoipa::path(
    put,
    path = "/notifications/templates/{template_id}",
    tag = "Notification",
    params(TemplateIdParams),
    request_body = UpdateTemplateRequest,
    responses(
        (status = 200, description = "The updated template.", body = NotificationTemplate),
        (status = 400, description = "A required field was emptied."),
        (status = 404, description = "Template not found."),
        (status = 409, description = "Another template has this name."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, payload))]
pub async fn update_template_handler(
    State(context): State<ApiContext>,
    Path(params): Path<TemplateIdParams>,
    Json(payload): Json<UpdateTemplateRequest>,
) -> Result<Json<NotificationTemplate>, NotificationError> {
    Ok(Json(
        update_template(&context.pool, params.template_id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/notifications/templates/{template_id}",
    tag = "Notification",
    params(TemplateIdParams),
    responses(
        (status = 204, description = "Template deleted."),
        (status = 404, description = "Template not found."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context))]
pub async fn delete_template_handler(
    State(context): State<ApiContext>,
    Path(params): Path<TemplateIdParams>,
) -> Result<StatusCode, NotificationError> {
    delete_template(&context.pool, params.template_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Render a stored template by name and email it to one address.
#[utoipa::path(
    post,
    path = "/notifications/send-email",
    tag = "Notification",
    request_body = SendTemplateEmailRequest,
    responses(
        (status = 201, description = "The queued email after the first delivery attempt.", body = EmailNotification),
        (status = 400, description = "Bad recipient address or inactive template."),
        (status = 404, description = "No template with this name."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, payload))]
pub async fn send_template_email_handler(
    State(context): State<ApiContext>,
    Json(payload): Json<SendTemplateEmailRequest>,
) -> Result<(StatusCode, Json<EmailNotification>), NotificationError> {
    let email = send_template_email(&context.pool, &context.mailer, payload).await?;
    Ok((StatusCode::CREATED, Json(email)))
}
