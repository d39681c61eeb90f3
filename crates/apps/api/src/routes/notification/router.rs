use crate::api_state::ApiContext;
use crate::routes::notification::handlers::{
    create_template_handler, delete_template_handler, get_notification_handler,
    get_notification_stats_handler, get_preferences_handler, get_template_handler,
    list_emails_handler, list_notifications_handler, list_templates_handler,
    mark_all_read_handler, mark_read_handler, retry_due_emails_handler, retry_email_handler,
    send_notification_handler, send_template_email_handler, update_preferences_handler,
    update_template_handler,
};
use axum::{
    Router,
    routing::{get, post},
};

pub fn notification_protected_router() -> Router<ApiContext> {
    Router::new()
        .route("/notifications", get(list_notifications_handler))
        .route("/notifications/stats", get(get_notification_stats_handler))
        .route("/notifications/mark-all-read", post(mark_all_read_handler))
        .route(
            "/notifications/preferences",
            get(get_preferences_handler).put(update_preferences_handler),
        )
        .route(
            "/notifications/{notification_id}",
            get(get_notification_handler),
        )
        .route(
            "/notifications/{notification_id}/read",
            post(mark_read_handler),
        )
}

pub fn notification_admin_router() -> Router<ApiContext> {
    Router::new()
        .route("/notifications/send", post(send_notification_handler))
        .route("/notifications/send-email", post(send_template_email_handler))
        .route(
            "/notifications/templates",
            get(list_templates_handler).post(create_template_handler),
        )
        .route(
            "/notifications/templates/{template_id}",
            get(get_template_handler)
                .put(update_template_handler)
                .delete(delete_template_handler),
        )
        .route("/notifications/emails", get(list_emails_handler))
        .route(
            "/notifications/emails/retry-due",
            post(retry_due_emails_handler),
        )
        .route(
            "/notifications/emails/{email_id}/retry",
            post(retry_email_handler),
        )
}
