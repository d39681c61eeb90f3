use crate::routes::{album, auth, interaction, notification, root, upload};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        root::handlers::root,
        root::handlers::health_check,
        // Auth handlers
        auth::handlers::get_me,
        // Album handlers
        album::handlers::list_event_types_handler,
        album::handlers::get_public_album_handler,
        album::handlers::create_album_handler,
        album::handlers::list_albums_handler,
        album::handlers::get_owner_stats_handler,
        album::handlers::get_album_details_handler,
        album::handlers::update_album_handler,
        album::handlers::delete_album_handler,
        album::handlers::update_album_status_handler,
        album::handlers::get_album_qr_handler,
        album::handlers::get_album_stats_handler,
        album::handlers::list_collaborators_handler,
        album::handlers::add_collaborator_handler,
        album::handlers::remove_collaborator_handler,
        // Upload handlers
        upload::handlers::submit_upload_handler,
        upload::handlers::list_uploads_handler,
        upload::handlers::get_upload_stats_handler,
        upload::handlers::get_upload_handler,
        upload::handlers::update_upload_handler,
        upload::handlers::delete_upload_handler,
        upload::handlers::download_upload_handler,
        // Interaction handlers
        interaction::handlers::toggle_like_handler,
        interaction::handlers::list_comments_handler,
        interaction::handlers::add_comment_handler,
        interaction::handlers::report_upload_handler,
        interaction::handlers::list_reports_handler,
        interaction::handlers::resolve_report_handler,
        interaction::handlers::moderate_upload_handler,
        interaction::handlers::bulk_moderate_handler,
        // Notification handlers
        notification::handlers::list_notifications_handler,
        notification::handlers::get_notification_stats_handler,
        notification::handlers::get_notification_handler,
        notification::handlers::mark_read_handler,
        notification::handlers::mark_all_read_handler,
        notification::handlers::get_preferences_handler,
        notification::handlers::update_preferences_handler,
        notification::handlers::send_notification_handler,
        notification::handlers::list_emails_handler,
        notification::handlers::retry_email_handler,
        notification::handlers::retry_due_emails_handler,
        notification::handlers::list_templates_handler,
        notification::handlers::create_template_handler,
        notification::handlers::get_template_handler,
        notification::handlers::update_template_handler,
        notification::handlers::delete_template_handler,
        notification::handlers::send_template_email_handler,
    ),
    components(
        schemas(
        ),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "EventVault", description = "EventVault's API"),
        (name = "Album", description = "Event albums, access codes and collaborators"),
        (name = "Upload", description = "Guest uploads and managing uploaded files"),
        (name = "Interaction", description = "Likes, comments, reports and moderation"),
        (name = "Notification", description = "In-app notifications, preferences and outbound email"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "System", description = "Health check"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
