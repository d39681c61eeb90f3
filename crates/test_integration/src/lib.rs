#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap
)]

#[cfg(test)]
pub mod runner;
#[cfg(test)]
pub mod test_constants;
#[cfg(test)]
pub mod test_helpers;
#[cfg(test)]
pub mod tests;

#[cfg(test)]
mod test_runner {
    use crate::runner::context::test_context::TestContext;
    use crate::runner::orchestration_utils::setup_tracing_and_panic_handling;
    use crate::tests::test_album::{
        test_album_collaborators, test_album_lifecycle, test_public_album_view,
    };
    use crate::tests::test_auth::{test_admin_routes_require_admin, test_me, test_missing_token};
    use crate::tests::test_interaction::{
        test_bulk_moderation, test_comments, test_likes, test_reports,
    };
    use crate::tests::test_notification::{
        test_admin_notification_and_emails, test_notification_templates, test_preferences,
        test_upload_notifications,
    };
    use crate::tests::test_root::{test_health_endpoint, test_openapi_document};
    use crate::tests::test_upload::{
        test_guest_upload, test_rejected_upload, test_upload_download, test_upload_management,
    };
    use crate::{execute_suite, run_test};
    use color_eyre::Result;
    use colored::*;
    use std::time::Instant;

    #[tokio::test]
    async fn integration_suite() -> Result<()> {
        setup_tracing_and_panic_handling();
        let context = TestContext::new().await?;

        execute_suite!(
            &context,
            [
                // -- Root --
                test_health_endpoint,
                test_openapi_document,
                // -- Auth --
                test_missing_token,
                test_me,
                test_admin_routes_require_admin,
                // -- Albums --
                test_album_lifecycle,
                test_public_album_view,
                test_album_collaborators,
                // -- Uploads --
                test_guest_upload,
                test_rejected_upload,
                test_upload_management,
                test_upload_download,
                // -- Interactions --
                test_likes,
                test_comments,
                test_reports,
                test_bulk_moderation,
                // -- Notifications --
                test_upload_notifications,
                test_preferences,
                test_admin_notification_and_emails,
                test_notification_templates,
            ]
        );

        Ok(())
    }
}
