use axum::body::Body;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;
use common_services::api::auth::error::AuthError;
use common_services::database::app_user::{User, UserRole};
use http::Request;
use tracing::debug;

/// Gate for routes that need a platform role. Admins pass every gate.
///
/// Must run after [`super::user::ApiUser`] put the caller in the request extensions.
pub async fn require_role(
    State(required_role): State<UserRole>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(user) = req.extensions().get::<User>() else {
        return Err(AuthError::UserNotFound);
    };

    if user.role != required_role && !user.is_admin() {
        return Err(AuthError::PermissionDenied {
            user_email: user.email.clone(),
            path: req.uri().path().to_owned(),
        });
    }

    debug!(user_id = user.id, role = %user.role, "Role check passed for {}", req.uri().path());
    Ok(next.run(req).await)
}
