use axum::{Extension, Json};
use common_services::database::app_user::User;

/// The user behind the bearer token, as mirrored locally.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "The authenticated user.", body = User),
        (status = 401, description = "Missing or invalid token."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}
