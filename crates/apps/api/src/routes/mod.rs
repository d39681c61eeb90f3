pub mod album;
mod api_doc;
pub mod auth;
pub mod interaction;
pub mod notification;
pub mod root;
pub mod upload;

use crate::album::router::{album_protected_router, album_public_router};
use crate::api_state::ApiContext;
use crate::auth::middlewares::optional_user::OptionalUser;
use crate::auth::middlewares::require_role::require_role;
use crate::auth::middlewares::user::ApiUser;
use crate::auth::router::auth_protected_router;
use crate::interaction::router::interaction_protected_router;
use crate::notification::router::{notification_admin_router, notification_protected_router};
use crate::root::router::root_public_router;
use crate::routes::api_doc::ApiDoc;
use crate::upload::router::{upload_guest_router, upload_protected_router};
use axum::Router;
use axum::middleware::{from_extractor_with_state, from_fn_with_state};
use color_eyre::Result;
use common_services::database::app_user::UserRole;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// --- Router Construction ---
pub fn create_router(api_state: ApiContext) -> Result<Router> {
    Ok(Router::new()
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .merge(public_routes())
        .merge(auth_optional_routes(api_state.clone())?)
        .merge(protected_routes(api_state.clone()))
        .merge(admin_routes(api_state.clone()))
        .with_state(api_state))
}

fn public_routes() -> Router<ApiContext> {
    Router::new()
        .merge(root_public_router())
        .merge(album_public_router())
}

fn auth_optional_routes(api_state: ApiContext) -> Result<Router<ApiContext>> {
    Ok(Router::new()
        .merge(upload_guest_router(&api_state.settings)?)
        .route_layer(from_extractor_with_state::<OptionalUser, ApiContext>(
            api_state,
        )))
}

fn protected_routes(api_state: ApiContext) -> Router<ApiContext> {
    Router::new()
        .merge(auth_protected_router())
        .merge(album_protected_router())
        .merge(upload_protected_router())
        .merge(interaction_protected_router())
        .merge(notification_protected_router())
        .route_layer(from_extractor_with_state::<ApiUser, ApiContext>(api_state))
}

fn admin_routes(api_state: ApiContext) -> Router<ApiContext> {
    Router::new()
        .merge(notification_admin_router())
        .route_layer(from_fn_with_state(UserRole::Admin, require_role))
        .route_layer(from_extractor_with_state::<ApiUser, ApiContext>(api_state))
}
