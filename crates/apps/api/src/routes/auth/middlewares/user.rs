use crate::api_state::ApiContext;
use crate::auth::middlewares::optional_user::OptionalUser;
use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
};
use common_services::api::auth::error::AuthError;
use common_services::database::app_user::User;

/// A signed-in caller. Rejects the request when no bearer token was sent.
///
/// The user is also stored as a plain [`User`] extension so handlers can take
/// `Extension<User>`.
#[derive(Clone, Debug)]
pub struct ApiUser(pub User);

impl<S> FromRequestParts<S> for ApiUser
where
    S: Send + Sync,
    State<ApiContext>: FromRequestParts<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalUser(user) = OptionalUser::from_request_parts(parts, state).await?;
        let user = user.ok_or(AuthError::MissingToken)?;
        parts.extensions.insert(user.clone());
        Ok(Self(user))
    }
}
