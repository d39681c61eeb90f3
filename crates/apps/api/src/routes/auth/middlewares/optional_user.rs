use crate::api_state::ApiContext;
use crate::auth::middlewares::common::{authenticate, extract_token};
use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
};
use common_services::api::auth::error::AuthError;
use common_services::database::app_user::User;

/// The caller's user when a bearer token was sent. A bad token is still rejected.
#[derive(Clone, Debug)]
pub struct OptionalUser(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
    State<ApiContext>: FromRequestParts<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = match extract_token(parts) {
            Ok(token) => Some(authenticate(parts, state, &token).await?),
            Err(AuthError::MissingToken) => None,
            Err(e) => return Err(e),
        };
        parts.extensions.insert(Self(user.clone()));
        Ok(Self(user))
    }
}
