use crate::api_state::ApiContext;
use axum::extract::{FromRequestParts, State};
use color_eyre::eyre::eyre;
use common_services::api::auth::error::AuthError;
use common_services::api::auth::interfaces::AuthClaims;
use common_services::api::auth::service::sync_user;
use common_services::database::app_user::User;
use http::header;
use http::request::Parts;
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::debug;

pub async fn extract_context<S>(parts: &mut Parts, state: &S) -> Result<ApiContext, AuthError>
where
    S: Send + Sync,
    State<ApiContext>: FromRequestParts<S>,
{
    match State::<ApiContext>::from_request_parts(parts, state).await {
        Ok(State(context)) => Ok(context),
        Err(_) => Err(AuthError::Internal(eyre!("ApiContext missing from router state"))),
    }
}

/// The bearer token from the `Authorization` header.
pub fn extract_token(parts: &Parts) -> Result<String, AuthError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(ToOwned::to_owned)
        .ok_or(AuthError::InvalidToken)
}

/// Validates signature and expiry of a token issued by the identity provider.
pub fn decode_token(token: &str, jwt_secret: &str) -> Result<AuthClaims, AuthError> {
    let mut validation = Validation::default();
    validation.set_required_spec_claims(&["exp", "sub"]);
    decode::<AuthClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        debug!("Token rejected: {e}");
        AuthError::InvalidToken
    })
}

/// Verifies the token and mirrors its user into the local table.
pub async fn authenticate<S>(parts: &mut Parts, state: &S, token: &str) -> Result<User, AuthError>
where
    S: Send + Sync,
    State<ApiContext>: FromRequestParts<S>,
{
    let context = extract_context(parts, state).await?;
    let claims = decode_token(token, &context.settings.secrets.jwt)?;
    sync_user(&context.pool, &claims).await
}
