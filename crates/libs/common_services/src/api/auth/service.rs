use crate::api::auth::error::AuthError;
use crate::api::auth::interfaces::AuthClaims;
use crate::database::app_user::User;
use crate::database::user_store::UserStore;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::instrument;

/// Mirrors the user described by verified token claims into the local user table.
///
/// # Errors
///
/// * `AuthError::InvalidToken` if the claims carry no email.
/// * `AuthError::Database` when the user row cannot be written.
#[instrument(skip(pool, claims), fields(user_id = claims.sub))]
pub async fn sync_user(pool: &SqlitePool, claims: &AuthClaims) -> Result<User, AuthError> {
    let email = claims.email.trim();
    if email.is_empty() {
        return Err(AuthError::InvalidToken);
    }
    let name = if claims.name.trim().is_empty() {
        email.split('@').next().unwrap_or(email)
    } else {
        claims.name.trim()
    };

    let user = UserStore::upsert(pool, claims.sub, email, name, claims.role, Utc::now()).await?;
    Ok(user)
}
