use crate::database::app_user::UserRole;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const fn default_role() -> UserRole {
    UserRole::User
}

/// Represents the claims contained within a JWT issued by the identity provider.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthClaims {
    pub sub: i64, // Subject (user ID)
    pub exp: i64, // Expiration time
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
}
