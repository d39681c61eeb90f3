use crate::runner::context::test_context::TestContext;
use crate::test_constants::{OWNER_EMAIL, OWNER_ID, OWNER_NAME};
use crate::test_helpers::{admin_token, owner_token};
use color_eyre::Result;
use common_services::database::app_user::UserRole;
use common_services::database::user_store::UserStore;
use reqwest::StatusCode;
use serde_json::Value;

pub async fn test_missing_token(context: &TestContext) -> Result<()> {
    // ACT
    let no_token = context
        .http_client
        .get(context.url("/auth/me"))
        .send()
        .await?;
    let bad_token = context
        .http_client
        .get(context.url("/albums"))
        .bearer_auth("not-a-jwt")
        .send()
        .await?;

    // ASSERT
    assert_eq!(no_token.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(bad_token.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

pub async fn test_me(context: &TestContext) -> Result<()> {
    // ARRANGE
    let token = owner_token(context)?;

    // ACT
    let response = context
        .http_client
        .get(context.url("/auth/me"))
        .bearer_auth(&token)
        .send()
        .await?;

    // ASSERT
    assert_eq!(response.status(), StatusCode::OK);
    let me: Value = response.json().await?;
    assert_eq!(me["id"], OWNER_ID);
    assert_eq!(me["email"], OWNER_EMAIL);
    assert_eq!(me["name"], OWNER_NAME);

    let stored = UserStore::find_by_email(&context.pool, OWNER_EMAIL)
        .await?
        .expect("token user is mirrored locally");
    assert_eq!(stored.id, OWNER_ID);
    assert_eq!(stored.role, UserRole::User);

    Ok(())
}

pub async fn test_admin_routes_require_admin(context: &TestContext) -> Result<()> {
    // ARRANGE
    let url = context.url("/notifications/emails");

    // ACT
    let as_user = context
        .http_client
        .get(&url)
        .bearer_auth(owner_token(context)?)
        .send()
        .await?;
    let as_admin = context
        .http_client
        .get(&url)
        .bearer_auth(admin_token(context)?)
        .send()
        .await?;

    // ASSERT
    assert_eq!(as_user.status(), StatusCode::FORBIDDEN);
    assert_eq!(as_admin.status(), StatusCode::OK);

    Ok(())
}
