use crate::runner::context::test_context::TestContext;
use color_eyre::Result;
use reqwest::StatusCode;
use serde_json::Value;

pub async fn test_health_endpoint(context: &TestContext) -> Result<()> {
    // ARRANGE
    let url = context.url("/health");

    // ACT
    let response = context.http_client.get(url).send().await?;
    let status = response.status();
    let body = response.text().await?;

    // ASSERT
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    Ok(())
}

pub async fn test_openapi_document(context: &TestContext) -> Result<()> {
    // ACT
    let response = context
        .http_client
        .get(context.url("/openapi.json"))
        .send()
        .await?;

    // ASSERT
    assert_eq!(response.status(), StatusCode::OK);
    let document: Value = response.json().await?;
    let paths = &document["paths"];
    assert!(paths["/upload/{access_code}"]["post"].is_object());
    assert!(paths["/albums/{album_id}/uploads/bulk-moderate"]["post"].is_object());
    assert!(paths["/notifications/emails/retry-due"]["post"].is_object());
    assert!(document["components"]["securitySchemes"]["bearer_auth"].is_object());

    Ok(())
}
