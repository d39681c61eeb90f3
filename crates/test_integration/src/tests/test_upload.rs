use crate::runner::context::test_context::TestContext;
use crate::test_constants::GUEST_ID;
use crate::test_helpers::{
    album_id, create_active_album, create_album, guest_token, owner_token, png_bytes,
    string_field, upload_file, upload_png,
};
use color_eyre::Result;
use reqwest::StatusCode;
use reqwest::multipart::Form;
use serde_json::{Value, json};

pub async fn test_guest_upload(context: &TestContext) -> Result<()> {
    // ARRANGE
    let owner = owner_token(context)?;
    let album = create_active_album(context, &owner, json!({ "title": "Beach Party" })).await?;
    let access_code = string_field(&album, "accessCode")?;

    // ACT
    let response = upload_file(
        context,
        &access_code,
        "Sunset.PNG",
        png_bytes(800, 400)?,
        None,
        "",
    )
    .await?;

    // ASSERT
    assert_eq!(response.status(), StatusCode::CREATED);
    let receipt: Value = response.json().await?;
    let upload = &receipt["upload"];
    assert_eq!(upload["status"], "approved");
    assert_eq!(upload["fileType"], "image");
    assert_eq!(upload["mimeType"], "image/png");
    assert_eq!(upload["originalFilename"], "Sunset.PNG");
    assert_eq!(upload["width"], 800);
    assert_eq!(upload["height"], 400);
    assert_eq!(upload["uploaderName"], "Integration Guest");
    assert!(upload["uploaderUserId"].is_null());

    let thumbnail = context
        .http_client
        .get(string_field(upload, "thumbnailUrl")?)
        .send()
        .await?;
    assert_eq!(thumbnail.status(), StatusCode::OK);

    // Signed-in uploaders are attributed
    let guest = guest_token(context)?;
    let attributed = upload_png(context, &access_code, Some(&guest)).await?;
    assert_eq!(attributed["uploaderUserId"], GUEST_ID);

    Ok(())
}

pub async fn test_rejected_upload(context: &TestContext) -> Result<()> {
    // ARRANGE
    let owner = owner_token(context)?;
    let client = &context.http_client;
    let album = create_active_album(
        context,
        &owner,
        json!({ "title": "Strict Album", "maxFilesPerUser": 1 }),
    )
    .await?;
    let access_code = string_field(&album, "accessCode")?;
    let draft = create_album(context, &owner, json!({ "title": "Not yet open" })).await?;

    // ACT + ASSERT
    let wrong_type = upload_file(
        context,
        &access_code,
        "notes.txt",
        b"hello".to_vec(),
        None,
        "",
    )
    .await?;
    assert_eq!(wrong_type.status(), StatusCode::BAD_REQUEST);
    let body: Value = wrong_type.json().await?;
    assert!(body["error"].as_str().unwrap_or_default().contains("txt"));

    let unknown_album =
        upload_file(context, "ZZZZZZZZ", "a.png", png_bytes(4, 4)?, None, "").await?;
    assert_eq!(unknown_album.status(), StatusCode::NOT_FOUND);

    let closed_album = upload_file(
        context,
        &string_field(&draft, "accessCode")?,
        "a.png",
        png_bytes(4, 4)?,
        None,
        "",
    )
    .await?;
    assert_eq!(closed_album.status(), StatusCode::BAD_REQUEST);

    let no_file = client
        .post(context.url(&format!("/upload/{access_code}")))
        .multipart(Form::new().text("caption", "forgot the file"))
        .send()
        .await?;
    assert_eq!(no_file.status(), StatusCode::BAD_REQUEST);

    let first = upload_file(
        context,
        &access_code,
        "one.png",
        png_bytes(4, 4)?,
        None,
        "same@guest.test",
    )
    .await?;
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = upload_file(
        context,
        &access_code,
        "two.png",
        png_bytes(4, 4)?,
        None,
        "SAME@guest.test",
    )
    .await?;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(context.url(&format!("/albums/{}/uploads", album_id(&album)?)))
        .bearer_auth(&owner)
        .send()
        .await?;
    let uploads: Vec<Value> = response.json().await?;
    assert_eq!(uploads.len(), 1);

    Ok(())
}

pub async fn test_upload_management(context: &TestContext) -> Result<()> {
    // ARRANGE
    let owner = owner_token(context)?;
    let guest = guest_token(context)?;
    let client = &context.http_client;
    let album = create_active_album(
        context,
        &owner,
        json!({ "title": "Moderated Album", "requireApproval": true }),
    )
    .await?;
    let id = album_id(&album)?;
    let upload = upload_png(context, &string_field(&album, "accessCode")?, None).await?;
    let upload_id = string_field(&upload, "id")?;
    assert_eq!(upload["status"], "pending");

    // ACT + ASSERT
    let visitor_list: Vec<Value> = client
        .get(context.url(&format!("/albums/{id}/uploads")))
        .bearer_auth(&guest)
        .send()
        .await?
        .json()
        .await?;
    assert!(visitor_list.is_empty());

    let pending_list: Vec<Value> = client
        .get(context.url(&format!("/albums/{id}/uploads")))
        .query(&[("status", "pending")])
        .bearer_auth(&owner)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(pending_list.len(), 1);
    assert_eq!(pending_list[0]["id"], upload_id.as_str());

    let response = client
        .put(context.url(&format!("/albums/{id}/uploads/{upload_id}")))
        .bearer_auth(&owner)
        .json(&json!({ "caption": "  The first dance  " }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await?;
    assert_eq!(updated["caption"], "The first dance");

    let response = client
        .put(context.url(&format!("/albums/{id}/uploads/{upload_id}")))
        .bearer_auth(&guest)
        .json(&json!({ "caption": "hijacked" }))
        .send()
        .await?;
    assert_ne!(response.status(), StatusCode::OK);

    let response = client
        .get(context.url(&format!("/albums/{id}/uploads/stats")))
        .bearer_auth(&owner)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let stats: Value = response.json().await?;
    assert_eq!(stats["totals"]["totalUploads"], 1);
    assert_eq!(stats["totals"]["pendingUploads"], 1);

    let response = client
        .delete(context.url(&format!("/albums/{id}/uploads/{upload_id}")))
        .bearer_auth(&owner)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = client
        .get(context.url(&format!("/albums/{id}/uploads/{upload_id}")))
        .bearer_auth(&owner)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

pub async fn test_upload_download(context: &TestContext) -> Result<()> {
    // ARRANGE
    let owner = owner_token(context)?;
    let client = &context.http_client;
    let album = create_active_album(context, &owner, json!({ "title": "Download Album" })).await?;
    let id = album_id(&album)?;
    let original = png_bytes(32, 32)?;
    let response = upload_file(
        context,
        &string_field(&album, "accessCode")?,
        "keepsake.png",
        original.clone(),
        None,
        "",
    )
    .await?;
    let receipt: Value = response.json().await?;
    let upload_id = string_field(&receipt["upload"], "id")?;

    // ACT
    let response = client
        .get(context.url(&format!("/albums/{id}/uploads/{upload_id}/download")))
        .bearer_auth(&owner)
        .send()
        .await?;

    // ASSERT
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(
        headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("image/png")
    );
    assert!(
        headers
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .contains("keepsake.png")
    );
    assert_eq!(response.bytes().await?.to_vec(), original);

    let detail: Value = client
        .get(context.url(&format!("/albums/{id}/uploads/{upload_id}")))
        .bearer_auth(&owner)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(detail["downloadCount"], 1);

    let stats: Value = client
        .get(context.url(&format!("/albums/{id}/stats")))
        .bearer_auth(&owner)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(stats["downloadCount"], 1);

    Ok(())
}
