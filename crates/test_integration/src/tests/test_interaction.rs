use crate::runner::context::test_context::TestContext;
use crate::test_helpers::{
    album_id, create_active_album, guest_token, owner_token, string_field, upload_png,
};
use color_eyre::Result;
use reqwest::StatusCode;
use serde_json::{Value, json};

/// An active album owned by the owner user, with one approved upload.
async fn album_with_upload(context: &TestContext, title: &str) -> Result<(String, String)> {
    let owner = owner_token(context)?;
    let album = create_active_album(context, &owner, json!({ "title": title })).await?;
    let upload = upload_png(context, &string_field(&album, "accessCode")?, None).await?;
    Ok((album_id(&album)?, string_field(&upload, "id")?))
}

pub async fn test_likes(context: &TestContext) -> Result<()> {
    // ARRANGE
    let (album, upload) = album_with_upload(context, "Like Album").await?;
    let guest = guest_token(context)?;
    let url = context.url(&format!("/albums/{album}/uploads/{upload}/like"));

    // ACT
    let first: Value = context
        .http_client
        .post(&url)
        .bearer_auth(&guest)
        .send()
        .await?
        .json()
        .await?;
    let detail: Value = context
        .http_client
        .get(context.url(&format!("/albums/{album}/uploads/{upload}")))
        .bearer_auth(&guest)
        .send()
        .await?
        .json()
        .await?;
    let second: Value = context
        .http_client
        .post(&url)
        .bearer_auth(&guest)
        .send()
        .await?
        .json()
        .await?;

    // ASSERT
    assert_eq!(first, json!({ "liked": true, "likeCount": 1 }));
    assert_eq!(detail["likedByMe"], true);
    assert_eq!(second, json!({ "liked": false, "likeCount": 0 }));

    Ok(())
}

pub async fn test_comments(context: &TestContext) -> Result<()> {
    // ARRANGE
    let (album, upload) = album_with_upload(context, "Comment Album").await?;
    let guest = guest_token(context)?;
    let owner = owner_token(context)?;
    let url = context.url(&format!("/albums/{album}/uploads/{upload}/comments"));

    // ACT
    let response = context
        .http_client
        .post(&url)
        .bearer_auth(&guest)
        .json(&json!({ "content": "  What a night!  " }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let comment: Value = response.json().await?;

    let response = context
        .http_client
        .post(&url)
        .bearer_auth(&owner)
        .json(&json!({ "content": "Thanks for coming", "parentId": comment["id"] }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let reply: Value = response.json().await?;

    let empty = context
        .http_client
        .post(&url)
        .bearer_auth(&guest)
        .json(&json!({ "content": "   " }))
        .send()
        .await?;

    let comments: Vec<Value> = context
        .http_client
        .get(&url)
        .bearer_auth(&guest)
        .send()
        .await?
        .json()
        .await?;

    // ASSERT
    assert_eq!(comment["content"], "What a night!");
    assert_eq!(reply["parentId"], comment["id"]);
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["id"], comment["id"]);

    Ok(())
}

pub async fn test_reports(context: &TestContext) -> Result<()> {
    // ARRANGE
    let (album, upload) = album_with_upload(context, "Report Album").await?;
    let guest = guest_token(context)?;
    let owner = owner_token(context)?;
    let client = &context.http_client;
    let report_url = context.url(&format!("/albums/{album}/uploads/{upload}/report"));
    let reports_url = context.url(&format!("/albums/{album}/reports"));
    let payload = json!({ "reason": "spam", "description": "Not from the event" });

    // ACT + ASSERT
    let response = client
        .post(&report_url)
        .bearer_auth(&guest)
        .json(&payload)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let report: Value = response.json().await?;
    assert_eq!(report["reason"], "spam");
    assert_eq!(report["isResolved"], false);

    let duplicate = client
        .post(&report_url)
        .bearer_auth(&guest)
        .json(&payload)
        .send()
        .await?;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let as_guest = client.get(&reports_url).bearer_auth(&guest).send().await?;
    assert_eq!(as_guest.status(), StatusCode::FORBIDDEN);

    let open: Vec<Value> = client
        .get(&reports_url)
        .bearer_auth(&owner)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(open.len(), 1);

    let response = client
        .post(context.url(&format!("/reports/{}/resolve", report["id"])))
        .bearer_auth(&owner)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let resolved: Value = response.json().await?;
    assert_eq!(resolved["isResolved"], true);
    assert!(resolved["resolvedAt"].is_string());

    let open: Vec<Value> = client
        .get(&reports_url)
        .bearer_auth(&owner)
        .send()
        .await?
        .json()
        .await?;
    assert!(open.is_empty());
    let all: Vec<Value> = client
        .get(&reports_url)
        .query(&[("includeResolved", "true")])
        .bearer_auth(&owner)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(all.len(), 1);

    Ok(())
}

pub async fn test_bulk_moderation(context: &TestContext) -> Result<()> {
    // ARRANGE
    let owner = owner_token(context)?;
    let guest = guest_token(context)?;
    let client = &context.http_client;
    let album = create_active_album(
        context,
        &owner,
        json!({ "title": "Bulk Album", "requireApproval": true }),
    )
    .await?;
    let id = album_id(&album)?;
    let access_code = string_field(&album, "accessCode")?;
    let mut uploads = Vec::new();
    for _ in 0..3 {
        uploads.push(string_field(
            &upload_png(context, &access_code, None).await?,
            "id",
        )?);
    }
    let bulk_url = context.url(&format!("/albums/{id}/uploads/bulk-moderate"));

    // ACT + ASSERT
    let response = client
        .post(context.url(&format!("/uploads/{}/moderate", uploads[0])))
        .bearer_auth(&owner)
        .json(&json!({ "status": "approved", "moderationNote": " looks good " }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let moderated: Value = response.json().await?;
    assert_eq!(moderated["status"], "approved");
    assert_eq!(moderated["moderationNote"], "looks good");

    let response = client
        .post(context.url(&format!("/uploads/{}/moderate", uploads[1])))
        .bearer_auth(&owner)
        .json(&json!({ "status": "pending" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(&bulk_url)
        .bearer_auth(&guest)
        .json(&json!({ "uploadIds": [uploads[1]], "action": "approve" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .post(&bulk_url)
        .bearer_auth(&owner)
        .json(&json!({ "uploadIds": [uploads[1], uploads[2], "not-in-album"], "action": "reject" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let result: Value = response.json().await?;
    assert_eq!(result, json!({ "action": "reject", "affected": 2 }));

    let response = client
        .post(&bulk_url)
        .bearer_auth(&owner)
        .json(&json!({ "uploadIds": [uploads[2]], "action": "delete" }))
        .send()
        .await?;
    let result: Value = response.json().await?;
    assert_eq!(result["affected"], 1);

    let visible: Vec<Value> = client
        .get(context.url(&format!("/albums/{id}/uploads")))
        .bearer_auth(&guest)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0]["id"], uploads[0].as_str());

    let all: Vec<Value> = client
        .get(context.url(&format!("/albums/{id}/uploads")))
        .bearer_auth(&owner)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(all.len(), 2);

    Ok(())
}
