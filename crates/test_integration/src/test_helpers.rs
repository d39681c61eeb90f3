use crate::runner::context::test_context::TestContext;
use crate::test_constants::{
    ADMIN_EMAIL, ADMIN_ID, ADMIN_NAME, GUEST_EMAIL, GUEST_ID, GUEST_NAME, OWNER_EMAIL, OWNER_ID,
    OWNER_NAME,
};
use chrono::Utc;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use common_services::api::auth::interfaces::AuthClaims;
use common_services::database::app_user::UserRole;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use jsonwebtoken::{EncodingKey, Header, encode};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use std::io::Cursor;

/// Mints a bearer token the way the identity provider would.
pub fn token_for(
    context: &TestContext,
    id: i64,
    email: &str,
    name: &str,
    role: UserRole,
) -> Result<String> {
    let claims = AuthClaims {
        sub: id,
        exp: Utc::now().timestamp() + 3600,
        email: email.to_owned(),
        name: name.to_owned(),
        role,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(context.settings.secrets.jwt.as_bytes()),
    )?)
}

pub fn owner_token(context: &TestContext) -> Result<String> {
    token_for(context, OWNER_ID, OWNER_EMAIL, OWNER_NAME, UserRole::User)
}

pub fn guest_token(context: &TestContext) -> Result<String> {
    token_for(context, GUEST_ID, GUEST_EMAIL, GUEST_NAME, UserRole::User)
}

pub fn admin_token(context: &TestContext) -> Result<String> {
    token_for(context, ADMIN_ID, ADMIN_EMAIL, ADMIN_NAME, UserRole::Admin)
}

/// Creates an album and checks the response status.
pub async fn create_album(context: &TestContext, token: &str, payload: Value) -> Result<Value> {
    let response = context
        .http_client
        .post(context.url("/albums"))
        .bearer_auth(token)
        .json(&payload)
        .send()
        .await?;
    if response.status() != StatusCode::CREATED {
        return Err(eyre!(
            "Album creation failed with {}: {}",
            response.status(),
            response.text().await?
        ));
    }
    Ok(response.json().await?)
}

/// Creates an active album that accepts uploads.
pub async fn create_active_album(
    context: &TestContext,
    token: &str,
    payload: Value,
) -> Result<Value> {
    let mut payload = payload;
    payload["status"] = json!("active");
    create_album(context, token, payload).await
}

pub fn album_id(album: &Value) -> Result<String> {
    string_field(album, "id")
}

pub fn string_field(value: &Value, field: &str) -> Result<String> {
    value[field]
        .as_str()
        .map(ToOwned::to_owned)
        .ok_or_else(|| eyre!("Missing string field '{field}' in {value}"))
}

/// Encodes a solid-colour PNG.
pub fn png_bytes(width: u32, height: u32) -> Result<Vec<u8>> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([40, 120, 200])));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Sends a guest upload form. `token` is optional, guests upload anonymously.
pub async fn upload_file(
    context: &TestContext,
    access_code: &str,
    filename: &str,
    data: Vec<u8>,
    token: Option<&str>,
    uploader_email: &str,
) -> Result<reqwest::Response> {
    let form = Form::new()
        .part("file", Part::bytes(data).file_name(filename.to_owned()))
        .text("uploader_name", "Integration Guest")
        .text("uploader_email", uploader_email.to_owned())
        .text("caption", "From the dance floor");

    let mut request = context
        .http_client
        .post(context.url(&format!("/upload/{access_code}")))
        .multipart(form);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    Ok(request.send().await?)
}

/// Uploads a small PNG and returns the receipt's upload object.
pub async fn upload_png(
    context: &TestContext,
    access_code: &str,
    token: Option<&str>,
) -> Result<Value> {
    let response = upload_file(
        context,
        access_code,
        "party.png",
        png_bytes(64, 32)?,
        token,
        "",
    )
    .await?;
    if response.status() != StatusCode::CREATED {
        return Err(eyre!(
            "Upload failed with {}: {}",
            response.status(),
            response.text().await?
        ));
    }
    let receipt: Value = response.json().await?;
    Ok(receipt["upload"].clone())
}
