mod common;

use color_eyre::Result;
use common::{TestEnv, bytes_of_size};
use common_services::api::notification::error::NotificationError;
use common_services::api::notification::interfaces::{
    CreateTemplateRequest, ListEmailsParams, SendTemplateEmailRequest, UpdateTemplateRequest,
};
use common_services::api::notification::service::{
    create_template, delete_template, get_template, list_emails, list_templates,
    send_template_email, update_template,
};
use common_services::api::upload::interfaces::{IncomingFile, UploaderInfo};
use common_services::api::upload::service::{Submission, submit_upload};
use common_services::database::album::album::Album;
use common_services::database::notification_template::{NotificationTemplate, TemplateType};
use serde_json::json;

fn template(name: &str, template_type: TemplateType) -> CreateTemplateRequest {
    CreateTemplateRequest {
        name: name.to_owned(),
        template_type,
        subject: "Album {{ album.title }}".to_owned(),
        html_content: "<p>Hi {{ user.name }}, see {{ album.title }}</p>".to_owned(),
        text_content: "Hi {{ user.name }}, see {{ album.title }}".to_owned(),
        available_variables: vec!["user.name".to_owned(), "album.title".to_owned()],
        is_active: true,
    }
}

fn send(name: &str, to: &str, context: serde_json::Value) -> SendTemplateEmailRequest {
    SendTemplateEmailRequest {
        template_name: name.to_owned(),
        recipient_email: to.to_owned(),
        recipient_name: "Ada".to_owned(),
        context,
        album_id: None,
        upload_id: None,
    }
}

async fn seeded(env: &TestEnv, name: &str) -> Result<NotificationTemplate> {
    Ok(list_templates(&env.pool)
        .await?
        .into_iter()
        .find(|t| t.name == name)
        .unwrap())
}

async fn guest_upload(env: &TestEnv, album: &Album, filename: &str) -> Result<()> {
    submit_upload(
        &env.pool,
        &env.settings,
        &env.blobs,
        &env.mailer,
        &album.access_code,
        Submission {
            uploader: None,
            info: UploaderInfo {
                uploader_name: "Guest".to_owned(),
                ..UploaderInfo::default()
            },
            file: IncomingFile {
                filename: Some(filename.to_owned()),
                data: bytes_of_size(10),
            },
        },
    )
    .await?;
    Ok(())
}

#[tokio::test]
async fn migrations_seed_default_templates() -> Result<()> {
    let env = TestEnv::new().await?;

    let templates = list_templates(&env.pool).await?;
    let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["new_comment", "new_upload", "welcome"]);

    let upload = seeded(&env, "new_upload").await?;
    assert_eq!(upload.template_type, TemplateType::NewUpload);
    assert!(upload.is_active);
    assert!(upload.available_variables.0.contains(&"album.url".to_owned()));
    Ok(())
}

#[tokio::test]
async fn templates_are_created_updated_and_deleted() -> Result<()> {
    let env = TestEnv::new().await?;

    let created =
        create_template(&env.pool, template(" album_live ", TemplateType::AlbumShared)).await?;
    assert_eq!(created.name, "album_live");
    let fetched = get_template(&env.pool, created.id).await?;
    assert_eq!(fetched.subject, "Album {{ album.title }}");

    let updated = update_template(
        &env.pool,
        created.id,
        UpdateTemplateRequest {
            subject: Some("Now live: {{ album.title }}".to_owned()),
            is_active: Some(false),
            ..UpdateTemplateRequest::default()
        },
    )
    .await?;
    assert_eq!(updated.subject, "Now live: {{ album.title }}");
    assert!(!updated.is_active);
    assert_eq!(updated.template_type, TemplateType::AlbumShared);

    delete_template(&env.pool, created.id).await?;
    assert!(matches!(
        get_template(&env.pool, created.id).await,
        Err(NotificationError::NotFound(_))
    ));
    assert!(matches!(
        delete_template(&env.pool, created.id).await,
        Err(NotificationError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn template_names_are_unique_and_fields_required() -> Result<()> {
    let env = TestEnv::new().await?;

    assert!(matches!(
        create_template(&env.pool, template("welcome", TemplateType::Welcome)).await,
        Err(NotificationError::Conflict(_))
    ));

    let created = create_template(&env.pool, template("second", TemplateType::Welcome)).await?;
    let renamed = update_template(
        &env.pool,
        created.id,
        UpdateTemplateRequest {
            name: Some("new_upload".to_owned()),
            ..UpdateTemplateRequest::default()
        },
    )
    .await;
    assert!(matches!(renamed, Err(NotificationError::Conflict(_))));

    let mut blank = template("blank", TemplateType::Welcome);
    blank.subject = "  ".to_owned();
    assert!(matches!(
        create_template(&env.pool, blank).await,
        Err(NotificationError::BadRequest(_))
    ));
    let emptied = update_template(
        &env.pool,
        created.id,
        UpdateTemplateRequest {
            html_content: Some(String::new()),
            ..UpdateTemplateRequest::default()
        },
    )
    .await;
    assert!(matches!(emptied, Err(NotificationError::BadRequest(_))));
    Ok(())
}

#[tokio::test]
async fn named_template_is_rendered_and_sent() -> Result<()> {
    let env = TestEnv::new().await?;
    let ada = env.user(1, "Ada").await?;
    let created =
        create_template(&env.pool, template("album_live", TemplateType::AlbumShared)).await?;

    let email = send_template_email(
        &env.pool,
        &env.mailer,
        send(
            "album_live",
            "ada@example.com",
            json!({ "album": { "title": "<script>x</script>" } }),
        ),
    )
    .await?;

    assert_eq!(email.template_id, Some(created.id));
    assert_eq!(email.recipient_user_id, Some(ada.id));
    assert_eq!(email.subject, "Album <script>x</script>");
    assert_eq!(
        email.html_content,
        "<p>Hi Ada, see &lt;script&gt;x&lt;/script&gt;</p>"
    );
    assert_eq!(email.text_content, "Hi Ada, see <script>x</script>");
    let sent = env.transport.sent.lock().unwrap()[0].clone();
    assert_eq!(sent.to_address, "ada@example.com");
    assert!(!sent.html.contains("<script>"));

    let stranger = send_template_email(
        &env.pool,
        &env.mailer,
        send("album_live", "nobody@example.com", json!({})),
    )
    .await?;
    assert_eq!(stranger.recipient_user_id, None);
    Ok(())
}

#[tokio::test]
async fn sending_needs_an_active_template_and_an_address() -> Result<()> {
    let env = TestEnv::new().await?;
    let created = create_template(&env.pool, template("paused", TemplateType::Welcome)).await?;
    update_template(
        &env.pool,
        created.id,
        UpdateTemplateRequest {
            is_active: Some(false),
            ..UpdateTemplateRequest::default()
        },
    )
    .await?;

    let missing = send("missing", "a@example.com", json!({}));
    assert!(matches!(
        send_template_email(&env.pool, &env.mailer, missing).await,
        Err(NotificationError::NotFound(_))
    ));
    let inactive = send("paused", "a@example.com", json!({}));
    assert!(matches!(
        send_template_email(&env.pool, &env.mailer, inactive).await,
        Err(NotificationError::BadRequest(_))
    ));
    let bad_address = send("welcome", "not-an-address", json!({}));
    assert!(matches!(
        send_template_email(&env.pool, &env.mailer, bad_address).await,
        Err(NotificationError::BadRequest(_))
    ));
    assert_eq!(env.transport.sent_count(), 0);
    Ok(())
}

#[tokio::test]
async fn stored_upload_template_replaces_built_in_email() -> Result<()> {
    let env = TestEnv::new().await?;
    let owner = env.user(1, "Owner").await?;
    let album = env.active_album(&owner).await?;
    let stored = seeded(&env, "new_upload").await?;
    update_template(
        &env.pool,
        stored.id,
        UpdateTemplateRequest {
            subject: Some(
                "{{ upload.uploader_name }} sent {{ upload.original_filename }}".to_owned(),
            ),
            ..UpdateTemplateRequest::default()
        },
    )
    .await?;

    guest_upload(&env, &album, "photo.jpg").await?;
    let sent = env.transport.sent.lock().unwrap()[0].clone();
    assert_eq!(sent.subject, "Guest sent photo.jpg");
    let album_url = env.settings.albums.upload_url(&album.access_code);
    assert!(sent.html.contains(&album_url));

    update_template(
        &env.pool,
        stored.id,
        UpdateTemplateRequest {
            is_active: Some(false),
            ..UpdateTemplateRequest::default()
        },
    )
    .await?;
    guest_upload(&env, &album, "photo.jpg").await?;
    let sent = env.transport.sent.lock().unwrap()[1].clone();
    assert_eq!(sent.subject, "New upload in \"Summer Wedding\"");

    let emails = list_emails(&env.pool, &ListEmailsParams::default()).await?;
    let mut template_ids: Vec<Option<i64>> = emails.iter().map(|e| e.template_id).collect();
    template_ids.sort_unstable();
    assert_eq!(template_ids, vec![None, Some(stored.id)]);
    Ok(())
}

#[tokio::test]
async fn deleting_a_template_keeps_sent_emails() -> Result<()> {
    let env = TestEnv::new().await?;
    let created = create_template(&env.pool, template("one_off", TemplateType::Welcome)).await?;
    send_template_email(
        &env.pool,
        &env.mailer,
        send("one_off", "ada@example.com", json!({})),
    )
    .await?;

    delete_template(&env.pool, created.id).await?;

    let emails = list_emails(&env.pool, &ListEmailsParams::default()).await?;
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].template_id, None);
    assert_eq!(emails[0].subject, "Album");
    Ok(())
}
