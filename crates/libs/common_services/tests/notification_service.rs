mod common;

use chrono::{Duration, Utc};
use color_eyre::Result;
use common::TestEnv;
use common_services::api::notification::email::EmailRecipient;
use common_services::api::notification::error::NotificationError;
use common_services::api::notification::interfaces::{
    CreateNotificationRequest, ListEmailsParams, ListNotificationsParams, UpdatePreferencesRequest,
};
use common_services::api::notification::service::{
    create_notification, get_notification, get_preferences, get_stats, list_emails,
    list_notifications, mark_all_read, mark_read, retry_due_emails, retry_email,
    update_preferences,
};
use common_services::api::notification::templates::RenderedEmail;
use common_services::database::notification::{
    DigestFrequency, EmailNotification, EmailStatus, NotificationType,
};

async fn queue(env: &TestEnv, to: &str) -> Result<EmailNotification> {
    let recipient = EmailRecipient {
        email: to.to_owned(),
        name: "Someone".to_owned(),
        ..EmailRecipient::default()
    };
    let content = RenderedEmail {
        subject: "Hello".to_owned(),
        html: "<p>Hello</p>".to_owned(),
        text: "Hello".to_owned(),
        template_id: None,
    };
    Ok(env.mailer.queue_and_send(&env.pool, recipient, content).await?)
}

fn notify(recipient_id: i64, title: &str) -> CreateNotificationRequest {
    CreateNotificationRequest {
        recipient_id,
        notification_type: NotificationType::System,
        title: title.to_owned(),
        message: "Body".to_owned(),
        album_id: None,
        upload_id: None,
        data: serde_json::Value::Null,
        send_email: false,
    }
}

#[tokio::test]
async fn delivered_email_is_marked_sent() -> Result<()> {
    let env = TestEnv::new().await?;

    let email = queue(&env, "a@example.com").await?;

    assert_eq!(email.status, EmailStatus::Sent);
    assert!(email.sent_at.is_some());
    assert_eq!(email.retry_count, 0);
    assert_eq!(env.transport.sent_count(), 1);
    Ok(())
}

#[tokio::test]
async fn failed_email_schedules_a_retry() -> Result<()> {
    let env = TestEnv::new().await?;
    env.transport.set_failing(true);

    let before = Utc::now();
    let email = queue(&env, "a@example.com").await?;

    assert_eq!(email.status, EmailStatus::Failed);
    assert_eq!(email.retry_count, 1);
    assert!(!email.error_message.is_empty());
    let next = email.next_retry_at.unwrap();
    assert!(next >= before + Duration::minutes(2));
    assert!(next <= Utc::now() + Duration::minutes(2));

    let stored = list_emails(
        &env.pool,
        &ListEmailsParams {
            status: Some(EmailStatus::Failed),
            limit: None,
        },
    )
    .await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].retry_count, 1);
    assert_eq!(stored[0].next_retry_at, email.next_retry_at);
    Ok(())
}

#[tokio::test]
async fn manual_retry_delivers_and_exhaustion_stops_it() -> Result<()> {
    let env = TestEnv::new().await?;
    env.transport.set_failing(true);
    let email = queue(&env, "a@example.com").await?;

    env.transport.set_failing(false);
    let retried = retry_email(&env.pool, &env.mailer, &email.id).await?;
    assert_eq!(retried.status, EmailStatus::Sent);
    assert!(matches!(
        retry_email(&env.pool, &env.mailer, &email.id).await,
        Err(NotificationError::NotRetryable(_))
    ));

    env.transport.set_failing(true);
    let doomed = queue(&env, "b@example.com").await?;
    for expected in [2, 3] {
        let attempt = retry_email(&env.pool, &env.mailer, &doomed.id).await?;
        assert_eq!(attempt.retry_count, expected);
    }
    assert!(matches!(
        retry_email(&env.pool, &env.mailer, &doomed.id).await,
        Err(NotificationError::NotRetryable(_))
    ));
    assert!(matches!(
        retry_email(&env.pool, &env.mailer, "missing").await,
        Err(NotificationError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn only_due_emails_are_retried() -> Result<()> {
    let env = TestEnv::new().await?;
    env.transport.set_failing(true);
    let due = queue(&env, "due@example.com").await?;
    queue(&env, "later@example.com").await?;
    sqlx::query("UPDATE email_notification SET next_retry_at = ?1 WHERE id = ?2")
        .bind(Utc::now() - Duration::minutes(1))
        .bind(&due.id)
        .execute(&env.pool)
        .await?;

    env.transport.set_failing(false);
    let outcome = retry_due_emails(&env.pool, &env.mailer).await?;

    assert_eq!(outcome.attempted, 1);
    assert_eq!(outcome.sent, 1);
    assert_eq!(outcome.failed, 0);
    let sent = env.transport.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to_address, "due@example.com");
    Ok(())
}

#[tokio::test]
async fn notifications_are_read_per_recipient() -> Result<()> {
    let env = TestEnv::new().await?;
    let alice = env.user(1, "Alice").await?;
    let bob = env.user(2, "Bob").await?;
    let first = create_notification(&env.pool, &env.mailer, notify(alice.id, "One")).await?;
    create_notification(&env.pool, &env.mailer, notify(alice.id, "Two")).await?;
    create_notification(&env.pool, &env.mailer, notify(bob.id, "Other")).await?;

    assert!(matches!(
        get_notification(&env.pool, bob.id, &first.id).await,
        Err(NotificationError::NotFound(_))
    ));
    assert!(matches!(
        mark_read(&env.pool, bob.id, &first.id).await,
        Err(NotificationError::NotFound(_))
    ));

    let read = mark_read(&env.pool, alice.id, &first.id).await?;
    assert!(read.is_read);
    assert!(read.read_at.is_some());

    let unread = list_notifications(
        &env.pool,
        alice.id,
        &ListNotificationsParams {
            unread_only: true,
            limit: None,
        },
    )
    .await?;
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].title, "Two");

    let stats = get_stats(&env.pool, alice.id).await?;
    assert_eq!(stats.total_notifications, 2);
    assert_eq!(stats.unread_notifications, 1);
    assert_eq!(stats.recent_notifications.len(), 2);

    assert_eq!(mark_all_read(&env.pool, alice.id).await?.updated, 1);
    assert_eq!(get_stats(&env.pool, alice.id).await?.unread_notifications, 0);
    assert_eq!(get_stats(&env.pool, bob.id).await?.unread_notifications, 1);
    Ok(())
}

#[tokio::test]
async fn created_notification_can_be_mailed() -> Result<()> {
    let env = TestEnv::new().await?;
    let alice = env.user(1, "Alice").await?;

    let notification = create_notification(
        &env.pool,
        &env.mailer,
        CreateNotificationRequest {
            send_email: true,
            ..notify(alice.id, "Maintenance")
        },
    )
    .await?;

    assert_eq!(notification.notification_type, NotificationType::System);
    assert_eq!(env.transport.sent_count(), 1);
    let sent = env.transport.sent.lock().unwrap()[0].clone();
    assert_eq!(sent.to_address, "alice@example.com");
    assert!(sent.subject.contains("Maintenance"));

    assert!(matches!(
        create_notification(&env.pool, &env.mailer, notify(99, "Nobody")).await,
        Err(NotificationError::NotFound(_))
    ));
    assert!(matches!(
        create_notification(&env.pool, &env.mailer, notify(alice.id, "  ")).await,
        Err(NotificationError::BadRequest(_))
    ));
    Ok(())
}

#[tokio::test]
async fn preferences_default_and_persist() -> Result<()> {
    let env = TestEnv::new().await?;
    let alice = env.user(1, "Alice").await?;

    let defaults = get_preferences(&env.pool, alice.id).await?;
    assert!(defaults.email_new_upload);
    assert_eq!(defaults.digest_frequency, DigestFrequency::Immediate);

    update_preferences(
        &env.pool,
        alice.id,
        &UpdatePreferencesRequest {
            email_new_comment: Some(false),
            digest_frequency: Some(DigestFrequency::Daily),
            ..UpdatePreferencesRequest::default()
        },
    )
    .await?;

    let stored = get_preferences(&env.pool, alice.id).await?;
    assert!(!stored.email_new_comment);
    assert!(stored.email_new_upload);
    assert_eq!(stored.digest_frequency, DigestFrequency::Daily);
    Ok(())
}
