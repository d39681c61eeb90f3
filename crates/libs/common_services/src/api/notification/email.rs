use crate::api::notification::error::NotificationError;
use crate::api::notification::templates::RenderedEmail;
use crate::database::notification::{EmailNotification, NewEmailNotification};
use crate::database::notification_store::NotificationStore;
use crate::email_transport::{EmailTransport, OutgoingEmail};
use app_state::NotificationSettings;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Who an email goes to, and what it is about.
#[derive(Debug, Clone, Default)]
pub struct EmailRecipient {
    pub email: String,
    pub name: String,
    pub user_id: Option<i64>,
    pub album_id: Option<String>,
    pub upload_id: Option<String>,
}

/// Records outbound emails and hands them to the configured transport.
#[derive(Clone)]
pub struct EmailDispatcher {
    transport: Arc<dyn EmailTransport>,
    from_address: String,
    from_name: String,
    max_retries: i32,
}

impl EmailDispatcher {
    #[must_use]
    pub fn new(transport: Arc<dyn EmailTransport>, settings: &NotificationSettings) -> Self {
        Self {
            transport,
            from_address: settings.from_address.clone(),
            from_name: settings.from_name.clone(),
            max_retries: settings.email_max_retries.max(0),
        }
    }

    /// Queues an email as pending, then attempts delivery right away.
    /// A failed attempt is recorded on the row, not returned as an error.
    #[instrument(skip(self, pool, content), fields(to = %recipient.email))]
    pub async fn queue_and_send(
        &self,
        pool: &SqlitePool,
        recipient: EmailRecipient,
        content: RenderedEmail,
    ) -> Result<EmailNotification, NotificationError> {
        let new_email = NewEmailNotification {
            recipient_email: recipient.email,
            recipient_name: recipient.name,
            recipient_user_id: recipient.user_id,
            subject: content.subject,
            html_content: content.html,
            text_content: content.text,
            album_id: recipient.album_id,
            upload_id: recipient.upload_id,
            template_id: content.template_id,
            max_retries: self.max_retries,
        };
        let id = Uuid::new_v4().to_string();
        let email = NotificationStore::insert_email(pool, &id, &new_email, Utc::now()).await?;
        self.deliver(pool, email).await
    }

    /// Sends one email through the transport and stores the outcome.
    pub async fn deliver(
        &self,
        pool: &SqlitePool,
        mut email: EmailNotification,
    ) -> Result<EmailNotification, NotificationError> {
        let outgoing = OutgoingEmail {
            from_address: self.from_address.clone(),
            from_name: self.from_name.clone(),
            to_address: email.recipient_email.clone(),
            to_name: email.recipient_name.clone(),
            subject: email.subject.clone(),
            html: email.html_content.clone(),
            text: email.text_content.clone(),
        };

        match self.transport.send(&outgoing).await {
            Ok(()) => {
                email.mark_sent(Utc::now());
                info!("Sent email {} to {}", email.id, email.recipient_email);
            }
            Err(e) => {
                email.mark_failed(&e.to_string(), Utc::now());
                warn!(
                    "Email {} to {} failed (attempt {}): {e}",
                    email.id, email.recipient_email, email.retry_count
                );
            }
        }

        NotificationStore::save_delivery_state(pool, &email).await?;
        Ok(email)
    }
}
