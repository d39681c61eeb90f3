use super::{EmailTransport, EmailTransportError, OutgoingEmail};
use async_trait::async_trait;
use tracing::info;

/// Writes emails to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmailTransport;

#[async_trait]
impl EmailTransport for LogEmailTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailTransportError> {
        info!(
            to = %email.to_address,
            subject = %email.subject,
            "Email delivered to log transport:\n{}",
            email.text
        );
        Ok(())
    }
}
