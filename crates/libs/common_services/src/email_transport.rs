mod http;
mod log;

pub use http::HttpEmailTransport;
pub use log::LogEmailTransport;

use app_state::{EmailTransportSettings, NotificationSettings};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmailTransportError {
    #[error("mail API rejected the message: {0}")]
    Rejected(String),

    #[error("mail API request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A fully rendered email, ready to hand to a transport.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub from_address: String,
    pub from_name: String,
    pub to_address: String,
    pub to_name: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailTransportError>;
}

/// Builds the transport selected in settings.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn build_email_transport(
    settings: &NotificationSettings,
) -> color_eyre::Result<Arc<dyn EmailTransport>> {
    Ok(match &settings.transport {
        EmailTransportSettings::Log => Arc::new(LogEmailTransport),
        EmailTransportSettings::Http {
            endpoint,
            api_key,
            timeout_seconds,
        } => Arc::new(HttpEmailTransport::new(
            endpoint,
            api_key.clone(),
            *timeout_seconds,
        )?),
    })
}
