use super::{EmailTransport, EmailTransportError, OutgoingEmail};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Posts each email as JSON to a transactional mail API.
#[derive(Debug, Clone)]
pub struct HttpEmailTransport {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct MailRequest<'a> {
    from: Address<'a>,
    to: [Address<'a>; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

impl HttpEmailTransport {
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not a valid URL or the client cannot be built.
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        timeout_seconds: u64,
    ) -> color_eyre::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
            api_key,
        })
    }
}

#[async_trait]
impl EmailTransport for HttpEmailTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailTransportError> {
        let body = MailRequest {
            from: Address {
                email: &email.from_address,
                name: &email.from_name,
            },
            to: [Address {
                email: &email.to_address,
                name: &email.to_name,
            }],
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };

        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EmailTransportError::Rejected(format!("{status}: {detail}")));
        }
        debug!("Email to {} accepted by mail API", email.to_address);
        Ok(())
    }
}
