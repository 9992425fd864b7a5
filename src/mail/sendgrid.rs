//! SendGrid v3 mail client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::{MailError, MailMessage, Mailer};
use crate::config::AppConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends mail through `POST {api_base}/v3/mail/send`
#[derive(Debug, Clone)]
pub struct SendGridMailer {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<Address<'a>>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    value: &'a str,
}

impl SendGridMailer {
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            from: from.into(),
        })
    }

    /// Builds a mailer from `ONG_SENDGRID_*` settings.
    pub fn from_config(config: &AppConfig) -> Result<Self, MailError> {
        let api_key = config
            .sendgrid_api_key
            .clone()
            .ok_or_else(|| MailError::NotConfigured("ONG_SENDGRID_API_KEY is not set".into()))?;

        Self::new(&config.sendgrid_api_base, api_key, &config.mail_from)
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let payload = SendRequest {
            personalizations: [Personalization {
                to: [Address { email: &message.to }],
            }],
            from: Address { email: &self.from },
            reply_to: message
                .reply_to
                .as_deref()
                .map(|email| Address { email }),
            subject: &message.subject,
            content: [Content {
                kind: "text/plain",
                value: &message.body,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            tracing::info!(to = %message.to, subject = %message.subject, "mail accepted by SendGrid");
            Ok(())
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(MailError::Rejected { status, body })
        }
    }
}
