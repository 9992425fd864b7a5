//! Transactional mail.
//!
//! [`Mailer`] delivers a single plain-text [`MailMessage`]. Registration uses
//! it to send the welcome message built by [`welcome_message`].

pub mod sendgrid;

pub use sendgrid::SendGridMailer;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::organization::Model as OrganizationModel;

/// Organization name used when no profile row exists.
pub const FALLBACK_ORGANIZATION_NAME: &str = "ONG";

/// Plain-text message to a single recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub reply_to: Option<String>,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail provider rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("mail is not configured: {0}")]
    NotConfigured(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Mailer that only writes messages to the log; used when no provider is configured
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "mail delivery skipped, message logged"
        );
        Ok(())
    }
}

/// Welcome message for a newly registered user, signed with the
/// organization's contact details when a profile exists.
pub fn welcome_message(
    organization: Option<&OrganizationModel>,
    to: &str,
    first_name: &str,
    last_name: &str,
) -> MailMessage {
    let name = organization
        .map(|org| org.name.as_str())
        .unwrap_or(FALLBACK_ORGANIZATION_NAME);

    let mut body = format!("Hola {first_name} {last_name},\n\n");
    match organization {
        Some(org) => {
            body.push_str(&org.welcome_text);
            body.push_str("\n\n");
            body.push_str(&org.name);
            if let Some(address) = &org.address {
                body.push('\n');
                body.push_str(address);
            }
            if let Some(phone) = org.phone {
                body.push_str(&format!("\nTel: {phone}"));
            }
            body.push('\n');
            body.push_str(&org.email);
        }
        None => {
            body.push_str(&format!("Thank you for registering with {name}."));
        }
    }
    body.push('\n');

    MailMessage {
        to: to.to_string(),
        subject: format!("Welcome to {name}"),
        body,
        reply_to: organization.map(|org| org.email.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn organization() -> OrganizationModel {
        OrganizationModel {
            id: 1,
            name: "Somos Más".to_string(),
            image: None,
            address: Some("Catamarca 1585 , CP: 1585".to_string()),
            phone: Some(44808900),
            email: "somomasong@gmail.com".to_string(),
            welcome_text: "Bienvenidos a nuestro sitio web".to_string(),
            about_us_text: None,
            facebook_url: None,
            is_deleted: false,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn welcome_message_is_signed_by_organization() {
        let org = organization();
        let message = welcome_message(Some(&org), "ana@example.org", "Ana", "Gómez");

        assert_eq!(message.subject, "Welcome to Somos Más");
        assert_eq!(message.to, "ana@example.org");
        assert!(message.body.starts_with("Hola Ana Gómez,"));
        assert!(message.body.contains("Bienvenidos a nuestro sitio web"));
        assert!(message.body.contains("Tel: 44808900"));
        assert_eq!(message.reply_to.as_deref(), Some("somomasong@gmail.com"));
    }

    #[test]
    fn welcome_message_without_profile() {
        let message = welcome_message(None, "ana@example.org", "Ana", "Gómez");
        assert_eq!(message.subject, "Welcome to ONG");
        assert!(message.reply_to.is_none());
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let message = welcome_message(None, "ana@example.org", "Ana", "Gómez");
        LogMailer.send(&message).await.unwrap();
    }
}
