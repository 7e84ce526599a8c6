use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{
    entities::email::{EmailMessage, EmailResult},
    errors::EmailError,
    notifiers::email::EmailProvider,
    settings::AppConfig,
};

/// Sends mail through an authenticated STARTTLS relay (Gmail by default).
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(config: &AppConfig) -> Result<Self, EmailError> {
        let address: Address = config
            .smtp_username
            .trim()
            .parse()
            .map_err(|e| EmailError::InvalidAddress(format!("{}: {}", config.smtp_username, e)))?;
        let from = Mailbox::new(Some(config.mail_from_name.clone()), address);

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| EmailError::Transport(e.to_string()))?
            .port(config.smtp_port)
            // The transport keeps its own copy for the lifetime of the pool
            .credentials(Credentials::new(
                config.smtp_username.trim().to_string(),
                String::clone(&config.smtp_password),
            ))
            .timeout(Some(config.email_timeout()))
            .build();

        Ok(SmtpMailer {
            transport,
            from,
            timeout: config.email_timeout(),
        })
    }

    fn build_message(&self, message: &EmailMessage, message_id: &str) -> Result<Message, EmailError> {
        if message.recipients.is_empty() {
            return Err(EmailError::NoRecipients);
        }

        let mut builder = Message::builder()
            .from(self.from.clone())
            .message_id(Some(message_id.to_string()))
            .subject(message.subject.as_str());

        for recipient in message.recipients.as_slice() {
            let mailbox: Mailbox = recipient
                .parse()
                .map_err(|e| EmailError::InvalidAddress(format!("{}: {}", recipient, e)))?;
            builder = builder.to(mailbox);
        }

        builder
            .multipart(MultiPart::alternative_plain_html(
                message.text_body.clone(),
                message.html_body.clone(),
            ))
            .map_err(|e| EmailError::Build(e.to_string()))
    }

    async fn dispatch(&self, message: &EmailMessage) -> Result<String, EmailError> {
        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.from.email.domain());
        let email = self.build_message(message, &message_id)?;

        match tokio::time::timeout(self.timeout, self.transport.send(email)).await {
            Ok(Ok(response)) => {
                debug!(code = %response.code(), "SMTP relay accepted message");
                Ok(message_id)
            }
            Ok(Err(e)) => Err(EmailError::Transport(e.to_string())),
            Err(_) => Err(EmailError::Timeout(self.timeout.as_secs())),
        }
    }
}

#[async_trait]
impl EmailProvider for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> EmailResult {
        match self.dispatch(message).await {
            Ok(message_id) => EmailResult::sent(message_id),
            Err(e) => {
                error!(error = %e, subject = %message.subject, "SMTP send failed");
                EmailResult::failed(e.to_string())
            }
        }
    }

    async fn verify(&self) -> bool {
        match tokio::time::timeout(self.timeout, self.transport.test_connection()).await {
            Ok(Ok(reachable)) => reachable,
            Ok(Err(e)) => {
                warn!(error = %e, "SMTP verification failed");
                false
            }
            Err(_) => {
                warn!("SMTP verification timed out");
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::email::RenderedEmail;
    use zeroize::Zeroizing;

    fn config() -> AppConfig {
        AppConfig {
            smtp_username: "forms@mercyhouseatc.com".into(),
            smtp_password: Zeroizing::new("app-password".to_string()),
            ..AppConfig::default()
        }
    }

    fn message(recipients: Vec<String>) -> EmailMessage {
        EmailMessage::new(
            recipients,
            "Subject",
            RenderedEmail { html: "<p>Hello</p>".into(), text: "Hello".into() },
        )
    }

    #[actix_rt::test]
    async fn builds_one_message_for_all_recipients() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let email = mailer
            .build_message(
                &message(vec!["a@example.com".into(), "b@example.com".into()]),
                "<id@mercyhouseatc.com>",
            )
            .unwrap();

        let to: Vec<String> = email.envelope().to().iter().map(|a| a.to_string()).collect();
        assert_eq!(to, vec!["a@example.com", "b@example.com"]);
    }

    #[actix_rt::test]
    async fn invalid_recipient_is_reported_not_panicked() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let err = mailer
            .build_message(&message(vec!["not an address".into()]), "<id@x>")
            .unwrap_err();
        assert!(matches!(err, EmailError::InvalidAddress(_)));
    }

    #[actix_rt::test]
    async fn send_with_invalid_recipient_returns_failed_result() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let result = mailer.send(&message(vec!["broken".into()])).await;
        assert!(!result.succeeded);
        assert!(result.error_detail.unwrap().contains("broken"));
    }

    #[test]
    fn rejects_unparseable_sender() {
        let config = AppConfig {
            smtp_username: "no-at-sign".into(),
            ..AppConfig::default()
        };
        assert!(matches!(SmtpMailer::new(&config), Err(EmailError::InvalidAddress(_))));
    }
}
