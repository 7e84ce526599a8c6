use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::{
    entities::email::{EmailMessage, EmailResult},
    notifiers::email::EmailProvider,
};

/// Development transport used when no SMTP credentials are configured.
/// Writes a summary to the log and reports success.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl EmailProvider for LogMailer {
    async fn send(&self, message: &EmailMessage) -> EmailResult {
        let message_id = format!("<{}@localhost>", Uuid::new_v4());
        info!(
            message_id = %message_id,
            recipients = ?message.recipients.as_slice(),
            subject = %message.subject,
            text_bytes = message.text_body.len(),
            html_bytes = message.html_body.len(),
            "Email not sent (log transport)"
        );
        EmailResult::sent(message_id)
    }

    async fn verify(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
