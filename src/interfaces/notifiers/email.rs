use async_trait::async_trait;

use crate::entities::email::{EmailMessage, EmailResult};

/// Transactional email transport.
///
/// `send` never fails: transport errors come back as a failed `EmailResult`.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> EmailResult;

    /// Whether the transport is reachable. Used by the health endpoint only.
    async fn verify(&self) -> bool;

    fn name(&self) -> &'static str;
}
