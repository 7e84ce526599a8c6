use std::{collections::HashMap, sync::Arc};

use chrono::{Datelike, Utc};
use tracing::{error, info, warn};

use crate::{
    email::templates::{render_acknowledgment, render_submission_notification},
    entities::{
        email::{EmailMessage, EmailResult},
        submission::{FormKind, FormPayload, FormSubmission, SubmissionResponse},
    },
    errors::FormError,
    limiter::rate_limiter::{RateLimitConfig, RateLimitDecision, RateLimiterStore},
    notifiers::email::EmailProvider,
    settings::{AppConfig, FormsSettings},
    use_cases::extractors::ClientContext,
    validation::validate_payload,
};

/// Runs a submission through admission, validation and notification.
///
/// Email is best effort: once a payload validates the submitter gets a
/// success response, whatever the transport reports.
pub struct FormSubmissionHandler {
    mailer: Arc<dyn EmailProvider>,
    limiter: RateLimiterStore,
    forms: FormsSettings,
    recipients: HashMap<FormKind, Vec<String>>,
    is_development: bool,
}

impl FormSubmissionHandler {
    pub fn new(config: &AppConfig, mailer: Arc<dyn EmailProvider>, limiter: RateLimiterStore) -> Self {
        let recipients = [FormKind::Contact, FormKind::VehicleDonation]
            .into_iter()
            .map(|kind| (kind, config.recipients_for(kind)))
            .collect();

        FormSubmissionHandler {
            mailer,
            limiter,
            forms: config.forms.clone(),
            recipients,
            is_development: config.is_development(),
        }
    }

    pub fn limiter(&self) -> &RateLimiterStore {
        &self.limiter
    }

    pub fn mailer(&self) -> &Arc<dyn EmailProvider> {
        &self.mailer
    }

    pub fn recipients_for(&self, kind: FormKind) -> &[String] {
        self.recipients.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Rate limit, form availability and recipient configuration, in that order.
    /// Runs before the body is read.
    pub fn admit(&self, kind: FormKind, client: &ClientContext) -> Result<(), FormError> {
        if let RateLimitDecision::Rejected { retry_after_secs, limit, reset_at } =
            self.limiter.check_and_consume(&client.key, &RateLimitConfig::FORM_SUBMISSION)
        {
            warn!(
                form = %kind,
                client = %client.key,
                retry_after_secs,
                "Form submission rate limited"
            );
            return Err(FormError::RateLimited { retry_after_secs, limit, reset_at });
        }

        if !self.forms.for_kind(kind).active {
            info!(form = %kind, "Submission to inactive form refused");
            return Err(FormError::FormInactive);
        }

        if self.recipients_for(kind).is_empty() {
            error!(form = %kind, "No notification recipients configured");
            return Err(FormError::Configuration);
        }

        Ok(())
    }

    pub fn check_size(&self, kind: FormKind, len: usize) -> Result<(), FormError> {
        if len > kind.max_body_bytes() {
            warn!(form = %kind, bytes = len, limit = kind.max_body_bytes(), "Submission body too large");
            return Err(FormError::PayloadTooLarge);
        }
        Ok(())
    }

    /// Validates the body and sends the admin notification and the
    /// submitter acknowledgment. Assumes `admit` already passed.
    pub async fn accept(
        &self,
        kind: FormKind,
        client: &ClientContext,
        body: &[u8],
    ) -> Result<SubmissionResponse, FormError> {
        let payload = validate_payload(kind, body)?;

        let recipients = self.recipients_for(kind);
        if recipients.is_empty() {
            return Err(FormError::Configuration);
        }

        let submission = FormSubmission::new(
            &payload,
            Utc::now(),
            client.ip.clone(),
            client.user_agent.clone(),
        );

        if self.is_development {
            log_summary(&payload, &submission);
        }

        let notification = EmailMessage::new(
            recipients,
            self.subject_for(kind, payload.submitter_name()),
            render_submission_notification(&submission),
        );
        let result = self.mailer.send(&notification).await;
        log_dispatch(&submission, "admin notification", &result);

        if let Some(address) = payload.submitter_email() {
            let acknowledgment = EmailMessage::new(
                address,
                kind.acknowledgment_subject(),
                render_acknowledgment(payload.submitter_name(), submission.received_at.year()),
            );
            let result = self.mailer.send(&acknowledgment).await;
            log_dispatch(&submission, "acknowledgment", &result);
        }

        Ok(SubmissionResponse {
            success: true,
            message: self.success_message_for(kind),
        })
    }

    /// Every step in order, for callers that already hold the whole body.
    pub async fn handle(
        &self,
        kind: FormKind,
        client: &ClientContext,
        body: &[u8],
    ) -> Result<SubmissionResponse, FormError> {
        self.admit(kind, client)?;
        self.check_size(kind, body.len())?;
        self.accept(kind, client, body).await
    }

    fn subject_for(&self, kind: FormKind, submitter_name: &str) -> String {
        let template = self
            .forms
            .for_kind(kind)
            .email_subject
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(kind.default_subject());

        // Header injection guard
        let name = submitter_name.replace(['\r', '\n'], " ");

        template
            .replace("{formName}", kind.display_name())
            .replace("{name}", name.trim())
    }

    fn success_message_for(&self, kind: FormKind) -> String {
        self.forms
            .for_kind(kind)
            .success_message
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(kind.default_success_message())
            .to_string()
    }
}

fn log_summary(payload: &FormPayload, submission: &FormSubmission) {
    match payload {
        FormPayload::Contact(form) => info!(
            submission_id = %submission.id,
            form = %submission.kind,
            received_at = %submission.received_at.to_rfc3339(),
            name = %form.name,
            "Contact form submission"
        ),
        FormPayload::VehicleDonation(donation) => info!(
            submission_id = %submission.id,
            form = %submission.kind,
            received_at = %submission.received_at.to_rfc3339(),
            name = %donation.name,
            vehicle = %donation.vehicle_summary(),
            "Vehicle donation submission"
        ),
    }
}

fn log_dispatch(submission: &FormSubmission, purpose: &str, result: &EmailResult) {
    if result.succeeded {
        info!(
            submission_id = %submission.id,
            form = %submission.kind,
            message_id = result.message_id.as_deref().unwrap_or_default(),
            "Sent {}",
            purpose
        );
    } else {
        error!(
            submission_id = %submission.id,
            form = %submission.kind,
            detail = result.error_detail.as_deref().unwrap_or("unknown error"),
            "Failed to send {}",
            purpose
        );
    }
}
