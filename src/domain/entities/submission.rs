use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{contact::ContactSubmission, vehicle_donation::VehicleDonation};

/// The fixed set of submission types this service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormKind {
    Contact,
    VehicleDonation,
}

impl FormKind {
    /// Name used in email headings and log lines.
    pub fn display_name(&self) -> &'static str {
        match self {
            FormKind::Contact => "Contact",
            FormKind::VehicleDonation => "Vehicle Donation",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            FormKind::Contact => "contact",
            FormKind::VehicleDonation => "donate-car",
        }
    }

    /// Largest accepted request body, in bytes.
    pub fn max_body_bytes(&self) -> usize {
        match self {
            FormKind::Contact => 50_000,
            FormKind::VehicleDonation => 100_000,
        }
    }

    pub fn default_subject(&self) -> &'static str {
        match self {
            FormKind::Contact => "New Contact Form Submission from {name}",
            FormKind::VehicleDonation => "New Vehicle Donation from {name}",
        }
    }

    pub fn acknowledgment_subject(&self) -> &'static str {
        match self {
            FormKind::Contact => "Thank you for contacting Mercy House",
            FormKind::VehicleDonation => "Thank you for your vehicle donation!",
        }
    }

    pub fn default_success_message(&self) -> &'static str {
        match self {
            FormKind::Contact => "Form submitted successfully",
            FormKind::VehicleDonation => "Vehicle donation submitted successfully",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            FormKind::Contact => "Failed to process form submission",
            FormKind::VehicleDonation => "Failed to process vehicle donation",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// A single submitted value as it appears in notification emails.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    List(Vec<String>),
    Structured(serde_json::Value),
    Missing,
}

impl FieldValue {
    pub fn optional_text(value: Option<&str>) -> Self {
        match value {
            Some(v) => FieldValue::Text(v.to_string()),
            None => FieldValue::Missing,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

/// A validated payload, one arm per form kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPayload {
    Contact(ContactSubmission),
    VehicleDonation(VehicleDonation),
}

impl FormPayload {
    pub fn kind(&self) -> FormKind {
        match self {
            FormPayload::Contact(_) => FormKind::Contact,
            FormPayload::VehicleDonation(_) => FormKind::VehicleDonation,
        }
    }

    pub fn submitter_name(&self) -> &str {
        match self {
            FormPayload::Contact(form) => &form.name,
            FormPayload::VehicleDonation(form) => &form.name,
        }
    }

    pub fn submitter_email(&self) -> Option<&str> {
        let email = match self {
            FormPayload::Contact(form) => form.email.as_str(),
            FormPayload::VehicleDonation(form) => form.email.as_str(),
        };
        Some(email.trim()).filter(|e| !e.is_empty())
    }

    /// Field map in wire order, keyed by the camelCase field names the forms post.
    pub fn fields(&self) -> Vec<(String, FieldValue)> {
        match self {
            FormPayload::Contact(form) => form.fields(),
            FormPayload::VehicleDonation(form) => form.fields(),
        }
    }
}

/// An accepted submission. Lives only as long as the request that produced it.
#[derive(Debug, Clone)]
pub struct FormSubmission {
    pub id: Uuid,
    pub kind: FormKind,
    pub data: Vec<(String, FieldValue)>,
    pub received_at: DateTime<Utc>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}

impl FormSubmission {
    pub fn new(
        payload: &FormPayload,
        received_at: DateTime<Utc>,
        client_ip: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        FormSubmission {
            id: Uuid::new_v4(),
            kind: payload.kind(),
            data: payload.fields(),
            received_at,
            client_ip,
            user_agent,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
}
