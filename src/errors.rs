use std::fmt;

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::Serialize;
use validator::ValidationErrors;

use crate::entities::submission::FormKind;

pub const CONFIGURATION_ERROR_MESSAGE: &str = "System configuration error. Please contact support.";
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again later.";

#[derive(Debug)]
pub enum FormError {
    RateLimited {
        retry_after_secs: u64,
        limit: u32,
        reset_at: DateTime<Utc>,
    },
    FormInactive,
    Configuration,
    PayloadTooLarge,
    ValidationFailed(Vec<FieldError>),
    Internal {
        kind: FormKind,
        detail: String,
    },
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::RateLimited { retry_after_secs, .. } => {
                write!(f, "rate limited, retry after {}s", retry_after_secs)
            }
            FormError::FormInactive => write!(f, "form is inactive"),
            FormError::Configuration => write!(f, "no notification recipients configured"),
            FormError::PayloadTooLarge => write!(f, "request too large"),
            FormError::ValidationFailed(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}:{}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            FormError::Internal { kind, detail } => {
                write!(f, "internal error processing {} form: {}", kind, detail)
            }
        }
    }
}

impl ResponseError for FormError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            FormError::RateLimited { retry_after_secs, .. } => serde_json::json!({
                "success": false,
                "error": RATE_LIMITED_MESSAGE,
                "retryAfter": retry_after_secs
            }),
            FormError::FormInactive => serde_json::json!({
                "success": false,
                "error": "This form is not currently accepting submissions"
            }),
            FormError::Configuration => serde_json::json!({
                "success": false,
                "error": CONFIGURATION_ERROR_MESSAGE
            }),
            FormError::PayloadTooLarge => serde_json::json!({
                "success": false,
                "error": "Request too large"
            }),
            FormError::ValidationFailed(errors) => serde_json::json!({
                "success": false,
                "error": "Validation failed",
                "issues": errors
            }),
            // Detail stays in the logs
            FormError::Internal { kind, .. } => serde_json::json!({
                "success": false,
                "error": kind.failure_message()
            }),
        };

        let mut response = HttpResponse::build(self.status_code());
        response.insert_header(ContentType::json());

        if let FormError::RateLimited { retry_after_secs, limit, reset_at } = self {
            response
                .insert_header(("Retry-After", retry_after_secs.to_string()))
                .insert_header(("X-RateLimit-Limit", limit.to_string()))
                .insert_header(("X-RateLimit-Remaining", "0"))
                .insert_header(("X-RateLimit-Reset", reset_at.timestamp_millis().to_string()));
        }

        response.json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            FormError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            FormError::FormInactive => StatusCode::SERVICE_UNAVAILABLE,
            FormError::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            FormError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            FormError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            FormError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for FormError {
    fn from(errors: ValidationErrors) -> Self {
        let mut issues = field_errors(&errors);
        issues.sort_by(|a, b| a.field.cmp(&b.field));

        FormError::ValidationFailed(issues)
    }
}

/// Flattens validator output into one issue per failed rule, keyed by the
/// camelCase name the client posted.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(|e| FieldError {
                field: to_camel_case(field),
                message: e
                    .message
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string()),
            })
        })
        .collect()
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        FormError::ValidationFailed(vec![FieldError {
            field: "body".to_string(),
            message: format!("Invalid JSON: {}", err),
        }])
    }
}

/// Failure inside an email transport. Never reaches a response; it is folded
/// into a failed `EmailResult` by the provider.
#[derive(Debug, Display)]
pub enum EmailError {
    #[display("Invalid email address: {_0}")]
    InvalidAddress(String),

    #[display("Failed to build message: {_0}")]
    Build(String),

    #[display("SMTP transport error: {_0}")]
    Transport(String),

    #[display("Email dispatch timed out after {_0}s")]
    Timeout(u64),

    #[display("Message has no recipients")]
    NoRecipients,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Maps `vehicle_year` to the wire spelling `vehicleYear`.
fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn camel_case_conversion_leaves_single_words_alone() {
        assert_eq!(to_camel_case("vehicle_mileage"), "vehicleMileage");
        assert_eq!(to_camel_case("zipCode"), "zipCode");
        assert_eq!(to_camel_case("name"), "name");
    }

    #[actix_rt::test]
    async fn rate_limited_response_carries_retry_headers() {
        let reset_at = Utc::now();
        let err = FormError::RateLimited { retry_after_secs: 42, limit: 5, reset_at };
        let response = err.error_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let headers = response.headers();
        assert_eq!(headers.get("Retry-After").unwrap(), "42");
        assert_eq!(headers.get("X-RateLimit-Limit").unwrap(), "5");
        assert_eq!(headers.get("X-RateLimit-Remaining").unwrap(), "0");
        assert_eq!(
            headers.get("X-RateLimit-Reset").unwrap().to_str().unwrap(),
            reset_at.timestamp_millis().to_string()
        );

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["retryAfter"], 42);
        assert_eq!(json["success"], false);
    }

    #[actix_rt::test]
    async fn internal_errors_hide_detail() {
        let err = FormError::Internal {
            kind: FormKind::VehicleDonation,
            detail: "connection reset by peer".into(),
        };
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("Failed to process vehicle donation"));
        assert!(!text.contains("connection reset"));
    }
}
