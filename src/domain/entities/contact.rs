use serde::Deserialize;
use validator::Validate;

use crate::{
    entities::submission::FieldValue,
    validation::{at_most_100_chars, at_most_200_chars, at_most_5000_chars},
};

/// Contact form as posted by the website.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactFormRequest {
    #[serde(default)]
    #[validate(
        length(min = 2, message = "Name must be at least 2 characters"),
        custom(function = "at_most_100_chars", message = "Name must be at most 100 characters")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    #[validate(
        length(min = 3, message = "Subject must be at least 3 characters"),
        custom(function = "at_most_200_chars", message = "Subject must be at most 200 characters")
    )]
    pub subject: String,

    #[serde(default)]
    #[validate(
        length(min = 10, message = "Message must be at least 10 characters"),
        custom(function = "at_most_5000_chars", message = "Message must be at most 5000 characters")
    )]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

impl From<ContactFormRequest> for ContactSubmission {
    fn from(form: ContactFormRequest) -> Self {
        ContactSubmission {
            name: form.name,
            email: form.email,
            phone: form.phone,
            subject: form.subject,
            message: form.message,
        }
    }
}

impl ContactSubmission {
    pub fn fields(&self) -> Vec<(String, FieldValue)> {
        vec![
            ("name".into(), self.name.as_str().into()),
            ("email".into(), self.email.as_str().into()),
            ("phone".into(), FieldValue::optional_text(self.phone.as_deref())),
            ("subject".into(), self.subject.as_str().into()),
            ("message".into(), self.message.as_str().into()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, subject: &str, message: &str) -> ContactFormRequest {
        ContactFormRequest {
            name: name.to_string(),
            email: "jo@example.com".to_string(),
            phone: None,
            subject: subject.to_string(),
            message: message.to_string(),
        }
    }

    fn message_for(errors: &validator::ValidationErrors, field: &str) -> String {
        errors.field_errors()[field][0]
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn short_fields_name_their_minimum() {
        let errors = request("J", "Hi", "short").validate().unwrap_err();

        assert_eq!(message_for(&errors, "name"), "Name must be at least 2 characters");
        assert_eq!(message_for(&errors, "subject"), "Subject must be at least 3 characters");
        assert_eq!(message_for(&errors, "message"), "Message must be at least 10 characters");
    }

    #[test]
    fn long_fields_name_their_maximum() {
        let errors = request(&"n".repeat(101), &"s".repeat(201), &"m".repeat(5001))
            .validate()
            .unwrap_err();

        assert_eq!(message_for(&errors, "name"), "Name must be at most 100 characters");
        assert_eq!(message_for(&errors, "subject"), "Subject must be at most 200 characters");
        assert_eq!(message_for(&errors, "message"), "Message must be at most 5000 characters");
    }

    #[test]
    fn limits_are_counted_in_characters() {
        assert!(request(&"é".repeat(100), "Hello", "A long enough message").validate().is_ok());
    }
}
