use serde::Serialize;

/// Paired HTML and plain-text bodies produced by a template.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub html: String,
    pub text: String,
}

/// One or many addresses; a list keeps its order and drops duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipients(Vec<String>);

impl Recipients {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<String>> for Recipients {
    fn from(addresses: Vec<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(addresses.len());
        for address in addresses {
            let address = address.trim().to_string();
            if !address.is_empty() && !unique.iter().any(|a| a.eq_ignore_ascii_case(&address)) {
                unique.push(address);
            }
        }
        Recipients(unique)
    }
}

impl From<&[String]> for Recipients {
    fn from(addresses: &[String]) -> Self {
        Recipients::from(addresses.to_vec())
    }
}

impl From<String> for Recipients {
    fn from(address: String) -> Self {
        Recipients::from(vec![address])
    }
}

impl From<&str> for Recipients {
    fn from(address: &str) -> Self {
        Recipients::from(address.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub recipients: Recipients,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

impl EmailMessage {
    pub fn new(recipients: impl Into<Recipients>, subject: impl Into<String>, body: RenderedEmail) -> Self {
        EmailMessage {
            recipients: recipients.into(),
            subject: subject.into(),
            html_body: body.html,
            text_body: body.text,
        }
    }
}

/// Outcome of one dispatch attempt. Logged, never shown to the submitter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailResult {
    pub succeeded: bool,
    pub message_id: Option<String>,
    pub error_detail: Option<String>,
}

impl EmailResult {
    pub fn sent(message_id: impl Into<String>) -> Self {
        EmailResult {
            succeeded: true,
            message_id: Some(message_id.into()),
            error_detail: None,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        EmailResult {
            succeeded: false,
            message_id: None,
            error_detail: Some(detail.into()),
        }
    }
}
