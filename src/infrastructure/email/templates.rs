//! Email bodies for form notifications and submitter acknowledgments.
//!
//! Rendering is pure: no I/O and no clock reads, so the same submission always
//! produces the same bodies.

use chrono::{DateTime, Datelike, Utc};

use crate::{
    entities::{
        email::RenderedEmail,
        submission::{FieldValue, FormSubmission},
    },
    utils::sanitize::{escape_html, strip_markup},
};

const ORGANIZATION: &str = "Mercy House Adult & Teen Challenge";
const WEBSITE_URL: &str = "https://mercyhouseatc.com";
const PHONE: &str = "(601) 858-2256";
const ACCENT: &str = "#e09900";
const NOT_PROVIDED: &str = "N/A";

/// `vehicleYear` -> `Vehicle Year`, `zipCode` -> `Zip Code`.
pub fn field_label(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_uppercase() {
            spaced.push(' ');
        }
        spaced.push(c);
    }

    let trimmed = spaced.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Human-readable value; empty and missing values read as `N/A`.
pub fn display_value(value: &FieldValue) -> String {
    let rendered = match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::Flag(true) => "Yes".to_string(),
        FieldValue::Flag(false) => "No".to_string(),
        FieldValue::List(items) => items.join(", "),
        FieldValue::Structured(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        FieldValue::Missing => String::new(),
    };

    if rendered.trim().is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        rendered
    }
}

fn format_received(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%B %-d, %Y at %-I:%M %p UTC").to_string()
}

pub fn render_submission_notification(submission: &FormSubmission) -> RenderedEmail {
    let form_name = submission.kind.display_name();
    let received = format_received(&submission.received_at);
    let year = submission.received_at.year();

    let html_fields: String = submission
        .data
        .iter()
        .map(|(name, value)| {
            format!(
                r#"<div style="margin-bottom:15px;">
  <div style="font-weight:bold;color:#555555;">{label}:</div>
  <div style="margin-top:5px;padding:10px;background:#ffffff;border-radius:4px;white-space:pre-wrap;">{value}</div>
</div>
"#,
                label = escape_html(&field_label(name)),
                value = escape_html(&display_value(value)),
            )
        })
        .collect();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>New {form_name} Form Submission</title></head>
<body style="margin:0;font-family:Arial,sans-serif;line-height:1.6;color:#333333;">
<div style="max-width:600px;margin:0 auto;padding:20px;">
<div style="background:{ACCENT};color:#ffffff;padding:20px;text-align:center;">
  <h2 style="margin:0;">New {form_name} Form Submission</h2>
  <p style="margin:8px 0 0;">Received: {received}</p>
</div>
<div style="background:#f4f4f4;padding:20px;margin-top:20px;">
{html_fields}</div>
<div style="margin-top:30px;padding-top:20px;border-top:1px solid #dddddd;text-align:center;color:#888888;font-size:12px;">
  <p>This email was sent from the Mercy House ATC website form system.</p>
  <p>&copy; {year} {organization}</p>
</div>
</div>
</body>
</html>
"#,
        organization = escape_html(ORGANIZATION),
    );

    let text_fields = submission
        .data
        .iter()
        .map(|(name, value)| format!("{}: {}", field_label(name), display_value(value)))
        .collect::<Vec<_>>()
        .join("\n");

    let text = format!(
        "New {form_name} Form Submission\n\
         ========================================\n\
         Received: {received}\n\
         \n\
         {text_fields}\n\
         \n\
         ----------------------------------------\n\
         This email was sent from the Mercy House ATC website form system.\n\
         © {year} {ORGANIZATION}"
    );

    RenderedEmail { html, text }
}

/// Thank-you message for the submitter. `year` goes in the footer.
pub fn render_acknowledgment(recipient_name: &str, year: i32) -> RenderedEmail {
    let html_name = escape_html(recipient_name);
    let text_name = strip_markup(recipient_name);

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Welcome to Mercy House</title></head>
<body style="margin:0;font-family:Arial,sans-serif;line-height:1.6;color:#333333;">
<div style="max-width:600px;margin:0 auto;padding:20px;">
<div style="background:{ACCENT};color:#ffffff;padding:30px;text-align:center;">
  <h1 style="margin:0;">Welcome to Mercy House</h1>
</div>
<div style="padding:30px;">
  <h2>Thank you for reaching out, {html_name}!</h2>
  <p>We've received your submission and someone from our team will be in touch with you soon.</p>
  <p>At {organization}, we're committed to providing faith-based recovery and rehabilitation services to those in need. Your inquiry is important to us, and we'll respond as quickly as possible.</p>
  <p>If you need immediate assistance, please don't hesitate to call us at <strong>{PHONE}</strong>.</p>
  <a href="{WEBSITE_URL}" style="display:inline-block;padding:12px 30px;background:{ACCENT};color:#ffffff;text-decoration:none;border-radius:4px;margin-top:20px;">Visit Our Website</a>
</div>
<div style="margin-top:30px;padding-top:20px;border-top:1px solid #dddddd;text-align:center;color:#888888;font-size:12px;">
  <p>&copy; {year} {organization}</p>
  <p>Faith-based recovery and rehabilitation in Mississippi</p>
</div>
</div>
</body>
</html>
"#,
        organization = escape_html(ORGANIZATION),
    );

    let text = format!(
        "Welcome to Mercy House\n\
         \n\
         Thank you for reaching out, {text_name}!\n\
         \n\
         We've received your submission and someone from our team will be in touch with you soon.\n\
         \n\
         At {ORGANIZATION}, we're committed to providing faith-based recovery and rehabilitation services to those in need. Your inquiry is important to us, and we'll respond as quickly as possible.\n\
         \n\
         If you need immediate assistance, please don't hesitate to call us at {PHONE}.\n\
         \n\
         Visit our website: {WEBSITE_URL}\n\
         \n\
         © {year} {ORGANIZATION}\n\
         Faith-based recovery and rehabilitation in Mississippi"
    );

    RenderedEmail { html, text }
}
