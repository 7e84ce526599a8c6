use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    entities::{
        contact::{ContactFormRequest, ContactSubmission},
        submission::{FormKind, FormPayload},
        vehicle_donation::{VehicleCondition, VehicleDonation, VehicleDonationRequest},
    },
    errors::{field_errors, FieldError, FormError},
};

pub static ZIP_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("valid zip regex"));
pub static FOUR_DIGIT_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("valid year regex"));
pub static DIGITS_ONLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid digits regex"));

pub fn validate_vehicle_condition(condition: &str) -> Result<(), ValidationError> {
    if VehicleCondition::ALLOWED.contains(&condition) {
        return Ok(());
    }

    let mut error = ValidationError::new("vehicle_condition");
    error.message = Some(
        format!("Condition must be one of: {}", VehicleCondition::ALLOWED.join(", ")).into(),
    );
    Err(error)
}

pub fn must_be_true(value: &bool) -> Result<(), ValidationError> {
    if *value {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_true"))
    }
}

fn at_most(value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() <= max {
        return Ok(());
    }

    let mut error = ValidationError::new("length");
    error.add_param("max".into(), &max);
    Err(error)
}

pub fn at_most_100_chars(value: &str) -> Result<(), ValidationError> {
    at_most(value, 100)
}

pub fn at_most_200_chars(value: &str) -> Result<(), ValidationError> {
    at_most(value, 200)
}

pub fn at_most_5000_chars(value: &str) -> Result<(), ValidationError> {
    at_most(value, 5000)
}

#[derive(Debug, Clone, Copy)]
enum Expected {
    Text,
    Flag,
}

impl Expected {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Expected::Text => value.is_string(),
            Expected::Flag => value.is_boolean(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Expected::Text => "string",
            Expected::Flag => "boolean",
        }
    }
}

const CONTACT_FIELDS: &[(&str, Expected)] = &[
    ("name", Expected::Text),
    ("email", Expected::Text),
    ("phone", Expected::Text),
    ("subject", Expected::Text),
    ("message", Expected::Text),
];

const DONATION_FIELDS: &[(&str, Expected)] = &[
    ("name", Expected::Text),
    ("email", Expected::Text),
    ("phone", Expected::Text),
    ("address", Expected::Text),
    ("city", Expected::Text),
    ("state", Expected::Text),
    ("zipCode", Expected::Text),
    ("vehicleYear", Expected::Text),
    ("vehicleMake", Expected::Text),
    ("vehicleModel", Expected::Text),
    ("vehicleMileage", Expected::Text),
    ("vehicleCondition", Expected::Text),
    ("hasTitle", Expected::Flag),
    ("titleLocation", Expected::Text),
    ("lienholder", Expected::Text),
    ("vehicleLocation", Expected::Text),
    ("pickupAvailability", Expected::Text),
    ("additionalInfo", Expected::Text),
    ("taxReceipt", Expected::Flag),
    ("acknowledgment", Expected::Flag),
];

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Strips known fields carrying the wrong JSON type (null included) and
/// returns one issue for each. What remains always deserializes.
fn take_type_issues(object: &mut Map<String, Value>, schema: &[(&str, Expected)]) -> Vec<FieldError> {
    let mut issues = Vec::new();
    for &(field, expected) in schema {
        let Some(value) = object.get(field) else { continue };
        if expected.accepts(value) {
            continue;
        }
        issues.push(FieldError {
            field: field.to_string(),
            message: format!("Expected {}, received {}", expected.name(), json_type(value)),
        });
        object.remove(field);
    }
    issues
}

/// Merges type issues with rule issues. A field with a type issue reports
/// only that one.
fn collect_issues(
    mut issues: Vec<FieldError>,
    outcome: Result<(), ValidationErrors>,
) -> Result<(), FormError> {
    if let Err(errors) = outcome {
        let rule_issues: Vec<FieldError> = field_errors(&errors)
            .into_iter()
            .filter(|rule| !issues.iter().any(|typed| typed.field == rule.field))
            .collect();
        issues.extend(rule_issues);
    }

    if issues.is_empty() {
        return Ok(());
    }
    issues.sort_by(|a, b| a.field.cmp(&b.field));
    Err(FormError::ValidationFailed(issues))
}

/// Parses and validates a raw request body for the given form kind.
///
/// Every violation is reported together, type mismatches included; nothing
/// is partially accepted.
pub fn validate_payload(kind: FormKind, body: &[u8]) -> Result<FormPayload, FormError> {
    let raw: Value = serde_json::from_slice(body)?;
    let Value::Object(mut object) = raw else {
        return Err(FormError::ValidationFailed(vec![FieldError {
            field: "body".to_string(),
            message: "Expected a JSON object".to_string(),
        }]));
    };

    match kind {
        FormKind::Contact => {
            let type_issues = take_type_issues(&mut object, CONTACT_FIELDS);
            let request: ContactFormRequest = serde_json::from_value(Value::Object(object))?;
            collect_issues(type_issues, request.validate())?;
            Ok(FormPayload::Contact(ContactSubmission::from(request)))
        }
        FormKind::VehicleDonation => {
            let type_issues = take_type_issues(&mut object, DONATION_FIELDS);
            let request: VehicleDonationRequest = serde_json::from_value(Value::Object(object))?;
            collect_issues(type_issues, request.validate())?;
            let donation = VehicleDonation::try_from(request).map_err(|message| {
                FormError::ValidationFailed(vec![FieldError {
                    field: "body".to_string(),
                    message,
                }])
            })?;
            Ok(FormPayload::VehicleDonation(donation))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_donation() -> Value {
        json!({
            "name": "Jordan Smith",
            "email": "jordan@example.com",
            "phone": "6015550100",
            "address": "12 Main Street",
            "city": "Jackson",
            "state": "MS",
            "zipCode": "39201-1234",
            "vehicleYear": "2012",
            "vehicleMake": "Honda",
            "vehicleModel": "Civic",
            "vehicleMileage": "120000",
            "vehicleCondition": "not-running",
            "hasTitle": true,
            "vehicleLocation": "Driveway at home",
            "pickupAvailability": "Weekdays after 5pm",
            "taxReceipt": false,
            "acknowledgment": true
        })
    }

    fn issues(result: Result<FormPayload, FormError>) -> Vec<FieldError> {
        match result {
            Err(FormError::ValidationFailed(issues)) => issues,
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    fn has_issue(issues: &[FieldError], field: &str) -> bool {
        issues.iter().any(|issue| issue.field == field)
    }

    #[test]
    fn accepts_contact_with_optional_phone_missing() {
        let body = json!({
            "name": "Jo",
            "email": "jo@example.com",
            "subject": "Hello",
            "message": "I would like to learn more."
        });
        let payload = validate_payload(FormKind::Contact, body.to_string().as_bytes()).unwrap();
        match payload {
            FormPayload::Contact(form) => {
                assert_eq!(form.name, "Jo");
                assert_eq!(form.phone, None);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn reports_every_contact_violation_at_once() {
        let body = json!({ "name": "J", "email": "not-an-email", "subject": "Hi", "message": "short" });
        let issues = issues(validate_payload(FormKind::Contact, body.to_string().as_bytes()));

        for field in ["name", "email", "subject", "message"] {
            assert!(has_issue(&issues, field), "missing issue for {field}: {issues:?}");
        }
    }

    #[test]
    fn missing_contact_fields_are_reported_by_name() {
        let issues = issues(validate_payload(FormKind::Contact, b"{}"));
        assert!(has_issue(&issues, "name"));
        assert!(has_issue(&issues, "email"));
        assert!(has_issue(&issues, "message"));
    }

    #[test]
    fn accepts_valid_vehicle_donation() {
        let payload =
            validate_payload(FormKind::VehicleDonation, valid_donation().to_string().as_bytes()).unwrap();
        match payload {
            FormPayload::VehicleDonation(donation) => {
                assert_eq!(donation.vehicle_condition, VehicleCondition::NotRunning);
                assert!(donation.has_title);
                assert!(!donation.tax_receipt);
                assert_eq!(donation.vehicle_summary(), "2012 Honda Civic");
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn rejects_donation_without_acknowledgment() {
        let mut body = valid_donation();
        body["acknowledgment"] = json!(false);
        let issues = issues(validate_payload(FormKind::VehicleDonation, body.to_string().as_bytes()));

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "acknowledgment");
        assert_eq!(issues[0].message, "You must acknowledge the donation terms");
    }

    #[test]
    fn rejects_malformed_donation_fields() {
        let mut body = valid_donation();
        body["state"] = json!("Miss");
        body["zipCode"] = json!("3920");
        body["vehicleYear"] = json!("12");
        body["vehicleMileage"] = json!("12k");
        body["vehicleCondition"] = json!("totaled");
        let issues = issues(validate_payload(FormKind::VehicleDonation, body.to_string().as_bytes()));

        for field in ["state", "zipCode", "vehicleYear", "vehicleMileage", "vehicleCondition"] {
            assert!(has_issue(&issues, field), "missing issue for {field}: {issues:?}");
        }
    }

    #[test]
    fn required_flags_must_be_present() {
        let mut body = valid_donation();
        let object = body.as_object_mut().unwrap();
        object.remove("hasTitle");
        object.remove("taxReceipt");
        let issues = issues(validate_payload(FormKind::VehicleDonation, body.to_string().as_bytes()));

        assert!(has_issue(&issues, "hasTitle"));
        assert!(has_issue(&issues, "taxReceipt"));
    }

    #[test]
    fn zip_plus_four_is_accepted_and_bare_five_digits_too() {
        assert!(ZIP_CODE_RE.is_match("39201"));
        assert!(ZIP_CODE_RE.is_match("39201-1234"));
        assert!(!ZIP_CODE_RE.is_match("39201-12"));
    }

    #[test]
    fn malformed_json_is_a_body_issue() {
        let issues = issues(validate_payload(FormKind::Contact, b"{not json"));
        assert_eq!(issues[0].field, "body");
    }

    #[test]
    fn non_object_json_is_rejected() {
        let issues = issues(validate_payload(FormKind::Contact, b"[1, 2, 3]"));
        assert_eq!(issues[0].message, "Expected a JSON object");
    }

    #[test]
    fn wrong_types_are_reported_alongside_rule_violations() {
        let body = json!({ "name": 123, "email": "bad", "subject": "Hello there", "message": "short" });
        let issues = issues(validate_payload(FormKind::Contact, body.to_string().as_bytes()));

        let name: Vec<_> = issues.iter().filter(|issue| issue.field == "name").collect();
        assert_eq!(name.len(), 1);
        assert_eq!(name[0].message, "Expected string, received number");
        assert!(has_issue(&issues, "email"));
        assert!(has_issue(&issues, "message"));
        assert!(!has_issue(&issues, "subject"));
        assert!(!has_issue(&issues, "body"));
    }

    #[test]
    fn explicit_null_is_not_an_omitted_optional() {
        let body = json!({
            "name": "Jo",
            "email": "jo@example.com",
            "phone": null,
            "subject": "Hello",
            "message": "I would like to learn more."
        });
        let issues = issues(validate_payload(FormKind::Contact, body.to_string().as_bytes()));

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "phone");
        assert_eq!(issues[0].message, "Expected string, received null");
    }

    #[test]
    fn wrongly_typed_flags_are_reported_with_other_donation_issues() {
        let mut body = valid_donation();
        body["hasTitle"] = json!("yes");
        body["acknowledgment"] = json!(1);
        body["zipCode"] = json!("ABCDE");
        let issues = issues(validate_payload(FormKind::VehicleDonation, body.to_string().as_bytes()));

        let fields: Vec<_> = issues.iter().map(|issue| issue.field.as_str()).collect();
        assert_eq!(fields, vec!["acknowledgment", "hasTitle", "zipCode"]);
        assert_eq!(issues[0].message, "Expected boolean, received number");
        assert_eq!(issues[1].message, "Expected boolean, received string");
    }

    #[test]
    fn long_free_text_donation_fields_are_accepted() {
        let mut body = valid_donation();
        body["pickupAvailability"] = json!("Weekday evenings. ".repeat(84));
        body["titleLocation"] = json!("t".repeat(300));
        body["lienholder"] = json!("l".repeat(300));
        body["vehicleMake"] = json!("m".repeat(80));
        body["additionalInfo"] = json!("a".repeat(60_000));

        let payload = validate_payload(FormKind::VehicleDonation, body.to_string().as_bytes()).unwrap();
        match payload {
            FormPayload::VehicleDonation(donation) => {
                assert!(donation.pickup_availability.chars().count() >= 1500);
                assert_eq!(donation.title_location.map(|t| t.len()), Some(300));
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn donor_name_keeps_its_ceiling() {
        let mut body = valid_donation();
        body["name"] = json!("n".repeat(101));
        let issues = issues(validate_payload(FormKind::VehicleDonation, body.to_string().as_bytes()));

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Name must be at most 100 characters");
    }
}
