use serde_json::{json, Value};

pub fn valid_contact() -> Value {
    json!({
        "name": "Jo Carter",
        "email": "jo@example.com",
        "phone": "601-555-0100",
        "subject": "Program question",
        "message": "Could you tell me more about the residential program?"
    })
}

pub fn valid_donation() -> Value {
    json!({
        "name": "Jordan Smith",
        "email": "jordan@example.com",
        "phone": "6015550100",
        "address": "12 Main Street",
        "city": "Jackson",
        "state": "MS",
        "zipCode": "39201",
        "vehicleYear": "2012",
        "vehicleMake": "Honda",
        "vehicleModel": "Civic",
        "vehicleMileage": "120000",
        "vehicleCondition": "good",
        "hasTitle": true,
        "vehicleLocation": "Driveway at home",
        "pickupAvailability": "Weekdays after 5pm",
        "taxReceipt": true,
        "acknowledgment": true
    })
}

/// Issue field names from a 400 response body.
pub fn issue_fields(body: &Value) -> Vec<String> {
    body["issues"]
        .as_array()
        .map(|issues| {
            issues
                .iter()
                .filter_map(|issue| issue["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
