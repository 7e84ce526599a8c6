use std::{fmt, str::FromStr};

use serde::Deserialize;
use validator::Validate;

use crate::{
    entities::submission::FieldValue,
    validation::{
        at_most_100_chars, must_be_true, validate_vehicle_condition, DIGITS_ONLY_RE,
        FOUR_DIGIT_YEAR_RE, ZIP_CODE_RE,
    },
};

// ───── Request Model ─────────────────────────────────────────────────

/// Vehicle donation form as posted by the website.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDonationRequest {
    // Donor information
    #[serde(default)]
    #[validate(
        length(min = 2, message = "Name is required"),
        custom(function = "at_most_100_chars", message = "Name must be at most 100 characters")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 10, message = "Please enter a valid phone number"))]
    pub phone: String,

    #[serde(default)]
    #[validate(length(min = 5, message = "Please enter your address"))]
    pub address: String,

    #[serde(default)]
    #[validate(length(min = 2, message = "Please enter your city"))]
    pub city: String,

    #[serde(default)]
    #[validate(length(equal = 2, message = "Please enter a 2-letter state code"))]
    pub state: String,

    #[serde(default)]
    #[validate(regex(path = *ZIP_CODE_RE, message = "Please enter a valid ZIP code"))]
    pub zip_code: String,

    // Vehicle information
    #[serde(default)]
    #[validate(regex(path = *FOUR_DIGIT_YEAR_RE, message = "Please enter a valid 4-digit year"))]
    pub vehicle_year: String,

    #[serde(default)]
    #[validate(length(min = 2, message = "Vehicle make is required"))]
    pub vehicle_make: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Vehicle model is required"))]
    pub vehicle_model: String,

    #[serde(default)]
    #[validate(regex(path = *DIGITS_ONLY_RE, message = "Please enter mileage as a number"))]
    pub vehicle_mileage: String,

    #[serde(default)]
    #[validate(custom(function = "validate_vehicle_condition"))]
    pub vehicle_condition: String,

    // Title information
    #[serde(default)]
    #[validate(required(message = "Please tell us whether you have the title"))]
    pub has_title: Option<bool>,

    #[serde(default)]
    pub title_location: Option<String>,

    #[serde(default)]
    pub lienholder: Option<String>,

    // Additional details
    #[serde(default)]
    #[validate(length(min = 5, message = "Vehicle location is required"))]
    pub vehicle_location: String,

    #[serde(default)]
    #[validate(length(min = 10, message = "Please describe when the vehicle can be picked up"))]
    pub pickup_availability: String,

    #[serde(default)]
    pub additional_info: Option<String>,

    // Tax receipt and terms
    #[serde(default)]
    #[validate(required(message = "Please tell us whether you need a tax receipt"))]
    pub tax_receipt: Option<bool>,

    #[serde(default)]
    #[validate(custom(function = "must_be_true", message = "You must acknowledge the donation terms"))]
    pub acknowledgment: bool,
}

// ───── Domain Model ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleCondition {
    Excellent,
    Good,
    Fair,
    Poor,
    NotRunning,
}

impl VehicleCondition {
    pub const ALLOWED: [&'static str; 5] = ["excellent", "good", "fair", "poor", "not-running"];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleCondition::Excellent => "excellent",
            VehicleCondition::Good => "good",
            VehicleCondition::Fair => "fair",
            VehicleCondition::Poor => "poor",
            VehicleCondition::NotRunning => "not-running",
        }
    }
}

impl FromStr for VehicleCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "excellent" => Ok(VehicleCondition::Excellent),
            "good" => Ok(VehicleCondition::Good),
            "fair" => Ok(VehicleCondition::Fair),
            "poor" => Ok(VehicleCondition::Poor),
            "not-running" => Ok(VehicleCondition::NotRunning),
            other => Err(format!("Unknown vehicle condition: {}", other)),
        }
    }
}

impl fmt::Display for VehicleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleDonation {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub vehicle_year: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_mileage: String,
    pub vehicle_condition: VehicleCondition,
    pub has_title: bool,
    pub title_location: Option<String>,
    pub lienholder: Option<String>,
    pub vehicle_location: String,
    pub pickup_availability: String,
    pub additional_info: Option<String>,
    pub tax_receipt: bool,
    pub acknowledgment: bool,
}

/// Expects a request that already passed `validate()`.
impl TryFrom<VehicleDonationRequest> for VehicleDonation {
    type Error = String;

    fn try_from(form: VehicleDonationRequest) -> Result<Self, Self::Error> {
        Ok(VehicleDonation {
            vehicle_condition: form.vehicle_condition.parse()?,
            has_title: form.has_title.ok_or("hasTitle is required")?,
            tax_receipt: form.tax_receipt.ok_or("taxReceipt is required")?,
            name: form.name,
            email: form.email,
            phone: form.phone,
            address: form.address,
            city: form.city,
            state: form.state,
            zip_code: form.zip_code,
            vehicle_year: form.vehicle_year,
            vehicle_make: form.vehicle_make,
            vehicle_model: form.vehicle_model,
            vehicle_mileage: form.vehicle_mileage,
            title_location: form.title_location,
            lienholder: form.lienholder,
            vehicle_location: form.vehicle_location,
            pickup_availability: form.pickup_availability,
            additional_info: form.additional_info,
            acknowledgment: form.acknowledgment,
        })
    }
}

impl VehicleDonation {
    /// "2012 Honda Civic", used in log summaries.
    pub fn vehicle_summary(&self) -> String {
        format!("{} {} {}", self.vehicle_year, self.vehicle_make, self.vehicle_model)
    }

    pub fn fields(&self) -> Vec<(String, FieldValue)> {
        vec![
            ("name".into(), self.name.as_str().into()),
            ("email".into(), self.email.as_str().into()),
            ("phone".into(), self.phone.as_str().into()),
            ("address".into(), self.address.as_str().into()),
            ("city".into(), self.city.as_str().into()),
            ("state".into(), self.state.as_str().into()),
            ("zipCode".into(), self.zip_code.as_str().into()),
            ("vehicleYear".into(), self.vehicle_year.as_str().into()),
            ("vehicleMake".into(), self.vehicle_make.as_str().into()),
            ("vehicleModel".into(), self.vehicle_model.as_str().into()),
            ("vehicleMileage".into(), self.vehicle_mileage.as_str().into()),
            ("vehicleCondition".into(), self.vehicle_condition.as_str().into()),
            ("hasTitle".into(), self.has_title.into()),
            ("titleLocation".into(), FieldValue::optional_text(self.title_location.as_deref())),
            ("lienholder".into(), FieldValue::optional_text(self.lienholder.as_deref())),
            ("vehicleLocation".into(), self.vehicle_location.as_str().into()),
            ("pickupAvailability".into(), self.pickup_availability.as_str().into()),
            ("additionalInfo".into(), FieldValue::optional_text(self.additional_info.as_deref())),
            ("taxReceipt".into(), self.tax_receipt.into()),
            ("acknowledgment".into(), self.acknowledgment.into()),
        ]
    }
}
