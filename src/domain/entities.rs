pub mod contact;
pub mod email;
pub mod submission;
pub mod vehicle_donation;
