pub mod log;
pub mod smtp;
pub mod templates;
