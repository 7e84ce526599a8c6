pub mod extractors;
pub mod forms;
