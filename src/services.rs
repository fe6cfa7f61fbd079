pub mod secrets;
pub mod tasks;
