pub mod appointments;
pub mod auth;
pub mod patients;
pub mod system;
