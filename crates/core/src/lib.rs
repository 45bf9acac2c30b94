//! # Clinic Core
//!
//! Business logic for the clinic management backend.
//!
//! This crate owns the data and the rules around it:
//! - Patient registration, lookup and paged listing backed by SQLite
//! - The in-memory appointment book
//! - Password hashing, token issuance and logout revocation
//! - Environment driven configuration
//!
//! **No transport concerns**: HTTP routing, status codes and OpenAPI live in `api-rest`.
//! DTOs shared with the transport layer live in `api-shared`.

pub mod appointment;
pub mod auth;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod password;
pub mod patient;
pub mod repositories;

pub use api_shared::dto;

pub use appointment::{Appointment, AppointmentService, NewAppointment};
pub use auth::{AuthService, Claims, IssuedToken};
pub use config::{ClinicConfig, ConfigError};
pub use error::{ClinicError, ClinicResult};
pub use patient::{NewPatient, Patient, PatientService};
pub use repositories::{StoreError, StoreResult};
