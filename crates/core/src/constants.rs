//! Constants used throughout the clinic core crate.
//!
//! Column widths mirror the `patients` table so that values are rejected before
//! they reach storage.

/// Maximum length of a patient's first or last name.
pub const NAME_MAX_LEN: usize = 50;

/// Maximum length of a phone number.
pub const PHONE_MAX_LEN: usize = 20;

/// Maximum length of the free-text gender field.
pub const GENDER_MAX_LEN: usize = 10;

/// Maximum length of a patient status.
pub const STATUS_MAX_LEN: usize = 20;

/// Status assigned to patients created without one.
pub const DEFAULT_PATIENT_STATUS: &str = "active";

/// Maximum length of the patient name on an appointment.
pub const APPOINTMENT_NAME_MAX_LEN: usize = 100;

/// Default cap on `limit` when listing patients.
pub const DEFAULT_PATIENT_LIST_MAX_LIMIT: u32 = 100;

/// Token type reported by the login endpoint.
pub const TOKEN_TYPE: &str = "bearer";

/// Pool size for file-backed sqlite databases.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 8;

/// Origins of the staff, doctor and patient portals in development.
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:3002",
];

/// Signing secret used when `SECRET_KEY` is unset. Startup warns when it is in use.
pub const DEFAULT_SECRET_KEY: &str = "your-secret-key-change-in-production";
