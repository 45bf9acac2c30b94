use clinic_types::TextError;

/// Error taxonomy surfaced by the domain services.
///
/// The gateway translates each kind to an HTTP status. Storage errors never appear
/// here directly; services map them first.
#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    ConstraintViolation(String),
    #[error("invalid credentials")]
    Unauthorized,
    #[error("request timed out")]
    Timeout,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClinicError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn validation(field: &str, err: TextError) -> Self {
        Self::Validation(format!("{field}: {err}"))
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

pub type ClinicResult<T> = std::result::Result<T, ClinicError>;
