//! Patient service and related types.
//!
//! This module provides the domain service for patient records: shape checks on
//! incoming requests, delegation to a [`PatientRepository`], and translation of
//! storage failures into [`ClinicError`].

use crate::constants::{
    DEFAULT_PATIENT_STATUS, GENDER_MAX_LEN, NAME_MAX_LEN, PHONE_MAX_LEN, STATUS_MAX_LEN,
};
use crate::error::{ClinicError, ClinicResult};
use crate::repositories::patients::PatientRepository;
use crate::repositories::StoreError;
use api_shared::dto::{CreatePatientReq, PatientRes, PatientSummary};
use chrono::{DateTime, NaiveDate, Utc};
use clinic_types::{EmailAddress, NonEmptyText};
use serde_json::Value;
use std::sync::Arc;

/// A validated patient that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    pub email: Option<EmailAddress>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<Value>,
    pub medical_info: Option<Value>,
    pub preferences: Option<Value>,
    pub status: NonEmptyText,
}

/// A stored patient record.
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<Value>,
    pub medical_info: Option<Value>,
    pub preferences: Option<Value>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trim an optional text field; blank values count as absent.
fn optional_text(
    field: &str,
    value: Option<String>,
    max: Option<usize>,
) -> ClinicResult<Option<String>> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    let text = match max {
        Some(max) => NonEmptyText::bounded(&value, max),
        None => NonEmptyText::new(&value),
    }
    .map_err(|e| ClinicError::validation(field, e))?;
    Ok(Some(text.into_inner()))
}

impl TryFrom<CreatePatientReq> for NewPatient {
    type Error = ClinicError;

    fn try_from(req: CreatePatientReq) -> ClinicResult<Self> {
        let first_name = NonEmptyText::bounded(&req.first_name, NAME_MAX_LEN)
            .map_err(|e| ClinicError::validation("first_name", e))?;
        let last_name = NonEmptyText::bounded(&req.last_name, NAME_MAX_LEN)
            .map_err(|e| ClinicError::validation("last_name", e))?;

        let email = req
            .email
            .filter(|v| !v.trim().is_empty())
            .map(EmailAddress::parse)
            .transpose()
            .map_err(|e| ClinicError::validation("email", e))?;

        let status = match req.status.filter(|v| !v.trim().is_empty()) {
            Some(status) => NonEmptyText::bounded(status, STATUS_MAX_LEN)
                .map_err(|e| ClinicError::validation("status", e))?,
            None => NonEmptyText::new(DEFAULT_PATIENT_STATUS)
                .map_err(|e| ClinicError::validation("status", e))?,
        };

        Ok(Self {
            first_name,
            last_name,
            email,
            phone: optional_text("phone", req.phone, Some(PHONE_MAX_LEN))?,
            date_of_birth: req.date_of_birth,
            gender: optional_text("gender", req.gender, Some(GENDER_MAX_LEN))?,
            address: optional_text("address", req.address, None)?,
            emergency_contact: req.emergency_contact,
            medical_info: req.medical_info,
            preferences: req.preferences,
            status,
        })
    }
}

impl From<Patient> for PatientRes {
    fn from(p: Patient) -> Self {
        PatientRes {
            id: p.id,
            first_name: p.first_name,
            last_name: p.last_name,
            email: p.email,
            phone: p.phone,
            date_of_birth: p.date_of_birth,
            gender: p.gender,
            address: p.address,
            emergency_contact: p.emergency_contact,
            medical_info: p.medical_info,
            preferences: p.preferences,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<Patient> for PatientSummary {
    fn from(p: Patient) -> Self {
        PatientSummary {
            id: p.id,
            first_name: p.first_name,
            last_name: p.last_name,
            email: p.email,
        }
    }
}

fn translate(err: StoreError) -> ClinicError {
    match err {
        StoreError::NotFound { .. } => ClinicError::not_found("Patient"),
        StoreError::UniqueViolation(detail) => {
            tracing::warn!("patient insert rejected by store: {}", detail);
            ClinicError::ConstraintViolation("a patient with this email already exists".into())
        }
        other => ClinicError::internal(other),
    }
}

/// Patient operations - no HTTP concerns
#[derive(Clone)]
pub struct PatientService {
    repo: Arc<dyn PatientRepository>,
}

impl PatientService {
    /// Creates a new instance of PatientService.
    ///
    /// # Arguments
    /// * `repo` - Store that owns the patient records
    pub fn new(repo: Arc<dyn PatientRepository>) -> Self {
        Self { repo }
    }

    /// Validates and stores a new patient.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError` if:
    /// - a required field is blank or a field exceeds its column width (`Validation`),
    /// - the email is already used by another patient (`ConstraintViolation`),
    /// - the store fails (`Internal`).
    pub async fn create(&self, req: CreatePatientReq) -> ClinicResult<Patient> {
        let new_patient = NewPatient::try_from(req)?;
        let patient = self.repo.create(new_patient).await.map_err(translate)?;
        tracing::info!(patient_id = patient.id, "patient created");
        Ok(patient)
    }

    /// Fetches a single patient.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::NotFound` if no patient has this identifier.
    pub async fn get(&self, id: i64) -> ClinicResult<Patient> {
        self.repo.get(id).await.map_err(translate)
    }

    /// Lists patients by ascending identifier.
    ///
    /// `limit` is capped by the repository.
    pub async fn list(&self, skip: u32, limit: u32) -> ClinicResult<Vec<Patient>> {
        self.repo.list(skip, limit).await.map_err(translate)
    }
}
