//! Appointment service.
//!
//! Appointments are not part of the relational schema; they are held by an
//! [`AppointmentStore`] and exposed through the same service shape as patients.

use crate::constants::APPOINTMENT_NAME_MAX_LEN;
use crate::error::{ClinicError, ClinicResult};
use crate::repositories::appointments::AppointmentStore;
use api_shared::dto::{AppointmentRes, CreateAppointmentReq};
use chrono::{NaiveDate, NaiveTime, Timelike};
use clinic_types::NonEmptyText;
use std::sync::Arc;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_name: NonEmptyText,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: i64,
    pub patient_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

fn parse_date(raw: &str) -> ClinicResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        ClinicError::Validation(format!("date: '{raw}' is not a valid YYYY-MM-DD date"))
    })
}

/// Accepts `HH:MM` and `HH:MM:SS`; seconds are dropped.
fn parse_time(raw: &str) -> ClinicResult<NaiveTime> {
    let raw_trimmed = raw.trim();
    NaiveTime::parse_from_str(raw_trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw_trimmed, "%H:%M:%S"))
        .map(|t| t.with_second(0).unwrap_or(t))
        .map_err(|_| ClinicError::Validation(format!("time: '{raw}' is not a valid HH:MM time")))
}

impl TryFrom<CreateAppointmentReq> for NewAppointment {
    type Error = ClinicError;

    fn try_from(req: CreateAppointmentReq) -> ClinicResult<Self> {
        let patient_name = NonEmptyText::bounded(&req.patient_name, APPOINTMENT_NAME_MAX_LEN)
            .map_err(|e| ClinicError::validation("patient_name", e))?;
        Ok(Self {
            patient_name,
            date: parse_date(&req.date)?,
            time: parse_time(&req.time)?,
        })
    }
}

impl From<Appointment> for AppointmentRes {
    fn from(a: Appointment) -> Self {
        AppointmentRes {
            id: a.id,
            patient_name: a.patient_name,
            date: a.date.format(DATE_FORMAT).to_string(),
            time: a.time.format(TIME_FORMAT).to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppointmentService {
    store: Arc<dyn AppointmentStore>,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> ClinicResult<Vec<Appointment>> {
        self.store.list().await.map_err(ClinicError::internal)
    }

    /// Checks the date and time are well formed, then books the appointment.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::Validation` if the patient name is blank or the date or
    /// time cannot be parsed.
    pub async fn create(&self, req: CreateAppointmentReq) -> ClinicResult<Appointment> {
        let new_appointment = NewAppointment::try_from(req)?;
        let appointment = self
            .store
            .insert(new_appointment)
            .await
            .map_err(ClinicError::internal)?;
        tracing::info!(appointment_id = appointment.id, "appointment created");
        Ok(appointment)
    }
}
