use crate::error::ApiError;
use crate::AppState;
use api_shared::dto::{AppointmentRes, CreateAppointmentReq, CreatedRes, ErrorRes};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};

#[utoipa::path(
    get,
    path = "/api/v1/appointments",
    responses(
        (status = 200, description = "Booked appointments ordered by id", body = [AppointmentRes])
    )
)]
#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppState>,
) -> Result<Json<Vec<AppointmentRes>>, ApiError> {
    let appointments = state.appointments.list().await?;
    Ok(Json(
        appointments.into_iter().map(AppointmentRes::from).collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/appointments",
    request_body = CreateAppointmentReq,
    responses(
        (status = 201, description = "Appointment booked", body = CreatedRes),
        (status = 400, description = "Invalid date, time or patient name", body = ErrorRes)
    )
)]
/// Book an appointment
///
/// No conflict detection is done. Two bookings for the same slot are both accepted.
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<AppState>,
    body: Result<Json<CreateAppointmentReq>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedRes>), ApiError> {
    let Json(req) = body?;
    let appointment = state.appointments.create(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedRes {
            id: appointment.id,
            message: "Appointment created successfully".into(),
        }),
    ))
}
