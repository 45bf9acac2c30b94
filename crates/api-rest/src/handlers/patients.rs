use crate::error::ApiError;
use crate::AppState;
use api_shared::dto::{
    CreatePatientReq, CreatedRes, ErrorRes, ListPatientsQuery, PatientRes, PatientSummary,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};

#[utoipa::path(
    get,
    path = "/api/v1/patients",
    params(ListPatientsQuery),
    responses(
        (status = 200, description = "Patients ordered by id", body = [PatientSummary]),
        (status = 400, description = "Invalid paging parameters", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// List patients in ascending id order
///
/// `skip` defaults to 0. `limit` defaults to, and is capped at, the configured maximum.
///
/// # Errors
/// Returns `400 Bad Request` if `skip` or `limit` is negative or not a number.
#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    query: Result<Query<ListPatientsQuery>, QueryRejection>,
) -> Result<Json<Vec<PatientSummary>>, ApiError> {
    let Query(query) = query?;
    let max = state.cfg.patient_list_max_limit();
    let skip = query.skip.unwrap_or(0);
    let limit = query.limit.unwrap_or(max).min(max);

    let patients = state.patients.list(skip, limit).await?;
    Ok(Json(patients.into_iter().map(PatientSummary::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/patients",
    request_body = CreatePatientReq,
    responses(
        (status = 201, description = "Patient created", body = CreatedRes),
        (status = 400, description = "Invalid patient data", body = ErrorRes),
        (status = 409, description = "Email already registered", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Register a new patient
///
/// # Errors
/// Returns:
/// - `400 Bad Request` if the body is malformed, has unknown fields, or a field is blank or too long,
/// - `409 Conflict` if another patient already uses the email,
/// - `500 Internal Server Error` if the store fails.
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    body: Result<Json<CreatePatientReq>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedRes>), ApiError> {
    let Json(req) = body?;
    let patient = state.patients.create(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedRes {
            id: patient.id,
            message: "Patient created successfully".into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}",
    params(
        ("id" = i64, Path, description = "Patient id")
    ),
    responses(
        (status = 200, description = "Full patient record", body = PatientRes),
        (status = 400, description = "Id is not a number", body = ErrorRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<PatientRes>, ApiError> {
    let Path(id) = id?;
    let patient = state.patients.get(id).await?;
    Ok(Json(patient.into()))
}
