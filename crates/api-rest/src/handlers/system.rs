use crate::AppState;
use api_shared::dto::{BannerRes, HealthRes};
use axum::{extract::State, response::Json};

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = BannerRes)
    )
)]
/// Service banner naming the application, the clinic and the running version.
#[axum::debug_handler]
pub async fn banner(State(state): State<AppState>) -> Json<BannerRes> {
    Json(state.health.banner())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks. It never touches the database.
#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    Json(state.health.check_health())
}
