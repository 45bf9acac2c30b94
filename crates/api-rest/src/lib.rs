//! # API REST
//!
//! HTTP gateway for the clinic backend.
//!
//! Handles:
//! - HTTP endpoints with axum, versioned under `/api/v1`
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (CORS allow-list, request deadline, tracing, status mapping)
//!
//! Business rules live in `clinic-core`. Wire types come from `api-shared`.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;

pub use error::ApiError;

use anyhow::Context;
use api_shared::dto;
use api_shared::HealthService;
use axum::{
    error_handling::HandleErrorLayer,
    http::HeaderValue,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    BoxError, Router,
};
use clinic_core::{
    repositories::{
        appointments::InMemoryAppointmentStore, credentials::StaticCredentialStore,
        patients::SqlitePatientRepository, revocations::InMemoryRevocationStore,
    },
    db::SqlitePool,
    AppointmentService, AuthService, ClinicConfig, ClinicError, PatientService,
};
use std::any::Any;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use handlers::{appointments, auth, patients, system};

/// Application state for the REST API server
///
/// Shared by all request handlers. Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<ClinicConfig>,
    pub health: HealthService,
    pub patients: PatientService,
    pub appointments: AppointmentService,
    pub auth: AuthService,
}

impl AppState {
    /// Wires the domain services to their stores.
    ///
    /// Patients go to `pool`. Appointments and revoked tokens are kept in process.
    pub fn from_config(cfg: Arc<ClinicConfig>, pool: SqlitePool) -> Self {
        let health = HealthService::new(cfg.app_name(), cfg.clinic_name(), cfg.version());
        let patients = PatientService::new(Arc::new(SqlitePatientRepository::new(
            pool,
            cfg.patient_list_max_limit(),
        )));
        let appointments = AppointmentService::new(Arc::new(InMemoryAppointmentStore::new()));
        let auth = AuthService::new(
            &cfg,
            Arc::new(StaticCredentialStore::from_config(&cfg)),
            Arc::new(InMemoryRevocationStore::new()),
        );

        Self {
            cfg,
            health,
            patients,
            appointments,
            auth,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        system::banner,
        system::health,
        patients::list_patients,
        patients::create_patient,
        patients::get_patient,
        appointments::list_appointments,
        appointments::create_appointment,
        auth::login,
        auth::logout,
    ),
    components(schemas(
        dto::HealthRes,
        dto::BannerRes,
        dto::ErrorRes,
        dto::MessageRes,
        dto::CreatedRes,
        dto::CreatePatientReq,
        dto::PatientSummary,
        dto::PatientRes,
        dto::AppointmentRes,
        dto::CreateAppointmentReq,
        dto::LoginReq,
        dto::TokenRes,
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Builds the full gateway: routes, documentation and middleware.
///
/// # Errors
/// Returns an error if a configured CORS origin is not a valid header value.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cfg = state.cfg.clone();

    let api = Router::new()
        .route(
            "/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route("/patients/:id", get(patients::get_patient))
        .route(
            "/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    let mut router = Router::new()
        .route("/", get(system::banner))
        .route("/health", get(system::health))
        .nest("/api/v1", api);

    router = if cfg.debug() {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router.route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
    };

    with_middleware(router.with_state(state), &cfg)
}

/// Wraps `router` in the gateway middleware stack.
///
/// Outermost first: request tracing, CORS, panic recovery, then the per-request deadline.
///
/// # Errors
/// Returns an error if a configured CORS origin is not a valid header value.
pub fn with_middleware(router: Router, cfg: &ClinicConfig) -> anyhow::Result<Router> {
    Ok(router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(cfg)?)
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(HandleErrorLayer::new(handle_middleware_error))
            .timeout(cfg.request_timeout()),
    ))
}

/// CORS for the configured origins only, with credentials.
///
/// Methods and headers are mirrored from the preflight, since the wildcard is not
/// allowed together with credentials.
pub fn cors_layer(cfg: &ClinicConfig) -> anyhow::Result<CorsLayer> {
    let origins = cfg
        .cors_origins()
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin {o:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

async fn handle_middleware_error(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("request exceeded its deadline");
        ApiError(ClinicError::Timeout).into_response()
    } else {
        ApiError(ClinicError::internal(err)).into_response()
    }
}

/// A panicking handler becomes a plain 500 instead of a dropped connection.
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".into());
    ApiError(ClinicError::Internal(format!("handler panicked: {message}"))).into_response()
}

/// Resolves when the process receives Ctrl-C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    tokio::select! {
        _ = wait_ctrl_c() => {},
        _ = wait_sigterm() => {},
    }
    tracing::info!("shutdown signal received, draining connections");
}

async fn wait_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("received Ctrl-C");
}

#[cfg(unix)]
async fn wait_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
            tracing::info!("received SIGTERM");
        }
        Err(e) => {
            tracing::error!("failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_sigterm() {
    std::future::pending::<()>().await;
}
