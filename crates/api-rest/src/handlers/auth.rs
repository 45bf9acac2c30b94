use crate::error::ApiError;
use crate::AppState;
use api_shared::auth::bearer_token;
use api_shared::dto::{ErrorRes, LoginReq, MessageRes, TokenRes};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap},
    response::Json,
};

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Access token issued", body = TokenRes),
        (status = 400, description = "Malformed body", body = ErrorRes),
        (status = 401, description = "Incorrect username or password", body = ErrorRes)
    )
)]
/// Exchange a username and password for a bearer token
///
/// # Errors
/// Returns `401 Unauthorized` if the credentials do not match a known user.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginReq>, JsonRejection>,
) -> Result<Json<TokenRes>, ApiError> {
    let Json(req) = body?;
    let issued = state.auth.login(&req.username, &req.password).await?;
    Ok(Json(issued.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageRes)
    ),
    security(
        ("bearer" = [])
    )
)]
/// End the session of the bearer token, if any
///
/// Always answers 200, whether or not a usable token was sent.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageRes>, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);
    state.auth.logout(token).await?;
    Ok(Json(MessageRes {
        message: "Successfully logged out".into(),
    }))
}
