//! Translation of domain errors into HTTP responses.

use api_shared::dto::ErrorRes;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use clinic_core::ClinicError;

/// The only place a [`ClinicError`] becomes a status code.
///
/// Every error body has the shape `{"detail": "..."}`. Internal failures are logged
/// here and reach the client only as `"Internal error"`.
#[derive(Debug)]
pub struct ApiError(pub ClinicError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ClinicError::NotFound { .. } => StatusCode::NOT_FOUND,
            ClinicError::Validation(_) => StatusCode::BAD_REQUEST,
            ClinicError::ConstraintViolation(_) => StatusCode::CONFLICT,
            ClinicError::Unauthorized => StatusCode::UNAUTHORIZED,
            ClinicError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ClinicError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match &self.0 {
            ClinicError::Unauthorized => "Incorrect username or password".into(),
            ClinicError::Timeout => "Request timed out".into(),
            ClinicError::Internal(_) => "Internal error".into(),
            other => other.to_string(),
        }
    }
}

impl From<ClinicError> for ApiError {
    fn from(err: ClinicError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ClinicError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(ClinicError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(ClinicError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ClinicError::Internal(cause) = &self.0 {
            tracing::error!("request failed: {}", cause);
        }

        let mut response = (status, Json(ErrorRes { detail: self.detail() })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (ClinicError::not_found("Patient"), StatusCode::NOT_FOUND),
            (ClinicError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ClinicError::ConstraintViolation("x".into()), StatusCode::CONFLICT),
            (ClinicError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ClinicError::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (ClinicError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let err = ApiError(ClinicError::internal("disk on fire at /var/db"));
        assert_eq!(err.detail(), "Internal error");
    }

    #[test]
    fn unauthorized_carries_bearer_challenge() {
        let response = ApiError(ClinicError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
