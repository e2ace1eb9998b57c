use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Domain failures crossing the API boundary. Expected rule violations
/// are returned as `{"success": false, "error": "..."}` with a matching
/// status code instead of propagating as a raw error.
#[derive(Debug)]
pub enum ApiError {
    Unauthenticated,
    Unauthorized(String),
    NotFound(String),
    PreconditionFailed(String),
    Conflict(String),
    BadRequest(String),
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            Self::Unauthorized(msg) => (StatusCode::FORBIDDEN, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::PreconditionFailed(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (
            status,
            Json(serde_json::json!({"success": false, "error": message})),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_domain_failures_to_expected_status_codes() {
        let cases = [
            (ApiError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (
                ApiError::Unauthorized("Requires ADMIN role".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::NotFound("Invitation not found".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::PreconditionFailed("Invitation has expired".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::Conflict("Invitation already sent".to_string()),
                StatusCode::CONFLICT,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
