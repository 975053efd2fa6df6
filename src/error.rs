use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Handlers return `Result<T, AppError>` and Axum renders it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{}", .0.join("; "))]
    BadRequest(Vec<String>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(vec![message.into()])
    }

    pub fn unauthorized() -> Self {
        AppError::Unauthorized("Unauthorized".into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::BadRequest(errors) => json!({
                "error": {
                    "message": self.to_string(),
                    "errors": errors,
                    "status": status.as_u16(),
                }
            }),
            AppError::Unauthorized(msg) | AppError::NotFound(msg) => json!({
                "error": { "message": msg, "status": status.as_u16() }
            }),
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                json!({
                    "error": { "message": "A database error occurred", "status": status.as_u16() }
                })
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                json!({
                    "error": { "message": "Internal server error", "status": status.as_u16() }
                })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AppError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::unauthorized().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn bad_request_message_joins_every_error() {
        let err = AppError::BadRequest(vec!["a is required".into(), "b too long".into()]);
        assert_eq!(err.to_string(), "a is required; b too long");
    }
}
