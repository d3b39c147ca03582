//! Request-path error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// ---

#[derive(Debug, Error)]
pub enum ApiError {
    // ---
    /// Input outside its accepted range.
    #[error("{0}")]
    Validation(String),

    /// Empty result where a record or a non-empty list was expected.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate account or bad credentials.
    #[error("{0}")]
    Auth(String),

    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    // ---
    /// Wrap a store failure with the operation that triggered it.
    pub fn store(context: &'static str) -> impl FnOnce(sqlx::Error) -> ApiError {
        move |source| ApiError::Store { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Auth(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store { .. } | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        let status = self.status();
        let message = match &self {
            ApiError::Store { context, source } => {
                tracing::error!(error = %source, "Store failure while trying to {}", context);
                format!("Failed to {context}")
            }
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
            other => {
                tracing::debug!(status = %status, "Rejecting request: {}", other);
                other.to_string()
            }
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_status_mapping() {
        // ---
        assert_eq!(ApiError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Auth("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::store("read costs")(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_error_keeps_context() {
        // ---
        let err = ApiError::store("read lamps-on")(sqlx::Error::RowNotFound);
        assert!(err.to_string().starts_with("read lamps-on: "));
    }
}
