// HTTP API error types and the operation wrapper shared by every handler
use std::future::Future;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::StoreError;

/// Client-facing failure. Every variant renders as `{"error": message}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // 400 Bad Request
    Validation(String),

    // 401 Unauthorized
    Unauthorized,

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    ServerError(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    /// `404 {"error": "<label> not found"}`
    pub fn not_found(label: impl AsRef<str>) -> Self {
        ApiError::NotFound(format!("{} not found", label.as_ref()))
    }

    /// `500 {"error": "<label> failed"}`. The cause is logged and dropped.
    pub fn server_error(label: impl AsRef<str>, cause: impl std::fmt::Display) -> Self {
        let label = label.as_ref();
        tracing::error!(operation = label, "{} failed: {}", label, cause);
        ApiError::ServerError(format!("{} failed", label))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg) => msg,
            ApiError::Unauthorized => "Unauthorized",
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::ServerError(msg) => msg,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({ "error": self.message() })
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

/// Failure raised inside a handler body: either an explicit client-facing
/// error or an unexpected cause that collapses into a 500.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Run a handler body, converting any unexpected failure into
/// `500 {"error": "<label> failed"}` while logging the cause.
pub async fn run_operation<T, F>(label: &str, body: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, OperationError>>,
{
    match body.await {
        Ok(value) => Ok(value),
        Err(OperationError::Api(err)) => Err(err),
        Err(OperationError::Store(cause)) => Err(ApiError::server_error(label, cause)),
        Err(OperationError::Internal(cause)) => Err(ApiError::server_error(label, format!("{:#}", cause))),
    }
}

/// Body for panics caught by `tower_http::catch_panic`.
pub fn panic_response(_panic: Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response {
    tracing::error!("Handler panicked");
    ApiError::ServerError("Internal server error".to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn api_errors_pass_through_unchanged() {
        let result: Result<(), ApiError> =
            run_operation("Update customer", async {
                Err::<(), OperationError>(ApiError::validation("name is required").into())
            })
            .await;
        assert_eq!(result, Err(ApiError::Validation("name is required".into())));
    }

    #[tokio::test]
    async fn store_errors_collapse_to_labelled_500() {
        let result: Result<(), ApiError> = run_operation("Fetch settings", async {
            Err::<(), OperationError>(StoreError::Unavailable("connection reset by peer".into()).into())
        })
        .await;
        let err = result.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_json(), json!({ "error": "Fetch settings failed" }));
        assert!(!err.message().contains("connection reset"));
    }

    #[test]
    fn not_found_appends_suffix() {
        let err = ApiError::not_found("Customer");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Customer not found");
    }
}
