use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use soclink_core::error::CoreError;
use soclink_provisioning::WorkflowError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`WorkflowError`] for the
/// provisioning workflows, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `soclink_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A workflow error from `soclink_provisioning`.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = classify(&self);

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map an error to an HTTP status, stable error code, and message.
fn classify(err: &AppError) -> (StatusCode, &'static str, String) {
    match err {
        // --- CoreError variants ---
        AppError::Core(core) => match core {
            CoreError::NotFound { entity, name } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} '{name}' not found"),
            ),
            CoreError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            CoreError::InvalidCredentialShape(msg) => (
                StatusCode::BAD_REQUEST,
                "INVALID_CREDENTIAL_SHAPE",
                msg.clone(),
            ),
            CoreError::NotConfigured(name) => (
                StatusCode::BAD_REQUEST,
                "NOT_CONFIGURED",
                format!("Connector '{name}' is not configured"),
            ),
            CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            CoreError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            CoreError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal core error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        },

        // --- Workflow errors ---
        AppError::Workflow(workflow) => match workflow {
            WorkflowError::NotConfigured(name) => (
                StatusCode::BAD_REQUEST,
                "NOT_CONFIGURED",
                format!("Connector '{name}' is not configured"),
            ),
            WorkflowError::ConcurrentProvisionInProgress(_) => (
                StatusCode::CONFLICT,
                "CONCURRENT_PROVISION_IN_PROGRESS",
                workflow.to_string(),
            ),
            WorkflowError::AlreadyProvisioned(_) => {
                (StatusCode::CONFLICT, "ALREADY_PROVISIONED", workflow.to_string())
            }
            WorkflowError::CustomerNotFound(_) => {
                (StatusCode::NOT_FOUND, "CUSTOMER_NOT_FOUND", workflow.to_string())
            }
            // A pre-persist step failed against an external system: the
            // upstream is at fault, and the message names step + system.
            WorkflowError::StepFailed { .. } | WorkflowError::StreamStartFailed { .. } => (
                StatusCode::BAD_GATEWAY,
                "ADAPTER_CALL_FAILED",
                workflow.to_string(),
            ),
            WorkflowError::Meta(_) | WorkflowError::Registry(_) => {
                tracing::error!(error = %workflow, "Workflow infrastructure error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        },

        // --- Database errors ---
        AppError::Database(err) => classify_sqlx_error(err),

        // --- HTTP-specific errors ---
        AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        AppError::InternalError(msg) => {
            tracing::error!(error = %msg, "Internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use soclink_core::step::ProvisionStep;

    use super::*;

    #[test]
    fn concurrent_provision_maps_to_conflict() {
        let err = AppError::Workflow(WorkflowError::ConcurrentProvisionInProgress(
            "acme".to_string(),
        ));
        let (status, code, _) = classify(&err);
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "CONCURRENT_PROVISION_IN_PROGRESS");
    }

    #[test]
    fn customer_not_found_maps_to_404() {
        let err = AppError::Workflow(WorkflowError::CustomerNotFound("acme".to_string()));
        let (status, code, _) = classify(&err);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "CUSTOMER_NOT_FOUND");
    }

    #[test]
    fn step_failure_maps_to_bad_gateway_with_step_and_system() {
        let err = AppError::Workflow(WorkflowError::StepFailed {
            step: ProvisionStep::CreateStream,
            system: "Graylog",
            detail: "HTTP 500".to_string(),
        });
        let (status, _, message) = classify(&err);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(message.contains("create event stream"));
        assert!(message.contains("Graylog"));
    }

    #[test]
    fn invalid_credential_shape_maps_to_bad_request() {
        let err = AppError::Core(CoreError::InvalidCredentialShape("mismatch".to_string()));
        let (status, code, _) = classify(&err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "INVALID_CREDENTIAL_SHAPE");
    }
}
