use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use jobsheet_core::DomainError;
use jobsheet_infra::{IntakeError, StoreError};

use crate::context::RequestContext;

const INTERNAL_MESSAGE: &str = "something went wrong while handling the jobsheet";

pub fn intake_error_to_response(ctx: &RequestContext, err: IntakeError) -> axum::response::Response {
    match err {
        IntakeError::Domain(DomainError::Validation(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        IntakeError::Domain(DomainError::InvalidCode(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_code", msg)
        }
        IntakeError::Domain(DomainError::NotFound) => {
            json_error(StatusCode::NOT_FOUND, "not_found", "jobsheet not found")
        }
        IntakeError::Domain(DomainError::Conflict(msg)) | IntakeError::Store(StoreError::Conflict(msg)) => {
            tracing::warn!(request_id = %ctx.request_id(), error = %msg, "jobsheet conflict");
            json_error(StatusCode::CONFLICT, "conflict", "jobsheet code already taken; try again")
        }
        IntakeError::Store(StoreError::Unavailable(msg)) => {
            tracing::error!(request_id = %ctx.request_id(), error = %msg, "jobsheet store unavailable");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                "the jobsheet store is busy or unavailable; try again shortly",
            )
        }
        other => {
            tracing::error!(request_id = %ctx.request_id(), error = %other, "jobsheet request failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", INTERNAL_MESSAGE)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
