//! Consistent JSON error responses.
//!
//! Every failure leaves the gateway as one of three statuses: 400 (client
//! error), 404 (not found) or 500 (server error).

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use shopfront_core::{DomainError, Record};
use shopfront_infra::StoreError;

pub fn store_error_to_response<R: Record>(operation: &'static str, err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{} not found", capitalized(R::KIND)),
        ),
        StoreError::MalformedId(msg) => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            format!("invalid {} id: {msg}", R::KIND),
        ),
        StoreError::Unavailable(msg) => {
            tracing::error!(kind = R::KIND, operation, error = %msg, "store unavailable");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_unavailable", msg)
        }
        err @ (StoreError::Rejected(_) | StoreError::Corrupt(_)) => {
            tracing::error!(kind = R::KIND, operation, error = %err, "store error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
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

/// "item" -> "Item"
pub(crate) fn capitalized(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
