use axum::http::StatusCode;

/// Liveness probe; touches no store.
pub async fn health() -> StatusCode {
    StatusCode::OK
}
