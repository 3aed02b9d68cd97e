//! HTTP API application wiring (Axum router + store wiring).
//!
//! - `services.rs`: which store serves which resource
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request extraction and response bodies
//! - `errors.rs`: consistent error responses

use axum::http::HeaderValue;
use axum::Router;
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: AppServices, cors_allowed_origin: Option<HeaderValue>) -> Router {
    routes::router(&services).layer(
        ServiceBuilder::new()
            .layer(middleware::trace_layer())
            .layer(middleware::cors_layer(cors_allowed_origin)),
    )
}
