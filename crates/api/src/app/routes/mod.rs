use axum::{routing::get, Router};

use crate::app::services::AppServices;

pub mod resource;
pub mod system;

/// Router for every resource endpoint, each bound to its own store.
pub fn router(services: &AppServices) -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/items", resource::router(services.items.clone()))
        .nest("/products", resource::router(services.products.clone()))
}
