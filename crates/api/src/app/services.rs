//! Store wiring: which backing store serves which resource.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use shopfront_infra::{
    DocumentStore, InMemoryDocumentStore, PostgresDocumentStore, RedisDocumentStore, StoreError,
};
use shopfront_inventory::Item;
use shopfront_products::Product;

use crate::config::AppConfig;

/// Shared handle to the store serving records of type `R`.
pub type SharedStore<R> = Arc<dyn DocumentStore<R>>;

/// The store handles the router is built from.
///
/// Built once at startup and handed to [`crate::app::build_app`]; tests pass
/// substitute stores the same way.
#[derive(Clone)]
pub struct AppServices {
    pub items: SharedStore<Item>,
    pub products: SharedStore<Product>,
}

impl AppServices {
    pub fn new(items: SharedStore<Item>, products: SharedStore<Product>) -> Self {
        Self { items, products }
    }

    /// In-memory stores for both resources (dev/test).
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryDocumentStore::<Item>::new()),
            Arc::new(InMemoryDocumentStore::<Product>::new()),
        )
    }
}

/// Build the stores selected by `config`.
///
/// Persistent stores connect lazily. An unreachable store at startup is
/// logged and the process keeps serving; requests against it fail with a
/// server error until it comes back.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    if !config.use_persistent_stores {
        tracing::info!("using in-memory stores");
        return Ok(AppServices::in_memory());
    }

    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy(&config.database_url)
        .map_err(|e| StoreError::Unavailable(format!("invalid database url: {e}")))?;
    let items = PostgresDocumentStore::<Item>::new(pool, config.items_table.clone())?;
    match items.ensure_schema().await {
        Ok(()) => tracing::info!(table = items.table(), "connected to Postgres"),
        Err(e) => tracing::error!(error = %e, "failed to connect to Postgres"),
    }

    let products = RedisDocumentStore::<Product>::new(&config.redis_url, config.products_key_prefix.clone())?;
    match products.ping().await {
        Ok(()) => tracing::info!(key_prefix = products.key_prefix(), "connected to Redis"),
        Err(e) => tracing::error!(error = %e, "failed to connect to Redis"),
    }

    Ok(AppServices::new(Arc::new(items), Arc::new(products)))
}
