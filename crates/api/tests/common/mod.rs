#![allow(dead_code)]

use std::marker::PhantomData;

use async_trait::async_trait;

use shopfront_api::app::{build_app, AppServices};
use shopfront_core::{Document, DocumentId, Record};
use shopfront_infra::{DocumentStore, StoreError, StoreResult};

pub struct TestServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        Self::spawn_with(AppServices::in_memory(), None).await
    }

    pub async fn spawn_with(services: AppServices, cors_origin: Option<&'static str>) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = build_app(
            services,
            cors_origin.map(axum::http::HeaderValue::from_static),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Store whose every call fails with a fixed error.
pub struct FailingStore<R> {
    error: StoreError,
    _record: PhantomData<fn() -> R>,
}

impl<R> FailingStore<R> {
    pub fn new(error: StoreError) -> Self {
        Self {
            error,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<R: Record> DocumentStore<R> for FailingStore<R> {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn list(&self) -> StoreResult<Vec<Document<R>>> {
        Err(self.error.clone())
    }

    async fn get(&self, _id: &DocumentId) -> StoreResult<Document<R>> {
        Err(self.error.clone())
    }

    async fn insert(&self, _record: R) -> StoreResult<Document<R>> {
        Err(self.error.clone())
    }

    async fn update(&self, _id: &DocumentId, _patch: R::Patch) -> StoreResult<Document<R>> {
        Err(self.error.clone())
    }

    async fn delete(&self, _id: &DocumentId) -> StoreResult<()> {
        Err(self.error.clone())
    }
}
