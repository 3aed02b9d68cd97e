//! The five CRUD handlers, written once for every [`Record`] type.
//!
//! Each handler issues exactly one call to the resource's store and maps the
//! outcome to a status code and JSON body. The store is injected per resource
//! with an `Extension` layer when the router is built.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use shopfront_core::{DocumentId, Record};

use crate::app::dto::{ApiJson, ApiPath, DeleteResponse};
use crate::app::errors;
use crate::app::services::SharedStore;

/// Router exposing list/get/create/update/delete for one resource.
pub fn router<R: Record>(store: SharedStore<R>) -> Router {
    Router::new()
        .route("/", get(list_documents::<R>).post(create_document::<R>))
        .route(
            "/:id",
            get(get_document::<R>)
                .put(update_document::<R>)
                .delete(delete_document::<R>),
        )
        .layer(Extension(store))
}

pub async fn list_documents<R: Record>(
    Extension(store): Extension<SharedStore<R>>,
) -> axum::response::Response {
    match store.list().await {
        Ok(docs) => (StatusCode::OK, Json(docs)).into_response(),
        Err(e) => errors::store_error_to_response::<R>("list", e),
    }
}

pub async fn get_document<R: Record>(
    Extension(store): Extension<SharedStore<R>>,
    ApiPath(id): ApiPath<String>,
) -> axum::response::Response {
    let id = DocumentId::new(id);
    match store.get(&id).await {
        Ok(doc) => (StatusCode::OK, Json(doc)).into_response(),
        Err(e) => errors::store_error_to_response::<R>("get", e),
    }
}

pub async fn create_document<R: Record>(
    Extension(store): Extension<SharedStore<R>>,
    ApiJson(record): ApiJson<R>,
) -> axum::response::Response {
    if let Err(e) = record.validate() {
        return errors::domain_error_to_response(e);
    }

    match store.insert(record).await {
        Ok(doc) => {
            tracing::info!(kind = R::KIND, id = %doc.id, backend = store.backend(), "created");
            (StatusCode::CREATED, Json(doc)).into_response()
        }
        Err(e) => errors::store_error_to_response::<R>("create", e),
    }
}

pub async fn update_document<R: Record>(
    Extension(store): Extension<SharedStore<R>>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<R::Patch>,
) -> axum::response::Response {
    if let Err(e) = R::validate_patch(&patch) {
        return errors::domain_error_to_response(e);
    }

    let id = DocumentId::new(id);
    match store.update(&id, patch).await {
        Ok(doc) => (StatusCode::OK, Json(doc)).into_response(),
        Err(e) => errors::store_error_to_response::<R>("update", e),
    }
}

pub async fn delete_document<R: Record>(
    Extension(store): Extension<SharedStore<R>>,
    ApiPath(id): ApiPath<String>,
) -> axum::response::Response {
    let id = DocumentId::new(id);
    match store.delete(&id).await {
        Ok(()) => {
            tracing::info!(kind = R::KIND, id = %id, backend = store.backend(), "deleted");
            (
                StatusCode::OK,
                Json(DeleteResponse {
                    message: format!("{} deleted", errors::capitalized(R::KIND)),
                    id: id.into_inner(),
                }),
            )
                .into_response()
        }
        Err(e) => errors::store_error_to_response::<R>("delete", e),
    }
}
