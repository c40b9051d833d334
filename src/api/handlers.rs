use axum::{
    extract::{Extension, Path, State},
    http::{header, HeaderName, StatusCode},
    response::Json,
    Json as RequestJson,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::model::{
    Collection, CollectionKind, Document, EntitySchema, ShapeError, FROM_FIELD, TO_FIELD,
};
use crate::store::{Store, StoreError};

pub type AppState<S> = Arc<S>;

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// The single place store failures become transport status codes.
fn store_error_response(error: StoreError) -> ApiError {
    let status = match &error {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Conflict(_) | StoreError::VersionConflict(_) => StatusCode::CONFLICT,
        StoreError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = match &error {
        StoreError::Other(e) => format!("{:#}", e),
        _ => error.to_string(),
    };
    (status, Json(ErrorResponse::new(&message)))
}

fn shape_error_response(error: ShapeError) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(&error.to_string())),
    )
}

pub async fn list_documents<S: Store>(
    State(store): State<AppState<S>>,
    Extension(collection): Extension<Collection>,
) -> Result<Json<Vec<Document>>, ApiError> {
    store
        .list(collection)
        .await
        .map(Json)
        .map_err(store_error_response)
}

pub async fn create_document<S: Store>(
    State(store): State<AppState<S>>,
    Extension(collection): Extension<Collection>,
    RequestJson(body): RequestJson<Value>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<Document>), ApiError> {
    let attrs = EntitySchema::of(collection)
        .validate(&body)
        .map_err(shape_error_response)?;

    let meta = match collection.kind() {
        CollectionKind::Document => store.save(collection, attrs.clone()).await,
        CollectionKind::Relation => {
            let from = attrs.get(FROM_FIELD).and_then(Value::as_str);
            let to = attrs.get(TO_FIELD).and_then(Value::as_str);
            store
                .save_relation(collection, from, to, attrs.clone())
                .await
        }
    }
    .map_err(store_error_response)?;

    let location = format!("/{}/{}", collection.name(), meta.key);
    let mut doc = attrs;
    meta.apply(&mut doc);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(doc),
    ))
}

pub async fn get_document<S: Store>(
    State(store): State<AppState<S>>,
    Extension(collection): Extension<Collection>,
    Path(key): Path<String>,
) -> Result<Json<Document>, ApiError> {
    store
        .fetch(collection, &key)
        .await
        .map(Json)
        .map_err(store_error_response)
}

pub async fn replace_document<S: Store>(
    State(store): State<AppState<S>>,
    Extension(collection): Extension<Collection>,
    Path(key): Path<String>,
    RequestJson(body): RequestJson<Value>,
) -> Result<Json<Document>, ApiError> {
    let attrs = EntitySchema::of(collection)
        .validate(&body)
        .map_err(shape_error_response)?;

    let meta = store
        .replace(collection, &key, attrs.clone())
        .await
        .map_err(store_error_response)?;

    let mut doc = attrs;
    meta.apply(&mut doc);
    Ok(Json(doc))
}

pub async fn update_document<S: Store>(
    State(store): State<AppState<S>>,
    Extension(collection): Extension<Collection>,
    Path(key): Path<String>,
    RequestJson(body): RequestJson<Value>,
) -> Result<Json<Document>, ApiError> {
    let partial = EntitySchema::of(collection)
        .validate(&body)
        .map_err(shape_error_response)?;

    store
        .patch(collection, &key, partial)
        .await
        .map_err(store_error_response)?;

    // Patch acknowledges with no payload; re-read for the response body.
    store
        .fetch(collection, &key)
        .await
        .map(Json)
        .map_err(store_error_response)
}

pub async fn delete_document<S: Store>(
    State(store): State<AppState<S>>,
    Extension(collection): Extension<Collection>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    store
        .remove(collection, &key)
        .await
        .map_err(store_error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
