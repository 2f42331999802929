//! Resource HTTP Routes
//!
//! Every route is a catch-all; the captured path becomes the path of a
//! content URI and the method picks the router operation.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

use crate::errors::{ProviderError, ProviderResult};
use crate::router::TableRouter;
use crate::selection::Selection;
use crate::store::ContentValues;
use crate::uri::ResourceUri;

// ==================
// Shared State
// ==================

/// State shared across resource handlers
pub struct ResourceState {
    pub router: Arc<TableRouter>,
    pub authority: String,
}

impl ResourceState {
    pub fn new(router: Arc<TableRouter>, authority: impl Into<String>) -> Self {
        Self {
            router,
            authority: authority.into(),
        }
    }

    /// Content URI addressed by a request path
    fn uri_for(&self, path: &str) -> ResourceUri {
        ResourceUri::content(
            self.authority.clone(),
            path.split('/').filter(|s| !s.is_empty()),
        )
    }
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    /// Comma-separated column aliases
    #[serde(default)]
    pub projection: Option<String>,
    /// Comma-separated `<alias> [ASC|DESC]` terms
    #[serde(default)]
    pub sort: Option<String>,
}

impl QueryParams {
    fn projection_list(&self) -> Option<Vec<String>> {
        self.projection.as_ref().map(|p| {
            p.split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

// ==================
// Resource Routes
// ==================

/// Create resource routes
pub fn resource_routes(state: Arc<ResourceState>) -> Router {
    Router::new()
        .route(
            "/*path",
            get(query_handler)
                .post(insert_handler)
                .patch(update_handler)
                .delete(delete_handler),
        )
        .with_state(state)
}

// ==================
// Helper Functions
// ==================

fn error_response(e: ProviderError) -> (StatusCode, Json<ErrorResponse>) {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(event = "REQUEST_FAILED", code = e.code(), error = %e);
    }
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            code: e.code(),
        }),
    )
}

/// Run store-bound work off the async executor
async fn run_blocking<T, F>(work: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> ProviderResult<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(error_response),
        Err(e) => {
            error!(event = "REQUEST_PANICKED", error = %e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "request task failed".to_string(),
                    code: "INTERNAL",
                }),
            ))
        }
    }
}

fn content_values(body: &Value) -> ApiResult<ContentValues> {
    ContentValues::from_json(body).ok_or_else(|| {
        error_response(ProviderError::invalid_argument(
            "body must be a JSON object of column values",
        ))
    })
}

// ==================
// Handlers
// ==================

async fn query_handler(
    State(state): State<Arc<ResourceState>>,
    Path(path): Path<String>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Value>> {
    let uri = state.uri_for(&path);
    let projection = params.projection_list();
    let sort = params.sort;
    let router = state.router.clone();

    let body = run_blocking(move || {
        let content_type = router.get_type(&uri)?;
        let sort = match sort.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(sort) => {
                let handler = router.find_handler(&uri)?;
                Some(handler.projection_map().resolve_sort(sort)?)
            }
            None => None,
        };
        let rows = router.query(&uri, projection.as_deref(), &Selection::empty(), sort.as_deref())?;
        Ok(json!({
            "uri": uri.to_string(),
            "type": content_type,
            "columns": rows.columns(),
            "count": rows.len(),
            "data": rows.to_records(),
        }))
    })
    .await?;

    Ok(Json(body))
}

async fn insert_handler(
    State(state): State<Arc<ResourceState>>,
    Path(path): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let uri = state.uri_for(&path);
    let values = content_values(&body)?;
    let router = state.router.clone();

    let row_uri = run_blocking(move || router.insert(&uri, Some(values))).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "uri": row_uri.to_string() })),
    ))
}

async fn update_handler(
    State(state): State<Arc<ResourceState>>,
    Path(path): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let uri = state.uri_for(&path);
    let values = content_values(&body)?;
    let router = state.router.clone();

    let updated = run_blocking(move || router.update(&uri, &values, &Selection::empty())).await?;

    Ok(Json(json!({ "updated": updated })))
}

async fn delete_handler(
    State(state): State<Arc<ResourceState>>,
    Path(path): Path<String>,
) -> ApiResult<Json<Value>> {
    let uri = state.uri_for(&path);
    let router = state.router.clone();

    let deleted = run_blocking(move || router.delete(&uri, &Selection::empty())).await?;

    Ok(Json(json!({ "deleted": deleted })))
}
