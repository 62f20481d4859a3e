use axum::{
    Json,
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;

use crate::AppState;

/// Query parameters for namespace-based quota lookup.
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub namespace: Option<String>,
}

/// GET /apis/v1/quotas/{name} — resolve a quota node by name.
pub async fn get_quota(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
) -> impl IntoResponse {
    match state.topology.get_node(&name, "").await {
        Some(node) => (StatusCode::OK, Json(node)).into_response(),
        None => (StatusCode::NOT_FOUND, format!("quota {} not found", name)).into_response(),
    }
}

/// GET /apis/v1/quotas?namespace=ns — resolve the quota bound to a namespace.
pub async fn lookup_quota(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> impl IntoResponse {
    let Some(namespace) = query.namespace else {
        return (
            StatusCode::BAD_REQUEST,
            "namespace query parameter is required",
        )
            .into_response();
    };
    match state.topology.get_node("", &namespace).await {
        Some(node) => (StatusCode::OK, Json(node)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            format!("no quota bound to namespace {}", namespace),
        )
            .into_response(),
    }
}

/// GET /apis/v1/topology — full deep-copied topology summary.
pub async fn get_topology(State(state): State<AppState>) -> impl IntoResponse {
    info!("Serving topology summary request");
    Json(state.topology.summarize().await)
}
