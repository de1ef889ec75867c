/// Read-only identifier and namespace endpoints
use crate::{
    context::AppContext,
    error::{ResolverError, ResolverResult},
    resolver::{IdentifierStatus, NamespaceMapping},
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Build identifier routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/identifiers/*doi", get(identifier_stats))
        .route("/api/namespaces", get(list_namespaces))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierStatsResponse {
    pub doi: String,
    pub status: IdentifierStatus,
    pub resolution_count: i64,
    pub last_resolved_at: Option<DateTime<Utc>>,
}

/// Usage counters for a full DOI
pub async fn identifier_stats(
    State(ctx): State<AppContext>,
    Path(doi): Path<String>,
) -> ResolverResult<Json<IdentifierStatsResponse>> {
    let doi = doi.trim_matches('/');
    if doi.is_empty() {
        return Err(ResolverError::Validation("DOI cannot be empty".to_string()));
    }

    let record = ctx
        .engine
        .stats(doi)
        .await?
        .ok_or_else(|| ResolverError::NotFound(format!("identifier {}", doi)))?;

    Ok(Json(IdentifierStatsResponse {
        doi: record.doi,
        status: record.status,
        resolution_count: record.resolution_count,
        last_resolved_at: record.last_resolved_at,
    }))
}

#[derive(Debug, Serialize)]
pub struct NamespaceListResponse {
    pub namespaces: Vec<NamespaceMapping>,
}

/// Active namespace mappings
pub async fn list_namespaces(
    State(ctx): State<AppContext>,
) -> ResolverResult<Json<NamespaceListResponse>> {
    let namespaces = ctx.engine.namespaces().await?;
    Ok(Json(NamespaceListResponse { namespaces }))
}
