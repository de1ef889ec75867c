/// HTTP server setup and routing
use crate::{
    context::AppContext,
    error::{ResolverError, ResolverResult},
};
use axum::{
    http::{header, Method, StatusCode},
    response::Json,
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Build the main application router
/// Returns Router<()> because state is already provided
pub fn build_router(ctx: AppContext) -> Router {
    // Resolution is read-only and embeddable from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
        .expose_headers([
            header::LOCATION,
            header::CACHE_CONTROL,
            header::HeaderName::from_static("x-doi"),
            header::HeaderName::from_static("x-resolution-count"),
        ]);

    Router::new()
        .merge(crate::api::routes())
        // Converts Router<AppContext> to Router<()>
        .with_state(ctx)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .fallback(not_found)
}

/// 404 handler
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "NotFound",
            "message": "Endpoint not found"
        })),
    )
}

/// Start the HTTP server
pub async fn serve(ctx: AppContext) -> ResolverResult<()> {
    let addr = ctx.bind_address();

    info!("Identifier resolver listening on {}", addr);
    info!("   Public URL: {}", ctx.public_url());
    info!("   Canonical prefix: {}", ctx.config.resolver.canonical_prefix);

    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ResolverError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    // Peer address feeds the audit log when no proxy header is present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| ResolverError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
