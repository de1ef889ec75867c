/// API routes and handlers
pub mod health;
pub mod identifiers;
pub mod resolve;

use crate::{context::AppContext, metrics};
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(resolve::routes())
        .merge(identifiers::routes())
        .merge(health::routes())
        .route("/metrics", get(metrics_handler))
}

/// Prometheus scrape endpoint
async fn metrics_handler(State(ctx): State<AppContext>) -> impl IntoResponse {
    metrics::UPTIME_SECONDS.set(ctx.started_at.elapsed().as_secs_f64());

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render_metrics(),
    )
}
