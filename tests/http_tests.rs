//! Router-level tests driving the full middleware stack with `oneshot`

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use common::*;
use edtechid_resolver::server::build_router;
use serde_json::Value;
use tower::ServiceExt;

async fn get(app: &Router, uri: &str, accept: Option<&str>) -> axum::response::Response {
    let mut request = Request::builder().uri(uri).header(header::USER_AGENT, "http-tests/1.0");
    if let Some(accept) = accept {
        request = request.header(header::ACCEPT, accept);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_browser_route_redirects() {
    let env = setup().await;
    let app = build_router(env.ctx.clone());

    let response = get(&app, "/resolve/ej/2025.0001", Some("text/html")).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    let headers = response.headers();
    assert_eq!(headers[header::LOCATION], PAPER_URL);
    assert_eq!(headers[header::CACHE_CONTROL], "max-age=3600");
    assert_eq!(headers["x-doi"], PAPER_DOI);
    assert_eq!(headers["x-resolution-count"], "1");
}

#[tokio::test]
async fn test_api_route_defaults_to_json() {
    let env = setup().await;
    let app = build_router(env.ctx.clone());

    for accept in [None, Some("*/*")] {
        let response = get(&app, "/api/resolve/edtechid.journal/2025.0001", accept).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/vnd.edtechid.compact+json"
        );

        let body = json_body(response).await;
        assert_eq!(body["doi"], PAPER_DOI);
        assert_eq!(body["targetUrl"], PAPER_URL);
        assert_eq!(body["shortDoi"], "ej/2025.0001");
        assert_eq!(body["namespace"], "edtechid.journal");
    }
}

#[tokio::test]
async fn test_metadata_media_type() {
    let env = setup().await;
    let app = build_router(env.ctx.clone());

    let response = get(
        &app,
        "/resolve/ej/2025.0001",
        Some("application/vnd.edtechid+json"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.edtechid+json"
    );
    let body = json_body(response).await;
    assert_eq!(body["license"], "CC-BY-4.0");
    assert_eq!(body["alternativeUrls"][0]["mimeType"], "application/pdf");
    assert_eq!(body["resolutionCount"], 1);
}

#[tokio::test]
async fn test_error_statuses() {
    let env = setup().await;
    let app = build_router(env.ctx.clone());

    let response = get(&app, "/resolve/ej/2024.0099", None).await;
    assert_eq!(response.status(), StatusCode::GONE);
    assert_eq!(json_body(response).await["error"], "Gone");

    let response = get(&app, "/resolve/ej/0000.0000", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["message"], "Identifier not found");

    let response = get(&app, "/resolve/no-slash", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "InvalidIdentifier");

    let response = get(&app, "/resolve/ej/2023.0001", None).await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://id.example.org/resolve/edtechid.journal/2025.0001"
    );
    assert_eq!(json_body(response).await["supersededBy"], PAPER_DOI);
}

#[tokio::test]
async fn test_identifier_stats_endpoint() {
    let env = setup().await;
    let app = build_router(env.ctx.clone());

    get(&app, "/resolve/ej/2025.0001", None).await;
    get(&app, "/resolve/ej/2025.0001", None).await;

    let response = get(&app, "/api/identifiers/edtechid.journal/2025.0001", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["doi"], PAPER_DOI);
    assert_eq!(body["status"], "active");
    assert_eq!(body["resolutionCount"], 2);
    assert!(body["lastResolvedAt"].is_string());

    let response = get(&app, "/api/identifiers/edtechid.journal/nope", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_namespace_listing_excludes_inactive() {
    let env = setup().await;
    let app = build_router(env.ctx.clone());

    let response = get(&app, "/api/namespaces", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let namespaces = body["namespaces"].as_array().unwrap();
    assert_eq!(namespaces.len(), 2);
    assert!(namespaces.iter().all(|ns| ns["shortForm"] != "er"));
}

#[tokio::test]
async fn test_health_and_metrics() {
    let env = setup().await;
    let app = build_router(env.ctx.clone());

    let response = get(&app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/health/ready", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/health/detailed", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");

    get(&app, "/resolve/ej/2025.0001", None).await;
    let response = get(&app, "/metrics", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("resolutions_total"));
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let env = setup().await;
    let app = build_router(env.ctx.clone());

    let response = get(&app, "/nowhere", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "NotFound");
}
