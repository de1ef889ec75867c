/// Resolution endpoints
///
/// `/resolve/*identifier` serves browsers and passes `Accept` through as sent.
/// `/api/resolve/*identifier` serves machines and fills in
/// `application/json` when the caller expressed no preference. The engine
/// logic behind both is the same.
use crate::{
    context::AppContext,
    error::{ErrorResponse, ResolverResult},
    metrics,
    resolver::{Representation, RequestContext, ResolveOutcome},
};
use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_extra::{headers::UserAgent, TypedHeader};
use serde_json::json;
use std::net::SocketAddr;

/// `Accept` assumed by the machine-facing route when the caller sends none
const DEFAULT_API_ACCEPT: &str = "application/json";

/// Build resolution routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/resolve/*identifier", get(resolve_browser))
        .route("/api/resolve/*identifier", get(resolve_api))
}

/// Browser-facing resolution
pub async fn resolve_browser(
    State(ctx): State<AppContext>,
    Path(identifier): Path<String>,
    headers: HeaderMap,
    user_agent: Option<TypedHeader<UserAgent>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> ResolverResult<Response> {
    let accept = accept_header(&headers);
    let context = request_context(&headers, user_agent, connect_info);

    let outcome = ctx
        .engine
        .resolve(&identifier, accept.as_deref(), &context)
        .await?;

    metrics::record_http_request("/resolve", outcome.status_code().as_u16());
    Ok(outcome.into_response())
}

/// Machine-facing resolution
pub async fn resolve_api(
    State(ctx): State<AppContext>,
    Path(identifier): Path<String>,
    headers: HeaderMap,
    user_agent: Option<TypedHeader<UserAgent>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> ResolverResult<Response> {
    let accept = match accept_header(&headers) {
        Some(value) if value.trim() != "*/*" => value,
        _ => DEFAULT_API_ACCEPT.to_string(),
    };
    let context = request_context(&headers, user_agent, connect_info);

    let outcome = ctx
        .engine
        .resolve(&identifier, Some(&accept), &context)
        .await?;

    metrics::record_http_request("/api/resolve", outcome.status_code().as_u16());
    Ok(outcome.into_response())
}

fn accept_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::ACCEPT)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Collect audit details; a proxy's forwarded address wins over the socket peer
fn request_context(
    headers: &HeaderMap,
    user_agent: Option<TypedHeader<UserAgent>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> RequestContext {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
        });

    RequestContext {
        user_agent: user_agent.map(|TypedHeader(ua)| ua.as_str().to_string()),
        ip_address: forwarded
            .or_else(|| connect_info.map(|ConnectInfo(addr)| addr.ip().to_string())),
        referrer: headers
            .get(header::REFERER)
            .and_then(|h| h.to_str().ok())
            .map(String::from),
    }
}

impl IntoResponse for ResolveOutcome {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            ResolveOutcome::Resolved(Representation::Redirect(redirect)) => {
                let mut response = status.into_response();
                if !set_header(&mut response, header::LOCATION, &redirect.url) {
                    return invalid_target(&redirect.doi);
                }
                for (name, value) in redirect.headers() {
                    set_header(&mut response, HeaderName::from_static(name), &value);
                }
                response
            }
            ResolveOutcome::Resolved(Representation::Json {
                content_type,
                payload,
            }) => (status, [(header::CONTENT_TYPE, content_type)], Json(payload)).into_response(),
            ResolveOutcome::Resolved(Representation::Metadata {
                content_type,
                document,
            }) => (status, [(header::CONTENT_TYPE, content_type)], Json(*document)).into_response(),
            ResolveOutcome::Superseded(ref redirect) => {
                let body = json!({
                    "error": "Superseded",
                    "message": self.message(),
                    "doi": redirect.doi,
                    "supersededBy": redirect.superseded_by,
                    "location": redirect.location,
                });
                let mut response = (status, Json(body)).into_response();
                if !set_header(&mut response, header::LOCATION, &redirect.location) {
                    return invalid_target(&redirect.doi);
                }
                response
            }
            ResolveOutcome::InvalidFormat(_) => {
                error_body(status, "InvalidIdentifier", self.message())
            }
            ResolveOutcome::NotFound { .. } => error_body(status, "NotFound", self.message()),
            ResolveOutcome::Unavailable(ref u) => {
                let code = if u.is_gone() { "Gone" } else { "NotAvailable" };
                error_body(status, code, self.message())
            }
        }
    }
}

fn set_header(response: &mut Response, name: HeaderName, value: &str) -> bool {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            response.headers_mut().insert(name, value);
            true
        }
        Err(e) => {
            tracing::warn!(header = %name, error = %e, "dropping unrepresentable header value");
            false
        }
    }
}

fn invalid_target(doi: &str) -> Response {
    tracing::error!(doi, "redirect target is not a valid header value");
    error_body(
        StatusCode::INTERNAL_SERVER_ERROR,
        "InternalServerError",
        "Internal server error".to_string(),
    )
}

fn error_body(status: StatusCode, code: &str, message: String) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message,
        }),
    )
        .into_response()
}
