//! API Middleware
//!
//! Request context and request logging.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::OperationContext;

use super::routes::USER_ID_HEADER;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

// =========================================================================
// Request Context Middleware
// =========================================================================

/// Attach an `OperationContext` to the request and echo its correlation id.
pub async fn context_middleware(mut request: Request<Body>, next: Next) -> Response {
    let mut context = request_context(&request);
    let correlation_id = context.ensure_correlation_id();

    let span = tracing::info_span!(
        "request",
        correlation_id = %correlation_id,
        client_ip = ?context.client_ip,
    );
    request.extensions_mut().insert(context);

    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }

    response
}

/// Build the context for `request`.
///
/// The correlation id comes from `X-Correlation-Id` when it is a valid
/// UUID. The client ip is only known when the server was started with
/// `into_make_service_with_connect_info`.
pub fn request_context(request: &Request<Body>) -> OperationContext {
    let headers = request.headers();

    let mut context = OperationContext::new();
    if let Some(id) = headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
    {
        context = context.with_correlation_id(id);
    }
    if let Some(user_id) = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.trim().is_empty())
    {
        context = context.with_request_user(user_id.trim());
    }
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        context = context.with_client_ip(addr.ip());
    }

    context
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let headers = mask_headers_for_logging(request.headers());

    let (user_id, client_ip) = request
        .extensions()
        .get::<OperationContext>()
        .map(|ctx| (ctx.request_user_id.clone(), ctx.client_ip))
        .unwrap_or_default();

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        user_id = ?user_id,
        client_ip = ?client_ip,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = %start.elapsed().as_millis(),
        "Request completed"
    );

    response
}
