//! Access log middleware.
//!
//! # Responsibilities
//! - Log each request on arrival and each response with status and latency
//! - Skip the liveness route and configured path prefixes
//! - Redact credentials from header dumps
//! - Log query parameters, client address and JSON request bodies
//!
//! # Design Decisions
//! - Off unless `logging.access_log` is set; `TraceLayer` still emits spans
//! - Header, query and body dumps only at debug level
//! - Bodies are buffered only when declared JSON with a known, bounded length
//! - Values under `logging.sensitive_fields` keys are masked at any depth

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, Query, State},
    http::{header, HeaderMap, Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::config::LoggingConfig;
use crate::http::request::X_REQUEST_ID;
use crate::http::response::MockResponse;
use crate::routing::table::HEALTH_PATH;
use crate::spec::model::is_json_media_type;

/// Headers whose values never reach the log.
const REDACTED_HEADERS: [&str; 3] = ["authorization", "cookie", "x-api-key"];

const REDACTED: &str = "[REDACTED]";

/// Replacement for sensitive body values.
pub const MASKED: &str = "******";

/// Largest request body buffered for logging.
const MAX_LOGGED_BODY: usize = 64 * 1024;

/// Whether requests to `path` should be logged.
pub fn should_log(config: &LoggingConfig, path: &str) -> bool {
    if !config.access_log || path == HEALTH_PATH {
        return false;
    }
    !config
        .exclude_paths
        .iter()
        .any(|prefix| !prefix.is_empty() && path.starts_with(prefix.as_str()))
}

/// Header name/value pairs with credentials masked.
pub fn redacted_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name = name.as_str().to_string();
            let value = if REDACTED_HEADERS.contains(&name.as_str()) {
                REDACTED.to_string()
            } else {
                value.to_str().unwrap_or("<binary>").to_string()
            };
            (name, value)
        })
        .collect()
}

/// Replace the value of every key listed in `fields` (case-insensitive),
/// walking nested objects and arrays.
pub fn mask_sensitive(value: &mut Value, fields: &[String]) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if fields.iter().any(|field| field.eq_ignore_ascii_case(key)) {
                    *child = Value::String(MASKED.to_string());
                } else {
                    mask_sensitive(child, fields);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                mask_sensitive(item, fields);
            }
        }
        _ => {}
    }
}

/// The body as masked JSON, or `None` when it is empty or not JSON.
pub fn loggable_body(bytes: &[u8], fields: &[String]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    let mut value: Value = serde_json::from_slice(bytes).ok()?;
    mask_sensitive(&mut value, fields);
    Some(value)
}

/// Query parameters in key order; malformed query strings log as empty.
pub fn query_params(uri: &Uri) -> BTreeMap<String, String> {
    Query::<BTreeMap<String, String>>::try_from_uri(uri)
        .map(|Query(params)| params)
        .unwrap_or_default()
}

/// Whether the body is JSON with a declared length small enough to buffer.
fn buffers_body(headers: &HeaderMap) -> bool {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(is_json_media_type);
    let length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    is_json && matches!(length, Some(len) if len > 0 && len <= MAX_LOGGED_BODY)
}

fn client_ip<B>(req: &Request<B>) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn access_log(
    State(config): State<Arc<LoggingConfig>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !should_log(&config, req.uri().path()) {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let client_ip = client_ip(&req);

    tracing::info!(request_id = %request_id, client_ip = %client_ip, "→ {} {}", method, uri);
    tracing::debug!(
        request_id = %request_id,
        headers = ?redacted_headers(req.headers()),
        query = ?query_params(&uri),
        "Request headers"
    );

    let req = if config.log_body && buffers_body(req.headers()) {
        let (parts, body) = req.into_parts();
        let bytes = match to_bytes(body, MAX_LOGGED_BODY).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
                return MockResponse::error(StatusCode::BAD_REQUEST, "Failed to read request body")
                    .into_response();
            }
        };
        if let Some(body) = loggable_body(&bytes, &config.sensitive_fields) {
            tracing::debug!(request_id = %request_id, body = %body, "Request body");
        }
        Request::from_parts(parts, Body::from(bytes))
    } else {
        req
    };

    let response = next.run(req).await;

    tracing::info!(
        request_id = %request_id,
        "← {} {} - {} ({}ms)",
        method,
        uri,
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    response
}
