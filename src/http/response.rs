//! Response construction.
//!
//! # Responsibilities
//! - Turn a route lookup into status, headers and body
//! - Render 404 and 500 as structured JSON
//! - Serve the static liveness payload for `/health`
//!
//! # Design Decisions
//! - Pure: no I/O, so every outcome is unit-testable without a listener
//! - Every response carries `Content-Type: application/json`, even when empty
//! - Live mode resynthesizes from the stored schema with a per-thread generator

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

use crate::routing::table::health_payload;
use crate::routing::{RouteEntry, RouteMatch};
use crate::synth::Synthesizer;

pub const APPLICATION_JSON: &str = "application/json";

/// A fully materialized mock response.
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    status: StatusCode,
    body: Bytes,
}

impl MockResponse {
    /// Serialize `value` as the body. Serialization failures become a 500.
    pub fn json(status: StatusCode, value: &Value) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => Self {
                status,
                body: Bytes::from(bytes),
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response body");
                Self::internal_error("Failed to serialize response body")
            }
        }
    }

    /// A response with no body.
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            body: Bytes::new(),
        }
    }

    pub fn not_found(method: &Method, path: &str) -> Self {
        Self::json(
            StatusCode::NOT_FOUND,
            &json!({
                "error": "Not Found",
                "message": "Endpoint not found",
                "method": method.as_str(),
                "path": path,
            }),
        )
    }

    /// `{"error": <reason phrase>, "message": ...}` with the given status.
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::json(
            status,
            &json!({
                "error": status.canonical_reason().unwrap_or("Error"),
                "message": message,
            }),
        )
    }

    pub fn internal_error(message: &str) -> Self {
        let body = json!({
            "error": "Internal Server Error",
            "message": message,
        });
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: Bytes::from(body.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

impl IntoResponse for MockResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        response
    }
}

/// Build the response for one lookup result.
pub fn respond(
    lookup: &RouteMatch<'_>,
    method: &Method,
    path: &str,
    synth: &Synthesizer,
    live: bool,
) -> MockResponse {
    match lookup {
        RouteMatch::Found { route, .. } => respond_route(route, synth, live),
        RouteMatch::NotFound => MockResponse::not_found(method, path),
    }
}

fn respond_route(route: &RouteEntry, synth: &Synthesizer, live: bool) -> MockResponse {
    if route.is_health() {
        return MockResponse::json(StatusCode::OK, &health_payload());
    }

    let (code, body) = route.response();
    let Ok(status) = StatusCode::from_u16(code) else {
        return MockResponse::internal_error("Route has an invalid status code");
    };

    match body {
        Some(mock) if live => {
            let value = synth.synthesize(&mock.schema, &mut rand::thread_rng());
            MockResponse::json(status, &value)
        }
        Some(mock) => MockResponse::json(status, &mock.body),
        None => MockResponse::empty(status),
    }
}
