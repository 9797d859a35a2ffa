//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the mock dispatcher as its only handler
//! - Wire up middleware (request ID, tracing, timeout, panic recovery, access log)
//! - Bind server to listener
//! - Dispatch requests to the route table
//! - Swap in rebuilt route tables on reload
//! - Observability (metrics, correlation IDs)

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::MockConfig;
use crate::http::middleware::access_log;
use crate::http::request::{request_id_layer, X_REQUEST_ID};
use crate::http::response::{respond, MockResponse};
use crate::lifecycle::Shutdown;
use crate::observability::metrics::{self, UNMATCHED_ROUTE};
use crate::routing::{RouteMatch, RouteTable};
use crate::synth::{SynthPolicy, Synthesizer};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<ArcSwap<RouteTable>>,
    pub synth: Arc<Synthesizer>,
    pub live: bool,
}

/// HTTP server for the mock API.
pub struct MockServer {
    router: Router,
    routes: Arc<ArcSwap<RouteTable>>,
}

impl MockServer {
    /// Create a new server serving `table`.
    pub fn new(table: RouteTable, config: &MockConfig) -> Self {
        let routes = Arc::new(ArcSwap::from_pointee(table));

        let state = AppState {
            routes: routes.clone(),
            synth: Arc::new(Synthesizer::new(SynthPolicy::from(&config.mocking))),
            live: config.mocking.live,
        };

        let router = Self::build_router(config, state);
        Self { router, routes }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &MockConfig, state: AppState) -> Router {
        let router = Router::new().fallback(mock_handler).with_state(state);
        with_layers(router, config)
    }

    /// Shared handle to the served table.
    pub fn routes(&self) -> Arc<ArcSwap<RouteTable>> {
        self.routes.clone()
    }

    /// Install every table received on `updates` as the served table.
    pub fn apply_updates(&self, mut updates: mpsc::UnboundedReceiver<RouteTable>) {
        let routes = self.routes.clone();
        tokio::spawn(async move {
            while let Some(table) = updates.recv().await {
                let count = table.len();
                routes.store(Arc::new(table));
                tracing::info!(routes = count, "Route table swapped");
            }
        });
    }

    /// The router, for driving the server without a listener.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let mut stop = shutdown.subscribe();

        // Serve with graceful shutdown
        axum::serve(
            listener,
            self.router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = stop.recv().await;
        })
        .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wrap `router` in the middleware stack, innermost first: access log,
/// panic recovery, timeout, JSON timeout body, tracing, request ID.
#[allow(deprecated)]
pub(crate) fn with_layers(router: Router, config: &MockConfig) -> Router {
    let logging = Arc::new(config.logging.clone());

    router
        .layer(axum::middleware::from_fn_with_state(logging, access_log))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(axum::middleware::map_response(render_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
}

/// Single dispatcher for every method and path.
async fn mock_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let start_time = Instant::now();
    let request_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    let path = uri.path();

    let table = state.routes.load_full();
    let lookup = table.lookup(&method, path);

    let route_label = match &lookup {
        RouteMatch::Found { route, params } => {
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                route = %route.template,
                params = ?params,
                "Route matched"
            );
            route.template.as_str()
        }
        RouteMatch::NotFound => {
            tracing::debug!(request_id = %request_id, method = %method, path = %path, "No route matched");
            UNMATCHED_ROUTE
        }
    };

    let response = respond(&lookup, &method, path, &state.synth, state.live);
    metrics::record_request(method.as_str(), response.status().as_u16(), route_label, start_time);
    response.into_response()
}

/// Give the bare 408 from `TimeoutLayer` a JSON error body. Mock routes that
/// declare 408 already carry a content type and pass through.
async fn render_timeout(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT
        || response.headers().contains_key(header::CONTENT_TYPE)
    {
        return response;
    }
    tracing::warn!("Request timed out");
    MockResponse::error(
        StatusCode::REQUEST_TIMEOUT,
        "Request exceeded the configured timeout",
    )
    .into_response()
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Request handler panicked");
    MockResponse::internal_error("Unexpected error while producing the response").into_response()
}
