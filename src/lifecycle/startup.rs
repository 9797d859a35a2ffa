//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the spec and compile the route table
//! - Print the endpoint listing
//! - Start background tasks (metrics exporter, spec watcher)
//! - Hand the listener to the HTTP server
//!
//! # Design Decisions
//! - Fail fast: any spec or build error is fatal and happens before binding
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{MockConfig, SpecWatcher};
use crate::http::MockServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::{BuildError, RouteTable, RouteTableBuilder};
use crate::spec::{load_spec, ApiSpec, SpecError};
use crate::synth::{SynthPolicy, Synthesizer};

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to load spec: {0}")]
    Spec(#[from] SpecError),

    #[error("Failed to build routes: {0}")]
    Build(#[from] BuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("Failed to watch spec file: {0}")]
    Watch(#[from] notify::Error),

    #[error("Invalid metrics address: {0}")]
    MetricsAddress(String),
}

/// A loaded spec and the table compiled from it.
#[derive(Debug)]
pub struct Compiled {
    pub spec: ApiSpec,
    pub table: RouteTable,
}

/// Route builder configured from `[mocking]`.
pub fn route_builder(config: &MockConfig) -> RouteTableBuilder {
    let synth = Synthesizer::new(SynthPolicy::from(&config.mocking));
    RouteTableBuilder::new(synth).with_seed(config.mocking.seed)
}

/// Load the spec at `path` and compile it.
pub fn compile(path: &Path, config: &MockConfig) -> Result<Compiled, StartupError> {
    let spec = load_spec(path, &config.openapi)?;
    let table = route_builder(config).build(&spec)?;
    Ok(Compiled { spec, table })
}

/// The startup banner listing every registered endpoint.
pub fn endpoint_banner(table: &RouteTable) -> String {
    let mut out = String::from("Available endpoints:\n");
    for line in table.endpoint_listing() {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Start background tasks and serve `compiled` on `listener` until
/// `shutdown` fires. `spec_path` is watched when reload is enabled.
pub async fn serve(
    listener: TcpListener,
    spec_path: PathBuf,
    compiled: Compiled,
    config: MockConfig,
    shutdown: Shutdown,
) -> Result<(), StartupError> {
    let Compiled { spec, table } = compiled;

    tracing::info!(
        title = spec.title.as_deref().unwrap_or("untitled"),
        openapi = %spec.openapi,
        routes = table.len(),
        "Spec loaded"
    );
    print!("{}", endpoint_banner(&table));

    if config.metrics.enabled {
        let addr: SocketAddr = config
            .metrics
            .address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.metrics.address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let server = MockServer::new(table, &config);

    // Dropping the watcher stops it, so it lives until the server returns.
    let _watcher = if config.reload.enabled {
        let (watcher, updates) =
            SpecWatcher::new(&spec_path, config.openapi.clone(), route_builder(&config));
        server.apply_updates(updates);
        Some(watcher.run()?)
    } else {
        None
    };

    server.run(listener, &shutdown).await?;
    Ok(())
}
