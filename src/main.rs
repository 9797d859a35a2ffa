//! OpenAPI Mock Server
//!
//! Serves schema-conformant fake JSON for every operation of an OpenAPI 3 spec.
//!
//! # Architecture Overview
//!
//! ```text
//!   spec file ──▶ spec loader ──▶ route builder ──▶ RouteTable ◀── spec watcher
//!                                     │                 │          (hot reload)
//!                                     ▼                 ▼
//!                               synthesizer     ┌──────────────┐
//!                                               │ http server  │
//!     Client Request ──────────────────────────▶│  matcher     │
//!     Client Response ◀─────────────────────────│  response    │
//!                                               └──────────────┘
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;

use openapi_mock::config::{load_or_default, validate_config, ConfigError, MockConfig};
use openapi_mock::lifecycle::{self, signals, Compiled, Shutdown};
use openapi_mock::observability::init_logging;

#[derive(Parser)]
#[command(name = "openapi-mock")]
#[command(about = "Mock HTTP server generated from an OpenAPI 3 spec", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve mock responses for every operation in the spec
    Serve(ServeArgs),
    /// Load the spec, print a summary and the endpoints it would serve
    Validate(ValidateArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// OpenAPI document (.json, .yaml or .yml)
    spec: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    /// Tokio worker threads
    #[arg(short, long)]
    workers: Option<usize>,

    /// Resynthesize bodies on every request
    #[arg(long)]
    live: bool,

    /// Seed for reproducible bodies
    #[arg(long)]
    seed: Option<u64>,

    /// Rebuild routes when the spec file changes
    #[arg(long)]
    watch: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// OpenAPI document (.json, .yaml or .yml)
    spec: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            let config = serve_config(&args)?;
            init_logging(&config.logging);

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(config.server.workers)
                .enable_all()
                .build()?;
            runtime.block_on(run_server(args.spec, config))
        }
        Commands::Validate(args) => {
            let config = load_or_default(args.config.as_deref())?;
            init_logging(&config.logging);
            validate_spec(&args.spec, &config)
        }
    }
}

/// Config file values with command-line flags applied on top.
fn serve_config(args: &ServeArgs) -> Result<MockConfig, ConfigError> {
    let mut config = load_or_default(args.config.as_deref())?;

    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(workers) = args.workers {
        config.server.workers = workers;
    }
    if args.live {
        config.mocking.live = true;
    }
    if args.seed.is_some() {
        config.mocking.seed = args.seed;
    }
    if args.watch {
        config.reload.enabled = true;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

async fn run_server(spec: PathBuf, config: MockConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("openapi-mock v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.server.bind_address(),
        workers = config.server.workers,
        request_timeout_secs = config.server.request_timeout_secs,
        live = config.mocking.live,
        reload = config.reload.enabled,
        "Configuration loaded"
    );

    // Compile before binding so a broken spec never opens the port.
    let compiled = lifecycle::compile(&spec, &config)?;

    let listener = TcpListener::bind(config.server.bind_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    lifecycle::serve(listener, spec, compiled, config, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn validate_spec(path: &Path, config: &MockConfig) -> Result<(), Box<dyn std::error::Error>> {
    let Compiled { spec, table } = lifecycle::compile(path, config)?;
    let summary = spec.summary();

    println!("{:<12} {}", "OpenAPI", summary.openapi);
    println!("{:<12} {}", "Title", summary.title);
    println!("{:<12} {}", "Paths", summary.paths);
    println!("{:<12} {}", "Operations", summary.operations);
    println!("{:<12} {}", "Schemas", summary.schemas);
    println!();
    print!("{}", lifecycle::startup::endpoint_banner(&table));
    Ok(())
}
