//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MockConfig (validated, immutable)
//!     → CLI flags applied on top in main
//!
//! With reload enabled:
//!     watcher.rs detects a spec file change
//!     → spec loader + route builder compile a new table
//!     → atomic swap of the served RouteTable
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    LoggingConfig, MetricsConfig, MockConfig, MockingConfig, OpenApiConfig, ReloadConfig,
    ServerConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::{rebuild_routes, ReloadError, SpecWatcher};
