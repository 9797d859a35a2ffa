//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the mock server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the mock server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct MockConfig {
    /// Listener and runtime settings.
    pub server: ServerConfig,

    /// Value synthesis policy.
    pub mocking: MockingConfig,

    /// Spec loading limits.
    pub openapi: OpenApiConfig,

    /// Log output settings.
    pub logging: LoggingConfig,

    /// Prometheus exporter settings.
    pub metrics: MetricsConfig,

    /// Spec file hot reload.
    pub reload: ReloadConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host (e.g., "127.0.0.1").
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Tokio worker threads.
    pub workers: usize,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9501,
            workers: 4,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// `host:port` as a bindable string.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Value synthesis configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MockingConfig {
    /// Chance that a non-required object property is emitted.
    pub optional_property_probability: f64,

    /// Array length bounds when the schema gives none.
    pub min_items: usize,
    pub max_items: usize,

    /// Free-text length bounds when the schema gives none.
    pub min_length: usize,
    pub max_length: usize,

    /// Nesting depth after which containers are emitted empty.
    pub max_depth: usize,

    /// Decimal places kept on generated numbers.
    pub number_precision: u32,

    /// Resynthesize bodies on every request instead of serving compiled ones.
    pub live: bool,

    /// Seed for reproducible compiled bodies.
    pub seed: Option<u64>,
}

impl Default for MockingConfig {
    fn default() -> Self {
        Self {
            optional_property_probability: 0.8,
            min_items: 1,
            max_items: 5,
            min_length: 1,
            max_length: 20,
            max_depth: 8,
            number_precision: 2,
            live: false,
            seed: None,
        }
    }
}

/// Spec loading configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OpenApiConfig {
    /// Lowest accepted `openapi` version.
    pub min_version: String,

    /// How many `$ref` hops are expanded along one branch.
    pub max_ref_depth: usize,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            min_version: "3.0".to_string(),
            max_ref_depth: 8,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence.
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,

    /// Log every request and response.
    pub access_log: bool,

    /// Path prefixes left out of the access log.
    pub exclude_paths: Vec<String>,

    /// Include JSON request bodies in the access log (debug level).
    pub log_body: bool,

    /// Body keys whose values are masked before logging, matched case-insensitively.
    pub sensitive_fields: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            access_log: false,
            exclude_paths: vec!["/health".to_string()],
            log_body: true,
            sensitive_fields: ["password", "token", "secret", "credit_card"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable the Prometheus endpoint.
    pub enabled: bool,

    /// Metrics endpoint bind address.
    pub address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Hot reload configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ReloadConfig {
    /// Watch the spec file and rebuild routes when it changes.
    pub enabled: bool,
}
