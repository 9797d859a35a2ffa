//! OpenAPI mock server library.
//!
//! Loads an OpenAPI 3 document, compiles every operation into a route with a
//! synthesized JSON body, and serves those routes over HTTP.

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;
pub mod spec;
pub mod synth;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::MockConfig;
pub use http::MockServer;
pub use lifecycle::Shutdown;
pub use routing::{RouteTable, RouteTableBuilder};
pub use spec::{load_spec, ApiSpec};
pub use synth::Synthesizer;
