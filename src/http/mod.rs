//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID set and echoed)
//!     → middleware.rs (access log, when enabled)
//!     → [routing layer matches method + path]
//!     → response.rs (precomputed or live body, 404, 500)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id_layer, X_REQUEST_ID};
pub use response::{respond, MockResponse};
pub use server::{AppState, MockServer};
