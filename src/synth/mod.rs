//! Mock value synthesis subsystem.
//!
//! # Data Flow
//! ```text
//! SchemaNode + random source
//!     → generator.rs (example? → enum? → dispatch on kind, depth-capped)
//!     → formats.rs (date-time, email, uuid, ... and filler text)
//!     → pattern.rs (strings matching a `pattern` regex)
//!     → serde_json::Value
//! ```
//!
//! # Design Decisions
//! - Pure: no I/O, no shared state; safe to call from any number of threads
//! - Policy constants (inclusion probability, default lengths) are configuration

pub mod formats;
pub mod generator;
pub mod pattern;

pub use generator::{SynthPolicy, Synthesizer};
