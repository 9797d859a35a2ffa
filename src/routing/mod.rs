//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup and on reload):
//!     ApiSpec
//!     → builder.rs (compile templates, precompute bodies, append /health)
//!     → table.rs (immutable RouteTable, indexed by method)
//!
//! Incoming Request (method, path)
//!     → matcher.rs (first matching route for the method)
//!     → Return: RouteMatch::Found { route, params } or NotFound
//! ```
//!
//! # Design Decisions
//! - Tables are immutable; a reload swaps in a whole new table
//! - Literal templates compare by string equality; templated ones use an
//!   anchored regex compiled once at build time
//! - Deterministic: same input always matches same route

pub mod builder;
pub mod matcher;
pub mod table;

pub use builder::{BuildError, RouteTableBuilder};
pub use matcher::{match_route, PathParams, RouteMatch};
pub use table::{MockBody, RouteEntry, RouteKind, RouteTable};
