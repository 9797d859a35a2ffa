//! Specification subsystem.
//!
//! # Data Flow
//! ```text
//! spec file (JSON/YAML)
//!     → loader.rs (parse, version gate, resolve $ref)
//!     → model.rs (ApiSpec: paths → operations → responses)
//!     → schema.rs (SchemaNode per response media type)
//!     → handed to the route table builder
//! ```
//!
//! # Design Decisions
//! - The tree is fully resolved; nothing downstream sees a `$ref`
//! - Interpretation only: structural validation of the document is not done here

pub mod loader;
pub mod model;
pub mod schema;

pub use loader::{load_spec, SpecError};
pub use model::{ApiSpec, Operation, Parameter, PathItem, ResponseSpec};
pub use schema::{SchemaKind, SchemaNode};
