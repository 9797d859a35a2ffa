//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (probabilities, bounds, worker counts)
//! - Check that addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MockConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::MockConfig;

/// Highest accepted `mocking.number_precision`.
pub const MAX_NUMBER_PRECISION: u32 = 10;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be within [0, 1], got {value}")]
    Probability { field: &'static str, value: f64 },

    #[error("{min_field} ({min}) must not exceed {max_field} ({max})")]
    InvertedBounds {
        min_field: &'static str,
        min: usize,
        max_field: &'static str,
        max: usize,
    },

    #[error("{field} must be at least 1")]
    Zero { field: &'static str },

    #[error("mocking.number_precision must be at most 10, got {0}")]
    Precision(u32),

    #[error("openapi.min_version must not be empty")]
    EmptyVersion,

    #[error("{field} is not a valid socket address: {value}")]
    Address { field: &'static str, value: String },
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &MockConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mocking = &config.mocking;

    let p = mocking.optional_property_probability;
    if !(0.0..=1.0).contains(&p) {
        errors.push(ValidationError::Probability {
            field: "mocking.optional_property_probability",
            value: p,
        });
    }

    if mocking.min_items > mocking.max_items {
        errors.push(ValidationError::InvertedBounds {
            min_field: "mocking.min_items",
            min: mocking.min_items,
            max_field: "mocking.max_items",
            max: mocking.max_items,
        });
    }

    if mocking.min_length > mocking.max_length {
        errors.push(ValidationError::InvertedBounds {
            min_field: "mocking.min_length",
            min: mocking.min_length,
            max_field: "mocking.max_length",
            max: mocking.max_length,
        });
    }

    if mocking.max_depth == 0 {
        errors.push(ValidationError::Zero { field: "mocking.max_depth" });
    }

    if config.server.workers == 0 {
        errors.push(ValidationError::Zero { field: "server.workers" });
    }

    if mocking.number_precision > MAX_NUMBER_PRECISION {
        errors.push(ValidationError::Precision(mocking.number_precision));
    }

    if config.openapi.min_version.trim().is_empty() {
        errors.push(ValidationError::EmptyVersion);
    }

    if config.metrics.address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field: "metrics.address",
            value: config.metrics.address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
