//! Route table compilation.
//!
//! # Responsibilities
//! - Turn every (path, method) operation of a spec into a route entry
//! - Compile path templates into literal or anchored-regex patterns
//! - Precompute response bodies with the synthesizer
//! - Append the fixed `GET /health` route
//!
//! # Design Decisions
//! - Registration order is spec declaration order; the health route goes last
//!   so a spec-declared `GET /health` wins
//! - Operations without a JSON body still get a route (204, empty body)
//! - Only malformed templates fail the build

use std::collections::BTreeMap;

use axum::http::Method;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use thiserror::Error;

use crate::routing::table::{
    health_payload, MockBody, PathPattern, RouteEntry, RouteKind, RouteTable, HEALTH_PATH,
};
use crate::spec::model::{ApiSpec, Operation, TypeHint};
use crate::spec::schema::SchemaNode;
use crate::synth::Synthesizer;

/// Status served when an operation declares no JSON body.
pub const NO_CONTENT: u16 = 204;

/// Capture pattern for integer-typed path parameters.
const INTEGER_SEGMENT: &str = "([0-9]+)";

/// Capture pattern for every other path parameter.
const TOKEN_SEGMENT: &str = "([^/]+)";

/// Errors that abort table construction.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid path template {template}: {reason}")]
    InvalidTemplate { template: String, reason: &'static str },

    #[error("Failed to compile pattern for {template}: {source}")]
    Pattern {
        template: String,
        #[source]
        source: regex::Error,
    },
}

/// Compiles an [`ApiSpec`] into a [`RouteTable`].
#[derive(Debug, Clone)]
pub struct RouteTableBuilder {
    synth: Synthesizer,
    seed: Option<u64>,
}

impl RouteTableBuilder {
    pub fn new(synth: Synthesizer) -> Self {
        Self { synth, seed: None }
    }

    /// Make precomputed bodies reproducible.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Build the table with a fresh random source (seeded when configured).
    pub fn build(&self, spec: &ApiSpec) -> Result<RouteTable, BuildError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.build_with_rng(spec, &mut rng)
    }

    pub fn build_with_rng<R: Rng + ?Sized>(
        &self,
        spec: &ApiSpec,
        rng: &mut R,
    ) -> Result<RouteTable, BuildError> {
        let mut table = RouteTable::new();

        for item in &spec.paths {
            for operation in &item.operations {
                let entry = self.compile_operation(&item.template, operation, rng)?;
                tracing::debug!(
                    method = %entry.method,
                    path = %entry.template,
                    status = entry.status,
                    params = ?entry.param_names,
                    "Route compiled"
                );
                table.push(entry);
            }
        }

        table.push(health_route());

        tracing::info!(routes = table.len(), "Route table compiled");
        Ok(table)
    }

    fn compile_operation<R: Rng + ?Sized>(
        &self,
        template: &str,
        operation: &Operation,
        rng: &mut R,
    ) -> Result<RouteEntry, BuildError> {
        let (pattern, param_names) = compile_template(template, operation)?;

        let mut responses = BTreeMap::new();
        for response in &operation.responses {
            if let Some(schema) = response.json_schema() {
                responses
                    .entry(response.status.as_u16())
                    .or_insert_with(|| MockBody {
                        body: self.synth.synthesize(schema, rng),
                        schema: schema.clone(),
                    });
            }
        }

        Ok(RouteEntry {
            method: operation.method.clone(),
            template: template.to_string(),
            pattern,
            param_names,
            status: select_status(operation).unwrap_or(NO_CONTENT),
            responses,
            kind: RouteKind::Operation {
                operation_id: operation.operation_id.clone(),
            },
        })
    }
}

/// Lowest 2xx status with a JSON schema, else the first status with one.
pub fn select_status(operation: &Operation) -> Option<u16> {
    let with_schema = || {
        operation
            .responses
            .iter()
            .filter(|r| r.json_schema().is_some())
    };

    with_schema()
        .filter(|r| r.status.is_success())
        .map(|r| r.status.as_u16())
        .min()
        .or_else(|| with_schema().next().map(|r| r.status.as_u16()))
}

/// Split a template into literal text and `{name}` placeholders and build
/// the matching pattern.
pub fn compile_template(
    template: &str,
    operation: &Operation,
) -> Result<(PathPattern, Vec<String>), BuildError> {
    let invalid = |reason| BuildError::InvalidTemplate {
        template: template.to_string(),
        reason,
    };

    let mut source = String::from("^");
    let mut names = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let (literal, placeholder) = rest.split_at(open);
        if literal.contains('}') {
            return Err(invalid("unmatched '}'"));
        }
        let close = placeholder.find('}').ok_or_else(|| invalid("unclosed '{'"))?;
        let name = &placeholder[1..close];
        if name.contains('{') {
            return Err(invalid("nested '{'"));
        }

        source.push_str(&regex::escape(literal));
        source.push_str(segment_pattern(operation, name));
        names.push(name.to_string());
        rest = &placeholder[close + 1..];
    }

    if rest.contains('}') {
        return Err(invalid("unmatched '}'"));
    }
    if names.is_empty() {
        return Ok((PathPattern::Literal(template.to_string()), names));
    }

    source.push_str(&regex::escape(rest));
    source.push('$');

    let regex = Regex::new(&source).map_err(|source| BuildError::Pattern {
        template: template.to_string(),
        source,
    })?;
    Ok((PathPattern::Template(regex), names))
}

fn segment_pattern(operation: &Operation, name: &str) -> &'static str {
    match operation.path_parameter(name).map(|p| p.type_hint) {
        Some(TypeHint::Integer) => INTEGER_SEGMENT,
        _ => TOKEN_SEGMENT,
    }
}

fn health_route() -> RouteEntry {
    let payload = health_payload();
    let mut responses = BTreeMap::new();
    responses.insert(
        200,
        MockBody {
            schema: SchemaNode::placeholder().with_example(payload.clone()),
            body: payload,
        },
    );

    RouteEntry {
        method: Method::GET,
        template: HEALTH_PATH.to_string(),
        pattern: PathPattern::Literal(HEALTH_PATH.to_string()),
        param_names: Vec::new(),
        status: 200,
        responses,
        kind: RouteKind::Health,
    }
}
