//! Compiled route table.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Index them by method for lookup
//! - Render the endpoint listing shown at startup
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - A spec change produces a new table; nothing is patched in place

use std::collections::{BTreeMap, HashMap};

use axum::http::Method;
use regex::Regex;
use serde_json::{json, Value};

use crate::spec::schema::SchemaNode;

/// Path of the synthetic liveness route.
pub const HEALTH_PATH: &str = "/health";

/// Static payload served by the liveness route.
pub fn health_payload() -> Value {
    json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })
}

/// How a route's path is matched.
#[derive(Debug, Clone)]
pub enum PathPattern {
    /// Exact string equality.
    Literal(String),
    /// Anchored regex with one capture group per path parameter.
    Template(Regex),
}

impl PathPattern {
    /// Captured parameter values if `path` matches, in group order.
    pub fn captures(&self, path: &str) -> Option<Vec<String>> {
        match self {
            PathPattern::Literal(literal) => (literal == path).then(Vec::new),
            PathPattern::Template(regex) => {
                let caps = regex.captures(path)?;
                Some(
                    caps.iter()
                        .skip(1)
                        .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                        .collect(),
                )
            }
        }
    }
}

/// Where a route came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKind {
    /// Declared by the spec.
    Operation { operation_id: Option<String> },
    /// The fixed liveness route.
    Health,
}

/// A response body computed at build time, with the schema it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct MockBody {
    pub schema: SchemaNode,
    pub body: Value,
}

/// One compiled route.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub method: Method,
    /// The path template as declared, e.g. `/pets/{id}`.
    pub template: String,
    pub pattern: PathPattern,
    /// Parameter names, one per capture group, in declaration order.
    pub param_names: Vec<String>,
    /// Status served by default; 204 when the operation has no JSON body.
    pub status: u16,
    /// Precomputed bodies keyed by status code.
    pub responses: BTreeMap<u16, MockBody>,
    pub kind: RouteKind,
}

impl RouteEntry {
    /// The status and body to serve: the selected status if it has a body,
    /// else the lowest status that does, else the selected status with no body.
    pub fn response(&self) -> (u16, Option<&MockBody>) {
        if let Some(body) = self.responses.get(&self.status) {
            return (self.status, Some(body));
        }
        match self.responses.iter().next() {
            Some((status, body)) => (*status, Some(body)),
            None => (self.status, None),
        }
    }

    pub fn is_health(&self) -> bool {
        self.kind == RouteKind::Health
    }
}

/// Ordered routes grouped by method.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    by_method: HashMap<Method, Vec<usize>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route after all existing ones.
    pub(crate) fn push(&mut self, entry: RouteEntry) {
        self.by_method
            .entry(entry.method.clone())
            .or_default()
            .push(self.entries.len());
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All routes in registration order.
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Routes for one method, in registration order.
    pub fn routes_for<'t>(&'t self, method: &Method) -> impl Iterator<Item = &'t RouteEntry> + 't {
        self.by_method
            .get(method)
            .into_iter()
            .flatten()
            .map(move |&index| &self.entries[index])
    }

    /// One line per path: `  - [GET, POST] | /pets`.
    pub fn endpoint_listing(&self) -> Vec<String> {
        let mut paths: Vec<(&str, Vec<&str>)> = Vec::new();
        for entry in &self.entries {
            let method = entry.method.as_str();
            match paths.iter_mut().find(|(template, _)| *template == entry.template) {
                Some((_, methods)) => {
                    if !methods.contains(&method) {
                        methods.push(method);
                    }
                }
                None => paths.push((entry.template.as_str(), vec![method])),
            }
        }

        paths
            .into_iter()
            .map(|(template, methods)| format!("  - [{}] | {}", methods.join(", "), template))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(method: Method, path: &str) -> RouteEntry {
        RouteEntry {
            method,
            template: path.to_string(),
            pattern: PathPattern::Literal(path.to_string()),
            param_names: Vec::new(),
            status: 204,
            responses: BTreeMap::new(),
            kind: RouteKind::Operation { operation_id: None },
        }
    }

    #[test]
    fn test_routes_grouped_by_method() {
        let mut table = RouteTable::new();
        table.push(literal(Method::GET, "/a"));
        table.push(literal(Method::POST, "/a"));
        table.push(literal(Method::GET, "/b"));

        let gets: Vec<_> = table.routes_for(&Method::GET).map(|r| r.template.as_str()).collect();
        assert_eq!(gets, vec!["/a", "/b"]);
        assert_eq!(table.routes_for(&Method::DELETE).count(), 0);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_endpoint_listing() {
        let mut table = RouteTable::new();
        table.push(literal(Method::GET, "/pets"));
        table.push(literal(Method::POST, "/pets"));
        table.push(literal(Method::GET, "/health"));

        assert_eq!(
            table.endpoint_listing(),
            vec!["  - [GET, POST] | /pets", "  - [GET] | /health"]
        );
    }

    #[test]
    fn test_response_falls_back_to_lowest_status() {
        let mut entry = literal(Method::GET, "/x");
        assert_eq!(entry.response().0, 204);
        assert!(entry.response().1.is_none());

        entry.status = 200;
        entry.responses.insert(
            404,
            MockBody { schema: SchemaNode::placeholder(), body: json!({}) },
        );
        entry.responses.insert(
            400,
            MockBody { schema: SchemaNode::placeholder(), body: json!({}) },
        );
        assert_eq!(entry.response().0, 400);
    }

    #[test]
    fn test_template_captures() {
        let pattern = PathPattern::Template(Regex::new(r"^/pets/([0-9]+)$").unwrap());
        assert_eq!(pattern.captures("/pets/42"), Some(vec!["42".to_string()]));
        assert_eq!(pattern.captures("/pets/abc"), None);
        assert_eq!(PathPattern::Literal("/a".into()).captures("/a"), Some(vec![]));
    }
}
