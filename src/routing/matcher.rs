//! Request-to-route matching.
//!
//! # Responsibilities
//! - Find the first route registered for a method whose pattern matches a path
//! - Bind captured segments to parameter names
//!
//! # Design Decisions
//! - First match wins, in registration order
//! - Path matching is case-sensitive and ignores the query string
//! - Methods are compared exactly; HEAD is not folded into GET

use axum::http::Method;

use crate::routing::table::{RouteEntry, RouteTable};

/// Path parameter bindings in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of a lookup.
#[derive(Debug)]
pub enum RouteMatch<'t> {
    Found {
        route: &'t RouteEntry,
        params: PathParams,
    },
    NotFound,
}

impl RouteMatch<'_> {
    pub fn is_found(&self) -> bool {
        matches!(self, RouteMatch::Found { .. })
    }
}

/// Find the first route for `method` whose pattern matches `path`.
pub fn match_route<'t>(table: &'t RouteTable, method: &Method, path: &str) -> RouteMatch<'t> {
    let path = path.split('?').next().unwrap_or(path);

    for route in table.routes_for(method) {
        if let Some(values) = route.pattern.captures(path) {
            let params = route.param_names.iter().cloned().zip(values).collect();
            return RouteMatch::Found {
                route,
                params: PathParams(params),
            };
        }
    }
    RouteMatch::NotFound
}

impl RouteTable {
    /// Shorthand for [`match_route`].
    pub fn lookup(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        match_route(self, method, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::builder::RouteTableBuilder;
    use crate::spec::model::{ApiSpec, Operation, ParamLocation, Parameter, PathItem, TypeHint};
    use crate::synth::Synthesizer;

    fn table(paths: &[(&str, &[Method])]) -> RouteTable {
        let spec = ApiSpec {
            paths: paths
                .iter()
                .map(|(template, methods)| PathItem {
                    template: template.to_string(),
                    operations: methods
                        .iter()
                        .map(|m| {
                            let mut op = Operation::new(m.clone());
                            if template.contains("{id}") {
                                op.parameters.push(Parameter {
                                    name: "id".into(),
                                    location: ParamLocation::Path,
                                    type_hint: TypeHint::Integer,
                                    required: true,
                                });
                            }
                            op
                        })
                        .collect(),
                })
                .collect(),
            ..ApiSpec::default()
        };
        RouteTableBuilder::new(Synthesizer::default())
            .with_seed(Some(3))
            .build(&spec)
            .unwrap()
    }

    #[test]
    fn test_literal_and_template_matching() {
        let t = table(&[("/pets", &[Method::GET]), ("/pets/{id}", &[Method::GET])]);

        match t.lookup(&Method::GET, "/pets/42") {
            RouteMatch::Found { route, params } => {
                assert_eq!(route.template, "/pets/{id}");
                assert_eq!(params.get("id"), Some("42"));
                assert_eq!(params.len(), 1);
            }
            RouteMatch::NotFound => panic!("expected a match"),
        }

        match t.lookup(&Method::GET, "/pets") {
            RouteMatch::Found { route, params } => {
                assert_eq!(route.template, "/pets");
                assert!(params.is_empty());
            }
            RouteMatch::NotFound => panic!("expected a match"),
        }
    }

    #[test]
    fn test_method_must_match() {
        let t = table(&[("/pets", &[Method::GET])]);
        assert!(!t.lookup(&Method::DELETE, "/pets").is_found());
        assert!(!t.lookup(&Method::HEAD, "/pets").is_found());
    }

    #[test]
    fn test_first_match_wins() {
        let t = table(&[("/pets/mine", &[Method::GET]), ("/pets/{name}", &[Method::GET])]);
        match t.lookup(&Method::GET, "/pets/mine") {
            RouteMatch::Found { route, .. } => assert_eq!(route.template, "/pets/mine"),
            RouteMatch::NotFound => panic!("expected a match"),
        }
    }

    #[test]
    fn test_integer_parameter_rejects_text() {
        let t = table(&[("/pets/{id}", &[Method::GET])]);
        assert!(!t.lookup(&Method::GET, "/pets/rex").is_found());
        assert!(!t.lookup(&Method::GET, "/pets/").is_found());
        assert!(!t.lookup(&Method::GET, "/pets/1/2").is_found());
    }

    #[test]
    fn test_query_string_ignored() {
        let t = table(&[("/pets", &[Method::GET])]);
        assert!(t.lookup(&Method::GET, "/pets?limit=3").is_found());
    }

    #[test]
    fn test_health_always_present() {
        let t = table(&[]);
        match t.lookup(&Method::GET, "/health") {
            RouteMatch::Found { route, .. } => assert!(route.is_health()),
            RouteMatch::NotFound => panic!("health route missing"),
        }
        assert!(!t.lookup(&Method::POST, "/health").is_found());
    }
}
