//! The resolved specification tree.
//!
//! Only the parts the route compiler needs are kept: path templates,
//! per-method parameters and per-status response schemas.

use axum::http::Method;

use crate::spec::schema::SchemaNode;

/// A fully resolved API description (no `$ref` left).
#[derive(Debug, Clone, Default)]
pub struct ApiSpec {
    /// Value of the `openapi` field.
    pub openapi: String,
    pub title: Option<String>,
    pub api_version: Option<String>,
    /// Paths in document declaration order.
    pub paths: Vec<PathItem>,
    /// Number of entries under `components.schemas`.
    pub component_schemas: usize,
}

/// One path template and the operations declared on it.
#[derive(Debug, Clone)]
pub struct PathItem {
    pub template: String,
    pub operations: Vec<Operation>,
}

/// One (path, method) operation.
#[derive(Debug, Clone)]
pub struct Operation {
    pub method: Method,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    /// Path-item parameters merged with operation parameters.
    pub parameters: Vec<Parameter>,
    /// Responses in declaration order.
    pub responses: Vec<ResponseSpec>,
}

impl Operation {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            operation_id: None,
            summary: None,
            parameters: Vec::new(),
            responses: Vec::new(),
        }
    }

    /// The declared path parameter with this name, if any.
    pub fn path_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.location == ParamLocation::Path && p.name == name)
    }
}

/// A declared request parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParamLocation,
    pub type_hint: TypeHint,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParamLocation {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            "header" => Some(ParamLocation::Header),
            "cookie" => Some(ParamLocation::Cookie),
            _ => None,
        }
    }
}

/// Coarse type of a parameter, enough to pick a match pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHint {
    String,
    Integer,
    Number,
    Boolean,
    Other,
}

impl TypeHint {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("string") => TypeHint::String,
            Some("integer") => TypeHint::Integer,
            Some("number") => TypeHint::Number,
            Some("boolean") => TypeHint::Boolean,
            _ => TypeHint::Other,
        }
    }
}

/// Status key of a declared response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKey {
    Code(u16),
    /// The `default` response; served as 200 when chosen.
    Default,
}

impl StatusKey {
    pub fn parse(raw: &str) -> Option<Self> {
        if raw == "default" {
            return Some(StatusKey::Default);
        }
        match raw.parse::<u16>() {
            Ok(code) if (100..=599).contains(&code) => Some(StatusKey::Code(code)),
            _ => None,
        }
    }

    pub fn as_u16(self) -> u16 {
        match self {
            StatusKey::Code(code) => code,
            StatusKey::Default => 200,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, StatusKey::Code(code) if (200..300).contains(&code))
    }
}

/// One declared response.
#[derive(Debug, Clone)]
pub struct ResponseSpec {
    pub status: StatusKey,
    /// Media types in declaration order.
    pub content: Vec<MediaType>,
}

impl ResponseSpec {
    /// Schema of the first JSON media type that declares one.
    pub fn json_schema(&self) -> Option<&SchemaNode> {
        self.content
            .iter()
            .filter(|m| is_json_media_type(&m.media_type))
            .find_map(|m| m.schema.as_ref())
    }
}

#[derive(Debug, Clone)]
pub struct MediaType {
    pub media_type: String,
    pub schema: Option<SchemaNode>,
}

/// `application/json`, `application/problem+json`, with or without parameters.
pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Counts shown by the `validate` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSummary {
    pub openapi: String,
    pub title: String,
    pub paths: usize,
    pub operations: usize,
    pub schemas: usize,
}

impl ApiSpec {
    pub fn summary(&self) -> SpecSummary {
        SpecSummary {
            openapi: self.openapi.clone(),
            title: self.title.clone().unwrap_or_else(|| "N/A".to_string()),
            paths: self.paths.len(),
            operations: self.paths.iter().map(|p| p.operations.len()).sum(),
            schemas: self.component_schemas,
        }
    }
}
