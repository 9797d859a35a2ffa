//! Spec loading from disk.
//!
//! # Responsibilities
//! - Read a JSON or YAML document and check its `openapi` version
//! - Convert the document into an [`ApiSpec`], resolving local `$ref`s inline
//!
//! # Design Decisions
//! - No structural validation: malformed entries are skipped, not reported
//! - `$ref` expansion is depth-bounded; past the bound (which includes every
//!   cyclic reference) the node becomes an empty object placeholder
//! - `allOf` merges object branches; `oneOf`/`anyOf` take the first branch

use std::cell::Cell;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use axum::http::Method;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::schema::OpenApiConfig;
use crate::spec::model::{
    ApiSpec, MediaType, Operation, ParamLocation, Parameter, PathItem, ResponseSpec, StatusKey,
    TypeHint,
};
use crate::spec::schema::{
    ArraySchema, NumericBounds, ObjectSchema, SchemaKind, SchemaNode, StringFormat, StringSchema,
};

/// HTTP verbs an OpenAPI path item may declare.
const OPERATION_KEYS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Schema nodes expanded per response body. Self-referencing schemas with
/// several `$ref` properties grow exponentially in `max_ref_depth`; past
/// this many nodes the rest become placeholders.
pub const MAX_SCHEMA_NODES: usize = 10_000;

/// Errors raised while loading a spec file.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("OpenAPI specification file not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported specification format: {0}. Use YAML or JSON.")]
    UnsupportedFormat(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML document: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("Document has no `openapi` version field")]
    MissingVersion,

    #[error("OpenAPI version {found} is not supported. Minimum required version is {minimum}")]
    UnsupportedVersion { found: String, minimum: String },
}

/// Serialization of a spec document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Yaml,
}

impl SpecFormat {
    pub fn from_path(path: &Path) -> Result<Self, SpecError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(SpecFormat::Json),
            Some("yaml") | Some("yml") => Ok(SpecFormat::Yaml),
            _ => Err(SpecError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Load, version-check and convert a spec file.
pub fn load_spec(path: &Path, config: &OpenApiConfig) -> Result<ApiSpec, SpecError> {
    if !path.exists() {
        return Err(SpecError::NotFound(path.to_path_buf()));
    }
    let format = SpecFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|source| SpecError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let document = parse_document(&content, format)?;
    check_version(&document, &config.min_version)?;

    let spec = ApiSpec::from_document(&document, config.max_ref_depth);
    tracing::debug!(
        path = %path.display(),
        paths = spec.paths.len(),
        "Specification loaded"
    );
    Ok(spec)
}

/// Parse raw text into a generic document.
pub fn parse_document(content: &str, format: SpecFormat) -> Result<Value, SpecError> {
    match format {
        SpecFormat::Json => Ok(serde_json::from_str(content)?),
        SpecFormat::Yaml => Ok(serde_yaml_ng::from_str(content)?),
    }
}

/// Reject documents older than `minimum`.
pub fn check_version(document: &Value, minimum: &str) -> Result<(), SpecError> {
    let found = document
        .get("openapi")
        .and_then(Value::as_str)
        .ok_or(SpecError::MissingVersion)?;

    if compare_versions(found, minimum) == Ordering::Less {
        return Err(SpecError::UnsupportedVersion {
            found: found.to_string(),
            minimum: minimum.to_string(),
        });
    }
    Ok(())
}

/// Compare dotted versions numerically; missing components count as zero.
fn compare_versions(a: &str, b: &str) -> Ordering {
    fn components(v: &str) -> Vec<u64> {
        v.split('.')
            .map(|part| {
                let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse().unwrap_or(0)
            })
            .collect()
    }

    let (a, b) = (components(a), components(b));
    let len = a.len().max(b.len());
    for i in 0..len {
        let ordering = a.get(i).unwrap_or(&0).cmp(b.get(i).unwrap_or(&0));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl ApiSpec {
    /// Convert a parsed document. Never fails; unusable entries are dropped.
    pub fn from_document(document: &Value, max_ref_depth: usize) -> Self {
        let reader = DocumentReader {
            root: document,
            max_ref_depth,
            nodes: Cell::new(0),
        };

        let info = document.get("info");
        let paths = document
            .get("paths")
            .and_then(Value::as_object)
            .map(|paths| {
                paths
                    .iter()
                    .filter_map(|(template, item)| reader.path_item(template, item))
                    .collect()
            })
            .unwrap_or_default();

        ApiSpec {
            openapi: document
                .get("openapi")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            title: info
                .and_then(|i| i.get("title"))
                .and_then(Value::as_str)
                .map(str::to_string),
            api_version: info
                .and_then(|i| i.get("version"))
                .and_then(Value::as_str)
                .map(str::to_string),
            paths,
            component_schemas: document
                .pointer("/components/schemas")
                .and_then(Value::as_object)
                .map(Map::len)
                .unwrap_or(0),
        }
    }
}

/// Walks a document, following local references.
struct DocumentReader<'a> {
    root: &'a Value,
    max_ref_depth: usize,
    /// Nodes expanded for the current response schema.
    nodes: Cell<usize>,
}

impl<'a> DocumentReader<'a> {
    /// Follow a `$ref` chain. `None` when the chain leaves the document or
    /// exceeds the expansion bound.
    fn follow(&self, value: &'a Value, ref_depth: usize) -> Option<(&'a Value, usize)> {
        let mut current = value;
        let mut depth = ref_depth;
        while let Some(reference) = current.get("$ref").and_then(Value::as_str) {
            if depth >= self.max_ref_depth {
                tracing::debug!(reference, depth, "Reference expansion limit reached");
                return None;
            }
            current = self.lookup(reference)?;
            depth += 1;
        }
        Some((current, depth))
    }

    fn lookup(&self, reference: &str) -> Option<&'a Value> {
        let Some(pointer) = reference.strip_prefix('#') else {
            tracing::warn!(reference, "External $ref not supported");
            return None;
        };
        let found = self.root.pointer(pointer);
        if found.is_none() {
            tracing::warn!(reference, "Unresolved $ref");
        }
        found
    }

    fn path_item(&self, template: &str, item: &'a Value) -> Option<PathItem> {
        let (item, depth) = self.follow(item, 0)?;
        let item = item.as_object()?;

        let shared = self.parameters(item.get("parameters"), depth);
        let operations = item
            .iter()
            .filter(|(key, _)| OPERATION_KEYS.contains(&key.as_str()))
            .filter_map(|(key, op)| self.operation(key, op, &shared, depth))
            .collect();

        Some(PathItem {
            template: template.to_string(),
            operations,
        })
    }

    fn operation(
        &self,
        key: &str,
        value: &'a Value,
        shared: &[Parameter],
        depth: usize,
    ) -> Option<Operation> {
        let method = Method::from_bytes(key.to_ascii_uppercase().as_bytes()).ok()?;
        let op = value.as_object()?;

        let mut parameters = shared.to_vec();
        for own in self.parameters(op.get("parameters"), depth) {
            match parameters
                .iter_mut()
                .find(|p| p.name == own.name && p.location == own.location)
            {
                Some(existing) => *existing = own,
                None => parameters.push(own),
            }
        }

        let responses = op
            .get("responses")
            .and_then(Value::as_object)
            .map(|responses| {
                responses
                    .iter()
                    .filter_map(|(status, response)| self.response(status, response, depth))
                    .collect()
            })
            .unwrap_or_default();

        Some(Operation {
            method,
            operation_id: string_field(op, "operationId"),
            summary: string_field(op, "summary"),
            parameters,
            responses,
        })
    }

    fn parameters(&self, value: Option<&'a Value>, depth: usize) -> Vec<Parameter> {
        value
            .and_then(Value::as_array)
            .map(|params| {
                params
                    .iter()
                    .filter_map(|p| self.parameter(p, depth))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn parameter(&self, value: &'a Value, depth: usize) -> Option<Parameter> {
        let (value, depth) = self.follow(value, depth)?;
        let param = value.as_object()?;
        let name = param.get("name").and_then(Value::as_str)?;
        let location = param
            .get("in")
            .and_then(Value::as_str)
            .and_then(ParamLocation::parse)?;

        // OpenAPI 3 nests the type under `schema`; Swagger 2 puts it inline.
        let type_name = match param.get("schema").and_then(|s| self.follow(s, depth)) {
            Some((schema, _)) => type_keyword(schema),
            None => type_keyword(value),
        };

        Some(Parameter {
            name: name.to_string(),
            location,
            type_hint: TypeHint::parse(type_name),
            required: param
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(location == ParamLocation::Path),
        })
    }

    fn response(&self, status: &str, value: &'a Value, depth: usize) -> Option<ResponseSpec> {
        let Some(status) = StatusKey::parse(status) else {
            tracing::debug!(status, "Skipping unsupported response status key");
            return None;
        };
        let (value, depth) = self.follow(value, depth)?;

        let content = value
            .get("content")
            .and_then(Value::as_object)
            .map(|content| {
                content
                    .iter()
                    .map(|(media_type, media)| MediaType {
                        media_type: media_type.clone(),
                        schema: media.get("schema").map(|s| self.root_schema(s, depth)),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(ResponseSpec { status, content })
    }

    /// Expand a response schema with a fresh node budget.
    fn root_schema(&self, value: &'a Value, ref_depth: usize) -> SchemaNode {
        self.nodes.set(0);
        self.schema(value, ref_depth)
    }

    fn schema(&self, value: &'a Value, ref_depth: usize) -> SchemaNode {
        let used = self.nodes.get();
        self.nodes.set(used + 1);
        if used >= MAX_SCHEMA_NODES {
            if used == MAX_SCHEMA_NODES {
                tracing::warn!(limit = MAX_SCHEMA_NODES, "Schema expansion budget exhausted");
            }
            return SchemaNode::placeholder();
        }

        let Some((value, depth)) = self.follow(value, ref_depth) else {
            return SchemaNode::placeholder();
        };
        let Some(obj) = value.as_object() else {
            return SchemaNode::placeholder();
        };

        let example = obj.get("example").cloned().or_else(|| {
            obj.get("examples")
                .and_then(Value::as_array)
                .and_then(|e| e.first())
                .cloned()
        });

        if let Some(branches) = obj.get("allOf").and_then(Value::as_array) {
            let mut node = self.merge_all_of(obj, branches, depth);
            if example.is_some() {
                node.example = example;
            }
            return node;
        }

        for keyword in ["oneOf", "anyOf"] {
            if let Some(first) = obj
                .get(keyword)
                .and_then(Value::as_array)
                .and_then(|branches| branches.first())
            {
                let mut node = self.schema(first, depth);
                if example.is_some() {
                    node.example = example;
                }
                return node;
            }
        }

        let kind = match type_keyword(value) {
            Some("string") => SchemaKind::String(StringSchema {
                format: string_field(obj, "format").map(|f| StringFormat::parse(&f)),
                pattern: string_field(obj, "pattern"),
                min_length: usize_field(obj, "minLength"),
                max_length: usize_field(obj, "maxLength"),
            }),
            Some("integer") => SchemaKind::Integer(numeric_bounds(obj)),
            Some("number") => SchemaKind::Number(numeric_bounds(obj)),
            Some("boolean") => SchemaKind::Boolean,
            Some("array") => self.array_schema(obj, depth),
            Some("object") => SchemaKind::Object(self.object_schema(obj, depth)),
            Some(other) => SchemaKind::Unknown(other.to_string()),
            None if obj.contains_key("items") => self.array_schema(obj, depth),
            None => SchemaKind::Object(self.object_schema(obj, depth)),
        };

        SchemaNode {
            example,
            enum_values: obj
                .get("enum")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            kind,
        }
    }

    fn array_schema(&self, obj: &'a Map<String, Value>, depth: usize) -> SchemaKind {
        SchemaKind::Array(ArraySchema {
            items: obj.get("items").map(|i| Box::new(self.schema(i, depth))),
            min_items: usize_field(obj, "minItems"),
            max_items: usize_field(obj, "maxItems"),
        })
    }

    fn object_schema(&self, obj: &'a Map<String, Value>, depth: usize) -> ObjectSchema {
        let properties = obj
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(name, schema)| (name.clone(), self.schema(schema, depth)))
                    .collect()
            })
            .unwrap_or_default();

        ObjectSchema {
            properties,
            required: obj
                .get("required")
                .and_then(Value::as_array)
                .map(|r| r.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }

    fn merge_all_of(
        &self,
        outer: &'a Map<String, Value>,
        branches: &'a [Value],
        depth: usize,
    ) -> SchemaNode {
        let mut merged = self.object_schema(outer, depth);
        let mut saw_object = false;
        let mut first_other: Option<SchemaNode> = None;

        for branch in branches {
            let node = self.schema(branch, depth);
            match node.kind {
                SchemaKind::Object(obj) => {
                    saw_object = true;
                    for (name, property) in obj.properties {
                        merged.upsert(name, property);
                    }
                    for name in obj.required {
                        if !merged.is_required(&name) {
                            merged.required.push(name);
                        }
                    }
                }
                _ => {
                    if first_other.is_none() {
                        first_other = Some(node);
                    }
                }
            }
        }

        match first_other {
            Some(other) if !saw_object => other,
            _ => SchemaNode::new(SchemaKind::Object(merged)),
        }
    }
}

/// The `type` keyword; for 3.1 type arrays, the first non-null entry.
fn type_keyword(value: &Value) -> Option<&str> {
    match value.get("type")? {
        Value::String(name) => Some(name.as_str()),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .find(|name| *name != "null"),
        _ => None,
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn usize_field(obj: &Map<String, Value>, key: &str) -> Option<usize> {
    obj.get(key)
        .and_then(Value::as_u64)
        .map(|v| usize::try_from(v).unwrap_or(usize::MAX))
}

fn numeric_bounds(obj: &Map<String, Value>) -> NumericBounds {
    NumericBounds {
        minimum: obj.get("minimum").and_then(Value::as_f64),
        maximum: obj.get("maximum").and_then(Value::as_f64),
    }
}
