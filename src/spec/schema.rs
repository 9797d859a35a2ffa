//! Schema nodes.
//!
//! # Responsibilities
//! - Represent one node of a JSON-Schema-like type description
//! - Carry the constraints the synthesizer honors (bounds, formats, lengths)
//!
//! # Design Decisions
//! - Tagged sum type: the kind is fixed at construction and matched exhaustively
//! - `example` and `enum` live on the node, not the kind, since both apply to any kind
//! - Nesting is owned (`Box`/`Vec`), so a node tree is always finite; cyclic
//!   references are cut by the loader before a node is built

use serde_json::Value;

/// One node of a type description.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaNode {
    /// Hand-authored literal; returned verbatim when present.
    pub example: Option<Value>,
    /// Allowed literal values, in declaration order.
    pub enum_values: Vec<Value>,
    pub kind: SchemaKind,
}

/// The shape a node describes.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    String(StringSchema),
    Integer(NumericBounds),
    Number(NumericBounds),
    Boolean,
    Array(ArraySchema),
    Object(ObjectSchema),
    /// A `type` keyword this crate does not understand (e.g. `"null"`).
    Unknown(String),
}

impl Default for SchemaKind {
    fn default() -> Self {
        SchemaKind::Object(ObjectSchema::default())
    }
}

impl SchemaKind {
    /// The keyword this kind was declared with.
    pub fn name(&self) -> &str {
        match self {
            SchemaKind::String(_) => "string",
            SchemaKind::Integer(_) => "integer",
            SchemaKind::Number(_) => "number",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Array(_) => "array",
            SchemaKind::Object(_) => "object",
            SchemaKind::Unknown(name) => name,
        }
    }
}

/// Constraints for `string` nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringSchema {
    pub format: Option<StringFormat>,
    pub pattern: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

/// Recognized `format` discriminators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringFormat {
    DateTime,
    Date,
    Email,
    Uri,
    Uuid,
    Hostname,
    Ipv4,
    Ipv6,
    /// Anything else; generates generic text.
    Other(String),
}

impl StringFormat {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "date-time" => StringFormat::DateTime,
            "date" => StringFormat::Date,
            "email" => StringFormat::Email,
            "uri" | "url" => StringFormat::Uri,
            "uuid" => StringFormat::Uuid,
            "hostname" => StringFormat::Hostname,
            "ipv4" => StringFormat::Ipv4,
            "ipv6" => StringFormat::Ipv6,
            other => StringFormat::Other(other.to_string()),
        }
    }
}

/// Inclusive bounds for `integer` and `number` nodes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericBounds {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

/// Element shape and length bounds for `array` nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArraySchema {
    pub items: Option<Box<SchemaNode>>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

/// Properties for `object` nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    /// Property name to schema, in declaration order.
    pub properties: Vec<(String, SchemaNode)>,
    pub required: Vec<String>,
}

impl ObjectSchema {
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Insert or replace a property, keeping the original position on replace.
    pub fn upsert(&mut self, name: String, node: SchemaNode) {
        match self.properties.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = node,
            None => self.properties.push((name, node)),
        }
    }
}

impl SchemaNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            example: None,
            enum_values: Vec::new(),
            kind,
        }
    }

    /// Empty object; stands in for anything that could not be expanded.
    pub fn placeholder() -> Self {
        Self::new(SchemaKind::Object(ObjectSchema::default()))
    }

    pub fn string() -> Self {
        Self::new(SchemaKind::String(StringSchema::default()))
    }

    pub fn string_with_format(format: StringFormat) -> Self {
        Self::new(SchemaKind::String(StringSchema {
            format: Some(format),
            ..StringSchema::default()
        }))
    }

    pub fn integer() -> Self {
        Self::new(SchemaKind::Integer(NumericBounds::default()))
    }

    pub fn integer_between(minimum: f64, maximum: f64) -> Self {
        Self::new(SchemaKind::Integer(NumericBounds {
            minimum: Some(minimum),
            maximum: Some(maximum),
        }))
    }

    pub fn number_between(minimum: f64, maximum: f64) -> Self {
        Self::new(SchemaKind::Number(NumericBounds {
            minimum: Some(minimum),
            maximum: Some(maximum),
        }))
    }

    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    pub fn array_of(items: SchemaNode) -> Self {
        Self::new(SchemaKind::Array(ArraySchema {
            items: Some(Box::new(items)),
            ..ArraySchema::default()
        }))
    }

    pub fn object<I, S>(properties: I, required: &[&str]) -> Self
    where
        I: IntoIterator<Item = (S, SchemaNode)>,
        S: Into<String>,
    {
        Self::new(SchemaKind::Object(ObjectSchema {
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            required: required.iter().map(|r| r.to_string()).collect(),
        }))
    }

    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.enum_values = values;
        self
    }
}
