//! Schema-driven value synthesis.
//!
//! # Responsibilities
//! - Turn any [`SchemaNode`] into a concrete JSON value honoring its constraints
//! - Never fail: unknown kinds yield `null`, inverted bounds collapse to a point
//!
//! # Design Decisions
//! - The random source is a parameter, never a global; callers pick a seeded
//!   generator (reproducible bodies) or a per-thread one (live mode)
//! - Recursion is capped at `max_depth`; past the cap nodes become empty
//!   placeholders (`{}`, `[]` or `null`)

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{Map, Number, Value};

use crate::config::schema::MockingConfig;
use crate::spec::schema::{ArraySchema, NumericBounds, ObjectSchema, SchemaKind, SchemaNode, StringSchema};
use crate::synth::{formats, pattern};

/// Tunable generation policy.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthPolicy {
    /// Chance that a non-required property is included.
    pub optional_property_probability: f64,
    /// Array length bounds used when the schema declares none.
    pub min_items: usize,
    pub max_items: usize,
    /// Generic string length bounds used when the schema declares none.
    pub min_length: usize,
    pub max_length: usize,
    /// Deepest nesting level that is still expanded.
    pub max_depth: usize,
    /// Decimal places kept for `number` values.
    pub number_precision: u32,
}

impl Default for SynthPolicy {
    fn default() -> Self {
        Self {
            optional_property_probability: 0.8,
            min_items: 1,
            max_items: 5,
            min_length: 1,
            max_length: 20,
            max_depth: 8,
            number_precision: 2,
        }
    }
}

impl SynthPolicy {
    /// `optional_property_probability` as a valid `gen_bool` argument;
    /// non-finite values fall back to the default.
    pub fn inclusion_probability(&self) -> f64 {
        let p = self.optional_property_probability;
        if p.is_finite() {
            p.clamp(0.0, 1.0)
        } else {
            Self::default().optional_property_probability
        }
    }
}

impl From<&MockingConfig> for SynthPolicy {
    fn from(config: &MockingConfig) -> Self {
        Self {
            optional_property_probability: config.optional_property_probability,
            min_items: config.min_items,
            max_items: config.max_items,
            min_length: config.min_length,
            max_length: config.max_length,
            max_depth: config.max_depth,
            number_precision: config.number_precision,
        }
    }
}

/// Produces example values from schema nodes.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    policy: SynthPolicy,
}

impl Synthesizer {
    pub fn new(policy: SynthPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SynthPolicy {
        &self.policy
    }

    /// Synthesize a value for `node`.
    pub fn synthesize<R: Rng + ?Sized>(&self, node: &SchemaNode, rng: &mut R) -> Value {
        self.synthesize_at(node, rng, 0)
    }

    fn synthesize_at<R: Rng + ?Sized>(&self, node: &SchemaNode, rng: &mut R, depth: usize) -> Value {
        if let Some(example) = &node.example {
            return example.clone();
        }

        if depth > self.policy.max_depth {
            tracing::trace!(depth, kind = node.kind.name(), "Depth cap reached");
            return match node.kind {
                SchemaKind::Object(_) => Value::Object(Map::new()),
                SchemaKind::Array(_) => Value::Array(Vec::new()),
                _ => Value::Null,
            };
        }

        let scalar = matches!(
            node.kind,
            SchemaKind::String(_) | SchemaKind::Integer(_) | SchemaKind::Number(_) | SchemaKind::Boolean
        );
        if scalar {
            if let Some(choice) = node.enum_values.choose(rng) {
                return choice.clone();
            }
        }

        match &node.kind {
            SchemaKind::Object(object) => self.object(object, rng, depth),
            SchemaKind::Array(array) => self.array(array, rng, depth),
            SchemaKind::String(string) => Value::String(self.string(string, rng)),
            SchemaKind::Integer(bounds) => Value::from(integer(bounds, rng)),
            SchemaKind::Number(bounds) => number(bounds, self.policy.number_precision, rng),
            SchemaKind::Boolean => Value::Bool(rng.gen_bool(0.5)),
            SchemaKind::Unknown(_) => Value::Null,
        }
    }

    fn object<R: Rng + ?Sized>(&self, object: &ObjectSchema, rng: &mut R, depth: usize) -> Value {
        let probability = self.policy.inclusion_probability();
        let mut out = Map::new();
        for (name, property) in &object.properties {
            if object.is_required(name) || rng.gen_bool(probability) {
                out.insert(name.clone(), self.synthesize_at(property, rng, depth + 1));
            }
        }
        Value::Object(out)
    }

    fn array<R: Rng + ?Sized>(&self, array: &ArraySchema, rng: &mut R, depth: usize) -> Value {
        let Some(items) = &array.items else {
            return Value::Array(Vec::new());
        };
        let (min, max) = resolve_bounds(
            array.min_items,
            array.max_items,
            self.policy.min_items,
            self.policy.max_items,
        );
        let len = rng.gen_range(min..=max);
        Value::Array(
            (0..len)
                .map(|_| self.synthesize_at(items, rng, depth + 1))
                .collect(),
        )
    }

    fn string<R: Rng + ?Sized>(&self, schema: &StringSchema, rng: &mut R) -> String {
        if let Some(value) = schema
            .format
            .as_ref()
            .and_then(|format| formats::generate(format, rng))
        {
            return value;
        }

        if let Some(pattern) = &schema.pattern {
            match pattern::generate(pattern, rng) {
                Some(value) => return value,
                None => tracing::debug!(pattern = %pattern, "Falling back to generic text"),
            }
        }

        let (min, max) = resolve_bounds(
            schema.min_length,
            schema.max_length,
            self.policy.min_length,
            self.policy.max_length,
        );
        formats::text(rng, min, max)
    }
}

/// Combine declared bounds with policy defaults. Declared bounds win; an
/// inverted range collapses to its lower end.
fn resolve_bounds(
    declared_min: Option<usize>,
    declared_max: Option<usize>,
    default_min: usize,
    default_max: usize,
) -> (usize, usize) {
    match (declared_min, declared_max) {
        (Some(lo), Some(hi)) => (lo, hi.max(lo)),
        (Some(lo), None) => (lo, default_max.max(lo)),
        (None, Some(hi)) => (default_min.min(hi), hi),
        (None, None) => (default_min, default_max.max(default_min)),
    }
}

fn integer<R: Rng + ?Sized>(bounds: &NumericBounds, rng: &mut R) -> i64 {
    // `as` saturates, so out-of-range bounds clamp to the i64 range.
    let lo = bounds.minimum.filter(|v| !v.is_nan()).map_or(i64::MIN, |v| v.ceil() as i64);
    let hi = bounds.maximum.filter(|v| !v.is_nan()).map_or(i64::MAX, |v| v.floor() as i64);
    if hi < lo {
        // Inverted, or fractional bounds with no integer between them.
        let value = bounds.minimum.map_or(lo, |v| v.round() as i64);
        tracing::debug!(
            minimum = ?bounds.minimum,
            maximum = ?bounds.maximum,
            value,
            "No integer within bounds"
        );
        return value;
    }
    rng.gen_range(lo..=hi)
}

fn number<R: Rng + ?Sized>(bounds: &NumericBounds, precision: u32, rng: &mut R) -> Value {
    let lo = bounds.minimum.filter(|v| v.is_finite()).unwrap_or(f64::MIN);
    let hi = bounds.maximum.filter(|v| v.is_finite()).unwrap_or(f64::MAX).max(lo);

    let t: f64 = rng.gen();
    // Interpolating this way cannot overflow even across the whole f64 range.
    let raw = (lo * (1.0 - t) + hi * t).clamp(lo, hi);
    let value = round_within(raw, lo, hi, precision);

    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Round to `precision` decimals without leaving `[lo, hi]`.
fn round_within(value: f64, lo: f64, hi: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision.min(15) as i32);
    let scaled = value * factor;
    // Beyond 2^52 every f64 is already an integer at this scale.
    if !scaled.is_finite() || scaled.abs() >= 4_503_599_627_370_496.0 {
        return value;
    }

    let rounded = scaled.round() / factor;
    if (lo..=hi).contains(&rounded) {
        return rounded;
    }
    let nudged = if rounded < lo {
        scaled.ceil() / factor
    } else {
        scaled.floor() / factor
    };
    if (lo..=hi).contains(&nudged) {
        nudged
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::schema::StringFormat;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_example_short_circuits() {
        let synth = Synthesizer::default();
        let node = SchemaNode::integer_between(1.0, 2.0).with_example(json!("not a number"));
        assert_eq!(synth.synthesize(&node, &mut rng()), json!("not a number"));

        let node = SchemaNode::object(Vec::<(String, SchemaNode)>::new(), &[]).with_example(json!({"a": 1}));
        assert_eq!(synth.synthesize(&node, &mut rng()), json!({"a": 1}));
    }

    #[test]
    fn test_empty_object_and_array() {
        let synth = Synthesizer::default();
        assert_eq!(synth.synthesize(&SchemaNode::placeholder(), &mut rng()), json!({}));

        let node = SchemaNode::new(SchemaKind::Array(ArraySchema::default()));
        assert_eq!(synth.synthesize(&node, &mut rng()), json!([]));
    }

    #[test]
    fn test_unknown_kind_is_null() {
        let synth = Synthesizer::default();
        let node = SchemaNode::new(SchemaKind::Unknown("null".into()));
        assert_eq!(synth.synthesize(&node, &mut rng()), Value::Null);
    }

    #[test]
    fn test_integer_bounds() {
        let synth = Synthesizer::default();
        let node = SchemaNode::integer_between(-3.0, 3.0);
        let mut rng = rng();
        for _ in 0..200 {
            let v = synth.synthesize(&node, &mut rng).as_i64().unwrap();
            assert!((-3..=3).contains(&v));
        }
    }

    #[test]
    fn test_inverted_bounds_collapse() {
        let synth = Synthesizer::default();
        let mut rng = rng();
        assert_eq!(synth.synthesize(&SchemaNode::integer_between(10.0, 1.0), &mut rng), json!(10));
        assert_eq!(synth.synthesize(&SchemaNode::number_between(5.5, 1.0), &mut rng), json!(5.5));
    }

    #[test]
    fn test_integer_without_integer_in_range() {
        let synth = Synthesizer::default();
        let mut rng = rng();
        for _ in 0..20 {
            assert_eq!(synth.synthesize(&SchemaNode::integer_between(1.2, 1.8), &mut rng), json!(1));
            assert_eq!(synth.synthesize(&SchemaNode::integer_between(1.2, 2.8), &mut rng), json!(2));
        }
    }

    #[test]
    fn test_non_finite_probability_uses_default() {
        for p in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let policy = SynthPolicy {
                optional_property_probability: p,
                ..SynthPolicy::default()
            };
            assert_eq!(policy.inclusion_probability(), 0.8);

            let synth = Synthesizer::new(policy);
            let node = SchemaNode::object([("name", SchemaNode::string())], &[]);
            assert!(synth.synthesize(&node, &mut rng()).is_object());
        }
        let policy = SynthPolicy {
            optional_property_probability: 3.0,
            ..SynthPolicy::default()
        };
        assert_eq!(policy.inclusion_probability(), 1.0);
    }

    #[test]
    fn test_unbounded_numbers_do_not_panic() {
        let synth = Synthesizer::default();
        let mut rng = rng();
        for _ in 0..50 {
            assert!(synth.synthesize(&SchemaNode::integer(), &mut rng).is_i64());
            let node = SchemaNode::new(SchemaKind::Number(NumericBounds::default()));
            assert!(synth.synthesize(&node, &mut rng).is_f64());
        }
    }

    #[test]
    fn test_number_precision() {
        let synth = Synthesizer::default();
        let node = SchemaNode::number_between(0.0, 10.0);
        let mut rng = rng();
        for _ in 0..100 {
            let v = synth.synthesize(&node, &mut rng).as_f64().unwrap();
            assert!((0.0..=10.0).contains(&v));
            assert!(((v * 100.0).round() - v * 100.0).abs() < 1e-6, "{}", v);
        }
    }

    #[test]
    fn test_number_rounding_stays_in_narrow_range() {
        let synth = Synthesizer::default();
        let node = SchemaNode::number_between(0.001, 0.004);
        let mut rng = rng();
        for _ in 0..50 {
            let v = synth.synthesize(&node, &mut rng).as_f64().unwrap();
            assert!((0.001..=0.004).contains(&v), "{}", v);
        }
    }

    #[test]
    fn test_enum_membership() {
        let synth = Synthesizer::default();
        let values = vec![json!("available"), json!("pending"), json!("sold")];
        let node = SchemaNode::string_with_format(StringFormat::Email).with_enum(values.clone());
        let mut rng = rng();
        for _ in 0..50 {
            assert!(values.contains(&synth.synthesize(&node, &mut rng)));
        }

        let node = SchemaNode::integer().with_enum(vec![json!(1), json!(2)]);
        let v = synth.synthesize(&node, &mut rng);
        assert!(v == json!(1) || v == json!(2));
    }

    #[test]
    fn test_array_length_bounds() {
        let synth = Synthesizer::default();
        let node = SchemaNode::new(SchemaKind::Array(ArraySchema {
            items: Some(Box::new(SchemaNode::string())),
            min_items: Some(2),
            max_items: Some(4),
        }));
        let mut rng = rng();
        for _ in 0..100 {
            let value = synth.synthesize(&node, &mut rng);
            let items = value.as_array().unwrap();
            assert!((2..=4).contains(&items.len()));
            assert!(items.iter().all(Value::is_string));
        }
    }

    #[test]
    fn test_max_items_below_default_min() {
        let synth = Synthesizer::default();
        let node = SchemaNode::new(SchemaKind::Array(ArraySchema {
            items: Some(Box::new(SchemaNode::boolean())),
            min_items: None,
            max_items: Some(0),
        }));
        assert_eq!(synth.synthesize(&node, &mut rng()), json!([]));
    }

    #[test]
    fn test_required_properties_always_present() {
        let synth = Synthesizer::new(SynthPolicy {
            optional_property_probability: 0.0,
            ..SynthPolicy::default()
        });
        let node = SchemaNode::object(
            [
                ("id", SchemaNode::integer()),
                ("name", SchemaNode::string()),
                ("email", SchemaNode::string_with_format(StringFormat::Email)),
            ],
            &["id", "email"],
        );
        let value = synth.synthesize(&node, &mut rng());
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("id"));
        assert!(obj.contains_key("email"));
        assert!(!obj.contains_key("name"));
        assert!(obj["email"].as_str().unwrap().contains('@'));
    }

    #[test]
    fn test_properties_keep_declaration_order() {
        let synth = Synthesizer::new(SynthPolicy {
            optional_property_probability: 1.0,
            ..SynthPolicy::default()
        });
        let node = SchemaNode::object(
            [
                ("zeta", SchemaNode::boolean()),
                ("alpha", SchemaNode::boolean()),
                ("mid", SchemaNode::boolean()),
            ],
            &[],
        );
        let value = synth.synthesize(&node, &mut rng());
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_depth_cap_terminates() {
        let synth = Synthesizer::new(SynthPolicy {
            max_depth: 2,
            optional_property_probability: 1.0,
            ..SynthPolicy::default()
        });

        let mut node = SchemaNode::integer();
        for _ in 0..10 {
            node = SchemaNode::object([("next", node)], &["next"]);
        }

        let value = synth.synthesize(&node, &mut rng());
        // depth 0 → depth 1 → depth 2 → placeholder at depth 3
        assert_eq!(value, json!({ "next": { "next": { "next": {} } } }));
    }

    #[test]
    fn test_string_length_bounds() {
        let synth = Synthesizer::default();
        let node = SchemaNode::new(SchemaKind::String(StringSchema {
            min_length: Some(5),
            max_length: Some(8),
            ..StringSchema::default()
        }));
        let mut rng = rng();
        for _ in 0..50 {
            let len = synth.synthesize(&node, &mut rng).as_str().unwrap().chars().count();
            assert!((5..=8).contains(&len));
        }
    }

    #[test]
    fn test_pattern_strings() {
        let synth = Synthesizer::default();
        let node = SchemaNode::new(SchemaKind::String(StringSchema {
            pattern: Some(r"^[A-Z]{2}\d{3}$".into()),
            ..StringSchema::default()
        }));
        let re = regex::Regex::new(r"^[A-Z]{2}\d{3}$").unwrap();
        let value = synth.synthesize(&node, &mut rng());
        assert!(re.is_match(value.as_str().unwrap()));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let synth = Synthesizer::default();
        let node = SchemaNode::object(
            [
                ("id", SchemaNode::integer()),
                ("tags", SchemaNode::array_of(SchemaNode::string())),
            ],
            &["id"],
        );
        let a = synth.synthesize(&node, &mut StdRng::seed_from_u64(9));
        let b = synth.synthesize(&node, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
