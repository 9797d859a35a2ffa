//! Property-based tests for value synthesis.
//!
//! Every generated value must respect the constraints of the schema node it
//! was generated from, for arbitrary seeds and bounds.
use openapi_mock::spec::schema::{ArraySchema, SchemaKind, SchemaNode};
use openapi_mock::synth::Synthesizer;
use proptest::{prelude::*, test_runner::Config};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};

fn scalar_node() -> impl Strategy<Value = SchemaNode> {
    prop_oneof![
        Just(SchemaNode::string()),
        Just(SchemaNode::integer()),
        Just(SchemaNode::boolean()),
        (-1000i64..1000).prop_map(|lo| SchemaNode::integer_between(lo as f64, (lo + 50) as f64)),
        Just(SchemaNode::array_of(SchemaNode::string())),
        Just(SchemaNode::placeholder()),
    ]
}

proptest! {
  #![proptest_config(Config {
    cases: 256, ..Config::default()
  })]

  /// An example is returned unchanged whatever the kind.
  #[test]
  fn prop_example_wins(node in scalar_node(), example in "[a-z]{0,12}", seed in any::<u64>()) {
      let node = node.with_example(json!({ "example": example }));
      let value = Synthesizer::default().synthesize(&node, &mut StdRng::seed_from_u64(seed));
      prop_assert_eq!(value, json!({ "example": example }));
  }

  #[test]
  fn prop_integer_within_bounds(a in -1_000_000i64..1_000_000, span in 0i64..10_000, seed in any::<u64>()) {
      let b = a + span;
      let node = SchemaNode::integer_between(a as f64, b as f64);
      let value = Synthesizer::default().synthesize(&node, &mut StdRng::seed_from_u64(seed));
      let v = value.as_i64().unwrap();
      prop_assert!(a <= v && v <= b, "{} not in [{}, {}]", v, a, b);
  }

  #[test]
  fn prop_number_within_bounds(a in -1.0e6f64..1.0e6, span in 0.0f64..1.0e4, seed in any::<u64>()) {
      let b = a + span;
      let node = SchemaNode::number_between(a, b);
      let value = Synthesizer::default().synthesize(&node, &mut StdRng::seed_from_u64(seed));
      let v = value.as_f64().unwrap();
      prop_assert!(a <= v && v <= b, "{} not in [{}, {}]", v, a, b);
  }

  #[test]
  fn prop_enum_membership(values in prop::collection::vec("[a-z]{1,8}", 1..6), seed in any::<u64>()) {
      let choices: Vec<Value> = values.iter().map(|v| json!(v)).collect();
      let node = SchemaNode::string().with_enum(choices.clone());
      let value = Synthesizer::default().synthesize(&node, &mut StdRng::seed_from_u64(seed));
      prop_assert!(choices.contains(&value));
  }

  #[test]
  fn prop_array_length_and_items(min in 0usize..6, extra in 0usize..6, seed in any::<u64>()) {
      let max = min + extra;
      let node = SchemaNode::new(SchemaKind::Array(ArraySchema {
          items: Some(Box::new(SchemaNode::integer_between(0.0, 9.0))),
          min_items: Some(min),
          max_items: Some(max),
      }));
      let value = Synthesizer::default().synthesize(&node, &mut StdRng::seed_from_u64(seed));
      let items = value.as_array().unwrap();
      prop_assert!(min <= items.len() && items.len() <= max);
      for item in items {
          let v = item.as_i64().unwrap();
          prop_assert!((0..=9).contains(&v));
      }
  }

  #[test]
  fn prop_required_properties_present(
      names in prop::collection::btree_set("[a-z]{1,6}", 1..8),
      required_count in 0usize..8,
      seed in any::<u64>(),
  ) {
      let names: Vec<String> = names.into_iter().collect();
      let required: Vec<&str> = names.iter().take(required_count).map(String::as_str).collect();
      let node = SchemaNode::object(
          names.iter().map(|n| (n.clone(), SchemaNode::string())),
          &required,
      );
      let value = Synthesizer::default().synthesize(&node, &mut StdRng::seed_from_u64(seed));
      let object = value.as_object().unwrap();
      for name in &required {
          prop_assert!(object.contains_key(*name), "missing required {}", name);
      }
      for key in object.keys() {
          prop_assert!(names.contains(key));
      }
  }
}
