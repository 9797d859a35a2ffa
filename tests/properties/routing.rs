//! Property-based tests for route compilation and matching.
use axum::http::Method;
use openapi_mock::routing::{RouteMatch, RouteTableBuilder};
use openapi_mock::spec::model::{ParamLocation, Parameter, TypeHint};
use openapi_mock::spec::{ApiSpec, Operation, PathItem};
use openapi_mock::synth::Synthesizer;
use proptest::{prelude::*, test_runner::Config};

fn spec_for(segments: &[String]) -> ApiSpec {
    let paths = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let mut op = Operation::new(Method::GET);
            op.parameters.push(Parameter {
                name: "id".into(),
                location: ParamLocation::Path,
                type_hint: TypeHint::Integer,
                required: true,
            });
            PathItem {
                template: format!("/{}{}/{{id}}", segment, i),
                operations: vec![op, Operation::new(Method::POST)],
            }
        })
        .collect();
    ApiSpec {
        paths,
        ..ApiSpec::default()
    }
}

proptest! {
  #![proptest_config(Config {
    cases: 128, ..Config::default()
  })]

  /// Two builds of one spec agree on count, order and parameter names.
  #[test]
  fn prop_build_is_deterministic(segments in prop::collection::vec("[a-z]{1,8}", 0..6)) {
      let spec = spec_for(&segments);
      let a = RouteTableBuilder::new(Synthesizer::default()).build(&spec).unwrap();
      let b = RouteTableBuilder::new(Synthesizer::default()).build(&spec).unwrap();

      prop_assert_eq!(a.len(), segments.len() * 2 + 1);
      prop_assert_eq!(a.len(), b.len());
      for (x, y) in a.entries().iter().zip(b.entries()) {
          prop_assert_eq!(&x.method, &y.method);
          prop_assert_eq!(&x.template, &y.template);
          prop_assert_eq!(&x.param_names, &y.param_names);
      }
      prop_assert!(a.entries().last().unwrap().is_health());
  }

  /// Integer-typed parameters bind exactly the requested digits.
  #[test]
  fn prop_integer_parameter_binding(segment in "[a-z]{1,8}", id in any::<u32>()) {
      let spec = spec_for(std::slice::from_ref(&segment));
      let table = RouteTableBuilder::new(Synthesizer::default()).build(&spec).unwrap();

      let path = format!("/{}0/{}", segment, id);
      match table.lookup(&Method::GET, &path) {
          RouteMatch::Found { params, .. } => {
              let expected = id.to_string();
              prop_assert_eq!(params.get("id"), Some(expected.as_str()));
          }
          RouteMatch::NotFound => prop_assert!(false, "{} did not match", path),
      }

      let text = format!("/{}0/x{}", segment, id);
      prop_assert!(!table.lookup(&Method::GET, &text).is_found());
  }
}
