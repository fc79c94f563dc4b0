//! Model parser integration tests

use chartflow_core::model::{
    AggregateOp, BinSpec, Channel, DataOutput, DataSource, Mark, ModelKind, Predicate,
    TransformSpec,
};
use chartflow_parser::*;
use std::io::Write;

// =============================================================================
// YAML
// =============================================================================

#[test]
fn test_parse_versioned_unit_model() {
    let yaml = r#"
version: "0.1"

model:
  name: chart
  data:
    url: data/cars.json
    format:
      type: json
  transform:
    - filter: "datum.Horsepower > 50"
    - calculate: "datum.Horsepower * 2"
      as: hp2
  requested_data: [raw]
  config:
    filter_invalid: false
  kind:
    type: unit
    mark: bar
    encoding:
      x:
        field: Horsepower
        type: quantitative
        bin: true
      y:
        type: quantitative
        aggregate: count
"#;

    let result = ModelParser::document_from_yaml(yaml);
    assert!(result.is_ok(), "Failed to parse model: {:?}", result.err());

    let doc = result.unwrap();
    assert_eq!(doc.version, "0.1");

    let model = doc.model;
    assert_eq!(model.name, "chart");
    assert!(matches!(model.data, Some(DataSource::Url { .. })));
    assert_eq!(model.config.filter_invalid, Some(false));
    assert_eq!(model.config.number_format, "s");
    assert!(model.requests(DataOutput::Raw));
    assert_eq!(
        model.transform,
        vec![
            TransformSpec::filter(Predicate::expression("datum.Horsepower > 50")),
            TransformSpec::calculate("datum.Horsepower * 2", "hp2"),
        ]
    );

    match &model.kind {
        ModelKind::Unit { mark, encoding, stack } => {
            assert_eq!(*mark, Mark::Bar);
            assert!(stack.is_none());
            assert_eq!(encoding[&Channel::X].bin, Some(BinSpec::Flag(true)));
            assert_eq!(encoding[&Channel::Y].aggregate, Some(AggregateOp::Count));
        }
        other => panic!("expected unit model, got {:?}", other),
    }
}

#[test]
fn test_parse_facet_model() {
    let yaml = r#"
data:
  values:
    - {a: 1, b: x}
    - {a: 2, b: y}
kind:
  type: facet
  facet:
    row:
      field: b
      type: nominal
  child:
    kind:
      type: unit
      mark: point
      encoding:
        x: {field: a, type: quantitative}
"#;

    let model = ModelParser::from_yaml(yaml).unwrap();
    match &model.kind {
        ModelKind::Facet { facet, child } => {
            assert!(facet.column.is_none());
            assert_eq!(facet.row.as_ref().and_then(|r| r.field.as_deref()), Some("b"));
            assert!(child.data.is_none());
        }
        other => panic!("expected facet model, got {:?}", other),
    }
}

#[test]
fn test_parse_invalid_yaml() {
    let result = ModelParser::from_yaml("kind: [unclosed");
    assert!(matches!(result, Err(ParseError::YamlError(_))));
}

#[test]
fn test_parse_unknown_mark() {
    let yaml = r#"
kind:
  type: unit
  mark: sparkle
"#;
    assert!(ModelParser::from_yaml(yaml).is_err());
}

// =============================================================================
// JSON
// =============================================================================

#[test]
fn test_parse_json_layer() {
    let json = r#"{
        "data": {"name": "table"},
        "kind": {
            "type": "layer",
            "children": [
                {"name": "layer_0", "kind": {"type": "unit", "mark": "line"}},
                {"name": "layer_1", "kind": {"type": "unit", "mark": "point"}}
            ]
        }
    }"#;

    let model = ModelParser::from_json(json).unwrap();
    assert_eq!(model.data, Some(DataSource::named("table")));
    assert_eq!(model.children().len(), 2);
    assert_eq!(model.children()[1].name, "layer_1");
}

#[test]
fn test_parse_json_wrapped() {
    let json = r#"{"version": "0.1", "model": {"kind": {"type": "unit", "mark": "tick"}}}"#;
    let model = ModelParser::from_json(json).unwrap();
    assert!(matches!(model.kind, ModelKind::Unit { mark: Mark::Tick, .. }));
}

// =============================================================================
// Files
// =============================================================================

#[test]
fn test_from_file_dispatches_on_extension() {
    let dir = tempfile::tempdir().unwrap();

    let yaml_path = dir.path().join("chart.yaml");
    std::fs::write(&yaml_path, "kind:\n  type: unit\n  mark: rule\n").unwrap();
    let model = ModelParser::from_file(&yaml_path).unwrap();
    assert!(matches!(model.kind, ModelKind::Unit { mark: Mark::Rule, .. }));

    let mut json_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(json_file, r#"{{"kind": {{"type": "unit", "mark": "area"}}}}"#).unwrap();
    let model = ModelParser::from_file(json_file.path()).unwrap();
    assert!(matches!(model.kind, ModelKind::Unit { mark: Mark::Area, .. }));
}

#[test]
fn test_from_file_unsupported_extension() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "kind = 1").unwrap();
    let result = ModelParser::from_file(file.path());
    assert!(matches!(result, Err(ParseError::UnsupportedFormat(ref ext)) if ext == "toml"));
}

#[test]
fn test_from_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let result = ModelParser::from_file(dir.path().join("nope.yaml"));
    assert!(matches!(result, Err(ParseError::IoError(_))));
}
