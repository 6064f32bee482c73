//! Integration tests for line templates

use std::sync::Arc;

use maka_foundation::{ErrorKind, Value};
use maka_format::{Segment, Template};
use maka_schema::{FieldDescriptor, FieldValues, NDT, ObservationType, Schema, TextStyle};

fn schema() -> Schema {
    let mut schema = Schema::with_ndt_bases("test").unwrap();
    schema
        .define(
            "Environment",
            &[NDT],
            vec![
                FieldDescriptor::integer("visibility").with_min(0_i64).with_max(6_i64),
                FieldDescriptor::integer("beaufort").with_min(0_i64).with_max(6_i64),
            ],
        )
        .unwrap();
    schema
        .define(
            "Observer",
            &[],
            vec![FieldDescriptor::string("initials"), FieldDescriptor::string("name")],
        )
        .unwrap();
    schema
}

fn environment() -> Arc<ObservationType> {
    Arc::clone(schema().require("Environment").unwrap())
}

const ENVIRONMENT: &str =
    "{observationNum:05d} {date} {time} Environment* Visibility {visibility} Beaufort {beaufort}";

fn line_error(template: &Template, line: &str) -> (usize, String) {
    match template.parse(line, 12).unwrap_err().kind {
        ErrorKind::DocumentFormat { line, message } => (line, message),
        other => panic!("expected a document format error, got {other:?}"),
    }
}

// =============================================================================
// Compilation
// =============================================================================

#[test]
fn segments_follow_the_pattern() {
    let template = Template::new(environment(), ENVIRONMENT).unwrap();
    assert_eq!(template.segments().len(), 8);
    assert_eq!(
        template.segments()[0],
        Segment::Field {
            name: "observationNum".to_string(),
            style: TextStyle::ZeroPadded(5),
        }
    );
    assert_eq!(template.keyword(), Some((3, "Environment*")));
    assert_eq!(template.pattern(), ENVIRONMENT);
}

#[test]
fn inconsistent_patterns_are_rejected() {
    let patterns = [
        "{observationNum} {date} {time} Environment* {visibility}",
        "{observationNum} {date} {time} Environment* {visibility} {beaufort} {speed}",
        "{observationNum} {date} {time} Environment* {visibility} {visibility} {beaufort}",
        "{observationNum:x} {date} {time} Environment* {visibility} {beaufort}",
        "{observationNum} {date} {time} \"Environment\" {visibility} {beaufort}",
    ];
    for pattern in patterns {
        let err = Template::new(environment(), pattern).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Grammar(_)), "{pattern}");
    }
}

// =============================================================================
// Lines
// =============================================================================

#[test]
fn format_then_parse() {
    let template = Template::new(environment(), ENVIRONMENT).unwrap();
    let line = "00017 2013-07-29 09:15:02 Environment* Visibility 5 Beaufort 2";
    let obs = template.parse_observation(line, 1).unwrap();
    assert_eq!(obs.get("observationNum"), Some(&Value::Integer(17)));
    assert_eq!(obs.get("visibility"), Some(&Value::Integer(5)));
    assert_eq!(template.format(&obs), line);
}

#[test]
fn absent_values_round_trip_as_empty_quotes() {
    let template = Template::new(environment(), ENVIRONMENT).unwrap();
    let line = "00017 2013-07-29 09:15:02 Environment* Visibility \"\" Beaufort 2";
    let obs = template.parse_observation(line, 1).unwrap();
    assert_eq!(obs.get("visibility"), None);
    assert_eq!(template.format(&obs), line);
}

#[test]
fn wrong_token_count_names_the_line() {
    let template = Template::new(environment(), ENVIRONMENT).unwrap();
    let (line, message) = line_error(
        &template,
        "00017 2013-07-29 09:15:02 Environment* Visibility 5 Beaufort",
    );
    assert_eq!(line, 12);
    assert_eq!(
        message,
        "Expected 8 tokens for Environment observation but found 7."
    );
}

#[test]
fn mismatched_keyword_names_the_line() {
    let template = Template::new(environment(), ENVIRONMENT).unwrap();
    let (line, message) = line_error(
        &template,
        "00017 2013-07-29 09:15:02 Environment* Vis 5 Beaufort 2",
    );
    assert_eq!(line, 12);
    assert!(message.starts_with("Expected \"Visibility\""), "{message}");
}

#[test]
fn bad_field_text_names_the_line() {
    let template = Template::new(environment(), ENVIRONMENT).unwrap();
    let (line, message) = line_error(
        &template,
        "00017 2013-07-29 09:15:02 Environment* Visibility five Beaufort 2",
    );
    assert_eq!(line, 12);
    assert!(message.contains("visibility"), "{message}");
}

#[test]
fn out_of_range_values_are_format_errors() {
    let template = Template::new(environment(), ENVIRONMENT).unwrap();
    let err = template
        .parse_observation(
            "00017 2013-07-29 09:15:02 Environment* Visibility 7 Beaufort 2",
            4,
        )
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DocumentFormat { line: 4, .. }));
}

#[test]
fn quoted_strings_round_trip() {
    let schema = schema();
    let observer = Arc::clone(schema.require("Observer").unwrap());
    let template = Template::new(observer, "Observer* {initials} {name}").unwrap();

    let mut values = FieldValues::new();
    values.insert("initials".to_string(), Some(Value::from("asf")));
    values.insert("name".to_string(), Some(Value::from("Adam \"A\" Frankel")));
    let obs = schema.require("Observer").unwrap().construct(values).unwrap();

    let line = template.format(&obs);
    assert_eq!(line, r#"Observer* asf "Adam \"A\" Frankel""#);
    assert_eq!(template.parse_observation(&line, 1).unwrap(), obs);
}
