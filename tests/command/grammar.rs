//! Integration tests for command grammars
//!
//! Tests definition-time checks and prototype default resolution.

use std::sync::Arc;

use maka_command::{
    CommandPrototype, CommandSpec, DefaultRule, DefaultValue, Grammar, Supplier,
};
use maka_foundation::{ErrorKind, Value};
use maka_schema::{DATE, FieldDescriptor, NDT, OBSERVATION_NUM, Schema, TIME};

fn schema() -> Arc<Schema> {
    let mut schema = Schema::with_ndt_bases("test").unwrap();
    schema
        .define(
            "Fix",
            &[NDT],
            vec![
                FieldDescriptor::string("objectType"),
                FieldDescriptor::integer("objectId"),
                FieldDescriptor::string("behavioralState"),
            ],
        )
        .unwrap();
    schema
        .define(
            "Comment",
            &[NDT],
            vec![FieldDescriptor::integer("id"), FieldDescriptor::string("text")],
        )
        .unwrap();
    Arc::new(schema)
}

fn grammar_error(spec: CommandSpec) -> String {
    let mut grammar = Grammar::new("test", schema());
    let err = grammar.define_command(spec).unwrap_err();
    assert!(!err.is_runtime());
    match err.kind {
        ErrorKind::Grammar(message) => message,
        other => panic!("expected a grammar error, got {other:?}"),
    }
}

// =============================================================================
// Definition Checks
// =============================================================================

#[test]
fn positional_fields_must_belong_to_the_type() {
    let message = grammar_error(
        CommandSpec::new("p", "Fix").with_fields(["objectId", "subjectState"]),
    );
    assert!(message.contains("\"subjectState\""), "{message}");
}

#[test]
fn default_keys_must_belong_to_the_type() {
    grammar_error(
        CommandSpec::new("p", "Fix").with_default(DefaultRule::literal("subjectType", "Pod")),
    );
    grammar_error(
        CommandSpec::new("z", "Fix")
            .with_default(DefaultRule::supplied(&["declination", "azimuth"], Supplier::SavedTheodoliteAngles)),
    );
}

#[test]
fn inherited_default_keys_are_checked_too() {
    let prototype = Arc::new(
        CommandPrototype::new("theo").with_default(DefaultRule::supplied(
            &["declination", "azimuth"],
            Supplier::ReadTheodoliteAngles,
        )),
    );
    grammar_error(CommandSpec::new("c", "Comment").with_prototype(&prototype));
}

#[test]
fn rule_arity_must_match_its_fields() {
    grammar_error(
        CommandSpec::new("c", "Comment")
            .with_default(DefaultRule::supplied(&["date"], Supplier::CurrentDateTime)),
    );
    grammar_error(CommandSpec::new("c", "Comment").with_default(DefaultRule::literals(
        &["id", "text"],
        vec![Some(Value::Integer(1))],
    )));
}

#[test]
fn invalid_literal_defaults_are_rejected() {
    grammar_error(
        CommandSpec::new("c", "Comment").with_default(DefaultRule::literal("id", "one")),
    );
}

#[test]
fn names_and_types_are_checked() {
    let mut grammar = Grammar::new("test", schema());
    grammar.define_command(CommandSpec::new("c", "Comment")).unwrap();
    assert!(grammar.define_command(CommandSpec::new("c", "Comment")).is_err());

    grammar_error(CommandSpec::new("x", "Sunset"));
    grammar_error(CommandSpec::new("x", NDT));
    grammar_error(CommandSpec::new("two words", "Comment"));
    grammar_error(CommandSpec::new("c", "Comment").with_fields(["id", "id"]));
    assert!(CommandSpec::from_format("   ", "Comment").is_err());
}

// =============================================================================
// Prototype Resolution
// =============================================================================

#[test]
fn nearest_definition_wins() {
    let ndt = Arc::new(
        CommandPrototype::new("ndt")
            .with_default(DefaultRule::supplied(&[OBSERVATION_NUM], Supplier::NextObservationNum))
            .with_default(DefaultRule::supplied(&[DATE, TIME], Supplier::CurrentDateTime))
            .with_default(DefaultRule::literal("objectType", "Other")),
    );
    let fix = Arc::new(
        CommandPrototype::new("fix")
            .with_parent(&ndt)
            .with_default(DefaultRule::supplied(&[DATE, TIME], Supplier::SavedDateTime)),
    );
    let spec = CommandSpec::new("p", "Fix")
        .with_fields(["objectId", "behavioralState"])
        .with_prototype(&fix)
        .with_default(DefaultRule::literal("objectType", "Pod"));

    let rules = spec.resolved_defaults();
    let fields: Vec<Vec<String>> = rules.iter().map(|r| r.fields.clone()).collect();
    assert_eq!(
        fields,
        [
            vec!["objectType".to_string()],
            vec![DATE.to_string(), TIME.to_string()],
            vec![OBSERVATION_NUM.to_string()],
        ]
    );
    assert_eq!(rules[0].value, DefaultValue::Literal(vec![Some(Value::from("Pod"))]));
    assert_eq!(rules[1].value, DefaultValue::Supplied(Supplier::SavedDateTime));

    let ancestry: Vec<&str> = fix.ancestry().map(CommandPrototype::name).collect();
    assert_eq!(ancestry, ["fix", "ndt"]);
}

#[test]
fn commands_report_usage() {
    let grammar = Grammar::new("test", schema())
        .with_commands([
            CommandSpec::from_format("c text id", "Comment").unwrap(),
            CommandSpec::new("p", "Fix").with_fields(["objectId", "behavioralState"]),
        ])
        .unwrap();
    let usages: Vec<String> = grammar.commands().map(|c| c.usage()).collect();
    assert_eq!(usages, ["c text id", "p objectId behavioralState"]);
    assert_eq!(grammar.command("c").unwrap().max_args(), 2);
    assert_eq!(grammar.command_names().collect::<Vec<_>>(), ["c", "p"]);
    assert_eq!(grammar.len(), 2);
}

#[test]
fn side_effects_are_known_per_supplier() {
    assert!(Supplier::NextObservationNum.has_side_effects());
    assert!(Supplier::ReadTheodoliteAngles.has_side_effects());
    assert!(!Supplier::SavedTheodoliteAngles.has_side_effects());
    assert!(!Supplier::CurrentDateTime.has_side_effects());
    assert_eq!(Supplier::SavedDateTime.arity(), 2);
    assert_eq!(Supplier::NextCommentId.arity(), 1);
}
