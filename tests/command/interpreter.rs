//! Integration tests for the command interpreter
//!
//! Tests tokenizing, command lookup, argument binding, and error reporting.

use maka_command::{CommandInterpreter, FixedClock, ScriptedTheodolite, split_compound};
use maka_dialect::{Dialect, hmmc, mmrp};
use maka_foundation::angle::degrees_to_radians;
use maka_foundation::{ErrorKind, Value};
use maka_text::tokenize;
use time::macros::{date, time};

fn interpreter(dialect: &Dialect) -> CommandInterpreter {
    let state = dialect
        .state(std::iter::empty())
        .with_clock(FixedClock::new(date!(2013 - 07 - 29), time!(9:15:02)))
        .with_theodolite(ScriptedTheodolite::new([
            (Some(degrees_to_radians(91.5)), Some(degrees_to_radians(201.12))),
            (Some(degrees_to_radians(90.25)), Some(degrees_to_radians(14.0))),
        ]));
    dialect.interpreter_with(state)
}

/// Splits a command line the way the interpreter looks up its name.
fn command_tokens(line: &str) -> Vec<String> {
    let tokens: Vec<String> = tokenize(line).unwrap().into_iter().map(|t| t.text).collect();
    let Some((first, rest)) = tokens.split_first() else {
        return tokens;
    };
    let mut out = match split_compound(first) {
        Some((name, digits)) => vec![name.to_string(), digits.to_string()],
        None => vec![first.clone()],
    };
    out.extend(rest.iter().cloned());
    out
}

fn command_error(dialect: &Dialect, line: &str) -> (String, Option<String>, Option<String>) {
    match interpreter(dialect).interpret(line).unwrap_err().kind {
        ErrorKind::CommandInterpreter {
            message,
            command,
            field,
        } => (message, command, field),
        other => panic!("expected a command interpreter error for {line:?}, got {other:?}"),
    }
}

// =============================================================================
// Tokens
// =============================================================================

#[test]
fn compound_names_split_into_name_and_number() {
    let cases: [(&str, &[&str]); 11] = [
        ("", &[]),
        (" ", &[]),
        ("a", &["a"]),
        ("  a  ", &["a"]),
        ("a bc d", &["a", "bc", "d"]),
        ("a 12 34", &["a", "12", "34"]),
        ("a1", &["a", "1"]),
        ("a12", &["a", "12"]),
        ("a12 34", &["a", "12", "34"]),
        ("12 34", &["12", "34"]),
        ("a1b 23", &["a1b", "23"]),
    ];
    for (line, expected) in cases {
        assert_eq!(command_tokens(line), expected, "{line:?}");
    }
}

#[test]
fn blank_lines_yield_nothing() {
    let dialect = hmmc().unwrap();
    let mut interp = interpreter(&dialect);
    assert!(interp.interpret("").unwrap().is_none());
    assert!(interp.interpret("   ").unwrap().is_none());
    assert_eq!(interp.state().peek_observation_num(), 0);
}

// =============================================================================
// Lookup and Binding
// =============================================================================

#[test]
fn compound_token_matches_spaced_form() {
    let dialect = mmrp().unwrap();

    let mut compound = interpreter(&dialect);
    compound.interpret("z").unwrap();
    let a = compound.interpret("p12 rest").unwrap().unwrap();

    let mut spaced = interpreter(&dialect);
    spaced.interpret("z").unwrap();
    let b = spaced.interpret("p 12 rest").unwrap().unwrap();

    assert_eq!(a, b);
    assert_eq!(a.get("objectId"), Some(&Value::Integer(12)));
    assert_eq!(a.get("behavioralState"), Some(&Value::from("rest")));
}

#[test]
fn exact_names_win_over_splitting() {
    let dialect = mmrp().unwrap();
    let mut interp = interpreter(&dialect);
    let event = interp.interpret("p45 3").unwrap().unwrap();
    assert_eq!(event.type_name(), "PodEvent");
    assert_eq!(event.get("podId"), Some(&Value::Integer(3)));
}

#[test]
fn unrecognized_commands_fail() {
    let dialect = hmmc().unwrap();
    let (message, ..) = command_error(&dialect, "zz 1 2");
    assert_eq!(message, "Unrecognized command name \"zz\".");
    let (message, ..) = command_error(&dialect, "q12");
    assert_eq!(message, "Unrecognized command name \"q12\".");
}

#[test]
fn too_many_arguments_cite_the_maximum() {
    let dialect = hmmc().unwrap();
    let (message, command, _) = command_error(&dialect, "c \"calm seas\" 3 4");
    assert_eq!(
        message,
        "Too many arguments for command \"c\": maximum number is 2."
    );
    assert_eq!(command.as_deref(), Some("c"));

    let (message, ..) = command_error(&dialect, "z 1");
    assert_eq!(message, "Command \"z\" takes no arguments.");
}

#[test]
fn unparsable_arguments_name_field_and_command() {
    let dialect = hmmc().unwrap();
    let (message, command, field) = command_error(&dialect, "p four trav");
    assert!(
        message.starts_with("Could not parse \"subjectId\" argument for command \"p\"."),
        "{message}"
    );
    assert_eq!(command.as_deref(), Some("p"));
    assert_eq!(field.as_deref(), Some("subjectId"));
}

#[test]
fn invalid_values_name_the_field() {
    let dialect = mmrp().unwrap();
    let (message, command, field) = command_error(&dialect, "env 7 2 1.5");
    assert!(message.contains("visibility"), "{message}");
    assert_eq!(command.as_deref(), Some("env"));
    assert_eq!(field.as_deref(), Some("visibility"));

    let mut interp = interpreter(&dialect);
    let env = interp.interpret("env 6 2 1.5").unwrap().unwrap();
    assert_eq!(env.get("visibility"), Some(&Value::Integer(6)));
}

#[test]
fn tokenization_failures_become_command_errors() {
    let dialect = hmmc().unwrap();
    let (message, ..) = command_error(&dialect, "c \"unterminated");
    assert_eq!(
        message,
        "Could not parse command. Unterminated quoted token starting at character 3."
    );
}

#[test]
fn failures_leave_counters_alone() {
    let dialect = hmmc().unwrap();
    let mut interp = interpreter(&dialect);
    assert!(interp.interpret("p four trav").is_err());
    assert!(interp.interpret("zz").is_err());
    assert_eq!(interp.state().peek_observation_num(), 0);
    let c = interp.interpret("c hello").unwrap().unwrap();
    assert_eq!(c.get("observationNum"), Some(&Value::Integer(0)));
}

#[test]
fn quoted_arguments_are_unquoted() {
    let dialect = hmmc().unwrap();
    let mut interp = interpreter(&dialect);
    let c = interp
        .interpret(r#"c "the \"big\" one" 12"#)
        .unwrap()
        .unwrap();
    assert_eq!(c.get("text"), Some(&Value::from("the \"big\" one")));
    assert_eq!(c.get("id"), Some(&Value::Integer(12)));
    assert_eq!(interp.state().peek_comment_id(), 0);
}
