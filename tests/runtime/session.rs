//! Integration tests for sessions
//!
//! Tests observing, editing, undoing, and switching documents.

use std::sync::Arc;

use maka_command::{FixedClock, ScriptedTheodolite};
use maka_dialect::{HMMC_FORMAT_NAME, MMRP_FORMAT_NAME};
use maka_foundation::angle::degrees_to_radians;
use maka_foundation::{ErrorKind, Value};
use maka_runtime::{Preferences, Registry, Session};
use time::macros::{date, time};

fn session_with(prefs: Preferences) -> Session {
    let registry = Arc::new(Registry::builtin().unwrap());
    Session::new(registry, prefs)
        .unwrap()
        .with_state_hook(Box::new(|state| {
            state
                .with_clock(FixedClock::new(date!(2013 - 07 - 29), time!(9:15:02)))
                .with_theodolite(ScriptedTheodolite::new([(
                    Some(degrees_to_radians(91.5)),
                    Some(degrees_to_radians(201.12)),
                )]))
        }))
}

fn session() -> Session {
    session_with(Preferences::default())
}

fn run(session: &mut Session, commands: &[&str]) {
    for command in commands {
        session.execute(command).unwrap();
    }
}

const HMMC_LINES: &str = "\
00000 2013-07-29 09:15:02 Comment* 0 \"calm seas\"
00001 2013-07-29 09:15:02 TheoData* Dec 91:30:00 Az 201:07:12
00002 2013-07-29 09:15:02 Fix* Dec 91:30:00 Az 201:07:12 Pod 4 State trav
";

// =============================================================================
// Observing
// =============================================================================

#[test]
fn observing_session_produces_document_text() {
    let mut session = session();
    run(&mut session, &["c \"calm seas\"", "", "z", "p 4 trav"]);
    assert_eq!(session.document().len(), 3);
    assert_eq!(session.document().to_text().unwrap(), HMMC_LINES);
}

#[test]
fn failed_commands_do_not_consume_numbers() {
    let mut session = session();
    run(&mut session, &["c one"]);
    assert!(session.execute("p x trav").is_err());
    assert!(session.execute("zz").is_err());
    run(&mut session, &["c two"]);

    let second = session.document().get(1).unwrap();
    assert_eq!(second.get("observationNum"), Some(&Value::Integer(1)));
    assert_eq!(second.get("id"), Some(&Value::Integer(1)));
}

#[test]
fn device_failure_leaves_document_unchanged() {
    let mut session = session();
    run(&mut session, &["z"]);
    let err = session.execute("z").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::CommandInterpreter { .. }));
    assert_eq!(err.message(), "Theodolite read failed. No more scripted readings.");
    assert_eq!(session.document().len(), 1);
    assert_eq!(session.interpreter().state().peek_observation_num(), 1);
}

// =============================================================================
// Undo and Redo
// =============================================================================

#[test]
fn undoing_every_edit_returns_to_the_saved_state() {
    let mut session = session();
    let path = std::env::temp_dir().join(format!("maka-it-{}-undo.maka", std::process::id()));
    session.save(Some(&path)).unwrap();

    run(&mut session, &["c \"calm seas\"", "z", "p 4 trav"]);
    assert!(!session.document().is_saved());

    assert_eq!(session.undo().unwrap(), "Append Fix");
    assert_eq!(session.undo().unwrap(), "Append TheoData");
    assert_eq!(session.undo().unwrap(), "Append Comment");
    assert!(session.undo().is_err());
    assert!(session.document().is_empty());
    assert!(session.document().is_saved());

    for _ in 0..3 {
        session.redo().unwrap();
    }
    assert!(session.redo().is_err());
    assert_eq!(session.document().to_text().unwrap(), HMMC_LINES);

    std::fs::remove_file(path).unwrap();
}

#[test]
fn field_edits_and_deletes_are_undoable() {
    let mut session = session();
    run(&mut session, &["c \"calm seas\"", "z", "p 4 trav"]);

    session.set_field(1, "declination", "90:00:00").unwrap();
    let theo = session.document().get(1).unwrap();
    assert_eq!(theo.get("declination"), Some(&Value::Float(degrees_to_radians(90.0))));

    session.delete(0, 2).unwrap();
    assert_eq!(session.document().len(), 1);

    assert_eq!(session.undo().unwrap(), "Delete");
    assert_eq!(session.undo().unwrap(), "Edit TheoData");
    assert_eq!(session.document().to_text().unwrap(), HMMC_LINES);
}

#[test]
fn invalid_field_edits_change_nothing() {
    let mut session = session();
    run(&mut session, &["c one", "p 4 trav"]);
    let before = session.document().to_text().unwrap();

    let err = session.set_field(1, "subjectId", "many").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Parse(_) | ErrorKind::Validation { .. }));
    assert!(session.set_field(1, "nosuchfield", "1").is_err());
    assert!(session.set_field(9, "subjectId", "1").is_err());
    assert!(session.delete(1, 5).is_err());

    assert_eq!(session.document().to_text().unwrap(), before);
    assert_eq!(session.undo().unwrap(), "Append Fix");
}

#[test]
fn history_size_limits_undo_depth() {
    let mut session = session_with(Preferences::default().with_history_size(2));
    run(&mut session, &["c one", "c two", "c three"]);
    assert!(session.undo().is_ok());
    assert!(session.undo().is_ok());
    assert!(session.undo().is_err());
    assert_eq!(session.document().len(), 1);
}

// =============================================================================
// Switching Documents
// =============================================================================

#[test]
fn new_documents_start_fresh_in_either_format() {
    let prefs = Preferences::default().with_default_document_format(MMRP_FORMAT_NAME);
    let mut session = session_with(prefs);
    assert_eq!(session.document().dialect().name(), MMRP_FORMAT_NAME);
    run(&mut session, &["start", "c hello", "z", "fx b 3 t"]);
    assert_eq!(session.interpreter().state().peek_observation_num(), 4);

    session.new_document(Some(HMMC_FORMAT_NAME)).unwrap();
    assert!(session.document().is_empty());
    assert_eq!(session.interpreter().state().peek_observation_num(), 0);
    assert_eq!(session.interpreter().state().peek_comment_id(), 0);

    // each document gets its own theodolite from the hook
    run(&mut session, &["z"]);
    let theo = session.document().get(0).unwrap();
    assert_eq!(theo.get("azimuth"), Some(&Value::Float(degrees_to_radians(201.12))));
}

#[test]
fn commands_follow_the_open_document_format() {
    let mut session = session();
    assert!(session.execute("fx b 3 t").is_err());
    session.new_document(Some(MMRP_FORMAT_NAME)).unwrap();
    run(&mut session, &["z", "fx b 3 t"]);
    let fix = session.document().get(1).unwrap();
    assert_eq!(fix.get("objectType"), Some(&Value::from("Tursiops pod")));
    assert_eq!(fix.get("behavioralState"), Some(&Value::from("trav")));
}
