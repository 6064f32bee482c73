//! Integration tests for serial counters
//!
//! Tests seeding from existing observations and advancing on use.

use maka_command::{CounterSpec, InterpreterState, SerialNumberGenerator};
use maka_dialect::hmmc;
use maka_foundation::Value;

const DOCUMENT: &str = "\
00003 2013-07-29 09:15:00 Start*
00007 2013-07-29 09:15:02 Comment* 4 \"first\"
00005 2013-07-29 09:15:09 Comment* 2 \"second\"
Pod* 11 Whales 2 Calves 1 Singers 0
";

#[test]
fn generator_continues_after_the_maximum() {
    let mut generator = SerialNumberGenerator::seeded([3, 7, 5], 0);
    assert_eq!(generator.next_number(), 8);
    assert_eq!(generator.next_number(), 9);
    assert_eq!(generator.peek(), 10);

    let mut empty = SerialNumberGenerator::seeded(std::iter::empty(), 100);
    assert_eq!(empty.next_number(), 100);
}

#[test]
fn observation_numbers_seed_from_the_document() {
    let dialect = hmmc().unwrap();
    let observations = dialect.document_format().parse_document(DOCUMENT, 1).unwrap();
    let mut interp = dialect.interpreter(observations.iter());
    assert_eq!(interp.state().peek_observation_num(), 8);

    let start = interp.interpret("c next").unwrap().unwrap();
    assert_eq!(start.get("observationNum"), Some(&Value::Integer(8)));
}

#[test]
fn comment_ids_count_only_comments() {
    let dialect = hmmc().unwrap();
    let observations = dialect.document_format().parse_document(DOCUMENT, 1).unwrap();
    let mut interp = dialect.interpreter(observations.iter());
    assert_eq!(interp.state().peek_comment_id(), 5);

    let c = interp.interpret("c next").unwrap().unwrap();
    assert_eq!(c.get("id"), Some(&Value::Integer(5)));
    assert_eq!(interp.state().peek_comment_id(), 6);
}

#[test]
fn empty_documents_start_at_the_default() {
    let dialect = hmmc().unwrap();
    let state = dialect.state(std::iter::empty());
    assert_eq!(state.peek_observation_num(), 0);
    assert_eq!(state.peek_comment_id(), 0);
}

#[test]
fn counter_specs_can_start_elsewhere() {
    let dialect = hmmc().unwrap();
    let spec = CounterSpec::field("id").on_type("Comment").starting_at(1);
    assert_eq!(spec.generator(std::iter::empty()).peek(), 1);

    let observations = dialect.document_format().parse_document(DOCUMENT, 1).unwrap();
    let pod = &observations[3];
    assert_eq!(spec.number_of(pod), None);
    assert_eq!(CounterSpec::field("id").number_of(pod), Some(11));
}

#[test]
fn states_are_independent_per_document() {
    let dialect = hmmc().unwrap();
    let observations = dialect.document_format().parse_document(DOCUMENT, 1).unwrap();
    let seeded = InterpreterState::new(dialect.grammar(), observations.iter());
    let mut fresh = dialect.interpreter(std::iter::empty());
    fresh.interpret("c one").unwrap();
    assert_eq!(fresh.state().peek_observation_num(), 1);
    assert_eq!(seeded.peek_observation_num(), 8);
}
