//! Integration tests for document text in both dialects

use maka_dialect::{HMMC_FORMAT_NAME, hmmc, mmrp};
use maka_foundation::{ErrorKind, Value};
use maka_schema::FieldValues;

const HMMC_TEXT: &str = "\
Station* 1 \"Old Ruins\" Lat 20 4.925283850520 Lon -155 51.794984516976 El 65.6 MagDec 10:16:00
Observer* asf \"Adam Frankel\"
00000 2013-07-29 09:15:00 Start*
00001 2013-07-29 09:15:02 TheoData* Dec 91:30:00 Az 201:07:12
00002 2013-07-29 09:15:02 Fix* Dec 91:30:00 Az 201:07:12 Pod 4 State trav
00003 2013-07-29 09:16:10 Comment* 0 \"calm seas\"
00004 2013-07-29 09:17:00 Environment* Visibility 5 Beaufort 2 Swell 1.5
00005 2013-07-29 09:18:00 Lag* 3
";

#[test]
fn hmmc_document_round_trips() {
    let dialect = hmmc().unwrap();
    let format = dialect.document_format();
    assert_eq!(format.name(), HMMC_FORMAT_NAME);

    let observations = format.parse_document(HMMC_TEXT, 1).unwrap();
    assert_eq!(observations.len(), 8);
    let types: Vec<&str> = observations.iter().map(|o| o.type_name()).collect();
    assert_eq!(
        types,
        ["Station", "Observer", "Start", "TheoData", "Fix", "Comment", "Environment", "Lag"]
    );
    assert_eq!(observations[5].get("text"), Some(&Value::from("calm seas")));
    assert_eq!(format.format_document(&observations).unwrap(), HMMC_TEXT);
}

#[test]
fn blank_and_comment_lines_are_skipped() {
    let dialect = hmmc().unwrap();
    let text = "\n# field notes\n00000 2013-07-29 09:15:00 Start*\n   \n";
    let observations = dialect.document_format().parse_document(text, 1).unwrap();
    assert_eq!(observations.len(), 1);
}

#[test]
fn errors_carry_the_file_line_number() {
    let dialect = hmmc().unwrap();
    let text = "\
00000 2013-07-29 09:15:00 Start*

00001 2013-07-29 09:15:02 Environment* Visibility 9 Beaufort 2 Swell 1.5
";
    let err = dialect.document_format().parse_document(text, 3).unwrap_err();
    match err.kind {
        ErrorKind::DocumentFormat { line, .. } => assert_eq!(line, 5),
        other => panic!("unexpected kind: {other:?}"),
    }
}

#[test]
fn unrecognized_lines_are_rejected() {
    let dialect = hmmc().unwrap();
    let err = dialect
        .document_format()
        .parse_observation("00000 2013-07-29 09:15:00 Sunset*", 1)
        .unwrap_err();
    assert_eq!(err.message(), "Unrecognized observation line.");

    let err = dialect
        .document_format()
        .parse_observation("00000 \"2013-07-29", 2)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DocumentFormat { line: 2, .. }));
}

#[test]
fn formats_differ_between_dialects() {
    let hmmc = hmmc().unwrap();
    let mmrp = mmrp().unwrap();
    assert_ne!(hmmc.name(), mmrp.name());

    let line = "00004 2013-07-29 09:17:00 Environment* Visibility 5 Beaufort 2 Swell 1.5";
    let obs = hmmc.document_format().parse_observation(line, 1).unwrap();
    assert!(mmrp.document_format().template(obs.type_name()).is_some());
}

#[test]
fn last_azimuth_below_a_full_turn_reopens() {
    let dialect = hmmc().unwrap();
    let format = dialect.document_format();
    let azimuth = f64::from_bits(std::f64::consts::TAU.to_bits() - 1);

    let mut values = FieldValues::new();
    values.insert("id".to_string(), Some(Value::Integer(1)));
    values.insert("name".to_string(), Some(Value::from("Lighthouse")));
    values.insert("azimuth".to_string(), Some(Value::Float(azimuth)));
    let reference = dialect
        .schema()
        .get("Reference")
        .unwrap()
        .construct(values)
        .unwrap();

    let line = format.format_observation(&reference).unwrap();
    assert_eq!(line, "Reference* 1 Lighthouse Azimuth 359:59:59.99");
    let parsed = format.parse_observation(&line, 1).unwrap();
    assert_eq!(format.format_observation(&parsed).unwrap(), line);
}
