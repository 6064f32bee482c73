//! Integration tests for quoting helpers

use maka_text::{is_unquoted_token, quote, tokenize, unquote};

#[test]
fn quote_escapes_quotes_and_backslashes() {
    assert_eq!(quote("calm seas"), "\"calm seas\"");
    assert_eq!(quote(r#"say "hi""#), r#""say \"hi\"""#);
    assert_eq!(quote(r"a\b"), r#""a\\b""#);
    assert_eq!(quote(""), "\"\"");
}

#[test]
fn unquote_resolves_escapes() {
    assert_eq!(unquote(r#""say \"hi\"""#).unwrap(), r#"say "hi""#);
    assert_eq!(unquote(r#""a\\b""#).unwrap(), r"a\b");
    assert_eq!(unquote("\"\"").unwrap(), "");
}

#[test]
fn unquote_rejects_bad_input() {
    assert!(unquote("bare").is_err());
    assert!(unquote(r#""a\tb""#).is_err());
    assert!(unquote(r#""a"b""#).is_err());
}

#[test]
fn bare_token_test() {
    assert!(is_unquoted_token("Pod"));
    assert!(is_unquoted_token("10:16:00"));
    assert!(!is_unquoted_token(""));
    assert!(!is_unquoted_token("Old Ruins"));
    assert!(!is_unquoted_token("a\"b"));
}

#[test]
fn quoted_text_scans_back_to_itself() {
    for text in ["Old Ruins", r#"the "big" one"#, r"back\slash", "", "tab\there"] {
        let line = format!("c {} 4", quote(text));
        let tokens = tokenize(&line).unwrap();
        assert_eq!(tokens.len(), 3, "{line}");
        assert_eq!(unquote(&tokens[1].text).unwrap(), text);
    }
}
