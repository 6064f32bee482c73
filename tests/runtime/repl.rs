//! Integration tests for the REPL
//!
//! Tests whole editing sessions driven through a scripted line editor.

use std::path::PathBuf;
use std::sync::Arc;

use maka_command::{FixedClock, ScriptedTheodolite};
use maka_dialect::{HMMC_FORMAT_NAME, MMRP_FORMAT_NAME};
use maka_foundation::Result;
use maka_foundation::angle::degrees_to_radians;
use maka_runtime::{LineEditor, Preferences, ReadResult, Registry, Repl, Response, Session};
use time::macros::{date, time};

// =============================================================================
// Test Helpers
// =============================================================================

/// Line editor that replays fixed input; `^C` reads as an interrupt.
struct MockEditor {
    inputs: Vec<String>,
    index: usize,
}

impl MockEditor {
    fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| (*s).to_string()).collect(),
            index: 0,
        }
    }
}

impl LineEditor for MockEditor {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
        let Some(line) = self.inputs.get(self.index) else {
            return Ok(ReadResult::Eof);
        };
        self.index += 1;
        if line == "^C" {
            return Ok(ReadResult::Interrupted);
        }
        Ok(ReadResult::Line(line.clone()))
    }

    fn add_history(&mut self, _line: &str) {}

    fn set_keywords(&mut self, _keywords: Vec<String>) {}
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("maka-it-{}-{name}", std::process::id()))
}

fn repl(inputs: &[&str]) -> Repl<MockEditor> {
    let registry = Arc::new(Registry::builtin().unwrap());
    let session = Session::new(registry, Preferences::default())
        .unwrap()
        .with_state_hook(Box::new(|state| {
            state
                .with_clock(FixedClock::new(date!(2013 - 07 - 29), time!(9:15:02)))
                .with_theodolite(ScriptedTheodolite::new([(
                    Some(degrees_to_radians(91.5)),
                    Some(degrees_to_radians(201.12)),
                )]))
        }));
    Repl::with_editor(MockEditor::new(inputs), session).without_banner()
}

fn text(response: Response) -> String {
    match response {
        Response::Text(text) => text,
        other => panic!("expected text, got {other:?}"),
    }
}

// =============================================================================
// Evaluating Lines
// =============================================================================

#[test]
fn observing_and_listing() {
    let mut repl = repl(&[]);
    assert_eq!(
        text(repl.eval("c \"calm seas\"").unwrap()),
        "    1  00000 2013-07-29 09:15:02 Comment* 0 \"calm seas\""
    );
    repl.eval("z").unwrap();
    assert_eq!(
        text(repl.eval("p4 trav").unwrap()),
        "    3  00002 2013-07-29 09:15:02 Fix* Dec 91:30:00 Az 201:07:12 Pod 4 State trav"
    );

    let listing = text(repl.eval(":list").unwrap());
    assert_eq!(listing.lines().count(), 3);
    assert!(listing.lines().nth(1).unwrap().starts_with("    2  00001"));

    let shown = text(repl.eval(":show 3").unwrap());
    assert!(shown.starts_with("3 Fix"));
    assert!(shown.contains("  subjectState: trav"));
}

#[test]
fn errors_leave_the_document_alone() {
    let mut repl = repl(&[]);
    repl.eval("c one").unwrap();

    let err = repl.eval("p x trav").unwrap_err();
    assert!(err.message().contains("subjectId"));
    assert!(repl.eval(":set 1 id many").is_err());
    assert!(repl.eval(":delete 2").is_err());

    assert_eq!(repl.session().document().len(), 1);
    assert_eq!(text(repl.eval(":undo").unwrap()), "Undid Append Comment.");
    assert!(repl.eval(":undo").is_err());
}

#[test]
fn empty_document_listing() {
    let mut repl = repl(&[]);
    assert_eq!(text(repl.eval(":list").unwrap()), "The document is empty.");
}

// =============================================================================
// Files
// =============================================================================

#[test]
fn save_new_open_round_trip() {
    let path = temp_path("repl.maka");
    let path_text = path.display().to_string();
    let mut repl = repl(&[]);

    repl.eval("c \"calm seas\"").unwrap();
    repl.eval("z").unwrap();
    assert!(repl.eval(":save").is_err());
    assert_eq!(
        text(repl.eval(&format!(":save \"{path_text}\"")).unwrap()),
        format!("Saved {path_text}.")
    );
    assert_eq!(repl.eval(":quit").unwrap(), Response::Quit);

    assert_eq!(
        text(repl.eval(&format!(":new \"{MMRP_FORMAT_NAME}\"")).unwrap()),
        format!("New {MMRP_FORMAT_NAME} document.")
    );
    assert!(repl.eval(":new \"Nope 1.0\"").is_err());

    assert_eq!(
        text(repl.eval(&format!(":open \"{path_text}\"")).unwrap()),
        format!("Opened {path_text}: 2 observations in {HMMC_FORMAT_NAME}.")
    );
    assert_eq!(
        text(repl.eval("c again").unwrap()),
        "    3  00002 2013-07-29 09:15:02 Comment* 1 again"
    );
    assert_eq!(text(repl.eval(":save").unwrap()), format!("Saved {path_text}."));

    std::fs::remove_file(path).unwrap();
}

#[test]
fn export_meta_command() {
    let path = temp_path("repl.json");
    let path_text = path.display().to_string();
    let mut repl = repl(&[]);
    repl.eval("c \"calm seas\"").unwrap();

    assert_eq!(
        text(repl.eval(&format!(":export json \"{path_text}\"")).unwrap()),
        format!("Exported json to {path_text}.")
    );
    let json: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(json["observations"][0]["fields"]["text"], "calm seas");
    assert!(repl.eval(&format!(":export xml \"{path_text}\"")).is_err());

    std::fs::remove_file(path).unwrap();
}

// =============================================================================
// Running
// =============================================================================

#[test]
fn run_reads_until_quit() {
    let mut repl = repl(&["c one", "", "^C", ":bogus", "z", ":quit", ":quit", "c never"]);
    repl.run().unwrap();

    assert_eq!(repl.session().document().len(), 2);
    assert!(!repl.session().document().is_saved());
}

#[test]
fn scripts_run_in_batch() {
    let mut repl = repl(&[]);
    let script = "\
# morning watch
c \"calm seas\"
z
p 4 trav

:new \"'96 MMRP Grammar 1.01\"
start
fx b 3 t
";
    repl.run_script(script, "watch.txt").unwrap();
    let document = repl.session().document();
    assert_eq!(document.dialect().name(), MMRP_FORMAT_NAME);
    assert_eq!(document.len(), 2);
    assert_eq!(document.get(1).unwrap().type_name(), "Fix");
}

#[test]
fn scripts_report_the_failing_line() {
    let mut repl = repl(&[]);
    let err = repl
        .run_script("c one\nz\n\nzz 1\nc two\n", "watch.txt")
        .unwrap_err();
    let context = err.context.unwrap();
    assert_eq!(context.line, Some(4));
    assert_eq!(context.source.as_deref(), Some("watch.txt"));
    assert_eq!(repl.session().document().len(), 2);
}
