//! The main REPL implementation.
//!
//! Lines starting with `:` are meta commands; every other line is a command
//! for the open document's interpreter.

use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::export::ExportFormat;
use crate::session::Session;
use maka_foundation::{Error, ErrorContext, ErrorKind, Result};
use maka_schema::Observation;
use maka_text::{tokenize, unquote};
use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

const META_COMMANDS: [(&str, &str); 12] = [
    (":help", "Show this help"),
    (":list [N]", "List all observations, or the last N"),
    (":show N", "Show the fields of observation N"),
    (":set N FIELD VALUE", "Set a field of observation N; an empty VALUE clears it"),
    (":delete N", "Delete observation N"),
    (":undo", "Undo the last edit"),
    (":redo", "Redo the last undone edit"),
    (":save [PATH]", "Save the document"),
    (":open PATH", "Open a document"),
    (":new [FORMAT]", "Start a new document"),
    (":export json|msgpack PATH", "Export the observations"),
    (":quit", "Leave"),
];

/// What evaluating one line produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// Nothing to show.
    Nothing,
    /// Text to show the user.
    Text(String),
    /// The user asked to leave.
    Quit,
}

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// The open document and its interpreter.
    session: Session,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,

    /// Set by `:quit` on an unsaved document; a second `:quit` leaves.
    quit_pending: bool,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(session: Session) -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor, session))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(editor: E, session: Session) -> Self {
        let mut repl = Self {
            editor,
            session,
            show_banner: true,
            prompt: "maka> ".to_string(),
            quit_pending: false,
        };
        repl.refresh_keywords();
        repl
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Returns a reference to the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns a mutable reference to the session.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Runs the REPL loop until `:quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        loop {
            let line = match self.editor.read_line(&self.prompt)? {
                ReadResult::Line(line) => line,
                ReadResult::Interrupted => continue,
                ReadResult::Eof => break,
            };

            if line.trim().is_empty() {
                continue;
            }
            self.editor.add_history(&line);

            match self.eval(&line) {
                Ok(Response::Nothing) => {}
                Ok(Response::Text(text)) => println!("{text}"),
                Ok(Response::Quit) => break,
                Err(e) => print_error(&e),
            }
        }

        if !self.session.document().is_saved() {
            eprintln!("Unsaved changes were discarded.");
        }
        Ok(())
    }

    /// Evaluates each line of a script, printing responses.
    ///
    /// Stops at the first error or at `:quit`.
    ///
    /// # Errors
    ///
    /// Returns the first error, with `source` and the line number as context.
    pub fn run_script(&mut self, script: &str, source: &str) -> Result<()> {
        for (offset, line) in script.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match self.eval(line) {
                Ok(Response::Nothing) => {}
                Ok(Response::Text(text)) => println!("{text}"),
                Ok(Response::Quit) => break,
                Err(e) => {
                    return Err(e.with_context(
                        ErrorContext::new()
                            .with_source(source)
                            .with_position(offset + 1, 1),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Evaluates one line.
    ///
    /// # Errors
    ///
    /// Returns an error if the command or meta command fails. The document
    /// is unchanged in that case.
    pub fn eval(&mut self, line: &str) -> Result<Response> {
        let trimmed = line.trim_start();
        let quit_pending = std::mem::take(&mut self.quit_pending);

        if !trimmed.starts_with(':') {
            return match self.session.execute(line)? {
                Some(index) => Ok(Response::Text(self.listing_line(index)?)),
                None => Ok(Response::Nothing),
            };
        }

        let args = meta_args(trimmed)?;
        let (name, rest) = args
            .split_first()
            .ok_or_else(|| repl_error("Empty meta command."))?;
        debug!(command = %name, "meta command");

        match (name.as_str(), rest) {
            (":help" | ":h", []) => Ok(Response::Text(self.help())),
            (":list" | ":l", []) => self.list(None),
            (":list" | ":l", [n]) => self.list(Some(parse_count(n)?)),
            (":show", [n]) => self.show(self.position(n)?),
            (":set", [n, field, value @ ..]) => {
                let index = self.position(n)?;
                self.session.set_field(index, field, &value.join(" "))?;
                Ok(Response::Text(self.listing_line(index)?))
            }
            (":delete", [n]) => {
                let index = self.position(n)?;
                self.session.delete(index, index + 1)?;
                Ok(Response::Text(format!("Deleted observation {n}.")))
            }
            (":undo", []) => Ok(Response::Text(format!("Undid {}.", self.session.undo()?))),
            (":redo", []) => Ok(Response::Text(format!("Redid {}.", self.session.redo()?))),
            (":save", []) => self.save(None),
            (":save", [path]) => self.save(Some(Path::new(path))),
            (":open", [path]) => {
                self.session.open(path)?;
                self.refresh_keywords();
                Ok(Response::Text(format!(
                    "Opened {path}: {} observations in {}.",
                    self.session.document().len(),
                    self.session.document().dialect().name()
                )))
            }
            (":new", []) => self.new_document(None),
            (":new", [format]) => self.new_document(Some(format.as_str())),
            (":export", [format, path]) => {
                let format: ExportFormat = format.parse()?;
                self.session.export(format, path)?;
                Ok(Response::Text(format!("Exported {format} to {path}.")))
            }
            (":quit" | ":q", []) => {
                if self.session.document().is_saved() || quit_pending {
                    Ok(Response::Quit)
                } else {
                    self.quit_pending = true;
                    Ok(Response::Text(
                        "The document has unsaved changes. Use :save, or :quit again to discard them."
                            .to_string(),
                    ))
                }
            }
            _ => Err(repl_error(format!(
                "Unrecognized meta command \"{}\". Type :help for help.",
                trimmed.trim_end()
            ))),
        }
    }

    fn list(&self, last: Option<usize>) -> Result<Response> {
        let len = self.session.document().len();
        if len == 0 {
            return Ok(Response::Text("The document is empty.".to_string()));
        }
        let start = last.map_or(0, |n| len.saturating_sub(n));
        let lines = (start..len)
            .map(|i| self.listing_line(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(Response::Text(lines.join("\n")))
    }

    fn show(&self, index: usize) -> Result<Response> {
        let observation = self.observation(index)?;
        let mut text = format!("{} {}", index + 1, observation.type_name());
        for (field, value) in observation.fields() {
            let _ = write!(text, "\n  {}: {}", field.name, field.format(value, true));
            if let Some(units) = &field.units {
                let _ = write!(text, " ({units})");
            }
        }
        Ok(Response::Text(text))
    }

    fn save(&mut self, path: Option<&Path>) -> Result<Response> {
        let path = self.session.save(path)?;
        Ok(Response::Text(format!("Saved {}.", path.display())))
    }

    fn new_document(&mut self, format: Option<&str>) -> Result<Response> {
        self.session.new_document(format)?;
        self.refresh_keywords();
        Ok(Response::Text(format!(
            "New {} document.",
            self.session.document().dialect().name()
        )))
    }

    fn help(&self) -> String {
        let mut text = String::from("Meta commands:\n");
        for (usage, description) in META_COMMANDS {
            let _ = writeln!(text, "  {usage:<28}{description}");
        }
        let grammar = self.session.interpreter().grammar();
        let _ = write!(text, "\nCommands ({}):", grammar.name());
        for command in grammar.commands() {
            let _ = write!(
                text,
                "\n  {:<28}{}",
                command.usage(),
                command.observation_type().name()
            );
        }
        text
    }

    /// Formats observation `index` as a 1-based listing line.
    fn listing_line(&self, index: usize) -> Result<String> {
        let document = self.session.document();
        let line = document
            .dialect()
            .document_format()
            .format_observation(self.observation(index)?)?;
        Ok(format!("{:>5}  {line}", index + 1))
    }

    fn observation(&self, index: usize) -> Result<&Observation> {
        let document = self.session.document();
        document.get(index).ok_or_else(|| {
            repl_error(format!(
                "There is no observation {}; the document has {}.",
                index + 1,
                document.len()
            ))
        })
    }

    /// Converts a 1-based position argument to an index.
    fn position(&self, text: &str) -> Result<usize> {
        let position = parse_count(text)?;
        let len = self.session.document().len();
        if position == 0 || position > len {
            return Err(repl_error(format!(
                "There is no observation {position}; the document has {len}."
            )));
        }
        Ok(position - 1)
    }

    fn refresh_keywords(&mut self) {
        let grammar = self.session.interpreter().grammar();
        let keywords = grammar
            .command_names()
            .map(String::from)
            .chain(META_COMMANDS.iter().filter_map(|(usage, _)| {
                usage.split_whitespace().next().map(String::from)
            }))
            .collect();
        self.editor.set_keywords(keywords);
    }

    /// Prints the welcome banner.
    fn print_banner(&self) {
        println!("\x1b[1;36mMaka\x1b[0m {}", env!("CARGO_PKG_VERSION"));
        println!(
            "Editing a {} document. Type :help for help, Ctrl+D to exit.\n",
            self.session.document().dialect().name()
        );

        // Flush to ensure banner appears
        let _ = io::stdout().flush();
    }
}

/// Prints an error to stderr.
pub fn print_error(error: &Error) {
    match &error.context {
        Some(context) => eprintln!("\x1b[31mError {context}: {}\x1b[0m", error.message()),
        None => eprintln!("\x1b[31mError: {}\x1b[0m", error.message()),
    }
}

fn repl_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::Internal(message.into()))
}

/// Splits a meta command line into unquoted arguments.
fn meta_args(line: &str) -> Result<Vec<String>> {
    tokenize(line)?
        .into_iter()
        .map(|token| {
            if token.quoted {
                unquote(&token.text)
            } else {
                Ok(token.text)
            }
        })
        .collect()
}

fn parse_count(text: &str) -> Result<usize> {
    text.parse()
        .map_err(|_| repl_error(format!("\"{text}\" is not a number.")))
}
