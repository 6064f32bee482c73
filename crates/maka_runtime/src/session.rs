//! Session state for the REPL.
//!
//! A session holds one open document and the interpreter that feeds it.
//! Replacing the document always replaces the interpreter too, so counters
//! and saved readings never leak between documents.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use maka_command::{CommandInterpreter, InterpreterState};
use maka_foundation::{Error, ErrorKind, Result};
use maka_schema::FieldValues;
use tracing::{debug, info};

use crate::config::Preferences;
use crate::container;
use crate::document::Document;
use crate::export::{self, ExportFormat};
use crate::registry::{Registry, THEODOLITE_DEVICE};

/// Adjusts the interpreter state of each newly installed document.
pub type StateHook = Box<dyn Fn(InterpreterState) -> InterpreterState>;

/// One open document and its interpreter.
pub struct Session {
    registry: Arc<Registry>,
    preferences: Preferences,
    document: Document,
    interpreter: CommandInterpreter,
    state_hook: Option<StateHook>,
}

impl Session {
    /// Creates a session with a new, empty document in the preferred format.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the preferred format is unknown.
    pub fn new(registry: Arc<Registry>, preferences: Preferences) -> Result<Self> {
        let dialect = registry
            .require_dialect(&preferences.default_document_format)?
            .clone();
        let document = Document::new(dialect).with_history_capacity(preferences.history_size);
        let interpreter = build_interpreter(&registry, &preferences, &document, None);
        Ok(Self {
            registry,
            preferences,
            document,
            interpreter,
            state_hook: None,
        })
    }

    /// Sets a hook applied to the interpreter state of every document,
    /// including the current one.
    #[must_use]
    pub fn with_state_hook(mut self, hook: StateHook) -> Self {
        self.state_hook = Some(hook);
        self.rebuild_interpreter();
        self
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Returns the preferences.
    #[must_use]
    pub const fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Returns the open document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Returns the interpreter.
    #[must_use]
    pub const fn interpreter(&self) -> &CommandInterpreter {
        &self.interpreter
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Replaces the open document with a new, empty one in `format`, or in
    /// the preferred format.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the format is unknown.
    pub fn new_document(&mut self, format: Option<&str>) -> Result<()> {
        let name = format.unwrap_or(&self.preferences.default_document_format);
        let dialect = self.registry.require_dialect(name)?.clone();
        info!(format = dialect.name(), "new document");
        self.install(Document::new(dialect).with_history_capacity(self.preferences.history_size));
        Ok(())
    }

    /// Replaces the open document with the one at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed. The open
    /// document is kept.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let document = container::open(path, &self.registry, &self.preferences)?;
        self.install(document);
        Ok(())
    }

    /// Saves the open document to `path`, or to its own path.
    ///
    /// Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no path and none is given, or
    /// if writing fails.
    pub fn save(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        let path = path
            .or_else(|| self.document.file_path())
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                Error::new(ErrorKind::Io(
                    "The document has no file; give a path to save to.".to_string(),
                ))
            })?;
        container::save(&mut self.document, &path)?;
        Ok(path)
    }

    /// Sets the file the open document is saved to.
    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.document.set_file_path(path);
    }

    /// Exports the open document.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn export(&self, format: ExportFormat, path: impl AsRef<Path>) -> Result<()> {
        export::export_to_file(&self.document, format, path)
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Interprets a command line and appends the resulting observation.
    ///
    /// Returns the observation's index, or `None` for a blank line.
    ///
    /// # Errors
    ///
    /// Returns the interpreter's error; the document is unchanged.
    pub fn execute(&mut self, line: &str) -> Result<Option<usize>> {
        let Some(observation) = self.interpreter.interpret(line)? else {
            return Ok(None);
        };
        self.document.append(observation)?;
        let index = self.document.len() - 1;
        debug!(index, "appended observation");
        Ok(Some(index))
    }

    /// Sets one field of the observation at `index` from editing text.
    ///
    /// Empty text clears the field.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no such observation or field, or the
    /// text is not a valid value.
    pub fn set_field(&mut self, index: usize, field: &str, text: &str) -> Result<()> {
        let observation = self.document.get(index).ok_or_else(|| {
            Error::new(ErrorKind::Internal(format!(
                "There is no observation {}; the document has {}.",
                index + 1,
                self.document.len()
            )))
        })?;
        let descriptor = observation.observation_type().field(field).ok_or_else(|| {
            Error::validation(
                field,
                text,
                format!("is not a field of observation type \"{}\"", observation.type_name()),
            )
        })?;
        let value = descriptor.parse(text, true)?;

        let mut changes = FieldValues::new();
        changes.insert(field.to_string(), value);
        self.document.replace_with_changes(index, changes)
    }

    /// Deletes the observations in `start..end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds.
    pub fn delete(&mut self, start: usize, end: usize) -> Result<()> {
        self.document.delete(start, end)
    }

    /// Undoes the last edit, returning its name.
    ///
    /// # Errors
    ///
    /// Returns an error if there is nothing to undo.
    pub fn undo(&mut self) -> Result<String> {
        self.document.undo()
    }

    /// Redoes the last undone edit, returning its name.
    ///
    /// # Errors
    ///
    /// Returns an error if there is nothing to redo.
    pub fn redo(&mut self) -> Result<String> {
        self.document.redo()
    }

    fn install(&mut self, document: Document) {
        self.document = document;
        self.rebuild_interpreter();
    }

    fn rebuild_interpreter(&mut self) {
        self.interpreter = build_interpreter(
            &self.registry,
            &self.preferences,
            &self.document,
            self.state_hook.as_ref(),
        );
    }
}

fn build_interpreter(
    registry: &Registry,
    preferences: &Preferences,
    document: &Document,
    hook: Option<&StateHook>,
) -> CommandInterpreter {
    let dialect = document.dialect();
    let state = dialect
        .state(document.observations())
        .with_device_source(registry.device_source(preferences, THEODOLITE_DEVICE));
    let state = match hook {
        Some(hook) => hook(state),
        None => state,
    };
    dialect.interpreter_with(state)
}
