//! An open observation document.

use std::path::{Path, PathBuf};

use im::Vector;
use maka_dialect::Dialect;
use maka_foundation::{Error, ErrorKind, Result};
use maka_schema::{FieldValues, Observation};
use tracing::debug;

use crate::history::{Edit, EditHistory};

/// An ordered sequence of observations in one dialect, with undo.
#[derive(Clone, Debug)]
pub struct Document {
    dialect: Dialect,
    observations: Vector<Observation>,
    file_path: Option<PathBuf>,
    history: EditHistory,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            observations: Vector::new(),
            file_path: None,
            history: EditHistory::default(),
        }
    }

    /// Creates a document holding `observations`, counted as saved.
    #[must_use]
    pub fn from_observations(
        dialect: Dialect,
        observations: impl IntoIterator<Item = Observation>,
    ) -> Self {
        Self {
            dialect,
            observations: observations.into_iter().collect(),
            file_path: None,
            history: EditHistory::default(),
        }
    }

    /// Sets the number of edits kept for undo, forgetting current edits.
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history = EditHistory::new(capacity);
        self
    }

    /// Sets the file the document was read from or is saved to.
    #[must_use]
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Returns the document's dialect.
    #[must_use]
    pub const fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Returns the observations.
    #[must_use]
    pub const fn observations(&self) -> &Vector<Observation> {
        &self.observations
    }

    /// Returns the observation at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Observation> {
        self.observations.get(index)
    }

    /// Returns the number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns true if the document has no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Returns the document's file path, if any.
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Sets the document's file path.
    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    /// Returns the edit history.
    #[must_use]
    pub const fn history(&self) -> &EditHistory {
        &self.history
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Replaces the observations in `start..end` with `inserted` as one
    /// undoable edit named `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds or an inserted
    /// observation has a type the document format cannot write.
    pub fn edit(
        &mut self,
        name: impl Into<String>,
        start: usize,
        end: usize,
        inserted: Vec<Observation>,
    ) -> Result<()> {
        if start > end || end > self.observations.len() {
            return Err(Error::new(ErrorKind::Internal(format!(
                "Observation range {start}..{end} is outside the document, which has {} observations.",
                self.observations.len()
            ))));
        }

        let format = self.dialect.document_format();
        if let Some(bad) = inserted
            .iter()
            .find(|o| format.template(o.type_name()).is_none())
        {
            return Err(Error::new(ErrorKind::Internal(format!(
                "Document format \"{}\" has no {} observations.",
                format.name(),
                bad.type_name()
            ))));
        }

        let removed: Vec<Observation> = self
            .observations
            .iter()
            .skip(start)
            .take(end - start)
            .cloned()
            .collect();
        let edit = Edit::new(name, start, removed, inserted);
        self.apply(&edit);
        debug!(edit = edit.name(), start, "applied edit");
        self.history.append(edit);
        Ok(())
    }

    /// Appends an observation.
    ///
    /// # Errors
    ///
    /// Returns an error if the document format cannot write the observation.
    pub fn append(&mut self, observation: Observation) -> Result<()> {
        let end = self.observations.len();
        let name = format!("Append {}", observation.type_name());
        self.edit(name, end, end, vec![observation])
    }

    /// Inserts an observation before `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is past the end or the document format
    /// cannot write the observation.
    pub fn insert(&mut self, index: usize, observation: Observation) -> Result<()> {
        let name = format!("Insert {}", observation.type_name());
        self.edit(name, index, index, vec![observation])
    }

    /// Replaces the observation at `index` with a copy carrying `changes`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no such observation or a change is
    /// invalid.
    pub fn replace_with_changes(&mut self, index: usize, changes: FieldValues) -> Result<()> {
        let current = self.require(index)?;
        let changed = current.with_changes(changes)?;
        let name = format!("Edit {}", changed.type_name());
        self.edit(name, index, index + 1, vec![changed])
    }

    /// Deletes the observations in `start..end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds.
    pub fn delete(&mut self, start: usize, end: usize) -> Result<()> {
        self.edit("Delete", start, end, Vec::new())
    }

    /// Reverts the last edit, returning its name.
    ///
    /// # Errors
    ///
    /// Returns an error if there is nothing to undo.
    pub fn undo(&mut self) -> Result<String> {
        let inverse = self.history.undo()?;
        self.apply(&inverse);
        debug!(edit = inverse.name(), "undid edit");
        Ok(inverse.name().to_string())
    }

    /// Reapplies the last undone edit, returning its name.
    ///
    /// # Errors
    ///
    /// Returns an error if there is nothing to redo.
    pub fn redo(&mut self) -> Result<String> {
        let edit = self.history.redo()?;
        self.apply(&edit);
        debug!(edit = edit.name(), "redid edit");
        Ok(edit.name().to_string())
    }

    /// Returns true if the document matches its last saved state.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.history.is_saved()
    }

    /// Records that the document was just saved.
    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    /// Formats the observations as document text, one line each.
    ///
    /// # Errors
    ///
    /// Returns an error if an observation cannot be formatted.
    pub fn to_text(&self) -> Result<String> {
        self.dialect
            .document_format()
            .format_document(&self.observations)
    }

    fn require(&self, index: usize) -> Result<&Observation> {
        self.observations.get(index).ok_or_else(|| {
            Error::new(ErrorKind::Internal(format!(
                "There is no observation {}; the document has {}.",
                index + 1,
                self.observations.len()
            )))
        })
    }

    fn apply(&mut self, edit: &Edit) {
        let mut tail = self.observations.split_off(edit.start());
        let tail = tail.split_off(edit.removed().len());
        self.observations.extend(edit.inserted().iter().cloned());
        self.observations.append(tail);
    }
}
