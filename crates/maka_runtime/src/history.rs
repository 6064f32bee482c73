//! Undoable edits and the edit history of a document.
//!
//! Every change to a document is one [`Edit`]: a named replacement of a
//! contiguous run of observations. Undoing an edit applies its inverse.

use std::collections::VecDeque;

use maka_foundation::{Error, ErrorKind, Result};
use maka_schema::Observation;

// =============================================================================
// Edit
// =============================================================================

/// Replacement of the observations at `start..start + removed.len()` with
/// `inserted`.
#[derive(Clone, Debug, PartialEq)]
pub struct Edit {
    name: String,
    start: usize,
    removed: Vec<Observation>,
    inserted: Vec<Observation>,
}

impl Edit {
    /// Creates an edit.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        start: usize,
        removed: Vec<Observation>,
        inserted: Vec<Observation>,
    ) -> Self {
        Self {
            name: name.into(),
            start,
            removed,
            inserted,
        }
    }

    /// Returns the edit's name, e.g. `Append Fix`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the index of the first affected observation.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Returns the observations the edit removes.
    #[must_use]
    pub fn removed(&self) -> &[Observation] {
        &self.removed
    }

    /// Returns the observations the edit inserts.
    #[must_use]
    pub fn inserted(&self) -> &[Observation] {
        &self.inserted
    }

    /// Returns the edit that undoes this one.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            name: self.name.clone(),
            start: self.start,
            removed: self.inserted.clone(),
            inserted: self.removed.clone(),
        }
    }
}

// =============================================================================
// Edit History
// =============================================================================

/// Default number of edits kept for undo.
pub const DEFAULT_HISTORY_SIZE: usize = 1000;

/// Linear undo/redo history with saved-state tracking.
///
/// Edits before `redo_index` are done; edits from it on can be redone.
/// `saved_index` is the `redo_index` at the last save, or `None` once that
/// state can no longer be reached.
#[derive(Clone, Debug)]
pub struct EditHistory {
    edits: VecDeque<Edit>,
    redo_index: usize,
    saved_index: Option<usize>,
    capacity: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

impl EditHistory {
    /// Creates an empty history keeping at most `capacity` edits.
    ///
    /// A new history counts as saved.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            edits: VecDeque::with_capacity(capacity.min(64)),
            redo_index: 0,
            saved_index: Some(0),
            capacity: capacity.max(1),
        }
    }

    /// Forgets every edit and counts the current state as saved.
    pub fn clear(&mut self) {
        self.edits.clear();
        self.redo_index = 0;
        self.saved_index = Some(0);
    }

    /// Returns the maximum number of edits kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of edits held, done or undone.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Returns true if there are no edits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Returns true if the document is in the state of its last save.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.saved_index == Some(self.redo_index)
    }

    /// Records that the document was just saved.
    pub fn mark_saved(&mut self) {
        self.saved_index = Some(self.redo_index);
    }

    /// Records a newly applied edit, discarding any undone edits.
    ///
    /// If the history is full, the oldest edit is forgotten.
    pub fn append(&mut self, edit: Edit) {
        if self.redo_index != self.edits.len() {
            self.edits.truncate(self.redo_index);
            if self.saved_index.is_some_and(|i| i > self.edits.len()) {
                self.saved_index = None;
            }
        }

        self.edits.push_back(edit);
        self.redo_index = self.edits.len();

        if self.edits.len() > self.capacity {
            self.edits.pop_front();
            self.redo_index -= 1;
            self.saved_index = self.saved_index.and_then(|i| i.checked_sub(1));
        }
    }

    /// Returns the name of the edit `undo` would revert.
    #[must_use]
    pub fn undo_name(&self) -> Option<&str> {
        self.redo_index
            .checked_sub(1)
            .and_then(|i| self.edits.get(i))
            .map(Edit::name)
    }

    /// Returns the name of the edit `redo` would reapply.
    #[must_use]
    pub fn redo_name(&self) -> Option<&str> {
        self.edits.get(self.redo_index).map(Edit::name)
    }

    /// Steps back one edit, returning the edit to apply to revert it.
    ///
    /// # Errors
    ///
    /// Returns an error if there is nothing to undo.
    pub fn undo(&mut self) -> Result<Edit> {
        let index = self
            .redo_index
            .checked_sub(1)
            .ok_or_else(|| Error::new(ErrorKind::Internal("No edits to undo.".to_string())))?;
        let inverse = self.edits[index].inverse();
        self.redo_index = index;
        Ok(inverse)
    }

    /// Steps forward one edit, returning the edit to reapply.
    ///
    /// # Errors
    ///
    /// Returns an error if there is nothing to redo.
    pub fn redo(&mut self) -> Result<Edit> {
        let edit = self
            .edits
            .get(self.redo_index)
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::Internal("No edits to redo.".to_string())))?;
        self.redo_index += 1;
        Ok(edit)
    }
}
