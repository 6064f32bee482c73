//! Observation dialects for Maka.
//!
//! This crate provides:
//! - [`Dialect`] - A document format and command grammar over one schema
//! - [`hmmc`] - The HMMC 1.01 dialect
//! - [`mmrp`] - The '96 MMRP 1.01 dialect
//! - [`fields`] and [`prototypes`] - Field descriptors and command defaults the dialects share
//!
//! A dialect is built once at startup. Building fails with a grammar error if
//! a template or command disagrees with the schema, so a running program never
//! holds an inconsistent dialect.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod fields;
pub mod hmmc;
pub mod mmrp;
pub mod prototypes;

use std::sync::Arc;

use maka_command::{CommandInterpreter, Grammar, InterpreterState};
use maka_foundation::{Error, Result};
use maka_format::DocumentFormat;
use maka_schema::{Observation, Schema};

pub use hmmc::{HMMC_FORMAT_NAME, HMMC_GRAMMAR_NAME};
pub use mmrp::{MMRP_FORMAT_NAME, MMRP_GRAMMAR_NAME};

/// A document format and the command grammar that feeds it.
///
/// Cloning is cheap; the parts are shared.
#[derive(Clone, Debug)]
pub struct Dialect {
    format: Arc<DocumentFormat>,
    grammar: Arc<Grammar>,
}

impl Dialect {
    /// Pairs a document format with a grammar.
    ///
    /// # Errors
    ///
    /// Returns a grammar error if the two do not share one schema or the
    /// format lacks a template for some concrete type.
    pub fn new(format: DocumentFormat, grammar: Grammar) -> Result<Self> {
        if !Arc::ptr_eq(format.schema(), grammar.schema()) {
            return Err(Error::grammar(format!(
                "Grammar \"{}\" and document format \"{}\" use different schemas.",
                grammar.name(),
                format.name()
            )));
        }
        format.check_complete()?;
        Ok(Self {
            format: Arc::new(format),
            grammar: Arc::new(grammar),
        })
    }

    /// Returns the document format name, which names the dialect.
    #[must_use]
    pub fn name(&self) -> &str {
        self.format.name()
    }

    /// Returns the shared schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        self.format.schema()
    }

    /// Returns the document format.
    #[must_use]
    pub fn document_format(&self) -> &Arc<DocumentFormat> {
        &self.format
    }

    /// Returns the command grammar.
    #[must_use]
    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    /// Creates interpreter state for a document holding `observations`.
    #[must_use]
    pub fn state<'a>(
        &self,
        observations: impl IntoIterator<Item = &'a Observation> + Clone,
    ) -> InterpreterState {
        InterpreterState::new(&self.grammar, observations)
    }

    /// Creates an interpreter with default state for a document holding
    /// `observations`.
    #[must_use]
    pub fn interpreter<'a>(
        &self,
        observations: impl IntoIterator<Item = &'a Observation> + Clone,
    ) -> CommandInterpreter {
        CommandInterpreter::for_document(Arc::clone(&self.grammar), observations)
    }

    /// Creates an interpreter with the given state.
    #[must_use]
    pub fn interpreter_with(&self, state: InterpreterState) -> CommandInterpreter {
        CommandInterpreter::new(Arc::clone(&self.grammar), state)
    }
}

/// Builds the HMMC dialect.
///
/// # Errors
///
/// Returns a grammar error if the dialect is inconsistent.
pub fn hmmc() -> Result<Dialect> {
    hmmc::dialect()
}

/// Builds the MMRP dialect.
///
/// # Errors
///
/// Returns a grammar error if the dialect is inconsistent.
pub fn mmrp() -> Result<Dialect> {
    mmrp::dialect()
}

/// Builds every dialect shipped with Maka.
///
/// # Errors
///
/// Returns the first grammar error.
pub fn builtin_dialects() -> Result<Vec<Dialect>> {
    Ok(vec![hmmc()?, mmrp()?])
}
