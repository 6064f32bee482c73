//! Turning one command line into one observation.

use std::sync::Arc;

use maka_foundation::{Error, ErrorKind, Result};
use maka_schema::{FieldValues, Observation};
use maka_text::tokenize;
use tracing::{debug, info};

use crate::grammar::{Command, DefaultValue, Grammar};
use crate::state::InterpreterState;

/// Interprets command lines against a grammar.
#[derive(Debug)]
pub struct CommandInterpreter {
    grammar: Arc<Grammar>,
    state: InterpreterState,
}

impl CommandInterpreter {
    /// Creates an interpreter with the given state.
    #[must_use]
    pub fn new(grammar: Arc<Grammar>, state: InterpreterState) -> Self {
        Self { grammar, state }
    }

    /// Creates an interpreter for a document holding `observations`, with
    /// default state.
    #[must_use]
    pub fn for_document<'a>(
        grammar: Arc<Grammar>,
        observations: impl IntoIterator<Item = &'a Observation> + Clone,
    ) -> Self {
        let state = InterpreterState::new(&grammar, observations);
        Self::new(grammar, state)
    }

    /// Returns the grammar.
    #[must_use]
    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    /// Returns the interpreter state.
    #[must_use]
    pub fn state(&self) -> &InterpreterState {
        &self.state
    }

    /// Interprets one command line.
    ///
    /// Returns `None` for a line with no tokens.
    ///
    /// # Errors
    ///
    /// Returns a command interpreter error if the line does not tokenize,
    /// names no command, has too many arguments, holds an unparsable
    /// argument, needs a failed theodolite read, or yields an invalid
    /// observation.
    pub fn interpret(&mut self, text: &str) -> Result<Option<Observation>> {
        let result = self.interpret_tokens(text);
        match &result {
            Ok(Some(observation)) => info!(command = text, %observation, "command accepted"),
            Ok(None) => {}
            Err(e) => debug!(command = text, error = %e, "command rejected"),
        }
        result
    }

    fn interpret_tokens(&mut self, text: &str) -> Result<Option<Observation>> {
        let tokens = tokenize(text)
            .map_err(|e| Error::command(format!("Could not parse command. {}", e.message())))?;

        let Some((first, rest)) = tokens.split_first() else {
            return Ok(None);
        };

        let grammar = Arc::clone(&self.grammar);
        let mut args: Vec<&str> = Vec::with_capacity(tokens.len());
        let command = match grammar.command(&first.text) {
            Some(command) => command,
            None => {
                let (name, number) = split_compound(&first.text).ok_or_else(|| unrecognized(&first.text))?;
                let command = grammar.command(name).ok_or_else(|| unrecognized(&first.text))?;
                args.push(number);
                command
            }
        };
        args.extend(rest.iter().map(|t| t.text.as_str()));

        let mut values = bind_arguments(command, &args)?;
        self.apply_defaults(command, &mut values)?;

        command
            .observation_type()
            .construct(values)
            .map(Some)
            .map_err(|e| {
                let field = match &e.kind {
                    ErrorKind::Validation { field, .. } => Some(field.clone()),
                    _ => None,
                };
                let error = Error::command(e.message()).for_command(command.name());
                match field {
                    Some(field) => error.for_field(&field),
                    None => error,
                }
            })
    }

    /// Fills unfilled fields from the command's default rules, nearest
    /// rule first. A rule is evaluated only if one of its fields is still
    /// unfilled, and then fills only the unfilled ones.
    fn apply_defaults(&mut self, command: &Command, values: &mut FieldValues) -> Result<()> {
        for rule in command.defaults() {
            if rule.fields.iter().all(|f| values.contains_key(f)) {
                continue;
            }
            let supplied = match &rule.value {
                DefaultValue::Literal(literals) => literals.clone(),
                DefaultValue::Supplied(supplier) => self
                    .state
                    .supply(*supplier)
                    .map_err(|e| e.for_command(command.name()))?,
            };
            for (field, value) in rule.fields.iter().zip(supplied) {
                values.entry(field.clone()).or_insert(value);
            }
        }
        Ok(())
    }
}

fn bind_arguments(command: &Command, args: &[&str]) -> Result<FieldValues> {
    let name = command.name();
    if args.len() > command.max_args() {
        let message = if command.max_args() == 0 {
            format!("Command \"{name}\" takes no arguments.")
        } else {
            format!(
                "Too many arguments for command \"{name}\": maximum number is {}.",
                command.max_args()
            )
        };
        return Err(Error::command(message).for_command(name));
    }

    let observation_type = command.observation_type();
    let mut values = FieldValues::new();
    for (field, arg) in command.field_order().iter().zip(args) {
        let descriptor = observation_type.field(field).ok_or_else(|| {
            Error::new(ErrorKind::Internal(format!(
                "command \"{name}\" names missing field \"{field}\""
            )))
        })?;
        let value = descriptor.parse(arg, false).map_err(|e| {
            Error::command(format!(
                "Could not parse \"{field}\" argument for command \"{name}\". {}",
                e.message()
            ))
            .for_command(name)
            .for_field(field)
        })?;
        values.insert(field.clone(), value);
    }
    Ok(values)
}

fn unrecognized(name: &str) -> Error {
    Error::command(format!("Unrecognized command name \"{name}\"."))
}

/// Splits a token of non-digits followed by digits, e.g. `p12` into `p`
/// and `12`.
#[must_use]
pub fn split_compound(token: &str) -> Option<(&str, &str)> {
    let split = token.find(|c: char| c.is_ascii_digit())?;
    let (prefix, digits) = token.split_at(split);
    if prefix.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((prefix, digits))
}
