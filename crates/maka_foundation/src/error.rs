//! Error types for the Maka system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Maka operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a tokenization error at a 1-based character position.
    #[must_use]
    pub fn tokenization(message: impl Into<String>, position: usize) -> Self {
        Self::new(ErrorKind::Tokenization {
            message: message.into(),
            position,
        })
    }

    /// Creates a field parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse(message.into()))
    }

    /// Creates a validation error for a value that violates a constraint.
    #[must_use]
    pub fn validation(
        field: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::Validation {
            field: field.into(),
            value: value.into(),
            constraint: constraint.into(),
        })
    }

    /// Creates a grammar (definition-time) error.
    #[must_use]
    pub fn grammar(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Grammar(message.into()))
    }

    /// Creates a document format error for a 1-based line number.
    #[must_use]
    pub fn document_format(line: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DocumentFormat {
            line,
            message: message.into(),
        })
    }

    /// Creates a command interpreter error.
    #[must_use]
    pub fn command(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CommandInterpreter {
            message: message.into(),
            command: None,
            field: None,
        })
    }

    /// Creates a device communication error.
    #[must_use]
    pub fn device(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Device(message.into()))
    }

    /// Attaches the offending command name to a command interpreter error.
    ///
    /// Errors of any other kind are returned unchanged.
    #[must_use]
    pub fn for_command(mut self, name: &str) -> Self {
        if let ErrorKind::CommandInterpreter { command, .. } = &mut self.kind {
            *command = Some(name.to_string());
        }
        self
    }

    /// Attaches the offending field name to a command interpreter error.
    ///
    /// Errors of any other kind are returned unchanged.
    #[must_use]
    pub fn for_field(mut self, name: &str) -> Self {
        if let ErrorKind::CommandInterpreter { field, .. } = &mut self.kind {
            *field = Some(name.to_string());
        }
        self
    }

    /// Returns the human-readable message without the kind prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.kind {
            ErrorKind::Tokenization { message, .. }
            | ErrorKind::DocumentFormat { message, .. }
            | ErrorKind::CommandInterpreter { message, .. } => message.clone(),
            ErrorKind::Parse(message)
            | ErrorKind::Grammar(message)
            | ErrorKind::Device(message)
            | ErrorKind::Io(message)
            | ErrorKind::Config(message)
            | ErrorKind::Serialization(message)
            | ErrorKind::Internal(message) => message.clone(),
            ErrorKind::Validation { .. } => self.kind.to_string(),
        }
    }

    /// Returns true for errors that can happen while the program runs.
    ///
    /// Grammar errors are definition-time defects and are the only
    /// non-runtime kind.
    #[must_use]
    pub const fn is_runtime(&self) -> bool {
        !matches!(self.kind, ErrorKind::Grammar(_))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Malformed quoting or fused tokens in a command or document line.
    #[error("{message}")]
    Tokenization {
        /// Description of the failure.
        message: String,
        /// 1-based character position where scanning failed.
        position: usize,
    },

    /// A single field's text is malformed for its kind.
    #[error("{0}")]
    Parse(String),

    /// A well-typed value violates a range or value-set constraint.
    #[error("value {value} for field \"{field}\" {constraint}")]
    Validation {
        /// The field being assigned.
        field: String,
        /// The offending value, as text.
        value: String,
        /// The violated constraint.
        constraint: String,
    },

    /// An observation type, template, or command definition is inconsistent.
    #[error("grammar error: {0}")]
    Grammar(String),

    /// A stored line does not match its observation type's template.
    #[error("line {line}: {message}")]
    DocumentFormat {
        /// 1-based line number in the document.
        line: usize,
        /// Description of the mismatch.
        message: String,
    },

    /// User-facing failure to interpret a command line.
    #[error("{message}")]
    CommandInterpreter {
        /// Description of the failure.
        message: String,
        /// The command involved, if known.
        command: Option<String>,
        /// The field involved, if known.
        field: Option<String>,
    },

    /// Instrument communication failure.
    #[error("{0}")]
    Device(String),

    /// File system failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// Preferences could not be loaded or are inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// Export or import encoding failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Source file or command text.
    pub source: Option<String>,
    /// Line number in source.
    pub line: Option<usize>,
    /// Column number in source.
    pub column: Option<usize>,
    /// Enclosing operations, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            line: None,
            column: None,
            stack: Vec::new(),
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line and column.
    #[must_use]
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "in {source}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
                if let Some(col) = self.column {
                    write!(f, ":{col}")?;
                }
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  while {frame}")?;
            }
        }
        Ok(())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(e.to_string()))
    }
}
