//! Documents, sessions, REPL, and CLI for Maka.
//!
//! This crate provides:
//! - [`Document`] - An observation sequence with named, undoable edits
//! - [`EditHistory`] - Undo, redo, and saved-state tracking
//! - [`container`] - Reading and writing Maka document files
//! - [`Registry`] - Dialects and device factories available to a session
//! - [`Preferences`] - User preferences loaded from JSON
//! - [`Session`] - One open document and its interpreter
//! - [`Repl`] - Interactive read-eval-print loop
//! - [`export`] - JSON and `MessagePack` export

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod container;
pub mod document;
pub mod editor;
pub mod export;
pub mod highlight;
pub mod history;
pub mod registry;
pub mod repl;
pub mod session;

pub use config::{DeviceSettings, PREFERENCES_ENV, Preferences};
pub use document::Document;
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use export::ExportFormat;
pub use history::{DEFAULT_HISTORY_SIZE, Edit, EditHistory};
pub use registry::{DeviceFactory, Registry, THEODOLITE_DEVICE};
pub use repl::{Repl, Response};
pub use session::{Session, StateHook};
