//! Maka - Field-data entry for marine-mammal observation sessions
//!
//! This crate re-exports all layers of the Maka system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 5: maka_runtime    - Documents, undo, files, sessions, REPL, CLI
//! Layer 4: maka_dialect    - HMMC and MMRP observation types and commands
//! Layer 3: maka_command    - Command grammar, interpreter, counters, devices
//! Layer 2: maka_format     - Per-type line templates and document text
//!          maka_schema     - Field kinds, observation types, observations
//! Layer 1: maka_text       - Token scanner
//! Layer 0: maka_foundation - Core types (Value, Angle, Error)
//! ```

pub use maka_command as command;
pub use maka_dialect as dialect;
pub use maka_format as format;
pub use maka_foundation as foundation;
pub use maka_runtime as runtime;
pub use maka_schema as schema;
pub use maka_text as text;
