//! Integration tests for Layer 5: Runtime
//!
//! Tests documents, files, preferences, sessions, and the REPL working
//! together.

mod repl;
mod session;
