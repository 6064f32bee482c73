//! Integration tests for Layer 2: Format
//!
//! Tests line templates, document text, and the round-trip law.

mod documents;
mod proptests;
mod templates;
