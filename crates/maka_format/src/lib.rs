//! Observation text templates and document formats for Maka.
//!
//! This crate provides:
//! - [`Template`] - One observation type's line template, used to format and parse
//! - [`DocumentFormat`] - A named set of templates over a schema, for whole documents
//!
//! Formatting then parsing an observation yields an equal observation.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod document_format;
pub mod template;

pub use document_format::DocumentFormat;
pub use template::{Segment, Template};
