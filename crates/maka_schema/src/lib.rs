//! Field descriptors, observation types, and observations for Maka.
//!
//! This crate provides:
//! - [`FieldDescriptor`] - A typed, validated observation field with text forms
//! - [`ObservationType`] - A named, ordered set of fields with inheritance
//! - [`Observation`] - An immutable, validated record of one type
//! - [`Schema`] - The registry of observation types of one dialect

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod field;
pub mod observation;
pub mod schema;

pub use field::{FieldDescriptor, TextStyle};
pub use observation::{FieldValues, Observation, ObservationType};
pub use schema::{DATE, NDT, NUMBERED, OBSERVATION_NUM, Schema, TIME, TIME_STAMPED};
