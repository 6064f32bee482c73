//! Core values, field kinds, angle conversions, and errors for Maka.
//!
//! This crate provides:
//! - [`Value`] - The typed value stored in an observation field
//! - [`Kind`] - Field kinds used to check and promote values
//! - [`Error`] - The workspace-wide error type with categorized kinds
//! - [`angle`] - Exact degree/radian conversions and angle text styles

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod angle;
pub mod error;
pub mod types;
pub mod value;

pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use rust_decimal::Decimal;
pub use types::Kind;
pub use value::Value;
