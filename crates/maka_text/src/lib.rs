//! Token scanner for Maka command lines and document lines.
//!
//! This crate provides:
//! - [`Scanner`] / [`tokenize`] - Splitting a line into quoted and unquoted tokens
//! - [`Token`] - A scanned token with its raw text and location
//! - [`Span`] - Character positions used in error messages
//! - [`quote`] / [`unquote`] - Escaping helpers shared with the field kinds
//!
//! The scanner only partitions text. It never unescapes quoted tokens or
//! interprets numbers; field kinds do that, which keeps formatting and
//! parsing exact inverses.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod scanner;
pub mod span;
pub mod token;

pub use scanner::{Scanner, tokenize};
pub use span::Span;
pub use token::{NONE_TOKEN, Token, is_unquoted_token, quote, unquote};
