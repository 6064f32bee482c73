//! Scanned tokens and quoting helpers.

use std::fmt;

use maka_foundation::{Error, Result};

use crate::span::Span;

/// The token that stands for an absent value in document text.
pub const NONE_TOKEN: &str = "\"\"";

/// A token from scanning a line.
///
/// `text` is the raw text as written, including the enclosing quotes and
/// escapes of a quoted token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Raw token text.
    pub text: String,
    /// Whether the token is enclosed in double quotes.
    pub quoted: bool,
    /// Location of the token in the scanned line.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(text: impl Into<String>, quoted: bool, span: Span) -> Self {
        Self {
            text: text.into(),
            quoted,
            span,
        }
    }

    /// Returns the raw token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true if this is the empty quoted token `""`.
    #[must_use]
    pub fn is_none_token(&self) -> bool {
        self.text == NONE_TOKEN
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

/// Returns true if `s` can be written as an unquoted token.
#[must_use]
pub fn is_unquoted_token(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(|c| c.is_whitespace() || c == '"')
}

/// Encloses `s` in double quotes, escaping quotes and backslashes.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Removes the enclosing quotes of a quoted token and resolves its escapes.
///
/// # Errors
///
/// Returns a parse error if `s` is not enclosed in quotes or contains an
/// escape other than `\"` or `\\`.
pub fn unquote(s: &str) -> Result<String> {
    let inner = s
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| Error::parse(format!("Token {s} is not quoted.")))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped @ ('"' | '\\')) => out.push(escaped),
                _ => return Err(Error::parse(format!("Bad escape sequence in token {s}."))),
            },
            '"' => return Err(Error::parse(format!("Unescaped quote in token {s}."))),
            c => out.push(c),
        }
    }
    Ok(out)
}
