//! Scanner splitting a line into whitespace-separated tokens.
//!
//! A token is either quoted (enclosed in `"`, with `\"` and `\\` as the only
//! escapes, possibly empty) or unquoted (a maximal run of characters that are
//! neither whitespace nor `"`). Tokens must be separated by whitespace; two
//! tokens written against each other are an error, never merged.

use maka_foundation::{Error, Result};

use crate::span::Span;
use crate::token::Token;

/// Scanner over one line of text.
pub struct Scanner {
    /// The line, as characters so positions count characters.
    chars: Vec<char>,
    /// Current character offset.
    position: usize,
}

impl Scanner {
    /// Creates a scanner for the given line.
    #[must_use]
    pub fn new(line: &str) -> Self {
        Self {
            chars: line.chars().collect(),
            position: 0,
        }
    }

    /// Returns the next token, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns a tokenization error for an unterminated or malformed quoted
    /// token, or for a token not followed by whitespace or end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();

        let start = self.position;
        if start == self.chars.len() {
            return Ok(None);
        }

        let quoted = self.chars[start] == '"';
        if quoted {
            self.scan_quoted()?;
        } else {
            self.scan_unquoted();
        }

        let end = self.position;
        let span = Span::new(start, end);

        if self.peek().is_some_and(|c| !c.is_whitespace()) {
            let prefix = if quoted { "Quoted token" } else { "Token" };
            return Err(Error::tokenization(
                format!(
                    "{prefix} from characters {} through {} is not followed by space.",
                    span.first(),
                    span.last()
                ),
                span.first(),
            ));
        }

        let text: String = self.chars[start..end].iter().collect();
        Ok(Some(Token::new(text, quoted, span)))
    }

    /// Scans the rest of the line.
    ///
    /// # Errors
    ///
    /// Returns the first tokenization error encountered.
    pub fn scan_all(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.position += 1;
        }
    }

    fn scan_unquoted(&mut self) {
        while self.peek().is_some_and(|c| !c.is_whitespace() && c != '"') {
            self.position += 1;
        }
    }

    /// Scans a quoted token, leaving the position after the closing quote.
    fn scan_quoted(&mut self) -> Result<()> {
        let start = self.position;
        self.position += 1;

        loop {
            match self.peek() {
                None => {
                    return Err(Error::tokenization(
                        format!(
                            "Unterminated quoted token starting at character {}.",
                            start + 1
                        ),
                        start + 1,
                    ));
                }
                Some('"') => {
                    self.position += 1;
                    return Ok(());
                }
                Some('\\') => match self.chars.get(self.position + 1) {
                    Some('"' | '\\') => self.position += 2,
                    _ => {
                        return Err(Error::tokenization(
                            format!(
                                "Could not parse quoted token starting at character {}.",
                                start + 1
                            ),
                            start + 1,
                        ));
                    }
                },
                Some(_) => self.position += 1,
            }
        }
    }
}

/// Splits a line into tokens.
///
/// # Errors
///
/// Returns a tokenization error identifying the 1-based character position
/// where scanning failed.
pub fn tokenize(line: &str) -> Result<Vec<Token>> {
    Scanner::new(line).scan_all()
}
