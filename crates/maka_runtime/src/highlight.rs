//! Syntax highlighting for the REPL.

use std::borrow::Cow;

/// Highlighter for command lines and meta commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakaHighlighter;

impl MakaHighlighter {
    /// Creates a new highlighter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Highlight a line of input.
    ///
    /// The first word is bold, or cyan for a meta command. Quoted strings
    /// are yellow and numbers magenta.
    #[allow(clippy::unused_self)]
    #[must_use]
    pub fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.trim().is_empty() {
            return Cow::Borrowed(line);
        }

        let mut result = String::with_capacity(line.len() * 2);
        let mut chars = line.chars().peekable();
        let mut first_word = true;

        while let Some(c) = chars.next() {
            match c {
                '"' => {
                    result.push_str("\x1b[33m");
                    result.push(c);
                    while let Some(next) = chars.next() {
                        result.push(next);
                        if next == '\\' {
                            if let Some(escaped) = chars.next() {
                                result.push(escaped);
                            }
                        } else if next == '"' {
                            break;
                        }
                    }
                    result.push_str("\x1b[0m");
                    first_word = false;
                }

                c if c.is_whitespace() => result.push(c),

                c => {
                    let mut word = String::from(c);
                    while let Some(&next) = chars.peek() {
                        if next.is_whitespace() || next == '"' {
                            break;
                        }
                        word.push(next);
                        chars.next();
                    }

                    let color = if first_word && word.starts_with(':') {
                        "\x1b[36m"
                    } else if first_word {
                        "\x1b[1m"
                    } else if word.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-')
                        && word.chars().any(|c| c.is_ascii_digit())
                    {
                        "\x1b[35m"
                    } else {
                        ""
                    };

                    if color.is_empty() {
                        result.push_str(&word);
                    } else {
                        result.push_str(color);
                        result.push_str(&word);
                        result.push_str("\x1b[0m");
                    }
                    first_word = false;
                }
            }
        }

        Cow::Owned(result)
    }
}
