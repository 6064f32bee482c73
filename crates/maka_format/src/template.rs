//! Line templates for observation types.
//!
//! A template is a whitespace-separated sequence of literal keywords and
//! field placeholders, e.g.
//! `{observationNum:05d} {date} {time} Fix* Dec {declination} Az {azimuth}`.
//! Placeholders take an optional style after a colon: `0Nd` pads integers
//! with zeros to width N, `deg` writes angles in decimal degrees.

use std::sync::Arc;

use maka_foundation::{Error, Result};
use maka_schema::{FieldValues, Observation, ObservationType, TextStyle};
use maka_text::{Token, tokenize};

/// One piece of a template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// A keyword written and matched verbatim.
    Literal(String),
    /// A field value.
    Field {
        /// Field name.
        name: String,
        /// Rendering style.
        style: TextStyle,
    },
}

/// The text template of one observation type.
#[derive(Clone, Debug)]
pub struct Template {
    observation_type: Arc<ObservationType>,
    pattern: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Compiles a template pattern for an observation type.
    ///
    /// # Errors
    ///
    /// Returns a grammar error if a placeholder is malformed, names an
    /// unknown field, repeats a field, or if a field of the type has no
    /// placeholder.
    pub fn new(observation_type: Arc<ObservationType>, pattern: &str) -> Result<Self> {
        let type_name = observation_type.name().to_string();
        let grammar = |message: String| {
            Error::grammar(format!("Template for \"{type_name}\": {message}"))
        };

        let mut segments = Vec::new();
        let mut seen: Vec<String> = Vec::new();

        for piece in pattern.split_whitespace() {
            if let Some(inner) = piece.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                let (name, spec) = inner.split_once(':').unwrap_or((inner, ""));
                let style = parse_style(spec)
                    .ok_or_else(|| grammar(format!("bad placeholder style \"{spec}\".")))?;
                if !observation_type.has_field(name) {
                    return Err(grammar(format!("unknown field \"{name}\".")));
                }
                if seen.iter().any(|s| s == name) {
                    return Err(grammar(format!("field \"{name}\" appears more than once.")));
                }
                seen.push(name.to_string());
                segments.push(Segment::Field {
                    name: name.to_string(),
                    style,
                });
            } else if piece.contains(['{', '}', '"']) {
                return Err(grammar(format!("malformed template piece \"{piece}\".")));
            } else {
                segments.push(Segment::Literal(piece.to_string()));
            }
        }

        if let Some(missing) = observation_type
            .field_names()
            .find(|f| !seen.iter().any(|s| s == f))
        {
            return Err(grammar(format!("field \"{missing}\" has no placeholder.")));
        }

        Ok(Self {
            observation_type,
            pattern: pattern.to_string(),
            segments,
        })
    }

    /// Returns the observation type.
    #[must_use]
    pub fn observation_type(&self) -> &Arc<ObservationType> {
        &self.observation_type
    }

    /// Returns the pattern this template was compiled from.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the compiled segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the first literal keyword and its token position.
    #[must_use]
    pub fn keyword(&self) -> Option<(usize, &str)> {
        self.segments.iter().enumerate().find_map(|(i, s)| match s {
            Segment::Literal(text) => Some((i, text.as_str())),
            Segment::Field { .. } => None,
        })
    }

    /// Formats an observation as one line.
    #[must_use]
    pub fn format(&self, observation: &Observation) -> String {
        let pieces: Vec<String> = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.clone(),
                Segment::Field { name, style } => {
                    match self.observation_type.field(name) {
                        Some(field) => field.format_with(observation.get(name), *style, false),
                        None => String::new(),
                    }
                }
            })
            .collect();
        pieces.join(" ")
    }

    /// Parses a line into field values.
    ///
    /// # Errors
    ///
    /// Returns a document format error carrying `line_num` if the line does
    /// not tokenize, has the wrong number of tokens, does not match a
    /// keyword, or holds a malformed field value.
    pub fn parse(&self, line: &str, line_num: usize) -> Result<FieldValues> {
        let tokens = tokenize(line).map_err(|e| Error::document_format(line_num, e.message()))?;
        self.parse_tokens(&tokens, line_num)
    }

    /// Parses already scanned tokens into field values.
    ///
    /// # Errors
    ///
    /// Same as [`Template::parse`].
    pub fn parse_tokens(&self, tokens: &[Token], line_num: usize) -> Result<FieldValues> {
        let type_name = self.observation_type.name();

        if tokens.len() != self.segments.len() {
            return Err(Error::document_format(
                line_num,
                format!(
                    "Expected {} tokens for {type_name} observation but found {}.",
                    self.segments.len(),
                    tokens.len()
                ),
            ));
        }

        let mut values = FieldValues::new();
        for (segment, token) in self.segments.iter().zip(tokens) {
            match segment {
                Segment::Literal(text) => {
                    if token.text != *text {
                        return Err(Error::document_format(
                            line_num,
                            format!(
                                "Expected \"{text}\" at character {} but found \"{}\".",
                                token.span.first(),
                                token.text
                            ),
                        ));
                    }
                }
                Segment::Field { name, .. } => {
                    let Some(field) = self.observation_type.field(name) else {
                        continue;
                    };
                    let value = field.parse(&token.text, false).map_err(|e| {
                        Error::document_format(
                            line_num,
                            format!("Could not parse {type_name} field \"{name}\". {}", e.message()),
                        )
                    })?;
                    values.insert(name.clone(), value);
                }
            }
        }
        Ok(values)
    }

    /// Parses a line into a validated observation.
    ///
    /// # Errors
    ///
    /// Returns a document format error carrying `line_num`, including for
    /// values that violate a field constraint.
    pub fn parse_observation(&self, line: &str, line_num: usize) -> Result<Observation> {
        let values = self.parse(line, line_num)?;
        self.construct(values, line_num)
    }

    pub(crate) fn construct(&self, values: FieldValues, line_num: usize) -> Result<Observation> {
        self.observation_type
            .construct(values)
            .map_err(|e| Error::document_format(line_num, e.message()))
    }
}

fn parse_style(spec: &str) -> Option<TextStyle> {
    match spec {
        "" => Some(TextStyle::Default),
        "deg" => Some(TextStyle::DecimalDegrees),
        _ => {
            let width = spec.strip_prefix('0')?.strip_suffix('d')?;
            width.parse().ok().map(TextStyle::ZeroPadded)
        }
    }
}
