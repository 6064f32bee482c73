//! Field descriptors.
//!
//! A field descriptor names one attribute of an observation type and knows
//! how to validate, format, and parse values of that attribute.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use maka_foundation::angle::{
    degrees_to_radians, format_decimal_degrees, format_decimal_degrees_below, format_dms_below,
    parse_angle,
};
use maka_foundation::{Decimal, Error, Kind, Result, Value};
use maka_text::{NONE_TOKEN, is_unquoted_token, quote, unquote};
use time::macros::format_description;
use time::{Date, Time};

/// How a field value is rendered in a text template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextStyle {
    /// The kind's usual form.
    #[default]
    Default,
    /// Integers padded with zeros to the given width.
    ZeroPadded(usize),
    /// Angles as decimal degrees instead of degrees, minutes and seconds.
    DecimalDegrees,
}

/// Descriptor of one named, typed observation field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Field kind.
    pub kind: Kind,
    /// Units, for display.
    pub units: Option<String>,
    /// Human-readable description.
    pub doc: Option<String>,
    /// Smallest allowed value (inclusive).
    pub min: Option<Value>,
    /// Largest allowed value.
    pub max: Option<Value>,
    /// Whether `max` itself is allowed.
    pub max_inclusive: bool,
    /// Value used when construction does not mention the field.
    pub default: Option<Value>,
    /// Restricted set of allowed string values.
    pub values: Option<Vec<String>>,
    /// Input aliases mapped to canonical string values.
    pub translations: BTreeMap<String, String>,
}

impl FieldDescriptor {
    /// Creates an unconstrained field.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            units: None,
            doc: None,
            min: None,
            max: None,
            max_inclusive: true,
            default: None,
            values: None,
            translations: BTreeMap::new(),
        }
    }

    /// Creates a string field.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, Kind::String)
    }

    /// Creates an integer field.
    #[must_use]
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Integer)
    }

    /// Creates a decimal field.
    #[must_use]
    pub fn decimal(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Decimal)
    }

    /// Creates a float field.
    #[must_use]
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Float)
    }

    /// Creates an angle field.
    #[must_use]
    pub fn angle(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Angle)
    }

    /// Creates a date field.
    #[must_use]
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Date)
    }

    /// Creates a time field.
    #[must_use]
    pub fn time(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Time)
    }

    /// Returns a copy of this descriptor under another name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the units.
    #[must_use]
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Sets the minimum.
    #[must_use]
    pub fn with_min(mut self, min: impl Into<Value>) -> Self {
        self.min = Some(min.into());
        self
    }

    /// Sets an inclusive maximum.
    #[must_use]
    pub fn with_max(mut self, max: impl Into<Value>) -> Self {
        self.max = Some(max.into());
        self.max_inclusive = true;
        self
    }

    /// Sets an exclusive maximum.
    #[must_use]
    pub fn with_max_exclusive(mut self, max: impl Into<Value>) -> Self {
        self.max = Some(max.into());
        self.max_inclusive = false;
        self
    }

    /// Sets an angle range given in degrees; the bounds are stored in radians.
    #[must_use]
    pub fn with_degree_range(mut self, min: f64, max: f64, max_inclusive: bool) -> Self {
        self.min = Some(Value::Float(degrees_to_radians(min)));
        self.max = Some(Value::Float(degrees_to_radians(max)));
        self.max_inclusive = max_inclusive;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Restricts string values to the given set.
    #[must_use]
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Adds input aliases for string values.
    #[must_use]
    pub fn with_translations<I, A, C>(mut self, translations: I) -> Self
    where
        I: IntoIterator<Item = (A, C)>,
        A: Into<String>,
        C: Into<String>,
    {
        self.translations
            .extend(translations.into_iter().map(|(a, c)| (a.into(), c.into())));
        self
    }

    /// Describes the allowed values, e.g. `[0, 6]` or `{"One", "Two"}`.
    #[must_use]
    pub fn range_description(&self) -> Option<String> {
        if let Some(values) = &self.values {
            let quoted: Vec<String> = values.iter().map(|v| format!("\"{v}\"")).collect();
            return Some(format!("{{{}}}", quoted.join(", ")));
        }
        let close = if self.max_inclusive { ']' } else { ')' };
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => Some(format!(
                "[{}, {}{close}",
                self.describe(min),
                self.describe(max)
            )),
            (Some(min), None) => Some(format!(">= {}", self.describe(min))),
            (None, Some(max)) if self.max_inclusive => Some(format!("<= {}", self.describe(max))),
            (None, Some(max)) => Some(format!("< {}", self.describe(max))),
            (None, None) => None,
        }
    }

    /// Checks a value against this field's kind and constraints.
    ///
    /// Strings are translated through the alias table first, and an empty
    /// string becomes an absent value. Accepted values are promoted to the
    /// field's kind, so an integer given for a decimal field comes back as a
    /// decimal.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the field, the value, and the
    /// violated constraint.
    pub fn validate(&self, value: Option<Value>) -> Result<Option<Value>> {
        let Some(value) = value else {
            return Ok(None);
        };

        let value = match value {
            Value::String(s) if self.kind == Kind::String => {
                let s = self.translations.get(&s).cloned().unwrap_or(s);
                if s.is_empty() {
                    return Ok(None);
                }
                if let Some(values) = &self.values {
                    if !values.contains(&s) {
                        let range = self.range_description().unwrap_or_default();
                        return Err(self.invalid(&Value::String(s), format!("is not one of {range}")));
                    }
                }
                Value::String(s)
            }
            other => other,
        };

        let Some(value) = self.kind.promote(value.clone()) else {
            return Err(self.invalid(&value, format!("is not of kind {}", self.kind)));
        };

        match &value {
            Value::Float(x) if !x.is_finite() => {
                return Err(self.invalid(&value, "is not a finite number"));
            }
            Value::Time(t) if t.nanosecond() != 0 => {
                return Err(self.invalid(&value, "has fractional seconds"));
            }
            Value::Date(d) if !(1..=9999).contains(&d.year()) => {
                return Err(self.invalid(&value, "has a year outside 1 through 9999"));
            }
            _ => {}
        }

        if let Some(min) = &self.min {
            if value.compare(min) == Some(Ordering::Less) {
                return Err(self.invalid(&value, format!("is less than minimum {}", self.describe(min))));
            }
        }

        if let Some(max) = &self.max {
            match value.compare(max) {
                Some(Ordering::Greater) => {
                    return Err(self.invalid(
                        &value,
                        format!("is greater than maximum {}", self.describe(max)),
                    ));
                }
                Some(Ordering::Equal) if !self.max_inclusive => {
                    return Err(self.invalid(
                        &value,
                        format!("is not less than exclusive maximum {}", self.describe(max)),
                    ));
                }
                _ => {}
            }
        }

        Ok(Some(value))
    }

    /// Formats a value in the field's usual style.
    #[must_use]
    pub fn format(&self, value: Option<&Value>, editing: bool) -> String {
        self.format_with(value, TextStyle::Default, editing)
    }

    /// Formats a value in the given style.
    ///
    /// Document text (`editing == false`) writes an absent value as `""` and
    /// quotes strings that are not valid bare tokens. Editing text writes
    /// values as they would be typed, with absent values empty.
    #[must_use]
    pub fn format_with(&self, value: Option<&Value>, style: TextStyle, editing: bool) -> String {
        let Some(value) = value else {
            return if editing { String::new() } else { NONE_TOKEN.to_string() };
        };

        match value {
            Value::String(s) => {
                if editing || is_unquoted_token(s) {
                    s.clone()
                } else {
                    quote(s)
                }
            }
            Value::Integer(n) => match style {
                TextStyle::ZeroPadded(width) => format!("{n:0width$}"),
                _ => n.to_string(),
            },
            Value::Float(x) if self.kind == Kind::Angle => {
                let limit = self.exclusive_limit();
                match style {
                    TextStyle::DecimalDegrees => format_decimal_degrees_below(*x, limit),
                    _ => format_dms_below(*x, limit),
                }
            }
            Value::Float(x) => x.to_string(),
            Value::Decimal(_) | Value::Date(_) | Value::Time(_) => value.to_string(),
        }
    }

    /// Parses field text into a value of this field's kind.
    ///
    /// The result is not validated against the field's constraints.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the text is malformed for the field's kind.
    pub fn parse(&self, text: &str, editing: bool) -> Result<Option<Value>> {
        let text = if editing {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if self.kind == Kind::String {
                return Ok(Some(Value::String(trimmed.to_string())));
            }
            trimmed
        } else {
            if text == NONE_TOKEN {
                return Ok(None);
            }
            if self.kind == Kind::String {
                let s = if text.starts_with('"') {
                    unquote(text)?
                } else {
                    text.to_string()
                };
                return Ok(Some(Value::String(s)));
            }
            text
        };

        let value = match self.kind {
            Kind::String => Value::String(text.to_string()),
            Kind::Integer => Value::Integer(parse_integer(text)?),
            Kind::Decimal => Value::Decimal(parse_decimal(text)?),
            Kind::Float => Value::Float(parse_float(text)?),
            Kind::Angle => Value::Float(parse_angle(text)?),
            Kind::Date => Value::Date(parse_date(text)?),
            Kind::Time => Value::Time(parse_time(text)?),
        };
        Ok(Some(value))
    }

    fn exclusive_limit(&self) -> Option<f64> {
        match &self.max {
            Some(Value::Float(max)) if !self.max_inclusive => Some(*max),
            _ => None,
        }
    }

    /// Renders a bound or value for messages; angles in degrees.
    fn describe(&self, value: &Value) -> String {
        match value {
            Value::Float(x) if self.kind == Kind::Angle => format_decimal_degrees(*x),
            Value::String(s) => format!("\"{s}\""),
            other => other.to_string(),
        }
    }

    fn invalid(&self, value: &Value, constraint: impl Into<String>) -> Error {
        Error::validation(&self.name, self.describe(value), constraint)
    }
}

fn parse_integer(text: &str) -> Result<i64> {
    text.parse()
        .map_err(|_| Error::parse(format!("\"{text}\" is not a valid integer.")))
}

fn parse_decimal(text: &str) -> Result<Decimal> {
    let error = || Error::parse(format!("\"{text}\" is not a valid decimal number."));
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    let well_formed = !digits.is_empty()
        && digits.bytes().any(|b| b.is_ascii_digit())
        && digits.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && digits.bytes().filter(|&b| b == b'.').count() <= 1;
    if !well_formed {
        return Err(error());
    }
    Decimal::from_str(text).map_err(|_| error())
}

fn parse_float(text: &str) -> Result<f64> {
    match text.parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(x),
        _ => Err(Error::parse(format!("\"{text}\" is not a valid number."))),
    }
}

fn parse_date(text: &str) -> Result<Date> {
    Date::parse(text, format_description!("[year]-[month]-[day]")).map_err(|_| {
        Error::parse(format!(
            "\"{text}\" is not a valid date of the form YYYY-MM-DD."
        ))
    })
}

fn parse_time(text: &str) -> Result<Time> {
    Time::parse(text, format_description!("[hour]:[minute]:[second]")).map_err(|_| {
        Error::parse(format!(
            "\"{text}\" is not a valid time of the form HH:MM:SS."
        ))
    })
}
