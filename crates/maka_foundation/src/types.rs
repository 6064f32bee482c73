//! Field kinds.

use std::fmt;

use rust_decimal::Decimal;

use crate::value::Value;

/// The declared kind of an observation field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Free or enumerated text.
    String,
    /// Whole numbers.
    Integer,
    /// Exact decimal numbers.
    Decimal,
    /// Floating point numbers.
    Float,
    /// Floating point angle in radians, shown in degrees.
    Angle,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
}

impl Kind {
    /// Returns true if a value can be stored in a field of this kind,
    /// possibly after [`Kind::promote`].
    #[must_use]
    pub const fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String, Value::String(_))
                | (Self::Integer, Value::Integer(_))
                | (Self::Decimal, Value::Decimal(_) | Value::Integer(_))
                | (Self::Float | Self::Angle, Value::Float(_) | Value::Integer(_))
                | (Self::Date, Value::Date(_))
                | (Self::Time, Value::Time(_))
        )
    }

    /// Converts an accepted value to this kind's canonical representation.
    ///
    /// Returns `None` when the value is not accepted.
    #[must_use]
    pub fn promote(self, value: Value) -> Option<Value> {
        match (self, value) {
            (Self::Decimal, Value::Integer(n)) => Some(Value::Decimal(Decimal::from(n))),
            #[allow(clippy::cast_precision_loss)]
            (Self::Float | Self::Angle, Value::Integer(n)) => Some(Value::Float(n as f64)),
            (kind, value) if kind.accepts(&value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Decimal => "Decimal",
            Self::Float => "Float",
            Self::Angle => "Angle",
            Self::Date => "Date",
            Self::Time => "Time",
        };
        write!(f, "{name}")
    }
}
