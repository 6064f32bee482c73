//! Serial number generators seeded from existing observations.

use maka_foundation::Value;
use maka_schema::Observation;

/// A monotonic counter handing out observation numbers or comment ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerialNumberGenerator {
    next: i64,
}

impl SerialNumberGenerator {
    /// Creates a generator whose first number is `next`.
    #[must_use]
    pub const fn new(next: i64) -> Self {
        Self { next }
    }

    /// Creates a generator that continues after the largest existing number,
    /// or starts at `default` if there is none.
    #[must_use]
    pub fn seeded(existing: impl IntoIterator<Item = i64>, default: i64) -> Self {
        match existing.into_iter().max() {
            Some(max) => Self::new(max.saturating_add(1)),
            None => Self::new(default),
        }
    }

    /// Returns the next number and advances.
    pub fn next_number(&mut self) -> i64 {
        let number = self.next;
        self.next = self.next.saturating_add(1);
        number
    }

    /// Returns the number the next call to [`next_number`](Self::next_number)
    /// will hand out.
    #[must_use]
    pub const fn peek(&self) -> i64 {
        self.next
    }
}

/// Where a counter finds its existing numbers in a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterSpec {
    /// Integer field holding the number.
    pub field: String,
    /// Restricts seeding to observations of this type.
    pub type_name: Option<String>,
    /// First number when no observation carries one.
    pub default: i64,
}

impl CounterSpec {
    /// Counts the named field on observations of any type.
    #[must_use]
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            type_name: None,
            default: 0,
        }
    }

    /// Restricts the counter to one observation type.
    #[must_use]
    pub fn on_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Sets the first number used for a document with no numbers.
    #[must_use]
    pub const fn starting_at(mut self, default: i64) -> Self {
        self.default = default;
        self
    }

    /// Extracts this counter's number from an observation, if it has one.
    #[must_use]
    pub fn number_of(&self, observation: &Observation) -> Option<i64> {
        if let Some(type_name) = &self.type_name {
            if observation.type_name() != type_name {
                return None;
            }
        }
        observation.get(&self.field).and_then(Value::as_integer)
    }

    /// Creates a generator seeded from existing observations.
    #[must_use]
    pub fn generator<'a>(
        &self,
        observations: impl IntoIterator<Item = &'a Observation>,
    ) -> SerialNumberGenerator {
        SerialNumberGenerator::seeded(
            observations.into_iter().filter_map(|o| self.number_of(o)),
            self.default,
        )
    }
}
