//! Mutable interpreter state behind the stateful default suppliers.

use maka_foundation::{Error, Result, Value};
use maka_schema::Observation;
use time::{Date, Time};
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::device::{Angles, DeviceSource, LazyTheodolite, Theodolite};
use crate::grammar::{Grammar, Supplier};
use crate::serial::SerialNumberGenerator;

/// Counters, saved values, clock, and theodolite of one open document.
#[derive(Debug)]
pub struct InterpreterState {
    observation_nums: SerialNumberGenerator,
    comment_ids: SerialNumberGenerator,
    saved_date_time: (Option<Date>, Option<Time>),
    saved_angles: Angles,
    clock: Box<dyn Clock>,
    theodolite: LazyTheodolite,
}

impl InterpreterState {
    /// Creates state for a document holding `observations`.
    ///
    /// Counters continue after the largest numbers present, as described
    /// by the grammar. The clock is the system clock and no theodolite is
    /// configured.
    #[must_use]
    pub fn new<'a>(
        grammar: &Grammar,
        observations: impl IntoIterator<Item = &'a Observation> + Clone,
    ) -> Self {
        Self {
            observation_nums: grammar.observation_counter().generator(observations.clone()),
            comment_ids: grammar.comment_counter().generator(observations),
            saved_date_time: (None, None),
            saved_angles: (None, None),
            clock: Box::new(SystemClock),
            theodolite: LazyTheodolite::unavailable(),
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Acquires the theodolite from `source` on first use.
    #[must_use]
    pub fn with_device_source(mut self, source: DeviceSource) -> Self {
        self.theodolite = LazyTheodolite::new(source);
        self
    }

    /// Uses an already acquired theodolite.
    #[must_use]
    pub fn with_theodolite(mut self, theodolite: impl Theodolite + 'static) -> Self {
        self.theodolite = LazyTheodolite::ready(Box::new(theodolite));
        self
    }

    /// Returns the next observation number without using it.
    #[must_use]
    pub const fn peek_observation_num(&self) -> i64 {
        self.observation_nums.peek()
    }

    /// Returns the next comment id without using it.
    #[must_use]
    pub const fn peek_comment_id(&self) -> i64 {
        self.comment_ids.peek()
    }

    /// Returns the saved date and time.
    #[must_use]
    pub const fn saved_date_time(&self) -> (Option<Date>, Option<Time>) {
        self.saved_date_time
    }

    /// Returns the saved theodolite angles.
    #[must_use]
    pub const fn saved_angles(&self) -> Angles {
        self.saved_angles
    }

    /// Returns true once the theodolite has been acquired.
    #[must_use]
    pub const fn theodolite_acquired(&self) -> bool {
        self.theodolite.is_acquired()
    }

    /// Invokes a supplier, returning one value per target field.
    ///
    /// # Errors
    ///
    /// Returns a command interpreter error if a theodolite read fails.
    pub fn supply(&mut self, supplier: Supplier) -> Result<Vec<Option<Value>>> {
        if supplier.has_side_effects() {
            debug!(%supplier, "supplying default");
        } else {
            trace!(%supplier, "supplying default");
        }
        let values = match supplier {
            Supplier::NextObservationNum => {
                vec![Some(Value::Integer(self.observation_nums.next_number()))]
            }
            Supplier::NextCommentId => vec![Some(Value::Integer(self.comment_ids.next_number()))],
            Supplier::CurrentDateTime => date_time_values(self.now()),
            Supplier::SaveCurrentDateTime => {
                self.saved_date_time = self.now();
                date_time_values(self.saved_date_time)
            }
            Supplier::SavedDateTime => date_time_values(self.saved_date_time),
            Supplier::ReadTheodoliteAngles => {
                self.saved_angles = self.theodolite.read_angles().map_err(|e| {
                    Error::command(format!("Theodolite read failed. {}", e.message()))
                })?;
                debug!(angles = ?self.saved_angles, "theodolite read");
                angle_values(self.saved_angles)
            }
            Supplier::SavedTheodoliteAngles => angle_values(self.saved_angles),
        };
        Ok(values)
    }

    fn now(&self) -> (Option<Date>, Option<Time>) {
        let (date, time) = self.clock.now();
        (Some(date), Some(time))
    }
}

fn date_time_values((date, time): (Option<Date>, Option<Time>)) -> Vec<Option<Value>> {
    vec![date.map(Value::Date), time.map(Value::Time)]
}

fn angle_values((declination, azimuth): Angles) -> Vec<Option<Value>> {
    vec![declination.map(Value::Float), azimuth.map(Value::Float)]
}
