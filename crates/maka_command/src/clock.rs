//! Wall-clock access for date and time defaults.

use std::fmt;

use time::{Date, OffsetDateTime, Time};

/// A source of the current date and time.
pub trait Clock: fmt::Debug {
    /// Returns the current date and time, truncated to whole seconds.
    fn now(&self) -> (Date, Time);
}

/// The local system clock, or UTC where the local offset is unknown.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> (Date, Time) {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let time = now.time();
        (now.date(), time.replace_nanosecond(0).unwrap_or(time))
    }
}

/// A clock that always reports the same instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock {
    date: Date,
    time: Time,
}

impl FixedClock {
    /// Creates a clock stopped at the given date and time.
    #[must_use]
    pub const fn new(date: Date, time: Time) -> Self {
        Self { date, time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> (Date, Time) {
        (self.date, self.time)
    }
}
