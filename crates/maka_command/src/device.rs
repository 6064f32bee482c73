//! The theodolite device contract and built-in devices.
//!
//! A theodolite reports a vertical angle (declination) and a horizontal
//! angle (azimuth), both in radians. A component the instrument does not
//! have is reported as `None`, which is not an error.

use std::cell::Cell;
use std::collections::VecDeque;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt;
use std::rc::Rc;

use maka_foundation::{Error, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// A declination and azimuth reading in radians.
pub type Angles = (Option<f64>, Option<f64>);

/// An instrument that reads angles.
pub trait Theodolite: fmt::Debug {
    /// Reads the current declination and azimuth.
    ///
    /// # Errors
    ///
    /// Returns a device error on any communication failure.
    fn read_angles(&mut self) -> Result<Angles>;
}

/// Device type name of [`DummyTheodolite`].
pub const DUMMY_THEODOLITE: &str = "Dummy Theodolite";

/// Device type name of [`SimulatedTheodolite`].
pub const SIMULATED_THEODOLITE: &str = "Simulated Theodolite";

/// A theodolite with no angle sensors.
#[derive(Clone, Copy, Debug, Default)]
pub struct DummyTheodolite;

impl Theodolite for DummyTheodolite {
    fn read_angles(&mut self) -> Result<Angles> {
        Ok((None, None))
    }
}

/// A theodolite producing reproducible random readings.
///
/// Declinations fall within five degrees of horizontal, azimuths anywhere
/// in `[0, 360)` degrees.
#[derive(Clone, Debug)]
pub struct SimulatedTheodolite {
    rng: ChaCha8Rng,
}

impl SimulatedTheodolite {
    /// Creates a simulated theodolite from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Theodolite for SimulatedTheodolite {
    fn read_angles(&mut self) -> Result<Angles> {
        let spread = 5.0_f64.to_radians();
        let declination = self.rng.gen_range(FRAC_PI_2 - spread..FRAC_PI_2 + spread);
        let azimuth = self.rng.gen_range(0.0..TAU);
        Ok((Some(declination), Some(azimuth)))
    }
}

/// A theodolite that replays queued readings and counts reads.
#[derive(Debug, Default)]
pub struct ScriptedTheodolite {
    readings: VecDeque<Result<Angles>>,
    reads: Rc<Cell<usize>>,
}

impl ScriptedTheodolite {
    /// Creates a theodolite that returns the given readings in order.
    #[must_use]
    pub fn new(readings: impl IntoIterator<Item = Angles>) -> Self {
        Self {
            readings: readings.into_iter().map(Ok).collect(),
            reads: Rc::new(Cell::new(0)),
        }
    }

    /// Queues a failing read.
    #[must_use]
    pub fn then_fail(mut self, message: impl Into<String>) -> Self {
        self.readings.push_back(Err(Error::device(message)));
        self
    }

    /// Returns a shared counter of reads, valid after the device is moved.
    #[must_use]
    pub fn read_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.reads)
    }
}

impl Theodolite for ScriptedTheodolite {
    fn read_angles(&mut self) -> Result<Angles> {
        self.reads.set(self.reads.get() + 1);
        self.readings
            .pop_front()
            .unwrap_or_else(|| Err(Error::device("No more scripted readings.")))
    }
}

/// Creates a theodolite on first use.
pub type DeviceSource = Box<dyn FnMut() -> Result<Box<dyn Theodolite>>>;

/// A theodolite acquired lazily and then kept.
///
/// Acquisition is attempted again after a failure.
pub struct LazyTheodolite {
    source: Option<DeviceSource>,
    device: Option<Box<dyn Theodolite>>,
}

impl LazyTheodolite {
    /// Creates a handle that acquires its device from `source`.
    #[must_use]
    pub fn new(source: DeviceSource) -> Self {
        Self {
            source: Some(source),
            device: None,
        }
    }

    /// Creates a handle around an already acquired device.
    #[must_use]
    pub fn ready(device: Box<dyn Theodolite>) -> Self {
        Self {
            source: None,
            device: Some(device),
        }
    }

    /// Creates a handle with no device.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            source: None,
            device: None,
        }
    }

    /// Returns true once a device has been acquired.
    #[must_use]
    pub const fn is_acquired(&self) -> bool {
        self.device.is_some()
    }

    /// Reads angles, acquiring the device first if needed.
    ///
    /// # Errors
    ///
    /// Returns a device error if acquisition or the read fails.
    pub fn read_angles(&mut self) -> Result<Angles> {
        if self.device.is_none() {
            let source = self
                .source
                .as_mut()
                .ok_or_else(|| Error::device("No theodolite is configured."))?;
            self.device = Some(source()?);
            debug!("theodolite acquired");
        }
        match self.device.as_mut() {
            Some(device) => device.read_angles(),
            None => Err(Error::device("No theodolite is configured.")),
        }
    }
}

impl Default for LazyTheodolite {
    fn default() -> Self {
        Self::unavailable()
    }
}

impl fmt::Debug for LazyTheodolite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyTheodolite")
            .field("has_source", &self.source.is_some())
            .field("device", &self.device)
            .finish()
    }
}
