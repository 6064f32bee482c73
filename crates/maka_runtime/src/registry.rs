//! Registry of dialects and device types known to the program.

use std::collections::BTreeMap;
use std::fmt;

use maka_command::{
    DUMMY_THEODOLITE, DeviceSource, DummyTheodolite, SIMULATED_THEODOLITE, SimulatedTheodolite,
    Theodolite,
};
use maka_dialect::Dialect;
use maka_foundation::{Error, ErrorKind, Result};
use tracing::info;

use crate::config::{DeviceSettings, Preferences};

/// Device name under which the theodolite is configured.
pub const THEODOLITE_DEVICE: &str = "Theodolite";

/// Creates a device from its `deviceConfig` preference value.
pub type DeviceFactory = fn(&serde_json::Value) -> Result<Box<dyn Theodolite>>;

/// Dialects by document format name, and device factories by device type.
#[derive(Clone, Default)]
pub struct Registry {
    dialects: Vec<Dialect>,
    devices: BTreeMap<String, DeviceFactory>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("dialects", &self.dialect_names().collect::<Vec<_>>())
            .field("devices", &self.devices.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in dialects and devices.
    ///
    /// # Errors
    ///
    /// Returns a grammar error if a built-in dialect is inconsistent.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        for dialect in maka_dialect::builtin_dialects()? {
            registry.register_dialect(dialect)?;
        }
        registry.register_device(DUMMY_THEODOLITE, dummy_theodolite);
        registry.register_device(SIMULATED_THEODOLITE, simulated_theodolite);
        Ok(registry)
    }

    /// Adds a dialect.
    ///
    /// # Errors
    ///
    /// Returns a grammar error if a dialect of the same name exists.
    pub fn register_dialect(&mut self, dialect: Dialect) -> Result<()> {
        if self.dialect(dialect.name()).is_some() {
            return Err(Error::grammar(format!(
                "Document format \"{}\" is already registered.",
                dialect.name()
            )));
        }
        self.dialects.push(dialect);
        Ok(())
    }

    /// Adds or replaces a device factory.
    pub fn register_device(&mut self, device_type: impl Into<String>, factory: DeviceFactory) {
        self.devices.insert(device_type.into(), factory);
    }

    /// Returns the dialect whose document format is `name`.
    #[must_use]
    pub fn dialect(&self, name: &str) -> Option<&Dialect> {
        self.dialects.iter().find(|d| d.name() == name)
    }

    /// Returns the dialect whose document format is `name`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if there is none.
    pub fn require_dialect(&self, name: &str) -> Result<&Dialect> {
        self.dialect(name).ok_or_else(|| {
            Error::new(ErrorKind::Config(format!(
                "Unrecognized document format \"{name}\"."
            )))
        })
    }

    /// Returns the registered document format names in registration order.
    pub fn dialect_names(&self) -> impl Iterator<Item = &str> {
        self.dialects.iter().map(Dialect::name)
    }

    /// Returns the registered device types.
    pub fn device_types(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    /// Returns a source that creates the device named `device_name` as
    /// configured in `prefs`.
    ///
    /// Nothing is looked up until the source is called, so a document that
    /// never reads the device never fails for want of one.
    #[must_use]
    pub fn device_source(&self, prefs: &Preferences, device_name: &str) -> DeviceSource {
        let devices = prefs.devices.clone();
        let factories = self.devices.clone();
        let device_name = device_name.to_string();
        Box::new(move || create_device(devices.as_ref(), &factories, &device_name))
    }
}

fn create_device(
    devices: Option<&BTreeMap<String, DeviceSettings>>,
    factories: &BTreeMap<String, DeviceFactory>,
    device_name: &str,
) -> Result<Box<dyn Theodolite>> {
    let devices = devices.ok_or_else(|| Error::device("No \"devices\" preference found."))?;
    let settings = devices.get(device_name).ok_or_else(|| {
        Error::device(format!(
            "Device \"{device_name}\" not found in \"devices\" preference."
        ))
    })?;
    let factory = factories.get(&settings.device_type).ok_or_else(|| {
        Error::device(format!(
            "Unrecognized device type \"{}\" specified for device \"{device_name}\" in preference \"devices\".",
            settings.device_type
        ))
    })?;
    let device = factory(&settings.device_config)?;
    info!(device = device_name, device_type = %settings.device_type, "created device");
    Ok(device)
}

#[allow(clippy::unnecessary_wraps)]
fn dummy_theodolite(_config: &serde_json::Value) -> Result<Box<dyn Theodolite>> {
    Ok(Box::new(DummyTheodolite))
}

fn simulated_theodolite(config: &serde_json::Value) -> Result<Box<dyn Theodolite>> {
    let seed = match config.get("seed") {
        None => 0,
        Some(seed) => seed.as_u64().ok_or_else(|| {
            Error::device(format!(
                "Simulated theodolite seed must be a non-negative integer, not {seed}."
            ))
        })?,
    };
    Ok(Box::new(SimulatedTheodolite::new(seed)))
}
