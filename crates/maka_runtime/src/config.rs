//! User preferences.
//!
//! Preferences are a JSON document:
//!
//! ```json
//! {
//!     "defaultDocumentFilePath": "/data/today.maka",
//!     "defaultDocumentFormat": "'96 MMRP Grammar 1.01",
//!     "logFilter": "maka_command=debug",
//!     "historySize": 500,
//!     "devices": {
//!         "Theodolite": {
//!             "deviceType": "Simulated Theodolite",
//!             "deviceConfig": { "seed": 7 }
//!         }
//!     }
//! }
//! ```
//!
//! Every key is optional.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use maka_dialect::HMMC_FORMAT_NAME;
use maka_foundation::{Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::history::DEFAULT_HISTORY_SIZE;

/// Environment variable naming the preferences file.
pub const PREFERENCES_ENV: &str = "MAKA_PREFERENCES";

/// Settings for one named device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSettings {
    /// Registered device type, e.g. `Simulated Theodolite`.
    pub device_type: String,

    /// Type-specific configuration handed to the device factory.
    #[serde(default)]
    pub device_config: serde_json::Value,
}

impl DeviceSettings {
    /// Creates settings for a device of `device_type` with no configuration.
    #[must_use]
    pub fn new(device_type: impl Into<String>) -> Self {
        Self {
            device_type: device_type.into(),
            device_config: serde_json::Value::Null,
        }
    }

    /// Builder method to set the device configuration.
    #[must_use]
    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.device_config = config;
        self
    }
}

/// User preferences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    /// Document opened at startup when no file is named.
    pub default_document_file_path: Option<PathBuf>,

    /// Format of new documents.
    pub default_document_format: String,

    /// Log filter used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,

    /// Number of edits kept for undo.
    pub history_size: usize,

    /// Devices by name.
    pub devices: Option<BTreeMap<String, DeviceSettings>>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_document_file_path: None,
            default_document_format: HMMC_FORMAT_NAME.to_string(),
            log_filter: None,
            history_size: DEFAULT_HISTORY_SIZE,
            devices: None,
        }
    }
}

impl Preferences {
    /// Parses preferences from JSON text.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the text is not valid preferences.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::new(ErrorKind::Config(e.to_string())))
    }

    /// Loads preferences from a file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the file if it cannot be read
    /// or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::new(ErrorKind::Config(format!(
                "failed to read preferences file '{}': {e}",
                path.display()
            )))
        })?;
        let prefs = serde_json::from_str(&text).map_err(|e| {
            Error::new(ErrorKind::Config(format!(
                "invalid preferences file '{}': {e}",
                path.display()
            )))
        })?;
        debug!(path = %path.display(), "loaded preferences");
        Ok(prefs)
    }

    /// Loads preferences from `explicit`, else from the file named by
    /// `MAKA_PREFERENCES`, else returns the defaults.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a named file cannot be loaded.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        Self::locate_with(explicit, std::env::var_os(PREFERENCES_ENV))
    }

    fn locate_with(explicit: Option<&Path>, env: Option<OsString>) -> Result<Self> {
        match (explicit, env) {
            (Some(path), _) => Self::load(path),
            (None, Some(path)) if !path.is_empty() => Self::load(PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }

    /// Returns the settings of the device named `name`.
    #[must_use]
    pub fn device(&self, name: &str) -> Option<&DeviceSettings> {
        self.devices.as_ref().and_then(|d| d.get(name))
    }

    /// Builder method to set the default document path.
    #[must_use]
    pub fn with_default_document_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_document_file_path = Some(path.into());
        self
    }

    /// Builder method to set the format of new documents.
    #[must_use]
    pub fn with_default_document_format(mut self, name: impl Into<String>) -> Self {
        self.default_document_format = name.into();
        self
    }

    /// Builder method to set the log filter.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    /// Builder method to set the undo depth.
    #[must_use]
    pub fn with_history_size(mut self, size: usize) -> Self {
        self.history_size = size;
        self
    }

    /// Builder method to add a device.
    #[must_use]
    pub fn with_device(mut self, name: impl Into<String>, settings: DeviceSettings) -> Self {
        self.devices
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), settings);
        self
    }
}
