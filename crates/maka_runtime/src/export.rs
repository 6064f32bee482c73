//! Exporting documents as structured data.
//!
//! An export is one record:
//!
//! ```json
//! {
//!     "documentFormat": "HMMC Document Format 1.01",
//!     "observations": [
//!         { "type": "Start", "fields": { "observationNum": 1, "date": "2013-07-29", ... } }
//!     ]
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use maka_foundation::{Error, ErrorKind, Result};
use maka_schema::Observation;
use serde::Serialize;
use tracing::info;

use crate::document::Document;

/// Export encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Pretty-printed JSON.
    Json,
    /// `MessagePack` with named fields.
    Msgpack,
}

impl ExportFormat {
    /// Returns the format's name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Msgpack => "msgpack",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "msgpack" | "messagepack" => Ok(Self::Msgpack),
            _ => Err(Error::new(ErrorKind::Serialization(format!(
                "Unknown export format \"{s}\"; expected json or msgpack."
            )))),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Export<'a> {
    document_format: &'a str,
    observations: Vec<&'a Observation>,
}

impl<'a> Export<'a> {
    fn of(document: &'a Document) -> Self {
        Self {
            document_format: document.dialect().name(),
            observations: document.observations().iter().collect(),
        }
    }
}

/// Encodes a document's observations.
///
/// # Errors
///
/// Returns a serialization error if encoding fails.
pub fn to_bytes(document: &Document, format: ExportFormat) -> Result<Vec<u8>> {
    let export = Export::of(document);
    match format {
        ExportFormat::Json => serde_json::to_vec_pretty(&export)
            .map_err(|e| Error::new(ErrorKind::Serialization(e.to_string()))),
        ExportFormat::Msgpack => rmp_serde::to_vec_named(&export)
            .map_err(|e| Error::new(ErrorKind::Serialization(e.to_string()))),
    }
}

/// Writes a document's observations to `path`.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn export_to_file(
    document: &Document,
    format: ExportFormat,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_bytes(document, format)?;
    fs::write(path, bytes).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to write to file '{}': {e}",
            path.display()
        )))
    })?;
    info!(path = %path.display(), %format, observations = document.len(), "exported document");
    Ok(())
}
