//! Maka document files.
//!
//! A document file is UTF-8 text:
//!
//! ```text
//! Maka Document
//! Document Format: HMMC Document Format 1.01
//! 00001 2013-07-29 09:15:02 Start*
//! ...
//! ```
//!
//! The two header lines name the format the remaining lines are written in.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use maka_foundation::{Error, ErrorKind, Result};
use tracing::info;

use crate::config::Preferences;
use crate::document::Document;
use crate::registry::Registry;

/// First line of every document file.
pub const FILE_HEADER: &str = "Maka Document";

/// Prefix of the second line, followed by the document format name.
pub const FORMAT_HEADER_PREFIX: &str = "Document Format: ";

/// Line number of the first observation line.
const FIRST_OBSERVATION_LINE: usize = 3;

/// Writes a document as file text.
///
/// # Errors
///
/// Returns an error if an observation cannot be formatted.
pub fn write_text(document: &Document) -> Result<String> {
    let mut text = format!(
        "{FILE_HEADER}\n{FORMAT_HEADER_PREFIX}{}\n",
        document.dialect().name()
    );
    text.push_str(&document.to_text()?);
    Ok(text)
}

/// Reads file text into a document, choosing the dialect by its header.
///
/// # Errors
///
/// Returns a document format error for a bad header, an unknown format,
/// or a bad observation line.
pub fn read_text(text: &str, registry: &Registry, prefs: &Preferences) -> Result<Document> {
    let mut lines = text.splitn(3, '\n');

    let first = lines.next().map(trim_line);
    if first != Some(FILE_HEADER) {
        return Err(Error::document_format(1, "File is not a Maka document."));
    }

    let format_name = lines
        .next()
        .map(trim_line)
        .and_then(|line| line.strip_prefix(FORMAT_HEADER_PREFIX))
        .ok_or_else(|| {
            Error::document_format(2, "Missing \"Document Format:\" header line.")
        })?
        .trim();

    let dialect = registry.dialect(format_name).ok_or_else(|| {
        Error::document_format(2, format!("Unrecognized document format \"{format_name}\"."))
    })?;

    let body = lines.next().unwrap_or("");
    let observations = dialect
        .document_format()
        .parse_document(body, FIRST_OBSERVATION_LINE)?;

    Ok(Document::from_observations(dialect.clone(), observations)
        .with_history_capacity(prefs.history_size))
}

/// Saves a document to `path` and marks it saved.
///
/// # Errors
///
/// Returns an error if formatting or writing fails.
pub fn save(document: &mut Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let text = write_text(document)?;

    let file = File::create(path).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to create file '{}': {e}",
            path.display()
        )))
    })?;
    let mut writer = BufWriter::new(file);
    writer.write_all(text.as_bytes()).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to write to file '{}': {e}",
            path.display()
        )))
    })?;
    writer.flush().map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to flush file '{}': {e}",
            path.display()
        )))
    })?;

    document.set_file_path(path);
    document.mark_saved();
    info!(path = %path.display(), observations = document.len(), "saved document");
    Ok(())
}

/// Opens the document at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid document.
pub fn open(path: impl AsRef<Path>, registry: &Registry, prefs: &Preferences) -> Result<Document> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to open file '{}': {e}",
            path.display()
        )))
    })?;
    let document = read_text(&text, registry, prefs)?.with_file_path(path);
    info!(path = %path.display(), observations = document.len(), "opened document");
    Ok(document)
}

fn trim_line(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}
