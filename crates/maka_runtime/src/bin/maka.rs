//! Maka CLI entry point.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use maka_foundation::{Error, ErrorKind, Result};
use maka_runtime::repl::print_error;
use maka_runtime::{ExportFormat, Preferences, Registry, Repl, Session};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Field-data entry for marine-mammal observation sessions.
#[derive(Parser, Debug)]
#[command(name = "maka", version, about)]
struct Cli {
    /// Document to open, or to create if it does not exist
    file: Option<PathBuf>,

    /// Document format of a new document
    #[arg(long, value_name = "NAME")]
    format: Option<String>,

    /// Preferences file (defaults to $MAKA_PREFERENCES)
    #[arg(long, value_name = "PATH")]
    preferences: Option<PathBuf>,

    /// Run the commands in SCRIPT and exit instead of starting the REPL
    #[arg(long, value_name = "SCRIPT")]
    batch: Option<PathBuf>,

    /// Export the document and exit
    #[arg(long, value_enum, requires = "output")]
    export: Option<ExportFormat>,

    /// Export destination
    #[arg(long, value_name = "PATH", requires = "export")]
    output: Option<PathBuf>,

    /// List the known document formats and exit
    #[arg(long)]
    list_formats: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let preferences = Preferences::locate(cli.preferences.as_deref());
    init_logging(
        preferences
            .as_ref()
            .ok()
            .and_then(|p| p.log_filter.as_deref()),
    );
    let mut preferences = preferences?;

    let registry = Arc::new(Registry::builtin()?);
    if cli.list_formats {
        for name in registry.dialect_names() {
            println!("{name}");
        }
        return Ok(());
    }

    if let Some(format) = &cli.format {
        registry.require_dialect(format)?;
        preferences.default_document_format.clone_from(format);
    }

    let file = cli
        .file
        .clone()
        .or_else(|| preferences.default_document_file_path.clone());
    let mut session = Session::new(registry, preferences)?;
    if let Some(path) = file {
        if path.exists() {
            session.open(&path)?;
        } else {
            info!(path = %path.display(), "starting new document");
            session.set_file_path(path);
        }
    }

    let mut repl = Repl::new(session)?;

    if let Some(script) = &cli.batch {
        let text = fs::read_to_string(script).map_err(|e| {
            Error::new(ErrorKind::Io(format!(
                "failed to read script '{}': {e}",
                script.display()
            )))
        })?;
        repl.run_script(&text, &script.display().to_string())?;
    }

    if let (Some(format), Some(output)) = (cli.export, &cli.output) {
        repl.session().export(format, output)?;
    }

    if cli.batch.is_some() || cli.export.is_some() {
        return Ok(());
    }

    repl.run()
}

/// Logs to stderr, filtered by `RUST_LOG`, else the preference, else `warn`.
fn init_logging(preferred: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| preferred.and_then(|f| EnvFilter::try_new(f).ok()))
        .unwrap_or_else(|| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
