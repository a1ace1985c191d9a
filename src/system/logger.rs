use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy)]
pub(crate) struct LogSettings<'cfg> {
    pub(crate) verbose: bool,
    pub(crate) level: &'cfg str,
    pub(crate) file: Option<&'cfg str>,
    pub(crate) no_color: bool,
}

/// `APISTRESS_LOG`, then `RUST_LOG`, then `debug` for verbose runs, then the
/// configured level.
fn filter_spec(env_value: Option<String>, verbose: bool, level: &str) -> String {
    match env_value {
        Some(value) if !value.trim().is_empty() => value,
        Some(_) | None if verbose => "debug".to_owned(),
        Some(_) | None => level.to_owned(),
    }
}

fn env_filter(settings: &LogSettings<'_>) -> EnvFilter {
    let env_value = std::env::var("APISTRESS_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();
    let spec = filter_spec(env_value, settings.verbose, settings.level);
    EnvFilter::try_new(&spec).unwrap_or_else(|err| {
        eprintln!("Invalid log filter '{}': {}; using info", spec, err);
        EnvFilter::new("info")
    })
}

/// Installs the global subscriber. Logs go to stderr so a JSON summary on
/// stdout stays parseable; a log file, when set, receives a copy.
///
/// # Errors
///
/// Returns an error when the log file cannot be opened.
pub(crate) fn init_logging(settings: &LogSettings<'_>) -> AppResult<()> {
    let filter = env_filter(settings);
    let writer = match settings.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| AppError::LogFile {
                    path: path.into(),
                    source: err,
                })?;
            BoxMakeWriter::new(std::io::stderr.and(Mutex::new(file)))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(!settings.no_color && settings.file.is_none())
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
    Ok(())
}
