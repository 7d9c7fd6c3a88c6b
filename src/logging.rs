//! Logging capability.
//!
//! Adds verbosity flags to an application and installs a `tracing`
//! subscriber that honours them.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::{Arg, ArgAction, ArgMatches};
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

const VERBOSE: &str = "verbose";
const QUIET: &str = "quiet";
const SILENT: &str = "silent";
const LOGFILE: &str = "logfile";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file {path}: {source}")]
    Logfile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install log subscriber: {0}")]
    Subscriber(String),
}

/// Arguments contributed by the logging capability.
pub fn args() -> Vec<Arg> {
    vec![
        Arg::new(VERBOSE)
            .short('v')
            .long(VERBOSE)
            .help("Raise the logging level, may be repeated")
            .action(ArgAction::Count),
        Arg::new(QUIET)
            .short('q')
            .long(QUIET)
            .help("Decrease the logging level, may be repeated")
            .action(ArgAction::Count),
        Arg::new(SILENT)
            .short('s')
            .long(SILENT)
            .help("Only log to the log file, if any")
            .action(ArgAction::SetTrue),
        Arg::new(LOGFILE)
            .long(LOGFILE)
            .help("Log to this file")
            .value_name("PATH")
            .value_parser(clap::value_parser!(PathBuf)),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub verbosity: i16,
    pub silent: bool,
    pub logfile: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            verbosity: 0,
            silent: false,
            logfile: None,
        }
    }
}

impl LogSettings {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let count = |id: &str| {
            matches
                .try_get_one::<u8>(id)
                .ok()
                .flatten()
                .copied()
                .unwrap_or(0) as i16
        };
        Self {
            verbosity: count(VERBOSE) - count(QUIET),
            silent: matches
                .try_get_one::<bool>(SILENT)
                .ok()
                .flatten()
                .copied()
                .unwrap_or(false),
            logfile: matches
                .try_get_one::<PathBuf>(LOGFILE)
                .ok()
                .flatten()
                .cloned(),
        }
    }

    /// Warnings by default, one step per `-v`/`-q`.
    pub fn level(&self) -> LevelFilter {
        match self.verbosity {
            i16::MIN..=-1 => LevelFilter::ERROR,
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the flags.
///
/// Fails if a subscriber is already installed, which happens when a command
/// runs inside an interactive shell; callers treat that as harmless.
pub fn init(settings: &LogSettings) -> Result<(), LoggingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level().to_string()));

    let writer = match (&settings.logfile, settings.silent) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::Logfile {
                    path: path.clone(),
                    source,
                })?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        (None, true) => BoxMakeWriter::new(std::io::sink),
        (None, false) => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .compact()
        .try_init()
        .map_err(|e| LoggingError::Subscriber(e.to_string()))
}
