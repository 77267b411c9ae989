// Copyright (c) The step-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use owo_colors::OwoColorize;
use std::{error::Error, fmt};
use step_reporter::errors::{ReporterConfigError, WriteEventError};
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

/// Documented exit codes for `step-replay` failures.
///
/// Unknown or unexpected failures always result in exit code 1.
pub enum ReplayExitCode {}

impl ReplayExitCode {
    /// The replay completed normally.
    pub const OK: i32 = 0;

    /// The config file or the input could not be set up.
    pub const SETUP_ERROR: i32 = 2;

    /// The input contained a line that isn't a valid event.
    pub const MALFORMED_INPUT: i32 = 3;

    /// Writing the report produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 4;
}

/// Where events are read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputSource {
    /// Standard input.
    Stdin,

    /// A JSON-lines file.
    File(Utf8PathBuf),
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "standard input"),
            Self::File(path) => write!(f, "{path}"),
        }
    }
}

// The #[error()] strings are short summaries. Errors are meant to be printed
// with display_to_stderr, which walks the source chain.

/// An expected failure of the replay tool.
#[derive(Debug, Error)]
pub enum ExpectedError {
    /// The reporter config could not be loaded.
    #[error("failed to load reporter config")]
    ConfigError {
        /// The underlying error.
        #[source]
        err: ReporterConfigError,
    },

    /// The input file could not be opened.
    #[error("failed to open input `{path}`")]
    InputOpen {
        /// The path that was opened.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: std::io::Error,
    },

    /// Reading a line from the input failed.
    #[error("failed to read from {input}")]
    InputRead {
        /// The input being read.
        input: InputSource,

        /// The 1-based line number.
        line: usize,

        /// The underlying error.
        #[source]
        err: std::io::Error,
    },

    /// A line could not be decoded as an event.
    #[error("{input}, line {line}: invalid event")]
    EventDecode {
        /// The input being read.
        input: InputSource,

        /// The 1-based line number.
        line: usize,

        /// The underlying error.
        #[source]
        err: serde_json::Error,
    },

    /// The reporter failed to write an event.
    #[error("failed to write report")]
    WriteEvent {
        /// The underlying error.
        #[source]
        err: WriteEventError,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigError { .. } | Self::InputOpen { .. } => ReplayExitCode::SETUP_ERROR,
            Self::InputRead { .. } | Self::EventDecode { .. } => ReplayExitCode::MALFORMED_INPUT,
            Self::WriteEvent { .. } => ReplayExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::ConfigError { err } => {
                error!("failed to load reporter config");
                Some(err as &dyn Error)
            }
            Self::InputOpen { path, err } => {
                error!("failed to open input `{}`", path.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::InputRead { input, line, err } => {
                error!("failed to read line {line} of {}", input.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::EventDecode { input, line, err } => {
                error!("line {line} of {} is not a valid event", input.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::WriteEvent { err } => {
                error!("failed to write report");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
