// Copyright (c) The step-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by step-reporter.

use camino::Utf8PathBuf;
use thiserror::Error;

/// An error that occurs while writing an event.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteEventError {
    /// An error occurred while writing the event to the provided output.
    #[error("error writing to output")]
    Io(#[source] std::io::Error),
}

/// An error that occurred while loading reporter configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReporterConfigError {
    /// The config file could not be read.
    #[error("failed to read reporter config at `{path}`")]
    Read {
        /// The path that was read.
        path: Utf8PathBuf,

        /// The underlying I/O error.
        #[source]
        error: std::io::Error,
    },

    /// The config file is not valid TOML, or has values of the wrong type.
    #[error("failed to parse reporter config at `{path}`")]
    Parse {
        /// The path that was parsed.
        path: Utf8PathBuf,

        /// The underlying parse error.
        #[source]
        error: toml::de::Error,
    },
}
