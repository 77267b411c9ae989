// Copyright (c) The step-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporter configuration.
//!
//! Defaults are embedded in the binary. A config file may override any subset
//! of them:
//!
//! ```toml
//! [reporter]
//! symbols = "ascii"
//! diff = false
//! slow-threshold = "200ms"
//! ```
//!
//! Unknown keys are reported as warnings rather than errors, so a config file
//! written for a newer version still loads.

use crate::{errors::ReporterConfigError, reporter::SymbolSet};
use camino::Utf8Path;
use serde::{Deserialize, de::DeserializeOwned};
use std::{collections::BTreeSet, time::Duration};
use tracing::{debug, warn};

/// Reporter configuration after the config file has been applied over the
/// defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReporterConfig {
    /// Symbols shown in front of test outcomes.
    pub symbols: SymbolSet,

    /// Whether actual/expected diffs are shown.
    pub diff: bool,

    /// Threshold used to classify test speed when events don't carry one.
    pub slow_threshold: Duration,
}

impl ReporterConfig {
    /// The embedded default config.
    const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Returns the built-in defaults.
    pub fn builtin() -> Self {
        let (config, unknown) = DefaultConfig::deserialize_toml(Self::DEFAULT_CONFIG)
            .unwrap_or_else(|error| panic!("embedded default config is invalid: {error}"));
        // The embedded config ships with this binary, so unknown keys are a bug.
        if !unknown.is_empty() {
            panic!(
                "found unknown keys in default config: {}",
                unknown.into_iter().collect::<Vec<_>>().join(", ")
            );
        }

        let DefaultReporterConfig {
            symbols,
            diff,
            slow_threshold,
        } = config.reporter;
        Self {
            symbols,
            diff,
            slow_threshold,
        }
    }

    /// Loads the defaults, then applies the config file at `path` if one is
    /// given. Unknown keys are logged as warnings.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self, ReporterConfigError> {
        Self::load_with_warnings(path, &mut DefaultConfigWarnings)
    }

    /// Like [`load`](Self::load), but with custom handling for warnings.
    pub fn load_with_warnings(
        path: Option<&Utf8Path>,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Self, ReporterConfigError> {
        let mut config = Self::builtin();
        let Some(path) = path else {
            debug!("reporter config: no config file specified, using defaults");
            return Ok(config);
        };

        debug!("reporter config: loading from {path}");
        let contents =
            std::fs::read_to_string(path).map_err(|error| ReporterConfigError::Read {
                path: path.to_owned(),
                error,
            })?;

        let (deserialized, unknown) =
            DeserializedConfig::deserialize_toml(&contents).map_err(|error| {
                ReporterConfigError::Parse {
                    path: path.to_owned(),
                    error,
                }
            })?;
        if !unknown.is_empty() {
            warnings.unknown_config_keys(path, &unknown);
        }

        config.apply(deserialized.reporter);
        debug!("reporter config: loaded successfully from {path}");
        Ok(config)
    }

    fn apply(&mut self, overrides: DeserializedReporterConfig) {
        let DeserializedReporterConfig {
            symbols,
            diff,
            slow_threshold,
        } = overrides;

        if let Some(symbols) = symbols {
            self.symbols = symbols;
        }
        if let Some(diff) = diff {
            self.diff = diff;
        }
        if let Some(slow_threshold) = slow_threshold {
            self.slow_threshold = slow_threshold;
        }
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Receives warnings produced while loading a config file.
pub trait ConfigWarnings {
    /// Called with the keys in `config_file` that were not recognized.
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>);
}

/// Logs warnings with `tracing`.
struct DefaultConfigWarnings;

impl ConfigWarnings for DefaultConfigWarnings {
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>) {
        let mut unknown_str = String::new();
        if unknown.len() == 1 {
            // Print this on the same line.
            unknown_str.push_str("key: ");
            unknown_str.extend(unknown.iter().map(String::as_str));
        } else {
            unknown_str.push_str("keys:\n");
            for ignored_key in unknown {
                unknown_str.push_str("\n  - ");
                unknown_str.push_str(ignored_key);
            }
        }

        warn!("in reporter config file {config_file}, ignoring unknown configuration {unknown_str}");
    }
}

/// Deserializes TOML, collecting the paths of any keys that weren't used.
fn deserialize_toml<T: DeserializeOwned>(
    contents: &str,
) -> Result<(T, BTreeSet<String>), toml::de::Error> {
    let deserializer = toml::Deserializer::parse(contents)?;
    let mut unknown = BTreeSet::new();
    let config = serde_ignored::deserialize(deserializer, |path| {
        unknown.insert(path.to_string());
    })?;
    Ok((config, unknown))
}

/// The embedded defaults, with every value required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultConfig {
    reporter: DefaultReporterConfig,
}

impl DefaultConfig {
    fn deserialize_toml(contents: &str) -> Result<(Self, BTreeSet<String>), toml::de::Error> {
        deserialize_toml(contents)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultReporterConfig {
    symbols: SymbolSet,
    diff: bool,
    #[serde(with = "humantime_serde")]
    slow_threshold: Duration,
}

/// A user config file. All fields are optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedConfig {
    #[serde(default)]
    reporter: DeserializedReporterConfig,
}

impl DeserializedConfig {
    fn deserialize_toml(contents: &str) -> Result<(Self, BTreeSet<String>), toml::de::Error> {
        deserialize_toml(contents)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedReporterConfig {
    symbols: Option<SymbolSet>,
    diff: Option<bool>,
    #[serde(default, with = "humantime_serde")]
    slow_threshold: Option<Duration>,
}
