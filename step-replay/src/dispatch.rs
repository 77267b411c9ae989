// Copyright (c) The step-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{ExpectedError, InputSource, Result},
    events::{ReplayDriver, WireEvent},
    output::{OutputContext, OutputOpts, OutputWriter},
};
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::{self, BufRead, BufReader};
use step_reporter::{config::ReporterConfig, reporter::ReporterBuilder};
use tracing::{debug, warn};

/// Replay a recorded stream of test lifecycle events as step output.
///
/// Each line of the input is a JSON object naming its event in an `"event"`
/// field.
#[derive(Debug, Parser)]
#[command(name = "step-replay", version)]
pub struct StepReplayApp {
    /// Reporter config file
    #[arg(long, value_name = "PATH", env = "STEP_CONFIG")]
    config: Option<Utf8PathBuf>,

    #[clap(flatten)]
    output: OutputOpts,

    /// JSON-lines file to replay, or `-` for standard input
    #[arg(value_name = "INPUT")]
    input: Option<Utf8PathBuf>,
}

impl StepReplayApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<()> {
        let config = ReporterConfig::load(self.config.as_deref())
            .map_err(|err| ExpectedError::ConfigError { err })?;

        let source = match self.input {
            Some(path) if path != "-" => InputSource::File(path),
            _ => InputSource::Stdin,
        };
        let reader = open_input(&source)?;

        let mut builder = ReporterBuilder::from_config(&config);
        builder.set_colorize(output.colorize_report());
        let mut reporter = builder.build(output_writer.reporter_output());
        let mut driver = ReplayDriver::new(config.slow_threshold);

        debug!("replaying events from {source}");
        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = line.map_err(|err| ExpectedError::InputRead {
                input: source.clone(),
                line: line_number,
                err,
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let event: WireEvent =
                serde_json::from_str(&line).map_err(|err| ExpectedError::EventDecode {
                    input: source.clone(),
                    line: line_number,
                    err,
                })?;
            driver
                .replay(event, &mut reporter)
                .map_err(|err| ExpectedError::WriteEvent { err })?;
        }

        let open = driver.open_scopes();
        if open > 0 {
            warn!("input ended with {open} suite(s) still open");
        }

        Ok(())
    }
}

fn open_input(source: &InputSource) -> Result<Box<dyn BufRead>> {
    match source {
        InputSource::Stdin => Ok(Box::new(io::stdin().lock())),
        InputSource::File(path) => {
            let file = std::fs::File::open(path).map_err(|err| ExpectedError::InputOpen {
                path: path.clone(),
                err,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}
