// Copyright (c) The step-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Color selection, diagnostic logging, and where the report goes.
//!
//! The report itself is written to stdout by the reporter. Everything else
//! (warnings, errors, and `--verbose` debug output) is logged to stderr
//! through `tracing`.

use clap::{Args, ValueEnum};
use owo_colors::{OwoColorize, Style, style};
use std::fmt;
use step_reporter::reporter::ReporterOutput;
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    level_filters::LevelFilter,
    warn,
};
use tracing_subscriber::{
    Layer,
    filter::{ParseError, Targets},
    fmt::{FmtContext, FormatEvent, FormatFields, format::Writer},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Environment variable holding the log filter, in `tracing` target syntax
/// (for example `step_replay=trace,info`).
const LOG_ENV: &str = "STEP_LOG";

/// Log events with this target are printed without a heading. Used for the
/// continuation lines of an error's source chain.
pub(crate) const NO_HEADING_TARGET: &str = "step_replay::no_heading";

#[derive(Copy, Clone, Debug, Args)]
pub(crate) struct OutputOpts {
    /// Log how events are decoded and replayed
    #[arg(long, short)]
    pub(crate) verbose: bool,

    /// Produce color output: auto, always, never
    #[arg(
        long,
        value_enum,
        default_value_t,
        hide_possible_values = true,
        value_name = "WHEN",
        env = "CARGO_TERM_COLOR"
    )]
    pub(crate) color: Color,
}

impl OutputOpts {
    /// Installs the logger and returns the resolved output settings.
    pub(crate) fn init(self) -> OutputContext {
        init_logger(self.color.should_colorize(supports_color::Stream::Stderr), self.verbose);
        OutputContext { color: self.color }
    }
}

/// Output settings, resolved once logging has been set up.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct OutputContext {
    pub(crate) color: Color,
}

impl OutputContext {
    /// Returns true if the report on stdout should be colorized.
    pub fn colorize_report(&self) -> bool {
        self.color.should_colorize(supports_color::Stream::Stdout)
    }

    /// Returns styles for messages written to stderr.
    pub fn stderr_styles(&self) -> StderrStyles {
        let mut styles = StderrStyles::default();
        if self.color.should_colorize(supports_color::Stream::Stderr) {
            styles.bold = style().bold();
        }
        styles
    }
}

/// When to produce colored output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
#[must_use]
pub enum Color {
    /// Color when the stream supports it.
    #[default]
    Auto,

    /// Always color.
    Always,

    /// Never color.
    Never,
}

impl Color {
    pub(crate) fn should_colorize(self, stream: supports_color::Stream) -> bool {
        match self {
            Color::Auto => supports_color::on_cached(stream).is_some(),
            Color::Always => true,
            Color::Never => false,
        }
    }
}

/// Styles for messages written to stderr.
#[derive(Debug, Default)]
pub struct StderrStyles {
    pub(crate) bold: Style,
}

static INIT_LOGGER: std::sync::Once = std::sync::Once::new();

fn init_logger(colorize: bool, verbose: bool) {
    INIT_LOGGER.call_once(|| {
        let filter = std::env::var(LOG_ENV).ok();
        let (targets, invalid) = match log_targets(filter.as_deref(), verbose) {
            Ok(targets) => (targets, None),
            Err((fallback, error)) => (fallback, Some(error)),
        };

        let layer = tracing_subscriber::fmt::layer()
            .event_format(LogFormat { colorize })
            .with_writer(std::io::stderr)
            .with_filter(targets);
        tracing_subscriber::registry().with(layer).init();

        if let Some(error) = invalid {
            warn!("ignoring {LOG_ENV}: {error}");
        }
    });
}

/// Builds the log filter from the `STEP_LOG` value.
///
/// An unset or empty value logs at info, or debug with `--verbose`. An
/// invalid value is returned as an error alongside that same default.
fn log_targets(filter: Option<&str>, verbose: bool) -> Result<Targets, (Targets, ParseError)> {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let default = Targets::new().with_default(default_level);

    match filter {
        None | Some("") => Ok(default),
        Some(filter) => filter.parse().map_err(|error| (default, error)),
    }
}

/// Prints `error:` and `warning:` headings for problems, and prefixes
/// everything else with the module that logged it.
struct LogFormat {
    colorize: bool,
}

impl LogFormat {
    fn heading_style(&self, level: Level) -> Style {
        if !self.colorize {
            return Style::new();
        }
        match level {
            Level::ERROR => style().red().bold(),
            Level::WARN => style().yellow().bold(),
            _ => style().dimmed(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for LogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let level = *metadata.level();
        let heading_style = self.heading_style(level);

        if metadata.target() != NO_HEADING_TARGET {
            match level {
                Level::ERROR => write!(writer, "{}: ", "error".style(heading_style))?,
                Level::WARN => write!(writer, "{}: ", "warning".style(heading_style))?,
                _ => write!(writer, "{}: ", metadata.target().style(heading_style))?,
            }
        }

        let mut fields = FieldWriter {
            writer: &mut writer,
            result: Ok(()),
        };
        event.record(&mut fields);
        fields.result?;

        writeln!(writer)
    }
}

/// Writes the message, then any other fields as ` name=value`.
struct FieldWriter<'a, 'w> {
    writer: &'a mut Writer<'w>,
    result: fmt::Result,
}

impl Visit for FieldWriter<'_, '_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if self.result.is_err() {
            return;
        }
        self.result = match field.name() {
            "message" => write!(self.writer, "{value:?}"),
            name => write!(self.writer, " {name}={value:?}"),
        };
    }
}

/// Where the report is written.
///
/// Reports normally go to stdout; tests capture them in memory instead.
#[derive(Debug, Default)]
pub enum OutputWriter {
    /// Write to stdout.
    #[default]
    Normal,

    /// Capture the report.
    Capture {
        /// The captured report.
        stdout: String,
    },
}

impl OutputWriter {
    /// Creates a writer that captures the report in memory.
    pub fn capture() -> Self {
        Self::Capture {
            stdout: String::new(),
        }
    }

    /// Returns the captured report, or an empty string if nothing was
    /// captured.
    pub fn captured_stdout(&self) -> &str {
        match self {
            Self::Normal => "",
            Self::Capture { stdout } => stdout,
        }
    }

    pub(crate) fn reporter_output(&mut self) -> ReporterOutput<'_> {
        match self {
            Self::Normal => ReporterOutput::Terminal,
            Self::Capture { stdout } => ReporterOutput::Buffer(stdout),
        }
    }
}
