// Copyright (c) The step-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The main structure in this module is [`Reporter`], constructed via a
//! [`ReporterBuilder`].

use super::{
    StepEvent,
    displayer::DisplayReporterImpl,
    helpers::{Styles, SymbolSet, ThemeSymbols},
};
use crate::{
    config::ReporterConfig, errors::WriteEventError, indentation::Indentation, write_str::WriteStr,
};
use std::io::BufWriter;

/// Where the reporter writes its output.
///
/// This is usually the terminal, but can be an in-memory buffer for tests.
#[derive(Debug)]
pub enum ReporterOutput<'a> {
    /// Write to standard output.
    Terminal,

    /// Write to a buffer.
    Buffer(&'a mut String),
}

/// Reporter builder.
#[derive(Clone, Debug)]
pub struct ReporterBuilder {
    should_colorize: bool,
    symbols: SymbolSet,
    show_diffs: bool,
}

impl Default for ReporterBuilder {
    fn default() -> Self {
        Self {
            should_colorize: false,
            symbols: SymbolSet::Auto,
            show_diffs: true,
        }
    }
}

impl ReporterBuilder {
    /// Creates a builder with settings taken from `config`.
    pub fn from_config(config: &ReporterConfig) -> Self {
        Self {
            should_colorize: false,
            symbols: config.symbols,
            show_diffs: config.diff,
        }
    }

    /// Set to true if the reporter should colorize output.
    pub fn set_colorize(&mut self, should_colorize: bool) -> &mut Self {
        self.should_colorize = should_colorize;
        self
    }

    /// Sets the symbols shown in front of test outcomes.
    pub fn set_symbols(&mut self, symbols: SymbolSet) -> &mut Self {
        self.symbols = symbols;
        self
    }

    /// Set to false to never show actual/expected diffs, even for failures that
    /// ask for one.
    pub fn set_show_diffs(&mut self, show_diffs: bool) -> &mut Self {
        self.show_diffs = show_diffs;
        self
    }

    /// Creates a new reporter.
    pub fn build<'a>(&self, output: ReporterOutput<'a>) -> Reporter<'a> {
        let mut styles = Styles::default();
        if self.should_colorize {
            styles.colorize();
        }

        let mut symbols = ThemeSymbols::default();
        let use_unicode = match (self.symbols, &output) {
            (SymbolSet::Unicode, _) => true,
            (SymbolSet::Ascii, _) => false,
            (SymbolSet::Auto, ReporterOutput::Terminal) => {
                supports_unicode::on(supports_unicode::Stream::Stdout)
            }
            // Always use Unicode for internal buffers.
            (SymbolSet::Auto, ReporterOutput::Buffer(_)) => true,
        };
        if use_unicode {
            symbols.use_unicode();
        }

        Reporter {
            inner: DisplayReporterImpl {
                indentation: Indentation::new(),
                styles,
                symbols,
                show_diffs: self.show_diffs,
            },
            output,
        }
    }
}

/// Renders lifecycle events to the console, one line (or block) per event.
///
/// A reporter is driven entirely by [`report_event`](Self::report_event)
/// calls. Output is written in the order events arrive.
#[derive(Debug)]
pub struct Reporter<'a> {
    inner: DisplayReporterImpl,
    output: ReporterOutput<'a>,
}

impl<'a> Reporter<'a> {
    /// Report a lifecycle event.
    pub fn report_event(&mut self, event: StepEvent<'_>) -> Result<(), WriteEventError> {
        match &mut self.output {
            ReporterOutput::Terminal => {
                let mut writer = BufWriter::new(std::io::stdout());
                self.inner
                    .write_event_impl(event, &mut writer)
                    .map_err(WriteEventError::Io)?;
                writer.write_str_flush().map_err(WriteEventError::Io)
            }
            ReporterOutput::Buffer(buf) => self
                .inner
                .write_event_impl(event, *buf)
                .map_err(WriteEventError::Io),
        }
    }

    /// Returns the current nesting depth.
    pub fn depth(&self) -> usize {
        self.inner.indentation.depth()
    }
}
