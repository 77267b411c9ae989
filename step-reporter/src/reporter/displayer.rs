// Copyright (c) The step-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Renders lifecycle events as indented lines.

use super::{
    Case, Failure, RunScope, StepEvent, StepEventKind,
    diagnostic::Diagnostic,
    helpers::{Styles, ThemeSymbols},
};
use crate::{indentation::Indentation, write_str::WriteStr};
use chrono::{DateTime, FixedOffset};
use owo_colors::OwoColorize;
use std::{fmt, io, time::Duration};
use tracing::debug;

/// Rendering state for one reporter: the indentation depth plus the theme.
#[derive(Debug)]
pub(super) struct DisplayReporterImpl {
    pub(super) indentation: Indentation,
    pub(super) styles: Styles,
    pub(super) symbols: ThemeSymbols,
    pub(super) show_diffs: bool,
}

impl DisplayReporterImpl {
    pub(super) fn write_event_impl(
        &mut self,
        event: StepEvent<'_>,
        writer: &mut dyn WriteStr,
    ) -> io::Result<()> {
        let timestamp = event.timestamp;
        match event.kind {
            StepEventKind::SuiteStarted { scope } => {
                scope.start_time = Some(timestamp);
                writeln!(
                    writer,
                    "{}{}",
                    self.indentation.prefix(),
                    scope.title.style(self.styles.suite)
                )?;
                self.indentation.enter();
            }
            StepEventKind::SuiteFinished { scope } => {
                let depth = self.indentation.exit();
                record_scope_end(scope, timestamp);

                // The end line uses the depth after exiting, which lines it up
                // with the suite's title. Renderers that join `depth` units
                // with a separator put it one level shallower.
                let indent = self.indentation.prefix();
                if depth > 0 {
                    writeln!(
                        writer,
                        "{indent}{}",
                        format_args!("end {}", scope.title).style(self.styles.suite)
                    )?;
                } else {
                    let total = scope.total_duration.unwrap_or_default();
                    writeln!(
                        writer,
                        "{indent}{}",
                        format_args!("Total Duration ({})", DisplayMillis(total))
                            .style(self.styles.suite)
                    )?;
                }
            }
            StepEventKind::TestPending { case } => {
                writeln!(
                    writer,
                    "{}{}",
                    self.indentation.prefix(),
                    format_args!("* skipped {}", case.title).style(self.styles.skipped)
                )?;
            }
            StepEventKind::TestStarted { case } => {
                let indent = self.indentation.prefix();
                if case.current_retry > 0 {
                    writeln!(
                        writer,
                        "{indent}{}",
                        format_args!("- retry{} {}", case.current_retry, case.title)
                            .style(self.styles.retry)
                    )?;
                } else {
                    writeln!(
                        writer,
                        "{indent}{}",
                        format_args!("- start {}", case.title).style(self.styles.pending)
                    )?;
                }
            }
            StepEventKind::TestPassed { case } => {
                writeln!(
                    writer,
                    "{}{}{}",
                    self.indentation.prefix(),
                    format_args!("{} passed {}", self.symbols.ok, case.title)
                        .style(self.styles.bright_pass),
                    format_args!(" ({})", DisplayMillis(case.duration))
                        .style(self.styles.speed(case.speed)),
                )?;
            }
            StepEventKind::TestFailed { case, failure } => {
                writeln!(
                    writer,
                    "{}{}{}",
                    self.indentation.prefix(),
                    format_args!("{} failed {}", self.symbols.err, case.title)
                        .style(self.styles.fail),
                    format_args!(" ({})", DisplayMillis(case.duration)).style(self.styles.fail),
                )?;
                self.write_diagnostic(case, failure, writer)?;
            }
            StepEventKind::TestAttemptFailedWillRetry { case, failure } => {
                writeln!(
                    writer,
                    "{}{}{}",
                    self.indentation.prefix(),
                    format_args!("{} failed {}", self.symbols.bang, case.title)
                        .style(self.styles.bright_fail),
                    format_args!(" ({})", DisplayMillis(case.duration)).style(self.styles.fail),
                )?;
                self.write_diagnostic(case, failure, writer)?;
            }
            StepEventKind::RunStarted
            | StepEventKind::HookStarted { .. }
            | StepEventKind::HookFinished { .. }
            | StepEventKind::TestFinished { .. }
            | StepEventKind::RunFinished => {}
        }

        Ok(())
    }

    fn write_diagnostic(
        &self,
        case: &Case,
        failure: &Failure,
        writer: &mut dyn WriteStr,
    ) -> io::Result<()> {
        let diagnostic = Diagnostic::new(failure, self.show_diffs);
        debug!(
            test = %case.title,
            diff = diagnostic.diff.is_some(),
            "writing failure diagnostic"
        );

        match &diagnostic.diff {
            Some(diff) => {
                writeln!(
                    writer,
                    "{}{}",
                    self.indentation.prefix_at(1),
                    diff.header.style(self.styles.error_message)
                )?;
                let values_indent = self.indentation.prefix_at(2);
                writeln!(
                    writer,
                    "{values_indent}{} | {}",
                    "actual".style(self.styles.diff_removed),
                    "expected".style(self.styles.diff_added),
                )?;
                writeln!(
                    writer,
                    "{values_indent}{} | {}",
                    diff.actual.style(self.styles.diff_removed),
                    diff.expected.style(self.styles.diff_added),
                )?;
                writeln!(writer)?;
            }
            None => {
                writeln!(writer, "{}", diagnostic.message)?;
            }
        }

        if !diagnostic.stack.is_empty() {
            writeln!(writer, "{}", diagnostic.stack)?;
        }

        Ok(())
    }
}

fn record_scope_end(scope: &mut RunScope, end_time: DateTime<FixedOffset>) {
    scope.end_time = Some(end_time);
    // A scope that was never entered, or a clock that went backwards, counts
    // as zero time.
    let total = scope
        .start_time
        .and_then(|start| (end_time - start).to_std().ok())
        .unwrap_or(Duration::ZERO);
    scope.total_duration = Some(total);
}

/// Displays a duration in whole milliseconds, e.g. `12ms`.
struct DisplayMillis(Duration);

impl fmt::Display for DisplayMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0.as_millis())
    }
}
