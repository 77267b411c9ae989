// Copyright (c) The step-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding recorded events and feeding them to a reporter.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::time::Duration;
use step_reporter::{
    errors::WriteEventError,
    reporter::{
        Case, Failure, FailureMessage, Reporter, RunScope, SpeedClass, StepEvent, StepEventKind,
    },
};
use tracing::debug;

/// One line of the input.
#[derive(Debug, Deserialize)]
pub(crate) struct WireEvent {
    /// When the event happened. Defaults to the time it is replayed.
    #[serde(default)]
    timestamp: Option<DateTime<FixedOffset>>,

    #[serde(flatten)]
    kind: WireEventKind,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "event")]
enum WireEventKind {
    #[serde(rename = "start")]
    RunStarted,
    #[serde(rename = "suite")]
    SuiteStarted(WireTitle),
    #[serde(rename = "suite end")]
    SuiteFinished(WireTitle),
    #[serde(rename = "hook")]
    HookStarted(WireTitle),
    #[serde(rename = "hook end")]
    HookFinished(WireTitle),
    #[serde(rename = "pending")]
    TestPending(WireCase),
    #[serde(rename = "test")]
    TestStarted(WireCase),
    #[serde(rename = "pass")]
    TestPassed(WireCase),
    #[serde(rename = "fail")]
    TestFailed(WireCase),
    #[serde(rename = "retryable fail")]
    TestAttemptFailedWillRetry(WireCase),
    #[serde(rename = "test end")]
    TestFinished(WireCase),
    #[serde(rename = "end")]
    RunFinished,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct WireTitle {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct WireCase {
    #[serde(default)]
    title: String,

    /// Milliseconds.
    #[serde(default)]
    duration: u64,

    #[serde(default)]
    retry: u32,

    #[serde(default)]
    speed: Option<SpeedClass>,

    /// Per-case slow threshold in milliseconds.
    #[serde(default)]
    slow: Option<u64>,

    #[serde(default)]
    error: WireFailure,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFailure {
    #[serde(default, deserialize_with = "text")]
    message: Option<String>,
    #[serde(default, deserialize_with = "text")]
    inspect: Option<String>,
    #[serde(default, deserialize_with = "text")]
    stack: Option<String>,
    #[serde(default, deserialize_with = "present")]
    actual: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    expected: Option<Value>,
    #[serde(default)]
    show_diff: Option<bool>,
    #[serde(default)]
    uncaught: bool,
}

/// A key that is present is `Some`, even if its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Strings are taken as-is. Any other non-null value is written as JSON.
fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

impl WireFailure {
    fn into_failure(self) -> Failure {
        let WireFailure {
            message,
            inspect,
            stack,
            actual,
            expected,
            show_diff,
            uncaught,
        } = self;

        Failure {
            message: FailureMessage::from_parts(message, inspect),
            stack,
            actual,
            expected,
            show_diff: show_diff.unwrap_or(true),
            uncaught,
        }
    }
}

/// Feeds decoded events to a reporter, owning the suite scopes.
#[derive(Debug)]
pub(crate) struct ReplayDriver {
    scopes: Vec<RunScope>,
    slow_threshold: Duration,
}

impl ReplayDriver {
    pub(crate) fn new(slow_threshold: Duration) -> Self {
        Self {
            scopes: Vec::new(),
            slow_threshold,
        }
    }

    pub(crate) fn replay(
        &mut self,
        event: WireEvent,
        reporter: &mut Reporter<'_>,
    ) -> Result<(), WriteEventError> {
        let timestamp = event.timestamp;
        match event.kind {
            WireEventKind::RunStarted => emit(reporter, timestamp, StepEventKind::RunStarted),
            WireEventKind::SuiteStarted(WireTitle { title }) => {
                let mut scope = RunScope::new(title);
                emit(reporter, timestamp, StepEventKind::SuiteStarted { scope: &mut scope })?;
                self.scopes.push(scope);
                Ok(())
            }
            WireEventKind::SuiteFinished(WireTitle { title }) => {
                let mut scope = match self.scopes.pop() {
                    Some(scope) => {
                        if scope.title != title {
                            debug!(
                                open = %scope.title,
                                closing = %title,
                                "suite end title doesn't match the innermost open suite"
                            );
                        }
                        scope
                    }
                    None => {
                        debug!(title = %title, "suite end with no open suite");
                        RunScope::new(title)
                    }
                };
                emit(reporter, timestamp, StepEventKind::SuiteFinished { scope: &mut scope })?;
                debug!(
                    title = %scope.title,
                    duration = ?scope.total_duration,
                    "suite finished"
                );
                Ok(())
            }
            WireEventKind::HookStarted(WireTitle { title }) => {
                emit(reporter, timestamp, StepEventKind::HookStarted { title: &title })
            }
            WireEventKind::HookFinished(WireTitle { title }) => {
                emit(reporter, timestamp, StepEventKind::HookFinished { title: &title })
            }
            WireEventKind::TestPending(wire) => {
                let (case, _) = self.decode_case(wire);
                emit(reporter, timestamp, StepEventKind::TestPending { case: &case })
            }
            WireEventKind::TestStarted(wire) => {
                let (case, _) = self.decode_case(wire);
                emit(reporter, timestamp, StepEventKind::TestStarted { case: &case })
            }
            WireEventKind::TestPassed(wire) => {
                let (case, _) = self.decode_case(wire);
                emit(reporter, timestamp, StepEventKind::TestPassed { case: &case })
            }
            WireEventKind::TestFailed(wire) => {
                let (case, failure) = self.decode_case(wire);
                emit(reporter, timestamp, StepEventKind::TestFailed {
                    case: &case,
                    failure: &failure,
                })
            }
            WireEventKind::TestAttemptFailedWillRetry(wire) => {
                let (case, failure) = self.decode_case(wire);
                emit(reporter, timestamp, StepEventKind::TestAttemptFailedWillRetry {
                    case: &case,
                    failure: &failure,
                })
            }
            WireEventKind::TestFinished(wire) => {
                let (case, _) = self.decode_case(wire);
                emit(reporter, timestamp, StepEventKind::TestFinished { case: &case })
            }
            WireEventKind::RunFinished => emit(reporter, timestamp, StepEventKind::RunFinished),
            WireEventKind::Unknown => {
                debug!("skipping event with an unrecognized name");
                Ok(())
            }
        }
    }

    /// Returns the number of suites that were entered but not yet exited.
    pub(crate) fn open_scopes(&self) -> usize {
        self.scopes.len()
    }

    fn decode_case(&self, wire: WireCase) -> (Case, Failure) {
        let WireCase {
            title,
            duration,
            retry,
            speed,
            slow,
            error,
        } = wire;

        let duration = Duration::from_millis(duration);
        let speed = speed.unwrap_or_else(|| {
            let threshold = slow.map_or(self.slow_threshold, Duration::from_millis);
            SpeedClass::classify(duration, threshold)
        });
        let case = Case::new(title)
            .with_duration(duration)
            .with_retry(retry)
            .with_speed(speed);
        (case, error.into_failure())
    }
}

/// Reports `kind`, stamped with the recorded time or else the current time.
fn emit(
    reporter: &mut Reporter<'_>,
    timestamp: Option<DateTime<FixedOffset>>,
    kind: StepEventKind<'_>,
) -> Result<(), WriteEventError> {
    let event = match timestamp {
        Some(timestamp) => StepEvent { timestamp, kind },
        None => StepEvent::now(kind),
    };
    reporter.report_event(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use step_reporter::reporter::{ReporterBuilder, ReporterOutput};

    fn decode(line: &str) -> WireEvent {
        serde_json::from_str(line).expect("line is a valid event")
    }

    fn replay_lines(lines: &str) -> String {
        let mut out = String::new();
        let mut reporter = ReporterBuilder::default().build(ReporterOutput::Buffer(&mut out));
        let mut driver = ReplayDriver::new(Duration::from_millis(75));
        for line in lines.lines() {
            driver
                .replay(decode(line), &mut reporter)
                .expect("writing to a string succeeds");
        }
        out
    }

    #[test]
    fn decodes_failure_fields() {
        let event = decode(
            r#"{"event": "fail", "title": "t", "duration": 5, "error": {"message": "m", "stack": "Error: m\n  at x", "actual": null, "expected": 0, "showDiff": false, "uncaught": true}}"#,
        );
        let WireEventKind::TestFailed(wire) = event.kind else {
            panic!("expected a fail event, found {:?}", event.kind);
        };
        let failure = wire.error.into_failure();

        assert_eq!(failure.message, FailureMessage::Message("m".to_owned()));
        assert_eq!(failure.stack.as_deref(), Some("Error: m\n  at x"));
        assert_eq!(failure.actual, Some(json!(null)), "explicit null is present");
        assert_eq!(failure.expected, Some(json!(0)));
        assert!(!failure.show_diff);
        assert!(failure.uncaught);
    }

    #[test]
    fn loosely_typed_error_fields() {
        let event = decode(
            r#"{"event": "fail", "title": "t", "error": {"message": 42, "inspect": {"code": 1}, "stack": null}}"#,
        );
        let WireEventKind::TestFailed(wire) = event.kind else {
            panic!("expected a fail event, found {:?}", event.kind);
        };
        let failure = wire.error.into_failure();

        assert_eq!(failure.message, FailureMessage::Message("42".to_owned()));
        assert_eq!(failure.stack, None);

        let output = replay_lines(indoc! {r#"
            {"event": "fail", "title": "numbered", "duration": 1, "error": {"message": 42}}
            {"event": "fail", "title": "flagged", "duration": 1, "error": {"message": false, "stack": ["a", "b"]}}
        "#});
        assert_eq!(
            output,
            indoc! {r#"
                ✖ failed numbered (1ms)
                42
                ✖ failed flagged (1ms)
                false
                ["a","b"]
            "#}
        );
    }

    #[test]
    fn missing_failure_fields() {
        let event = decode(r#"{"event": "fail", "title": "t"}"#);
        let WireEventKind::TestFailed(wire) = event.kind else {
            panic!("expected a fail event, found {:?}", event.kind);
        };
        assert_eq!(wire.error.into_failure(), Failure::default());
    }

    #[test]
    fn timestamp_and_unknown_events() {
        let event = decode(r#"{"event": "start", "timestamp": "2026-10-19T12:00:00+02:00"}"#);
        assert!(matches!(event.kind, WireEventKind::RunStarted));
        assert_eq!(
            event.timestamp,
            Some(DateTime::parse_from_rfc3339("2026-10-19T12:00:00+02:00").unwrap())
        );

        let event = decode(r#"{"event": "waiting", "title": "x"}"#);
        assert!(matches!(event.kind, WireEventKind::Unknown));
    }

    #[test]
    fn missing_event_name_is_an_error() {
        serde_json::from_str::<WireEvent>(r#"{"title": "x"}"#).unwrap_err();
    }

    #[test]
    fn speed_from_threshold() {
        let driver = ReplayDriver::new(Duration::from_millis(100));
        let speed = |line: &str| {
            let WireEventKind::TestPassed(wire) = decode(line).kind else {
                panic!("expected a pass event");
            };
            driver.decode_case(wire).0.speed
        };

        assert_eq!(speed(r#"{"event": "pass", "duration": 10}"#), SpeedClass::Fast);
        assert_eq!(speed(r#"{"event": "pass", "duration": 60}"#), SpeedClass::Medium);
        assert_eq!(speed(r#"{"event": "pass", "duration": 101}"#), SpeedClass::Slow);
        assert_eq!(
            speed(r#"{"event": "pass", "duration": 60, "slow": 1000}"#),
            SpeedClass::Fast,
            "per-case threshold wins"
        );
        assert_eq!(
            speed(r#"{"event": "pass", "duration": 500, "speed": "fast"}"#),
            SpeedClass::Fast,
            "explicit speed wins"
        );
    }

    #[test]
    fn suite_scopes_are_tracked() {
        let output = replay_lines(indoc! {r#"
            {"event": "suite", "title": "A", "timestamp": "2026-10-19T12:00:00Z"}
            {"event": "suite", "title": "B", "timestamp": "2026-10-19T12:00:00.010Z"}
            {"event": "pass", "title": "t", "duration": 3}
            {"event": "suite end", "title": "B", "timestamp": "2026-10-19T12:00:00.020Z"}
            {"event": "suite end", "title": "A", "timestamp": "2026-10-19T12:00:00.042Z"}
        "#});

        assert_eq!(
            output,
            indoc! {"
                A
                  B
                    ✓ passed t (3ms)
                  end B
                Total Duration (42ms)
            "}
        );
    }

    #[test]
    fn orphan_suite_end() {
        let mut out = String::new();
        let mut reporter = ReporterBuilder::default().build(ReporterOutput::Buffer(&mut out));
        let mut driver = ReplayDriver::new(Duration::from_millis(75));
        driver
            .replay(decode(r#"{"event": "suite end", "title": "X"}"#), &mut reporter)
            .unwrap();
        assert_eq!(driver.open_scopes(), 0);
        drop(reporter);

        assert_eq!(out, "Total Duration (0ms)\n");
    }
}
