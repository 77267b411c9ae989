// Copyright (c) The step-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, FixedOffset, Local};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// A lifecycle event from a test run.
///
/// Events are produced by whatever drives the run and consumed by a
/// [`Reporter`](crate::reporter::Reporter).
#[derive(Debug)]
pub struct StepEvent<'a> {
    /// The time at which the event was generated, including the offset from UTC.
    ///
    /// Suite durations are measured between the timestamps of the matching
    /// [`SuiteStarted`](StepEventKind::SuiteStarted) and
    /// [`SuiteFinished`](StepEventKind::SuiteFinished) events.
    pub timestamp: DateTime<FixedOffset>,

    /// The kind of event this is.
    pub kind: StepEventKind<'a>,
}

impl<'a> StepEvent<'a> {
    /// Creates an event stamped with the current local time.
    pub fn now(kind: StepEventKind<'a>) -> Self {
        Self {
            timestamp: Local::now().fixed_offset(),
            kind,
        }
    }
}

/// The kind of lifecycle event.
///
/// Forms part of [`StepEvent`].
#[derive(Debug)]
pub enum StepEventKind<'a> {
    /// The run started.
    RunStarted,

    /// A suite was entered.
    ///
    /// The reporter records the event timestamp as the scope's start time.
    SuiteStarted {
        /// The scope being entered.
        scope: &'a mut RunScope,
    },

    /// A suite was exited.
    ///
    /// The reporter records the end time and total duration on the scope.
    SuiteFinished {
        /// The scope being exited. This should be the same scope that was
        /// passed to the matching `SuiteStarted`.
        scope: &'a mut RunScope,
    },

    /// A hook (before, before each, after, after each) started.
    HookStarted {
        /// The title of the hook.
        title: &'a str,
    },

    /// A hook finished.
    HookFinished {
        /// The title of the hook.
        title: &'a str,
    },

    /// A test was skipped.
    TestPending {
        /// The skipped test.
        case: &'a Case,
    },

    /// A test attempt started. `case.current_retry` is 0 for the first
    /// attempt.
    TestStarted {
        /// The test being run.
        case: &'a Case,
    },

    /// A test passed.
    TestPassed {
        /// The test that passed.
        case: &'a Case,
    },

    /// A test failed on its final attempt.
    TestFailed {
        /// The test that failed.
        case: &'a Case,

        /// The error the test failed with.
        failure: &'a Failure,
    },

    /// A test attempt failed and will be retried.
    TestAttemptFailedWillRetry {
        /// The test that failed.
        case: &'a Case,

        /// The error this attempt failed with.
        failure: &'a Failure,
    },

    /// A test finished, whatever its outcome.
    TestFinished {
        /// The test that finished.
        case: &'a Case,
    },

    /// The run finished.
    RunFinished,
}

/// A nesting level of the run, corresponding to one suite.
///
/// Scopes are owned by the caller. The reporter only fills in the timing
/// fields as suites are entered and exited.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunScope {
    /// The suite title.
    pub title: String,

    /// When the suite was entered.
    pub start_time: Option<DateTime<FixedOffset>>,

    /// When the suite was exited.
    pub end_time: Option<DateTime<FixedOffset>>,

    /// The time between entering and exiting the suite.
    pub total_duration: Option<Duration>,
}

impl RunScope {
    /// Creates a new scope with the given title and no timing information.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A single test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Case {
    /// The test title.
    pub title: String,

    /// How long the test took.
    pub duration: Duration,

    /// The current attempt number, starting from 0 for the first attempt.
    pub current_retry: u32,

    /// How fast the test was, relative to its slow threshold.
    pub speed: SpeedClass,
}

impl Case {
    /// Creates a new case that took no time, on its first attempt.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            duration: Duration::ZERO,
            current_retry: 0,
            speed: SpeedClass::Fast,
        }
    }

    /// Sets the duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the current attempt number.
    pub fn with_retry(mut self, current_retry: u32) -> Self {
        self.current_retry = current_retry;
        self
    }

    /// Sets the speed class.
    pub fn with_speed(mut self, speed: SpeedClass) -> Self {
        self.speed = speed;
        self
    }
}

/// How fast a test ran relative to its slow threshold.
///
/// Only used to pick the color of the reported duration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeedClass {
    /// Slower than the threshold.
    Slow,

    /// Slower than half the threshold.
    Medium,

    /// At most half the threshold.
    #[default]
    Fast,
}

impl SpeedClass {
    /// Classifies `duration` against `slow_threshold`.
    pub fn classify(duration: Duration, slow_threshold: Duration) -> Self {
        if duration > slow_threshold {
            Self::Slow
        } else if duration > slow_threshold / 2 {
            Self::Medium
        } else {
            Self::Fast
        }
    }
}

/// The error a test failed with.
///
/// Every field is optional in practice: test frameworks and assertion
/// libraries fill in different subsets.
#[derive(Clone, Debug, PartialEq)]
pub struct Failure {
    /// The human-readable message.
    pub message: FailureMessage,

    /// The stack trace, typically starting with `<TypeName>: <message>`.
    pub stack: Option<String>,

    /// The actual value of a failed assertion.
    pub actual: Option<Value>,

    /// The expected value of a failed assertion.
    pub expected: Option<Value>,

    /// Whether an actual/expected diff should be shown.
    pub show_diff: bool,

    /// Whether the error was thrown outside of the test body.
    pub uncaught: bool,
}

impl Default for Failure {
    fn default() -> Self {
        Self {
            message: FailureMessage::Absent,
            stack: None,
            actual: None,
            expected: None,
            show_diff: true,
            uncaught: false,
        }
    }
}

impl Failure {
    /// Creates a failure with the given message and no other information.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: FailureMessage::from_parts(Some(message.into()), None),
            ..Self::default()
        }
    }
}

/// Where a failure's message comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureMessage {
    /// The error carries a message.
    Message(String),

    /// The error has no message, but can describe itself.
    Inspected(String),

    /// Neither is available.
    Absent,
}

impl FailureMessage {
    /// Picks a message source: a non-empty message wins, then the inspected
    /// representation.
    pub fn from_parts(message: Option<String>, inspected: Option<String>) -> Self {
        match (message, inspected) {
            (Some(message), _) if !message.is_empty() => Self::Message(message),
            (_, Some(inspected)) => Self::Inspected(inspected),
            _ => Self::Absent,
        }
    }

    /// Returns the text to display.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Message(s) | Self::Inspected(s) => s,
            Self::Absent => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(10, 75 => SpeedClass::Fast; "well under")]
    #[test_case(37, 75 => SpeedClass::Fast; "exactly half")]
    #[test_case(38, 75 => SpeedClass::Medium; "over half")]
    #[test_case(75, 75 => SpeedClass::Medium; "at threshold")]
    #[test_case(76, 75 => SpeedClass::Slow; "over threshold")]
    fn classify(duration_ms: u64, threshold_ms: u64) -> SpeedClass {
        SpeedClass::classify(
            Duration::from_millis(duration_ms),
            Duration::from_millis(threshold_ms),
        )
    }

    #[test]
    fn now_uses_local_clock() {
        let before = Local::now().fixed_offset();
        let event = StepEvent::now(StepEventKind::RunStarted);
        let after = Local::now().fixed_offset();

        assert!(before <= event.timestamp && event.timestamp <= after);
        assert!(matches!(event.kind, StepEventKind::RunStarted));
    }

    #[test]
    fn message_sources() {
        assert_eq!(
            FailureMessage::from_parts(Some("boom".to_owned()), Some("{}".to_owned())),
            FailureMessage::Message("boom".to_owned())
        );
        assert_eq!(
            FailureMessage::from_parts(Some(String::new()), Some("{ code: 1 }".to_owned())),
            FailureMessage::Inspected("{ code: 1 }".to_owned()),
            "empty message falls through to inspect"
        );
        assert_eq!(
            FailureMessage::from_parts(Some(String::new()), None),
            FailureMessage::Absent
        );
        assert_eq!(FailureMessage::Absent.as_str(), "");
    }
}
