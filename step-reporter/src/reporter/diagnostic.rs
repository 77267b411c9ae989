// Copyright (c) The step-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning a failure into a message block and a stack block.
//!
//! Error stacks usually start with `<TypeName>: <message>` followed by one
//! frame per line. The message block shown to the user is taken from the
//! stack so it picks up the type name, and the stack block is whatever comes
//! after the message, so the message isn't printed twice.
//!
//! Locating the message is a plain first-occurrence substring search. If the
//! message text also happens to appear earlier in the stack (for example
//! inside a file path), the split lands in the wrong place. This is a known
//! limitation.

use super::{
    Failure,
    stringify::{same_type, stringify},
};
use regex::Regex;
use std::{borrow::Cow, sync::LazyLock};

/// The rendered diagnostic for a failed test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Diagnostic<'a> {
    /// The message, including any error-type prefix from the stack.
    pub(super) message: Cow<'a, str>,

    /// The actual/expected diff, if one should be shown.
    pub(super) diff: Option<DiffBlock<'a>>,

    /// The stack, with the message removed from its head.
    pub(super) stack: &'a str,
}

/// An actual/expected comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct DiffBlock<'a> {
    /// One-line header, usually the error type.
    pub(super) header: Cow<'a, str>,
    pub(super) actual: Cow<'a, str>,
    pub(super) expected: Cow<'a, str>,
}

impl<'a> Diagnostic<'a> {
    /// Extracts a diagnostic from `failure`.
    ///
    /// `diffs_enabled` is the reporter-wide switch; the failure's own
    /// `show_diff` must also be set for a diff to be produced.
    pub(super) fn new(failure: &'a Failure, diffs_enabled: bool) -> Self {
        let display_message = failure.message.as_str();
        let stack_text = failure.stack.as_deref().unwrap_or(display_message);

        // An empty message would trivially match at the start of every stack.
        let message_end = (!display_message.is_empty())
            .then(|| stack_text.find(display_message))
            .flatten()
            .map(|index| index + display_message.len());

        let mut message = match message_end {
            Some(end) => Cow::Borrowed(&stack_text[..end]),
            None => Cow::Borrowed(display_message),
        };
        if failure.uncaught {
            message = Cow::Owned(format!("Uncaught {message}"));
        }

        let stack = match message_end {
            Some(end) => skip_separator(&stack_text[end..]),
            None => stack_text,
        };

        let diff = if diffs_enabled && failure.show_diff {
            DiffBlock::new(failure, display_message, &message)
        } else {
            None
        };

        Self {
            message,
            diff,
            stack,
        }
    }
}

impl<'a> DiffBlock<'a> {
    fn new(failure: &'a Failure, display_message: &'a str, message: &str) -> Option<Self> {
        let (actual, expected) = match (&failure.actual, &failure.expected) {
            (Some(actual), Some(expected)) if same_type(actual, expected) => (actual, expected),
            _ => return None,
        };

        let (actual, expected) = match (actual.as_str(), expected.as_str()) {
            (Some(actual), Some(expected)) => (Cow::Borrowed(actual), Cow::Borrowed(expected)),
            _ => (
                Cow::Owned(stringify(actual)),
                Cow::Owned(stringify(expected)),
            ),
        };

        let header = match error_type(display_message) {
            Some(error_type) => Cow::Borrowed(error_type),
            None => Cow::Owned(message.to_owned()),
        };

        Some(Self {
            header,
            actual,
            expected,
        })
    }
}

/// Returns the error type from messages shaped like `<Type>: expected ...`.
fn error_type(message: &str) -> Option<&str> {
    static ERROR_TYPE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new("^([^:]+): expected").expect("error type regex is valid")
    });

    ERROR_TYPE
        .captures(message)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Drops the single separator character between the message and the first
/// frame.
fn skip_separator(rest: &str) -> &str {
    let mut chars = rest.chars();
    chars.next();
    chars.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::FailureMessage;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn failure(message: &str, stack: Option<&str>) -> Failure {
        Failure {
            message: FailureMessage::from_parts(Some(message.to_owned()), None),
            stack: stack.map(str::to_owned),
            ..Failure::default()
        }
    }

    #[test]
    fn stack_with_type_prefix() {
        let failure = failure("boom", Some("TypeError: boom\n    at a (a.js:1)\n    at b (b.js:2)"));
        let diagnostic = Diagnostic::new(&failure, true);

        assert_eq!(diagnostic.message, "TypeError: boom");
        assert_eq!(diagnostic.stack, "    at a (a.js:1)\n    at b (b.js:2)");
        assert_eq!(diagnostic.diff, None);
    }

    #[test]
    fn no_stack_falls_back_to_message() {
        let failure = failure("boom", None);
        let diagnostic = Diagnostic::new(&failure, true);

        assert_eq!(diagnostic.message, "boom");
        assert_eq!(diagnostic.stack, "");
    }

    #[test]
    fn message_not_in_stack() {
        let failure = failure("boom", Some("Error: something else\n    at a"));
        let diagnostic = Diagnostic::new(&failure, true);

        assert_eq!(diagnostic.message, "boom");
        assert_eq!(
            diagnostic.stack, "Error: something else\n    at a",
            "stack is shown untouched"
        );
    }

    #[test]
    fn inspected_message() {
        let failure = Failure {
            message: FailureMessage::Inspected("{ code: 'E_FAIL' }".to_owned()),
            ..Failure::default()
        };
        let diagnostic = Diagnostic::new(&failure, true);

        assert_eq!(diagnostic.message, "{ code: 'E_FAIL' }");
        assert_eq!(diagnostic.stack, "");
    }

    #[test]
    fn absent_everything() {
        let failure = Failure::default();
        let diagnostic = Diagnostic::new(&failure, true);

        assert_eq!(diagnostic.message, "");
        assert_eq!(diagnostic.stack, "");
        assert_eq!(diagnostic.diff, None);
    }

    #[test]
    fn absent_message_keeps_stack() {
        let failure = Failure {
            stack: Some("Error\n    at a".to_owned()),
            ..Failure::default()
        };
        let diagnostic = Diagnostic::new(&failure, true);

        assert_eq!(diagnostic.message, "");
        assert_eq!(diagnostic.stack, "Error\n    at a");
    }

    #[test]
    fn uncaught_prefix() {
        let mut failure = failure("boom", Some("Error: boom\n    at a"));
        failure.uncaught = true;
        let diagnostic = Diagnostic::new(&failure, true);

        assert_eq!(diagnostic.message, "Uncaught Error: boom");
        assert_eq!(diagnostic.stack, "    at a");
    }

    #[test]
    fn first_occurrence_wins() {
        // The message also appears in a later frame; only the first
        // occurrence is removed.
        let failure = failure("oops", Some("Error: oops\n    at oops (oops.js:1)"));
        let diagnostic = Diagnostic::new(&failure, true);

        assert_eq!(diagnostic.message, "Error: oops");
        assert_eq!(diagnostic.stack, "    at oops (oops.js:1)");
    }

    #[test]
    fn separator_is_one_char() {
        let failure = failure("é", Some("Error: é\u{00a0}rest"));
        let diagnostic = Diagnostic::new(&failure, true);
        assert_eq!(diagnostic.stack, "rest");
    }

    #[test]
    fn string_diff() {
        let failure = Failure {
            actual: Some(json!("foo")),
            expected: Some(json!("bar")),
            ..failure(
                "AssertionError: expected 'foo' to equal 'bar'",
                Some("AssertionError: expected 'foo' to equal 'bar'\n    at a"),
            )
        };
        let diagnostic = Diagnostic::new(&failure, true);

        assert_eq!(
            diagnostic.diff,
            Some(DiffBlock {
                header: "AssertionError".into(),
                actual: "foo".into(),
                expected: "bar".into(),
            })
        );
        assert_eq!(diagnostic.stack, "    at a");
    }

    #[test]
    fn object_diff_is_stringified() {
        let failure = Failure {
            actual: Some(json!({"b": 1, "a": 2})),
            expected: Some(json!({"a": 2})),
            ..failure("deep equality failed", None)
        };
        let diagnostic = Diagnostic::new(&failure, true);
        let diff = diagnostic.diff.expect("diff is shown");

        assert_eq!(diff.header, "deep equality failed", "no error type, header is the message");
        assert_eq!(diff.actual, "{\n  \"a\": 2,\n  \"b\": 1\n}");
        assert_eq!(diff.expected, "{\n  \"a\": 2\n}");
    }

    #[test]
    fn no_diff_when_suppressed_or_mismatched() {
        let mut base = failure("AssertionError: expected 1 to equal 2", None);
        base.actual = Some(json!(1));
        base.expected = Some(json!(2));

        let mut hidden = base.clone();
        hidden.show_diff = false;
        assert_eq!(Diagnostic::new(&hidden, true).diff, None, "failure hides diff");

        assert_eq!(Diagnostic::new(&base, false).diff, None, "reporter hides diffs");

        let mut mismatched = base.clone();
        mismatched.expected = Some(json!("2"));
        assert_eq!(Diagnostic::new(&mismatched, true).diff, None, "types differ");

        let mut missing = base.clone();
        missing.actual = None;
        assert_eq!(Diagnostic::new(&missing, true).diff, None, "actual missing");

        assert!(Diagnostic::new(&base, true).diff.is_some());
    }

    #[test]
    fn null_values_diff() {
        let mut failure = failure("AssertionError: expected null to exist", None);
        failure.actual = Some(json!(null));
        failure.expected = Some(json!(null));
        let diff = Diagnostic::new(&failure, true).diff.expect("diff is shown");

        assert_eq!(diff.header, "AssertionError");
        assert_eq!(diff.actual, "null");
    }

    #[test]
    fn header_without_error_type_keeps_uncaught() {
        let mut failure = failure("values differ", None);
        failure.uncaught = true;
        failure.actual = Some(json!(true));
        failure.expected = Some(json!(false));
        let diff = Diagnostic::new(&failure, true).diff.expect("diff is shown");

        assert_eq!(diff.header, "Uncaught values differ");
    }
}
