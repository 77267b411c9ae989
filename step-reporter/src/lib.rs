// Copyright (c) The step-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! A hierarchical, step-by-step console reporter for test runs.
//!
//! The reporter consumes lifecycle events produced by a test runner (suites
//! entered and exited, tests started, passed, failed, retried or skipped) and
//! renders them as indented, colorized, timed text. Failing and retried tests
//! are followed by a diagnostic block: the error message, an optional
//! actual/expected diff, and the stack trace with the message stripped out.
//!
//! The main entry point is [`reporter::ReporterBuilder`].

pub mod config;
pub mod errors;
pub mod indentation;
pub mod reporter;
pub mod write_str;
