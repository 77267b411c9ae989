// Copyright (c) The step-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replays a recorded stream of test lifecycle events through the step
//! reporter.
//!
//! The input is one JSON object per line, each naming its event in an
//! `"event"` field:
//!
//! ```text
//! {"event": "suite", "title": "math"}
//! {"event": "test", "title": "adds"}
//! {"event": "pass", "title": "adds", "duration": 3}
//! {"event": "suite end", "title": "math"}
//! ```

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod events;
mod output;

pub use dispatch::*;
pub use errors::*;
pub use output::{Color, OutputContext, OutputWriter, StderrStyles};
