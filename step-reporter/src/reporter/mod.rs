// Copyright (c) The step-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report the progress of a test run as indented, human-readable steps.
//!
//! The main type here is [`Reporter`], which is constructed via a
//! [`ReporterBuilder`].

mod diagnostic;
mod displayer;
mod events;
mod helpers;
mod imp;
mod stringify;

pub use events::*;
pub use helpers::SymbolSet;
pub use imp::*;
