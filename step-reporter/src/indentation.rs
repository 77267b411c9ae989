// Copyright (c) The step-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nesting depth for rendered lines.
//!
//! Every suite the runner enters adds one level of indentation, and every
//! suite it exits removes one. Each level is rendered as [`INDENT_UNIT`].

use std::fmt;
use tracing::warn;

/// The text rendered for a single level of indentation.
pub const INDENT_UNIT: &str = "  ";

/// Tracks the current nesting depth of a reporter.
///
/// Each reporter owns its own `Indentation`, so independent reporters (for
/// example, in tests) never interfere with each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Indentation {
    depth: usize,
}

impl Indentation {
    /// Creates a new tracker at depth zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enters a nested scope.
    pub fn enter(&mut self) {
        self.depth += 1;
    }

    /// Exits a nested scope, returning the new depth.
    ///
    /// Exiting at depth zero is a caller error. The depth stays at zero rather
    /// than rendering negative-width prefixes.
    pub fn exit(&mut self) -> usize {
        match self.depth.checked_sub(1) {
            Some(depth) => self.depth = depth,
            None => warn!("scope exited without a matching enter, keeping indentation at 0"),
        }
        self.depth
    }

    /// Returns a displayable prefix for the current depth.
    pub fn prefix(&self) -> DisplayIndent {
        DisplayIndent(self.depth)
    }

    /// Returns a displayable prefix `extra` levels deeper than the current
    /// depth, without changing it.
    pub fn prefix_at(&self, extra: usize) -> DisplayIndent {
        DisplayIndent(self.depth + extra)
    }
}

/// Displays `n` indentation units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayIndent(usize);

impl fmt::Display for DisplayIndent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.0 {
            f.write_str(INDENT_UNIT)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_strategy::proptest;

    #[test]
    fn prefix_is_two_spaces_per_level() {
        let mut indentation = Indentation::new();
        assert_eq!(indentation.prefix().to_string(), "");

        indentation.enter();
        assert_eq!(indentation.prefix().to_string(), "  ");

        indentation.enter();
        assert_eq!(indentation.prefix().to_string(), "    ");
        assert_eq!(indentation.prefix_at(2).to_string(), "        ");
        assert_eq!(indentation.depth(), 2, "prefix_at doesn't change depth");

        assert_eq!(indentation.exit(), 1);
        assert_eq!(indentation.prefix().to_string(), "  ");
    }

    #[test]
    fn exit_at_zero_clamps() {
        let mut indentation = Indentation::new();
        assert_eq!(indentation.exit(), 0);
        assert_eq!(indentation.exit(), 0);

        indentation.enter();
        assert_eq!(indentation.depth(), 1);
    }

    #[proptest(cases = 256)]
    fn depth_tracks_balanced_ops(
        #[strategy(prop::collection::vec(any::<bool>(), 0..64))] ops: Vec<bool>,
    ) {
        // true = enter, false = exit.
        let mut indentation = Indentation::new();
        let mut model: usize = 0;
        for enter in ops {
            if enter {
                indentation.enter();
                model += 1;
            } else {
                indentation.exit();
                model = model.saturating_sub(1);
            }
            prop_assert_eq!(indentation.depth(), model);
            prop_assert_eq!(
                indentation.prefix().to_string().len(),
                model * INDENT_UNIT.len()
            );
        }
    }
}
