// Copyright (c) The step-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::SpeedClass;
use owo_colors::Style;
use serde::Deserialize;

/// One style per named color role. All styles are plain unless
/// [`colorize`](Self::colorize) is called.
#[derive(Debug, Default, Clone)]
pub(super) struct Styles {
    pub(super) suite: Style,
    pub(super) skipped: Style,
    pub(super) pending: Style,
    pub(super) retry: Style,
    pub(super) bright_pass: Style,
    pub(super) fast: Style,
    pub(super) medium: Style,
    pub(super) slow: Style,
    pub(super) fail: Style,
    pub(super) bright_fail: Style,
    pub(super) error_message: Style,
    pub(super) diff_removed: Style,
    pub(super) diff_added: Style,
}

impl Styles {
    pub(super) fn colorize(&mut self) {
        self.suite = Style::new().bold();
        self.skipped = Style::new().magenta();
        self.pending = Style::new().cyan();
        self.retry = Style::new().bright_yellow();
        self.bright_pass = Style::new().bright_green();
        self.fast = Style::new().bright_black();
        self.medium = Style::new().yellow();
        self.slow = Style::new().red();
        self.fail = Style::new().red();
        self.bright_fail = Style::new().bright_red();
        self.error_message = Style::new().red();
        self.diff_removed = Style::new().red();
        self.diff_added = Style::new().green();
    }

    pub(super) fn speed(&self, speed: SpeedClass) -> Style {
        match speed {
            SpeedClass::Slow => self.slow,
            SpeedClass::Medium => self.medium,
            SpeedClass::Fast => self.fast,
        }
    }
}

/// Which set of status symbols to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolSet {
    /// Unicode if the output supports it, ASCII otherwise.
    #[default]
    Auto,

    /// Always use Unicode symbols.
    Unicode,

    /// Always use ASCII symbols.
    Ascii,
}

/// The symbols printed in front of test outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct ThemeSymbols {
    pub(super) ok: &'static str,
    pub(super) err: &'static str,
    pub(super) bang: &'static str,
}

impl Default for ThemeSymbols {
    fn default() -> Self {
        Self {
            ok: "+",
            err: "x",
            bang: "!",
        }
    }
}

impl ThemeSymbols {
    pub(super) fn use_unicode(&mut self) {
        self.ok = "✓";
        self.err = "✖";
    }
}
