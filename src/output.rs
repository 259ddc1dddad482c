//! # Output Configuration
//!
//! Controls how the CLI renders its progress summary: emoji markers on a
//! capable terminal, bracketed plain-text markers everywhere else.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
    /// Suppress everything except errors.
    pub quiet: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `color_flag` is the value of `--color`: "always", "never", or "auto".
    /// In auto mode, colors are disabled if `NO_COLOR` is set, `CLICOLOR=0`,
    /// `TERM=dumb`, or stdout is not a TTY (unless `CLICOLOR_FORCE=1`).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self {
            use_color,
            quiet: false,
        }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// The marker to print in front of a status line.
    pub fn symbol(&self, symbol: Symbol) -> &'static str {
        let (emoji, plain) = symbol.forms();
        if self.use_color {
            emoji
        } else {
            plain
        }
    }

    /// Print a status line unless quiet.
    pub fn status(&self, symbol: Symbol, message: impl std::fmt::Display) {
        if !self.quiet {
            println!("{} {}", self.symbol(symbol), message);
        }
    }

    /// Print an indented detail line unless quiet.
    pub fn detail(&self, message: impl std::fmt::Display) {
        if !self.quiet {
            println!("   {}", message);
        }
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self {
            use_color: true,
            quiet: false,
        }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self {
            use_color: false,
            quiet: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Status markers used by the commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Start,
    DryRun,
    Success,
    Failure,
    Warning,
    Info,
}

impl Symbol {
    fn forms(self) -> (&'static str, &'static str) {
        match self {
            Symbol::Start => ("📦", "[PUBLISH]"),
            Symbol::DryRun => ("🔎", "[DRY RUN]"),
            Symbol::Success => ("✅", "[OK]"),
            Symbol::Failure => ("❌", "[FAIL]"),
            Symbol::Warning => ("⚠️", "[WARN]"),
            Symbol::Info => ("ℹ️", "[INFO]"),
        }
    }
}
