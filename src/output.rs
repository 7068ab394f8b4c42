//! # Output Configuration
//!
//! User-facing progress lines of the `modsplit` binary go to stdout through
//! [`OutputConfig`]; diagnostics go through `log` to stderr.
//!
//! Emoji markers are only used when colour output is wanted. With
//! `--color auto` that is decided from the environment, first match wins:
//! 1. `NO_COLOR` set (any value): off
//! 2. `CLICOLOR_FORCE` set and not `0`: on, even when piped
//! 3. `CLICOLOR=0` or `TERM=dumb`: off
//! 4. otherwise the capabilities of stdout (via `console`)

use std::env;

/// Value of the `--color` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Decide from the environment and the terminal
    #[default]
    Auto,
    Always,
    Never,
}

/// Output configuration for controlling emoji markers and verbosity.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether emoji markers should be used.
    pub use_color: bool,
    /// Suppress status lines entirely.
    pub quiet: bool,
}

impl OutputConfig {
    /// Resolve `choice` against the process environment and stdout.
    pub fn new(choice: ColorChoice) -> Self {
        let use_color = match choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => colors_from_env(
                |name| env::var(name).ok(),
                console::Term::stdout().features().colors_supported(),
            ),
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

    /// Format a status line with a marker chosen by [`emoji`].
    pub fn line(&self, emoji_str: &str, plain: &str, message: &str) -> String {
        format!("{} {}", emoji(self, emoji_str, plain), message)
    }

    /// Print a status line unless quiet.
    pub fn status(&self, emoji_str: &str, plain: &str, message: &str) {
        if !self.quiet {
            println!("{}", self.line(emoji_str, plain, message));
        }
    }

    /// Print an indented detail line unless quiet.
    pub fn detail(&self, message: &str) {
        if !self.quiet {
            println!("   {}", message);
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new(ColorChoice::Auto)
    }
}

/// Whether `auto` colour resolves to on, given an environment lookup and
/// whether the terminal supports colours.
fn colors_from_env(var: impl Fn(&str) -> Option<String>, terminal: bool) -> bool {
    if var("NO_COLOR").is_some() {
        return false;
    }
    if var("CLICOLOR_FORCE").is_some_and(|v| !v.is_empty() && v != "0") {
        return true;
    }
    if var("CLICOLOR").as_deref() == Some("0") || var("TERM").as_deref() == Some("dumb") {
        return false;
    }
    terminal
}

/// Returns `emoji_str` when colours are enabled, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}
