//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::Parser;

use crate::commands;
use modsplit::output::ColorChoice;

/// Split a modular repository into one repository per module stream
#[derive(Parser, Debug)]
#[command(name = "modsplit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    split: commands::split::SplitArgs,

    /// When to use emoji markers in the report
    #[arg(long, global = true, value_enum, value_name = "WHEN", default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        env = "MODSPLIT_LOG",
        default_value = "warn"
    )]
    log_level: String,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        commands::split::execute(self.split, self.color)
    }
}

/// Log to stderr so stdout only carries the report.
fn init_logging(level: &str) {
    // Keep an already installed logger.
    let _ = env_logger::Builder::new()
        .parse_filters(level)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
