//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use publish_example::output::OutputConfig;

/// Publish Example - Publish a filtered copy of an internal tree as a
/// single-commit branch of an external repository
#[derive(Parser, Debug)]
#[command(name = "publish-example")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Subcommand to execute (defaults to `publish`)
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    publish: commands::publish::PublishArgs,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stage, filter, rewrite and prune the source tree, then replace the
    /// target branch with a single commit of the result
    Publish(commands::publish::PublishArgs),

    /// Validate the publish profile and its preconditions without changing anything
    Check(commands::check::CheckArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color).quiet(self.quiet);

        match self.command {
            Some(Commands::Publish(args)) => commands::publish::execute(args, &output),
            Some(Commands::Check(args)) => commands::check::execute(args, &output),
            None => commands::publish::execute(self.publish, &output),
        }
    }
}

/// Route `log` records to stderr. `RUST_LOG`, when set, takes precedence
/// over `--log-level`.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when the CLI is driven from tests.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
