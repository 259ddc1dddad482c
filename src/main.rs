//! # Publish Example CLI
//!
//! This is the binary entry point for the `publish-example` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Handling top-level errors: any failure exits non-zero with a message
//!   naming the stage that failed.
//!
//! The pipeline itself lives in the `publish_example` library crate; the
//! binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
