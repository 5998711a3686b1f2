//! macb - MacBinary archive tool
//!
//! # Usage
//!
//! ```text
//! macb create [ARCHIVE] [-d DATA] [-r RSRC] [-f FINFO] [-T TYPE] [-C CREATOR]
//! macb extract ARCHIVE [-d DATA] [-r RSRC] [-f FINFO]
//! macb tell ARCHIVE
//! ```
//!
//! Global flags: `--max-input-size BYTES`, `-v` (debug logging), `-q` (errors only).

mod cli;
mod cmd_create;
mod cmd_extract;
mod cmd_tell;
mod style;

use std::process;

use clap::Parser;
use macbin::Finding;
use tracing::Level;

use cli::{Cli, Commands};
use style::{severity_color, RED, RESET};

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let read_options = cli.read_options();
    let result = match cli.command {
        Commands::Create(args) => cmd_create::run(args, read_options),
        Commands::Extract(args) => cmd_extract::run(args, read_options),
        Commands::Tell(args) => cmd_tell::run(args),
    };

    if let Err(e) = result {
        eprintln!("{RED}error:{RESET} {e}");
        process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Print a finding as `path:LEVEL: message`
pub(crate) fn report_line(path: &str, finding: &Finding) {
    let color = severity_color(finding.severity);
    println!("{path}:{color}{}{RESET}: {}", finding.severity, finding.message);
}
