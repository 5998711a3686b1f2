use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use macbin::{OsType, ReadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "macb",
    about = "Create, extract and inspect MacBinary archives.",
    version
)]
pub struct Cli {
    /// Refuse input files larger than this many bytes
    #[arg(long, global = true, value_name = "BYTES", default_value_t = macbin::fs::DEFAULT_MAX_INPUT_LEN)]
    pub max_input_size: u64,

    /// Log debug details to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions::default().max_input_len(self.max_input_size)
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(visible_alias = "c", about = "Pack forks and Finder info into an archive")]
    Create(CreateArgs),

    #[command(visible_alias = "x", about = "Unpack forks and Finder info from an archive")]
    Extract(ExtractArgs),

    #[command(visible_alias = "t", about = "Describe an archive header and check it")]
    Tell(TellArgs),
}

#[derive(Debug, Args)]
#[command(after_help = "\
If ARCHIVE is omitted it is derived from the fork paths:
  X.data, X.res or X.rsrc gives X.bin")]
pub struct CreateArgs {
    /// Output archive path
    pub archive: Option<PathBuf>,

    #[command(flatten)]
    pub forks: ForkArgs,

    /// Finder type code, exactly four characters
    #[arg(short = 'T', long = "type", value_name = "TYPE")]
    pub file_type: Option<OsType>,

    /// Finder creator code, exactly four characters
    #[arg(short = 'C', long, value_name = "CREATOR")]
    pub creator: Option<OsType>,
}

#[derive(Debug, Args)]
#[command(after_help = "\
With no -d, -r or -f, forks are written next to the archive as
X.data and X.res (empty forks are skipped)")]
pub struct ExtractArgs {
    /// Archive to unpack
    pub archive: PathBuf,

    #[command(flatten)]
    pub forks: ForkArgs,
}

#[derive(Debug, Args)]
pub struct TellArgs {
    /// Archive to inspect
    pub archive: PathBuf,
}

/// Fork and Finder info paths shared by create and extract
#[derive(Debug, Args)]
pub struct ForkArgs {
    /// Data fork file
    #[arg(short = 'd', long = "data", visible_alias = "data-fork", value_name = "PATH")]
    pub data_fork: Option<PathBuf>,

    /// Resource fork file
    #[arg(
        short = 'r',
        long = "rsrc",
        visible_aliases = ["resource", "res-fork", "resource-fork"],
        value_name = "PATH"
    )]
    pub resource_fork: Option<PathBuf>,

    /// Finder info file (the raw 128-byte header)
    #[arg(short = 'f', long = "finder-info", visible_alias = "finfo", value_name = "PATH")]
    pub finder_info: Option<PathBuf>,
}
