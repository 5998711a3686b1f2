//! Error types for MacBinary operations

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for MacBinary operations
pub type Result<T> = std::result::Result<T, MacBinError>;

/// One of the two forks carried by an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fork {
    /// Ordinary file content
    Data,
    /// Resource map and resources
    Resource,
}

impl fmt::Display for Fork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fork::Data => f.write_str("data fork"),
            Fork::Resource => f.write_str("resource fork"),
        }
    }
}

/// Errors that can occur during MacBinary operations
#[derive(Error, Debug)]
pub enum MacBinError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive is shorter than a header
    #[error("length {len} less than 128, this can't be MacBinary")]
    TooShort { len: usize },

    /// Header declares a fork that does not fit inside the archive
    #[error(
        "header indicates {fork} {length} bytes at {offset} -- impossible with archive length {total}"
    )]
    ForkOutOfBounds {
        fork: Fork,
        length: i64,
        offset: i64,
        total: usize,
    },

    /// The two fork regions share bytes
    #[error(
        "data fork ({data_len}@{data_offset}) and resource fork ({res_len}@{res_offset}) overlap"
    )]
    ForkOverlap {
        data_len: i64,
        data_offset: i64,
        res_len: i64,
        res_offset: i64,
    },

    /// Header lengths disagree with the fork bytes being packed
    #[error("header declares {fork} of {declared} bytes but {actual} were supplied")]
    LengthMismatch {
        fork: Fork,
        declared: i64,
        actual: usize,
    },

    /// Finder info buffer is not exactly one header long
    #[error("finder info must be exactly 128 bytes (have {0})")]
    InvalidFinderInfo(usize),

    /// Type or creator code is not four printable ASCII bytes
    #[error("invalid type or creator {0:?}: must be 4 ASCII characters")]
    InvalidOsType(String),

    /// Fork is too long to be described by the header's signed length field
    #[error("{fork} of {len} bytes is too large for MacBinary")]
    ForkTooLarge { fork: Fork, len: usize },

    /// Input exceeded the configured read limit
    #[error("{}: input exceeds the {limit}-byte read limit", .path.display())]
    InputTooLarge { path: PathBuf, limit: u64 },

    /// No archive path was given and none could be derived from the fork paths
    #[error("unable to infer archive path")]
    ArchivePathUnknown,
}
