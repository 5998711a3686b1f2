//! File-level create, extract and tell operations
//!
//! Each operation reads its inputs completely, runs the in-memory codec and
//! only then writes outputs.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MacBinError, Result};
use crate::format::OsType;
use crate::fs::{fork_times, read_file, read_header, write_file, ReadOptions};
use crate::header::{mac_now, FinishParams, ForkTimes, MacBinaryHeader, TimeGuess};
use crate::paths::{default_outputs, infer_archive_path};
use crate::reader::unpack;
use crate::report::{report, Finding, Report};
use crate::writer::pack;

/// Inputs for creating an archive
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    /// Output archive; inferred from the fork paths when absent
    pub archive: Option<PathBuf>,
    pub data_fork: Option<PathBuf>,
    pub resource_fork: Option<PathBuf>,
    /// Existing 128-byte header to start from instead of a fresh one
    pub finder_info: Option<PathBuf>,
    pub file_type: Option<OsType>,
    pub creator: Option<OsType>,
    pub read_options: ReadOptions,
}

/// Result of a successful create
#[derive(Debug, Clone)]
pub struct Created {
    pub archive: PathBuf,
    /// Whether the archive path was derived from a fork path
    pub inferred_archive: bool,
    pub data_len: usize,
    pub resource_len: usize,
    pub archive_len: usize,
}

/// Inputs for extracting an archive
#[derive(Debug, Clone, Default)]
pub struct ExtractRequest {
    pub archive: PathBuf,
    pub data_fork: Option<PathBuf>,
    pub resource_fork: Option<PathBuf>,
    /// Where to write the raw 128-byte header
    pub finder_info: Option<PathBuf>,
    pub read_options: ReadOptions,
}

/// One fork written by an extract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFork {
    pub path: PathBuf,
    pub len: usize,
}

/// Result of a successful extract
#[derive(Debug, Clone, Default)]
pub struct Extracted {
    pub data_fork: Option<ExtractedFork>,
    pub resource_fork: Option<ExtractedFork>,
    pub finder_info: Option<PathBuf>,
    /// Whether output names were derived from the archive name
    pub default_names: bool,
    pub warnings: Vec<Finding>,
}

/// Finish `header` for the given forks and lay out the archive in memory
pub fn build(
    mut header: MacBinaryHeader,
    params: &FinishParams,
    data_fork: &[u8],
    resource_fork: &[u8],
) -> Result<Vec<u8>> {
    let params = FinishParams {
        data_len: data_fork.len(),
        resource_len: resource_fork.len(),
        ..params.clone()
    };
    header.finish(&params)?;
    pack(&header, data_fork, resource_fork)
}

/// Create an archive from fork files
pub fn create(request: &CreateRequest) -> Result<Created> {
    let (archive, inferred_archive) = match &request.archive {
        Some(path) => (path.clone(), false),
        None => {
            let inferred = infer_archive_path(
                request.data_fork.as_deref(),
                request.resource_fork.as_deref(),
            )
            .ok_or(MacBinError::ArchivePathUnknown)?;
            debug!(archive = %inferred.display(), "inferred archive path");
            (inferred, true)
        }
    };

    let data_fork = read_optional(request.data_fork.as_deref(), &request.read_options)?;
    let resource_fork = read_optional(request.resource_fork.as_deref(), &request.read_options)?;

    let header = match &request.finder_info {
        Some(path) => {
            let info = read_file(path, &request.read_options)?;
            MacBinaryHeader::from_finder_info(&info)?
        }
        None => MacBinaryHeader::new(archive.as_os_str().as_encoded_bytes()),
    };

    let times = TimeGuess::from_forks(
        optional_times(request.data_fork.as_deref()),
        optional_times(request.resource_fork.as_deref()),
        mac_now(),
    );
    let params = FinishParams {
        file_type: request.file_type,
        creator: request.creator,
        times,
        ..Default::default()
    };

    let bytes = build(header, &params, &data_fork, &resource_fork)?;
    write_file(&archive, &bytes)?;

    Ok(Created {
        archive,
        inferred_archive,
        data_len: data_fork.len(),
        resource_len: resource_fork.len(),
        archive_len: bytes.len(),
    })
}

fn read_optional(path: Option<&Path>, options: &ReadOptions) -> Result<Vec<u8>> {
    match path {
        Some(path) => read_file(path, options),
        None => Ok(Vec::new()),
    }
}

fn optional_times(path: Option<&Path>) -> ForkTimes {
    path.map(fork_times).unwrap_or_default()
}

/// Extract forks (and optionally the header) from an archive.
///
/// With no output paths at all, forks are written next to the archive as
/// `<stem>.data` and `<stem>.res`, skipping empty ones. The archive is fully
/// validated before anything is written.
pub fn extract(request: &ExtractRequest) -> Result<Extracted> {
    let archive = read_file(&request.archive, &request.read_options)?;
    let unpacked = unpack(&archive)?;

    let mut result = Extracted {
        warnings: unpacked.warnings.clone(),
        ..Default::default()
    };

    let mut data_path = request.data_fork.clone();
    let mut resource_path = request.resource_fork.clone();
    if data_path.is_none() && resource_path.is_none() && request.finder_info.is_none() {
        result.default_names = true;
        let defaults = default_outputs(
            &request.archive,
            unpacked.data_fork.len(),
            unpacked.resource_fork.len(),
        );
        if defaults.is_empty() {
            debug!(archive = %request.archive.display(), "both forks empty, not producing any output");
            result
                .warnings
                .push(Finding::warning("Both forks empty. Not producing any output."));
        }
        data_path = defaults.data_fork;
        resource_path = defaults.resource_fork;
    }

    if let Some(path) = data_path {
        write_file(&path, unpacked.data_fork)?;
        result.data_fork = Some(ExtractedFork {
            path,
            len: unpacked.data_fork.len(),
        });
    }
    if let Some(path) = resource_path {
        write_file(&path, unpacked.resource_fork)?;
        result.resource_fork = Some(ExtractedFork {
            path,
            len: unpacked.resource_fork.len(),
        });
    }
    if let Some(path) = &request.finder_info {
        write_file(path, unpacked.header.as_bytes())?;
        result.finder_info = Some(path.clone());
    }

    Ok(result)
}

/// Diagnose an archive's header against its real length
pub fn tell<P: AsRef<Path>>(path: P) -> Result<Report> {
    let (raw, len) = read_header(path)?;
    Ok(report(&MacBinaryHeader::from_bytes(raw), len))
}
