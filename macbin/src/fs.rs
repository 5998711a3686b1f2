//! Filesystem access for whole-file reads and writes
//!
//! The codec works on complete in-memory buffers; this module is the only
//! place that touches files. Writes go through a temporary file in the
//! destination directory and are renamed into place, so a failed write never
//! leaves a partial file behind.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tempfile::Builder;
use tracing::debug;

use crate::error::{MacBinError, Result};
use crate::format::{unix_to_mac, HEADER_SIZE};
use crate::header::ForkTimes;

/// Default read limit (128 MB), guards against endless inputs such as pipes
pub const DEFAULT_MAX_INPUT_LEN: u64 = 128 * 1024 * 1024;

/// Options for reading input files
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Inputs longer than this are rejected
    pub max_input_len: u64,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            max_input_len: DEFAULT_MAX_INPUT_LEN,
        }
    }
}

impl ReadOptions {
    /// Set the read limit
    pub fn max_input_len(mut self, limit: u64) -> Self {
        self.max_input_len = limit;
        self
    }
}

/// Read a whole file, failing if it exceeds the configured limit
pub fn read_file<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut data = Vec::new();
    // One byte past the limit tells "exactly at limit" from "over it"
    file.take(options.max_input_len.saturating_add(1))
        .read_to_end(&mut data)?;
    if data.len() as u64 > options.max_input_len {
        return Err(MacBinError::InputTooLarge {
            path: path.to_path_buf(),
            limit: options.max_input_len,
        });
    }
    debug!(path = %path.display(), len = data.len(), "read file");
    Ok(data)
}

/// Write a whole buffer, replacing the destination only on success.
///
/// A replaced file keeps its permissions; a new one gets 0666 less the umask.
pub fn write_file<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let existing = fs::metadata(path).ok().map(|meta| meta.permissions());

    let mut builder = Builder::new();
    if existing.is_none() {
        if let Some(permissions) = new_file_permissions() {
            builder.permissions(permissions);
        }
    }
    let mut tmp = builder.tempfile_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    if let Some(permissions) = existing {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.persist(path).map_err(|e| MacBinError::Io(e.error))?;
    debug!(path = %path.display(), len = data.len(), "wrote file");
    Ok(())
}

// Passed to open(2), so the process umask still applies
#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

/// Read the first 128 bytes of a file and its total length.
///
/// The length is `None` when the file cannot be seeked (a pipe, say).
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<([u8; HEADER_SIZE], Option<u64>)> {
    let mut file = File::open(path)?;
    let mut header = [0u8; HEADER_SIZE];
    file.read_exact(&mut header).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            MacBinError::TooShort {
                len: file_len_hint(&mut file),
            }
        } else {
            MacBinError::Io(e)
        }
    })?;
    let len = file.seek(SeekFrom::End(0)).ok();
    Ok((header, len))
}

fn file_len_hint(file: &mut File) -> usize {
    file.seek(SeekFrom::End(0)).map(|l| l as usize).unwrap_or(0)
}

/// Creation-ish and modification times of a file in Mac epoch seconds.
///
/// On Unix "ctime" is the inode change time. Anything unavailable is 0.
pub fn fork_times<P: AsRef<Path>>(path: P) -> ForkTimes {
    let Ok(meta) = fs::metadata(path) else {
        return ForkTimes::default();
    };
    ForkTimes {
        ctime: to_mac(ctime_secs(&meta)),
        mtime: to_mac(mtime_secs(&meta)),
    }
}

fn to_mac(unix: Option<i64>) -> u32 {
    match unix {
        Some(secs) if secs != 0 => unix_to_mac(secs),
        _ => 0,
    }
}

#[cfg(unix)]
fn ctime_secs(meta: &fs::Metadata) -> Option<i64> {
    use std::os::unix::fs::MetadataExt;
    Some(meta.ctime())
}

#[cfg(not(unix))]
fn ctime_secs(meta: &fs::Metadata) -> Option<i64> {
    system_time_secs(meta.created().ok()?)
}

#[cfg(unix)]
fn mtime_secs(meta: &fs::Metadata) -> Option<i64> {
    use std::os::unix::fs::MetadataExt;
    Some(meta.mtime())
}

#[cfg(not(unix))]
fn mtime_secs(meta: &fs::Metadata) -> Option<i64> {
    system_time_secs(meta.modified().ok()?)
}

#[cfg(not(unix))]
fn system_time_secs(t: std::time::SystemTime) -> Option<i64> {
    let secs = t.duration_since(std::time::UNIX_EPOCH).ok()?.as_secs();
    i64::try_from(secs).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fork.data");
        write_file(&path, b"fork bytes").unwrap();
        let data = read_file(&path, &ReadOptions::default()).unwrap();
        assert_eq!(data, b"fork bytes");
    }

    #[test]
    fn test_write_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        fs::write(&path, vec![1u8; 4096]).unwrap();
        write_file(&path, b"short").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"short");
    }

    #[test]
    fn test_write_failure_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.bin");
        assert!(write_file(&path, b"data").is_err());
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_matches_std_mode() {
        use std::os::unix::fs::PermissionsExt;
        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;

        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain");
        let ours = dir.path().join("ours");
        fs::write(&plain, b"x").unwrap();
        write_file(&ours, b"x").unwrap();
        assert_eq!(mode(&ours), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.bin");
        fs::write(&path, b"old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        write_file(&path, b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o640);
    }

    #[test]
    fn test_read_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big");
        fs::write(&path, vec![0u8; 100]).unwrap();

        let at_limit = ReadOptions::default().max_input_len(100);
        assert_eq!(read_file(&path, &at_limit).unwrap().len(), 100);

        let under = ReadOptions::default().max_input_len(99);
        assert!(matches!(
            read_file(&path, &under),
            Err(MacBinError::InputTooLarge { limit: 99, .. })
        ));
    }

    #[test]
    fn test_read_header_and_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        let mut data = vec![0u8; 300];
        data[1] = 9;
        fs::write(&path, &data).unwrap();

        let (header, len) = read_header(&path).unwrap();
        assert_eq!(header[1], 9);
        assert_eq!(len, Some(300));
    }

    #[test]
    fn test_read_header_too_short() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.bin");
        fs::write(&path, vec![0u8; 127]).unwrap();
        assert!(matches!(
            read_header(&path),
            Err(MacBinError::TooShort { len: 127 })
        ));
    }

    #[test]
    fn test_fork_times() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f");
        fs::write(&path, b"x").unwrap();
        let times = fork_times(&path);
        assert_ne!(times.mtime, 0);

        let missing = fork_times(dir.path().join("nope"));
        assert_eq!(missing, ForkTimes::default());
    }
}
