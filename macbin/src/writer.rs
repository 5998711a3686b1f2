//! MacBinary archive writer
//!
//! Lays out a finished header followed by the data fork and resource fork,
//! each zero-padded to a multiple of 128 bytes. No additional header and no
//! comment are ever written.

use std::io::Write;

use tracing::debug;

use crate::error::{Fork, MacBinError, Result};
use crate::format::{pad128, padding_for, BLOCK_SIZE, HEADER_SIZE};
use crate::header::MacBinaryHeader;

const ZEROES: [u8; BLOCK_SIZE] = [0u8; BLOCK_SIZE];

/// Writer for MacBinary archives.
///
/// # Example
///
/// ```
/// use macbin::{FinishParams, MacBinaryHeader, MacBinaryWriter};
///
/// let data = b"Hello, fork!";
/// let mut header = MacBinaryHeader::new(b"hello.bin");
/// header.finish(&FinishParams { data_len: data.len(), ..Default::default() }).unwrap();
///
/// let mut out = Vec::new();
/// let mut writer = MacBinaryWriter::new(&mut out);
/// writer.write_archive(&header, data, &[]).unwrap();
/// assert_eq!(out.len(), 256);
/// ```
pub struct MacBinaryWriter<W> {
    writer: W,
    total_written: u64,
}

impl<W: Write> MacBinaryWriter<W> {
    /// Create a new MacBinary writer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            total_written: 0,
        }
    }

    /// Write header, data fork and resource fork.
    ///
    /// The header must already be finished for exactly these forks. Any
    /// write failure is returned immediately and nothing further is written.
    pub fn write_archive(
        &mut self,
        header: &MacBinaryHeader,
        data_fork: &[u8],
        resource_fork: &[u8],
    ) -> Result<u64> {
        check_declared(Fork::Data, header.data_len(), data_fork.len())?;
        check_declared(Fork::Resource, header.resource_len(), resource_fork.len())?;

        self.writer.write_all(header.as_bytes())?;
        self.total_written += HEADER_SIZE as u64;
        self.write_padded(data_fork)?;
        self.write_padded(resource_fork)?;
        self.writer.flush()?;

        debug!(
            data_len = data_fork.len(),
            resource_len = resource_fork.len(),
            total = self.total_written,
            "wrote MacBinary archive"
        );
        Ok(self.total_written)
    }

    /// Write a region followed by zero padding to the next 128-byte boundary
    fn write_padded(&mut self, region: &[u8]) -> Result<()> {
        self.writer.write_all(region)?;
        let padding = padding_for(region.len());
        self.writer.write_all(&ZEROES[..padding])?;
        self.total_written += (region.len() + padding) as u64;
        Ok(())
    }

    /// Bytes written so far
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Get the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn check_declared(fork: Fork, declared: i32, actual: usize) -> Result<()> {
    if i64::from(declared) == actual as i64 {
        Ok(())
    } else {
        Err(MacBinError::LengthMismatch {
            fork,
            declared: i64::from(declared),
            actual,
        })
    }
}

/// Expected archive length for the given fork sizes
pub fn archive_len(data_len: usize, resource_len: usize) -> u64 {
    HEADER_SIZE as u64 + pad128(data_len as u64) + pad128(resource_len as u64)
}

/// Pack a finished header and both forks into one archive buffer
pub fn pack(header: &MacBinaryHeader, data_fork: &[u8], resource_fork: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(archive_len(data_fork.len(), resource_fork.len()) as usize);
    MacBinaryWriter::new(&mut out).write_archive(header, data_fork, resource_fork)?;
    Ok(out)
}
