//! MacBinary archive reader
//!
//! Locates both forks from the header's declared lengths and validates them
//! against the real archive length before handing out any fork bytes.

use std::ops::Range;

use tracing::debug;

use crate::error::{Fork, MacBinError, Result};
use crate::format::{pad128, HEADER_SIZE};
use crate::header::MacBinaryHeader;
use crate::report::Finding;

/// Where each fork sits inside an archive, as declared by its header.
///
/// Offsets and lengths are signed and 64-bit so that negative declared
/// lengths and out-of-range sums survive until [`ForkLayout::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForkLayout {
    pub data_offset: i64,
    pub data_len: i64,
    pub resource_offset: i64,
    pub resource_len: i64,
}

impl ForkLayout {
    /// Compute the layout a header describes.
    ///
    /// The additional header, if any, is skipped with its length rounded up
    /// to a multiple of 128.
    pub fn from_header(header: &MacBinaryHeader) -> Self {
        let data_len = i64::from(header.data_len());
        let resource_len = i64::from(header.resource_len());
        let additional = pad128(u64::from(header.additional_header_len())) as i64;

        let data_offset = HEADER_SIZE as i64 + additional;
        let resource_offset = data_offset + pad128(data_len.max(0) as u64) as i64;

        ForkLayout {
            data_offset,
            data_len,
            resource_offset,
            resource_len,
        }
    }

    /// Check both forks against an archive of `total` bytes.
    ///
    /// Each fork must have a non-negative length, start after the header and
    /// end inside the archive. The two regions must not overlap.
    pub fn validate(&self, total: usize) -> Result<()> {
        check_fork(Fork::Data, self.data_offset, self.data_len, total)?;
        check_fork(Fork::Resource, self.resource_offset, self.resource_len, total)?;

        let data_end = self.data_offset + self.data_len;
        let resource_end = self.resource_offset + self.resource_len;
        if self.data_offset < resource_end && self.resource_offset < data_end {
            return Err(MacBinError::ForkOverlap {
                data_len: self.data_len,
                data_offset: self.data_offset,
                res_len: self.resource_len,
                res_offset: self.resource_offset,
            });
        }
        Ok(())
    }

    /// Byte range of the data fork; only meaningful after [`validate`](Self::validate)
    pub fn data_range(&self) -> Range<usize> {
        self.data_offset as usize..(self.data_offset + self.data_len) as usize
    }

    /// Byte range of the resource fork; only meaningful after [`validate`](Self::validate)
    pub fn resource_range(&self) -> Range<usize> {
        self.resource_offset as usize..(self.resource_offset + self.resource_len) as usize
    }
}

fn check_fork(fork: Fork, offset: i64, length: i64, total: usize) -> Result<()> {
    if offset < HEADER_SIZE as i64 || length < 0 || offset > total as i64 - length {
        return Err(MacBinError::ForkOutOfBounds {
            fork,
            length,
            offset,
            total,
        });
    }
    Ok(())
}

/// A parsed archive: its header and both forks, borrowed from the input
#[derive(Debug)]
pub struct Unpacked<'a> {
    pub header: MacBinaryHeader,
    pub layout: ForkLayout,
    pub data_fork: &'a [u8],
    pub resource_fork: &'a [u8],
    /// Non-fatal problems found while unpacking
    pub warnings: Vec<Finding>,
}

/// Split an archive into header and forks.
///
/// Structural problems (archive shorter than a header, a fork that runs past
/// the end, overlapping forks) are errors and no fork is returned. An
/// additional header is skipped with a warning.
pub fn unpack(archive: &[u8]) -> Result<Unpacked<'_>> {
    let raw: [u8; HEADER_SIZE] = archive
        .get(..HEADER_SIZE)
        .and_then(|h| h.try_into().ok())
        .ok_or(MacBinError::TooShort { len: archive.len() })?;
    let header = MacBinaryHeader::from_bytes(raw);

    let mut warnings = Vec::new();
    let additional = header.additional_header_len();
    if additional != 0 {
        debug!(
            additional_header_len = additional,
            "additional header is not understood, skipping it"
        );
        warnings.push(Finding::warning(format!(
            "Additional header length {additional}. Not sure how to handle this, corruption may ensue."
        )));
    }

    let layout = ForkLayout::from_header(&header);
    debug!(?layout, total = archive.len(), "fork layout");
    layout.validate(archive.len())?;

    Ok(Unpacked {
        data_fork: &archive[layout.data_range()],
        resource_fork: &archive[layout.resource_range()],
        header,
        layout,
        warnings,
    })
}
