//! The 128-byte MacBinary header
//!
//! The header is kept as raw bytes so that a Finder info block loaded from
//! disk round-trips verbatim, including fields this crate does not model.
//! Typed access goes through the offset helpers in [`crate::format`].

use crate::checksum::header_crc;
use crate::error::{Fork, MacBinError, Result};
use crate::format::*;

/// MacBinary header (128 bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacBinaryHeader {
    raw: [u8; HEADER_SIZE],
}

/// Values applied to a header just before it is written
#[derive(Debug, Clone, Default)]
pub struct FinishParams {
    /// Type code override
    pub file_type: Option<OsType>,
    /// Creator code override
    pub creator: Option<OsType>,
    /// Actual data fork length
    pub data_len: usize,
    /// Actual resource fork length
    pub resource_len: usize,
    /// Timestamps used only where the header has none
    pub times: TimeGuess,
}

/// Create and modify timestamps (Mac epoch) to fill in when a header has none
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeGuess {
    pub create: u32,
    pub modify: u32,
}

/// Filesystem timestamps of one fork's source file, Mac epoch, 0 if unavailable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForkTimes {
    pub ctime: u32,
    pub mtime: u32,
}

impl TimeGuess {
    /// Combine the two source files' timestamps.
    ///
    /// The archive is "created" no later than either fork and "modified" no
    /// earlier than either fork. Missing values fall back to `now`.
    pub fn from_forks(data: ForkTimes, resource: ForkTimes, now: u32) -> Self {
        TimeGuess {
            create: older_of(data.ctime, resource.ctime, now),
            modify: younger_of(data.mtime, resource.mtime, now),
        }
    }
}

/// Older of two nonzero timestamps, the other if one is zero, `now` if both are
pub fn older_of(a: u32, b: u32, now: u32) -> u32 {
    match (a, b) {
        (0, 0) => now,
        (0, t) | (t, 0) => t,
        (a, b) => a.min(b),
    }
}

/// Younger of two nonzero timestamps, the other if one is zero, `now` if both are
pub fn younger_of(a: u32, b: u32, now: u32) -> u32 {
    match (a, b) {
        (0, 0) => now,
        (0, t) | (t, 0) => t,
        (a, b) => a.max(b),
    }
}

/// Current time in Mac epoch seconds
pub fn mac_now() -> u32 {
    unix_to_mac(chrono::Utc::now().timestamp())
}

/// Derive a Finder file name from an arbitrary path.
///
/// Takes the last path segment, drops a trailing ".bin", trims whitespace and
/// control bytes from both ends, keeps at most 63 bytes and replaces ':' and
/// anything outside printable ASCII with '?'.
pub fn sanitize_name(path: &[u8]) -> Vec<u8> {
    let mut name = path;
    while let [rest @ .., b'/'] = name {
        name = rest;
    }
    if let Some(slash) = name.iter().rposition(|&b| b == b'/') {
        name = &name[slash + 1..];
    }
    if let Some(stem) = name.strip_suffix(b".bin") {
        name = stem;
    }
    while let [first, rest @ ..] = name {
        if *first > 0x20 {
            break;
        }
        name = rest;
    }
    while let [rest @ .., last] = name {
        if *last > 0x20 {
            break;
        }
        name = rest;
    }
    let name = &name[..name.len().min(MAX_NAME_LEN)];

    name.iter()
        .map(|&b| {
            if b == b':' || !(0x20..=0x7e).contains(&b) {
                b'?'
            } else {
                b
            }
        })
        .collect()
}

impl MacBinaryHeader {
    /// Fresh header named after `name_source` (usually the archive path).
    ///
    /// Type "File", creator "????", the Finder "inited" flag and MacBinary II
    /// version bytes are set; everything else is zero.
    pub fn new(name_source: &[u8]) -> Self {
        let mut header = MacBinaryHeader {
            raw: [0u8; HEADER_SIZE],
        };
        header.set_name(&sanitize_name(name_source));
        header.set_file_type(DEFAULT_TYPE);
        header.set_creator(DEFAULT_CREATOR);
        header.raw[OFF_FINDER_FLAGS] = FINDER_FLAG_INITED;
        header.raw[OFF_FINDER_FLAGS_2] = 0;
        header.raw[OFF_ENCODER_VERSION] = MACBINARY_II_VERSION;
        header.raw[OFF_MIN_VERSION] = MACBINARY_II_VERSION;
        header
    }

    /// Wrap raw header bytes verbatim
    pub fn from_bytes(raw: [u8; HEADER_SIZE]) -> Self {
        MacBinaryHeader { raw }
    }

    /// Load a Finder info block, which must be exactly one header long
    pub fn from_finder_info(data: &[u8]) -> Result<Self> {
        let raw = <[u8; HEADER_SIZE]>::try_from(data)
            .map_err(|_| MacBinError::InvalidFinderInfo(data.len()))?;
        Ok(MacBinaryHeader { raw })
    }

    /// Raw header bytes
    pub fn as_bytes(&self) -> &[u8; HEADER_SIZE] {
        &self.raw
    }

    /// Consume into raw header bytes
    pub fn into_bytes(self) -> [u8; HEADER_SIZE] {
        self.raw
    }

    /// Apply type/creator overrides, fork lengths and missing timestamps, then
    /// recompute the CRC. This must be the last change before writing.
    pub fn finish(&mut self, params: &FinishParams) -> Result<()> {
        let data_len = fork_len_field(Fork::Data, params.data_len)?;
        let resource_len = fork_len_field(Fork::Resource, params.resource_len)?;

        if let Some(file_type) = params.file_type {
            self.set_file_type(file_type);
        }
        if let Some(creator) = params.creator {
            self.set_creator(creator);
        }

        write_u32(&mut self.raw, OFF_DATA_LEN, data_len);
        write_u32(&mut self.raw, OFF_RES_LEN, resource_len);

        if self.create_time() == 0 {
            write_u32(&mut self.raw, OFF_CREATE_TIME, params.times.create);
        }
        if self.modify_time() == 0 {
            write_u32(&mut self.raw, OFF_MODIFY_TIME, params.times.modify);
        }

        self.update_crc();
        Ok(())
    }

    /// Recompute and store the CRC over bytes 0..124
    pub fn update_crc(&mut self) {
        let crc = header_crc(&self.raw);
        write_u16(&mut self.raw, OFF_CRC, crc);
    }

    fn set_name(&mut self, name: &[u8]) {
        let len = name.len().min(MAX_NAME_LEN);
        self.raw[OFF_NAME_LEN] = len as u8;
        let field = &mut self.raw[OFF_NAME..OFF_NAME + MAX_NAME_LEN];
        field.fill(0);
        field[..len].copy_from_slice(&name[..len]);
    }

    pub fn set_file_type(&mut self, code: OsType) {
        self.raw[OFF_TYPE..OFF_TYPE + 4].copy_from_slice(&code.0);
    }

    pub fn set_creator(&mut self, code: OsType) {
        self.raw[OFF_CREATOR..OFF_CREATOR + 4].copy_from_slice(&code.0);
    }

    pub fn version(&self) -> u8 {
        self.raw[OFF_VERSION]
    }

    /// Declared name length, which may exceed 63 in a corrupt header
    pub fn name_len(&self) -> u8 {
        self.raw[OFF_NAME_LEN]
    }

    /// Name bytes, clamped to the 63-byte field
    pub fn name(&self) -> &[u8] {
        let len = usize::from(self.name_len()).min(MAX_NAME_LEN);
        &self.raw[OFF_NAME..OFF_NAME + len]
    }

    pub fn file_type(&self) -> OsType {
        OsType([
            self.raw[OFF_TYPE],
            self.raw[OFF_TYPE + 1],
            self.raw[OFF_TYPE + 2],
            self.raw[OFF_TYPE + 3],
        ])
    }

    pub fn creator(&self) -> OsType {
        OsType([
            self.raw[OFF_CREATOR],
            self.raw[OFF_CREATOR + 1],
            self.raw[OFF_CREATOR + 2],
            self.raw[OFF_CREATOR + 3],
        ])
    }

    pub fn finder_flags(&self) -> u8 {
        self.raw[OFF_FINDER_FLAGS]
    }

    pub fn finder_flags_2(&self) -> u8 {
        self.raw[OFF_FINDER_FLAGS_2]
    }

    pub fn vertical_position(&self) -> u16 {
        read_u16(&self.raw, OFF_VERT_POS)
    }

    pub fn horizontal_position(&self) -> u16 {
        read_u16(&self.raw, OFF_HORZ_POS)
    }

    pub fn folder_id(&self) -> u16 {
        read_u16(&self.raw, OFF_FOLDER_ID)
    }

    /// Raw protected byte; only 0 and 1 are meaningful
    pub fn protected(&self) -> u8 {
        self.raw[OFF_PROTECTED]
    }

    /// Data fork length, negative if the high bit is set
    pub fn data_len(&self) -> i32 {
        read_i32(&self.raw, OFF_DATA_LEN)
    }

    /// Resource fork length, negative if the high bit is set
    pub fn resource_len(&self) -> i32 {
        read_i32(&self.raw, OFF_RES_LEN)
    }

    pub fn create_time(&self) -> u32 {
        read_u32(&self.raw, OFF_CREATE_TIME)
    }

    pub fn modify_time(&self) -> u32 {
        read_u32(&self.raw, OFF_MODIFY_TIME)
    }

    pub fn comment_len(&self) -> u16 {
        read_u16(&self.raw, OFF_COMMENT_LEN)
    }

    /// The 14-byte region holding the MacBinary III signature
    pub fn signature_region(&self) -> &[u8] {
        &self.raw[OFF_SIGNATURE..OFF_SIGNATURE + SIGNATURE_LEN]
    }

    pub fn unpacked_len(&self) -> u32 {
        read_u32(&self.raw, OFF_UNPACKED_LEN)
    }

    pub fn additional_header_len(&self) -> u16 {
        read_u16(&self.raw, OFF_ADDL_HEADER_LEN)
    }

    pub fn encoder_version(&self) -> u8 {
        self.raw[OFF_ENCODER_VERSION]
    }

    pub fn min_version(&self) -> u8 {
        self.raw[OFF_MIN_VERSION]
    }

    pub fn stored_crc(&self) -> u16 {
        read_u16(&self.raw, OFF_CRC)
    }
}

fn fork_len_field(fork: Fork, len: usize) -> Result<u32> {
    // Readers treat the field as signed
    i32::try_from(len)
        .map(|l| l as u32)
        .map_err(|_| MacBinError::ForkTooLarge { fork, len })
}
