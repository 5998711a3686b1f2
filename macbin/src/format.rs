//! Binary format definitions for MacBinary files
//!
//! A MacBinary file has the following structure:
//!
//! ```text
//! +------------------------------+
//! | Header (128 bytes)           |
//! +------------------------------+
//! | Additional header (optional) |  padded to a multiple of 128
//! +------------------------------+
//! | Data fork                    |  padded to a multiple of 128
//! +------------------------------+
//! | Resource fork                |  padded to a multiple of 128
//! +------------------------------+
//! | Get Info comment (optional)  |
//! +------------------------------+
//! ```
//!
//! All multi-byte header fields are big-endian. Padding bytes are zero.

use std::fmt;
use std::str::FromStr;

use byteorder::{BigEndian, ByteOrder};

use crate::error::MacBinError;

/// Header size in bytes
pub const HEADER_SIZE: usize = 128;

/// Every region after the header is padded to this size
pub const BLOCK_SIZE: usize = 128;

/// Number of header bytes covered by the CRC
pub const CRC_RANGE: usize = 124;

/// Longest file name the header can carry
pub const MAX_NAME_LEN: usize = 63;

/// Seconds from 1904-01-01 (Mac epoch) to 1970-01-01 (Unix epoch)
pub const UNIX_EPOCH_IN_MAC_TIME: u32 = 2_082_844_800;

/// MacBinary III signature at [`OFF_SIGNATURE`]
pub const MBIN_SIGNATURE: &[u8; 4] = b"mBIN";

/// Version byte written for both encoder and minimum reader (MacBinary II)
pub const MACBINARY_II_VERSION: u8 = 0x81;

/// Default type code for a freshly initialized header
pub const DEFAULT_TYPE: OsType = OsType(*b"File");

/// Default creator code for a freshly initialized header
pub const DEFAULT_CREATOR: OsType = OsType(*b"????");

/// Finder flag bit 0 at [`OFF_FINDER_FLAGS`]
pub const FINDER_FLAG_INITED: u8 = 0x01;

// Field offsets within the 128-byte header.
pub const OFF_VERSION: usize = 0x00;
pub const OFF_NAME_LEN: usize = 0x01;
pub const OFF_NAME: usize = 0x02;
pub const OFF_TYPE: usize = 0x41;
pub const OFF_CREATOR: usize = 0x45;
pub const OFF_FINDER_FLAGS: usize = 0x49;
pub const OFF_RESERVED_1: usize = 0x4a;
pub const OFF_VERT_POS: usize = 0x4b;
pub const OFF_HORZ_POS: usize = 0x4d;
pub const OFF_FOLDER_ID: usize = 0x4f;
pub const OFF_PROTECTED: usize = 0x51;
pub const OFF_RESERVED_2: usize = 0x52;
pub const OFF_DATA_LEN: usize = 0x53;
pub const OFF_RES_LEN: usize = 0x57;
pub const OFF_CREATE_TIME: usize = 0x5b;
pub const OFF_MODIFY_TIME: usize = 0x5f;
pub const OFF_COMMENT_LEN: usize = 0x63;
pub const OFF_FINDER_FLAGS_2: usize = 0x65;
pub const OFF_SIGNATURE: usize = 0x66;
pub const SIGNATURE_LEN: usize = 14;
pub const OFF_UNPACKED_LEN: usize = 0x74;
pub const OFF_ADDL_HEADER_LEN: usize = 0x78;
pub const OFF_ENCODER_VERSION: usize = 0x7a;
pub const OFF_MIN_VERSION: usize = 0x7b;
pub const OFF_CRC: usize = 0x7c;
pub const OFF_RESERVED_3: usize = 0x7e;

/// Read a big-endian u16 at `offset`
pub fn read_u16(buf: &[u8], offset: usize) -> u16 {
    BigEndian::read_u16(&buf[offset..offset + 2])
}

/// Read a big-endian u32 at `offset`
pub fn read_u32(buf: &[u8], offset: usize) -> u32 {
    BigEndian::read_u32(&buf[offset..offset + 4])
}

/// Read a big-endian u32 at `offset` as a signed value
///
/// Fork lengths are stored unsigned but anything with the high bit set is
/// treated as negative, and therefore invalid.
pub fn read_i32(buf: &[u8], offset: usize) -> i32 {
    BigEndian::read_i32(&buf[offset..offset + 4])
}

/// Write a big-endian u16 at `offset`
pub fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
    BigEndian::write_u16(&mut buf[offset..offset + 2], value);
}

/// Write a big-endian u32 at `offset`
pub fn write_u32(buf: &mut [u8], offset: usize, value: u32) {
    BigEndian::write_u32(&mut buf[offset..offset + 4], value);
}

/// Round `n` up to the next multiple of 128
pub fn pad128(n: u64) -> u64 {
    n + ((BLOCK_SIZE as u64 - n % BLOCK_SIZE as u64) % BLOCK_SIZE as u64)
}

/// Number of zero bytes needed after a region of `len` bytes
pub fn padding_for(len: usize) -> usize {
    (BLOCK_SIZE - len % BLOCK_SIZE) % BLOCK_SIZE
}

/// Convert a Unix timestamp to Mac epoch seconds, wrapping like unsigned 32-bit arithmetic
pub fn unix_to_mac(unix: i64) -> u32 {
    (unix as u32).wrapping_add(UNIX_EPOCH_IN_MAC_TIME)
}

/// Convert Mac epoch seconds to a Unix timestamp
pub fn mac_to_unix(mac: u32) -> i64 {
    i64::from(mac) - i64::from(UNIX_EPOCH_IN_MAC_TIME)
}

/// A four-character code (file type, creator)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OsType(pub [u8; 4]);

impl OsType {
    /// Build from a slice; `None` unless it is exactly 4 bytes
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; 4]>::try_from(bytes).ok().map(OsType)
    }

    /// Big-endian numeric value
    pub fn as_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// True when every byte is in 0x20..=0x7e
    pub fn is_printable(&self) -> bool {
        self.0.iter().all(|b| (0x20..=0x7e).contains(b))
    }
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_printable() {
            // Printable ASCII is valid UTF-8 one byte per char.
            for &b in &self.0 {
                write!(f, "{}", b as char)?;
            }
            Ok(())
        } else {
            write!(f, "0x{:08x}", self.as_u32())
        }
    }
}

impl FromStr for OsType {
    type Err = MacBinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match OsType::from_slice(s.as_bytes()) {
            Some(code) if code.is_printable() => Ok(code),
            _ => Err(MacBinError::InvalidOsType(s.to_string())),
        }
    }
}
