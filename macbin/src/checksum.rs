//! Header checksum for MacBinary files
//!
//! MacBinary II and later store a CRC-16 of header bytes 0..124 at offset
//! 0x7c. The CRC is the CCITT polynomial 0x1021, processed MSB first with no
//! reflection and no final XOR (the "XMODEM" parameterization). BinHex uses
//! the same polynomial; the two only differ in what they feed it, so a single
//! routine taking a seed covers both.

use crc::{Crc, CRC_16_XMODEM};

use crate::format::{read_u16, CRC_RANGE, OFF_CRC};

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// CRC-16/XMODEM of `data`, continuing from `seed`
///
/// Pass 0 for a fresh computation. Passing the result of a previous call
/// continues that computation, so `crc16(b, crc16(a, 0)) == crc16(a ++ b, 0)`.
pub fn crc16(data: &[u8], seed: u16) -> u16 {
    let mut digest = CRC16.digest_with_initial(seed);
    digest.update(data);
    digest.finalize()
}

/// CRC of the checksummed part of a 128-byte header
pub fn header_crc(header: &[u8; 128]) -> u16 {
    crc16(&header[..CRC_RANGE], 0)
}

/// Verify a header CRC
/// Returns Ok(()) if the stored value matches, Err((stored, computed)) otherwise
pub fn verify_header_crc(header: &[u8; 128]) -> Result<(), (u16, u16)> {
    let stored = read_u16(header, OFF_CRC);
    let computed = header_crc(header);
    if stored == computed {
        Ok(())
    } else {
        Err((stored, computed))
    }
}
