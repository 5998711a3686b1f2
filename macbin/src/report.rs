//! Header diagnostics
//!
//! Decodes every header field and checks it against the format's structural
//! rules and the CRC. Nothing here fails: every check runs and contributes
//! findings regardless of what the others found.

use std::fmt;

use chrono::{Local, TimeZone};

use crate::checksum::verify_header_crc;
use crate::format::{
    mac_to_unix, pad128, HEADER_SIZE, MAX_NAME_LEN, MBIN_SIGNATURE, OFF_RESERVED_1,
    OFF_RESERVED_2, OFF_RESERVED_3, OsType,
};
use crate::header::MacBinaryHeader;

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("INFO"),
            Severity::Warning => f.write_str("WARNING"),
            Severity::Error => f.write_str("ERROR"),
        }
    }
}

/// A single diagnostic message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn info(message: impl Into<String>) -> Self {
        Finding {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Finding {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Finding {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// All findings for one header, in check order
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub findings: Vec<Finding>,
}

impl Report {
    fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Iterate over findings
    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter()
    }

    /// Whether any finding is an error
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Number of findings with the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Whether some finding's message contains `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.findings.iter().any(|f| f.message.contains(needle))
    }
}

/// Diagnose a header.
///
/// `archive_len` is the real length of the archive the header came from, or
/// `None` if it could not be determined.
pub fn report(header: &MacBinaryHeader, archive_len: Option<u64>) -> Report {
    let mut report = Report::default();
    check_signature(header, &mut report);
    check_lengths(header, archive_len, &mut report);
    check_name(header, &mut report);
    report_ostype(header.file_type(), "type", &mut report);
    report_ostype(header.creator(), "creator", &mut report);
    report_finder_fields(header, &mut report);
    report_time(header.create_time(), "Create", &mut report);
    report_time(header.modify_time(), "Modify", &mut report);
    report_versions(header, &mut report);
    check_crc(header, &mut report);
    report
}

fn check_signature(header: &MacBinaryHeader, report: &mut Report) {
    let raw = header.as_bytes();
    let mut sig_ok = true;

    if header.version() != 0 {
        report.push(Finding::error(format!(
            "Leading byte should be zero, found 0x{:02x}. This is probably not a MacBinary file.",
            header.version()
        )));
        sig_ok = false;
    }
    for offset in [OFF_RESERVED_1, OFF_RESERVED_2] {
        if raw[offset] != 0 {
            report.push(Finding::error(format!(
                "Byte [0x{offset:02x}] should be zero, found 0x{:02x}.",
                raw[offset]
            )));
            sig_ok = false;
        }
    }

    let signature = header.signature_region();
    if signature.starts_with(MBIN_SIGNATURE)
        && signature[MBIN_SIGNATURE.len()..].iter().all(|&b| b == 0)
    {
        report.push(Finding::info("Detected MacBinary III signature."));
    } else if signature.iter().any(|&b| b != 0) {
        report.push(Finding::warning("Expected fourteen zero bytes at 0x66."));
        sig_ok = false;
    }

    let (t0, t1) = (raw[OFF_RESERVED_3], raw[OFF_RESERVED_3 + 1]);
    if t0 != 0 || t1 != 0 {
        report.push(Finding::warning(format!(
            "Expected two trailing zero bytes in header, found 0x{t0:02x} 0x{t1:02x}."
        )));
        sig_ok = false;
    }

    if sig_ok {
        report.push(Finding::info("Heuristic format check OK."));
    }
}

fn check_lengths(header: &MacBinaryHeader, archive_len: Option<u64>, report: &mut Report) {
    // Widened so that four near-maximal regions cannot wrap around
    let mut expected = HEADER_SIZE as u64;

    let data_len = header.data_len();
    if data_len < 0 {
        report.push(Finding::error(format!(
            "Invalid data fork length 0x{:08x}.",
            data_len as u32
        )));
    } else {
        report.push(Finding::info(format!("Data fork length {data_len}.")));
        expected += pad128(data_len as u64);
    }

    let resource_len = header.resource_len();
    if resource_len < 0 {
        report.push(Finding::error(format!(
            "Invalid resource fork length 0x{:08x}.",
            resource_len as u32
        )));
    } else {
        report.push(Finding::info(format!("Resource fork length {resource_len}.")));
        expected += pad128(resource_len as u64);
    }

    let comment_len = header.comment_len();
    if comment_len != 0 {
        report.push(Finding::info(format!("Comment length {comment_len}.")));
        // Assumed padded like every other region; the format does not say.
        expected += pad128(u64::from(comment_len));
    }

    let additional = header.additional_header_len();
    if additional != 0 {
        report.push(Finding::info(format!("Additional header length {additional}.")));
        expected += pad128(u64::from(additional));
    }

    match archive_len {
        None => report.push(Finding::warning(format!(
            "Unable to determine archive length. Can't validate against expected length {expected}."
        ))),
        Some(actual) if expected > actual => report.push(Finding::error(format!(
            "Expected length {expected} but found {actual}."
        ))),
        Some(actual) if expected < actual => report.push(Finding::warning(format!(
            "Extra unexpected data ({actual} - {expected} = {} extra bytes).",
            actual - expected
        ))),
        Some(actual) => report.push(Finding::info(format!(
            "Length {actual} matches expectation."
        ))),
    }
}

fn check_name(header: &MacBinaryHeader, report: &mut Report) {
    let name_len = usize::from(header.name_len());
    if name_len > MAX_NAME_LEN {
        report.push(Finding::error(format!(
            "Name length {name_len} exceeds buffer size!"
        )));
        return;
    }
    if name_len == 0 {
        report.push(Finding::error("Name length zero."));
        return;
    }

    let mut low = 0;
    let mut high = 0;
    let display: String = header
        .name()
        .iter()
        .map(|&b| match b {
            0x00..=0x1f => {
                low += 1;
                '?'
            }
            0x7f..=0xff => {
                high += 1;
                '?'
            }
            _ => b as char,
        })
        .collect();

    if low > 0 {
        report.push(Finding::warning(format!(
            "File name contains {low} bytes in 0x00..0x1f. This is probably an error."
        )));
    }
    if high > 0 {
        report.push(Finding::warning(format!(
            "File name contains {high} bytes in 0x7f..0xff. Not necessarily a problem, but they are not shown here."
        )));
    }
    report.push(Finding::info(format!("File name '{display}'")));
}

fn report_ostype(code: OsType, what: &str, report: &mut Report) {
    if code.is_printable() {
        report.push(Finding::info(format!("File {what} '{code}'")));
    } else {
        report.push(Finding::warning(format!(
            "Unprintable file {what}: 0x{:08x}",
            code.as_u32()
        )));
    }
}

fn report_finder_fields(header: &MacBinaryHeader, report: &mut Report) {
    report.push(Finding::info(format!(
        "Finder flags 0x{:02x},0x{:02x}.",
        header.finder_flags(),
        header.finder_flags_2()
    )));
    report.push(Finding::info(format!(
        "Position in Finder window ({},{}).",
        header.horizontal_position(),
        header.vertical_position()
    )));
    report.push(Finding::info(format!(
        "Window/folder ID 0x{:04x}.",
        header.folder_id()
    )));
    match header.protected() {
        0x00 => report.push(Finding::info("No protected bit.")),
        0x01 => report.push(Finding::info("Protected bit set.")),
        other => report.push(Finding::warning(format!(
            "Unexpected value 0x{other:02x} for protected bit."
        ))),
    }
    let unpacked = header.unpacked_len();
    if unpacked != 0 {
        report.push(Finding::info(format!("Unpacked length {unpacked}.")));
    }
}

/// Render a Mac epoch timestamp in local time, `None` if it has no local representation
pub fn format_mac_time(mac: u32) -> Option<String> {
    Local
        .timestamp_opt(mac_to_unix(mac), 0)
        .single()
        .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string())
}

fn report_time(mac: u32, which: &str, report: &mut Report) {
    match format_mac_time(mac) {
        Some(text) => report.push(Finding::info(format!("{which} time {text}"))),
        None => report.push(Finding::error(format!(
            "Unable to format {which} time 0x{mac:08x}."
        ))),
    }
}

fn report_versions(header: &MacBinaryHeader, report: &mut Report) {
    report.push(Finding::info(format!(
        "MacBinary version source=0x{:02x}, minimum=0x{:02x}.",
        header.encoder_version(),
        header.min_version()
    )));
}

fn check_crc(header: &MacBinaryHeader, report: &mut Report) {
    match verify_header_crc(header.as_bytes()) {
        Ok(()) => report.push(Finding::info(format!(
            "CRC 0x{:04x} matches.",
            header.stored_crc()
        ))),
        Err((stored, computed)) => report.push(Finding::error(format!(
            "CRC mismatch! Stated 0x{stored:04x} but calculated 0x{computed:04x}."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::*;
    use crate::header::{FinishParams, TimeGuess};

    fn finished_header(data_len: usize, resource_len: usize) -> MacBinaryHeader {
        let mut header = MacBinaryHeader::new(b"Report Test.bin");
        header
            .finish(&FinishParams {
                file_type: Some(OsType(*b"TEXT")),
                creator: Some(OsType(*b"ttxt")),
                data_len,
                resource_len,
                times: TimeGuess {
                    create: 3_000_000_000,
                    modify: 3_000_000_100,
                },
            })
            .unwrap();
        header
    }

    fn with_raw(header: &MacBinaryHeader, edit: impl FnOnce(&mut [u8; 128])) -> MacBinaryHeader {
        let mut raw = *header.as_bytes();
        edit(&mut raw);
        MacBinaryHeader::from_bytes(raw)
    }

    #[test]
    fn test_clean_header() {
        let header = finished_header(10, 0);
        let report = report(&header, Some(256));

        assert!(!report.has_errors(), "{:?}", report.findings);
        assert_eq!(report.count(Severity::Warning), 0, "{:?}", report.findings);
        assert!(report.mentions("Heuristic format check OK"));
        assert!(report.mentions("Length 256 matches expectation"));
        assert!(report.mentions("CRC"));
        assert!(report.mentions("matches."));
        assert!(report.mentions("File name 'Report Test'"));
        assert!(report.mentions("File type 'TEXT'"));
        assert!(report.mentions("File creator 'ttxt'"));
        assert!(report.mentions("Create time"));
        assert!(report.mentions("MacBinary version source=0x81, minimum=0x81."));
    }

    #[test]
    fn test_structural_signature() {
        let header = with_raw(&finished_header(0, 0), |raw| {
            raw[OFF_VERSION] = 1;
            raw[OFF_RESERVED_1] = 2;
            raw[OFF_RESERVED_2] = 3;
            raw[OFF_RESERVED_3 + 1] = 4;
        });
        let report = report(&header, Some(128));
        assert!(report.mentions("Leading byte should be zero, found 0x01"));
        assert!(report.mentions("Byte [0x4a] should be zero, found 0x02"));
        assert!(report.mentions("Byte [0x52] should be zero, found 0x03"));
        assert!(report.mentions("found 0x00 0x04"));
        assert!(!report.mentions("Heuristic format check OK"));
    }

    #[test]
    fn test_macbinary_iii_signature() {
        let header = with_raw(&finished_header(0, 0), |raw| {
            raw[OFF_SIGNATURE..OFF_SIGNATURE + 4].copy_from_slice(b"mBIN");
        });
        let report = report(&header, Some(128));
        assert!(report.mentions("Detected MacBinary III signature"));
        assert!(report.mentions("Heuristic format check OK"));

        let header = with_raw(&header, |raw| raw[OFF_SIGNATURE + 10] = 1);
        let report = super::report(&header, Some(128));
        assert!(report.mentions("Expected fourteen zero bytes at 0x66"));
    }

    #[test]
    fn test_length_accounting() {
        let header = finished_header(10, 200);
        // 128 + 128 + 256
        assert!(report(&header, Some(512)).mentions("Length 512 matches expectation"));

        let longer = report(&header, Some(600));
        assert!(longer.mentions("600 - 512 = 88 extra bytes"));
        assert!(!longer.has_errors());

        let shorter = report(&header, Some(400));
        assert!(shorter.mentions("Expected length 512 but found 400"));
        assert!(shorter.has_errors());

        let unknown = report(&header, None);
        assert!(unknown.mentions("Can't validate against expected length 512"));
        assert!(!unknown.has_errors());
    }

    #[test]
    fn test_comment_and_additional_header_are_counted() {
        let header = with_raw(&finished_header(0, 0), |raw| {
            write_u16(raw, OFF_COMMENT_LEN, 5);
            write_u16(raw, OFF_ADDL_HEADER_LEN, 130);
        });
        let report = report(&header, Some(128 + 128 + 256));
        assert!(report.mentions("Comment length 5."));
        assert!(report.mentions("Additional header length 130."));
        assert!(report.mentions("Length 512 matches expectation"));
    }

    #[test]
    fn test_negative_fork_lengths() {
        let header = with_raw(&finished_header(0, 0), |raw| {
            write_u32(raw, OFF_DATA_LEN, 0xFFFF_FFF0);
            write_u32(raw, OFF_RES_LEN, 0x8000_0000);
        });
        let report = report(&header, Some(128));
        assert!(report.mentions("Invalid data fork length 0xfffffff0."));
        assert!(report.mentions("Invalid resource fork length 0x80000000."));
        // Negative lengths do not count towards the expected total
        assert!(report.mentions("Length 128 matches expectation"));
    }

    #[test]
    fn test_huge_lengths_do_not_wrap() {
        let header = with_raw(&finished_header(0, 0), |raw| {
            write_u32(raw, OFF_DATA_LEN, 0x7FFF_FFFF);
            write_u32(raw, OFF_RES_LEN, 0x7FFF_FFFF);
            write_u16(raw, OFF_COMMENT_LEN, 0xFFFF);
            write_u16(raw, OFF_ADDL_HEADER_LEN, 0xFFFF);
        });
        let report = report(&header, Some(1024));
        assert!(report.mentions("Expected length 4295098496 but found 1024"));
    }

    #[test]
    fn test_name_checks() {
        let base = finished_header(0, 0);

        let zero = with_raw(&base, |raw| raw[OFF_NAME_LEN] = 0);
        assert!(report(&zero, Some(128)).mentions("Name length zero."));

        let long = with_raw(&base, |raw| raw[OFF_NAME_LEN] = 64);
        assert!(report(&long, Some(128)).mentions("Name length 64 exceeds buffer size!"));

        let odd = with_raw(&base, |raw| {
            raw[OFF_NAME_LEN] = 4;
            raw[OFF_NAME..OFF_NAME + 4].copy_from_slice(&[b'a', 0x01, 0xE9, b'z']);
        });
        let report = report(&odd, Some(128));
        assert!(report.mentions("File name contains 1 bytes in 0x00..0x1f"));
        assert!(report.mentions("File name contains 1 bytes in 0x7f..0xff"));
        assert!(report.mentions("File name 'a??z'"));
    }

    #[test]
    fn test_unprintable_ostype() {
        let header = with_raw(&finished_header(0, 0), |raw| {
            raw[OFF_TYPE..OFF_TYPE + 4].copy_from_slice(&[0, 0, 0x12, 0x34]);
        });
        let report = report(&header, Some(128));
        assert!(report.mentions("Unprintable file type: 0x00001234"));
    }

    #[test]
    fn test_protected_values() {
        let base = finished_header(0, 0);
        assert!(report(&base, Some(128)).mentions("No protected bit."));

        let set = with_raw(&base, |raw| raw[OFF_PROTECTED] = 1);
        assert!(report(&set, Some(128)).mentions("Protected bit set."));

        let odd = with_raw(&base, |raw| raw[OFF_PROTECTED] = 7);
        let report = report(&odd, Some(128));
        assert!(report.mentions("Unexpected value 0x07 for protected bit."));
        assert_eq!(
            report
                .iter()
                .find(|f| f.message.contains("protected"))
                .map(|f| f.severity),
            Some(Severity::Warning)
        );
    }

    #[test]
    fn test_crc_mismatch() {
        let header = with_raw(&finished_header(0, 0), |raw| raw[OFF_FOLDER_ID] ^= 0x10);
        let report = report(&header, Some(128));
        assert!(report.mentions("CRC mismatch!"));
        assert!(report.has_errors());
    }

    #[test]
    fn test_unpacked_length_and_position() {
        let header = with_raw(&finished_header(0, 0), |raw| {
            write_u32(raw, OFF_UNPACKED_LEN, 4096);
            write_u16(raw, OFF_VERT_POS, 20);
            write_u16(raw, OFF_HORZ_POS, 30);
        });
        let report = report(&header, Some(128));
        assert!(report.mentions("Unpacked length 4096."));
        assert!(report.mentions("Position in Finder window (30,20)."));
    }

    #[test]
    fn test_format_mac_time() {
        let text = format_mac_time(UNIX_EPOCH_IN_MAC_TIME + 86_400 * 365).unwrap();
        assert_eq!(text.len(), 19);
        assert!(text.starts_with("1970-12-3") || text.starts_with("1971-01-0"));
    }
}
