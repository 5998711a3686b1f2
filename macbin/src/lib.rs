//! macbin - MacBinary encoder, decoder and inspector
//!
//! MacBinary bundles a classic Mac OS file (data fork, resource fork and
//! Finder metadata) into one flat byte stream that survives transfer through
//! systems without fork support.
//!
//! # Features
//!
//! - **Create** an archive from fork files, with optional Finder info
//! - **Extract** forks and the raw header from an archive
//! - **Tell** what is in a header, with structural and CRC checks
//! - **Cross-platform** - works anywhere files are plain byte streams
//!
//! Archives are written in MacBinary II layout. MacBinary III signatures and
//! additional headers are recognized when reading.
//!
//! # Example
//!
//! ```no_run
//! use macbin::{extract, tell, ExtractRequest, Result};
//!
//! fn main() -> Result<()> {
//!     for finding in tell("Thing.bin")?.iter() {
//!         println!("{finding}");
//!     }
//!
//!     let extracted = extract(&ExtractRequest {
//!         archive: "Thing.bin".into(),
//!         ..Default::default()
//!     })?;
//!     if let Some(fork) = extracted.data_fork {
//!         println!("data fork: {} ({} bytes)", fork.path.display(), fork.len);
//!     }
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod checksum;
pub mod error;
pub mod format;
pub mod fs;
pub mod header;
pub mod paths;
pub mod reader;
pub mod report;
pub mod writer;

pub use archive::{
    build, create, extract, tell, CreateRequest, Created, ExtractRequest, Extracted,
    ExtractedFork,
};
pub use checksum::{crc16, header_crc};
pub use error::{Fork, MacBinError, Result};
pub use format::OsType;
pub use fs::ReadOptions;
pub use header::{FinishParams, ForkTimes, MacBinaryHeader, TimeGuess};
pub use reader::{unpack, ForkLayout, Unpacked};
pub use report::{report, Finding, Report, Severity};
pub use writer::{archive_len, pack, MacBinaryWriter};
