//! File name heuristics for the default outputs of create and extract
//!
//! These are pure path manipulations with no filesystem access. They work on
//! `Path` rather than `str` so that names which are not valid UTF-8 keep their
//! exact bytes.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Archive suffix stripped when deriving fork names
pub const ARCHIVE_SUFFIX: &str = ".bin";

/// Suffix given to an extracted data fork
pub const DATA_SUFFIX: &str = ".data";

/// Suffix given to an extracted resource fork
pub const RESOURCE_SUFFIX: &str = ".res";

/// Alternative resource fork suffix accepted when inferring an archive name
pub const RSRC_SUFFIX: &str = ".rsrc";

/// Output paths chosen for an extraction with no explicit outputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultOutputs {
    pub data_fork: Option<PathBuf>,
    pub resource_fork: Option<PathBuf>,
}

impl DefaultOutputs {
    /// True when neither fork gets an output file
    pub fn is_empty(&self) -> bool {
        self.data_fork.is_none() && self.resource_fork.is_none()
    }
}

/// Swap a trailing `from` suffix for `to`, or `None` if `path` lacks it.
///
/// A file named exactly `from` (".bin", say) becomes a file named `to`.
fn replace_suffix(path: &Path, from: &str, to: &str) -> Option<PathBuf> {
    let name = path.file_name()?;
    if name == OsStr::new(from) {
        return Some(path.with_file_name(to));
    }
    let from_ext = from.strip_prefix('.')?;
    let to_ext = to.strip_prefix('.')?;
    (path.extension()? == OsStr::new(from_ext)).then(|| path.with_extension(to_ext))
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// `X.bin` becomes `X<suffix>`; anything else gets `suffix` appended
pub fn sibling_with_suffix(archive: &Path, suffix: &str) -> PathBuf {
    replace_suffix(archive, ARCHIVE_SUFFIX, suffix)
        .unwrap_or_else(|| append_suffix(archive, suffix))
}

/// Name outputs after the archive: `<stem>.data` for a nonempty data fork,
/// `<stem>.res` for a nonempty resource fork.
pub fn default_outputs(archive: &Path, data_len: usize, resource_len: usize) -> DefaultOutputs {
    DefaultOutputs {
        data_fork: (data_len > 0).then(|| sibling_with_suffix(archive, DATA_SUFFIX)),
        resource_fork: (resource_len > 0).then(|| sibling_with_suffix(archive, RESOURCE_SUFFIX)),
    }
}

/// Guess an archive path from the fork inputs of a create.
///
/// `X.data` gives `X.bin`; failing that `X.res` or `X.rsrc` gives `X.bin`.
pub fn infer_archive_path(data_fork: Option<&Path>, resource_fork: Option<&Path>) -> Option<PathBuf> {
    let from_data = data_fork.and_then(|p| replace_suffix(p, DATA_SUFFIX, ARCHIVE_SUFFIX));
    from_data.or_else(|| {
        resource_fork.and_then(|p| {
            replace_suffix(p, RESOURCE_SUFFIX, ARCHIVE_SUFFIX)
                .or_else(|| replace_suffix(p, RSRC_SUFFIX, ARCHIVE_SUFFIX))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> &Path {
        Path::new(s)
    }

    #[test]
    fn test_sibling_with_suffix() {
        assert_eq!(sibling_with_suffix(p("dir/Thing.bin"), ".data"), p("dir/Thing.data"));
        assert_eq!(sibling_with_suffix(p("Thing.hqx"), ".data"), p("Thing.hqx.data"));
        assert_eq!(sibling_with_suffix(p("Thing.BIN"), ".res"), p("Thing.BIN.res"));
        assert_eq!(sibling_with_suffix(p("Thing"), ".res"), p("Thing.res"));
        assert_eq!(sibling_with_suffix(p("a/.bin"), ".data"), p("a/.data"));
    }

    #[test]
    fn test_default_outputs() {
        let both = default_outputs(p("out/App.bin"), 10, 20);
        assert_eq!(both.data_fork.as_deref(), Some(p("out/App.data")));
        assert_eq!(both.resource_fork.as_deref(), Some(p("out/App.res")));

        let data_only = default_outputs(p("App"), 10, 0);
        assert_eq!(data_only.data_fork.as_deref(), Some(p("App.data")));
        assert_eq!(data_only.resource_fork, None);

        let resource_only = default_outputs(p("App.bin"), 0, 1);
        assert_eq!(resource_only.data_fork, None);
        assert_eq!(resource_only.resource_fork.as_deref(), Some(p("App.res")));

        assert!(default_outputs(p("App.bin"), 0, 0).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_default_outputs_keep_raw_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let archive = Path::new(OsStr::from_bytes(b"dir/caf\xe9.bin"));
        let outputs = default_outputs(archive, 1, 1);
        assert_eq!(
            outputs.data_fork.unwrap().as_os_str().as_bytes(),
            b"dir/caf\xe9.data"
        );
        assert_eq!(
            outputs.resource_fork.unwrap().as_os_str().as_bytes(),
            b"dir/caf\xe9.res"
        );

        let inferred = infer_archive_path(Some(Path::new(OsStr::from_bytes(b"\xff.data"))), None);
        assert_eq!(inferred.unwrap().as_os_str().as_bytes(), b"\xff.bin");
    }

    #[test]
    fn test_infer_archive_path() {
        assert_eq!(
            infer_archive_path(Some(p("a/Doc.data")), Some(p("Doc.res"))).as_deref(),
            Some(p("a/Doc.bin"))
        );
        assert_eq!(
            infer_archive_path(Some(p("Doc.txt")), Some(p("b/Doc.res"))).as_deref(),
            Some(p("b/Doc.bin"))
        );
        assert_eq!(
            infer_archive_path(None, Some(p("Doc.rsrc"))).as_deref(),
            Some(p("Doc.bin"))
        );
        assert_eq!(infer_archive_path(Some(p("Doc.txt")), None), None);
        assert_eq!(infer_archive_path(None, None), None);
    }
}
