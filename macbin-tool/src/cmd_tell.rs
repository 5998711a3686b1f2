use crate::cli::TellArgs;
use crate::report_line;

/// Print every finding. Findings never change the exit status; only a
/// header that cannot be read at all does.
pub fn run(args: TellArgs) -> Result<(), Box<dyn std::error::Error>> {
    let report = macbin::tell(&args.archive)?;
    let archive = args.archive.display().to_string();
    for finding in report.iter() {
        report_line(&archive, finding);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_fails_on_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short");
        std::fs::write(&path, [0u8; 20]).unwrap();
        assert!(run(TellArgs { archive: path }).is_err());
    }

    #[test]
    fn test_run_succeeds_despite_findings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.bin");
        std::fs::write(&path, [0xFFu8; 128]).unwrap();
        assert!(run(TellArgs { archive: path }).is_ok());
    }
}
