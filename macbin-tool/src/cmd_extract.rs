use macbin::{ExtractRequest, ExtractedFork};

use crate::cli::ExtractArgs;
use crate::report_line;
use crate::style::{format_size, kv, section, DIM, RESET};

pub fn run(args: ExtractArgs, read_options: macbin::ReadOptions) -> Result<(), Box<dyn std::error::Error>> {
    let request = ExtractRequest {
        archive: args.archive,
        data_fork: args.forks.data_fork,
        resource_fork: args.forks.resource_fork,
        finder_info: args.forks.finder_info,
        read_options,
    };
    let extracted = macbin::extract(&request)?;

    let archive = request.archive.display().to_string();
    for warning in &extracted.warnings {
        report_line(&archive, warning);
    }

    section("Extracted");
    print_fork("Data fork", extracted.data_fork.as_ref());
    print_fork("Resource fork", extracted.resource_fork.as_ref());
    if let Some(path) = &extracted.finder_info {
        kv("Finder info", &path.display().to_string());
    }
    if extracted.default_names {
        println!("  {DIM}output names derived from {archive}{RESET}");
    }
    Ok(())
}

fn print_fork(label: &str, fork: Option<&ExtractedFork>) {
    match fork {
        Some(fork) => kv(
            label,
            &format!("{} ({})", fork.path.display(), format_size(fork.len as u64)),
        ),
        None => kv(label, &format!("{DIM}not written{RESET}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ForkArgs;
    use macbin::{FinishParams, MacBinaryHeader};

    #[test]
    fn test_run_writes_default_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("Note.bin");
        let bytes = macbin::build(
            MacBinaryHeader::new(b"Note.bin"),
            &FinishParams::default(),
            b"hello",
            b"",
        )
        .unwrap();
        std::fs::write(&archive, bytes).unwrap();

        let args = ExtractArgs {
            archive,
            forks: ForkArgs {
                data_fork: None,
                resource_fork: None,
                finder_info: None,
            },
        };
        run(args, macbin::ReadOptions::default()).unwrap();

        assert_eq!(std::fs::read(dir.path().join("Note.data")).unwrap(), b"hello");
        assert!(!dir.path().join("Note.res").exists());
    }
}
