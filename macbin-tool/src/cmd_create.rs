use macbin::CreateRequest;

use crate::cli::CreateArgs;
use crate::style::{format_size, kv, kv_highlight, section};

pub fn run(args: CreateArgs, read_options: macbin::ReadOptions) -> Result<(), Box<dyn std::error::Error>> {
    let request = CreateRequest {
        archive: args.archive,
        data_fork: args.forks.data_fork,
        resource_fork: args.forks.resource_fork,
        finder_info: args.forks.finder_info,
        file_type: args.file_type,
        creator: args.creator,
        read_options,
    };
    let created = macbin::create(&request)?;

    section("MacBinary Archive");
    let mut archive = created.archive.display().to_string();
    if created.inferred_archive {
        archive.push_str(" (inferred)");
    }
    kv_highlight("Archive", &archive);
    kv("Data fork", &format_size(created.data_len as u64));
    kv("Resource fork", &format_size(created.resource_len as u64));
    kv("Archive size", &format_size(created.archive_len as u64));
    Ok(())
}
