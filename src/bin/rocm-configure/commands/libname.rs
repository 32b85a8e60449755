//! `rocm-configure libname` command

use anyhow::Result;

use crate::cli::LibnameArgs;
use rocm_configure::core::host::HostOs;
use rocm_configure::core::library::LibrarySpec;

pub fn execute(args: LibnameArgs) -> Result<()> {
    let os = match &args.os {
        Some(tag) => HostOs::from_tag(tag),
        None => HostOs::detect(),
    };

    let mut spec = LibrarySpec::shared(args.name).with_static(args.is_static);
    if let Some(version) = args.version {
        spec = spec.with_version(version);
    }
    println!("{}", spec.file_name(&os)?);

    Ok(())
}
