//! `rocm-configure includes` command

use anyhow::Result;

use crate::cli::IncludesArgs;
use crate::commands::GlobalArgs;
use rocm_configure::probe::{default_include_dirs, find_compiler};

pub fn execute(args: IncludesArgs, global: &GlobalArgs) -> Result<()> {
    let compiler = match args.compiler {
        Some(path) => path,
        None => {
            let (_, host) = global.detect_host()?;
            find_compiler(&host)?
        }
    };

    for dir in default_include_dirs(&compiler)? {
        println!("{}", dir.display());
    }

    Ok(())
}
