//! `rocm-configure configure` command

use anyhow::Result;

use crate::cli::ConfigureArgs;
use crate::commands::GlobalArgs;
use rocm_configure::ops::configure;
use rocm_configure::util::fs::relative_path;

pub fn execute(args: ConfigureArgs, global: &GlobalArgs) -> Result<()> {
    let (config, host) = global.detect_host()?;
    let out_dir = args.output.unwrap_or_else(|| config.output_dir());

    let report = configure(&host, &out_dir)?;

    for file in &report.files {
        println!("  wrote {}", relative_path(&out_dir, file).display());
    }
    println!(
        "Configured ROCm ({}): {} files in {}",
        report.mode,
        report.files.len(),
        out_dir.display()
    );

    Ok(())
}
