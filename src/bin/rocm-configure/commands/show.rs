//! `rocm-configure show` command

use anyhow::Result;
use serde::Serialize;

use crate::cli::ShowArgs;
use crate::commands::GlobalArgs;
use rocm_configure::core::host::HostConfig;
use rocm_configure::ops::ConfigureMode;

#[derive(Serialize)]
struct ShowOutput<'a> {
    mode: ConfigureMode,
    host: &'a HostConfig,
}

pub fn execute(args: ShowArgs, global: &GlobalArgs) -> Result<()> {
    let (_, host) = global.detect_host()?;
    let mode = ConfigureMode::select(&host);

    if args.json {
        let output = ShowOutput { mode, host: &host };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("mode:              {}", mode);
    println!("os:                {}", host.os);
    println!("rocm enabled:      {}", host.feature_enabled);
    println!("toolkit root:      {}", host.toolkit_root.display());
    match &host.compiler_override {
        Some(path) => println!("host compiler:     {}", path.display()),
        None => println!("host compiler:     (search PATH)"),
    }
    if let Some(repo) = &host.remote_config_repo {
        println!("remote repository: {}", repo);
    }
    println!("amdgpu targets:    {}", host.amdgpu_targets.join(","));
    for (name, value) in &host.hipcc_env {
        println!("hipcc env:         {}={}", name, value);
    }
    println!("crosstool verbose: {}", host.crosstool_verbose);

    Ok(())
}
