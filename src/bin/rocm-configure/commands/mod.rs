//! Command implementations

pub mod completions;
pub mod configure;
pub mod doctor;
pub mod includes;
pub mod libname;
pub mod show;

use std::path::PathBuf;

use anyhow::{Context, Result};

use rocm_configure::core::host::{EnvSnapshot, HostConfig};
use rocm_configure::util::config::{global_config_path, load_config, project_config_path};
use rocm_configure::util::Config;

/// Flags shared by every subcommand.
pub struct GlobalArgs {
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Merged configuration: global, then project, then `--config`.
    pub fn load_config(&self) -> Result<Config> {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        let global = global_config_path().unwrap_or_default();
        load_config(&global, &project_config_path(&cwd), self.config.as_deref())
    }

    /// Host facts from the process environment and the configuration.
    pub fn detect_host(&self) -> Result<(Config, HostConfig)> {
        let config = self.load_config()?;
        let host = HostConfig::detect(&EnvSnapshot::capture(), &config);
        tracing::debug!("host: {:?}", host);
        Ok((config, host))
    }
}
