//! Configuration file support.
//!
//! Two optional locations are merged, project over global:
//! - Global: `~/.rocm-configure/config.toml`
//! - Project: `.rocm-configure/config.toml`
//!
//! An explicit `--config FILE` is merged last. Environment variables read
//! by [`crate::core::host`] override whatever the files say.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default ROCm installation root.
pub const DEFAULT_TOOLKIT_ROOT: &str = "/opt/rocm";

/// Default AMDGPU architectures compiled for when none are configured.
pub const DEFAULT_AMDGPU_TARGETS: &[&str] = &["gfx803", "gfx900"];

/// Default output directory for `configure`, relative to the working dir.
pub const DEFAULT_OUTPUT_DIR: &str = "rocm_config";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub toolkit: ToolkitConfig,
    pub output: OutputConfig,
}

/// Toolkit defaults, used when the environment does not say otherwise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// ROCm installation root (e.g., /opt/rocm-6.0.2)
    pub default_root: Option<PathBuf>,

    /// AMDGPU targets (e.g., ["gfx906", "gfx90a"])
    pub amdgpu_targets: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that receives the generated files
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing
    /// or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.toolkit.default_root.is_some() {
            self.toolkit.default_root = other.toolkit.default_root;
        }
        if !other.toolkit.amdgpu_targets.is_empty() {
            self.toolkit.amdgpu_targets = other.toolkit.amdgpu_targets;
        }
        if other.output.dir.is_some() {
            self.output.dir = other.output.dir;
        }
    }

    /// Toolkit root to use when `ROCM_TOOLKIT_PATH` is unset.
    pub fn toolkit_root(&self) -> PathBuf {
        self.toolkit
            .default_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOOLKIT_ROOT))
    }

    /// AMDGPU targets to use when `TF_ROCM_AMDGPU_TARGETS` is unset.
    pub fn amdgpu_targets(&self) -> Vec<String> {
        if self.toolkit.amdgpu_targets.is_empty() {
            DEFAULT_AMDGPU_TARGETS.iter().map(|s| s.to_string()).collect()
        } else {
            self.toolkit.amdgpu_targets.clone()
        }
    }

    /// Output directory for generated files.
    pub fn output_dir(&self) -> PathBuf {
        self.output
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }
}

/// Load merged configuration.
///
/// Order of precedence (highest to lowest):
/// 1. Explicit file (`--config`)
/// 2. Project config (.rocm-configure/config.toml)
/// 3. Global config (~/.rocm-configure/config.toml)
/// 4. Defaults
pub fn load_config(global_path: &Path, project_path: &Path, explicit: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    // A file the user named must exist and parse
    if let Some(path) = explicit {
        config.merge(Config::load(path)?);
    }

    Ok(config)
}

/// Get the global config directory (~/.rocm-configure).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".rocm-configure"))
}

/// Get the global config path (~/.rocm-configure/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.rocm-configure/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".rocm-configure").join("config.toml")
}
