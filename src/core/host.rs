//! Host facts: environment snapshot, host OS and the resulting
//! [`HostConfig`].
//!
//! This is the only module that reads the process environment. Everything
//! downstream receives a `HostConfig` value.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

use crate::util::config::Config;
use crate::util::process::ProcessBuilder;

/// Environment variables consulted by the probe.
pub mod env_vars {
    /// Host compiler override.
    pub const GCC_HOST_COMPILER_PATH: &str = "GCC_HOST_COMPILER_PATH";
    /// Feature flag; exactly `"1"` enables ROCm.
    pub const TF_NEED_ROCM: &str = "TF_NEED_ROCM";
    /// Toolkit root override.
    pub const ROCM_TOOLKIT_PATH: &str = "ROCM_TOOLKIT_PATH";
    /// Reference to a pre-generated configuration repository.
    pub const TF_ROCM_CONFIG_REPO: &str = "TF_ROCM_CONFIG_REPO";
    /// Comma-separated AMDGPU targets.
    pub const TF_ROCM_AMDGPU_TARGETS: &str = "TF_ROCM_AMDGPU_TARGETS";
    /// `"1"` makes the generated compiler wrapper verbose.
    pub const CROSSTOOL_VERBOSE: &str = "CROSSTOOL_VERBOSE";

    /// Variables forwarded to hipcc by the compiler wrapper, in order.
    pub const HIPCC_ENV: &[&str] = &[
        "HIP_CLANG_PATH",
        "DEVICE_LIB_PATH",
        "HIP_VDI_HOME",
        "HIPCC_VERBOSE",
        "HIPCC_COMPILE_FLAGS_APPEND",
    ];

    /// Every variable captured by [`super::EnvSnapshot::capture`].
    pub fn all() -> impl Iterator<Item = &'static str> {
        [
            GCC_HOST_COMPILER_PATH,
            TF_NEED_ROCM,
            ROCM_TOOLKIT_PATH,
            TF_ROCM_CONFIG_REPO,
            TF_ROCM_AMDGPU_TARGETS,
            CROSSTOOL_VERBOSE,
        ]
        .into_iter()
        .chain(HIPCC_ENV.iter().copied())
    }
}

/// The subset of the process environment the probe depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Read the relevant variables from the current process.
    pub fn capture() -> Self {
        let vars = env_vars::all()
            .filter_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
            .collect();
        EnvSnapshot { vars }
    }

    /// Build a snapshot from explicit pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        EnvSnapshot {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Value of `name`, treating an empty string as unset.
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }
}

/// Host operating system, classified from the OS name and `uname`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostOs {
    Linux,
    FreeBsd,
    Darwin,
    Windows,
    /// Any other `uname` result. Library naming rejects it.
    Other(String),
}

impl HostOs {
    /// Map a raw OS tag (`uname` output) to a host OS.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case("linux") {
            HostOs::Linux
        } else if tag.eq_ignore_ascii_case("freebsd") {
            HostOs::FreeBsd
        } else if tag.eq_ignore_ascii_case("darwin") {
            HostOs::Darwin
        } else if tag.eq_ignore_ascii_case("windows") {
            HostOs::Windows
        } else {
            HostOs::Other(tag.to_string())
        }
    }

    /// Classify a host from its OS name, asking `uname` only for names
    /// that are neither macOS nor Windows.
    pub fn classify(os_name: &str, uname: impl FnOnce() -> Option<String>) -> Self {
        let lower = os_name.to_lowercase();
        if lower.starts_with("mac os") {
            return HostOs::Darwin;
        }
        if lower.contains("windows") {
            return HostOs::Windows;
        }

        match uname() {
            Some(tag) if !tag.trim().is_empty() => HostOs::from_tag(&tag),
            _ => {
                tracing::debug!("uname unavailable, using OS name `{}`", os_name);
                HostOs::from_tag(os_name)
            }
        }
    }

    /// Detect the OS of the running host.
    pub fn detect() -> Self {
        HostOs::classify(host_os_name(), run_uname)
    }

    /// The tag used in messages and generated files.
    pub fn as_tag(&self) -> &str {
        match self {
            HostOs::Linux => "Linux",
            HostOs::FreeBsd => "FreeBSD",
            HostOs::Darwin => "Darwin",
            HostOs::Windows => "Windows",
            HostOs::Other(tag) => tag,
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl Serialize for HostOs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_tag())
    }
}

/// Human-style OS name of the running host.
fn host_os_name() -> &'static str {
    match std::env::consts::OS {
        "macos" => "Mac OS X",
        "windows" => "Windows",
        other => other,
    }
}

fn run_uname() -> Option<String> {
    match ProcessBuilder::new("uname").exec_strict("uname failed", false) {
        Ok(output) => Some(String::from_utf8_lossy(&output.stdout).trim().to_string()),
        Err(e) => {
            tracing::debug!("{}", e);
            None
        }
    }
}

/// Everything the probe knows about the host, fixed for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostConfig {
    pub os: HostOs,
    pub feature_enabled: bool,
    pub toolkit_root: PathBuf,
    pub compiler_override: Option<PathBuf>,
    pub remote_config_repo: Option<String>,
    /// Unvalidated AMDGPU target names
    pub amdgpu_targets: Vec<String>,
    /// Variables forwarded to hipcc, in [`env_vars::HIPCC_ENV`] order
    pub hipcc_env: Vec<(String, String)>,
    pub crosstool_verbose: bool,
}

impl HostConfig {
    /// Collect host facts. Never fails; unset values fall back to the
    /// config file and then to built-in defaults.
    pub fn detect(env: &EnvSnapshot, config: &Config) -> Self {
        HostConfig::with_os(env, config, HostOs::detect())
    }

    /// Like [`HostConfig::detect`] with a known host OS.
    pub fn with_os(env: &EnvSnapshot, config: &Config, os: HostOs) -> Self {
        let feature_enabled = feature_flag(env);

        let toolkit_root = env
            .get_non_empty(env_vars::ROCM_TOOLKIT_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| config.toolkit_root());

        let amdgpu_targets = match env.get_non_empty(env_vars::TF_ROCM_AMDGPU_TARGETS) {
            Some(raw) => raw.split(',').map(|t| t.trim().to_string()).collect(),
            None => config.amdgpu_targets(),
        };

        let hipcc_env = env_vars::HIPCC_ENV
            .iter()
            .filter_map(|name| env.get(name).map(|v| (name.to_string(), v.to_string())))
            .collect();

        HostConfig {
            os,
            feature_enabled,
            toolkit_root,
            compiler_override: env
                .get_non_empty(env_vars::GCC_HOST_COMPILER_PATH)
                .map(PathBuf::from),
            remote_config_repo: env
                .get_non_empty(env_vars::TF_ROCM_CONFIG_REPO)
                .map(str::to_string),
            amdgpu_targets,
            hipcc_env,
            crosstool_verbose: env.get(env_vars::CROSSTOOL_VERBOSE) == Some("1"),
        }
    }
}

fn feature_flag(env: &EnvSnapshot) -> bool {
    match env.get(env_vars::TF_NEED_ROCM) {
        Some("1") => true,
        None | Some("") | Some("0") => false,
        Some(other) => {
            tracing::warn!(
                "{}={:?} is treated as disabled; only \"1\" enables ROCm",
                env_vars::TF_NEED_ROCM,
                other
            );
            false
        }
    }
}
