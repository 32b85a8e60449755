//! The configuration step.
//!
//! Picks one of three modes from the host facts and generates the
//! `rocm/` and `crosstool/` trees under the output directory:
//!
//! - **Disabled**: stub files that make any GPU build fail with a clear
//!   message. Nothing on the host is probed.
//! - **Remote**: aliases into a pre-generated configuration repository.
//! - **Local**: probes the toolkit and host compiler and writes the full
//!   configuration.
//!
//! Detection failures in local mode are fatal; they never fall back to
//! the disabled stubs.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::amdgpu::{extra_copts, parse_targets, quoted_list, AmdgpuTarget};
use crate::core::errors::ConfigureError;
use crate::core::host::HostConfig;
use crate::core::library::{library_file_name, LibraryLocation, RocmLibrary};
use crate::probe::compiler::{default_include_dirs, find_compiler, union_include_dirs};
use crate::probe::fs_probe::{
    find_rocm_libraries, find_toolkit_root, toolkit_include_dirs, toolkit_version,
};
use crate::render::genrule::{emit_symlink_genrule, symlink_genrule_for_dir};
use crate::render::template::TemplateJob;
use crate::render::templates::{
    BuildDefs, Crosstool, CrosstoolBuild, CrosstoolRemoteBuild, CrosstoolWrapper,
    DummyCrosstoolBuild, ErrorGpuDisabled, RocmBuild, RocmConfigHeader, RocmRemoteBuild, StubFile,
};
use crate::util::config::{DEFAULT_AMDGPU_TARGETS, DEFAULT_TOOLKIT_ROOT};
use crate::util::fs::{ensure_dir, norm_path, remove_dir_all_if_exists};

/// Output subdirectory for the ROCm package.
pub const ROCM_DIR: &str = "rocm";
/// Output subdirectory for the toolchain package.
pub const CROSSTOOL_DIR: &str = "crosstool";

/// Headers stubbed out when ROCm is disabled, relative to
/// `rocm/rocm/include`.
const STUB_HEADERS: &[&str] = &[
    "hip/hip_runtime.h",
    "rocblas.h",
    "rocfft.h",
    "hiprand.h",
    "miopen/miopen.h",
];

/// Flags that keep compiles reproducible across machines.
const UNFILTERED_COMPILE_FLAGS: &[&str] = &[
    "-Wno-builtin-macro-redefined",
    "-D__DATE__=\"redacted\"",
    "-D__TIMESTAMP__=\"redacted\"",
    "-D__TIME__=\"redacted\"",
    "-D__HIP_PLATFORM_HCC__",
];

/// Header genrules of the local configuration: name, directory under the
/// toolkit root, destination in the output tree.
pub(crate) const INCLUDE_GENRULES: &[(&str, &str, &str)] = &[
    ("rocm-include", "include", "rocm/include"),
    ("rocfft-include", "rocfft/include", "rocm/include/rocfft"),
    ("rocblas-include", "rocblas/include", "rocm/include/rocblas"),
    ("miopen-include", "miopen/include", "rocm/include/miopen"),
];

/// Which configuration gets generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "repository", rename_all = "lowercase")]
pub enum ConfigureMode {
    Disabled,
    Remote(String),
    Local,
}

impl ConfigureMode {
    pub fn select(host: &HostConfig) -> Self {
        if !host.feature_enabled {
            return ConfigureMode::Disabled;
        }
        match &host.remote_config_repo {
            Some(repo) => ConfigureMode::Remote(repo.clone()),
            None => ConfigureMode::Local,
        }
    }
}

impl fmt::Display for ConfigureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigureMode::Disabled => f.write_str("disabled"),
            ConfigureMode::Remote(repo) => write!(f, "remote ({})", repo),
            ConfigureMode::Local => f.write_str("local"),
        }
    }
}

/// Outcome of a successful configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigureReport {
    pub mode: ConfigureMode,
    /// Every file written, in write order
    pub files: Vec<PathBuf>,
}

/// Generate the configuration under `out_dir`.
///
/// `rocm/` and `crosstool/` are removed first so no file from an earlier
/// run survives.
pub fn configure(host: &HostConfig, out_dir: &Path) -> Result<ConfigureReport> {
    let mode = ConfigureMode::select(host);
    tracing::info!("configuring ROCm ({}) in {}", mode, out_dir.display());

    ensure_dir(out_dir)?;
    for dir in [ROCM_DIR, CROSSTOOL_DIR] {
        remove_dir_all_if_exists(&out_dir.join(dir))
            .with_context(|| format!("failed to clear previous output in {}", out_dir.display()))?;
    }

    let jobs = match &mode {
        ConfigureMode::Disabled => dummy_jobs(host, out_dir)?,
        ConfigureMode::Remote(repo) => remote_jobs(host, repo, out_dir)?,
        ConfigureMode::Local => local_jobs(host, out_dir)?,
    };

    let files = write_jobs(&jobs)?;
    tracing::info!("wrote {} files", files.len());

    Ok(ConfigureReport { mode, files })
}

/// Render every job before writing any, so a template error leaves the
/// output tree empty.
fn write_jobs(jobs: &[TemplateJob]) -> Result<Vec<PathBuf>, ConfigureError> {
    for job in jobs {
        job.render()?;
    }
    jobs.iter().map(TemplateJob::write).collect()
}

fn dummy_jobs(host: &HostConfig, out_dir: &Path) -> Result<Vec<TemplateJob>, ConfigureError> {
    tracing::debug!("ROCm disabled, writing stub configuration");

    let rocm = out_dir.join(ROCM_DIR);
    let crosstool = out_dir.join(CROSSTOOL_DIR);

    let lib_name = |lib: RocmLibrary| library_file_name(lib.logical_name(), &host.os, None, false);
    let lib_names = RocmLibrary::ALL
        .iter()
        .map(|lib| lib_name(*lib).map(|name| (*lib, name)))
        .collect::<Result<HashMap<_, _>, _>>()?;
    let name_of = |lib: RocmLibrary| lib_names.get(&lib).cloned().unwrap_or_default();

    let targets: Vec<AmdgpuTarget> = parse_targets(DEFAULT_AMDGPU_TARGETS)?;

    let mut jobs = vec![
        TemplateJob::new(
            &BuildDefs {
                rocm_is_configured: false,
                rocm_extra_copts: "[]".to_string(),
            },
            rocm.join("build_defs.bzl"),
        ),
        TemplateJob::new(
            &RocmBuild {
                hip_lib: name_of(RocmLibrary::Hip),
                rocblas_lib: name_of(RocmLibrary::Rocblas),
                rocfft_lib: name_of(RocmLibrary::Rocfft),
                hiprand_lib: name_of(RocmLibrary::Hiprand),
                miopen_lib: name_of(RocmLibrary::Miopen),
                rocm_include_genrules: Vec::new(),
                rocm_headers: Vec::new(),
            },
            rocm.join("BUILD"),
        ),
        TemplateJob::new(
            &RocmConfigHeader {
                rocm_toolkit_path: DEFAULT_TOOLKIT_ROOT.to_string(),
                rocm_amdgpu_targets: quoted_list(&targets),
                rocm_version: String::new(),
            },
            rocm.join("rocm").join("rocm_config.h"),
        ),
    ];

    let stub_include = rocm.join("rocm").join("include");
    jobs.extend(
        STUB_HEADERS
            .iter()
            .map(|header| TemplateJob::new(&StubFile, stub_include.join(header))),
    );

    let stub_lib = rocm.join("rocm").join("lib");
    jobs.extend(
        RocmLibrary::ALL
            .iter()
            .map(|lib| TemplateJob::new(&StubFile, stub_lib.join(name_of(*lib)))),
    );

    jobs.push(TemplateJob::new(
        &ErrorGpuDisabled,
        crosstool.join("error_gpu_disabled.bzl"),
    ));
    jobs.push(TemplateJob::new(&DummyCrosstoolBuild, crosstool.join("BUILD")));

    Ok(jobs)
}

fn remote_jobs(
    host: &HostConfig,
    repo: &str,
    out_dir: &Path,
) -> Result<Vec<TemplateJob>, ConfigureError> {
    tracing::debug!("using remote configuration {}", repo);

    let targets = parse_targets(&host.amdgpu_targets)?;

    Ok(vec![
        TemplateJob::new(
            &BuildDefs {
                rocm_is_configured: true,
                rocm_extra_copts: extra_copts(&targets),
            },
            out_dir.join(ROCM_DIR).join("build_defs.bzl"),
        ),
        TemplateJob::new(
            &RocmRemoteBuild {
                remote_rocm_repo: repo.to_string(),
            },
            out_dir.join(ROCM_DIR).join("BUILD"),
        ),
        TemplateJob::new(
            &CrosstoolRemoteBuild {
                remote_rocm_repo: repo.to_string(),
            },
            out_dir.join(CROSSTOOL_DIR).join("BUILD"),
        ),
    ])
}

fn local_jobs(host: &HostConfig, out_dir: &Path) -> Result<Vec<TemplateJob>, ConfigureError> {
    let root = find_toolkit_root(host)?;
    let targets = parse_targets(&host.amdgpu_targets)?;
    let libs: HashMap<RocmLibrary, LibraryLocation> =
        find_rocm_libraries(host)?.into_iter().collect();
    let compiler = find_compiler(host)?;

    let include_dirs = union_include_dirs(default_include_dirs(&compiler)?, toolkit_include_dirs(&root));
    tracing::debug!("{} builtin include directories", include_dirs.len());

    let mut genrules = Vec::new();
    let mut headers = Vec::new();
    for (name, src, dest) in INCLUDE_GENRULES {
        genrules.push(symlink_genrule_for_dir(name, &root.join(src), dest)?);
        headers.push(format!(":{}", name));
    }

    let (lib_srcs, lib_names): (Vec<String>, Vec<String>) = RocmLibrary::ALL
        .iter()
        .filter_map(|lib| libs.get(lib))
        .map(|loc| (norm_path(&loc.resolved_path), loc.file_name.clone()))
        .unzip();
    genrules.push(emit_symlink_genrule("rocm-lib", &lib_srcs, "rocm/lib", &lib_names)?);

    let name_of = |lib: RocmLibrary| {
        libs.get(&lib)
            .map(|loc| loc.file_name.clone())
            .unwrap_or_default()
    };

    let version = toolkit_version(&root)
        .map(|v| v.to_string())
        .unwrap_or_default();
    let compiler_path = norm_path(&compiler);
    let compiler_prefix = compiler
        .parent()
        .map(norm_path)
        .unwrap_or_else(|| "/usr/bin".to_string());

    let rocm = out_dir.join(ROCM_DIR);
    let crosstool = out_dir.join(CROSSTOOL_DIR);

    Ok(vec![
        TemplateJob::new(
            &BuildDefs {
                rocm_is_configured: true,
                rocm_extra_copts: extra_copts(&targets),
            },
            rocm.join("build_defs.bzl"),
        ),
        TemplateJob::new(
            &RocmBuild {
                hip_lib: name_of(RocmLibrary::Hip),
                rocblas_lib: name_of(RocmLibrary::Rocblas),
                rocfft_lib: name_of(RocmLibrary::Rocfft),
                hiprand_lib: name_of(RocmLibrary::Hiprand),
                miopen_lib: name_of(RocmLibrary::Miopen),
                rocm_include_genrules: genrules,
                rocm_headers: headers,
            },
            rocm.join("BUILD"),
        ),
        TemplateJob::new(
            &RocmConfigHeader {
                rocm_toolkit_path: norm_path(&root),
                rocm_amdgpu_targets: quoted_list(&targets),
                rocm_version: version,
            },
            rocm.join("rocm").join("rocm_config.h"),
        ),
        TemplateJob::new(&CrosstoolBuild, crosstool.join("BUILD")),
        TemplateJob::new(
            &Crosstool {
                host_compiler_path: compiler_path.clone(),
                host_compiler_prefix: compiler_prefix,
                cxx_builtin_include_directories: include_dirs.iter().map(|d| norm_path(d)).collect(),
                unfiltered_compile_flags: UNFILTERED_COMPILE_FLAGS
                    .iter()
                    .map(|f| f.to_string())
                    .collect(),
            },
            crosstool.join("CROSSTOOL"),
        ),
        TemplateJob::new(
            &CrosstoolWrapper {
                cpu_compiler: compiler_path.clone(),
                gcc_host_compiler_path: compiler_path,
                hipcc_path: norm_path(&root.join("bin").join("hipcc")),
                hipcc_env: host.hipcc_env.clone(),
                rocm_amdgpu_targets: quoted_list(&targets),
                crosstool_verbose: host.crosstool_verbose,
            },
            crosstool
                .join("clang")
                .join("bin")
                .join("crosstool_wrapper_driver_rocm"),
        ),
    ])
}
