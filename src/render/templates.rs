//! The generated files, one type per template.
//!
//! Each type lists exactly the values its template needs. A placeholder
//! without a matching field fails at render time.

use crate::render::template::TemplateKind;

/// `rocm/build_defs.bzl`
#[derive(Debug, Clone)]
pub struct BuildDefs {
    pub rocm_is_configured: bool,
    /// Starlark list literal of extra compiler options
    pub rocm_extra_copts: String,
}

impl TemplateKind for BuildDefs {
    const ID: &'static str = "rocm:build_defs.bzl";
    const SOURCE: &'static str = include_str!("../../templates/rocm/build_defs.bzl.tpl");

    fn substitutions(&self) -> Vec<(&'static str, String)> {
        let configured = if self.rocm_is_configured { "True" } else { "False" };
        vec![
            ("rocm_is_configured", configured.to_string()),
            ("rocm_extra_copts", self.rocm_extra_copts.clone()),
        ]
    }
}

/// `rocm/BUILD` for a local or dummy configuration.
#[derive(Debug, Clone)]
pub struct RocmBuild {
    pub hip_lib: String,
    pub rocblas_lib: String,
    pub rocfft_lib: String,
    pub hiprand_lib: String,
    pub miopen_lib: String,
    /// Genrule blocks, already rendered
    pub rocm_include_genrules: Vec<String>,
    /// Labels of the header genrules
    pub rocm_headers: Vec<String>,
}

impl TemplateKind for RocmBuild {
    const ID: &'static str = "rocm:BUILD";
    const SOURCE: &'static str = include_str!("../../templates/rocm/BUILD.tpl");

    fn substitutions(&self) -> Vec<(&'static str, String)> {
        let headers: Vec<String> = self
            .rocm_headers
            .iter()
            .map(|label| format!("\"{}\",", label))
            .collect();

        vec![
            ("hip_lib", self.hip_lib.clone()),
            ("rocblas_lib", self.rocblas_lib.clone()),
            ("rocfft_lib", self.rocfft_lib.clone()),
            ("hiprand_lib", self.hiprand_lib.clone()),
            ("miopen_lib", self.miopen_lib.clone()),
            ("rocm_include_genrules", self.rocm_include_genrules.join("\n\n")),
            ("rocm_headers", headers.join("\n        ")),
        ]
    }
}

/// `rocm/BUILD` aliasing a pre-generated repository.
#[derive(Debug, Clone)]
pub struct RocmRemoteBuild {
    pub remote_rocm_repo: String,
}

impl TemplateKind for RocmRemoteBuild {
    const ID: &'static str = "rocm:remote.BUILD";
    const SOURCE: &'static str = include_str!("../../templates/rocm/remote.BUILD.tpl");

    fn substitutions(&self) -> Vec<(&'static str, String)> {
        vec![("remote_rocm_repo", self.remote_rocm_repo.clone())]
    }
}

/// `rocm/rocm/rocm_config.h`
#[derive(Debug, Clone)]
pub struct RocmConfigHeader {
    pub rocm_toolkit_path: String,
    /// Comma-separated quoted target names
    pub rocm_amdgpu_targets: String,
    /// Empty when the toolkit version is unknown
    pub rocm_version: String,
}

impl TemplateKind for RocmConfigHeader {
    const ID: &'static str = "rocm:rocm_config.h";
    const SOURCE: &'static str = include_str!("../../templates/rocm/rocm_config.h.tpl");

    fn substitutions(&self) -> Vec<(&'static str, String)> {
        vec![
            ("rocm_toolkit_path", self.rocm_toolkit_path.clone()),
            ("rocm_amdgpu_targets", self.rocm_amdgpu_targets.clone()),
            ("rocm_version", self.rocm_version.clone()),
        ]
    }
}

/// `crosstool/BUILD` for a local configuration.
#[derive(Debug, Clone, Default)]
pub struct CrosstoolBuild;

impl TemplateKind for CrosstoolBuild {
    const ID: &'static str = "crosstool:BUILD";
    const SOURCE: &'static str = include_str!("../../templates/crosstool/BUILD.tpl");

    fn substitutions(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// `crosstool/BUILD` aliasing a pre-generated repository.
#[derive(Debug, Clone)]
pub struct CrosstoolRemoteBuild {
    pub remote_rocm_repo: String,
}

impl TemplateKind for CrosstoolRemoteBuild {
    const ID: &'static str = "crosstool:remote.BUILD";
    const SOURCE: &'static str = include_str!("../../templates/crosstool/remote.BUILD.tpl");

    fn substitutions(&self) -> Vec<(&'static str, String)> {
        vec![("remote_rocm_repo", self.remote_rocm_repo.clone())]
    }
}

/// `crosstool/CROSSTOOL`
#[derive(Debug, Clone)]
pub struct Crosstool {
    pub host_compiler_path: String,
    /// Directory of the host compiler, passed to the linker with `-B`
    pub host_compiler_prefix: String,
    pub cxx_builtin_include_directories: Vec<String>,
    pub unfiltered_compile_flags: Vec<String>,
}

impl TemplateKind for Crosstool {
    const ID: &'static str = "crosstool:CROSSTOOL";
    const SOURCE: &'static str = include_str!("../../templates/crosstool/CROSSTOOL.tpl");

    fn substitutions(&self) -> Vec<(&'static str, String)> {
        vec![
            ("host_compiler_path", self.host_compiler_path.clone()),
            ("host_compiler_prefix", self.host_compiler_prefix.clone()),
            (
                "cxx_builtin_include_directories",
                proto_fields("cxx_builtin_include_directory", &self.cxx_builtin_include_directories),
            ),
            (
                "unfiltered_compile_flags",
                proto_fields("unfiltered_cxx_flag", &self.unfiltered_compile_flags),
            ),
        ]
    }
}

/// `crosstool/clang/bin/crosstool_wrapper_driver_rocm`
#[derive(Debug, Clone)]
pub struct CrosstoolWrapper {
    pub cpu_compiler: String,
    pub gcc_host_compiler_path: String,
    pub hipcc_path: String,
    /// Variables set for hipcc, in order
    pub hipcc_env: Vec<(String, String)>,
    /// Comma-separated quoted target names
    pub rocm_amdgpu_targets: String,
    pub crosstool_verbose: bool,
}

impl TemplateKind for CrosstoolWrapper {
    const ID: &'static str = "crosstool:crosstool_wrapper_driver_rocm";
    const SOURCE: &'static str =
        include_str!("../../templates/crosstool/clang/bin/crosstool_wrapper_driver_rocm.tpl");
    const EXECUTABLE: bool = true;

    fn substitutions(&self) -> Vec<(&'static str, String)> {
        let hipcc_env: String = self
            .hipcc_env
            .iter()
            .map(|(name, value)| format!("{}=\"{}\";", name, value))
            .collect();

        vec![
            ("cpu_compiler", py_escape(&self.cpu_compiler)),
            ("gcc_host_compiler_path", py_escape(&self.gcc_host_compiler_path)),
            ("hipcc_path", py_escape(&self.hipcc_path)),
            ("hipcc_env", py_escape(&hipcc_env)),
            ("rocm_amdgpu_targets", self.rocm_amdgpu_targets.clone()),
            (
                "crosstool_verbose",
                if self.crosstool_verbose { "1" } else { "0" }.to_string(),
            ),
        ]
    }
}

/// `crosstool/error_gpu_disabled.bzl`
#[derive(Debug, Clone, Default)]
pub struct ErrorGpuDisabled;

impl TemplateKind for ErrorGpuDisabled {
    const ID: &'static str = "crosstool:error_gpu_disabled.bzl";
    const SOURCE: &'static str = include_str!("../../templates/crosstool/error_gpu_disabled.bzl");

    fn substitutions(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// `crosstool/BUILD` when ROCm is disabled: any use fails with a message.
#[derive(Debug, Clone, Default)]
pub struct DummyCrosstoolBuild;

impl TemplateKind for DummyCrosstoolBuild {
    const ID: &'static str = "crosstool:dummy.BUILD";
    const SOURCE: &'static str = include_str!("../../templates/crosstool/dummy.BUILD");

    fn substitutions(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// An empty placeholder header or library.
#[derive(Debug, Clone, Default)]
pub struct StubFile;

impl TemplateKind for StubFile {
    const ID: &'static str = "stub";
    const SOURCE: &'static str = "";

    fn substitutions(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

fn proto_fields(field: &str, values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("  {}: \"{}\"", field, v.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape for a single-quoted Python string literal.
fn py_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
