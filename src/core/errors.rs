//! Fatal configuration errors and their diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// A condition that aborts the whole configuration step.
///
/// None of these are recoverable: the probe never falls back to the
/// dummy configuration after a detection failure.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ConfigureError {
    #[error("cannot find {name}, either correct your path or set the {env_var} environment variable")]
    #[diagnostic(code(rocm_configure::compiler_not_found))]
    CompilerNotFound { name: String, env_var: String },

    #[error("cannot find rocm toolkit path: {}", .path.display())]
    #[diagnostic(code(rocm_configure::toolkit_root_missing))]
    ToolkitRootMissing { path: PathBuf, env_var: String },

    #[error("cannot find rocm library {file_name}")]
    #[diagnostic(code(rocm_configure::library_not_found))]
    LibraryNotFound {
        file_name: String,
        candidates: Vec<PathBuf>,
    },

    #[error("invalid cpu_value: {os}")]
    #[diagnostic(code(rocm_configure::invalid_os))]
    InvalidOs { os: String },

    #[error("invalid AMDGPU target: {target}")]
    #[diagnostic(
        code(rocm_configure::invalid_amdgpu_target),
        help("AMDGPU targets look like `gfx900`")
    )]
    InvalidAmdgpuTarget { target: String },

    #[error("{message}")]
    #[diagnostic(code(rocm_configure::command_failed))]
    CommandFailed {
        message: String,
        command: String,
        stderr: String,
    },

    #[error("template `{template}` has unresolved placeholder `%{{{placeholder}}}`")]
    #[diagnostic(code(rocm_configure::unresolved_placeholder))]
    UnresolvedPlaceholder { template: String, placeholder: String },

    #[error("genrule `{genrule}` pairs {sources} sources with {destinations} destinations")]
    #[diagnostic(code(rocm_configure::genrule_mismatch))]
    GenruleMismatch {
        genrule: String,
        sources: usize,
        destinations: usize,
    },

    #[error("{context}: {source}")]
    #[diagnostic(code(rocm_configure::io))]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigureError {
    /// Wrap an I/O error with a short description of what was attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ConfigureError::Io {
            context: context.into(),
            source,
        }
    }

    /// Convert to a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());

        match self {
            ConfigureError::CompilerNotFound { env_var, .. } => diag
                .with_suggestion(format!("Set {} to the host C/C++ compiler", env_var))
                .with_suggestion("Install gcc and make sure it is on PATH"),

            ConfigureError::ToolkitRootMissing { path, env_var } => diag
                .with_location(path.clone())
                .with_suggestion(format!("Set {} to the ROCm installation root", env_var))
                .with_suggestion("Set TF_NEED_ROCM=0 to configure without GPU support"),

            ConfigureError::LibraryNotFound { candidates, .. } => {
                let mut diag = diag;
                for candidate in candidates {
                    diag = diag.with_context(format!("looked for {}", candidate.display()));
                }
                diag.with_suggestion("Check that the ROCm installation is complete")
            }

            ConfigureError::InvalidOs { .. } => diag
                .with_context("supported hosts are Linux, FreeBSD, Darwin and Windows"),

            ConfigureError::InvalidAmdgpuTarget { .. } => diag.with_suggestion(
                "Set TF_ROCM_AMDGPU_TARGETS to a comma-separated list such as gfx803,gfx900",
            ),

            ConfigureError::CommandFailed {
                command, stderr, ..
            } => {
                let mut diag = diag.with_context(format!("command: {}", command));
                if !stderr.trim().is_empty() {
                    diag = diag.with_context(stderr.trim().to_string());
                }
                diag
            }

            ConfigureError::UnresolvedPlaceholder { .. }
            | ConfigureError::GenruleMismatch { .. }
            | ConfigureError::Io { .. } => diag,
        }
    }
}
