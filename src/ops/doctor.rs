//! Host health checks.
//!
//! The `doctor` command runs the same probes as a local configuration,
//! but records each outcome instead of stopping at the first failure.
//!
//! ## Usage
//!
//! ```bash
//! rocm-configure doctor            # Quick check
//! rocm-configure --verbose doctor  # Paths, versions and timings
//! ```
//!
//! ## Checks Performed
//!
//! - Host C/C++ compiler and its default include directories
//! - AMDGPU target names
//! - Toolkit root, header directories, version file and hipcc
//! - Each library the local configuration links against
//!
//! A check is required exactly when `configure` would fail without it, so
//! the report and the configuration step agree. Target names are required
//! whenever ROCm is enabled; compiler and toolkit checks only for a local
//! configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::core::amdgpu::parse_targets;
use crate::core::host::HostConfig;
use crate::core::library::RocmLibrary;
use crate::ops::configure::{ConfigureMode, INCLUDE_GENRULES};
use crate::probe::compiler::{default_include_dirs, find_compiler};
use crate::probe::fs_probe::{find_library, find_toolkit_root, toolkit_version};
use crate::util::process::ProcessBuilder;

/// Result of a single health check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    /// Human-readable status message
    pub message: String,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
    pub duration: Duration,
    /// Whether a failure of this check fails the report
    pub required: bool,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: true,
            message: message.into(),
            path: None,
            version: None,
            duration: Duration::ZERO,
            required: true,
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            passed: false,
            ..CheckResult::pass(name, message)
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Make the check required only when `required` holds.
    pub fn required_if(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Summary of all health checks.
#[derive(Debug, Clone, Default)]
pub struct DoctorReport {
    pub checks: Vec<CheckResult>,
    pub total_duration: Duration,
    /// Host facts shown in verbose output
    pub environment: BTreeMap<String, String>,
}

impl DoctorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    pub fn required_failed_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.required && !c.passed)
            .count()
    }
}

/// Run every check against `host`.
pub fn doctor(host: &HostConfig) -> DoctorReport {
    let start = Instant::now();
    let mut report = DoctorReport::new();
    let mode = ConfigureMode::select(host);
    let rocm_required = host.feature_enabled;
    let local = mode == ConfigureMode::Local;

    report.environment.insert("os".to_string(), host.os.to_string());
    report
        .environment
        .insert("arch".to_string(), std::env::consts::ARCH.to_string());
    report
        .environment
        .insert("mode".to_string(), mode.to_string());
    report.environment.insert(
        "toolkit_root".to_string(),
        host.toolkit_root.display().to_string(),
    );

    let (compiler_check, compiler) = check_compiler(host);
    report.add(compiler_check.required_if(local));
    if let Some(compiler) = compiler {
        report.add(check_include_dirs(&compiler, local));
    }

    report.add(check_targets(host).required_if(rocm_required));

    let root_check = check_toolkit_root(host).required_if(local);
    let root_found = root_check.passed;
    report.add(root_check);

    if root_found {
        report.add(check_toolkit_headers(host).required_if(local));
        report.add(check_toolkit_version(host));
        report.add(check_hipcc(host));
        for lib in RocmLibrary::ALL {
            report.add(check_library(host, lib).required_if(local));
        }
    }

    report.total_duration = start.elapsed();
    report
}

fn check_compiler(host: &HostConfig) -> (CheckResult, Option<PathBuf>) {
    let start = Instant::now();

    match find_compiler(host) {
        Ok(path) => {
            let mut check = CheckResult::pass("Host compiler", format!("Found {}", path.display()))
                .with_path(path.clone());
            if let Some(version) = compiler_version(&path) {
                check = check.with_version(version);
            }
            (check.with_duration(start.elapsed()), Some(path))
        }
        Err(e) => (
            CheckResult::fail("Host compiler", e.to_string()).with_duration(start.elapsed()),
            None,
        ),
    }
}

/// First line of `<compiler> --version`.
fn compiler_version(compiler: &std::path::Path) -> Option<String> {
    let output = ProcessBuilder::new(compiler)
        .arg("--version")
        .exec_and_check("failed to query compiler version")
        .ok()?;
    let text = String::from_utf8_lossy(&output.stdout);
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// A compiler that runs but prints no search list is only a warning; the
/// configuration then lists the toolkit directories alone.
fn check_include_dirs(compiler: &std::path::Path, required: bool) -> CheckResult {
    let start = Instant::now();

    match default_include_dirs(compiler) {
        Ok(dirs) if dirs.is_empty() => CheckResult::fail(
            "Include directories",
            "compiler did not report a system include search list",
        )
        .optional(),
        Ok(dirs) => CheckResult::pass(
            "Include directories",
            format!("{} default include directories", dirs.len()),
        )
        .required_if(required),
        Err(e) => CheckResult::fail("Include directories", e.to_string()).required_if(required),
    }
    .with_duration(start.elapsed())
}

fn check_targets(host: &HostConfig) -> CheckResult {
    match parse_targets(&host.amdgpu_targets) {
        Ok(targets) => {
            let names: Vec<&str> = targets.iter().map(|t| t.as_str()).collect();
            CheckResult::pass("AMDGPU targets", names.join(","))
        }
        Err(e) => CheckResult::fail("AMDGPU targets", e.to_string()),
    }
}

fn check_toolkit_root(host: &HostConfig) -> CheckResult {
    match find_toolkit_root(host) {
        Ok(root) => CheckResult::pass("ROCm toolkit", "Toolkit root exists").with_path(root),
        Err(e) => CheckResult::fail("ROCm toolkit", e.to_string()),
    }
}

fn check_toolkit_headers(host: &HostConfig) -> CheckResult {
    let missing: Vec<&str> = INCLUDE_GENRULES
        .iter()
        .map(|(_, src, _)| *src)
        .filter(|src| !host.toolkit_root.join(src).is_dir())
        .collect();

    if missing.is_empty() {
        CheckResult::pass("ROCm headers", "All header directories present")
    } else {
        CheckResult::fail("ROCm headers", format!("missing {}", missing.join(", ")))
    }
}

fn check_toolkit_version(host: &HostConfig) -> CheckResult {
    match toolkit_version(&host.toolkit_root) {
        Some(version) => CheckResult::pass("ROCm version", "Read .info/version")
            .with_version(version.to_string()),
        None => CheckResult::fail("ROCm version", "No readable .info/version"),
    }
    .optional()
}

/// The wrapper only needs hipcc at build time, so its absence is a warning.
fn check_hipcc(host: &HostConfig) -> CheckResult {
    let hipcc = host.toolkit_root.join("bin").join("hipcc");
    if hipcc.is_file() {
        CheckResult::pass("hipcc", "hipcc is available").with_path(hipcc)
    } else {
        CheckResult::fail("hipcc", format!("{} not found", hipcc.display()))
    }
    .optional()
}

fn check_library(host: &HostConfig, lib: RocmLibrary) -> CheckResult {
    let start = Instant::now();
    let base = host.toolkit_root.join(lib.subdir());

    match find_library(&lib.spec(), &host.os, &base) {
        Ok(loc) => CheckResult::pass(lib.logical_name(), format!("Found {}", loc.file_name))
            .with_path(loc.resolved_path),
        Err(e) => CheckResult::fail(lib.logical_name(), e.to_string()),
    }
    .with_duration(start.elapsed())
}

/// Format the doctor report for display.
pub fn format_report(report: &DoctorReport, verbose: bool) -> String {
    let mut output = String::new();

    output.push_str("ROCm Configure Doctor\n");
    output.push_str("=====================\n\n");

    if verbose {
        output.push_str("Environment:\n");
        for (key, value) in &report.environment {
            output.push_str(&format!("  {}: {}\n", key, value));
        }
        output.push('\n');
    }

    output.push_str("Checks:\n");
    for check in &report.checks {
        let status = if check.passed { "[OK]" } else { "[!!]" };
        let required = if check.required { "" } else { " (optional)" };
        output.push_str(&format!("  {} {}{}\n", status, check.name, required));

        if verbose || !check.passed {
            output.push_str(&format!("      {}\n", check.message));
        }
        if verbose {
            if let Some(path) = &check.path {
                output.push_str(&format!("      Path: {}\n", path.display()));
            }
            if let Some(version) = &check.version {
                output.push_str(&format!("      Version: {}\n", version));
            }
            output.push_str(&format!("      Took: {:.1?}\n", check.duration));
        }
    }
    output.push('\n');

    let passed = report.passed_count();
    let failed = report.failed_count();
    let required_failed = report.required_failed_count();

    output.push_str(&format!("Summary: {} passed, {} failed\n", passed, failed));

    if required_failed > 0 {
        output.push_str(&format!(
            "\nError: {} required check(s) failed. Configuration will not succeed.\n",
            required_failed
        ));
    } else if failed > 0 {
        output.push_str(&format!(
            "\nAll required checks passed. {} optional check(s) failed.\n",
            failed
        ));
    } else {
        output.push_str("\nAll checks passed.\n");
    }

    output
}
