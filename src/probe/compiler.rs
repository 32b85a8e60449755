//! Host compiler lookup and default include directory discovery.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::core::errors::ConfigureError;
use crate::core::host::{env_vars, HostConfig};
use crate::util::process::{find_executable, ProcessBuilder};

/// Compiler looked up on PATH when no override is set.
pub const DEFAULT_HOST_COMPILER: &str = "gcc";

/// Line that introduces the system include search list.
const INC_DIR_MARKER_BEGIN: &str = "#include <...>";

/// Suffix clang appends to framework directories on macOS.
const OSX_FRAMEWORK_SUFFIX: &str = " (framework directory)";

/// Source language of an introspection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    C,
    Cxx,
}

impl Lang {
    fn flag(&self) -> &'static str {
        match self {
            Lang::C => "-xc",
            Lang::Cxx => "-xc++",
        }
    }
}

/// Find the host C/C++ compiler.
///
/// A bare override name is looked up on PATH; an override containing a
/// path separator must be an executable file as given.
pub fn find_compiler(host: &HostConfig) -> Result<PathBuf, ConfigureError> {
    let not_found = |name: &str| ConfigureError::CompilerNotFound {
        name: name.to_string(),
        env_var: env_vars::GCC_HOST_COMPILER_PATH.to_string(),
    };

    let compiler = match &host.compiler_override {
        Some(path) if path.components().count() > 1 || path.is_absolute() => {
            if is_executable_file(path) {
                path.clone()
            } else {
                return Err(not_found(&path.display().to_string()));
            }
        }
        Some(name) => find_executable(name).ok_or_else(|| not_found(&name.display().to_string()))?,
        None => find_executable(DEFAULT_HOST_COMPILER).ok_or_else(|| not_found(DEFAULT_HOST_COMPILER))?,
    };

    tracing::debug!("host compiler: {}", compiler.display());
    Ok(compiler)
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

/// Default include directories of `compiler`, C++ pass first, then any C
/// pass directories not already listed.
pub fn default_include_dirs(compiler: &Path) -> Result<Vec<PathBuf>, ConfigureError> {
    let cxx = include_dirs_for_lang(compiler, Lang::Cxx)?;
    let c = include_dirs_for_lang(compiler, Lang::C)?;
    Ok(union_include_dirs(cxx, c))
}

/// Run one preprocessing pass over empty input and scrape its stderr.
pub fn include_dirs_for_lang(compiler: &Path, lang: Lang) -> Result<Vec<PathBuf>, ConfigureError> {
    let output = ProcessBuilder::new(compiler)
        .args(["-E", lang.flag(), "-", "-v", "-no-canonical-prefixes"])
        .exec_and_check(&format!(
            "failed to query default include directories of {}",
            compiler.display()
        ))?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    let dirs = parse_include_dirs(&stderr);
    if dirs.is_empty() {
        tracing::debug!(
            "no `{}` list in {:?} output of {}",
            INC_DIR_MARKER_BEGIN,
            lang,
            compiler.display()
        );
    }
    Ok(dirs)
}

/// Extract the system include list from compiler diagnostic output.
///
/// The list starts on the line after the `#include <...>` marker and ends
/// with the last line that begins with a space. Output without the marker
/// yields an empty list.
pub fn parse_include_dirs(stderr: &str) -> Vec<PathBuf> {
    let Some(marker) = stderr.find(INC_DIR_MARKER_BEGIN) else {
        return Vec::new();
    };
    let Some(start) = stderr[marker..].find('\n').map(|i| marker + i + 1) else {
        return Vec::new();
    };

    let block = match stderr.rfind("\n ") {
        Some(last) if last + 1 >= start => match stderr[last + 1..].find('\n') {
            Some(end) => &stderr[start..last + 1 + end],
            None => &stderr[start..],
        },
        _ => return Vec::new(),
    };

    block
        .lines()
        .map(convert_include_line)
        .filter(|line| !line.is_empty())
        .map(|line| make_absolute(Path::new(line)))
        .collect()
}

fn convert_include_line(line: &str) -> &str {
    let line = line.trim();
    line.strip_suffix(OSX_FRAMEWORK_SUFFIX).unwrap_or(line).trim()
}

fn make_absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Union of two include lists: all of `cxx`, then unseen entries of `c`.
pub fn union_include_dirs(cxx: Vec<PathBuf>, c: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    cxx.into_iter()
        .chain(c)
        .filter(|dir| seen.insert(dir.clone()))
        .collect()
}
