//! Filesystem utilities.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use glob::glob;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::core::errors::ConfigureError;

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<(), ConfigureError> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| {
            ConfigureError::io(format!("failed to remove directory {}", path.display()), e)
        })?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<(), ConfigureError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            ConfigureError::io(format!("failed to create directory {}", path.display()), e)
        })?;
    }
    Ok(())
}

/// Write `contents` to `path` so that readers see either the old file or
/// the complete new one.
///
/// The data goes to a temporary file in the same directory, which is then
/// renamed over the destination.
pub fn write_atomic(path: &Path, contents: &[u8], executable: bool) -> Result<(), ConfigureError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    ensure_dir(&parent)?;

    let mut tmp = NamedTempFile::new_in(&parent).map_err(|e| {
        ConfigureError::io(format!("failed to create temp file in {}", parent.display()), e)
    })?;
    tmp.write_all(contents)
        .and_then(|_| tmp.flush())
        .map_err(|e| ConfigureError::io(format!("failed to write {}", path.display()), e))?;

    if executable {
        set_executable(tmp.path())?;
    }

    tmp.persist(path)
        .map_err(|e| ConfigureError::io(format!("failed to write {}", path.display()), e.error))?;
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<(), ConfigureError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|e| {
        ConfigureError::io(format!("failed to chmod {}", path.display()), e)
    })
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<(), ConfigureError> {
    Ok(())
}

/// List every regular file below `dir`, following symbolic links.
///
/// The result is sorted so that generated rules are stable between runs.
pub fn list_files_recursive(dir: &Path) -> Result<Vec<PathBuf>, ConfigureError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| {
            let msg = format!("failed to list {}", dir.display());
            match e.into_io_error() {
                Some(io) => ConfigureError::io(msg, io),
                None => ConfigureError::io(msg, std::io::Error::other("symlink loop")),
            }
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Directories matching a glob pattern, sorted. Invalid patterns and
/// unreadable entries yield nothing.
pub fn glob_dirs(pattern: &Path) -> Vec<PathBuf> {
    let pattern = pattern.to_string_lossy();
    let Ok(paths) = glob(&pattern) else {
        tracing::debug!("invalid glob pattern: {}", pattern);
        return Vec::new();
    };

    let mut dirs: Vec<PathBuf> = paths
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

/// Normalise a path for use inside generated build files: forward slashes,
/// no trailing slash.
pub fn norm_path(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    let trimmed = s.trim_end_matches('/');
    if trimmed.is_empty() && s.starts_with('/') {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}
