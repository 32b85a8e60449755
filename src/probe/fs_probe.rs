//! Filesystem probing of the ROCm toolkit.

use std::path::{Path, PathBuf};

use semver::Version;

use crate::core::errors::ConfigureError;
use crate::core::host::{env_vars, HostConfig, HostOs};
use crate::core::library::{LibraryLocation, LibrarySpec, RocmLibrary};
use crate::util::fs::glob_dirs;

/// Header directories of the toolkit, relative to its root.
const TOOLKIT_INCLUDE_DIRS: &[&str] = &[
    "include",
    "hcc/include",
    "hip/include",
    "rocrand/include",
    "hiprand/include",
    "rocfft/include",
    "rocblas/include",
    "miopen/include",
];

/// Clang builtin header locations, one per installed clang version.
const CLANG_BUILTIN_INCLUDE_GLOBS: &[&str] = &["llvm/lib/clang/*/include", "hcc/lib/clang/*/include"];

/// Check that the configured toolkit root exists.
pub fn find_toolkit_root(host: &HostConfig) -> Result<PathBuf, ConfigureError> {
    let root = &host.toolkit_root;
    if !root.is_dir() {
        return Err(ConfigureError::ToolkitRootMissing {
            path: root.clone(),
            env_var: env_vars::ROCM_TOOLKIT_PATH.to_string(),
        });
    }
    tracing::debug!("ROCm toolkit root: {}", root.display());
    Ok(root.clone())
}

/// Paths tried for `file_name` under `base_dir`, in order.
pub fn library_candidates(file_name: &str, os: &HostOs, base_dir: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    match os {
        HostOs::Linux => {
            candidates.push(base_dir.join("lib64").join(file_name));
            candidates.push(base_dir.join("lib64").join("stubs").join(file_name));
            candidates.push(base_dir.join("lib").join("x86_64-linux-gnu").join(file_name));
        }
        HostOs::Windows => {
            candidates.push(base_dir.join("lib").join("x64").join(file_name));
        }
        _ => {}
    }

    candidates.push(base_dir.join("lib").join(file_name));
    candidates.push(base_dir.join(file_name));
    candidates
}

/// Locate a library under `base_dir`. The first existing candidate wins and
/// is recorded with symlinks resolved.
pub fn find_library(
    spec: &LibrarySpec,
    os: &HostOs,
    base_dir: &Path,
) -> Result<LibraryLocation, ConfigureError> {
    let file_name = spec.file_name(os)?;
    let candidates = library_candidates(&file_name, os, base_dir);

    for candidate in &candidates {
        if candidate.exists() {
            let resolved_path = candidate.canonicalize().map_err(|e| {
                ConfigureError::io(format!("failed to resolve {}", candidate.display()), e)
            })?;
            tracing::debug!("found {} at {}", file_name, resolved_path.display());
            return Ok(LibraryLocation {
                file_name,
                resolved_path,
            });
        }
    }

    Err(ConfigureError::LibraryNotFound {
        file_name,
        candidates,
    })
}

/// Locate every library in [`RocmLibrary::ALL`] under the toolkit root.
pub fn find_rocm_libraries(
    host: &HostConfig,
) -> Result<Vec<(RocmLibrary, LibraryLocation)>, ConfigureError> {
    RocmLibrary::ALL
        .iter()
        .map(|lib| {
            let base = host.toolkit_root.join(lib.subdir());
            find_library(&lib.spec(), &host.os, &base).map(|loc| (*lib, loc))
        })
        .collect()
}

/// Include directories the toolkit contributes to every compile.
pub fn toolkit_include_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = TOOLKIT_INCLUDE_DIRS.iter().map(|d| root.join(d)).collect();
    for pattern in CLANG_BUILTIN_INCLUDE_GLOBS {
        dirs.extend(glob_dirs(&root.join(pattern)));
    }
    dirs
}

/// Toolkit version from `.info/version`, if present and parsable.
pub fn toolkit_version(root: &Path) -> Option<Version> {
    let path = root.join(".info").join("version");
    let contents = std::fs::read_to_string(&path).ok()?;
    let line = contents.lines().next()?.trim();

    match Version::parse(line) {
        Ok(version) => Some(version),
        Err(e) => {
            tracing::debug!("unparsable version in {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::EnvSnapshot;
    use crate::test_support::ToolkitFixture;
    use crate::util::config::Config;

    #[test]
    fn test_linux_candidate_order() {
        let candidates = library_candidates("librocblas.so", &HostOs::Linux, Path::new("/r"));
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/r/lib64/librocblas.so"),
                PathBuf::from("/r/lib64/stubs/librocblas.so"),
                PathBuf::from("/r/lib/x86_64-linux-gnu/librocblas.so"),
                PathBuf::from("/r/lib/librocblas.so"),
                PathBuf::from("/r/librocblas.so"),
            ]
        );
    }

    #[test]
    fn test_windows_and_darwin_candidates() {
        let win = library_candidates("rocblas.lib", &HostOs::Windows, Path::new("/r"));
        assert_eq!(win[0], PathBuf::from("/r/lib/x64/rocblas.lib"));
        assert_eq!(win.len(), 3);

        let mac = library_candidates("librocblas.dylib", &HostOs::Darwin, Path::new("/r"));
        assert_eq!(
            mac,
            vec![
                PathBuf::from("/r/lib/librocblas.dylib"),
                PathBuf::from("/r/librocblas.dylib"),
            ]
        );
    }

    #[test]
    fn test_finds_library_in_stubs_only() {
        let fixture = ToolkitFixture::new();
        fixture.add_file("lib64/stubs/libhip_hcc.so");

        let loc = find_library(&LibrarySpec::shared("hip_hcc"), &HostOs::Linux, fixture.root())
            .unwrap();

        assert_eq!(loc.file_name, "libhip_hcc.so");
        assert_eq!(
            loc.resolved_path,
            fixture.root().join("lib64/stubs/libhip_hcc.so").canonicalize().unwrap()
        );
    }

    #[test]
    fn test_earlier_candidate_wins() {
        let fixture = ToolkitFixture::new();
        fixture.add_file("lib/libhip_hcc.so");
        fixture.add_file("lib64/libhip_hcc.so");

        let loc = find_library(&LibrarySpec::shared("hip_hcc"), &HostOs::Linux, fixture.root())
            .unwrap();
        assert!(loc.resolved_path.ends_with("lib64/libhip_hcc.so"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_library_is_resolved() {
        let fixture = ToolkitFixture::new();
        fixture.add_file("lib/libhip_hcc.so.5.7.0");
        std::os::unix::fs::symlink(
            fixture.root().join("lib/libhip_hcc.so.5.7.0"),
            fixture.root().join("lib/libhip_hcc.so"),
        )
        .unwrap();

        let loc = find_library(&LibrarySpec::shared("hip_hcc"), &HostOs::Linux, fixture.root())
            .unwrap();
        assert!(loc.resolved_path.ends_with("lib/libhip_hcc.so.5.7.0"));
        assert_eq!(loc.file_name, "libhip_hcc.so");
    }

    #[test]
    fn test_missing_library_names_file() {
        let fixture = ToolkitFixture::new();
        let err = find_library(&LibrarySpec::shared("rocfft"), &HostOs::Linux, fixture.root())
            .unwrap_err();

        match err {
            ConfigureError::LibraryNotFound {
                file_name,
                candidates,
            } => {
                assert_eq!(file_name, "librocfft.so");
                assert_eq!(candidates.len(), 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_find_rocm_libraries_uses_subdirs() {
        let fixture = ToolkitFixture::with_all_libraries();
        let host = fixture.host(&[]);

        let libs = find_rocm_libraries(&host).unwrap();
        assert_eq!(libs.len(), 5);
        let (lib, loc) = &libs[4];
        assert_eq!(*lib, RocmLibrary::Miopen);
        assert!(loc.resolved_path.ends_with("miopen/lib/libMIOpen.so"));
    }

    #[test]
    fn test_missing_toolkit_root() {
        let host = HostConfig::with_os(
            &EnvSnapshot::from_pairs([("ROCM_TOOLKIT_PATH", "/no/such/rocm")]),
            &Config::default(),
            HostOs::Linux,
        );
        let err = find_toolkit_root(&host).unwrap_err();
        assert!(matches!(err, ConfigureError::ToolkitRootMissing { .. }));
    }

    #[test]
    fn test_toolkit_include_dirs_include_clang_builtins() {
        let fixture = ToolkitFixture::new();
        fixture.add_dir("llvm/lib/clang/17.0.0/include");
        fixture.add_dir("llvm/lib/clang/16.0.0/include");

        let dirs = toolkit_include_dirs(fixture.root());
        assert_eq!(dirs[0], fixture.root().join("include"));
        assert_eq!(dirs.len(), TOOLKIT_INCLUDE_DIRS.len() + 2);
        assert!(dirs[dirs.len() - 2].ends_with("clang/16.0.0/include"));
        assert!(dirs[dirs.len() - 1].ends_with("clang/17.0.0/include"));
    }

    #[test]
    fn test_toolkit_version() {
        let fixture = ToolkitFixture::new();
        assert_eq!(toolkit_version(fixture.root()), None);

        fixture.write(".info/version", "6.0.2-115\n");
        let version = toolkit_version(fixture.root()).unwrap();
        assert_eq!((version.major, version.minor, version.patch), (6, 0, 2));

        fixture.write(".info/version", "not a version\n");
        assert_eq!(toolkit_version(fixture.root()), None);
    }
}
