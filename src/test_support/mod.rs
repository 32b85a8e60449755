//! Test utilities for rocm-configure unit tests.
//!
//! Provides a fabricated toolkit tree on disk and, on unix, a fake host
//! compiler that replays canned diagnostic output.
//!
//! # Example
//!
//! ```rust,ignore
//! use rocm_configure::test_support::{FakeCompiler, ToolkitFixture};
//!
//! #[test]
//! fn test_example() {
//!     let fixture = ToolkitFixture::with_all_libraries();
//!     let cc = FakeCompiler::new(fixtures::GCC_CXX_STDERR, fixtures::GCC_C_STDERR);
//!     let host = fixture.host(&[("TF_NEED_ROCM", "1")]);
//!     // Run probes against `host` and `cc.path()`...
//! }
//! ```

pub mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::host::{EnvSnapshot, HostConfig, HostOs};
use crate::core::library::RocmLibrary;
use crate::util::config::Config;

pub use fixtures::*;

/// A throwaway ROCm installation root.
#[derive(Debug)]
pub struct ToolkitFixture {
    tmp: TempDir,
}

impl ToolkitFixture {
    /// Create an empty toolkit root.
    pub fn new() -> Self {
        ToolkitFixture {
            tmp: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// Create a toolkit root holding every library the local
    /// configuration needs (Linux names, `lib/` layout) and a few headers.
    pub fn with_all_libraries() -> Self {
        let fixture = ToolkitFixture::new();
        for lib in RocmLibrary::ALL {
            let file_name = lib
                .spec()
                .file_name(&HostOs::Linux)
                .expect("Linux names are always valid");
            let rel = Path::new(lib.subdir()).join("lib").join(file_name);
            fixture.add_file(rel);
        }
        fixture.write("include/hip/hip_runtime.h", "#pragma once\n");
        fixture.write("include/hip/hcc_detail/hip_fp16.h", "#pragma once\n");
        fixture.write("rocfft/include/rocfft.h", "#pragma once\n");
        fixture.write("rocblas/include/rocblas.h", "#pragma once\n");
        fixture.write("miopen/include/miopen/miopen.h", "#pragma once\n");
        fixture
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// Create an empty file (and its parents) relative to the root.
    pub fn add_file(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.write(rel, "")
    }

    /// Create a directory (and its parents) relative to the root.
    pub fn add_dir(&self, rel: impl AsRef<Path>) -> PathBuf {
        let path = self.root().join(rel);
        fs::create_dir_all(&path).expect("failed to create fixture dir");
        path
    }

    /// Write a file relative to the root.
    pub fn write(&self, rel: impl AsRef<Path>, contents: &str) -> PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create fixture dir");
        }
        fs::write(&path, contents).expect("failed to write fixture file");
        path
    }

    /// A Linux host whose toolkit root is this fixture, plus extra
    /// environment pairs.
    pub fn host(&self, extra: &[(&str, &str)]) -> HostConfig {
        let root = self.root().to_string_lossy().into_owned();
        let mut pairs: Vec<(String, String)> =
            vec![("ROCM_TOOLKIT_PATH".to_string(), root)];
        pairs.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        HostConfig::with_os(
            &EnvSnapshot::from_pairs(pairs),
            &Config::default(),
            HostOs::Linux,
        )
    }
}

impl Default for ToolkitFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A shell script standing in for the host compiler.
///
/// Invoked with `-xc++` it prints the C++ canned output to stderr,
/// otherwise the C one, then exits with the configured status.
#[cfg(unix)]
#[derive(Debug)]
pub struct FakeCompiler {
    tmp: TempDir,
}

#[cfg(unix)]
impl FakeCompiler {
    pub fn new(cxx_stderr: &str, c_stderr: &str) -> Self {
        Self::with_status(cxx_stderr, c_stderr, 0)
    }

    pub fn with_status(cxx_stderr: &str, c_stderr: &str, status: i32) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().expect("failed to create temp dir");
        fs::write(tmp.path().join("cxx.stderr"), cxx_stderr).expect("write cxx.stderr");
        fs::write(tmp.path().join("c.stderr"), c_stderr).expect("write c.stderr");

        let script = format!(
            "#!/bin/sh\n\
             cat > /dev/null\n\
             dir=$(dirname \"$0\")\n\
             case \"$*\" in\n\
             \x20 *-xc++*) cat \"$dir/cxx.stderr\" >&2 ;;\n\
             \x20 *) cat \"$dir/c.stderr\" >&2 ;;\n\
             esac\n\
             echo '# 0 \"<stdin>\"'\n\
             exit {}\n",
            status
        );
        let path = tmp.path().join("gcc");
        fs::write(&path, script).expect("write fake compiler");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");

        FakeCompiler { tmp }
    }

    pub fn path(&self) -> PathBuf {
        self.tmp.path().join("gcc")
    }
}
