//! Library naming.
//!
//! Maps a logical library name to the file name the host platform uses for
//! it, and lists the ROCm libraries the local configuration links against.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::errors::ConfigureError;
use crate::core::host::HostOs;

/// A library to look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySpec {
    pub logical_name: String,
    pub is_static: bool,
    pub version: Option<String>,
}

impl LibrarySpec {
    /// A shared library without a version suffix.
    pub fn shared(name: impl Into<String>) -> Self {
        LibrarySpec {
            logical_name: name.into(),
            is_static: false,
            version: None,
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Platform file name of this library.
    pub fn file_name(&self, os: &HostOs) -> Result<String, ConfigureError> {
        library_file_name(&self.logical_name, os, self.version.as_deref(), self.is_static)
    }
}

/// Where a library was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryLocation {
    pub file_name: String,
    /// Canonical path, symlinks resolved
    pub resolved_path: PathBuf,
}

/// Platform-specific file name for a library.
///
/// An empty version counts as no version.
pub fn library_file_name(
    name: &str,
    os: &HostOs,
    version: Option<&str>,
    is_static: bool,
) -> Result<String, ConfigureError> {
    let version = version.filter(|v| !v.is_empty());

    let file_name = match os {
        HostOs::Linux | HostOs::FreeBsd => match (is_static, version) {
            (true, _) => format!("lib{}.a", name),
            (false, Some(v)) => format!("lib{}.so.{}", name, v),
            (false, None) => format!("lib{}.so", name),
        },
        HostOs::Windows => format!("{}.lib", name),
        HostOs::Darwin => match (is_static, version) {
            (true, _) => format!("lib{}.a", name),
            (false, Some(v)) => format!("lib{}.{}.dylib", name, v),
            (false, None) => format!("lib{}.dylib", name),
        },
        HostOs::Other(tag) => return Err(ConfigureError::InvalidOs { os: tag.clone() }),
    };

    Ok(file_name)
}

/// The ROCm libraries a local configuration links against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RocmLibrary {
    Hip,
    Rocblas,
    Rocfft,
    Hiprand,
    Miopen,
}

impl RocmLibrary {
    pub const ALL: [RocmLibrary; 5] = [
        RocmLibrary::Hip,
        RocmLibrary::Rocblas,
        RocmLibrary::Rocfft,
        RocmLibrary::Hiprand,
        RocmLibrary::Miopen,
    ];

    /// Name used to build the library file name.
    pub fn logical_name(&self) -> &'static str {
        match self {
            RocmLibrary::Hip => "hip_hcc",
            RocmLibrary::Rocblas => "rocblas",
            RocmLibrary::Rocfft => "rocfft",
            RocmLibrary::Hiprand => "hiprand",
            RocmLibrary::Miopen => "MIOpen",
        }
    }

    /// Directory under the toolkit root that the library's `lib*`
    /// directories live in. Empty for the root itself.
    pub fn subdir(&self) -> &'static str {
        match self {
            RocmLibrary::Hip => "",
            RocmLibrary::Rocblas => "rocblas",
            RocmLibrary::Rocfft => "rocfft",
            RocmLibrary::Hiprand => "hiprand",
            RocmLibrary::Miopen => "miopen",
        }
    }

    pub fn spec(&self) -> LibrarySpec {
        LibrarySpec::shared(self.logical_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPPORTED: [HostOs; 4] = [HostOs::Linux, HostOs::FreeBsd, HostOs::Windows, HostOs::Darwin];

    #[test]
    fn test_naming_table() {
        let cases = [
            (HostOs::Linux, None, true, "librocblas.a"),
            (HostOs::Linux, None, false, "librocblas.so"),
            (HostOs::Linux, Some("3"), false, "librocblas.so.3"),
            (HostOs::FreeBsd, Some("3"), false, "librocblas.so.3"),
            (HostOs::FreeBsd, Some("3"), true, "librocblas.a"),
            (HostOs::Windows, None, true, "rocblas.lib"),
            (HostOs::Windows, Some("3"), false, "rocblas.lib"),
            (HostOs::Darwin, Some("3"), true, "librocblas.a"),
            (HostOs::Darwin, None, false, "librocblas.dylib"),
            (HostOs::Darwin, Some("3"), false, "librocblas.3.dylib"),
        ];

        for (os, version, is_static, expected) in cases {
            assert_eq!(
                library_file_name("rocblas", &os, version, is_static).unwrap(),
                expected,
                "{os} version={version:?} static={is_static}"
            );
        }
    }

    #[test]
    fn test_static_and_shared_names_differ() {
        for os in &SUPPORTED {
            if *os == HostOs::Windows {
                // Import libraries and static libraries share `.lib`
                continue;
            }
            for version in [None, Some("5.7")] {
                let s = library_file_name("MIOpen", os, version, true).unwrap();
                let d = library_file_name("MIOpen", os, version, false).unwrap();
                assert_ne!(s, d, "{os} {version:?}");
            }
        }
    }

    #[test]
    fn test_version_sits_before_extension() {
        let linux = library_file_name("hip_hcc", &HostOs::Linux, Some("1.2"), false).unwrap();
        assert!(linux.ends_with(".so.1.2"));
        let mac = library_file_name("hip_hcc", &HostOs::Darwin, Some("1.2"), false).unwrap();
        assert!(mac.ends_with(".1.2.dylib"));
    }

    #[test]
    fn test_empty_version_is_ignored() {
        assert_eq!(
            library_file_name("hiprand", &HostOs::Linux, Some(""), false).unwrap(),
            "libhiprand.so"
        );
    }

    #[test]
    fn test_unknown_os_is_invalid() {
        let err = library_file_name("rocfft", &HostOs::Other("SunOS".into()), None, false)
            .unwrap_err();
        assert!(matches!(err, ConfigureError::InvalidOs { ref os } if os == "SunOS"));
    }

    #[test]
    fn test_rocm_library_specs() {
        assert_eq!(
            RocmLibrary::Miopen.spec().file_name(&HostOs::Linux).unwrap(),
            "libMIOpen.so"
        );
        assert_eq!(RocmLibrary::Hip.subdir(), "");
        assert_eq!(
            LibrarySpec::shared("rocblas")
                .with_version("4")
                .file_name(&HostOs::Darwin)
                .unwrap(),
            "librocblas.4.dylib"
        );
    }

    #[test]
    fn test_static_spec_ignores_version() {
        let spec = LibrarySpec::shared("MIOpen").with_static(true).with_version("2");
        assert_eq!(spec.file_name(&HostOs::Linux).unwrap(), "libMIOpen.a");
        assert_eq!(spec.file_name(&HostOs::Windows).unwrap(), "MIOpen.lib");
    }
}
