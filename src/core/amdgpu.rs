//! AMDGPU target names and the compile flags derived from them.

use std::fmt;
use std::str::FromStr;

use crate::core::errors::ConfigureError;

/// A validated AMDGPU architecture such as `gfx900` or `gfx90a:xnack-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AmdgpuTarget(String);

impl AmdgpuTarget {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AmdgpuTarget {
    type Err = ConfigureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigureError::InvalidAmdgpuTarget {
            target: s.to_string(),
        };

        let mut parts = s.split(':');
        let arch = parts.next().unwrap_or_default();
        let digits = arch.strip_prefix("gfx").ok_or_else(invalid)?;

        // gfx803, gfx90a, gfx1100
        let arch_ok = digits.starts_with(|c: char| c.is_ascii_digit())
            && digits.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase());
        if !arch_ok {
            return Err(invalid());
        }

        // Feature suffixes: sramecc+, xnack-
        for feature in parts {
            let name = feature
                .strip_suffix('+')
                .or_else(|| feature.strip_suffix('-'))
                .ok_or_else(invalid)?;
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(invalid());
            }
        }

        Ok(AmdgpuTarget(s.to_string()))
    }
}

impl fmt::Display for AmdgpuTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a list of raw target names. The first bad name is fatal.
pub fn parse_targets<S: AsRef<str>>(raw: &[S]) -> Result<Vec<AmdgpuTarget>, ConfigureError> {
    raw.iter().map(|t| t.as_ref().parse()).collect()
}

/// Compiler flags selecting the targets, as a Starlark list literal.
pub fn extra_copts(targets: &[AmdgpuTarget]) -> String {
    starlark_list(targets.iter().map(|t| format!("--amdgpu-target={}", t)))
}

/// Target names as a comma-separated list of quoted strings, the form used
/// inside generated headers and the compiler wrapper.
pub fn quoted_list(targets: &[AmdgpuTarget]) -> String {
    targets
        .iter()
        .map(|t| format!("\"{}\"", t))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render strings as a Starlark list literal: `["a", "b"]`.
pub fn starlark_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let quoted: Vec<String> = items
        .into_iter()
        .map(|s| format!("\"{}\"", s.as_ref()))
        .collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_targets() {
        for name in ["gfx803", "gfx900", "gfx90a", "gfx1100", "gfx90a:xnack-", "gfx908:sramecc+:xnack-"] {
            assert_eq!(name.parse::<AmdgpuTarget>().unwrap().as_str(), name);
        }
    }

    #[test]
    fn test_invalid_targets() {
        for name in ["", "sm_80", "gfx", "gfxabc", "gfx90A", "gfx900:xnack", "gfx900:+"] {
            let err = name.parse::<AmdgpuTarget>().unwrap_err();
            assert!(
                matches!(err, ConfigureError::InvalidAmdgpuTarget { ref target } if target == name),
                "{name}"
            );
        }
    }

    #[test]
    fn test_parse_targets_stops_at_first_bad_name() {
        let err = parse_targets(&["gfx900", "bogus", "also-bogus"]).unwrap_err();
        assert_eq!(err.to_string(), "invalid AMDGPU target: bogus");
    }

    #[test]
    fn test_extra_copts() {
        let targets = parse_targets(&["gfx803", "gfx900"]).unwrap();
        assert_eq!(
            extra_copts(&targets),
            r#"["--amdgpu-target=gfx803", "--amdgpu-target=gfx900"]"#
        );
        assert_eq!(quoted_list(&targets), r#""gfx803","gfx900""#);
        assert_eq!(extra_copts(&[]), "[]");
    }
}
