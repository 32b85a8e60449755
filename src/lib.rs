//! rocm-configure - ROCm toolkit detection for build-system configuration
//!
//! This crate provides the library side of `rocm-configure`: host fact
//! collection, toolkit and compiler probing, and rendering of the
//! generated build files.

pub mod core;
pub mod ops;
pub mod probe;
pub mod render;
pub mod util;

/// Test utilities for rocm-configure unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a fabricated toolkit tree and a fake host
/// compiler.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{ConfigureError, EnvSnapshot, HostConfig, HostOs};
pub use crate::ops::{configure, ConfigureMode, ConfigureReport};
