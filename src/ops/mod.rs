//! High-level operations.
//!
//! This module contains the implementation of the rocm-configure commands.

pub mod configure;
pub mod doctor;

pub use configure::{configure, ConfigureMode, ConfigureReport};
pub use doctor::{doctor, format_report, CheckResult, DoctorReport};
