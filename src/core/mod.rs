//! Core data model: host facts, library naming, GPU targets and errors.

pub mod amdgpu;
pub mod errors;
pub mod host;
pub mod library;

pub use amdgpu::AmdgpuTarget;
pub use errors::ConfigureError;
pub use host::{EnvSnapshot, HostConfig, HostOs};
pub use library::{library_file_name, LibraryLocation, LibrarySpec, RocmLibrary};
