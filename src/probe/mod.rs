//! Host inspection: the toolkit tree on disk and the host compiler.

pub mod compiler;
pub mod fs_probe;

pub use compiler::{default_include_dirs, find_compiler, parse_include_dirs, union_include_dirs};
pub use fs_probe::{
    find_library, find_rocm_libraries, find_toolkit_root, toolkit_include_dirs, toolkit_version,
};
