//! Rendering of generated build files.

pub mod genrule;
pub mod template;
pub mod templates;

pub use genrule::{emit_symlink_genrule, symlink_genrule_for_dir};
pub use template::{TemplateJob, TemplateKind};
