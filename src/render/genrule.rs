//! Symlink genrules that expose toolkit files inside the build tree.

use std::path::Path;

use crate::core::errors::ConfigureError;
use crate::util::fs::{list_files_recursive, norm_path, relative_path};

/// Emit a genrule that symlinks each source path to
/// `<dest_dir>/<dest_name>` in the rule's output directory.
///
/// The command clears `include` and `lib` under the output directory
/// first. With a single pair the link is created directly under the
/// output directory; the declared output is always
/// `<dest_dir>/<dest_name>`.
pub fn emit_symlink_genrule<S, D>(
    name: &str,
    src_paths: &[S],
    dest_dir: &str,
    dest_names: &[D],
) -> Result<String, ConfigureError>
where
    S: AsRef<str>,
    D: AsRef<str>,
{
    if src_paths.len() != dest_names.len() {
        return Err(ConfigureError::GenruleMismatch {
            genrule: name.to_string(),
            sources: src_paths.len(),
            destinations: dest_names.len(),
        });
    }

    let single = src_paths.len() == 1;
    let mut outs = Vec::with_capacity(dest_names.len());
    let mut commands = vec![r#"rm -rf "$(@D)/include" "$(@D)/lib""#.to_string()];

    for (src, dest_name) in src_paths.iter().zip(dest_names) {
        let dest_name = dest_name.as_ref();
        let link = if single {
            format!("$(@D)/{}", dest_name)
        } else {
            format!("$(@D)/{}/{}", dest_dir, dest_name)
        };
        commands.push(format!(r#"ln -s "{}" "{}""#, src.as_ref(), link));
        outs.push(format!("        \"{}/{}\",", dest_dir, dest_name));
    }

    if outs.is_empty() {
        tracing::warn!("genrule `{}` has no outputs", name);
    }

    Ok(format!(
        "genrule(\n    name = \"{name}\",\n    outs = [\n{outs}\n    ],\n    cmd = \"\"\"{cmd} \"\"\",\n)",
        name = name,
        outs = outs.join("\n"),
        cmd = commands.join(" && "),
    ))
}

/// Emit a genrule linking every file below `src_dir` into `dest_dir`,
/// keeping the relative layout.
pub fn symlink_genrule_for_dir(
    name: &str,
    src_dir: &Path,
    dest_dir: &str,
) -> Result<String, ConfigureError> {
    let files = list_files_recursive(src_dir)?;
    tracing::debug!("{}: {} files under {}", name, files.len(), src_dir.display());

    let src_paths: Vec<String> = files.iter().map(|f| norm_path(f)).collect();
    let dest_names: Vec<String> = files
        .iter()
        .map(|f| norm_path(&relative_path(src_dir, f)))
        .collect();

    emit_symlink_genrule(name, &src_paths, &norm_path(Path::new(dest_dir)), &dest_names)
}
