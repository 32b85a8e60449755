//! Template jobs: placeholder substitution and all-or-nothing writes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::errors::ConfigureError;
use crate::util::fs::write_atomic;

/// Matches a `%{name}` placeholder.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%\{([A-Za-z0-9_]+)\}").expect("placeholder regex is valid"));

/// A template with a closed set of named substitutions.
pub trait TemplateKind {
    /// Identifier used in error messages.
    const ID: &'static str;
    /// Template text with `%{name}` placeholders.
    const SOURCE: &'static str;
    /// Whether the rendered file must be executable.
    const EXECUTABLE: bool = false;

    fn substitutions(&self) -> Vec<(&'static str, String)>;
}

/// One file to generate.
#[derive(Debug, Clone)]
pub struct TemplateJob {
    id: &'static str,
    source: &'static str,
    substitutions: HashMap<String, String>,
    output: PathBuf,
    executable: bool,
}

impl TemplateJob {
    pub fn new<T: TemplateKind>(template: &T, output: impl Into<PathBuf>) -> Self {
        TemplateJob {
            id: T::ID,
            source: T::SOURCE,
            substitutions: template
                .substitutions()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            output: output.into(),
            executable: T::EXECUTABLE,
        }
    }

    /// Substitute every placeholder in one pass.
    ///
    /// Substituted values are not rescanned. A placeholder without a value
    /// is an error.
    pub fn render(&self) -> Result<String, ConfigureError> {
        let mut rendered = String::with_capacity(self.source.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(self.source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = self.substitutions.get(name.as_str()).ok_or_else(|| {
                ConfigureError::UnresolvedPlaceholder {
                    template: self.id.to_string(),
                    placeholder: name.as_str().to_string(),
                }
            })?;
            rendered.push_str(&self.source[last..whole.start()]);
            rendered.push_str(value);
            last = whole.end();
        }
        rendered.push_str(&self.source[last..]);

        for key in self.substitutions.keys() {
            if !self.source.contains(&format!("%{{{}}}", key)) {
                tracing::debug!("template `{}` does not use `{}`", self.id, key);
            }
        }

        Ok(rendered)
    }

    /// Render and write the output file. Nothing is written if rendering
    /// fails.
    pub fn write(&self) -> Result<PathBuf, ConfigureError> {
        let contents = self.render()?;
        write_atomic(&self.output, contents.as_bytes(), self.executable)?;
        tracing::debug!("wrote {}", self.output.display());
        Ok(self.output.clone())
    }
}
