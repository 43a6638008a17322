//! Page template loading.
//!
//! A template is a flat text file at `templates/<name>.tpl` whose only
//! structure is `{placeholder}` tokens. Loading a template reads the raw
//! text and derives the distinct set of placeholder names it mentions;
//! those names later act as empty-string defaults for any key a page (or
//! block) didn't supply, so a rendered page never leaks a template's own
//! tokens into its output.
//!
//! ## No Cache
//!
//! Templates are loaded lazily and independently per page: two pages using
//! the same template name perform two separate disk reads. This mirrors
//! the source behavior of the pipeline and is deliberate: the corpus is
//! fully reprocessed every run and template files are small, so a shared
//! cache would buy little and add a synchronization surface to the
//! processor pool.

use crate::blocks::TEMPLATE_EXT;
use crate::render;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template '{0}' not found at {1}")]
    NotFound(String, PathBuf),
    #[error("failed to read template '{0}': {1}")]
    Unreadable(String, std::io::Error),
}

/// A loaded page template: raw text plus its distinct placeholder names.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub raw: String,
    pub placeholders: BTreeSet<String>,
}

impl Template {
    /// Load `<templates_dir>/<name>.tpl` and extract its placeholders.
    pub fn load(templates_dir: &Path, name: &str) -> Result<Self, TemplateError> {
        let path = templates_dir.join(format!("{name}.{TEMPLATE_EXT}"));
        let raw = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TemplateError::NotFound(name.to_string(), path.clone())
            } else {
                TemplateError::Unreadable(name.to_string(), e)
            }
        })?;

        let placeholders = render::placeholder_names(&raw);
        Ok(Self {
            name: name.to_string(),
            raw,
            placeholders,
        })
    }

    /// Fill `values` with an empty-string default for every placeholder the
    /// template mentions that `values` doesn't already have.
    ///
    /// Defaults only fill gaps: a key supplied by the page or a block is
    /// never overwritten.
    pub fn fill_defaults(&self, values: &mut BTreeMap<String, String>) {
        for name in &self.placeholders {
            values.entry(name.clone()).or_default();
        }
    }
}
