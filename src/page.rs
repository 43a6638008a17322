//! Page loading.
//!
//! A page is a directory under `content/`. The directory's base name is the
//! page id (and the output file name); its files supply everything else:
//!
//! ```text
//! content/
//! └── first-post/
//!     ├── template.setting   # template name (no template → page skipped)
//!     ├── category.val       # category name (no category → not indexed)
//!     ├── title.val          # attribute "title"
//!     └── body.val           # attribute "body"
//! ```
//!
//! Every `*.val` file becomes one attribute: stem → trimmed content. After
//! the page's own files are read, every block is layered in
//! **unconditionally**: a block value always overwrites a same-named page
//! attribute. This ordering is the precedence rule of the whole system:
//! page attributes < blocks, with template defaults later filling only the
//! keys still absent.
//!
//! Errors are scoped to the page: they carry the page id and the offending
//! file, and the caller drops the page rather than aborting the corpus.

use crate::blocks::BlockSet;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File extension for attribute value files.
pub const ATTR_EXT: &str = "val";
/// Marker file naming the page's template.
pub const TEMPLATE_SETTING: &str = "template.setting";
/// Marker file naming the page's category.
pub const CATEGORY_FILE: &str = "category.val";

#[derive(Error, Debug)]
pub enum PageError {
    #[error("failed to read category for page {id}: {source}")]
    Category {
        id: String,
        source: std::io::Error,
    },
    #[error("failed to read template.setting for page {id}: {source}")]
    TemplateSetting {
        id: String,
        source: std::io::Error,
    },
    #[error("failed to read page directory {id}: {source}")]
    DirUnreadable {
        id: String,
        source: std::io::Error,
    },
    #[error("failed to read attribute '{attr}' for page {id}: {source}")]
    Attribute {
        attr: String,
        id: String,
        source: std::io::Error,
    },
}

/// One page's in-memory record: id, resolved attributes, and markers.
///
/// Immutable after [`PageRecord::load`]; owned by exactly one processor
/// thread until handed off.
#[derive(Debug, Clone)]
pub struct PageRecord {
    /// Directory base name; also the output file stem (`build/<id>.html`).
    pub id: String,
    /// Attribute name → trimmed value, blocks already layered in.
    pub attributes: BTreeMap<String, String>,
    /// From `template.setting`; `None` means the page is skipped.
    pub template_name: Option<String>,
    /// From `category.val`; `None` means the page appears in no index.
    pub category: Option<String>,
}

impl PageRecord {
    /// Read one page directory into a record, layering in block values.
    pub fn load(page_dir: &Path, blocks: &BlockSet) -> Result<Self, PageError> {
        let id = page_dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let category = read_marker(page_dir, CATEGORY_FILE, |source| PageError::Category {
            id: id.clone(),
            source,
        })?;

        let template_name =
            read_marker(page_dir, TEMPLATE_SETTING, |source| PageError::TemplateSetting {
                id: id.clone(),
                source,
            })?;

        let mut attributes = BTreeMap::new();
        let entries = fs::read_dir(page_dir).map_err(|source| PageError::DirUnreadable {
            id: id.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| PageError::DirUnreadable {
                id: id.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let is_attr = path
                .extension()
                .map(|e| e.eq_ignore_ascii_case(ATTR_EXT))
                .unwrap_or(false);
            if !is_attr {
                continue;
            }

            let attr = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let content = fs::read_to_string(&path).map_err(|source| PageError::Attribute {
                attr: attr.clone(),
                id: id.clone(),
                source,
            })?;
            attributes.insert(attr, content.trim().to_string());
        }

        // Blocks win over same-named page attributes, and every block name
        // becomes a usable key even if no .val file asked for it.
        for (name, content) in blocks.iter() {
            attributes.insert(name.to_string(), content.to_string());
        }

        Ok(Self {
            id,
            attributes,
            template_name,
            category,
        })
    }

    /// The page's title attribute, or empty if none resolved.
    pub fn title(&self) -> &str {
        self.attributes.get("title").map(String::as_str).unwrap_or("")
    }
}

/// Read an optional marker file: absent → `Ok(None)`, present-but-unreadable
/// → hard error for this page, otherwise trimmed content.
fn read_marker(
    page_dir: &Path,
    file: &str,
    to_err: impl FnOnce(std::io::Error) -> PageError,
) -> Result<Option<String>, PageError> {
    let path = page_dir.join(file);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path).map_err(to_err)?;
    Ok(Some(content.trim().to_string()))
}
