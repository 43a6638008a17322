//! Shared block fragments.
//!
//! Blocks are named text fragments loaded from `blocks/<name>.tpl` and
//! merged into every page's value set before rendering. A block value wins
//! over a page attribute of the same name, so blocks are the way to give
//! every page a common header, footer, or navigation fragment.
//!
//! ## Load-Once, Read-Only
//!
//! The block set is loaded exactly once, single-threaded, before any page
//! work starts. After that it is shared by reference across all pipeline
//! threads. [`BlockSet`] has no mutating API, which makes the unsynchronized
//! concurrent reads sound: the invariant is carried by the type, not by
//! the absence of writes.
//!
//! ## No Expansion
//!
//! Block text may itself contain `{other-block}` tokens. They are *not*
//! expanded here: they stay literal in the block value and resolve (or
//! don't) when the block value is substituted into a page. This is a
//! designed restriction: no block chaining, no recursion. The one thing
//! that is checked is self-reference (`greeting.tpl` containing
//! `{greeting}`), which would otherwise survive every render pass verbatim
//! and is always a content mistake. A self-reference aborts the whole run
//! before any page is processed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File extension for block files (and page templates).
pub const TEMPLATE_EXT: &str = "tpl";

#[derive(Error, Debug)]
pub enum BlocksError {
    #[error("failed to read blocks directory {0}: {1}")]
    DirUnreadable(PathBuf, std::io::Error),
    #[error("failed to read block file {0}: {1}")]
    FileUnreadable(PathBuf, std::io::Error),
    #[error("block '{0}' contains a forbidden self-reference")]
    SelfReference(String),
}

/// Immutable mapping from block name to raw block text.
///
/// Constructed by [`BlockSet::load`]; never mutated afterwards. Safe to
/// share by reference across threads.
#[derive(Debug, Clone, Default)]
pub struct BlockSet {
    blocks: BTreeMap<String, String>,
}

impl BlockSet {
    /// Load every `*.tpl` file in `dir` (non-recursive; subdirectories are
    /// ignored) into a block set, then validate for self-references.
    ///
    /// Returns no partial result: any unreadable file or self-referencing
    /// block fails the whole load, and the caller must not proceed to page
    /// processing.
    pub fn load(dir: &Path) -> Result<Self, BlocksError> {
        let entries = fs::read_dir(dir)
            .map_err(|e| BlocksError::DirUnreadable(dir.to_path_buf(), e))?;

        let mut blocks = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| BlocksError::DirUnreadable(dir.to_path_buf(), e))?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let is_block = path
                .extension()
                .map(|e| e.eq_ignore_ascii_case(TEMPLATE_EXT))
                .unwrap_or(false);
            if !is_block {
                continue;
            }

            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let content = fs::read_to_string(&path)
                .map_err(|e| BlocksError::FileUnreadable(path.clone(), e))?;
            blocks.insert(name, content);
        }

        validate_no_self_reference(&blocks)?;
        Ok(Self { blocks })
    }

    /// Build a block set directly from name/content pairs. Applies the same
    /// self-reference validation as [`BlockSet::load`].
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, BlocksError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let blocks: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        validate_no_self_reference(&blocks)?;
        Ok(Self { blocks })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.blocks.get(name).map(|s| s.as_str())
    }

    /// Iterate name/content pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.blocks.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// A block whose text contains its own `{name}` token would never resolve:
/// block values are substituted once, not expanded.
fn validate_no_self_reference(blocks: &BTreeMap<String, String>) -> Result<(), BlocksError> {
    for (name, content) in blocks {
        let token = format!("{{{name}}}");
        if content.contains(&token) {
            return Err(BlocksError::SelfReference(name.clone()));
        }
    }
    Ok(())
}
