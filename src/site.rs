//! Build orchestration.
//!
//! One full run, in order:
//!
//! 1. **Fatal preconditions**: the templates and content directories must
//!    exist; the build directory is created if absent.
//! 2. **Blocks**: loaded once, single-threaded; a self-referencing block
//!    aborts here, before any page work, with zero output files produced.
//! 3. **Pipeline**: every page directory goes through the concurrent
//!    load → render → persist stages ([`crate::pipeline`]).
//! 4. **Aggregation**: collected records fan out into per-category
//!    artifacts ([`crate::categories`]).
//!
//! Per-page and per-category errors never abort the run; they are reported
//! as events and the page/category is dropped. The only early-termination
//! paths are the fatal preconditions, which is why [`build`] returns
//! `Ok(Summary)` even for a run where every single page failed.

use crate::blocks::{BlockSet, BlocksError};
use crate::categories;
use crate::config::SiteConfig;
use crate::pipeline;
use crate::report::Reporter;
use crate::sink::{Sink, SinkError};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("templates directory not found: {0}")]
    TemplatesDirMissing(PathBuf),
    #[error("content directory not found: {0}")]
    ContentDirMissing(PathBuf),
    #[error("failed to read content directory {0}: {1}")]
    ContentUnreadable(PathBuf, std::io::Error),
    #[error("block error: {0}")]
    Blocks(#[from] BlocksError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Final counts for one build run, printed as the closing summary line.
#[derive(Debug)]
pub struct Summary {
    pub pages_written: usize,
    pub pages_failed: usize,
    pub pages_skipped: usize,
    pub categories_written: usize,
    pub categories_failed: usize,
    pub elapsed: Duration,
}

/// What [`check`] found, without writing anything.
#[derive(Debug)]
pub struct CheckReport {
    pub pages: usize,
    pub blocks: usize,
}

/// Run a full build rooted at `root`.
pub fn build(root: &Path, config: &SiteConfig, reporter: &Reporter) -> Result<Summary, BuildError> {
    let start = Instant::now();
    let layout = &config.layout;

    let templates_dir = root.join(&layout.templates_dir);
    let content_dir = root.join(&layout.content_dir);
    if !templates_dir.is_dir() {
        return Err(BuildError::TemplatesDirMissing(templates_dir));
    }
    if !content_dir.is_dir() {
        return Err(BuildError::ContentDirMissing(content_dir));
    }

    let sink = Sink::open(&root.join(&layout.build_dir))?;
    let blocks = BlockSet::load(&root.join(&layout.blocks_dir))?;
    let pages = enumerate_pages(&content_dir)?;

    let outcome = pipeline::run(
        &pages,
        &templates_dir,
        &blocks,
        &sink,
        &config.pipeline,
        reporter,
    );

    let aggregated = categories::aggregate(
        &outcome.collected,
        &blocks,
        &root.join(&layout.collections_dir),
        &sink,
        &config.categories,
        reporter,
    );

    Ok(Summary {
        pages_written: outcome.pages_written,
        pages_failed: outcome.pages_failed,
        pages_skipped: outcome.pages_skipped,
        categories_written: aggregated.written,
        categories_failed: aggregated.failed,
        elapsed: start.elapsed(),
    })
}

/// Validate the content tree without writing: preconditions, block
/// self-references, page enumeration.
pub fn check(root: &Path, config: &SiteConfig) -> Result<CheckReport, BuildError> {
    let layout = &config.layout;

    let templates_dir = root.join(&layout.templates_dir);
    let content_dir = root.join(&layout.content_dir);
    if !templates_dir.is_dir() {
        return Err(BuildError::TemplatesDirMissing(templates_dir));
    }
    if !content_dir.is_dir() {
        return Err(BuildError::ContentDirMissing(content_dir));
    }

    let blocks = BlockSet::load(&root.join(&layout.blocks_dir))?;
    let pages = enumerate_pages(&content_dir)?;

    Ok(CheckReport {
        pages: pages.len(),
        blocks: blocks.len(),
    })
}

/// List page directories in the content dir. Non-directories are ignored;
/// the list is sorted so runs visit pages in a stable order.
fn enumerate_pages(content_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let entries = fs::read_dir(content_dir)
        .map_err(|e| BuildError::ContentUnreadable(content_dir.to_path_buf(), e))?;

    let mut pages = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| BuildError::ContentUnreadable(content_dir.to_path_buf(), e))?;
        let path = entry.path();
        if path.is_dir() {
            pages.push(path);
        }
    }
    pages.sort();
    Ok(pages)
}
