//! Output-directory write surface.
//!
//! Everything the generator produces goes through [`Sink`]: rendered pages
//! (`<id>.html`), category indexes (`<category>.json`) and category
//! listings (`<category>.html`), all flat in the build directory. Writers
//! run concurrently, but every producer targets a distinct file name (one
//! page id or category → one path), so there is no write-write conflict to
//! synchronize. A payload is written only once, and only after it fully
//! exists in memory: no partial files on a mid-render failure.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to create build directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, std::io::Error),
}

/// Handle on the build output directory.
#[derive(Debug, Clone)]
pub struct Sink {
    build_dir: PathBuf,
}

impl Sink {
    /// Open the sink, creating the build directory if absent.
    pub fn open(build_dir: &Path) -> Result<Self, SinkError> {
        fs::create_dir_all(build_dir)
            .map_err(|e| SinkError::CreateDir(build_dir.to_path_buf(), e))?;
        Ok(Self {
            build_dir: build_dir.to_path_buf(),
        })
    }

    /// Destination for a rendered page.
    pub fn page_path(&self, id: &str) -> PathBuf {
        self.build_dir.join(format!("{id}.html"))
    }

    /// Destination for a category's JSON index.
    pub fn category_json_path(&self, category: &str) -> PathBuf {
        self.build_dir.join(format!("{category}.json"))
    }

    /// Destination for a category's HTML listing.
    pub fn category_html_path(&self, category: &str) -> PathBuf {
        self.build_dir.join(format!("{category}.html"))
    }

    /// Write a complete payload to `path`.
    pub fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), SinkError> {
        fs::write(path, bytes).map_err(|e| SinkError::Write(path.to_path_buf(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_the_build_directory() {
        let tmp = TempDir::new().unwrap();
        let build = tmp.path().join("build");

        let sink = Sink::open(&build).unwrap();
        assert!(build.is_dir());

        sink.write(&sink.page_path("a"), b"<html/>").unwrap();
        assert_eq!(fs::read_to_string(build.join("a.html")).unwrap(), "<html/>");
    }

    #[test]
    fn open_is_idempotent_on_existing_directory() {
        let tmp = TempDir::new().unwrap();
        Sink::open(tmp.path()).unwrap();
        Sink::open(tmp.path()).unwrap();
    }

    #[test]
    fn paths_are_flat_and_per_name() {
        let tmp = TempDir::new().unwrap();
        let sink = Sink::open(tmp.path()).unwrap();

        assert_eq!(sink.page_path("post"), tmp.path().join("post.html"));
        assert_eq!(sink.category_json_path("blog"), tmp.path().join("blog.json"));
        assert_eq!(sink.category_html_path("blog"), tmp.path().join("blog.html"));
    }

    #[test]
    fn write_to_unwritable_path_reports_the_path() {
        let tmp = TempDir::new().unwrap();
        let sink = Sink::open(tmp.path()).unwrap();

        let bad = tmp.path().join("missing-dir").join("x.html");
        let err = sink.write(&bad, b"x").unwrap_err();
        assert!(matches!(err, SinkError::Write(p, _) if p == bad));
    }
}
