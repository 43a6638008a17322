//! Shared test utilities for the curly test suite.
//!
//! Provides small filesystem builders so tests can describe a corpus in one
//! expression instead of a dozen `fs::write` calls.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = demo_site();
//! let summary = site::build(tmp.path(), &SiteConfig::default(), &None).unwrap();
//! assert_eq!(summary.pages_written, 3);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create one page directory under `parent` with optional markers and
/// attribute files. Returns the page directory path.
pub fn page_dir(
    parent: &Path,
    id: &str,
    template: Option<&str>,
    category: Option<&str>,
    attrs: &[(&str, &str)],
) -> PathBuf {
    let dir = parent.join(id);
    fs::create_dir_all(&dir).unwrap();
    if let Some(template) = template {
        fs::write(dir.join("template.setting"), template).unwrap();
    }
    if let Some(category) = category {
        fs::write(dir.join("category.val"), category).unwrap();
    }
    for (attr, value) in attrs {
        fs::write(dir.join(format!("{attr}.val")), value).unwrap();
    }
    dir
}

/// Write a `<name>.tpl` file into `dir`.
pub fn write_template(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(format!("{name}.tpl")), content).unwrap();
}

/// Build a complete working root:
///
/// ```text
/// templates/page.tpl       {header}<h1>{title}</h1><p>{body}</p>{footer}
/// blocks/header.tpl        <header>Demo</header>
/// blocks/footer.tpl        <footer>(c)</footer>
/// collections/category.tpl <h1>{{CATEGORY}}</h1>{header}
/// content/first/           template=page, category=blog
/// content/second/          template=page, category=blog
/// content/uncategorized/   template=page, no category
/// content/draft/           no template (skipped)
/// ```
pub fn demo_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    let templates = root.join("templates");
    let blocks = root.join("blocks");
    let collections = root.join("collections");
    let content = root.join("content");
    for dir in [&templates, &blocks, &collections, &content] {
        fs::create_dir_all(dir).unwrap();
    }

    write_template(
        &templates,
        "page",
        "{header}<h1>{title}</h1><p>{body}</p>{footer}",
    );
    write_template(&blocks, "header", "<header>Demo</header>");
    write_template(&blocks, "footer", "<footer>(c)</footer>");
    write_template(&collections, "category", "<h1>{{CATEGORY}}</h1>{header}");

    page_dir(
        &content,
        "first",
        Some("page"),
        Some("blog"),
        &[("title", "First Post"), ("body", "Hello")],
    );
    page_dir(
        &content,
        "second",
        Some("page"),
        Some("blog"),
        &[("title", "Second Post"), ("body", "World")],
    );
    page_dir(
        &content,
        "uncategorized",
        Some("page"),
        None,
        &[("title", "Loose Page"), ("body", "No index for me")],
    );
    page_dir(&content, "draft", None, None, &[("title", "Unfinished")]);

    tmp
}
