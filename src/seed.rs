//! Demo corpus generator.
//!
//! `curly seed` writes a complete, immediately buildable working root: a
//! page template, a default block set, a collection listing template, and
//! N content directories with generated titles and bodies. Useful for
//! kicking the tires and for throughput testing with large page counts.
//!
//! Generation is deterministic (word lists cycled by page index), so two
//! seeds of the same size produce the same corpus. Plain sequential I/O;
//! this is tooling around the pipeline, not part of it.

use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const TITLE_WORDS: &[&str] = &[
    "Amazing", "Quick", "Lazy", "Bright", "Silent", "Loud", "Happy", "Clever", "Brave", "Wild",
    "Calm", "Cosmic", "Lucky", "Epic", "Tiny", "Giant", "Fresh",
];

const BODY_WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed",
    "eiusmod", "tempor", "incididunt", "labore", "dolore", "magna", "aliqua",
];

const CATEGORIES: &[&str] = &["main", "notes"];

const PAGE_TEMPLATE: &str = "\
<!doctype html>
<html>
<head><title>{title}</title></head>
<body>
{header}
<h1>{title}</h1>
<p>{body}</p>
{footer}
</body>
</html>
";

const LISTING_TEMPLATE: &str = "\
<!doctype html>
<html>
<head><title>{{CATEGORY}}</title></head>
<body>
{header}
<h1>{{CATEGORY}}</h1>
{footer}
</body>
</html>
";

/// Counts of what [`seed`] created.
#[derive(Debug)]
pub struct SeedReport {
    pub pages: usize,
}

/// Write a buildable demo corpus of `pages` pages under `root`.
///
/// Existing files with the same names are overwritten; other files are
/// left alone.
pub fn seed(root: &Path, pages: usize) -> Result<SeedReport, SeedError> {
    let templates = root.join("templates");
    let blocks = root.join("blocks");
    let collections = root.join("collections");
    let content = root.join("content");
    for dir in [&templates, &blocks, &collections, &content] {
        fs::create_dir_all(dir)?;
    }

    fs::write(templates.join("page.tpl"), PAGE_TEMPLATE)?;
    fs::write(blocks.join("header.tpl"), "<header>curly demo site</header>")?;
    fs::write(blocks.join("footer.tpl"), "<footer>generated by curly seed</footer>")?;
    fs::write(collections.join("category.tpl"), LISTING_TEMPLATE)?;

    for i in 0..pages {
        let dir = content.join(format!("page-{i:05}"));
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("title.val"), title_for(i))?;
        fs::write(dir.join("body.val"), body_for(i))?;
        fs::write(dir.join("template.setting"), "page")?;
        fs::write(dir.join("category.val"), CATEGORIES[i % CATEGORIES.len()])?;
    }

    Ok(SeedReport { pages })
}

fn title_for(i: usize) -> String {
    let first = TITLE_WORDS[i % TITLE_WORDS.len()];
    let second = TITLE_WORDS[(i / TITLE_WORDS.len() + i + 1) % TITLE_WORDS.len()];
    format!("{first} {second} Page")
}

fn body_for(i: usize) -> String {
    let words: Vec<&str> = (0..12)
        .map(|w| BODY_WORDS[(i + w * (i + 3)) % BODY_WORDS.len()])
        .collect();
    let mut body = words.join(" ");
    body.push('.');
    body
}
