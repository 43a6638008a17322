//! Category index aggregation.
//!
//! After the page pipeline drains, every collected record carrying a
//! category is grouped, and each category produces two artifacts in the
//! build directory:
//!
//! - `<category>.json`: a JSON array of `{"title": …, "url": …}` entries,
//!   two-space indented, field order `title` then `url`.
//! - `<category>.html`: the `collections/category.tpl` listing template
//!   with the literal `{{CATEGORY}}` marker replaced by the category name
//!   and every `{block}` placeholder resolved from the block set (blocks
//!   only: page attributes are gone by this point).
//!
//! Entries are sorted by `url` before serialization, so the artifacts are
//! byte-deterministic regardless of the concurrent completion order the
//! records arrived in.
//!
//! Categories are fanned out to a fixed-size worker pool (independent of
//! the category count). Failures are per-category: a failed category is
//! reported and the others still write their files; the aggregation as a
//! whole surfaces the first error once every task has completed.

use crate::blocks::BlockSet;
use crate::config::CategoriesConfig;
use crate::pipeline::CollectedRecord;
use crate::render;
use crate::report::{self, Event, Reporter};
use crate::sink::{Sink, SinkError};
use crossbeam_channel::bounded;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use thiserror::Error;

/// Literal marker in the collection listing template, replaced before any
/// `{name}` substitution runs (the brace scanner would otherwise eat the
/// inner opening brace).
const CATEGORY_MARKER: &str = "{{CATEGORY}}";
/// Listing template file inside the collections directory.
const LISTING_TEMPLATE: &str = "category.tpl";

#[derive(Error, Debug)]
pub enum CategoryError {
    #[error("failed to serialize index for category {category}: {source}")]
    Json {
        category: String,
        source: serde_json::Error,
    },
    #[error("failed to read collection template {path}: {source}")]
    ListingTemplate {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// One line of a category's JSON index. Field order is the serialized
/// order: `title`, then `url`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexEntry {
    pub title: String,
    pub url: String,
}

/// Result of one aggregation pass.
///
/// Per-category failures are fail-soft (other categories still write), but
/// the pass as a whole is fail-loud: `first_error` carries the first error
/// encountered, populated only after every dispatched task has completed.
#[derive(Debug)]
pub struct AggregateOutcome {
    pub written: usize,
    pub failed: usize,
    pub first_error: Option<CategoryError>,
}

/// Group `records` by category and emit one JSON index + HTML listing per
/// category through a bounded worker pool.
///
/// Records with no category (or an empty one) appear in no index.
pub fn aggregate(
    records: &[CollectedRecord],
    blocks: &BlockSet,
    collections_dir: &Path,
    sink: &Sink,
    config: &CategoriesConfig,
    reporter: &Reporter,
) -> AggregateOutcome {
    let groups = group_by_category(records);
    if groups.is_empty() {
        return AggregateOutcome {
            written: 0,
            failed: 0,
            first_error: None,
        };
    }

    // Blocks-only value set for the listing HTML.
    let block_values: BTreeMap<String, String> = blocks
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let (task_tx, task_rx) = bounded::<(String, Vec<IndexEntry>)>(groups.len());
    let (err_tx, err_rx) = bounded::<CategoryError>(groups.len());

    for task in groups {
        // Capacity covers every group; never blocks.
        let _ = task_tx.send(task);
    }
    drop(task_tx);

    let written = AtomicUsize::new(0);

    thread::scope(|s| {
        for _ in 0..config.workers.max(1) {
            let task_rx = task_rx.clone();
            let err_tx = err_tx.clone();
            let reporter = reporter.clone();
            let (block_values, written) = (&block_values, &written);
            s.spawn(move || {
                for (category, entries) in task_rx {
                    match write_category(&category, &entries, block_values, collections_dir, sink)
                    {
                        Ok(()) => {
                            written.fetch_add(1, Ordering::Relaxed);
                            report::emit(&reporter, Event::CategoryWritten {
                                category: category.clone(),
                            });
                        }
                        Err(e) => {
                            report::emit(&reporter, Event::CategoryFailed {
                                category: category.clone(),
                                cause: e.to_string(),
                            });
                            let _ = err_tx.send(e);
                        }
                    }
                }
            });
        }
        drop(task_rx);
        drop(err_tx);
    });

    let mut errors: Vec<CategoryError> = err_rx.try_iter().collect();
    let failed = errors.len();
    AggregateOutcome {
        written: written.into_inner(),
        failed,
        first_error: if errors.is_empty() {
            None
        } else {
            Some(errors.remove(0))
        },
    }
}

/// Group records into sorted `{title, url}` entry lists, keyed by category.
/// Records without a category are excluded entirely.
fn group_by_category(records: &[CollectedRecord]) -> Vec<(String, Vec<IndexEntry>)> {
    let mut groups: BTreeMap<String, Vec<IndexEntry>> = BTreeMap::new();
    for record in records {
        let Some(category) = record.category.as_deref() else {
            continue;
        };
        if category.is_empty() {
            continue;
        }
        groups.entry(category.to_string()).or_default().push(IndexEntry {
            title: record.title.clone(),
            url: format!("/{}.html", record.id),
        });
    }
    for entries in groups.values_mut() {
        entries.sort_by(|a, b| a.url.cmp(&b.url));
    }
    groups.into_iter().collect()
}

/// Produce both artifacts for one category.
fn write_category(
    category: &str,
    entries: &[IndexEntry],
    block_values: &BTreeMap<String, String>,
    collections_dir: &Path,
    sink: &Sink,
) -> Result<(), CategoryError> {
    let json = serde_json::to_vec_pretty(entries).map_err(|source| CategoryError::Json {
        category: category.to_string(),
        source,
    })?;
    sink.write(&sink.category_json_path(category), &json)?;

    let template_path = collections_dir.join(LISTING_TEMPLATE);
    let listing =
        std::fs::read_to_string(&template_path).map_err(|source| CategoryError::ListingTemplate {
            path: template_path,
            source,
        })?;

    let listing = listing.replace(CATEGORY_MARKER, category);
    let html = render::render(&listing, block_values);
    sink.write(&sink.category_html_path(category), html.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record(id: &str, category: Option<&str>, title: &str) -> CollectedRecord {
        CollectedRecord {
            id: id.to_string(),
            category: category.map(str::to_string),
            title: title.to_string(),
        }
    }

    fn setup(listing: &str) -> (TempDir, PathBuf, Sink) {
        let tmp = TempDir::new().unwrap();
        let collections = tmp.path().join("collections");
        fs::create_dir_all(&collections).unwrap();
        fs::write(collections.join("category.tpl"), listing).unwrap();
        let sink = Sink::open(&tmp.path().join("build")).unwrap();
        (tmp, collections, sink)
    }

    #[test]
    fn groups_and_sorts_entries_by_url() {
        let records = [
            record("zebra", Some("blog"), "Z"),
            record("alpha", Some("blog"), "A"),
            record("solo", Some("news"), "S"),
        ];

        let groups = group_by_category(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "blog");
        assert_eq!(
            groups[0].1,
            vec![
                IndexEntry {
                    title: "A".to_string(),
                    url: "/alpha.html".to_string()
                },
                IndexEntry {
                    title: "Z".to_string(),
                    url: "/zebra.html".to_string()
                },
            ]
        );
    }

    #[test]
    fn uncategorized_records_are_excluded() {
        let records = [
            record("a", None, "A"),
            record("b", Some(""), "B"),
            record("c", Some("blog"), "C"),
        ];

        let groups = group_by_category(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].1.len(), 1);
    }

    #[test]
    fn writes_json_and_html_per_category() {
        let (tmp, collections, sink) = setup("<h1>{{CATEGORY}}</h1>{footer}");
        let blocks = BlockSet::from_pairs([("footer", "<footer/>")]).unwrap();
        let records = [
            record("p1", Some("blog"), "P1"),
            record("p2", Some("blog"), "P2"),
        ];

        let outcome = aggregate(
            &records,
            &blocks,
            &collections,
            &sink,
            &CategoriesConfig::default(),
            &None,
        );
        assert_eq!(outcome.written, 1);
        assert_eq!(outcome.failed, 0);
        assert!(outcome.first_error.is_none());

        let json = fs::read_to_string(tmp.path().join("build").join("blog.json")).unwrap();
        let parsed: Vec<IndexEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].url, "/p1.html");
        assert_eq!(parsed[0].title, "P1");
        // Two-space indentation and title-before-url field order.
        assert!(json.contains("  {\n    \"title\": \"P1\",\n    \"url\": \"/p1.html\"\n  }"));

        let html = fs::read_to_string(tmp.path().join("build").join("blog.html")).unwrap();
        assert_eq!(html, "<h1>blog</h1><footer/>");
    }

    #[test]
    fn missing_listing_template_fails_loud_after_completion() {
        let tmp = TempDir::new().unwrap();
        let collections = tmp.path().join("collections");
        // No category.tpl written.
        fs::create_dir_all(&collections).unwrap();
        let sink = Sink::open(&tmp.path().join("build")).unwrap();

        let records = [record("p", Some("blog"), "P")];
        let outcome = aggregate(
            &records,
            &BlockSet::default(),
            &collections,
            &sink,
            &CategoriesConfig::default(),
            &None,
        );

        assert_eq!(outcome.written, 0);
        assert_eq!(outcome.failed, 1);
        assert!(matches!(
            outcome.first_error,
            Some(CategoryError::ListingTemplate { .. })
        ));
        // JSON was still written before the listing failure.
        assert!(tmp.path().join("build").join("blog.json").exists());
    }

    #[test]
    fn successful_categories_keep_their_files_next_to_a_failure() {
        // A category whose name collides with a directory forces a write
        // failure for it while the other category still succeeds.
        let (tmp, collections, sink) = setup("{{CATEGORY}}");
        fs::create_dir_all(tmp.path().join("build").join("broken.json")).unwrap();

        let records = [
            record("a", Some("blog"), "A"),
            record("b", Some("broken"), "B"),
        ];
        let outcome = aggregate(
            &records,
            &BlockSet::default(),
            &collections,
            &sink,
            &CategoriesConfig::default(),
            &None,
        );

        assert_eq!(outcome.written, 1);
        assert_eq!(outcome.failed, 1);
        assert!(outcome.first_error.is_some());
        assert!(tmp.path().join("build").join("blog.json").exists());
        assert!(tmp.path().join("build").join("blog.html").exists());
    }

    #[test]
    fn no_categorized_records_is_a_clean_no_op() {
        let (_tmp, collections, sink) = setup("{{CATEGORY}}");
        let outcome = aggregate(
            &[record("a", None, "A")],
            &BlockSet::default(),
            &collections,
            &sink,
            &CategoriesConfig::default(),
            &None,
        );
        assert_eq!(outcome.written, 0);
        assert_eq!(outcome.failed, 0);
    }

    #[test]
    fn worker_count_does_not_change_artifacts() {
        let mut outputs = Vec::new();
        for workers in [1usize, 4] {
            let (tmp, collections, sink) = setup("<ul>{{CATEGORY}}</ul>");
            let records: Vec<CollectedRecord> = (0..10)
                .map(|i| {
                    let cat = format!("cat{}", i % 3);
                    record(&format!("p{i}"), Some(cat.as_str()), "T")
                })
                .collect();

            aggregate(
                &records,
                &BlockSet::default(),
                &collections,
                &sink,
                &CategoriesConfig { workers },
                &None,
            );

            let mut files: Vec<(String, String)> = fs::read_dir(tmp.path().join("build"))
                .unwrap()
                .map(|e| e.unwrap().path())
                .map(|p| {
                    (
                        p.file_name().unwrap().to_string_lossy().to_string(),
                        fs::read_to_string(&p).unwrap(),
                    )
                })
                .collect();
            files.sort();
            outputs.push(files);
        }
        assert_eq!(outputs[0], outputs[1]);
    }
}
