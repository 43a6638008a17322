//! Structured build events and their CLI formatting.
//!
//! Pipeline and aggregation workers never print: they emit [`Event`] values
//! over an `std::sync::mpsc` channel, and the binary drains that channel on
//! a dedicated printer thread. This keeps worker output from interleaving
//! mid-line and keeps the reporting format out of the control flow: an
//! event is a fact about the build, not a format string.
//!
//! Each `format_*` function is pure (no I/O, no side effects) so tests can
//! assert on exact output lines.

use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

/// The pipeline stage where a page failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Template,
    Render,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Template => "template",
            Stage::Render => "render",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

/// One reportable fact about a build in progress.
#[derive(Debug)]
pub enum Event {
    /// A page was dropped at some stage; the run continues.
    PageFailed {
        id: String,
        stage: Stage,
        cause: String,
    },
    /// A page has no `template.setting`: a notice, not an error.
    NoTemplate { id: String },
    /// A page's output file landed on disk (verbose mode only).
    PageWritten { path: PathBuf },
    /// A category's JSON + HTML pair landed on disk (verbose mode only).
    CategoryWritten { category: String },
    /// One category's aggregation failed; other categories continue.
    CategoryFailed { category: String, cause: String },
}

/// Where build events go. `None` silences reporting entirely (tests).
pub type Reporter = Option<Sender<Event>>;

/// Send an event if a reporter is attached. A disconnected receiver is
/// ignored: reporting must never fail a build.
pub fn emit(reporter: &Reporter, event: Event) {
    if let Some(tx) = reporter {
        let _ = tx.send(event);
    }
}

/// Format one event as a display line.
pub fn format_event(event: &Event) -> String {
    match event {
        Event::PageFailed { id, stage, cause } => {
            format!("Error processing page {id} ({stage}): {cause}")
        }
        Event::NoTemplate { id } => {
            format!("Warning: page {id} has no template assigned")
        }
        Event::PageWritten { path } => {
            format!("Generated: {}", path.display())
        }
        Event::CategoryWritten { category } => {
            format!("Indexed category: {category}")
        }
        Event::CategoryFailed { category, cause } => {
            format!("Error aggregating category {category}: {cause}")
        }
    }
}

/// True for events that should only appear in verbose mode.
pub fn is_verbose_only(event: &Event) -> bool {
    matches!(
        event,
        Event::PageWritten { .. } | Event::CategoryWritten { .. }
    )
}

/// Format the final summary line, printed regardless of how many per-page
/// or per-category errors occurred.
pub fn format_summary(summary: &crate::site::Summary) -> String {
    let mut line = format!(
        "Site generation done: {} pages, {} categories",
        summary.pages_written, summary.categories_written
    );
    if summary.pages_skipped > 0 {
        line.push_str(&format!(", {} skipped", summary.pages_skipped));
    }
    if summary.pages_failed > 0 || summary.categories_failed > 0 {
        line.push_str(&format!(
            ", {} errors",
            summary.pages_failed + summary.categories_failed
        ));
    }
    line.push_str(&format!(" in {} ms", summary.elapsed.as_millis()));
    line
}
