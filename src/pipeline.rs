//! Concurrent page-processing pipeline.
//!
//! Drives the full page set through three bounded worker pools connected by
//! bounded channels:
//!
//! ```text
//! page paths → [readers] → [processors] → [writers] → build/<id>.html
//!                               │
//!                               └────────────────────→ collected records
//! ```
//!
//! - **Readers** distribute page paths into the processing queue.
//! - **Processors** load the page record, load its template (fresh read per
//!   page, no cache), fill template defaults, render, and hand a complete
//!   payload to the write queue.
//! - **Writers** persist payloads through the [`Sink`] and, on success,
//!   emit one [`CollectedRecord`] per page for category aggregation.
//!
//! ## Stage Closing
//!
//! Each stage's sending side is owned exclusively by the stage feeding it,
//! so channel disconnection *is* the happens-before edge: the processing
//! queue disconnects only once every reader has finished, the write queue
//! only once every processor has finished, and the collected-record queue
//! only once every writer has finished. No barriers, no counters: dropping
//! the last `Sender` closes the stage.
//!
//! Collection never blocks on dropped pages: the record channel is drained
//! after disconnect, so a corpus where every page is skipped still
//! completes. Pool sizes come from [`PipelineConfig`] and are independent
//! of the page count; they affect throughput only, never which files are
//! produced or what they contain.
//!
//! ## Failure Policy
//!
//! Any per-page error (load, template lookup, write) is reported with the
//! page id and stage, the page is dropped, and the run continues. A page
//! with no template is a notice, not an error. A page that completes all
//! stages produces exactly one output file and exactly one collected
//! record; nothing is written before a fully rendered payload exists.

use crate::blocks::BlockSet;
use crate::config::PipelineConfig;
use crate::page::PageRecord;
use crate::render;
use crate::report::{self, Event, Reporter, Stage};
use crate::sink::Sink;
use crate::template::Template;
use crossbeam_channel::{Receiver, Sender, bounded};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// The per-page summary that survives the pipeline, consumed by category
/// aggregation. Everything else about the page is discarded after render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedRecord {
    pub id: String,
    pub category: Option<String>,
    pub title: String,
}

/// A fully rendered payload awaiting persistence, plus the record to
/// collect once the write succeeds.
struct WriteTask {
    path: PathBuf,
    payload: Vec<u8>,
    record: CollectedRecord,
}

/// Counters and collected records from one pipeline run.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub collected: Vec<CollectedRecord>,
    pub pages_written: usize,
    pub pages_failed: usize,
    pub pages_skipped: usize,
}

/// Run the pipeline over `pages` (one path per page directory).
pub fn run(
    pages: &[PathBuf],
    templates_dir: &Path,
    blocks: &BlockSet,
    sink: &Sink,
    config: &PipelineConfig,
    reporter: &Reporter,
) -> PipelineOutcome {
    let cap = config.queue_capacity.max(1);

    // Seed queue: pre-filled with every page path, closed before any worker
    // starts. Readers drain it concurrently.
    let (seed_tx, seed_rx) = bounded::<PathBuf>(pages.len().max(1));
    for page in pages {
        // Capacity covers the full set and the receiver is alive, so this
        // never blocks or fails.
        let _ = seed_tx.send(page.clone());
    }
    drop(seed_tx);

    let (path_tx, path_rx) = bounded::<PathBuf>(cap);
    let (write_tx, write_rx) = bounded::<WriteTask>(cap);
    // Sized for the whole corpus so writers never block on collection.
    let (record_tx, record_rx) = bounded::<CollectedRecord>(pages.len().max(1));

    let written = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);

    thread::scope(|s| {
        for _ in 0..config.readers.max(1) {
            let seed_rx = seed_rx.clone();
            let path_tx = path_tx.clone();
            s.spawn(move || {
                for page_path in seed_rx {
                    if path_tx.send(page_path).is_err() {
                        break;
                    }
                }
            });
        }

        for _ in 0..config.processors.max(1) {
            let path_rx = path_rx.clone();
            let write_tx = write_tx.clone();
            let reporter = reporter.clone();
            let (failed, skipped) = (&failed, &skipped);
            s.spawn(move || {
                process_worker(
                    path_rx, write_tx, templates_dir, blocks, sink, &reporter, failed, skipped,
                );
            });
        }

        for _ in 0..config.writers.max(1) {
            let write_rx = write_rx.clone();
            let record_tx = record_tx.clone();
            let reporter = reporter.clone();
            let (written, failed) = (&written, &failed);
            s.spawn(move || {
                write_worker(write_rx, record_tx, sink, &reporter, written, failed);
            });
        }

        // The workers hold their own clones; dropping ours lets each stage
        // disconnect as soon as its feeding stage finishes.
        drop(seed_rx);
        drop(path_tx);
        drop(path_rx);
        drop(write_tx);
        drop(write_rx);
        drop(record_tx);
    });

    // Every thread has joined and every sender is gone; what's buffered is
    // the complete collected set.
    let collected: Vec<CollectedRecord> = record_rx.try_iter().collect();

    PipelineOutcome {
        collected,
        pages_written: written.into_inner(),
        pages_failed: failed.into_inner(),
        pages_skipped: skipped.into_inner(),
    }
}

#[allow(clippy::too_many_arguments)]
fn process_worker(
    path_rx: Receiver<PathBuf>,
    write_tx: Sender<WriteTask>,
    templates_dir: &Path,
    blocks: &BlockSet,
    sink: &Sink,
    reporter: &Reporter,
    failed: &AtomicUsize,
    skipped: &AtomicUsize,
) {
    for page_path in path_rx {
        let id = page_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let record = match PageRecord::load(&page_path, blocks) {
            Ok(record) => record,
            Err(e) => {
                failed.fetch_add(1, Ordering::Relaxed);
                report::emit(
                    reporter,
                    Event::PageFailed {
                        id,
                        stage: Stage::Load,
                        cause: e.to_string(),
                    },
                );
                continue;
            }
        };

        let Some(template_name) = record.template_name.as_deref() else {
            skipped.fetch_add(1, Ordering::Relaxed);
            report::emit(reporter, Event::NoTemplate { id: record.id });
            continue;
        };

        let template = match Template::load(templates_dir, template_name) {
            Ok(template) => template,
            Err(e) => {
                failed.fetch_add(1, Ordering::Relaxed);
                report::emit(
                    reporter,
                    Event::PageFailed {
                        id: record.id,
                        stage: Stage::Template,
                        cause: e.to_string(),
                    },
                );
                continue;
            }
        };

        // Precedence: page attributes were already overwritten by blocks at
        // load; template defaults now fill only the keys still absent.
        let mut values = record.attributes;
        template.fill_defaults(&mut values);
        let output = render::render(&template.raw, &values);

        let collected = CollectedRecord {
            id: record.id.clone(),
            category: record.category,
            title: values.get("title").cloned().unwrap_or_default(),
        };
        let task = WriteTask {
            path: sink.page_path(&record.id),
            payload: output.into_bytes(),
            record: collected,
        };
        if write_tx.send(task).is_err() {
            break;
        }
    }
}

fn write_worker(
    write_rx: Receiver<WriteTask>,
    record_tx: Sender<CollectedRecord>,
    sink: &Sink,
    reporter: &Reporter,
    written: &AtomicUsize,
    failed: &AtomicUsize,
) {
    for task in write_rx {
        match sink.write(&task.path, &task.payload) {
            Ok(()) => {
                written.fetch_add(1, Ordering::Relaxed);
                report::emit(reporter, Event::PageWritten { path: task.path });
                let _ = record_tx.send(task.record);
            }
            Err(e) => {
                failed.fetch_add(1, Ordering::Relaxed);
                report::emit(
                    reporter,
                    Event::PageFailed {
                        id: task.record.id,
                        stage: Stage::Write,
                        cause: e.to_string(),
                    },
                );
            }
        }
    }
}
