//! # curly
//!
//! A minimal static site generator driven by flat files: per-page attribute
//! directories become rendered HTML pages, plus a JSON index and an HTML
//! listing per category. The only templating construct is the `{name}`
//! placeholder.
//!
//! # Architecture: One Concurrent Pass
//!
//! A build is a single pass over the content tree, structured as a staged
//! pipeline with fixed-size worker pools:
//!
//! ```text
//! blocks/   ──(load once, read-only)──────────────┐
//! content/  → readers → processors → writers → build/<id>.html
//!                            │
//!                            └── collected {id, category, title}
//!                                    → category pool → build/<cat>.{json,html}
//! ```
//!
//! Blocks load first, single-threaded; the pipeline then drives every page
//! through load → render → persist concurrently; after it drains, the
//! category aggregator fans the collected records out to its own pool.
//! Pool sizes are fixed configuration, independent of corpus size, and
//! affect throughput only: never which files are produced or what they
//! contain.
//!
//! # Value Precedence
//!
//! A page renders against a layered value set, listed weakest first:
//!
//! 1. **Template defaults**: every placeholder a template mentions gets an
//!    empty-string default, filling only keys nothing else supplied.
//! 2. **Page attributes**: `<attr>.val` files in the page directory.
//! 3. **Blocks**: `blocks/<name>.tpl` fragments, unconditionally
//!    overwriting same-named page attributes.
//!
//! Placeholders with no value in any layer pass through verbatim.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`blocks`] | Shared fragments: load once, self-reference check, read-only snapshot |
//! | [`template`] | Page template loading and placeholder extraction (no cache) |
//! | [`page`] | One content directory → one [`page::PageRecord`] |
//! | [`render`] | The pure `{name}` substitution engine |
//! | [`pipeline`] | The bounded three-stage page pipeline |
//! | [`categories`] | Category grouping and index/listing fan-out |
//! | [`sink`] | Output-directory write surface |
//! | [`site`] | Orchestration: preconditions → blocks → pipeline → aggregation |
//! | [`report`] | Structured build events and their CLI formatting |
//! | [`config`] | `config.toml` loading: layout names, pool sizes |
//! | [`seed`] | Demo corpus generator behind `curly seed` |
//!
//! # Design Decisions
//!
//! ## Channels, Not a Parallel Iterator
//!
//! The stages do different kinds of work (path distribution, CPU-ish
//! rendering, disk writes) at different widths, and every queue between
//! them is bounded. Explicit pools over crossbeam channels express that
//! directly; stage shutdown is just sender-drop, so the
//! all-reads-before-render-close, all-renders-before-write-close ordering
//! falls out of channel disconnection.
//!
//! ## No Mid-Run Abort
//!
//! There is no cancellation path. A run either fails a fatal precondition
//! (missing top-level directory, self-referencing block) before touching
//! any page, or it proceeds to completion, dropping individual pages and
//! categories as their errors surface. The exit status does not
//! distinguish "clean" from "completed with drops".
//!
//! ## Deterministic Artifacts
//!
//! Rendering is a single left-to-right pass with no map-iteration-order
//! dependence, and category entries are sorted before serialization, so a
//! fixed corpus produces byte-identical output regardless of pool sizing
//! or scheduling.

pub mod blocks;
pub mod categories;
pub mod config;
pub mod page;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod seed;
pub mod sink;
pub mod site;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
