//! Site configuration module.
//!
//! Handles loading and validating the optional `config.toml` at the working
//! root. Configuration covers two concerns:
//!
//! - **Layout**: the names of the input/output directories relative to the
//!   working root (`templates/`, `content/`, `blocks/`, `collections/`,
//!   `build/`).
//! - **Concurrency**: the fixed pool sizes and queue capacity of the build
//!   pipeline and the category aggregator. Pool sizes are configuration
//!   constants: they are never derived from the page or category count,
//!   and they affect throughput only, never output content.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [layout]
//! templates_dir = "templates"     # {name}.tpl page templates
//! content_dir = "content"         # one subdirectory per page
//! blocks_dir = "blocks"           # shared {name}.tpl fragments
//! collections_dir = "collections" # category listing template
//! build_dir = "build"             # output directory
//!
//! [pipeline]
//! readers = 2                     # page-path distribution threads
//! processors = 4                  # load/render threads
//! writers = 2                     # output-writing threads
//! queue_capacity = 10             # bounded hand-off queue size
//!
//! [categories]
//! workers = 4                     # category aggregation threads
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want:
//!
//! ```toml
//! # Only raise the processor count
//! [pipeline]
//! processors = 8
//! ```
//!
//! Unknown keys are rejected to catch typos early. A missing `config.toml`
//! means stock defaults; there is no environment-variable configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Input/output directory names, relative to the working root.
    pub layout: LayoutConfig,
    /// Page pipeline pool sizes and queue capacity.
    pub pipeline: PipelineConfig,
    /// Category aggregation pool size.
    pub categories: CategoriesConfig,
}

/// Directory layout relative to the working root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub templates_dir: String,
    pub content_dir: String,
    pub blocks_dir: String,
    pub collections_dir: String,
    pub build_dir: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            templates_dir: "templates".to_string(),
            content_dir: "content".to_string(),
            blocks_dir: "blocks".to_string(),
            collections_dir: "collections".to_string(),
            build_dir: "build".to_string(),
        }
    }
}

/// Pool sizes for the three pipeline stages and the hand-off queue capacity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Threads distributing page paths into the processing stage.
    pub readers: usize,
    /// Threads performing load → template lookup → render.
    pub processors: usize,
    /// Threads draining write tasks into the output directory.
    pub writers: usize,
    /// Capacity of the bounded hand-off queues between stages.
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            readers: 2,
            processors: 4,
            writers: 2,
            queue_capacity: 10,
        }
    }
}

/// Worker pool size for category aggregation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoriesConfig {
    pub workers: usize,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// Load configuration from `config.toml` in the working root.
///
/// Returns stock defaults if the file doesn't exist. A present-but-invalid
/// file is an error: silently ignoring a typoed config would be worse than
/// failing.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join("config.toml");
    if !config_path.exists() {
        return Ok(SiteConfig::default());
    }

    let content = fs::read_to_string(&config_path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Reject zero-sized pools and queues: a zero-capacity stage can never
/// make progress.
fn validate(config: &SiteConfig) -> Result<(), ConfigError> {
    let p = &config.pipeline;
    for (name, value) in [
        ("pipeline.readers", p.readers),
        ("pipeline.processors", p.processors),
        ("pipeline.writers", p.writers),
        ("pipeline.queue_capacity", p.queue_capacity),
        ("categories.workers", config.categories.workers),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!(
                "{name} must be at least 1 (got 0)"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_config_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();

        assert_eq!(config.layout.templates_dir, "templates");
        assert_eq!(config.layout.content_dir, "content");
        assert_eq!(config.layout.blocks_dir, "blocks");
        assert_eq!(config.layout.collections_dir, "collections");
        assert_eq!(config.layout.build_dir, "build");
        assert_eq!(config.pipeline.readers, 2);
        assert_eq!(config.pipeline.processors, 4);
        assert_eq!(config.pipeline.writers, 2);
        assert_eq!(config.pipeline.queue_capacity, 10);
        assert_eq!(config.categories.workers, 4);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[pipeline]\nprocessors = 8\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.pipeline.processors, 8);
        assert_eq!(config.pipeline.readers, 2);
        assert_eq!(config.layout.build_dir, "build");
    }

    #[test]
    fn layout_override() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[layout]\nbuild_dir = \"public\"\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.layout.build_dir, "public");
        assert_eq!(config.layout.content_dir, "content");
    }

    #[test]
    fn unknown_keys_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "procesors = 8\n").unwrap();

        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn zero_pool_size_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[pipeline]\nwriters = 0\n").unwrap();

        let err = load_config(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("pipeline.writers"));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[pipeline\n").unwrap();

        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }
}
