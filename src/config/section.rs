//! Configuration sections of `sitebuilder.toml`.
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "src"                # source tree (relative to project root)
//! output = "build"              # destination directory, wiped on every build
//! templates = "templates"       # flat directory of named templates
//! redirects = "redirects.toml"  # old url -> new url mapping
//! jobs = 0                      # worker threads, 0 = available parallelism
//!
//! [actions]
//! ".css" = "copy"               # extension -> handler (copy | markdown | scss)
//!
//! [scss]
//! command = ["sass", "--stdin", "--no-source-map"]
//!
//! [markdown]
//! template = "page.html"
//! ```

use serde::Deserialize;
use std::path::PathBuf;

/// `[build]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Source tree walked for actions.
    pub source: PathBuf,

    /// Destination directory.
    pub output: PathBuf,

    /// Resources directory (templates).
    pub templates: PathBuf,

    /// Redirect declarations file.
    pub redirects: PathBuf,

    /// Worker threads for the action pool; `0` uses available parallelism.
    pub jobs: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: "src".into(),
            output: "build".into(),
            templates: "templates".into(),
            redirects: "redirects.toml".into(),
            jobs: 0,
        }
    }
}

/// Built-in handler names usable in the `[actions]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    /// Plain copy (cancels a built-in default for the extension).
    Copy,
    /// Markdown page rendered through a template.
    Markdown,
    /// Style sheet compiled by an external command.
    Scss,
}

/// `[scss]` section.
///
/// `$SITEBUILDER_*` variables in `command` are substituted per file:
/// `$SITEBUILDER_SOURCE` (the source file), `$SITEBUILDER_SOURCE_DIR` (its
/// directory) and `$SITEBUILDER_ROOT` (the project root).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScssConfig {
    pub command: Vec<String>,
}

impl Default for ScssConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "sass".into(),
                "--stdin".into(),
                "--no-source-map".into(),
                "--load-path=$SITEBUILDER_SOURCE_DIR".into(),
            ],
        }
    }
}

/// `[markdown]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Template used when a page does not name one in its metadata.
    pub template: String,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            template: "page.html".into(),
        }
    }
}
