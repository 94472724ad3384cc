//! Project configuration from the optional `sitebuilder.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── error.rs    # ConfigError
//! ├── section.rs  # [build], [scss], [markdown] and handler names
//! └── mod.rs      # SiteConfig (this file), project root discovery
//! ```
//!
//! Every path in the file is relative to the project root, which is the
//! directory given with `--root`, else the enclosing git work tree, else the
//! current directory.

mod error;
mod section;

pub use error::ConfigError;
pub use section::{BuildConfig, HandlerKind, MarkdownConfig, ScssConfig};

use crate::log;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Config file name, looked up in the project root.
pub const CONFIG_FILE: &str = "sitebuilder.toml";

/// Ledger file name, always in the project root.
pub const LEDGER_FILE: &str = "urls.txt";

/// Root configuration structure representing sitebuilder.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Project root directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Build paths and parallelism
    pub build: BuildConfig,

    /// Extension overrides, layered over the built-in handlers
    pub actions: BTreeMap<String, HandlerKind>,

    /// Style sheet compiler
    pub scss: ScssConfig,

    /// Markdown pages
    pub markdown: MarkdownConfig,
}

impl SiteConfig {
    /// Default configuration rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load `sitebuilder.toml` from `root`, falling back to defaults when the
    /// file does not exist.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            crate::debug!("config"; "no {}, using defaults", CONFIG_FILE);
            return Ok(Self::with_root(root));
        }

        let content = fs::read_to_string(&path).map_err(|err| ConfigError::Io(path.clone(), err))?;
        let (mut config, ignored) =
            Self::parse_with_ignored(&content).map_err(|err| ConfigError::Toml(path.clone(), err))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored);
        }

        config.root = root.to_path_buf();
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), toml::de::Error> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String]) {
        log!("warning"; "unknown fields in {}, ignoring:", CONFIG_FILE);
        for field in fields {
            log!("warning"; "- {}", field);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root_join(&self.build.source)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root_join(&self.build.output)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root_join(&self.build.templates)
    }

    pub fn redirects_path(&self) -> PathBuf {
        self.root_join(&self.build.redirects)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.root_join(LEDGER_FILE)
    }

    /// Worker count for the action pool.
    pub fn jobs(&self) -> usize {
        if self.build.jobs > 0 {
            return self.build.jobs;
        }
        std::thread::available_parallelism()
            .map(usize::from)
            .unwrap_or(1)
    }
}

/// Determine the project root.
///
/// An explicit root is tilde-expanded and made absolute. Otherwise the work
/// tree of the git repository containing the current directory is used, and
/// failing that (no repository, or a bare one) the current directory itself.
pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir().map_err(|e| ConfigError::Root(e.to_string()))?;
    Ok(resolve_root_in(&cwd, explicit))
}

fn resolve_root_in(cwd: &Path, explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        return cwd.join(expanded);
    }

    match gix::discover(cwd) {
        Ok(repo) => match repo.workdir() {
            Some(workdir) => cwd.join(workdir),
            None => {
                crate::debug!("config"; "bare repository at {}, using current directory",
                    repo.git_dir().display());
                cwd.to_path_buf()
            }
        },
        Err(e) => {
            crate::debug!("config"; "no git repository ({}), using current directory", e);
            cwd.to_path_buf()
        }
    }
}
