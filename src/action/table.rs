//! Extension -> handler table.
//!
//! Built-in defaults (`scss`, `md`) are layered under overrides from
//! `sitebuilder.toml` and from embedding code. An override mapping an
//! extension to plain copy cancels the default for it.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::compiler::Transform;
use crate::compiler::markdown::MarkdownPage;
use crate::compiler::scss::ScssCompiler;
use crate::config::{HandlerKind, SiteConfig};

/// Where a transformed file lands, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `a/b.md` -> `a/b/index.html`
    Page,
    /// `a/b.scss` -> `a/b.css`
    Extension(String),
}

impl Route {
    pub fn dest_path(&self, relative: &Path) -> PathBuf {
        match self {
            Self::Page => relative.with_extension("").join("index.html"),
            Self::Extension(ext) => relative.with_extension(ext),
        }
    }
}

/// Named transform plus its routing.
#[derive(Clone)]
pub struct Handler {
    name: Arc<str>,
    route: Route,
    transform: Arc<dyn Transform>,
}

impl Handler {
    pub fn new(name: &str, route: Route, transform: impl Transform + 'static) -> Self {
        Self {
            name: Arc::from(name),
            route,
            transform: Arc::new(transform),
        }
    }

    /// Handler publishing `<name>/index.html`.
    pub fn page(name: &str, transform: impl Transform + 'static) -> Self {
        Self::new(name, Route::Page, transform)
    }

    /// Handler publishing the source path with its extension replaced.
    pub fn extension(name: &str, ext: &str, transform: impl Transform + 'static) -> Self {
        Self::new(name, Route::Extension(normalize_ext(ext).to_string()), transform)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn transform(&self) -> &dyn Transform {
        self.transform.as_ref()
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("route", &self.route)
            .finish_non_exhaustive()
    }
}

/// Extension (without dot) -> handler, `None` meaning plain copy.
#[derive(Debug, Clone, Default)]
pub struct ActionTable {
    entries: BTreeMap<String, Option<Handler>>,
}

impl ActionTable {
    /// Empty table: every file is copied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in handlers configured from `config`.
    pub fn builtin(config: &SiteConfig) -> Self {
        let mut table = Self::new();
        table.set("scss", builtin_handler(HandlerKind::Scss, config));
        table.set("md", builtin_handler(HandlerKind::Markdown, config));
        table
    }

    /// Built-ins with the `[actions]` overrides of `config` on top.
    pub fn from_config(config: &SiteConfig) -> Self {
        let mut overrides = Self::new();
        for (ext, kind) in &config.actions {
            overrides.set(ext, builtin_handler(*kind, config));
        }
        Self::builtin(config).layered(overrides)
    }

    /// Route files with extension `ext` through `handler`.
    pub fn insert(&mut self, ext: &str, handler: Handler) {
        self.set(ext, Some(handler));
    }

    /// Copy files with extension `ext` verbatim.
    pub fn copy(&mut self, ext: &str) {
        self.set(ext, None);
    }

    fn set(&mut self, ext: &str, handler: Option<Handler>) {
        self.entries.insert(normalize_ext(ext).to_string(), handler);
    }

    /// This table with every entry of `overrides` replacing its own.
    pub fn layered(mut self, overrides: Self) -> Self {
        self.entries.extend(overrides.entries);
        self
    }

    /// Handler for `path`, or `None` when it should be copied.
    pub fn lookup(&self, path: &Path) -> Option<&Handler> {
        let ext = path.extension()?.to_str()?;
        self.entries.get(ext)?.as_ref()
    }

    /// Extensions with a transform, for logging.
    pub fn transformed_extensions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(ext, h)| h.as_ref().map(|h| (ext.as_str(), h.name())))
    }
}

/// Handler for a `[actions]` name; `None` for plain copy.
fn builtin_handler(kind: HandlerKind, config: &SiteConfig) -> Option<Handler> {
    match kind {
        HandlerKind::Copy => None,
        HandlerKind::Scss => Some(Handler::extension(
            "scss",
            "css",
            ScssCompiler::new(config.scss.command.clone(), config.get_root()),
        )),
        HandlerKind::Markdown => Some(Handler::page(
            "markdown",
            MarkdownPage::new(config.markdown.template.clone()),
        )),
    }
}

/// `.scss` and `scss` name the same extension.
fn normalize_ext(ext: &str) -> &str {
    ext.trim_start_matches('.')
}
