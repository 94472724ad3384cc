//! Build actions.
//!
//! # Module Structure
//!
//! ```text
//! action/
//! ├── meta.rs    # Metadata block parsing
//! ├── result.rs  # ActionResult
//! ├── table.rs   # Handler, Route, ActionTable
//! └── mod.rs     # Action (this file)
//! ```
//!
//! Every action knows the URL it publishes without touching the filesystem,
//! so conflicts can be found before anything is written.

mod meta;
mod result;
mod table;

pub use meta::{META_DELIMITER, Metadata, split_front_matter};
pub use result::ActionResult;
pub use table::{ActionTable, Handler, Route};

use std::any::Any;
use std::fmt;
use std::fs;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::compiler::TransformInput;
use crate::core::{Resources, UrlPath};
use crate::embed::build::{REDIRECT_HTML, RedirectVars};

/// Source descriptor of generated redirect pages.
const REDIRECT_SOURCE: &str = "(generated-redirect)";

/// One unit of build work.
#[derive(Debug, Clone)]
pub enum Action {
    /// Copy `source` to the same relative path in the output.
    Copy { source: PathBuf, relative: PathBuf },

    /// Split `source` into metadata and body and run it through `handler`.
    MetadataTransform {
        source: PathBuf,
        relative: PathBuf,
        handler: Handler,
    },

    /// Meta-refresh page at `old_url` pointing to `new_url`.
    Redirect { old_url: UrlPath, new_url: String },
}

/// Shared, read-only inputs of a batch of actions.
#[derive(Debug, Clone, Copy)]
pub struct ExecContext<'a> {
    pub source_dir: &'a Path,
    pub dest_dir: &'a Path,
    pub resources: &'a Resources,
}

impl ExecContext<'_> {
    fn source_label(&self, relative: &Path) -> String {
        label(self.source_dir, relative)
    }

    fn dest_label(&self, relative: &Path) -> String {
        label(self.dest_dir, relative)
    }
}

/// `build` + `a/index.html` -> `build/a/index.html`
fn label(dir: &Path, relative: &Path) -> String {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    format!("{}/{}", name, relative.display())
}

impl Action {
    /// Output path relative to the destination directory.
    pub fn dest_path(&self) -> PathBuf {
        match self {
            Self::Copy { relative, .. } => relative.clone(),
            Self::MetadataTransform {
                relative, handler, ..
            } => handler.route().dest_path(relative),
            Self::Redirect { old_url, .. } => old_url.to_file_path(),
        }
    }

    /// URL this action publishes.
    pub fn url(&self) -> UrlPath {
        match self {
            Self::Redirect { old_url, .. } => old_url.clone(),
            _ => UrlPath::from_relative(&self.dest_path()),
        }
    }

    /// Run the action. Errors and panics become a failed result.
    pub fn run(&self, ctx: &ExecContext<'_>) -> ActionResult {
        let dest_rel = self.dest_path();
        let src = match self {
            Self::Copy { relative, .. } | Self::MetadataTransform { relative, .. } => {
                ctx.source_label(relative)
            }
            Self::Redirect { .. } => REDIRECT_SOURCE.to_string(),
        };
        let result = ActionResult::ok(src, ctx.dest_label(&dest_rel));
        let dest = ctx.dest_dir.join(&dest_rel);

        match catch_unwind(AssertUnwindSafe(|| self.execute(ctx, &dest))) {
            Ok(Ok(())) => result,
            Ok(Err(err)) => {
                crate::debug!("action"; "{} failed: {:?}", result.src(), err);
                result.failed(format!("{err:#}"))
            }
            Err(payload) => result.failed(format!("panicked: {}", panic_message(&*payload))),
        }
    }

    fn execute(&self, ctx: &ExecContext<'_>, dest: &Path) -> Result<()> {
        if let Self::Redirect { old_url, .. } = self
            && old_url.has_dot_segments()
        {
            bail!("redirect source {old_url} contains `.` or `..` segments");
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        match self {
            Self::Copy { source, .. } => {
                fs::copy(source, dest)
                    .with_context(|| format!("Failed to copy {}", source.display()))?;
            }
            Self::MetadataTransform {
                source, handler, ..
            } => {
                let text = fs::read_to_string(source)
                    .with_context(|| format!("Failed to read {}", source.display()))?;
                let (meta, body) = split_front_matter(&text)
                    .with_context(|| format!("Invalid metadata in {}", source.display()))?;
                let filename = source
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .unwrap_or_default();

                let output = handler
                    .transform()
                    .transform(&TransformInput {
                        filename: &filename,
                        source,
                        meta: &meta,
                        body,
                        resources: ctx.resources,
                    })
                    .with_context(|| format!("{} handler failed", handler.name()))?;

                fs::write(dest, output)
                    .with_context(|| format!("Failed to write {}", dest.display()))?;
            }
            Self::Redirect { new_url, .. } => {
                let html = REDIRECT_HTML.render(&RedirectVars { new_url });
                fs::write(dest, html)
                    .with_context(|| format!("Failed to write {}", dest.display()))?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Action {
    /// Claimant descriptor used in conflict reports.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy { relative, .. } => write!(f, "copy {}", relative.display()),
            Self::MetadataTransform {
                relative, handler, ..
            } => write!(f, "{} {}", handler.name(), relative.display()),
            Self::Redirect { old_url, new_url } => write!(f, "redirect {old_url} -> {new_url}"),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn copy(relative: &str) -> Action {
        Action::Copy {
            source: Path::new("/site/src").join(relative),
            relative: relative.into(),
        }
    }

    fn redirect(old: &str, new: &str) -> Action {
        Action::Redirect {
            old_url: UrlPath::new(old).unwrap(),
            new_url: new.into(),
        }
    }

    fn transform(relative: &str, handler: Handler) -> Action {
        Action::MetadataTransform {
            source: Path::new("/site/src").join(relative),
            relative: relative.into(),
            handler,
        }
    }

    fn echo(input: &TransformInput<'_>) -> Result<String> {
        Ok(format!("{}|{}", input.filename, input.body))
    }

    #[test]
    fn test_urls_without_filesystem() {
        assert_eq!(copy("css/site.css").url(), "/css/site.css");
        assert_eq!(transform("about.md", Handler::page("md", echo)).url(), "/about/index.html");
        assert_eq!(
            transform("css/main.scss", Handler::extension("scss", "css", echo)).url(),
            "/css/main.css"
        );
        assert_eq!(redirect("/foo/", "/bar").url(), "/foo/");
        assert_eq!(redirect("/old.html", "/new/").url(), "/old.html");
    }

    #[test]
    fn test_redirect_dest_path() {
        assert_eq!(redirect("/foo/", "/bar").dest_path(), PathBuf::from("foo/index.html"));
        assert_eq!(redirect("/a/b.html", "/c").dest_path(), PathBuf::from("a/b.html"));
    }

    #[test]
    fn test_descriptors() {
        assert_eq!(copy("a.css").to_string(), "copy a.css");
        assert_eq!(redirect("/a", "/b").to_string(), "redirect /a -> /b");
    }

    fn dirs() -> (TempDir, PathBuf, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let build = tmp.path().join("build");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&build).unwrap();
        (tmp, src, build)
    }

    #[test]
    fn test_run_copy_creates_parents() {
        let (_tmp, src, build) = dirs();
        fs::create_dir_all(src.join("img")).unwrap();
        fs::write(src.join("img/a.png"), [1u8, 2, 3]).unwrap();
        let resources = Resources::default();
        let ctx = ExecContext {
            source_dir: &src,
            dest_dir: &build,
            resources: &resources,
        };

        let action = Action::Copy {
            source: src.join("img/a.png"),
            relative: "img/a.png".into(),
        };
        let result = action.run(&ctx);
        assert!(result.success());
        assert_eq!(result.src(), "src/img/a.png");
        assert_eq!(result.dest(), "build/img/a.png");
        assert_eq!(fs::read(build.join("img/a.png")).unwrap(), [1, 2, 3]);
    }

    #[test]
    fn test_run_transform_splits_metadata() {
        let (_tmp, src, build) = dirs();
        fs::write(src.join("about.md"), "title = \"x\"\n---\nbody\n").unwrap();
        let resources = Resources::default();
        let ctx = ExecContext {
            source_dir: &src,
            dest_dir: &build,
            resources: &resources,
        };

        let action = Action::MetadataTransform {
            source: src.join("about.md"),
            relative: "about.md".into(),
            handler: Handler::page("echo", echo),
        };
        let result = action.run(&ctx);
        assert!(result.success(), "{:?}", result.warnings());
        assert_eq!(
            fs::read_to_string(build.join("about/index.html")).unwrap(),
            "about.md|body\n"
        );
    }

    #[test]
    fn test_run_redirect() {
        let (_tmp, src, build) = dirs();
        let resources = Resources::default();
        let ctx = ExecContext {
            source_dir: &src,
            dest_dir: &build,
            resources: &resources,
        };

        let result = redirect("/foo/", "/bar").run(&ctx);
        assert!(result.success());
        assert_eq!(result.src(), "(generated-redirect)");
        assert_eq!(result.dest(), "build/foo/index.html");
        let html = fs::read_to_string(build.join("foo/index.html")).unwrap();
        assert!(html.contains("url=/bar"));
    }

    #[test]
    fn test_error_becomes_failed_result() {
        let (_tmp, src, build) = dirs();
        fs::write(src.join("bad.md"), "x").unwrap();
        let resources = Resources::default();
        let ctx = ExecContext {
            source_dir: &src,
            dest_dir: &build,
            resources: &resources,
        };

        let failing = |_: &TransformInput<'_>| -> Result<String> { bail!("cannot render") };
        let action = Action::MetadataTransform {
            source: src.join("bad.md"),
            relative: "bad.md".into(),
            handler: Handler::page("broken", failing),
        };
        let result = action.run(&ctx);
        assert!(!result.success());
        assert_eq!(result.warnings().len(), 1);
        assert!(result.warnings()[0].contains("cannot render"));
    }

    #[test]
    fn test_panic_becomes_failed_result() {
        let (_tmp, src, build) = dirs();
        fs::write(src.join("p.md"), "x").unwrap();
        let resources = Resources::default();
        let ctx = ExecContext {
            source_dir: &src,
            dest_dir: &build,
            resources: &resources,
        };

        let panicking = |_: &TransformInput<'_>| -> Result<String> { panic!("handler exploded") };
        let action = Action::MetadataTransform {
            source: src.join("p.md"),
            relative: "p.md".into(),
            handler: Handler::page("panics", panicking),
        };
        let result = action.run(&ctx);
        assert!(!result.success());
        assert!(result.warnings()[0].contains("handler exploded"));
    }

    #[test]
    fn test_missing_source_fails() {
        let (_tmp, src, build) = dirs();
        let resources = Resources::default();
        let ctx = ExecContext {
            source_dir: &src,
            dest_dir: &build,
            resources: &resources,
        };
        let result = Action::Copy {
            source: src.join("gone.txt"),
            relative: "gone.txt".into(),
        }
        .run(&ctx);
        assert!(!result.success());
    }
}
