//! End-to-end build scenarios on temporary sites.

use super::*;
use crate::compiler::TransformInput;
use crate::ledger::LEDGER_HEADER;
use crate::output::MARKER_FILE;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Site {
    dir: TempDir,
}

impl Site {
    fn new() -> Self {
        let site = Self {
            dir: TempDir::new().unwrap(),
        };
        fs::create_dir_all(site.path("src")).unwrap();
        site
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).unwrap()
    }

    fn options(&self) -> BuildOptions {
        BuildOptions::new(SiteConfig::with_root(self.dir.path())).quiet(true)
    }

    fn build(&self) -> Result<BuildReport, BuildError> {
        build(&self.options())
    }
}

/// Relative path -> content of every file under `dir`.
fn snapshot(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files: Vec<_> = jwalk::WalkDir::new(dir)
        .sort(true)
        .skip_hidden(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let path = e.path();
            let content = fs::read(&path).unwrap();
            (path.strip_prefix(dir).unwrap().to_path_buf(), content)
        })
        .collect();
    files.sort();
    files
}

fn upper(input: &TransformInput<'_>) -> anyhow::Result<String> {
    Ok(input.body.to_uppercase())
}

#[test]
fn test_full_build() {
    let site = Site::new();
    site.write("src/style.css", "body {}");
    site.write("src/img/logo.svg", "<svg/>");
    site.write("src/about.md", "title = \"About\"\n---\n# Hello\n");
    site.write("templates/page.html", "<title>{{ title }}</title>{{ content }}");
    site.write("redirects.toml", "\"/old/\" = \"/about/\"\n");

    let report = site.build().unwrap();
    assert_eq!(report.total(), 4);
    assert_eq!(report.failed(), 0);

    assert_eq!(site.read("build/style.css"), "body {}");
    assert_eq!(site.read("build/img/logo.svg"), "<svg/>");
    assert_eq!(
        site.read("build/about/index.html"),
        "<title>About</title><h1>Hello</h1>\n"
    );
    assert!(site.read("build/old/index.html").contains("url=/about/"));
    assert_eq!(site.read(&format!("build/{MARKER_FILE}")), "");

    assert_eq!(
        site.read("urls.txt"),
        format!("{LEDGER_HEADER}\n/about/index.html\n/img/logo.svg\n/old/\n/style.css\n")
    );
}

#[test]
fn test_conflict_aborts_before_any_write() {
    let site = Site::new();
    site.write("src/foo/index.html", "real page");
    site.write("redirects.toml", "\"/foo/index.html\" = \"/baz\"\n");

    match site.build() {
        Err(BuildError::Conflict(conflicts)) => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].url, "/foo/index.html");
            assert_eq!(
                conflicts[0].claimants,
                vec!["copy foo/index.html", "redirect /foo/index.html -> /baz"]
            );
        }
        other => panic!("expected conflict, got {other:?}"),
    }
    assert!(!site.path("build").exists());
    assert!(!site.path("urls.txt").exists());
}

#[test]
fn test_directory_redirect_over_index_page_is_conflict() {
    let site = Site::new();
    site.write("src/foo/index.html", "real page");
    site.write("redirects.toml", "\"/foo/\" = \"/bar\"\n");

    match site.build() {
        Err(BuildError::Conflict(conflicts)) => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].url, "/foo/index.html");
        }
        other => panic!("expected conflict, got {other:?}"),
    }
    assert!(!site.path("build").exists());
}

#[test]
fn test_file_redirect_over_directory_is_conflict() {
    let site = Site::new();
    site.write("src/foo/a.css", "a {}");
    site.write("redirects.toml", "\"/foo\" = \"/bar\"\n");

    match site.build() {
        Err(BuildError::Conflict(conflicts)) => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].url, "/foo");
            assert_eq!(conflicts[0].claimants, vec!["redirect /foo -> /bar", "copy foo/a.css"]);
        }
        other => panic!("expected conflict, got {other:?}"),
    }
    assert!(!site.path("build").exists());
}

#[test]
fn test_conflict_leaves_previous_output_untouched() {
    let site = Site::new();
    site.write("src/a.txt", "a");
    site.build().unwrap();
    let before = snapshot(&site.path("build"));

    site.write("src/b.md", "x");
    site.write("src/b/index.html", "y");
    assert!(matches!(site.build(), Err(BuildError::Conflict(_))));
    assert_eq!(snapshot(&site.path("build")), before);
}

#[test]
fn test_idempotent() {
    let site = Site::new();
    site.write("src/a.txt", "a");
    site.write("src/nested/deep/b.md", "b");
    site.write("redirects.toml", "\"/gone.html\" = \"/a.txt\"\n");

    site.build().unwrap();
    let first = snapshot(&site.path("build"));
    let first_ledger = site.read("urls.txt");

    site.build().unwrap();
    assert_eq!(snapshot(&site.path("build")), first);
    assert_eq!(site.read("urls.txt"), first_ledger);
}

#[test]
fn test_unmarked_destination_survives() {
    let site = Site::new();
    site.write("src/a.txt", "a");
    site.write("build/precious.txt", "keep");

    assert!(matches!(site.build(), Err(BuildError::DestinationSafety(_))));
    assert_eq!(snapshot(&site.path("build")).len(), 1);
    assert_eq!(site.read("build/precious.txt"), "keep");
    assert!(!site.path("urls.txt").exists());
}

#[test]
fn test_destination_file_is_refused() {
    let site = Site::new();
    site.write("src/a.txt", "a");
    site.write("build", "i am a file");
    assert!(matches!(site.build(), Err(BuildError::DestinationSafety(_))));
    assert_eq!(site.read("build"), "i am a file");
}

#[test]
fn test_forgotten_url_keeps_ledger() {
    let site = Site::new();
    site.write("src/old.txt", "old");
    site.write("src/new.txt", "new");
    site.build().unwrap();
    let ledger = site.read("urls.txt");
    assert!(ledger.contains("/old.txt"));

    fs::remove_file(site.path("src/old.txt")).unwrap();
    match site.build() {
        Err(BuildError::ForgottenUrls(forgotten)) => {
            assert_eq!(forgotten, vec![UrlPath::new("/old.txt").unwrap()]);
        }
        other => panic!("expected forgotten urls, got {other:?}"),
    }
    assert_eq!(site.read("urls.txt"), ledger);
    // Outputs of the failed audit stay in place.
    assert_eq!(site.read("build/new.txt"), "new");
}

#[test]
fn test_redirect_rescues_forgotten_url() {
    let site = Site::new();
    site.write("src/old.txt", "old");
    site.build().unwrap();

    fs::remove_file(site.path("src/old.txt")).unwrap();
    site.write("src/new.txt", "new");
    site.write("redirects.toml", "\"/old.txt\" = \"/new.txt\"\n");
    site.build().unwrap();

    assert!(site.read("build/old.txt").contains("url=/new.txt"));
    assert!(site.read("urls.txt").contains("/old.txt\n"));
}

#[test]
fn test_redirect_directory_url() {
    let site = Site::new();
    site.write("redirects.toml", "\"/foo/\" = \"/bar\"\n");

    let report = site.build().unwrap();
    assert!(report.urls.contains("/foo/"));

    let html = site.read("build/foo/index.html");
    assert!(html.contains(r#"<meta http-equiv="refresh" content="0; url=/bar">"#));
    assert_eq!(site.read("urls.txt"), format!("{LEDGER_HEADER}\n/foo/\n"));
}

#[test]
fn test_failure_isolation() {
    let site = Site::new();
    site.write("src/a.up", "aaa");
    site.write("src/b.up", "bbb");
    site.write("src/broken.up", "ccc");
    site.write("src/c.txt", "plain");

    let picky = |input: &TransformInput<'_>| -> anyhow::Result<String> {
        if input.filename == "broken.up" {
            anyhow::bail!("cannot handle {}", input.filename);
        }
        upper(input)
    };
    let options = site.options().handler("up", Handler::page("upper", picky));

    match build(&options) {
        Err(BuildError::ActionsFailed { failed, total }) => {
            assert_eq!(failed, 1);
            assert_eq!(total, 4);
        }
        other => panic!("expected failed actions, got {other:?}"),
    }
    assert_eq!(site.read("build/a/index.html"), "AAA");
    assert_eq!(site.read("build/b/index.html"), "BBB");
    assert_eq!(site.read("build/c.txt"), "plain");
    assert!(!site.path("build/broken/index.html").exists());

    // Failed actions still count as published.
    assert!(site.read("urls.txt").contains("/broken/index.html\n"));
}

#[test]
fn test_panicking_handler_is_isolated() {
    let site = Site::new();
    site.write("src/a.boom", "x");
    site.write("src/b.txt", "ok");

    let boom = |_: &TransformInput<'_>| -> anyhow::Result<String> { panic!("boom") };
    let options = site.options().handler(".boom", Handler::page("boom", boom));

    assert!(matches!(
        build(&options),
        Err(BuildError::ActionsFailed { failed: 1, total: 2 })
    ));
    assert_eq!(site.read("build/b.txt"), "ok");
}

#[test]
fn test_library_handler_overrides_default() {
    let site = Site::new();
    site.write("src/a.md", "hello");

    let options = site.options().handler("md", Handler::extension("upper", "txt", upper));
    build(&options).unwrap();
    assert_eq!(site.read("build/a.txt"), "HELLO");
}

#[test]
fn test_copy_override_disables_default() {
    let site = Site::new();
    site.write("src/readme.md", "# raw");
    build(&site.options().copy("md")).unwrap();
    assert_eq!(site.read("build/readme.md"), "# raw");
}

#[test]
fn test_scss_through_configured_command() {
    let site = Site::new();
    site.write("sitebuilder.toml", "[scss]\ncommand = [\"cat\"]\n");
    site.write("src/css/main.scss", "a { color: red }");

    let config = SiteConfig::load(site.dir.path()).unwrap();
    build(&BuildOptions::new(config).quiet(true)).unwrap();
    assert_eq!(site.read("build/css/main.css"), "a { color: red }");
    assert!(site.read("urls.txt").contains("/css/main.css\n"));
}

#[test]
fn test_invalid_redirects_abort_before_output() {
    let site = Site::new();
    site.write("src/a.txt", "a");
    site.write("redirects.toml", "\"/a\" = 1\n");
    assert!(matches!(site.build(), Err(BuildError::ConfigFormat(_))));
    assert!(!site.path("build").exists());
}

#[test]
fn test_bad_ledger_aborts_before_output() {
    let site = Site::new();
    site.write("src/a.txt", "a");
    site.write("urls.txt", "/a.txt\n");
    assert!(matches!(site.build(), Err(BuildError::Ledger(_))));
    assert!(!site.path("build").exists());
    assert_eq!(site.read("urls.txt"), "/a.txt\n");
}

#[test]
fn test_crlf_ledger_and_metadata() {
    let site = Site::new();
    site.write("src/a.txt", "a");
    site.write("src/about.md", "title = \"About\"\r\ntemplate = \"post.html\"\r\n---\r\n# Hello\r\n");
    site.write("templates/post.html", "<title>{{ title }}</title>");
    site.write("urls.txt", &format!("{LEDGER_HEADER}\r\n/a.txt\r\n"));

    site.build().unwrap();
    assert_eq!(site.read("build/about/index.html"), "<title>About</title>");
    assert_eq!(
        site.read("urls.txt"),
        format!("{LEDGER_HEADER}\n/a.txt\n/about/index.html\n")
    );
}

#[test]
fn test_run_exit_codes() {
    let site = Site::new();
    site.write("src/a.txt", "a");
    assert_eq!(run(&site.options()), 0);

    fs::remove_file(site.path("src/a.txt")).unwrap();
    assert_eq!(run(&site.options()), 1);
}
