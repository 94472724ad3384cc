//! URL path type for type-safe URL accounting.
//!
//! A [`UrlPath`] is the identity used for conflict detection and the URL
//! ledger. Unlike browser-facing URLs it is never normalized: `/a/` and `/a`
//! are two different published URLs.

use std::borrow::Borrow;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

/// Rejected URL path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("url path must be absolute: {0:?}")]
pub struct UrlPathError(pub String);

/// Absolute URL path
///
/// Invariants:
/// - Always starts with `/`
/// - Stored verbatim (no trailing slash, case or percent normalization)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UrlPath(Arc<str>);

impl UrlPath {
    /// Validate and wrap an absolute path.
    pub fn new(path: impl AsRef<str>) -> Result<Self, UrlPathError> {
        let path = path.as_ref();
        if !path.starts_with('/') {
            return Err(UrlPathError(path.to_string()));
        }
        Ok(Self(Arc::from(path)))
    }

    /// URL of a file at `relative` inside the output root.
    ///
    /// `posts/a/index.html` -> `/posts/a/index.html`. Components are joined
    /// with `/` regardless of platform.
    pub fn from_relative(relative: &Path) -> Self {
        let mut url = String::new();
        for component in relative.components() {
            if let Component::Normal(s) = component {
                url.push('/');
                url.push_str(&s.to_string_lossy());
            }
        }
        if url.is_empty() {
            url.push('/');
        }
        Self(Arc::from(url))
    }

    /// Get the URL path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is a directory URL (ends with `/`).
    #[inline]
    pub fn is_dir_url(&self) -> bool {
        self.0.ends_with('/')
    }

    /// Check for `.` or `..` segments, which would escape a path join.
    pub fn has_dot_segments(&self) -> bool {
        self.0.split('/').any(|s| s == "." || s == "..")
    }

    /// File path (relative to the output root) that serves this URL.
    ///
    /// `/foo/` -> `foo/index.html`, `/foo.html` -> `foo.html`, `/` -> `index.html`
    pub fn to_file_path(&self) -> PathBuf {
        let mut path: PathBuf = self
            .0
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        if self.is_dir_url() {
            path.push("index.html");
        }
        path
    }
}

impl std::fmt::Display for UrlPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UrlPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for UrlPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UrlPath {
    type Error = UrlPathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for UrlPath {
    type Error = UrlPathError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl std::str::FromStr for UrlPath {
    type Err = UrlPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl PartialEq<str> for UrlPath {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for UrlPath {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}
