//! Outcome of running one action.

use std::fmt;

use owo_colors::{OwoColorize, Stream};

/// Success flag, warnings and source/destination descriptors of one action.
///
/// Built once per action; a failure adds exactly one warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    success: bool,
    warnings: Vec<String>,
    src: String,
    dest: String,
}

impl ActionResult {
    /// Successful result with no warnings.
    pub fn ok(src: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            success: true,
            warnings: Vec::new(),
            src: src.into(),
            dest: dest.into(),
        }
    }

    /// Mark as failed, recording the rendered error.
    pub fn failed(mut self, warning: impl Into<String>) -> Self {
        self.success = false;
        self.warnings.push(warning.into());
        self
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn dest(&self) -> &str {
        &self.dest
    }
}

impl fmt::Display for ActionResult {
    /// `  OK src/a.md -> build/a/index.html` or `FAIL ...`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            write!(f, "  {}", "OK".if_supports_color(Stream::Stdout, |t| t.green()))?;
        } else {
            write!(f, "{}", "FAIL".if_supports_color(Stream::Stdout, |t| t.red()))?;
        }
        write!(
            f,
            " {} -> {}",
            self.src.if_supports_color(Stream::Stdout, |t| t.dimmed()),
            self.dest.if_supports_color(Stream::Stdout, |t| t.dimmed())
        )
    }
}
