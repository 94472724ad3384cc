//! Per-file transformations used by metadata actions.
//!
//! A [`Transform`] turns `(filename, metadata, body, resources)` into the
//! output text. Built-in transforms:
//!
//! - [`markdown::MarkdownPage`] - Markdown rendered into a named template
//! - [`scss::ScssCompiler`] - style sheets compiled by an external command
//!
//! Embedding code can register any closure with the matching signature.

pub mod markdown;
pub mod scss;

use std::path::Path;

use anyhow::Result;

use crate::action::Metadata;
use crate::core::Resources;

/// Everything a transform may look at.
#[derive(Debug, Clone, Copy)]
pub struct TransformInput<'a> {
    /// File name of the source, e.g. `about.md`.
    pub filename: &'a str,
    /// Full path of the source file.
    pub source: &'a Path,
    /// Parsed metadata block (empty without a delimiter line).
    pub meta: &'a Metadata,
    /// Everything after the delimiter line.
    pub body: &'a str,
    pub resources: &'a Resources,
}

/// Text-to-text transformation shared by every worker thread.
pub trait Transform: Send + Sync {
    fn transform(&self, input: &TransformInput<'_>) -> Result<String>;
}

impl<F> Transform for F
where
    F: Fn(&TransformInput<'_>) -> Result<String> + Send + Sync,
{
    fn transform(&self, input: &TransformInput<'_>) -> Result<String> {
        self(input)
    }
}
