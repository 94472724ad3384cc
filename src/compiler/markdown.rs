//! Markdown pages rendered into a named template.
//!
//! The template comes from [`Resources`](crate::core::Resources): the page's
//! `template` metadata key, else the configured default. Placeholders:
//!
//! - `{{ content }}` - rendered body, inserted as HTML
//! - `{{ <key> }}` - metadata value, HTML-escaped
//!
//! Unknown placeholders render as nothing.

use std::sync::OnceLock;

use anyhow::{Result, anyhow};
use pulldown_cmark::{Options, Parser, html};
use regex::{Captures, Regex};

use super::{Transform, TransformInput};
use crate::action::Metadata;
use crate::utils::html::escape;

/// Metadata key selecting the template.
const TEMPLATE_KEY: &str = "template";

/// Placeholder replaced by the rendered body.
const CONTENT_KEY: &str = "content";

/// Markdown-to-HTML page transform.
#[derive(Debug, Clone)]
pub struct MarkdownPage {
    default_template: String,
}

impl MarkdownPage {
    pub fn new(default_template: impl Into<String>) -> Self {
        Self {
            default_template: default_template.into(),
        }
    }
}

impl Transform for MarkdownPage {
    fn transform(&self, input: &TransformInput<'_>) -> Result<String> {
        let content = render_markdown(input.body);

        if let Some(name) = input.meta.get(TEMPLATE_KEY) {
            let template = input
                .resources
                .template(name)
                .ok_or_else(|| anyhow!("template `{name}` not found"))?;
            return fill_template(template, &content, input.meta);
        }

        match input.resources.template(&self.default_template) {
            Some(template) => fill_template(template, &content, input.meta),
            None => {
                crate::debug!("markdown"; "no template `{}` for {}, emitting bare html",
                    self.default_template, input.filename);
                Ok(content)
            }
        }
    }
}

/// Render Markdown with tables, footnotes, strikethrough, task lists and
/// heading attributes enabled.
pub fn render_markdown(body: &str) -> String {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_FOOTNOTES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);

    let mut out = String::with_capacity(body.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(body, opts));
    out
}

/// Substitute `{{ key }}` placeholders.
///
/// Keys may be padded with spaces and tabs only.
pub fn fill_template(template: &str, content: &str, meta: &Metadata) -> Result<String> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    let re = RE
        .get_or_init(|| Regex::new(r"\{\{[ \t]*([A-Za-z0-9_.-]+)[ \t]*\}\}"))
        .as_ref()
        .map_err(Clone::clone)?;

    Ok(re
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            CONTENT_KEY => content.to_string(),
            key => meta
                .get(key)
                .map(|value| escape(value).into_owned())
                .unwrap_or_default(),
        })
        .into_owned())
}
