//! Embedded static resources.
//!
//! - `build` - Build-time templates (redirect.html)
//!
//! # Usage
//!
//! ```ignore
//! use embed::build::{REDIRECT_HTML, RedirectVars};
//!
//! let html = REDIRECT_HTML.render(&RedirectVars { new_url: "/new-url/" });
//! ```

use std::marker::PhantomData;

/// Placeholder substitution for one embedded template.
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Embedded template text, rendered only with its own variable set `V`.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _vars: PhantomData<V>,
}

impl<V: TemplateVars> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _vars: PhantomData,
        }
    }

    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

pub mod build {
    use super::{Template, TemplateVars};
    use crate::utils::html::escape;

    /// Variables for redirect.html template.
    pub struct RedirectVars<'a> {
        pub new_url: &'a str,
    }

    impl TemplateVars for RedirectVars<'_> {
        fn apply(&self, content: &str) -> String {
            content.replace("__NEW_URL__", &escape(self.new_url))
        }
    }

    /// Meta-refresh page written for every redirect.
    pub const REDIRECT_HTML: Template<RedirectVars<'static>> =
        Template::new(include_str!("build/redirect.html"));
}

#[cfg(test)]
mod tests {
    use super::build::{REDIRECT_HTML, RedirectVars};

    #[test]
    fn test_redirect_page() {
        let html = REDIRECT_HTML.render(&RedirectVars { new_url: "/bar" });
        assert!(html.contains(r#"<meta http-equiv="refresh" content="0; url=/bar">"#));
        assert!(html.contains(r#"<a href="/bar">/bar</a>"#));
        assert!(!html.contains("__NEW_URL__"));
    }

    #[test]
    fn test_redirect_target_escaped() {
        let html = REDIRECT_HTML.render(&RedirectVars {
            new_url: r#"/search?q="x"&y=1"#,
        });
        assert!(html.contains("/search?q=&quot;x&quot;&amp;y=1"));
    }
}
