//! sitebuilder - build a static site from a source tree.
//!
//! Every source file becomes one action (copy or transform), every entry of
//! `redirects.toml` a redirect page. URLs claimed by the actions are checked
//! for conflicts before the output directory is touched, and compared with
//! `urls.txt` afterwards so that no published URL silently disappears.
//!
//! ```ignore
//! use sitebuilder::{BuildOptions, Handler, SiteConfig, build};
//!
//! let config = SiteConfig::load(root)?;
//! let options = BuildOptions::new(config)
//!     .handler("txt", Handler::page("shout", |input: &TransformInput<'_>| -> anyhow::Result<String> {
//!         Ok(input.body.to_uppercase())
//!     }));
//! let report = build(&options)?;
//! ```

pub mod action;
pub mod address;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod core;
pub mod embed;
pub mod error;
pub mod ledger;
pub mod logger;
pub mod output;
pub mod utils;

pub use action::{Action, ActionResult, ActionTable, Handler, Route};
pub use cli::build::{BuildOptions, BuildReport, build, run};
pub use compiler::{Transform, TransformInput};
pub use config::SiteConfig;
pub use crate::core::{Resources, UrlPath};
pub use error::BuildError;
pub use ledger::UrlLedger;
