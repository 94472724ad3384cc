//! Site build orchestration.
//!
//! Build pipeline phases:
//! - **Ledger** - Read the URLs published by the previous build
//! - **Resolve** - Source tree + redirects -> actions, each knowing its URL
//! - **Conflicts** - Abort if two actions claim one URL (nothing written yet)
//! - **Output** - Wipe and re-create the marked output directory
//! - **Execute** - Run every action on the worker pool
//! - **Audit** - Abort if a previously published URL disappeared, else
//!   persist the new ledger

mod execute;
mod resolve;

#[cfg(test)]
mod tests;

pub use execute::execute;
pub use resolve::{Redirect, load_redirects, resolve_actions};

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;

use crate::{
    action::{Action, ActionResult, ActionTable, ExecContext, Handler},
    address::{check_actions, print_conflicts},
    config::SiteConfig,
    core::{Resources, UrlPath},
    error::BuildError,
    ledger::{
        UrlLedger,
        audit::{audit, print_forgotten},
    },
    log, output,
    utils::plural_count,
};

/// Everything a build needs.
///
/// Handlers registered here are layered over the configured ones, which are
/// layered over the built-in defaults.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub config: SiteConfig,
    handlers: ActionTable,
    pub quiet: bool,
}

impl BuildOptions {
    pub fn new(config: SiteConfig) -> Self {
        Self {
            config,
            handlers: ActionTable::new(),
            quiet: false,
        }
    }

    /// Route files with extension `ext` through `handler`.
    pub fn handler(mut self, ext: &str, handler: Handler) -> Self {
        self.handlers.insert(ext, handler);
        self
    }

    /// Copy files with extension `ext`, even if a default handles it.
    pub fn copy(mut self, ext: &str) -> Self {
        self.handlers.copy(ext);
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn action_table(&self) -> ActionTable {
        ActionTable::from_config(&self.config).layered(self.handlers.clone())
    }
}

/// Outcome of a build whose setup succeeded.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// One result per action, in action order.
    pub results: Vec<ActionResult>,
    /// URLs claimed by the build, failed actions included.
    pub urls: BTreeSet<UrlPath>,
}

impl BuildReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.success()).count()
    }
}

/// Build the site described by `options`.
pub fn build(options: &BuildOptions) -> Result<BuildReport, BuildError> {
    let config = &options.config;
    let source_dir = config.source_dir();
    let output_dir = config.output_dir();

    let old_ledger = UrlLedger::read(&config.ledger_path())?;
    let redirects = load_redirects(&config.redirects_path())?;

    match fs::metadata(&source_dir) {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log!("warning"; "source directory {} does not exist", source_dir.display());
        }
        Err(e) => return Err(BuildError::Io(source_dir, e)),
    }

    let table = options.action_table();
    for (ext, name) in table.transformed_extensions() {
        crate::debug!("build"; ".{} -> {}", ext, name);
    }
    let actions = resolve_actions(&source_dir, &table, &redirects);
    let resources = Resources::load(&config.templates_dir())?;

    if let Err(conflicts) = check_actions(&actions) {
        print_conflicts(&conflicts);
        return Err(BuildError::Conflict(conflicts));
    }

    output::prepare(&output_dir)?;

    if !options.quiet {
        log!("build"; "{} -> {}", plural_count(actions.len(), "action"), output_dir.display());
    }

    let ctx = ExecContext {
        source_dir: &source_dir,
        dest_dir: &output_dir,
        resources: &resources,
    };
    let results = execute(&actions, &ctx, config.jobs(), options.quiet)?;

    let urls: BTreeSet<UrlPath> = actions.iter().map(Action::url).collect();
    let report = BuildReport {
        results,
        urls: urls.clone(),
    };

    match audit(&old_ledger, urls) {
        Ok(ledger) => ledger.write()?,
        Err(forgotten) => {
            print_forgotten(&forgotten);
            return Err(BuildError::ForgottenUrls(forgotten));
        }
    }

    let failed = report.failed();
    if failed > 0 {
        log!("error"; "{}, {} failed", plural_count(report.total(), "action"), failed);
        return Err(BuildError::ActionsFailed {
            failed,
            total: report.total(),
        });
    }

    log!("done"; "{}, 0 failed", plural_count(report.total(), "action"));
    Ok(report)
}

/// Build and map the outcome to a process exit code: 0 on success, 1 on any
/// fatal error or failed action.
pub fn run(options: &BuildOptions) -> u8 {
    match build(options) {
        Ok(_) => 0,
        // Already itemized while building.
        Err(BuildError::Conflict(_) | BuildError::ForgottenUrls(_) | BuildError::ActionsFailed { .. }) => 1,
        Err(err) => {
            log!("error"; "{:#}", anyhow::Error::new(err));
            1
        }
    }
}
