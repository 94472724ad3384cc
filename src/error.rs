//! Build error taxonomy.
//!
//! Every variant is fatal for the build and maps to exit code 1. Failures of
//! single actions are not errors here: they are reported in their
//! [`ActionResult`](crate::action::ActionResult) and only summarized by
//! [`BuildError::ActionsFailed`].

use std::path::PathBuf;

use thiserror::Error;

use crate::address::UrlConflict;
use crate::address::conflict::format_conflicts;
use crate::config::ConfigError;
use crate::core::UrlPath;
use crate::ledger::LedgerError;
use crate::output::DestinationError;

#[derive(Debug, Error)]
pub enum BuildError {
    /// Malformed `sitebuilder.toml`, `redirects.toml` or templates.
    #[error(transparent)]
    ConfigFormat(#[from] ConfigError),

    /// Unreadable, malformed or foreign `urls.txt`.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("url conflicts: {}", format_conflicts(.0))]
    Conflict(Vec<UrlConflict>),

    #[error(transparent)]
    DestinationSafety(#[from] DestinationError),

    #[error("{} url(s) published by the previous build are no longer produced", .0.len())]
    ForgottenUrls(Vec<UrlPath>),

    #[error("{failed} of {total} actions failed")]
    ActionsFailed { failed: usize, total: usize },

    #[error("cannot start worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error when accessing `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}
