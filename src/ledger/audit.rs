//! Forgotten URL detection.
//!
//! Every URL in the previous ledger must still be claimed by some action of
//! the current build, whether or not that action succeeded. Removing a page
//! therefore requires a redirect (or re-publishing the URL); there is no
//! allowlist.

use std::collections::BTreeSet;

use crate::core::UrlPath;
use crate::log;
use crate::utils::plural_s;

use super::UrlLedger;

/// URLs of `old` that are missing from `new_urls`, sorted.
pub fn forgotten_urls(old: &UrlLedger, new_urls: &BTreeSet<UrlPath>) -> Vec<UrlPath> {
    old.urls().difference(new_urls).cloned().collect()
}

/// Check `new_urls` against the previous ledger.
///
/// Returns the ledger to persist, or the forgotten URLs. The caller must not
/// write anything in the error case, so the same URLs are reported again on
/// the next run.
pub fn audit(old: &UrlLedger, new_urls: BTreeSet<UrlPath>) -> Result<UrlLedger, Vec<UrlPath>> {
    let forgotten = forgotten_urls(old, &new_urls);
    if forgotten.is_empty() {
        Ok(UrlLedger::new(old.path(), new_urls))
    } else {
        Err(forgotten)
    }
}

/// Print forgotten URLs using the standard log format.
///
/// ```text
/// [error] 2 forgotten urls (published by the previous build)
/// [forgotten] /old/
/// [forgotten] /legacy.html
/// ```
pub fn print_forgotten(forgotten: &[UrlPath]) {
    if forgotten.is_empty() {
        return;
    }
    log!("error"; "{} forgotten url{} (published by the previous build)",
        forgotten.len(), plural_s(forgotten.len()));
    for url in forgotten {
        log!("forgotten"; "{}", url);
    }
}
