//! Conflict detection across all actions.
//!
//! Two checks, both before anything is written:
//!
//! - **URL** - one URL claimed by several actions
//! - **Destination** - distinct URLs whose output files collide, either the
//!   same file (`/foo/` and `/foo/index.html`) or a file where another action
//!   needs a directory (`/foo` and `/foo/a.css`)

use std::collections::BTreeMap;
use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::action::Action;
use crate::core::UrlPath;
use crate::log;
use crate::logger::{Scope, Style};
use crate::utils::plural_s;

/// URL claims map: URL -> descriptors of the actions claiming that URL.
pub type UrlClaimMap = FxHashMap<UrlPath, Vec<String>>;

/// A conflict: multiple actions claim the same URL or overlapping outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlConflict {
    /// The conflicting URL, or the URL of the contested output path
    pub url: UrlPath,
    /// Descriptors of every claimant, in action order
    pub claimants: Vec<String>,
}

/// Collect all URL -> claimants mappings.
///
/// Only computes URLs; nothing is read from or written to disk.
pub fn collect_url_claims(actions: &[Action]) -> UrlClaimMap {
    let mut claims = UrlClaimMap::default();
    for action in actions {
        claims.entry(action.url()).or_default().push(action.to_string());
    }
    claims
}

/// Detect URL conflicts (URLs claimed by more than one action), sorted by URL.
pub fn detect_conflicts(claims: &UrlClaimMap) -> Vec<UrlConflict> {
    let mut conflicts: Vec<_> = claims
        .iter()
        .filter(|(_, claimants)| claimants.len() > 1)
        .map(|(url, claimants)| UrlConflict {
            url: url.clone(),
            claimants: claimants.clone(),
        })
        .collect();
    conflicts.sort_by(|a, b| a.url.cmp(&b.url));
    conflicts
}

/// Detect output paths written by actions with distinct URLs, and output
/// files that sit where another action needs a directory. Sorted by URL.
///
/// Groups already reported as URL conflicts (every claimant with the same
/// URL) are skipped.
pub fn detect_path_conflicts(actions: &[Action]) -> Vec<UrlConflict> {
    let mut by_path: BTreeMap<PathBuf, Vec<&Action>> = BTreeMap::new();
    for action in actions {
        by_path.entry(action.dest_path()).or_default().push(action);
    }

    let mut conflicts: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();

    for (path, claimants) in &by_path {
        let first_url = claimants[0].url();
        if claimants.iter().any(|a| a.url() != first_url) {
            conflicts
                .entry(path.clone())
                .or_default()
                .extend(claimants.iter().map(ToString::to_string));
        }
    }

    for (path, claimants) in &by_path {
        let Some(blocker) = path.ancestors().skip(1).find(|dir| by_path.contains_key(*dir)) else {
            continue;
        };
        let entry = conflicts.entry(blocker.to_path_buf()).or_default();
        if entry.is_empty() {
            entry.extend(by_path[blocker].iter().map(ToString::to_string));
        }
        entry.extend(claimants.iter().map(ToString::to_string));
    }

    let mut conflicts: Vec<_> = conflicts
        .into_iter()
        .map(|(path, claimants)| UrlConflict {
            url: UrlPath::from_relative(&path),
            claimants,
        })
        .collect();
    conflicts.sort_by(|a, b| a.url.cmp(&b.url));
    conflicts
}

/// Check `actions` for URL and destination conflicts.
pub fn check_actions(actions: &[Action]) -> Result<(), Vec<UrlConflict>> {
    let mut conflicts = detect_conflicts(&collect_url_claims(actions));
    conflicts.extend(detect_path_conflicts(actions));
    conflicts.sort_by(|a, b| a.url.cmp(&b.url));
    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(conflicts)
    }
}

/// Print conflicts using the standard log format.
///
/// Output format:
/// ```text
/// [error] url conflicts (1 url, 2 claimants)
/// [conflict] /about/index.html (2 claimants)
///   - markdown about.md
///   - copy about/index.html
/// ```
pub fn print_conflicts(conflicts: &[UrlConflict]) {
    if conflicts.is_empty() {
        return;
    }

    let total: usize = conflicts.iter().map(|c| c.claimants.len()).sum();
    log!("error"; "url conflicts ({} url{}, {} claimant{})",
        conflicts.len(), plural_s(conflicts.len()),
        total, plural_s(total));

    let item = Scope::root().nested("  - ").styled(Style::Red);
    for conflict in conflicts {
        log!("conflict"; "{} ({} claimant{})",
            conflict.url, conflict.claimants.len(), plural_s(conflict.claimants.len()));
        for claimant in &conflict.claimants {
            item.line(claimant);
        }
    }
}

/// Format conflicts as a string (for error messages).
pub fn format_conflicts(conflicts: &[UrlConflict]) -> String {
    conflicts
        .iter()
        .map(|c| format!("{} ({})", c.url, c.claimants.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}
