//! URL address space of a build.
//!
//! - [`conflict`]: URL conflict detection (multiple actions -> same URL)

pub mod conflict;

pub use conflict::{UrlConflict, check_actions, print_conflicts};
