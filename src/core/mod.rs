//! Core types - pure abstractions shared across the codebase.

mod resources;
mod url;

pub use resources::Resources;
pub use url::{UrlPath, UrlPathError};
