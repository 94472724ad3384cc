//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading `sitebuilder.toml`, `redirects.toml` and the
/// templates directory.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("`{0}` is not valid TOML")]
    Toml(PathBuf, #[source] toml::de::Error),

    #[error("`{path}` is not in the expected format: {message}")]
    Format { path: PathBuf, message: String },

    #[error("cannot determine project root: {0}")]
    Root(String),
}

impl ConfigError {
    pub fn format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("redirects.toml"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        let display = format!("{io_err}");
        assert!(display.contains("IO error"));
        assert!(display.contains("redirects.toml"));

        let format_err = ConfigError::format("redirects.toml", "value of `/a` is not a string");
        let display = format!("{format_err}");
        assert!(display.contains("not in the expected format"));
        assert!(display.contains("`/a`"));
    }
}
