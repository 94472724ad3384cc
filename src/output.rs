//! Output directory lifecycle.
//!
//! The output directory is wiped and re-created on every build, but only if
//! it carries the marker file written by a previous build. Anything else at
//! that path is left alone.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::debug;

/// Zero-byte file marking a directory as owned by sitebuilder.
pub const MARKER_FILE: &str = ".sitebuilder-dest-dir";

/// Refusals and failures while preparing the output directory.
#[derive(Debug, Error)]
pub enum DestinationError {
    #[error("`{0}` exists and is not a directory")]
    NotADirectory(PathBuf),

    #[error("`{0}` exists but was not created by sitebuilder (no .sitebuilder-dest-dir marker); refusing to delete it")]
    MissingMarker(PathBuf),

    #[error("IO error when preparing `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}

/// Make `dest` an empty directory containing only the marker file.
pub fn prepare(dest: &Path) -> Result<(), DestinationError> {
    let io_err = |e| DestinationError::Io(dest.to_path_buf(), e);

    match fs::symlink_metadata(dest) {
        Ok(meta) if !meta.is_dir() => {
            return Err(DestinationError::NotADirectory(dest.to_path_buf()));
        }
        Ok(_) => {
            if !dest.join(MARKER_FILE).is_file() {
                return Err(DestinationError::MissingMarker(dest.to_path_buf()));
            }
            debug!("output"; "clearing {}", dest.display());
            fs::remove_dir_all(dest).map_err(io_err)?;
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(io_err(e)),
    }

    fs::create_dir_all(dest).map_err(io_err)?;
    fs::write(dest.join(MARKER_FILE), b"").map_err(io_err)?;
    Ok(())
}
