//! Source tree and redirect declarations -> ordered action list.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use jwalk::WalkDir;

use crate::action::{Action, ActionTable};
use crate::config::ConfigError;
use crate::core::UrlPath;
use crate::log;

/// One `"/old" = "/new"` entry of `redirects.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub old_url: UrlPath,
    pub new_url: String,
}

/// Read redirect declarations in file order. A missing file declares none.
pub fn load_redirects(path: &Path) -> Result<Vec<Redirect>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            crate::debug!("redirects"; "no {}", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(ConfigError::Io(path.to_path_buf(), e)),
    };
    parse_redirects(&content, path)
}

/// Parse `redirects.toml` content; `path` is only used in errors.
pub fn parse_redirects(content: &str, path: &Path) -> Result<Vec<Redirect>, ConfigError> {
    let table: toml::Table =
        toml::from_str(content).map_err(|e| ConfigError::Toml(path.to_path_buf(), e))?;

    table
        .into_iter()
        .map(|(old, new)| {
            let new_url = match new {
                toml::Value::String(s) => s,
                other => {
                    return Err(ConfigError::format(
                        path,
                        format!("target of `{old}` must be a string, found {}", other.type_str()),
                    ));
                }
            };
            let old_url = UrlPath::new(&old).map_err(|e| ConfigError::format(path, e.to_string()))?;
            if old_url.has_dot_segments() {
                return Err(ConfigError::format(
                    path,
                    format!("`{old}` must not contain `.` or `..` segments"),
                ));
            }
            Ok(Redirect { old_url, new_url })
        })
        .collect()
}

/// Walk `source_dir` and build one action per file, then one per redirect.
///
/// Files whose extension is in `table` get that handler, every other file is
/// copied. Walk errors are logged and the entry skipped. The walk is sorted,
/// so the action order is stable across runs.
pub fn resolve_actions(source_dir: &Path, table: &ActionTable, redirects: &[Redirect]) -> Vec<Action> {
    let mut actions = Vec::new();

    let walk = source_dir
        .exists()
        .then(|| WalkDir::new(source_dir).sort(true).skip_hidden(false));
    for entry in walk.into_iter().flatten() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log!("error"; "error while walking {}: {}", source_dir.display(), e);
                continue;
            }
        };
        if entry.file_type().is_dir() {
            if let Some(e) = &entry.read_children_error {
                log!("error"; "error while walking {}: {}", entry.path().display(), e);
            }
            continue;
        }

        let source = entry.path();
        let Ok(relative) = source.strip_prefix(source_dir).map(Path::to_path_buf) else {
            continue;
        };

        actions.push(match table.lookup(&source) {
            Some(handler) => Action::MetadataTransform {
                source,
                relative,
                handler: handler.clone(),
            },
            None => Action::Copy { source, relative },
        });
    }

    actions.extend(redirects.iter().map(|r| Action::Redirect {
        old_url: r.old_url.clone(),
        new_url: r.new_url.clone(),
    }));

    actions
}
