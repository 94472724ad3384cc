//! Named templates shared read-only by every action.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::ConfigError;

/// Immutable name -> template mapping, loaded once per build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resources {
    templates: BTreeMap<String, String>,
}

impl Resources {
    /// Load every file directly inside `dir`, keyed by file name.
    ///
    /// A missing directory yields no templates. Subdirectories are ignored.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                crate::debug!("resources"; "no templates directory at {}", dir.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(dir.to_path_buf(), e)),
        };

        let mut templates = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| ConfigError::Io(dir.to_path_buf(), e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io(path.clone(), e))?;
            templates.insert(entry.file_name().to_string_lossy().into_owned(), content);
        }

        Ok(Self { templates })
    }

    /// Build from in-memory templates.
    pub fn from_templates<I, K, V>(templates: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            templates: templates
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn template(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
