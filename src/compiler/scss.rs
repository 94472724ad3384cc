//! Style sheet compilation through an external command.
//!
//! The body is piped to the command's stdin and its stdout becomes the
//! output. Arguments may reference per-file variables:
//!
//! | Variable                  | Value                          |
//! |---------------------------|--------------------------------|
//! | `$SITEBUILDER_SOURCE_DIR` | directory of the source file   |
//! | `$SITEBUILDER_SOURCE`     | the source file                |
//! | `$SITEBUILDER_ROOT`       | project root                   |

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::{Transform, TransformInput};
use crate::utils::exec::Cmd;

/// Compiles `.scss` bodies with e.g. `sass --stdin`.
#[derive(Debug, Clone)]
pub struct ScssCompiler {
    command: Vec<String>,
    root: PathBuf,
}

impl ScssCompiler {
    pub fn new(command: Vec<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            command,
            root: root.into(),
        }
    }

    /// Variables available to `command`, longest name first so that
    /// `$SITEBUILDER_SOURCE` never clobbers `$SITEBUILDER_SOURCE_DIR`.
    fn vars(&self, source: &Path) -> [(&'static str, String); 3] {
        let dir = source.parent().unwrap_or(Path::new(""));
        [
            ("SITEBUILDER_SOURCE_DIR", dir.display().to_string()),
            ("SITEBUILDER_SOURCE", source.display().to_string()),
            ("SITEBUILDER_ROOT", self.root.display().to_string()),
        ]
    }

    /// Command line with variables substituted.
    pub fn resolve_args(&self, source: &Path) -> Vec<String> {
        let vars = self.vars(source);
        self.command
            .iter()
            .map(|arg| {
                vars.iter().fold(arg.clone(), |acc, (key, value)| {
                    acc.replace(&format!("${key}"), value)
                })
            })
            .collect()
    }
}

impl Transform for ScssCompiler {
    fn transform(&self, input: &TransformInput<'_>) -> Result<String> {
        let args = self.resolve_args(input.source);
        let Some((program, rest)) = args.split_first() else {
            bail!("no style sheet command configured");
        };
        // Relative program paths resolve against the project root.
        let resolved = which::which_in(program, env::var_os("PATH"), &self.root)
            .with_context(|| format!("`{program}` not found; install it or change [scss] command"))?;

        let output = Cmd::new(resolved)
            .args(rest)
            .cwd(&self.root)
            .stdin(input.body)
            .run()?;

        String::from_utf8(output.stdout)
            .with_context(|| format!("`{program}` produced non UTF-8 output"))
    }
}
