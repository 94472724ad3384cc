//! Persisted ledger of published URLs (`urls.txt`).
//!
//! Format: a fixed header line followed by one URL path per line, sorted.
//!
//! ```text
//! # sitebuilder URLs
//! /about/index.html
//! /old/
//! /style.css
//! ```
//!
//! The header doubles as an ownership marker: a file without it is never
//! read as a ledger and never overwritten.

pub mod audit;

use std::collections::BTreeSet;
use std::fs;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::{UrlPath, UrlPathError};

/// First line of every ledger file.
pub const LEDGER_HEADER: &str = "# sitebuilder URLs";

/// Ledger read/write failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error when accessing `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("`{0}` is not in the expected format (missing `# sitebuilder URLs` header)")]
    BadHeader(PathBuf),

    #[error("`{path}` line {line}: invalid url")]
    InvalidUrl {
        path: PathBuf,
        line: usize,
        #[source]
        source: UrlPathError,
    },

    #[error("`{path}` line {line}: duplicate url {url}")]
    Duplicate {
        path: PathBuf,
        line: usize,
        url: UrlPath,
    },

    #[error("refusing to overwrite `{0}`: it does not look like a url ledger")]
    RefuseOverwrite(PathBuf),
}

/// Set of URLs published by the last successful build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlLedger {
    path: PathBuf,
    urls: BTreeSet<UrlPath>,
}

impl UrlLedger {
    pub fn new(path: impl Into<PathBuf>, urls: impl IntoIterator<Item = UrlPath>) -> Self {
        Self {
            path: path.into(),
            urls: urls.into_iter().collect(),
        }
    }

    /// Read the ledger at `path`. A missing file is an empty ledger.
    pub fn read(path: &Path) -> Result<Self, LedgerError> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::new(path, [])),
            Err(e) => return Err(LedgerError::Io(path.to_path_buf(), e)),
        };

        let mut lines = BufReader::new(file).lines();
        match lines.next() {
            Some(Ok(header)) if is_header(&header) => {}
            Some(Err(e)) => return Err(LedgerError::Io(path.to_path_buf(), e)),
            _ => return Err(LedgerError::BadHeader(path.to_path_buf())),
        }

        let mut urls = BTreeSet::new();
        for (idx, line) in lines.enumerate() {
            let line = line.map_err(|e| LedgerError::Io(path.to_path_buf(), e))?;
            let line_no = idx + 2;
            let url = UrlPath::new(&line).map_err(|source| LedgerError::InvalidUrl {
                path: path.to_path_buf(),
                line: line_no,
                source,
            })?;
            if urls.contains(&url) {
                return Err(LedgerError::Duplicate {
                    path: path.to_path_buf(),
                    line: line_no,
                    url,
                });
            }
            urls.insert(url);
        }

        Ok(Self {
            path: path.to_path_buf(),
            urls,
        })
    }

    /// Write the ledger, sorted.
    ///
    /// An existing file is only replaced if its first line is the ledger
    /// header.
    pub fn write(&self) -> Result<(), LedgerError> {
        self.check_overwrite()?;
        fs::write(&self.path, self.render()).map_err(|e| LedgerError::Io(self.path.clone(), e))
    }

    fn check_overwrite(&self) -> Result<(), LedgerError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(LedgerError::Io(self.path.clone(), e)),
        };
        let mut first = String::new();
        BufReader::new(file)
            .read_line(&mut first)
            .map_err(|e| LedgerError::Io(self.path.clone(), e))?;
        if !is_header(&first) {
            return Err(LedgerError::RefuseOverwrite(self.path.clone()));
        }
        Ok(())
    }

    /// File content: header plus one sorted url per line.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(LEDGER_HEADER.len() + 1 + self.urls.len() * 16);
        out.push_str(LEDGER_HEADER);
        out.push('\n');
        for url in &self.urls {
            out.push_str(url.as_str());
            out.push('\n');
        }
        out
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn urls(&self) -> &BTreeSet<UrlPath> {
        &self.urls
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Whether `line` is the header, with or without a `\n` or `\r\n` ending.
fn is_header(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == LEDGER_HEADER
}
