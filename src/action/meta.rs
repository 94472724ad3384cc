//! Leading metadata block of transformed sources.
//!
//! ```text
//! title = "About"
//! template = "page.html"
//! ---
//! Body text...
//! ```
//!
//! Everything before the first line that is exactly `---` (ended by `\n` or
//! `\r\n`) is TOML with string values. A file without that line is all body.

use std::collections::BTreeMap;

use anyhow::{Result, bail};

/// Metadata key -> value.
pub type Metadata = BTreeMap<String, String>;

/// Line separating metadata from body, without its line ending.
pub const META_DELIMITER: &str = "---";

/// Split `text` into its metadata and body.
pub fn split_front_matter(text: &str) -> Result<(Metadata, &str)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if is_delimiter(line) {
            let meta = parse_meta(&text[..offset])?;
            return Ok((meta, &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    Ok((Metadata::new(), text))
}

fn is_delimiter(line: &str) -> bool {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .is_some_and(|l| l == META_DELIMITER)
}

fn parse_meta(block: &str) -> Result<Metadata> {
    let table: toml::Table = toml::from_str(block)?;
    let mut meta = Metadata::new();
    for (key, value) in table {
        match value {
            toml::Value::String(s) => {
                meta.insert(key, s);
            }
            other => bail!("metadata `{key}` must be a string, found {}", other.type_str()),
        }
    }
    Ok(meta)
}
