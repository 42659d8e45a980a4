//! Plain-text reference list loading.
//!
//! A reference list is a text file with one citation per line. Blank lines
//! and surrounding ASCII whitespace carry no meaning and are dropped. Other
//! Unicode spaces such as U+00A0 are part of the reference.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading references.
#[derive(Error, Debug)]
pub enum RefsError {
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Loads the reference lines of a plain-text file.
///
/// # Arguments
///
/// * `path` - Path to the reference list
///
/// # Returns
///
/// The stripped, non-empty lines in file order.
///
/// # Errors
///
/// Returns an error if the file does not exist or cannot be read. There is
/// no fallback to an empty list.
pub fn read_refs(path: &Path) -> Result<Vec<String>, RefsError> {
    let content = fs::read_to_string(path).map_err(|source| RefsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let refs = split_refs(&content);
    tracing::debug!(path = %path.display(), count = refs.len(), "read references");
    Ok(refs)
}

/// Splits reference text into stripped, non-empty lines.
pub fn split_refs(content: &str) -> Vec<String> {
    content
        .lines()
        .map(strip)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strips ASCII whitespace and NUL from both ends, the same set Ruby's
/// `String#strip` removes.
fn strip(line: &str) -> &str {
    line.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r' | '\0'))
}
