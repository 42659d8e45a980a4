//! Core reference extraction.
//!
//! AnyStyle ships its parser training data as XML. Each `<sequence>` holds
//! one reference, one tagged segment per line:
//!
//! ```text
//! <sequence>
//!   <author>Doe, J.</author>
//!   <date>(2019)</date>
//!   <title>Another Work</title>
//! </sequence>
//! ```
//!
//! The segments are glued back into the plain reference string the tagger
//! was trained on, which gives a realistic `core-refs.txt` input list.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Default number of references taken from the training data.
pub const DEFAULT_LIMIT: usize = 200;

/// Reads a limit from an environment value, falling back to
/// [`DEFAULT_LIMIT`] when it is unset or not a number.
pub fn limit_from_env(value: Option<&str>) -> usize {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_LIMIT)
}

/// Errors that can occur during extraction.
#[derive(Error, Debug)]
pub enum CoreRefsError {
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no references extracted from '{}'", .path.display())]
    Empty { path: PathBuf },

    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Tags whose text gets a closing period when it has no final punctuation.
const PERIOD_TAGS: &[&str] = &[
    "author",
    "title",
    "location",
    "publisher",
    "container-title",
    "collection-title",
    "editor",
    "translator",
    "note",
    "date",
    "pages",
];

fn sequence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<sequence>(.*?)</sequence>").unwrap())
}

fn space_before_punct_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" ([,.;:)])").unwrap())
}

fn is_punct(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | ':' | ')')
}

fn ends_with_punct(value: &str) -> bool {
    value.trim_end().ends_with(is_punct)
}

fn starts_with_punct(value: &str) -> bool {
    value.trim_start().starts_with(is_punct)
}

/// Extracts up to `limit` references from training data XML.
///
/// Sequences that render to an empty reference are skipped and do not count
/// toward the limit. The first reference is always taken, so a limit of 0
/// behaves like 1.
pub fn extract_core_refs(xml: &str, limit: usize) -> Vec<String> {
    sequence_re()
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|segment| {
            let parts: Vec<_> = segment.as_str().lines().filter_map(tagged_line).collect();
            normalize_reference(&render_reference(&parts))
        })
        .filter(|reference| !reference.is_empty())
        .take(limit.max(1))
        .collect()
}

/// Reads `core_xml` and writes the extracted references to `out`.
///
/// # Returns
///
/// The number of references written.
///
/// # Errors
///
/// Fails if the XML cannot be read, yields no references, or `out` cannot be
/// written.
pub fn write_core_refs(core_xml: &Path, out: &Path, limit: usize) -> Result<usize, CoreRefsError> {
    let xml = fs::read_to_string(core_xml).map_err(|source| CoreRefsError::Read {
        path: core_xml.to_path_buf(),
        source,
    })?;

    let refs = extract_core_refs(&xml, limit);
    if refs.is_empty() {
        return Err(CoreRefsError::Empty {
            path: core_xml.to_path_buf(),
        });
    }

    let write_err = |source| CoreRefsError::Write {
        path: out.to_path_buf(),
        source,
    };
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(out, refs.join("\n")).map_err(write_err)?;

    tracing::info!(
        from = %core_xml.display(),
        to = %out.display(),
        count = refs.len(),
        "extracted core references"
    );
    Ok(refs.len())
}

/// Splits `<tag>text</tag>` into its tag and decoded text.
fn tagged_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix('<')?;
    let tag_end = rest.find('>')?;
    let tag = rest[..tag_end].trim().trim_start_matches('/');
    if tag.is_empty() {
        return None;
    }

    let body = &rest[tag_end + 1..];
    let close = body.rfind(&format!("</{}>", tag))?;
    let text = body[..close].trim();
    if text.is_empty() {
        return None;
    }

    Some((tag.to_string(), decode_entities(text)))
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&amp;", "&")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
}

fn render_reference(parts: &[(String, String)]) -> String {
    let mut output = String::new();
    for (tag, text) in parts {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if !output.is_empty() && !starts_with_punct(text) {
            output.push(' ');
        }
        output.push_str(text);
        if PERIOD_TAGS.contains(&tag.as_str()) && !ends_with_punct(text) {
            output.push('.');
        }
    }
    output
}

fn normalize_reference(raw: &str) -> String {
    let collapsed = raw
        .replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    space_before_punct_re()
        .replace_all(&collapsed, "$1")
        .replace("( ", "(")
        .trim()
        .to_string()
}
