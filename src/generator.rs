//! Fixture generation.
//!
//! Reads the reference lists under `tests/fixtures/format`, runs each list
//! through a [`ReferenceParser`] once per format, and writes the reports to
//! `target/reports/ruby-format`. Reports are overwritten on every run. A
//! failure part way through leaves the reports written so far in place.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{Layout, FIXTURE_SETS};
use crate::parser::{ParserError, ReferenceParser};
use crate::refs::{read_refs, RefsError};

/// Errors that can occur while generating fixtures.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Refs(#[from] RefsError),

    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error("failed to encode CSL entry {index}: {source}")]
    Encode {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to create '{}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Creates `path` and any missing parents. Succeeds if it already exists.
pub fn ensure_dir(path: &Path) -> Result<(), GenerateError> {
    fs::create_dir_all(path).map_err(|source| GenerateError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Renders CSL entries as one compact JSON object per line.
///
/// Lines are joined with `\n`; there is no trailing newline, so an empty
/// entry list renders as an empty string.
pub fn render_csl(entries: &[serde_json::Value]) -> Result<String, GenerateError> {
    let lines = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::to_string(entry).map_err(|source| GenerateError::Encode { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

fn write_file(path: &Path, contents: &str) -> Result<(), GenerateError> {
    fs::write(path, contents).map_err(|source| GenerateError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "wrote report");
    Ok(())
}

/// Produces the Ruby format reports with an injected parser.
pub struct FixtureGenerator<P> {
    layout: Layout,
    parser: P,
}

impl<P: ReferenceParser> FixtureGenerator<P> {
    pub fn new(layout: Layout, parser: P) -> Self {
        Self { layout, parser }
    }

    /// Writes every report and returns the report directory.
    ///
    /// The report directory is created first, then all reference lists are
    /// read, then the reports are written in [`FIXTURE_SETS`] order with the
    /// CSL report of each set before its BibTeX report.
    ///
    /// # Errors
    ///
    /// Stops at the first unreadable input, parser failure or write failure.
    pub fn run(&self) -> Result<PathBuf, GenerateError> {
        let report_dir = self.layout.report_dir();
        ensure_dir(&report_dir)?;

        let fixtures_dir = self.layout.fixtures_dir();
        let lists = FIXTURE_SETS
            .iter()
            .map(|set| read_refs(&fixtures_dir.join(set.refs)).map(|refs| (set, refs)))
            .collect::<Result<Vec<_>, _>>()?;

        for (set, refs) in &lists {
            self.write_csl(&report_dir.join(set.csl), refs)?;
            self.write_bibtex(&report_dir.join(set.bibtex), refs)?;
        }

        Ok(report_dir)
    }

    /// Parses `refs` as CSL and writes one JSON entry per line to `path`.
    pub fn write_csl(&self, path: &Path, refs: &[String]) -> Result<(), GenerateError> {
        let entries = self.parser.parse_csl(refs)?;
        write_file(path, &render_csl(&entries)?)
    }

    /// Parses `refs` as BibTeX and writes the bibliography text to `path`.
    pub fn write_bibtex(&self, path: &Path, refs: &[String]) -> Result<(), GenerateError> {
        let bibliography = self.parser.parse_bibtex(refs)?;
        write_file(path, bibliography.as_str())
    }
}
