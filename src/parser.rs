//! Reference parsing capability.
//!
//! The generator never parses references itself. It is handed something that
//! implements [`ReferenceParser`] and asks it for one of two output formats.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Output format requested from a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFormat {
    /// One structured CSL record per reference
    Csl,
    /// A single BibTeX bibliography
    BibTeX,
}

impl ParseFormat {
    /// Name of the format as AnyStyle spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            ParseFormat::Csl => "csl",
            ParseFormat::BibTeX => "bibtex",
        }
    }
}

impl fmt::Display for ParseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// BibTeX text produced by a parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bibliography(String);

impl Bibliography {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Bibliography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a parse, shaped by the requested [`ParseFormat`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReferences {
    /// Opaque CSL records, one per input reference
    Entries(Vec<Value>),
    /// Aggregate bibliography markup
    Bibliography(Bibliography),
}

/// Errors that can occur while parsing references.
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("failed to run parser: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("failed to encode references: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("parser exited with status {status:?} for {format} output:\n{stderr}")]
    Failed {
        format: ParseFormat,
        status: Option<i32>,
        stderr: String,
    },

    #[error("invalid {format} output from parser: {message}")]
    InvalidOutput { format: ParseFormat, message: String },

    #[error("parser returned {actual} entries for {expected} references")]
    EntryCount { expected: usize, actual: usize },

    #[error("parser returned {actual} output when {expected} was requested")]
    WrongFormat {
        expected: ParseFormat,
        actual: ParseFormat,
    },
}

/// A capability that turns raw reference strings into parsed output.
pub trait ReferenceParser {
    /// Parses `refs` into the requested `format`.
    ///
    /// Implementations must preserve input order. For [`ParseFormat::Csl`]
    /// the result holds one entry per reference.
    fn parse(&self, refs: &[String], format: ParseFormat)
        -> Result<ParsedReferences, ParserError>;

    /// Parses `refs` into CSL records, checking the entry count.
    fn parse_csl(&self, refs: &[String]) -> Result<Vec<Value>, ParserError> {
        match self.parse(refs, ParseFormat::Csl)? {
            ParsedReferences::Entries(entries) if entries.len() == refs.len() => Ok(entries),
            ParsedReferences::Entries(entries) => Err(ParserError::EntryCount {
                expected: refs.len(),
                actual: entries.len(),
            }),
            ParsedReferences::Bibliography(_) => Err(ParserError::WrongFormat {
                expected: ParseFormat::Csl,
                actual: ParseFormat::BibTeX,
            }),
        }
    }

    /// Parses `refs` into a BibTeX bibliography.
    fn parse_bibtex(&self, refs: &[String]) -> Result<Bibliography, ParserError> {
        match self.parse(refs, ParseFormat::BibTeX)? {
            ParsedReferences::Bibliography(bibliography) => Ok(bibliography),
            ParsedReferences::Entries(_) => Err(ParserError::WrongFormat {
                expected: ParseFormat::BibTeX,
                actual: ParseFormat::Csl,
            }),
        }
    }
}

impl<P: ReferenceParser + ?Sized> ReferenceParser for &P {
    fn parse(
        &self,
        refs: &[String],
        format: ParseFormat,
    ) -> Result<ParsedReferences, ParserError> {
        (**self).parse(refs, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Returns a fixed result regardless of the requested format.
    struct Canned(ParsedReferences);

    impl ReferenceParser for Canned {
        fn parse(
            &self,
            _refs: &[String],
            _format: ParseFormat,
        ) -> Result<ParsedReferences, ParserError> {
            Ok(self.0.clone())
        }
    }

    fn refs(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Ref {}", i)).collect()
    }

    #[test]
    fn test_parse_csl_matching_count() {
        let parser = Canned(ParsedReferences::Entries(vec![json!({"a": 1}), json!({"b": 2})]));
        let entries = parser.parse_csl(&refs(2)).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_parse_csl_count_mismatch() {
        // Given: a parser that merges two references into one entry
        let parser = Canned(ParsedReferences::Entries(vec![json!({})]));

        // When: we request CSL for two references
        let err = parser.parse_csl(&refs(2)).unwrap_err();

        // Then: the mismatch is reported, not silently written
        assert!(matches!(
            err,
            ParserError::EntryCount {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_parse_bibtex_rejects_entries() {
        let parser = Canned(ParsedReferences::Entries(Vec::new()));
        let err = parser.parse_bibtex(&refs(0)).unwrap_err();
        assert!(matches!(err, ParserError::WrongFormat { .. }));
    }

    #[test]
    fn test_parse_format_names() {
        assert_eq!(ParseFormat::Csl.to_string(), "csl");
        assert_eq!(ParseFormat::BibTeX.to_string(), "bibtex");
    }

    #[test]
    fn test_bibliography_display_is_verbatim() {
        let bib = Bibliography::new("@book{a,\n  title = {T}\n}\n");
        assert_eq!(bib.to_string(), "@book{a,\n  title = {T}\n}\n");
    }
}
