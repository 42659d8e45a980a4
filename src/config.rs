//! Project layout.
//!
//! Every path the tool touches is fixed relative to the project root. The
//! parity suite reads the report files from exactly these locations, so the
//! names are part of the external contract.

use std::path::PathBuf;

/// AnyStyle checkout, relative to the root.
pub const ANYSTYLE_LIB: &str = "tmp/anystyle/lib";

/// AnyStyle's tagged parser training data, relative to the root.
pub const ANYSTYLE_CORE_XML: &str = "tmp/anystyle/res/parser/core.xml";

/// Input reference lists, relative to the root.
pub const FIXTURES_DIR: &str = "tests/fixtures/format";

/// Generated report files, relative to the root.
pub const REPORT_DIR: &str = "target/reports/ruby-format";

/// One input reference list and the two reports generated from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureSet {
    /// Reference list under [`FIXTURES_DIR`]
    pub refs: &'static str,
    /// CSL report under [`REPORT_DIR`]
    pub csl: &'static str,
    /// BibTeX report under [`REPORT_DIR`]
    pub bibtex: &'static str,
}

/// Fixture sets in generation order.
pub const FIXTURE_SETS: &[FixtureSet] = &[
    FixtureSet {
        refs: "core-refs.txt",
        csl: "core-csl.txt",
        bibtex: "core-bibtex.txt",
    },
    FixtureSet {
        refs: "refs.txt",
        csl: "csl.txt",
        bibtex: "bibtex.txt",
    },
];

/// Resolves the fixed project paths against a root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn anystyle_lib(&self) -> PathBuf {
        self.root.join(ANYSTYLE_LIB)
    }

    pub fn core_xml(&self) -> PathBuf {
        self.root.join(ANYSTYLE_CORE_XML)
    }

    pub fn fixtures_dir(&self) -> PathBuf {
        self.root.join(FIXTURES_DIR)
    }

    pub fn report_dir(&self) -> PathBuf {
        self.root.join(REPORT_DIR)
    }

    /// Path of the core reference list, the target of core extraction.
    pub fn core_refs(&self) -> PathBuf {
        self.fixtures_dir().join(FIXTURE_SETS[0].refs)
    }
}
