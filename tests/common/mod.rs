//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use ruby_format_fixtures::{
    Bibliography, ParseFormat, ParsedReferences, ParserError, ReferenceParser,
};
use serde_json::json;
use tempfile::TempDir;

/// The worked example: two references with blank and whitespace-only lines between.
pub const SAMPLE_REFS: &str =
    "Smith, J. (2020). A Study.\n\n  \nDoe, A. (2019). Another Work.\n";

pub const CORE_REFS: &str = "\
Knuth, D. E. (1984). Literate programming. The Computer Journal, 27(2), 97-111.

Lamport, L. (1978). Time, clocks, and the ordering of events in a distributed system.
Dijkstra, E. W. (1968). Go to statement considered harmful.
";

/// Deterministic stand-in for AnyStyle.
///
/// CSL entries carry the reference as their title. The BibTeX output has one
/// `@misc` entry per reference. Every call is recorded.
#[derive(Default)]
pub struct StubParser {
    pub calls: RefCell<Vec<(ParseFormat, Vec<String>)>>,
    /// Fail the call with this index (0-based)
    pub fail_on: Option<usize>,
}

impl StubParser {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::default()
        }
    }
}

impl ReferenceParser for StubParser {
    fn parse(
        &self,
        refs: &[String],
        format: ParseFormat,
    ) -> Result<ParsedReferences, ParserError> {
        let index = self.calls.borrow().len();
        self.calls.borrow_mut().push((format, refs.to_vec()));

        if self.fail_on == Some(index) {
            return Err(ParserError::Failed {
                format,
                status: Some(1),
                stderr: "stub failure".to_string(),
            });
        }

        Ok(match format {
            ParseFormat::Csl => ParsedReferences::Entries(
                refs.iter()
                    .map(|r| json!({"type": "article-journal", "title": r}))
                    .collect(),
            ),
            ParseFormat::BibTeX => ParsedReferences::Bibliography(Bibliography::new(
                refs.iter()
                    .enumerate()
                    .map(|(i, r)| format!("@misc{{ref{},\n  title = {{{}}}\n}}\n", i, r))
                    .collect::<String>(),
            )),
        })
    }
}

/// A scratch project root with the two reference lists in place.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new(core_refs: &str, refs: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let fixtures = dir.path().join("tests/fixtures/format");
        fs::create_dir_all(&fixtures).unwrap();
        fs::write(fixtures.join("core-refs.txt"), core_refs).unwrap();
        fs::write(fixtures.join("refs.txt"), refs).unwrap();
        Project { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn report_dir(&self) -> PathBuf {
        self.root().join("target/reports/ruby-format")
    }

    pub fn report(&self, name: &str) -> String {
        fs::read_to_string(self.report_dir().join(name)).unwrap()
    }

    /// Creates an empty `tmp/anystyle/lib` and returns it.
    pub fn anystyle_lib(&self) -> PathBuf {
        let lib = self.root().join("tmp/anystyle/lib");
        fs::create_dir_all(&lib).unwrap();
        lib
    }
}

/// Behavior of a fake `ruby` that answers the bridge protocol.
#[derive(Default)]
pub struct FakeAnystyle {
    /// stderr when `require 'anystyle'` fails; `None` loads fine
    pub load_error: Option<String>,
    /// stdout for `csl` mode
    pub csl: String,
    /// stdout for `bibtex` mode
    pub bibtex: String,
    /// modes that exit 7
    pub fail: Vec<&'static str>,
}

fn sh_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

impl FakeAnystyle {
    fn body(&self, mode: &str, stdout: &str) -> String {
        if self.fail.iter().any(|m| *m == mode) {
            return format!("echo 'anystyle blew up in {}' >&2; exit 7", mode);
        }
        format!("printf '%s' {}", sh_quote(stdout))
    }

    fn script(&self) -> String {
        let load = match &self.load_error {
            Some(message) => format!("printf '%s\\n' {} >&2; exit 3", sh_quote(message)),
            None => "exit 0".to_string(),
        };
        format!(
            "#!/bin/sh\n\
             mode=\"\"\n\
             for arg in \"$@\"; do mode=\"$arg\"; done\n\
             cat >/dev/null\n\
             case \"$mode\" in\n\
             \x20 probe) {} ;;\n\
             \x20 csl) {} ;;\n\
             \x20 bibtex) {} ;;\n\
             \x20 *) exit 2 ;;\n\
             esac\n",
            load,
            self.body("csl", &self.csl),
            self.body("bibtex", &self.bibtex),
        )
    }

    /// Writes the fake interpreter into `dir` as an executable and returns its path.
    #[cfg(unix)]
    pub fn install(&self, dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-ruby");
        fs::write(&path, self.script()).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}
