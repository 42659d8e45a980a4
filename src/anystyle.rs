//! AnyStyle bridge.
//!
//! AnyStyle is a Ruby library, so the bridge runs `ruby` as a child process
//! with the library directory on its load path and a small bridge program
//! passed via `-e`. References go in on stdin as a JSON array. The parsed
//! result comes back on stdout: a JSON array of CSL entries, or BibTeX text.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use thiserror::Error;

use crate::parser::{Bibliography, ParseFormat, ParsedReferences, ParserError, ReferenceParser};

/// Ruby program run by every bridge invocation. The last argument selects
/// the mode: `probe`, `csl` or `bibtex`.
const BRIDGE_PROGRAM: &str = r#"
require 'json'

mode = ARGV.last

begin
  require 'anystyle'
rescue LoadError => e
  warn e.message
  exit 3
end

exit 0 if mode == 'probe'

refs = JSON.parse($stdin.read)

case mode
when 'csl'
  $stdout.write(JSON.generate(AnyStyle.parse(refs, format: :csl)))
when 'bibtex'
  $stdout.write(AnyStyle.parse(refs, format: :bibtex).to_s)
else
  warn "unknown bridge mode: #{mode}"
  exit 2
end
"#;

const PROBE: &str = "probe";

/// Why AnyStyle could not be loaded.
#[derive(Error, Debug)]
pub enum LoadCause {
    #[error("no such directory")]
    MissingLibrary,

    #[error("cannot run '{}': {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Require(String),
}

/// AnyStyle could not be made available from `path`.
#[derive(Error, Debug)]
#[error("failed to load anystyle from {}: {cause}", .path.display())]
pub struct LoadError {
    pub path: PathBuf,
    #[source]
    pub cause: LoadCause,
}

/// A loaded AnyStyle checkout, driven through a Ruby interpreter.
#[derive(Debug, Clone)]
pub struct AnystyleLibrary {
    lib: PathBuf,
    ruby: PathBuf,
}

impl AnystyleLibrary {
    /// Loads AnyStyle from `lib` using the `ruby` interpreter.
    ///
    /// The library counts as loaded once `require 'anystyle'` succeeds in a
    /// probe run. Nothing is written anywhere before that.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] naming `lib` if the directory is missing, the
    /// interpreter cannot be started, or the require fails.
    pub fn load(lib: impl Into<PathBuf>, ruby: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let library = Self {
            lib: lib.into(),
            ruby: ruby.into(),
        };
        library.probe()?;
        tracing::info!(lib = %library.lib.display(), "loaded anystyle");
        Ok(library)
    }

    fn probe(&self) -> Result<(), LoadError> {
        let fail = |cause| LoadError {
            path: self.lib.clone(),
            cause,
        };

        if !self.lib.is_dir() {
            return Err(fail(LoadCause::MissingLibrary));
        }

        let output = self
            .command(PROBE)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| {
                fail(LoadCause::Spawn {
                    program: self.ruby.clone(),
                    source,
                })
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("ruby exited with status {:?}", output.status.code())
            } else {
                stderr
            };
            return Err(fail(LoadCause::Require(message)));
        }

        Ok(())
    }

    fn command(&self, mode: &str) -> Command {
        let mut command = Command::new(&self.ruby);
        command
            .arg("-E")
            .arg("UTF-8:UTF-8")
            .arg("-I")
            .arg(&self.lib)
            .arg("-e")
            .arg(BRIDGE_PROGRAM)
            .arg("--")
            .arg(mode)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }

    /// Runs the bridge in `format` mode and collects its output.
    fn run(&self, refs: &[String], format: ParseFormat) -> Result<Output, ParserError> {
        let input = serde_json::to_string(refs)?;

        tracing::debug!(
            ruby = %self.ruby.display(),
            format = %format,
            refs = refs.len(),
            "running anystyle bridge"
        );

        let mut child = self.command(format.as_str()).stdin(Stdio::piped()).spawn()?;

        // A write error from a bridge that already exited is reported only
        // after its exit status.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(input.as_bytes()),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(ParserError::Failed {
                format,
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!(format = %format, "anystyle stderr:\n{}", stderr.trim_end());
        }

        Ok(output)
    }
}

impl ReferenceParser for AnystyleLibrary {
    fn parse(
        &self,
        refs: &[String],
        format: ParseFormat,
    ) -> Result<ParsedReferences, ParserError> {
        let output = self.run(refs, format)?;

        match format {
            ParseFormat::Csl => {
                let entries: Vec<Value> =
                    serde_json::from_slice(&output.stdout).map_err(|e| {
                        ParserError::InvalidOutput {
                            format,
                            message: e.to_string(),
                        }
                    })?;
                Ok(ParsedReferences::Entries(entries))
            }
            ParseFormat::BibTeX => {
                let text =
                    String::from_utf8(output.stdout).map_err(|e| ParserError::InvalidOutput {
                        format,
                        message: e.to_string(),
                    })?;
                Ok(ParsedReferences::Bibliography(Bibliography::new(text)))
            }
        }
    }
}
