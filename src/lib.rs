//! ruby-format-fixtures: reference-format fixtures generated with AnyStyle.
//!
//! This library provides functionality to:
//! - Read plain-text reference lists
//! - Load AnyStyle and parse references through it as CSL or BibTeX
//! - Write the parsed output as report fixtures for the parity suite
//! - Extract core reference lists from AnyStyle's training data

pub mod anystyle;
pub mod config;
pub mod core_refs;
pub mod generator;
pub mod parser;
pub mod refs;

pub use anystyle::{AnystyleLibrary, LoadCause, LoadError};
pub use config::{FixtureSet, Layout, FIXTURE_SETS};
pub use core_refs::{extract_core_refs, write_core_refs, CoreRefsError};
pub use generator::{ensure_dir, render_csl, FixtureGenerator, GenerateError};
pub use parser::{
    Bibliography, ParseFormat, ParsedReferences, ParserError, ReferenceParser,
};
pub use refs::{read_refs, split_refs, RefsError};
