//! Specter core library.
//!
//! Spectral rules are documented in markdown: a ```` ```yaml ```` block tagged
//! `#👻-rule` defines a rule, and other yaml blocks carrying `#👻-` markers
//! are test cases asserting where rules must or must not fail. This crate
//! extracts both, runs the test cases through Spectral and merges the rules
//! into one ruleset.
//!
//! High-level modules:
//! - `markdown`: Fenced block extraction.
//! - `parse`: Rule/test-case classification and the marker dialect.
//! - `index`: Corpus-wide rule index with duplicate and orphan detection.
//! - `ruleset`: Base + rule bodies text merge.
//! - `engine`: Engine trait and the Spectral CLI backend.
//! - `runner`: Assertion checking and test execution.
//! - `pipeline`: Load/test/merge steps used by the binary.
//! - `config`: Discovery and effective configuration resolution.
//! - `output`: Human/JSON printers.
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod markdown;
pub mod models;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod ruleset;
pub mod runner;

pub use error::{Error, Result};
