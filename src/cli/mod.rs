//! CLI support for sieve-expr
//!
//! The functions behind the `sieve` binary, usable without spawning it.

mod docs;
mod filter;

pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use filter::{ExplainOptions, FilterOptions, execute_explain, execute_filter};

use std::io;

use thiserror::Error;

use crate::error::CompileError;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("no input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    /// Input (or a column of it) that is not a JSON array
    #[error("{0} must be a JSON array")]
    NotAnArray(&'static str),

    #[error("unknown category: '{0}'\nRun 'sieve docs' to see available categories.")]
    UnknownCategory(String),
}
