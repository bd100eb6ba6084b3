//! Error types for search invocations.

use thiserror::Error;

use sas_pattern::PatternError;

use crate::config::ConfigError;

/// Errors that abort a search.
///
/// Both variants are raised before any file is read. Per-file source
/// failures never abort a search; they are recorded as a
/// [`SyntaxError`](sas_syntax::SyntaxError) in each
/// [`FileOutcome`](crate::FileOutcome) instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SearchError {
    /// The query could not be compiled.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] PatternError),

    /// The search configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
