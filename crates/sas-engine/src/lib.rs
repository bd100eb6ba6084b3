//! Resolution engine for syntax-aware search.
//!
//! The engine evaluates a compiled [`PatternNode`](sas_pattern::PatternNode)
//! against a [`SourceTree`](sas_syntax::SourceTree):
//!
//! - the qualifier resolver narrows candidates to a scope chain,
//! - entity resolvers filter candidates by kind, name, type, parameters,
//!   template parameters, attributes, and nested content,
//! - the combinator evaluator composes the results of sub-patterns.
//!
//! Resolution is lazy: [`resolve`] returns an iterator, and a caller that
//! stops early does not pay for the rest of the tree. [`Searcher`] wraps
//! resolution with a [`SourceProvider`](sas_syntax::SourceProvider) and
//! turns matched nodes into [`Match`] records, file by file.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use sas_engine::{MatchMode, Searcher};
//! use sas_pattern::compile_pattern;
//! use sas_syntax::TreeSitterProvider;
//!
//! let pattern = compile_pattern(r"\F = area")?;
//! let searcher = Searcher::new(TreeSitterProvider::new(), MatchMode::default());
//! let matches = searcher.search_source(
//!     &pattern,
//!     Path::new("shape.cpp"),
//!     "double area(double r) { return r * r; }",
//! )?;
//! assert_eq!(matches.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod attributes;
mod config;
mod entity;
mod error;
mod matches;
mod mode;
mod params;
mod qualifier;
mod resolver;
mod search;
pub mod telemetry;

pub use config::{
    ConfigError, DEFAULT_LOG_FILTER, LogFormat, LogFormatParseError, LoggingConfig, ModeConfig,
    SearchConfig,
};
pub use entity::{is_class, is_function_declaration, is_variable_declaration, is_variable_reference};
pub use error::SearchError;
pub use matches::Match;
pub use mode::MatchMode;
pub use params::match_parameters;
pub use qualifier::is_scope_kind;
pub use resolver::{Matches, Resolver, resolve, satisfies};
pub use search::{FileOutcome, SEARCH_TARGET, SearchReport, Searcher, collect_matches, search};

#[cfg(test)]
mod tests;
