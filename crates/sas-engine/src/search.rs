//! Per-file search driver.
//!
//! A [`Searcher`] pairs a [`SourceProvider`] with a [`MatchMode`] and runs
//! one compiled pattern over any number of files. A file that cannot be
//! read or parsed is logged and recorded in the [`SearchReport`]; the
//! remaining files are still searched.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use sas_pattern::{PatternNode, compile_pattern};
use sas_syntax::{Node, SourceProvider, SourceTree, SyntaxError, TreeSitterProvider};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::matches::Match;
use crate::mode::MatchMode;
use crate::resolver::resolve;

/// Tracing target for driver events.
pub const SEARCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::search");

/// Outcome of searching one file.
#[derive(Debug)]
pub struct FileOutcome {
    /// The file searched.
    pub path: PathBuf,
    /// Matches in presentation order, or the reason the file was skipped.
    pub result: Result<Vec<Match>, SyntaxError>,
}

/// Outcomes of a multi-file search, in input order.
#[derive(Debug, Default)]
pub struct SearchReport {
    /// One outcome per input path.
    pub outcomes: Vec<FileOutcome>,
}

impl SearchReport {
    /// Iterates over the matches of every file that was searched.
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
            .flatten()
    }

    /// Iterates over the files that could not be searched.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &SyntaxError)> {
        self.outcomes.iter().filter_map(|outcome| {
            outcome
                .result
                .as_ref()
                .err()
                .map(|error| (outcome.path.as_path(), error))
        })
    }

    /// Returns whether every file was searched.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }
}

/// Runs compiled patterns over files supplied by a [`SourceProvider`].
#[derive(Debug)]
pub struct Searcher<P> {
    provider: P,
    mode: MatchMode,
}

impl<P: SourceProvider> Searcher<P> {
    /// Creates a searcher.
    #[must_use]
    pub const fn new(provider: P, mode: MatchMode) -> Self {
        Self { provider, mode }
    }

    /// Returns the provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns the mode.
    #[must_use]
    pub const fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Searches in-memory `source`, named `path` for language detection.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if no tree can be built.
    pub fn search_source(
        &self,
        pattern: &PatternNode,
        path: &Path,
        source: &str,
    ) -> Result<Vec<Match>, SyntaxError> {
        let tree = self.provider.parse(path, source)?;
        Ok(collect_matches(pattern, &tree, Some(path), self.mode))
    }

    /// Reads and searches `path`.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if the file cannot be read or parsed.
    pub fn search_file(&self, pattern: &PatternNode, path: &Path) -> Result<Vec<Match>, SyntaxError> {
        let tree = self.provider.parse_file(path)?;
        Ok(collect_matches(pattern, &tree, Some(path), self.mode))
    }

    /// Searches each path in turn, recording failures instead of stopping.
    #[must_use]
    pub fn search_files<I>(&self, pattern: &PatternNode, paths: I) -> SearchReport
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let outcomes = paths
            .into_iter()
            .map(|item| {
                let path = item.as_ref();
                let result = self.search_file(pattern, path);
                match &result {
                    Ok(matches) => debug!(
                        target: SEARCH_TARGET,
                        path = %path.display(),
                        matches = matches.len(),
                        "searched file"
                    ),
                    Err(error) => warn!(
                        target: SEARCH_TARGET,
                        path = %path.display(),
                        %error,
                        "skipping file"
                    ),
                }
                FileOutcome {
                    path: path.to_path_buf(),
                    result,
                }
            })
            .collect();
        SearchReport { outcomes }
    }
}

/// Compiles `query` and searches `paths` as described by `config`.
///
/// # Errors
///
/// Returns [`SearchError::Pattern`] if the query does not compile and
/// [`SearchError::Config`] if the configuration enables no match kinds.
/// Per-file failures are recorded in the report.
pub fn search<I>(query: &str, paths: I, config: &SearchConfig) -> Result<SearchReport, SearchError>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    let pattern = compile_pattern(query)?;
    let mode = config.match_mode()?;
    debug!(target: SEARCH_TARGET, %query, ?mode, "compiled pattern");
    let searcher: Searcher<TreeSitterProvider> = Searcher::new(config.provider(), mode);
    Ok(searcher.search_files(&pattern, paths))
}

/// Resolves `pattern` over `tree` and returns each matched node once,
/// ordered by source position.
#[must_use]
pub fn collect_matches(
    pattern: &PatternNode,
    tree: &SourceTree,
    path: Option<&Path>,
    mode: MatchMode,
) -> Vec<Match> {
    let mut nodes: Vec<Node<'_>> = resolve(pattern, tree.root(), mode).collect();
    nodes.sort_by_key(|node| (node.extent(), node.id()));
    nodes.dedup_by_key(|node| node.id());
    nodes
        .into_iter()
        .map(|node| Match::from_node(path, node))
        .collect()
}
