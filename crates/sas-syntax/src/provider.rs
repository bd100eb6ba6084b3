//! Source-tree providers.
//!
//! The search engine never talks to Tree-sitter directly. It asks a
//! [`SourceProvider`] for the [`SourceTree`] of each file, so tests and
//! embedders can supply trees built by other means.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use tracing::debug;

use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::lower::lower;
use crate::parser::Parser;
use crate::tree::SourceTree;

/// Tracing target for provider events.
pub const PROVIDER_TARGET: &str = "sas_syntax::provider";

/// Produces source trees for files.
pub trait SourceProvider {
    /// Builds the tree of `source`, the contents of `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file's language cannot be determined or the
    /// source cannot be parsed.
    fn parse(&self, path: &Path, source: &str) -> Result<SourceTree, SyntaxError>;

    /// Reads `path` and builds its tree.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Read`] if the file cannot be read,
    /// [`SyntaxError::InvalidEncoding`] if it is not UTF-8, and any error
    /// from [`SourceProvider::parse`].
    fn parse_file(&self, path: &Path) -> Result<SourceTree, SyntaxError> {
        let bytes = fs::read(path).map_err(|e| SyntaxError::read(path.to_path_buf(), e))?;
        let source =
            String::from_utf8(bytes).map_err(|_| SyntaxError::invalid_encoding(path.to_path_buf()))?;
        self.parse(path, &source)
    }
}

/// Tree-sitter backed provider for C and C++.
///
/// Parsers are created lazily, one per language, and reused for every
/// later file in that language.
pub struct TreeSitterProvider {
    language: Option<SupportedLanguage>,
    reject_syntax_errors: bool,
    parsers: Mutex<HashMap<SupportedLanguage, Parser>>,
}

impl TreeSitterProvider {
    /// Creates a provider that detects the language from file extensions
    /// and tolerates syntax errors.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: None,
            reject_syntax_errors: false,
            parsers: Mutex::new(HashMap::new()),
        }
    }

    /// Parses every file as `language`, ignoring extensions.
    #[must_use]
    pub const fn with_language(mut self, language: SupportedLanguage) -> Self {
        self.language = Some(language);
        self
    }

    /// Fails files whose syntax tree contains errors instead of searching
    /// the recovered tree.
    #[must_use]
    pub const fn reject_syntax_errors(mut self, reject: bool) -> Self {
        self.reject_syntax_errors = reject;
        self
    }

    /// Returns whether `path` has a C or C++ extension.
    #[must_use]
    pub fn supports_file(path: &Path) -> bool {
        SupportedLanguage::from_path(path).is_some()
    }

    /// Determines the language used for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::UnknownLanguage`] when the path has no
    /// extension and [`SyntaxError::UnsupportedExtension`] when the
    /// extension is not C or C++.
    pub fn language_for(&self, path: &Path) -> Result<SupportedLanguage, SyntaxError> {
        if let Some(language) = self.language {
            return Ok(language);
        }
        let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
            return Err(SyntaxError::unknown_language(path.to_path_buf()));
        };
        SupportedLanguage::from_extension(extension)
            .ok_or_else(|| SyntaxError::unsupported_extension(extension))
    }
}

impl Default for TreeSitterProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TreeSitterProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeSitterProvider")
            .field("language", &self.language)
            .field("reject_syntax_errors", &self.reject_syntax_errors)
            .finish_non_exhaustive()
    }
}

impl SourceProvider for TreeSitterProvider {
    fn parse(&self, path: &Path, source: &str) -> Result<SourceTree, SyntaxError> {
        let language = self.language_for(path)?;
        let mut parsers = self
            .parsers
            .lock()
            .map_err(|_| SyntaxError::parser_init(language, "lock poisoned"))?;

        let parser = match parsers.entry(language) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Parser::new(language)?),
        };
        let result = parser.parse(source)?;

        if result.has_errors() {
            let errors = result.errors();
            debug!(
                target: PROVIDER_TARGET,
                path = %path.display(),
                count = errors.len(),
                "syntax errors in source"
            );
            if self.reject_syntax_errors {
                let (line, column) = errors
                    .first()
                    .map_or((0, 0), |first| (first.position.line, first.position.column));
                return Err(SyntaxError::SyntaxErrors {
                    path: path.to_path_buf(),
                    count: errors.len(),
                    line,
                    column,
                });
            }
        }

        let tree = lower(result.root_node(), source, &path.to_string_lossy());
        debug!(
            target: PROVIDER_TARGET,
            path = %path.display(),
            %language,
            nodes = tree.len(),
            "lowered source tree"
        );
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    #[case("main.c", SupportedLanguage::C)]
    #[case("widget.cpp", SupportedLanguage::Cpp)]
    #[case("widget.h", SupportedLanguage::Cpp)]
    fn language_for_uses_the_extension(#[case] path: &str, #[case] expected: SupportedLanguage) {
        let provider = TreeSitterProvider::new();
        let language = provider.language_for(Path::new(path)).expect("language");
        assert_eq!(language, expected);
    }

    #[test]
    fn language_for_reports_missing_extension() {
        let err = TreeSitterProvider::new()
            .language_for(Path::new("Makefile"))
            .expect_err("no extension");
        assert!(matches!(err, SyntaxError::UnknownLanguage { .. }));
    }

    #[test]
    fn language_for_reports_unsupported_extension() {
        let err = TreeSitterProvider::new()
            .language_for(Path::new("lib.rs"))
            .expect_err("not C or C++");
        assert!(matches!(
            err,
            SyntaxError::UnsupportedExtension { ref extension } if extension == "rs"
        ));
    }

    #[test]
    fn forced_language_overrides_extension() {
        let provider = TreeSitterProvider::new().with_language(SupportedLanguage::C);
        let language = provider.language_for(Path::new("notes.txt")).expect("forced");
        assert_eq!(language, SupportedLanguage::C);
    }

    #[test]
    fn recovered_trees_are_returned_by_default() {
        let provider = TreeSitterProvider::new();
        let tree = provider
            .parse(Path::new("broken.cpp"), "int ok;\nint broken( {\n")
            .expect("recovered tree");
        assert!(
            tree.root()
                .descendants()
                .any(|node| node.spelling() == "ok")
        );
    }

    #[test]
    fn syntax_errors_are_rejected_on_request() {
        let provider = TreeSitterProvider::new().reject_syntax_errors(true);
        let err = provider
            .parse(Path::new("broken.cpp"), "int ok;\nint broken( {\n")
            .expect_err("rejected");
        let SyntaxError::SyntaxErrors { count, line, .. } = err else {
            panic!("unexpected error: {err}");
        };
        assert!(count >= 1);
        assert!(line >= 1);
    }

    #[test]
    fn parse_file_reads_from_disk() {
        let mut file = tempfile::Builder::new()
            .suffix(".c")
            .tempfile()
            .expect("temp file");
        writeln!(file, "int answer = 42;").expect("write");

        let tree = TreeSitterProvider::new()
            .parse_file(file.path())
            .expect("tree");
        assert!(
            tree.root()
                .descendants()
                .any(|node| node.spelling() == "answer")
        );
    }

    #[test]
    fn parse_file_reports_missing_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = TreeSitterProvider::new()
            .parse_file(&dir.path().join("absent.cpp"))
            .expect_err("missing");
        assert!(matches!(err, SyntaxError::Read { .. }));
    }

    #[test]
    fn parse_file_rejects_invalid_utf8() {
        let mut file = tempfile::Builder::new()
            .suffix(".cpp")
            .tempfile()
            .expect("temp file");
        file.write_all(&[0x69, 0x6e, 0x74, 0x20, 0xff, 0xfe, 0x3b])
            .expect("write");

        let err = TreeSitterProvider::new()
            .parse_file(file.path())
            .expect_err("invalid encoding");
        assert!(matches!(err, SyntaxError::InvalidEncoding { .. }));
    }
}
