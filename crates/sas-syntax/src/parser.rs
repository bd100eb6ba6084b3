//! Tree-sitter parsing wrapper with error reporting.

use std::ops::Range;

use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::position::{Position, point_to_position};

/// A Tree-sitter tree together with the source it was parsed from.
///
/// Tree-sitter recovers from syntax errors, so a parse result may hold a
/// usable tree that still contains ERROR or MISSING nodes.
#[derive(Debug)]
pub struct ParseResult<'s> {
    tree: tree_sitter::Tree,
    source: &'s str,
    language: SupportedLanguage,
}

impl<'s> ParseResult<'s> {
    /// Returns the root node of the syntax tree.
    #[must_use]
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Returns the parsed source.
    #[must_use]
    pub const fn source(&self) -> &'s str {
        self.source
    }

    /// Returns the language of the parsed source.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns whether the tree contains error or missing nodes.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Collects error and missing nodes in source order.
    #[must_use]
    pub fn errors(&self) -> Vec<SyntaxErrorInfo> {
        let mut errors = Vec::new();
        let mut stack = vec![self.tree.root_node()];
        while let Some(node) = stack.pop() {
            if node.is_error() || node.is_missing() {
                errors.push(SyntaxErrorInfo::from_node(node));
                continue;
            }
            if !node.has_error() {
                continue;
            }
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        errors
    }
}

/// Location and description of one syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    /// Byte range of the error in the source.
    pub byte_range: Range<usize>,
    /// One-based position where the error starts.
    pub position: Position,
    /// Human-readable description of the error.
    pub message: String,
}

impl SyntaxErrorInfo {
    fn from_node(node: tree_sitter::Node<'_>) -> Self {
        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            "syntax error".to_owned()
        };
        Self {
            byte_range: node.byte_range(),
            position: point_to_position(node.start_position()),
            message,
        }
    }
}

/// Tree-sitter parser configured for one language.
pub struct Parser {
    inner: tree_sitter::Parser,
    language: SupportedLanguage,
}

impl Parser {
    /// Creates a parser for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::ParserInit`] if the grammar is incompatible
    /// with the linked Tree-sitter runtime.
    pub fn new(language: SupportedLanguage) -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&language.tree_sitter_language())
            .map_err(|e| SyntaxError::parser_init(language, e.to_string()))?;
        Ok(Self { inner, language })
    }

    /// Returns the language this parser is configured for.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Parses `source`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Parse`] if Tree-sitter produces no tree.
    pub fn parse<'s>(&mut self, source: &'s str) -> Result<ParseResult<'s>, SyntaxError> {
        let tree = self
            .inner
            .parse(source, None)
            .ok_or_else(|| SyntaxError::parse(self.language, "parsing failed"))?;
        Ok(ParseResult {
            tree,
            source,
            language: self.language,
        })
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SupportedLanguage::C, "int main(void) { return 0; }")]
    #[case(SupportedLanguage::Cpp, "namespace a { class B {}; }")]
    fn parser_parses_valid_source(#[case] language: SupportedLanguage, #[case] source: &str) {
        let mut parser = Parser::new(language).expect("parser init");
        let result = parser.parse(source).expect("parse");

        assert!(!result.has_errors());
        assert!(result.errors().is_empty());
        assert_eq!(result.language(), language);
    }

    #[rstest]
    #[case(SupportedLanguage::C, "int broken( {")]
    #[case(SupportedLanguage::Cpp, "class {")]
    fn parser_detects_syntax_errors(#[case] language: SupportedLanguage, #[case] source: &str) {
        let mut parser = Parser::new(language).expect("parser init");
        let result = parser.parse(source).expect("parse");

        assert!(result.has_errors());
        let first = result.errors().into_iter().next().expect("has error");
        assert!(first.position.line >= 1);
        assert!(first.position.column >= 1);
    }
}
