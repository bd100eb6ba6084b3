//! Error types for pattern compilation.
//!
//! Every failure while turning a query string into a [`PatternNode`] is fatal
//! to that query: there is no partial token stream and no partial pattern
//! tree. Each error carries the byte offset in the query where the problem was
//! detected so callers can point at it.
//!
//! [`PatternNode`]: crate::PatternNode

use thiserror::Error;

/// Errors raised while lexing, parsing, or validating a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PatternError {
    /// The lexer met a character sequence it cannot tokenise.
    #[error("invalid pattern at offset {offset}: {message}")]
    Lex {
        /// Byte offset of the offending input.
        offset: usize,
        /// Description of the failure.
        message: String,
    },

    /// The token stream violates the pattern grammar.
    #[error("{}", parse_summary(*.offset, message))]
    Parse {
        /// Byte offset of the unexpected token, or `None` when the input
        /// ended early.
        offset: Option<usize>,
        /// Description of the failure.
        message: String,
    },

    /// A name, type, or text field is not a valid regular expression.
    #[error("invalid regular expression '{pattern}' at offset {offset}: {message}")]
    Regex {
        /// The regular expression source as written in the query.
        pattern: String,
        /// Byte offset of the field in the query.
        offset: usize,
        /// The regex engine's description of the problem.
        message: String,
    },
}

fn parse_summary(offset: Option<usize>, message: &str) -> String {
    offset.map_or_else(
        || format!("unexpected end of pattern: {message}"),
        |at| format!("unexpected token at offset {at}: {message}"),
    )
}

impl PatternError {
    /// Creates a lexer error.
    #[must_use]
    pub fn lex(offset: usize, message: impl Into<String>) -> Self {
        Self::Lex {
            offset,
            message: message.into(),
        }
    }

    /// Creates a parse error anchored at a token.
    #[must_use]
    pub fn unexpected(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset: Some(offset),
            message: message.into(),
        }
    }

    /// Creates a parse error for input that ended too early.
    #[must_use]
    pub fn unexpected_end(message: impl Into<String>) -> Self {
        Self::Parse {
            offset: None,
            message: message.into(),
        }
    }

    /// Creates a regex compilation error.
    #[must_use]
    pub fn regex(pattern: impl Into<String>, offset: usize, message: impl Into<String>) -> Self {
        Self::Regex {
            pattern: pattern.into(),
            offset,
            message: message.into(),
        }
    }

    /// Returns the byte offset the error points at, if any.
    #[must_use]
    pub const fn offset(&self) -> Option<usize> {
        match self {
            Self::Lex { offset, .. } | Self::Regex { offset, .. } => Some(*offset),
            Self::Parse { offset, .. } => *offset,
        }
    }
}
