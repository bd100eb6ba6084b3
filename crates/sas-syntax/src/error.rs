//! Error types for producing source trees.
//!
//! A failure here affects a single file: callers report it and move on to
//! the next input.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::language::SupportedLanguage;

/// Errors raised while reading or parsing a source file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser for a language.
    #[error("failed to initialise parser for {language}: {message}")]
    ParserInit {
        /// The language that failed to initialise.
        language: SupportedLanguage,
        /// Description of the failure.
        message: String,
    },

    /// The file extension is not a C or C++ extension.
    #[error("unsupported file extension: {extension}")]
    UnsupportedExtension {
        /// The extension that was not recognised.
        extension: String,
    },

    /// The path has no extension to detect a language from.
    #[error("could not determine language for path: {}", path.display())]
    UnknownLanguage {
        /// The path that could not be mapped to a language.
        path: PathBuf,
    },

    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The file that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file is not valid UTF-8.
    #[error("{} is not valid UTF-8", path.display())]
    InvalidEncoding {
        /// The offending file.
        path: PathBuf,
    },

    /// The parser produced no tree.
    #[error("failed to parse {language}: {message}")]
    Parse {
        /// The language that failed to parse.
        language: SupportedLanguage,
        /// Description of the failure.
        message: String,
    },

    /// The tree contains syntax errors and the provider was asked to reject
    /// such files.
    #[error("{} has {count} syntax error(s), first at {line}:{column}", path.display())]
    SyntaxErrors {
        /// The offending file.
        path: PathBuf,
        /// Number of error or missing nodes.
        count: usize,
        /// One-based line of the first error.
        line: u32,
        /// One-based column of the first error.
        column: u32,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::ParserInit {
            language,
            message: message.into(),
        }
    }

    /// Creates an unsupported extension error.
    #[must_use]
    pub fn unsupported_extension(extension: impl Into<String>) -> Self {
        Self::UnsupportedExtension {
            extension: extension.into(),
        }
    }

    /// Creates an unknown language error.
    #[must_use]
    pub const fn unknown_language(path: PathBuf) -> Self {
        Self::UnknownLanguage { path }
    }

    /// Creates a read error.
    #[must_use]
    pub const fn read(path: PathBuf, source: io::Error) -> Self {
        Self::Read { path, source }
    }

    /// Creates an invalid encoding error.
    #[must_use]
    pub const fn invalid_encoding(path: PathBuf) -> Self {
        Self::InvalidEncoding { path }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::Parse {
            language,
            message: message.into(),
        }
    }
}
