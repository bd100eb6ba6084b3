//! Search configuration.
//!
//! Every field has a default, so an empty document deserialises to the
//! default configuration: declarations and expressions, language detected
//! from each file extension, and `info` JSON logging.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use sas_syntax::{SupportedLanguage, TreeSitterProvider};

use crate::mode::MatchMode;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

/// Errors raised by an invalid configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// Neither declarations nor expressions are enabled.
    #[error("at least one of declarations or expressions must be enabled")]
    NoMatchKinds,
}

/// Node categories to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModeConfig {
    /// Match declarations.
    pub declarations: bool,
    /// Match expressions.
    pub expressions: bool,
    /// Report only declarations that are definitions.
    pub definitions_only: bool,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            declarations: true,
            expressions: true,
            definitions_only: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_owned(),
            format: LogFormat::default(),
        }
    }
}

/// Configuration for a search invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Parse every file as this language instead of detecting it.
    pub language: Option<SupportedLanguage>,
    /// Node categories to match.
    pub mode: ModeConfig,
    /// Fail files whose syntax tree contains errors.
    pub reject_syntax_errors: bool,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl SearchConfig {
    /// Builds the [`MatchMode`] described by [`Self::mode`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoMatchKinds`] when the mode enables neither
    /// declarations nor expressions.
    pub const fn match_mode(&self) -> Result<MatchMode, ConfigError> {
        let mut mode = MatchMode::NONE;
        if self.mode.declarations {
            mode = mode.with(MatchMode::DECLARATIONS);
        }
        if self.mode.expressions {
            mode = mode.with(MatchMode::EXPRESSIONS);
        }
        if self.mode.definitions_only {
            mode = mode.with(MatchMode::DEFINITIONS);
        }
        if mode.includes_declarations() || mode.includes_expressions() {
            Ok(mode)
        } else {
            Err(ConfigError::NoMatchKinds)
        }
    }

    /// Builds the source provider described by this configuration.
    #[must_use]
    pub fn provider(&self) -> TreeSitterProvider {
        let provider = TreeSitterProvider::new().reject_syntax_errors(self.reject_syntax_errors);
        match self.language {
            Some(language) => provider.with_language(language),
            None => provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[test]
    fn empty_document_uses_defaults() {
        let config: SearchConfig = serde_json::from_str("{}").expect("valid config");
        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.match_mode(), Ok(MatchMode::default()));
    }

    #[test]
    fn partial_documents_keep_other_defaults() {
        let config: SearchConfig = serde_json::from_str(
            r#"{"language": "c", "mode": {"expressions": false}, "logging": {"format": "compact"}}"#,
        )
        .expect("valid config");
        assert_eq!(config.language, Some(SupportedLanguage::C));
        assert_eq!(config.match_mode(), Ok(MatchMode::DECLARATIONS));
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_str::<SearchConfig>(r#"{"colour": true}"#);
        assert!(result.is_err());
    }

    #[rstest]
    #[case(true, false, false, Ok(MatchMode::DECLARATIONS))]
    #[case(false, true, true, Ok(MatchMode::EXPRESSIONS | MatchMode::DEFINITIONS))]
    #[case(false, false, true, Ok(MatchMode::DEFINITIONS))]
    #[case(false, false, false, Err(ConfigError::NoMatchKinds))]
    fn match_mode_requires_a_category(
        #[case] declarations: bool,
        #[case] expressions: bool,
        #[case] definitions_only: bool,
        #[case] expected: Result<MatchMode, ConfigError>,
    ) {
        let config = SearchConfig {
            mode: ModeConfig {
                declarations,
                expressions,
                definitions_only,
            },
            ..SearchConfig::default()
        };
        assert_eq!(config.match_mode(), expected);
    }

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("Compact", LogFormat::Compact)]
    fn log_format_parses_case_insensitively(#[case] input: &str, #[case] expected: LogFormat) {
        assert_eq!(LogFormat::from_str(input), Ok(expected));
        assert_eq!(expected.to_string(), input.to_ascii_lowercase());
    }
}
