//! Language detection and Tree-sitter grammar selection.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Languages the Tree-sitter provider can lower into a source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedLanguage {
    /// C source files (`.c`).
    C,
    /// C++ source and header files (`.cpp`, `.cc`, `.cxx`, `.h`, `.hpp`, ...).
    #[default]
    Cpp,
}

impl SupportedLanguage {
    /// Detects the language from a file extension.
    ///
    /// Headers with a plain `.h` extension are treated as C++, whose grammar
    /// also accepts C declarations.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let normalised = ext.to_ascii_lowercase();
        match normalised.as_str() {
            "c" => Some(Self::C),
            "cc" | "cpp" | "cxx" | "c++" | "h" | "hh" | "hpp" | "hxx" | "h++" | "inl" => {
                Some(Self::Cpp)
            }
            _ => None,
        }
    }

    /// Detects the language from a file path by examining its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Returns the Tree-sitter language grammar for this language.
    #[must_use]
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Self::C => tree_sitter_c::LANGUAGE.into(),
            Self::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        }
    }

    /// Returns the lower-case identifier for this language.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cpp => "cpp",
        }
    }

    /// Returns all supported languages.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::C, Self::Cpp]
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing a language identifier fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported language: '{0}'")]
pub struct LanguageParseError(String);

impl LanguageParseError {
    /// Returns the input that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.0
    }
}

impl FromStr for SupportedLanguage {
    type Err = LanguageParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalised = input.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "c" => Ok(Self::C),
            "cpp" | "c++" | "cxx" => Ok(Self::Cpp),
            other => Err(LanguageParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("c", SupportedLanguage::C)]
    #[case("cpp", SupportedLanguage::Cpp)]
    #[case("CC", SupportedLanguage::Cpp)]
    #[case("h", SupportedLanguage::Cpp)]
    #[case("hpp", SupportedLanguage::Cpp)]
    fn from_extension_recognises_supported_languages(
        #[case] ext: &str,
        #[case] expected: SupportedLanguage,
    ) {
        assert_eq!(SupportedLanguage::from_extension(ext), Some(expected));
    }

    #[rstest]
    #[case("rs")]
    #[case("py")]
    fn from_extension_returns_none_for_unknown(#[case] ext: &str) {
        assert_eq!(SupportedLanguage::from_extension(ext), None);
    }

    #[test]
    fn from_path_returns_none_for_no_extension() {
        assert_eq!(SupportedLanguage::from_path(Path::new("Makefile")), None);
    }

    #[rstest]
    #[case("C", SupportedLanguage::C)]
    #[case(" c++ ", SupportedLanguage::Cpp)]
    fn from_str_parses_language_names(#[case] input: &str, #[case] expected: SupportedLanguage) {
        assert_eq!(SupportedLanguage::from_str(input), Ok(expected));
    }

    #[test]
    fn from_str_reports_the_rejected_input() {
        let err = "go".parse::<SupportedLanguage>().expect_err("should fail");
        assert_eq!(err.input(), "go");
    }
}
