//! Regular expressions for name, type, and text fields.

use std::fmt;

use regex::Regex;

use crate::error::PatternError;

/// Source text of the match-anything default.
pub const ANY: &str = ".*";

/// A compiled regular expression matched against the start of a spelling.
///
/// The expression is anchored at the beginning of the subject only, so
/// `foo` matches both `foo` and `foobar`; append `$` to require a full
/// match. Equality compares the source text.
#[derive(Debug, Clone)]
pub struct NameRegex {
    source: String,
    /// `None` for the match-anything default, which needs no regex.
    regex: Option<Regex>,
}

impl NameRegex {
    /// Compiles `source`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Regex`] if `source` is not a valid regular
    /// expression. `offset` locates the field in the query.
    pub fn new(source: &str, offset: usize) -> Result<Self, PatternError> {
        if source == ANY {
            return Ok(Self::any());
        }
        let regex = Regex::new(&format!("^(?:{source})"))
            .map_err(|err| PatternError::regex(source, offset, err.to_string()))?;
        Ok(Self {
            source: source.to_owned(),
            regex: Some(regex),
        })
    }

    /// Returns a fresh expression matching any spelling.
    #[must_use]
    pub fn any() -> Self {
        Self {
            source: ANY.to_owned(),
            regex: None,
        }
    }

    /// Returns the expression as written in the query.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns whether this is the match-anything default.
    #[must_use]
    pub const fn is_any(&self) -> bool {
        self.regex.is_none()
    }

    /// Tests `subject` against the expression.
    #[must_use]
    pub fn is_match(&self, subject: &str) -> bool {
        self.regex
            .as_ref()
            .is_none_or(|regex| regex.is_match(subject))
    }
}

impl Default for NameRegex {
    fn default() -> Self {
        Self::any()
    }
}

impl PartialEq for NameRegex {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for NameRegex {}

impl fmt::Display for NameRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
