//! Match mode flags.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Which node categories entity patterns may match.
///
/// The flags combine with `|`. At least one of [`Self::DECLARATIONS`] and
/// [`Self::EXPRESSIONS`] must be set for an entity pattern to match
/// anything.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchMode(u8);

impl MatchMode {
    /// No categories; entity patterns match nothing.
    pub const NONE: Self = Self(0);
    /// Declarations such as functions, variables, and classes.
    pub const DECLARATIONS: Self = Self(1 << 0);
    /// Expressions such as calls and references.
    pub const EXPRESSIONS: Self = Self(1 << 1);
    /// Only declarations that are also definitions.
    pub const DEFINITIONS: Self = Self(1 << 2);

    /// Returns whether every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `self` with the flags in `other` added.
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns whether declaration kinds are included. Restricting to
    /// definitions implies declarations.
    #[must_use]
    pub const fn includes_declarations(self) -> bool {
        self.contains(Self::DECLARATIONS) || self.contains(Self::DEFINITIONS)
    }

    /// Returns whether expression kinds are included.
    #[must_use]
    pub const fn includes_expressions(self) -> bool {
        self.contains(Self::EXPRESSIONS)
    }

    /// Returns whether matches must be definitions.
    #[must_use]
    pub const fn definitions_only(self) -> bool {
        self.contains(Self::DEFINITIONS)
    }
}

impl Default for MatchMode {
    fn default() -> Self {
        Self::DECLARATIONS | Self::EXPRESSIONS
    }
}

impl BitOr for MatchMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl BitOrAssign for MatchMode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Self::DECLARATIONS, "DECLARATIONS"),
            (Self::EXPRESSIONS, "EXPRESSIONS"),
            (Self::DEFINITIONS, "DEFINITIONS"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect();
        if names.is_empty() {
            f.write_str("MatchMode(NONE)")
        } else {
            write!(f, "MatchMode({})", names.join(" | "))
        }
    }
}
