//! Token model produced by the [`Lexer`](crate::Lexer).

use std::fmt;
use std::ops::Range;

/// Entity marker introduced by a backslash sigil such as `\F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntitySigil {
    /// `\F`: a function declaration or call.
    Function,
    /// `\T`: a class, struct, or class template.
    Type,
    /// `\V`: a variable declaration or reference.
    Variable,
    /// `\P`: a function parameter declaration.
    Parameter,
}

impl EntitySigil {
    /// Maps the letter following `\` to a sigil.
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'F' => Some(Self::Function),
            'T' => Some(Self::Type),
            'V' => Some(Self::Variable),
            'P' => Some(Self::Parameter),
            _ => None,
        }
    }

    /// Returns the letter written after `\` for this sigil.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Function => 'F',
            Self::Type => 'T',
            Self::Variable => 'V',
            Self::Parameter => 'P',
        }
    }
}

/// The closed set of token kinds in the pattern language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A bare identifier or regex fragment, or a `/…/` delimited literal.
    Data,
    /// An entity sigil (`\F`, `\T`, `\V`, `\P`).
    Sigil(EntitySigil),
    /// `~`
    Tilde,
    /// `&`
    And,
    /// `|`
    Or,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `=`
    Equal,
    /// `<`: the parent operator, or the start of a template parameter list.
    LAngle,
    /// `>`: the child operator, or the end of a template parameter list.
    RAngle,
    /// `!`
    Not,
    /// `:`
    Colon,
    /// `::`
    DoubleColon,
    /// `,`
    Comma,
    /// `...`
    Ellipsis,
    /// `#`
    Pound,
    /// `{`
    LCurly,
    /// `}`
    RCurly,
    /// `[`
    LSquare,
    /// `]`
    RSquare,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data => f.write_str("data"),
            Self::Sigil(sigil) => write!(f, "'\\{}'", sigil.letter()),
            Self::Tilde => f.write_str("'~'"),
            Self::And => f.write_str("'&'"),
            Self::Or => f.write_str("'|'"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
            Self::Equal => f.write_str("'='"),
            Self::LAngle => f.write_str("'<'"),
            Self::RAngle => f.write_str("'>'"),
            Self::Not => f.write_str("'!'"),
            Self::Colon => f.write_str("':'"),
            Self::DoubleColon => f.write_str("'::'"),
            Self::Comma => f.write_str("','"),
            Self::Ellipsis => f.write_str("'...'"),
            Self::Pound => f.write_str("'#'"),
            Self::LCurly => f.write_str("'{'"),
            Self::RCurly => f.write_str("'}'"),
            Self::LSquare => f.write_str("'['"),
            Self::RSquare => f.write_str("']'"),
        }
    }
}

/// A lexed token with its text and byte span in the query.
///
/// For delimited data (`/…/`) the text excludes the slashes while the span
/// covers them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token kind.
    pub kind: TokenKind,
    /// The token text.
    pub text: String,
    /// Byte range of the token in the query.
    pub span: Range<usize>,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Returns the byte offset where the token starts.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.span.start
    }
}
