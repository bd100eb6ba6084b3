//! Pattern lexer.
//!
//! Tokenises a query such as `NS::\F[virtual] > \V:int` into a flat token
//! stream. Whitespace separates tokens but is otherwise discarded. Any run of
//! characters outside the excluded set becomes a single data token, so
//! identifiers and most regular expressions need no quoting; regexes using
//! operator characters can be wrapped as `/…/`.

use crate::error::PatternError;
use crate::token::{EntitySigil, Token, TokenKind};

/// Characters that terminate a bare data run.
const EXCLUDED_CHARS: &[char] = &[
    '<', '>', '=', '&', '|', '(', ')', '~', '!', '\\', ':', ',', '#', '{', '}', '[', ']',
];

/// Single-character punctuation tokens.
const PUNCTUATION: &[(char, TokenKind)] = &[
    ('~', TokenKind::Tilde),
    ('&', TokenKind::And),
    ('|', TokenKind::Or),
    ('(', TokenKind::LParen),
    (')', TokenKind::RParen),
    ('=', TokenKind::Equal),
    ('<', TokenKind::LAngle),
    ('>', TokenKind::RAngle),
    ('!', TokenKind::Not),
    (':', TokenKind::Colon),
    (',', TokenKind::Comma),
    ('#', TokenKind::Pound),
    ('{', TokenKind::LCurly),
    ('}', TokenKind::RCurly),
    ('[', TokenKind::LSquare),
    (']', TokenKind::RSquare),
];

fn is_data_char(c: char) -> bool {
    !c.is_whitespace() && !EXCLUDED_CHARS.contains(&c)
}

/// Tokeniser over a single query string.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer positioned at the start of `input`.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenises the whole input.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Lex`] for a backslash not followed by a known
    /// sigil letter, and for empty or unterminated `/…/` literals.
    pub fn tokenize(mut self) -> Result<Vec<Token>, PatternError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn rest(&self) -> &'a str {
        self.input.get(self.pos..).unwrap_or_default()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos = self.pos.saturating_add(rest.len().saturating_sub(trimmed.len()));
    }

    fn emit(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.pos;
        let end = start.saturating_add(len);
        self.pos = end;
        let text = self.input.get(start..end).unwrap_or_default();
        Token::new(kind, text, start..end)
    }

    fn next_token(&mut self) -> Result<Option<Token>, PatternError> {
        self.skip_whitespace();
        let rest = self.rest();
        let Some(first) = rest.chars().next() else {
            return Ok(None);
        };

        if rest.starts_with("::") {
            return Ok(Some(self.emit(TokenKind::DoubleColon, 2)));
        }
        if rest.starts_with("...") {
            return Ok(Some(self.emit(TokenKind::Ellipsis, 3)));
        }

        match first {
            '\\' => self.lex_sigil().map(Some),
            '/' => self.lex_delimited().map(Some),
            _ => {
                if let Some((_, kind)) = PUNCTUATION.iter().find(|(c, _)| *c == first) {
                    return Ok(Some(self.emit(*kind, first.len_utf8())));
                }
                let len = rest
                    .char_indices()
                    .find(|(_, c)| !is_data_char(*c))
                    .map_or(rest.len(), |(idx, _)| idx);
                Ok(Some(self.emit(TokenKind::Data, len)))
            }
        }
    }

    fn lex_sigil(&mut self) -> Result<Token, PatternError> {
        let start = self.pos;
        let letter = self.rest().chars().nth(1);
        let sigil = letter.and_then(EntitySigil::from_letter).ok_or_else(|| {
            let found = letter.map_or_else(|| String::from("end of input"), |c| format!("'{c}'"));
            PatternError::lex(
                start,
                format!("expected one of \\F, \\T, \\V, \\P but found '\\' followed by {found}"),
            )
        })?;
        Ok(self.emit(TokenKind::Sigil(sigil), 2))
    }

    fn lex_delimited(&mut self) -> Result<Token, PatternError> {
        let start = self.pos;
        let body = self.rest().get(1..).unwrap_or_default();
        let Some(close) = body.find('/') else {
            return Err(PatternError::lex(start, "unterminated '/' delimited data"));
        };
        if close == 0 {
            return Err(PatternError::lex(start, "empty '/' delimited data"));
        }
        let text = body.get(..close).unwrap_or_default();
        let end = start.saturating_add(close).saturating_add(2);
        self.pos = end;
        Ok(Token::new(TokenKind::Data, text, start..end))
    }
}

/// Tokenises `input` with a fresh [`Lexer`].
///
/// # Errors
///
/// See [`Lexer::tokenize`].
pub fn tokenize(input: &str) -> Result<Vec<Token>, PatternError> {
    Lexer::new(input).tokenize()
}
