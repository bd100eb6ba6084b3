//! Recursive-descent parser for the pattern language.
//!
//! Precedence from loosest to tightest: `|`, `>`, `<`, `!>` and `!<`; then
//! `&` and `~`; then the postfix forms `= name`, `~ type` and `{ scope }`;
//! then parenthesised groups and single terms. All binary operators are
//! left-associative.

use std::collections::BTreeSet;

use crate::ast::{
    ClassPattern, FunctionPattern, Operator, ParameterPattern, PatternNode, Qualifiers,
    SearchPattern, VariablePattern,
};
use crate::error::PatternError;
use crate::lexer::tokenize;
use crate::name::NameRegex;
use crate::token::{EntitySigil, Token, TokenKind};

/// Attributes that select an access specifier; at most one may be requested.
const ACCESS_ATTRIBUTES: &[&str] = &["public", "protected", "private"];

/// Attribute that selects expressions instead of declarations.
const EXPRESSION_ATTRIBUTE: &str = "expr";

/// Compiles a query string into a pattern tree.
///
/// # Errors
///
/// Returns a [`PatternError`] if the query fails to lex or parse, or if any
/// name, type, or text field is not a valid regular expression.
pub fn compile_pattern(input: &str) -> Result<PatternNode, PatternError> {
    let tokens = tokenize(input)?;
    Parser::new(tokens).parse()
}

#[derive(Debug, Default)]
struct AttributeList {
    names: BTreeSet<String>,
    is_expression: bool,
}

/// Parser over a token stream produced by the [`Lexer`](crate::Lexer).
#[derive(Debug, Clone)]
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Creates a parser positioned at the first token.
    #[must_use]
    pub const fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parses the whole token stream as a single pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Parse`] for an unexpected token or premature
    /// end of input, and [`PatternError::Regex`] for an invalid regex field.
    pub fn parse(mut self) -> Result<PatternNode, PatternError> {
        let node = self.parse_expr()?;
        match self.peek() {
            Some(token) => Err(PatternError::unexpected(
                token.offset(),
                format!("expected an operator but found {}", token.kind),
            )),
            None => Ok(node),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn kind_at(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|token| token.kind)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.kind_at(self.pos)
    }

    fn next_is(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.next_is(kind) {
            self.advance()
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, PatternError> {
        self.eat(kind).ok_or_else(|| self.error_here(expected))
    }

    fn error_here(&self, expected: &str) -> PatternError {
        self.peek().map_or_else(
            || PatternError::unexpected_end(format!("expected {expected}")),
            |token| {
                PatternError::unexpected(
                    token.offset(),
                    format!("expected {expected} but found {}", token.kind),
                )
            },
        )
    }

    fn parse_expr(&mut self) -> Result<PatternNode, PatternError> {
        let mut left = self.parse_and()?;
        while let Some(operator) = self.binary_operator()? {
            let right = self.parse_and()?;
            left = PatternNode::combine(operator, left, right);
        }
        Ok(left)
    }

    fn binary_operator(&mut self) -> Result<Option<Operator>, PatternError> {
        let (operator, width) = match self.peek_kind() {
            Some(TokenKind::Or) => (Operator::Or, 1),
            Some(TokenKind::RAngle) => (Operator::Child, 1),
            Some(TokenKind::LAngle) => (Operator::Parent, 1),
            Some(TokenKind::Not) => match self.kind_at(self.pos + 1) {
                Some(TokenKind::RAngle) => (Operator::NotChild, 2),
                Some(TokenKind::LAngle) => (Operator::NotParent, 2),
                _ => {
                    self.pos += 1;
                    return Err(self.error_here("'>' or '<' after '!'"));
                }
            },
            _ => return Ok(None),
        };
        self.pos += width;
        Ok(Some(operator))
    }

    fn parse_and(&mut self) -> Result<PatternNode, PatternError> {
        let mut left = self.parse_postfix()?;
        loop {
            if self.eat(TokenKind::And).is_some() {
                let right = self.parse_postfix()?;
                left = PatternNode::combine(Operator::And, left, right);
            } else if self.eat(TokenKind::Tilde).is_some() {
                let right = self.parse_postfix()?;
                left = constrain(left, right);
            } else {
                return Ok(left);
            }
        }
    }

    fn parse_postfix(&mut self) -> Result<PatternNode, PatternError> {
        let mut node = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                Some(TokenKind::Equal) => {
                    let equal = self.advance().map_or(0, |token| token.offset());
                    let data = self.expect(TokenKind::Data, "a name after '='")?;
                    bind_name(&mut node, &data, equal)?;
                }
                Some(TokenKind::Tilde) if self.type_binding_ahead(&node) => {
                    self.pos += 1;
                    let data = self.expect(TokenKind::Data, "a type after '~'")?;
                    bind_type(&mut node, &data)?;
                }
                Some(TokenKind::LCurly) => {
                    if let Some(inner) = self.parse_scope()? {
                        node = constrain(node, inner);
                    }
                }
                _ => return Ok(node),
            }
        }
    }

    /// `~ DATA` binds a type when the data stands alone, that is when it is
    /// followed by an operator, a closing delimiter, or the end of input.
    fn type_binding_ahead(&self, node: &PatternNode) -> bool {
        if !matches!(node, PatternNode::Function(_) | PatternNode::Variable(_)) {
            return false;
        }
        if self.kind_at(self.pos + 1) != Some(TokenKind::Data) {
            return false;
        }
        matches!(
            self.kind_at(self.pos + 2),
            None | Some(
                TokenKind::And
                    | TokenKind::Or
                    | TokenKind::Tilde
                    | TokenKind::RAngle
                    | TokenKind::LAngle
                    | TokenKind::Not
                    | TokenKind::Equal
                    | TokenKind::RParen
                    | TokenKind::RCurly
            )
        )
    }

    fn parse_scope(&mut self) -> Result<Option<PatternNode>, PatternError> {
        self.expect(TokenKind::LCurly, "'{'")?;
        if self.eat(TokenKind::RCurly).is_some() {
            return Ok(None);
        }
        let inner = self.parse_expr()?;
        self.expect(TokenKind::RCurly, "'}'")?;
        Ok(Some(inner))
    }

    fn parse_primary(&mut self) -> Result<PatternNode, PatternError> {
        if self.eat(TokenKind::LParen).is_some() {
            let inner = self.parse_expr()?;
            self.expect(TokenKind::RParen, "')'")?;
            return Ok(inner);
        }
        self.parse_term()
    }

    fn parse_term(&mut self) -> Result<PatternNode, PatternError> {
        let file_scope = self.eat(TokenKind::DoubleColon).is_some();
        let mut chain = Vec::new();
        while self.next_is(TokenKind::Data)
            && self.kind_at(self.pos + 1) == Some(TokenKind::DoubleColon)
        {
            if let Some(token) = self.advance() {
                chain.push(compile_field(&token)?);
            }
            self.pos += 1;
        }
        let qualifiers = if !chain.is_empty() {
            Qualifiers::Chain(chain)
        } else if file_scope {
            Qualifiers::FileScope
        } else {
            Qualifiers::Anywhere
        };

        let mut node = self.parse_unqualified()?;
        if let Some(slot) = node.qualifiers_mut() {
            *slot = qualifiers;
        }
        Ok(node)
    }

    fn parse_unqualified(&mut self) -> Result<PatternNode, PatternError> {
        match self.peek_kind() {
            Some(TokenKind::Sigil(sigil)) => {
                self.pos += 1;
                self.parse_sigil_entity(sigil)
            }
            Some(TokenKind::Pound) => {
                self.pos += 1;
                self.parse_class()
            }
            Some(TokenKind::Colon) => self.parse_structured(None),
            Some(TokenKind::Data) if self.kind_at(self.pos + 1) == Some(TokenKind::Colon) => {
                let name = self.advance();
                self.parse_structured(name.as_ref())
            }
            Some(TokenKind::Data) => {
                let data = self.expect(TokenKind::Data, "a pattern")?;
                Ok(SearchPattern::new(compile_field(&data)?).into())
            }
            _ => Err(self.error_here("a pattern")),
        }
    }

    fn parse_sigil_entity(&mut self, sigil: EntitySigil) -> Result<PatternNode, PatternError> {
        match sigil {
            EntitySigil::Function => {
                let mut pattern = FunctionPattern::new();
                if self.eat(TokenKind::Colon).is_some() {
                    pattern.return_type = self.parse_typename()?;
                }
                if self.template_list_ahead(true) {
                    pattern.template_parameters = Some(self.parse_template_parameters()?);
                }
                if self.next_is(TokenKind::LParen) {
                    pattern.parameters = self.parse_parameters()?;
                }
                let attributes = self.parse_optional_attributes()?;
                pattern.attributes = attributes.names;
                pattern.is_expression = attributes.is_expression;
                Ok(pattern.into())
            }
            EntitySigil::Variable | EntitySigil::Parameter => {
                let mut pattern = VariablePattern::new();
                pattern.is_parameter = sigil == EntitySigil::Parameter;
                if self.eat(TokenKind::Colon).is_some() {
                    pattern.type_name = self.parse_typename()?;
                }
                let attributes = self.parse_optional_attributes()?;
                pattern.attributes = attributes.names;
                pattern.is_expression = attributes.is_expression;
                Ok(pattern.into())
            }
            EntitySigil::Type => {
                let mut pattern = ClassPattern::new();
                if self.template_list_ahead(false) {
                    pattern.template_parameters = Some(self.parse_template_parameters()?);
                }
                Ok(pattern.into())
            }
        }
    }

    fn parse_class(&mut self) -> Result<PatternNode, PatternError> {
        let data = self.expect(TokenKind::Data, "a class name after '#'")?;
        let mut pattern = ClassPattern::new();
        pattern.name = compile_field(&data)?;
        if self.template_list_ahead(false) {
            pattern.template_parameters = Some(self.parse_template_parameters()?);
        }
        Ok(pattern.into())
    }

    /// Parses `name:type` (a variable) or `name:ret(params)` (a function).
    /// The name has already been consumed when present.
    fn parse_structured(&mut self, name_token: Option<&Token>) -> Result<PatternNode, PatternError> {
        self.expect(TokenKind::Colon, "':'")?;
        let name = name_token.map(compile_field).transpose()?.unwrap_or_default();
        let type_name = if self.next_is(TokenKind::Data) {
            self.parse_typename()?
        } else {
            NameRegex::any()
        };

        let template_parameters = if self.template_list_ahead(true) {
            Some(self.parse_template_parameters()?)
        } else {
            None
        };

        if self.next_is(TokenKind::LParen) {
            let parameters = self.parse_parameters()?;
            let attributes = self.parse_optional_attributes()?;
            return Ok(FunctionPattern {
                name,
                return_type: type_name,
                parameters,
                template_parameters,
                attributes: attributes.names,
                is_expression: attributes.is_expression,
                ..FunctionPattern::new()
            }
            .into());
        }

        let attributes = self.parse_optional_attributes()?;
        Ok(VariablePattern {
            name,
            type_name,
            attributes: attributes.names,
            is_expression: attributes.is_expression,
            ..VariablePattern::new()
        }
        .into())
    }

    /// Parses `DATA ('::' DATA)*` into a single regex over the joined text.
    fn parse_typename(&mut self) -> Result<NameRegex, PatternError> {
        let first = self.expect(TokenKind::Data, "a type name")?;
        let mut text = first.text.clone();
        while self.next_is(TokenKind::DoubleColon)
            && self.kind_at(self.pos + 1) == Some(TokenKind::Data)
        {
            self.pos += 1;
            if let Some(segment) = self.advance() {
                text.push_str("::");
                text.push_str(&segment.text);
            }
        }
        NameRegex::new(&text, first.offset())
    }

    /// A `<` opens a template parameter list only if a matching `>` is
    /// reached through parameter tokens alone. Function templates must also
    /// be followed by their parameter list. Otherwise a `>` followed by the
    /// start of an operand is the child operator, as in `#Box < size > \V`.
    fn template_list_ahead(&self, require_parameters: bool) -> bool {
        if !self.next_is(TokenKind::LAngle) {
            return false;
        }
        let mut index = self.pos + 1;
        loop {
            match self.kind_at(index) {
                Some(
                    TokenKind::Data
                    | TokenKind::Colon
                    | TokenKind::Comma
                    | TokenKind::Ellipsis
                    | TokenKind::DoubleColon,
                ) => index += 1,
                Some(TokenKind::RAngle) => {
                    let next = self.kind_at(index + 1);
                    return if require_parameters {
                        next == Some(TokenKind::LParen)
                    } else {
                        !starts_operand(next)
                    };
                }
                _ => return false,
            }
        }
    }

    fn parse_template_parameters(&mut self) -> Result<Vec<ParameterPattern>, PatternError> {
        self.parse_parameter_list(TokenKind::LAngle, TokenKind::RAngle, "'>'")
    }

    fn parse_parameters(&mut self) -> Result<Vec<ParameterPattern>, PatternError> {
        self.parse_parameter_list(TokenKind::LParen, TokenKind::RParen, "')'")
    }

    fn parse_parameter_list(
        &mut self,
        open: TokenKind,
        close: TokenKind,
        close_text: &str,
    ) -> Result<Vec<ParameterPattern>, PatternError> {
        self.expect(open, "a parameter list")?;
        let mut parameters = Vec::new();
        if self.eat(close).is_some() {
            return Ok(parameters);
        }
        loop {
            parameters.push(self.parse_parameter()?);
            if self.eat(TokenKind::Comma).is_none() {
                self.expect(close, &format!("',' or {close_text}"))?;
                return Ok(parameters);
            }
        }
    }

    fn parse_parameter(&mut self) -> Result<ParameterPattern, PatternError> {
        if self.eat(TokenKind::Ellipsis).is_some() {
            return Ok(ParameterPattern::Ellipsis);
        }
        let name = self.eat(TokenKind::Data);
        let has_colon = self.eat(TokenKind::Colon).is_some();
        if name.is_none() && !has_colon {
            return Err(self.error_here("a parameter"));
        }
        let mut pattern = VariablePattern::new();
        if let Some(token) = name {
            pattern.name = compile_field(&token)?;
        }
        if has_colon && self.next_is(TokenKind::Data) {
            pattern.type_name = self.parse_typename()?;
        }
        Ok(ParameterPattern::Variable(pattern))
    }

    fn parse_optional_attributes(&mut self) -> Result<AttributeList, PatternError> {
        let mut attributes = AttributeList::default();
        if self.eat(TokenKind::LSquare).is_none() {
            return Ok(attributes);
        }
        if self.eat(TokenKind::RSquare).is_some() {
            return Ok(attributes);
        }
        loop {
            let token = self.expect(TokenKind::Data, "an attribute name")?;
            add_attribute(&mut attributes, &token)?;
            if self.eat(TokenKind::Comma).is_none() {
                self.expect(TokenKind::RSquare, "',' or ']'")?;
                return Ok(attributes);
            }
        }
    }
}

/// Returns whether a token of `kind` can begin a pattern.
const fn starts_operand(kind: Option<TokenKind>) -> bool {
    matches!(
        kind,
        Some(
            TokenKind::Data
                | TokenKind::Sigil(_)
                | TokenKind::Pound
                | TokenKind::Colon
                | TokenKind::DoubleColon
                | TokenKind::LParen
        )
    )
}

fn compile_field(token: &Token) -> Result<NameRegex, PatternError> {
    NameRegex::new(&token.text, token.offset())
}

fn add_attribute(attributes: &mut AttributeList, token: &Token) -> Result<(), PatternError> {
    let name = token.text.to_lowercase();
    if name == EXPRESSION_ATTRIBUTE {
        attributes.is_expression = true;
        return Ok(());
    }
    if ACCESS_ATTRIBUTES.contains(&name.as_str()) {
        let conflict = attributes
            .names
            .iter()
            .find(|existing| ACCESS_ATTRIBUTES.contains(&existing.as_str()) && **existing != name);
        if let Some(existing) = conflict {
            return Err(PatternError::unexpected(
                token.offset(),
                format!("conflicting access attributes '{existing}' and '{name}'"),
            ));
        }
    }
    attributes.names.insert(name);
    Ok(())
}

/// `L ~ R` and `L { R }`: an entity gains `R` as required content, anything
/// else becomes a constraint combinator.
fn constrain(mut left: PatternNode, right: PatternNode) -> PatternNode {
    if !left.is_entity() {
        return PatternNode::combine(Operator::Constraint, left, right);
    }
    if let Some(contents) = left.contents_mut() {
        contents.push(right);
    }
    left
}

fn bind_name(node: &mut PatternNode, data: &Token, equal: usize) -> Result<(), PatternError> {
    let regex = compile_field(data)?;
    match node {
        PatternNode::Function(pattern) => pattern.name = regex,
        PatternNode::Variable(pattern) => pattern.name = regex,
        PatternNode::Class(pattern) => pattern.name = regex,
        PatternNode::Search(pattern) => pattern.text = regex,
        PatternNode::Combinator(_) => {
            return Err(PatternError::unexpected(
                equal,
                "'=' must follow a single entity, not a combined pattern",
            ));
        }
    }
    Ok(())
}

fn bind_type(node: &mut PatternNode, data: &Token) -> Result<(), PatternError> {
    let regex = compile_field(data)?;
    match node {
        PatternNode::Function(pattern) => pattern.return_type = regex,
        PatternNode::Variable(pattern) => pattern.type_name = regex,
        PatternNode::Class(_) | PatternNode::Search(_) | PatternNode::Combinator(_) => {
            return Err(PatternError::unexpected(
                data.offset(),
                "'~' type binding needs a function or variable",
            ));
        }
    }
    Ok(())
}
