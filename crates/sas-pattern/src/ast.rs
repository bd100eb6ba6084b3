//! Pattern AST produced by the [`Parser`](crate::Parser).
//!
//! A compiled query is a tree of [`PatternNode`]s: entity patterns at the
//! leaves and boolean [`Combinator`]s above them. The tree is immutable once
//! built; every collection is owned by the node that holds it.

use std::collections::BTreeSet;
use std::fmt;

use crate::name::NameRegex;

/// Where an entity pattern may match relative to its search scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Qualifiers {
    /// No qualifier written: any node at any depth below the scope.
    #[default]
    Anywhere,
    /// A leading bare `::`: only the direct children of the scope, which for
    /// a whole file means its top-level declarations.
    FileScope,
    /// `A::B::`: the children of a scope reached through this exact chain of
    /// namespaces, classes, or structs. Never empty.
    Chain(Vec<NameRegex>),
}

impl Qualifiers {
    /// Returns the qualifier chain, empty unless this is [`Self::Chain`].
    #[must_use]
    pub fn chain(&self) -> &[NameRegex] {
        match self {
            Self::Chain(chain) => chain,
            Self::Anywhere | Self::FileScope => &[],
        }
    }
}

/// Binary operators joining two patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `&`: both patterns match the same node.
    And,
    /// `|`: either pattern matches.
    Or,
    /// `>`: left matches having a right match inside them.
    Child,
    /// `<`: right matches inside a left match.
    Parent,
    /// `!>`: left matches with no right match inside them.
    NotChild,
    /// `!<`: left matches with no ancestor matching right.
    NotParent,
    /// `~`: left matches constrained to contain a right match.
    Constraint,
}

impl Operator {
    /// Returns the operator as written in a query.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "&",
            Self::Or => "|",
            Self::Child => ">",
            Self::Parent => "<",
            Self::NotChild => "!>",
            Self::NotParent => "!<",
            Self::Constraint => "~",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a parameter or template parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterPattern {
    /// A parameter constrained by name and type.
    Variable(VariablePattern),
    /// `...`: zero or more unconstrained parameters.
    Ellipsis,
}

/// A function declaration, or a call when `is_expression` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionPattern {
    /// Function name.
    pub name: NameRegex,
    /// Return type spelling.
    pub return_type: NameRegex,
    /// Parameter list; `[Ellipsis]` accepts any parameters.
    pub parameters: Vec<ParameterPattern>,
    /// Template parameters; `None` accepts templates of any arity and
    /// non-templates alike.
    pub template_parameters: Option<Vec<ParameterPattern>>,
    /// Lower-cased attribute names such as `virtual` or `public`.
    pub attributes: BTreeSet<String>,
    /// Selects call expressions instead of declarations.
    pub is_expression: bool,
    /// Scope restriction.
    pub qualifiers: Qualifiers,
    /// Patterns that must each match somewhere inside the function.
    pub contents: Vec<PatternNode>,
}

impl FunctionPattern {
    /// Creates a pattern matching any function with any parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: NameRegex::any(),
            return_type: NameRegex::any(),
            parameters: vec![ParameterPattern::Ellipsis],
            template_parameters: None,
            attributes: BTreeSet::new(),
            is_expression: false,
            qualifiers: Qualifiers::default(),
            contents: Vec::new(),
        }
    }
}

impl Default for FunctionPattern {
    fn default() -> Self {
        Self::new()
    }
}

/// A variable declaration, or a reference when `is_expression` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariablePattern {
    /// Variable name.
    pub name: NameRegex,
    /// Declared type spelling.
    pub type_name: NameRegex,
    /// Lower-cased attribute names.
    pub attributes: BTreeSet<String>,
    /// Selects reference expressions instead of declarations.
    pub is_expression: bool,
    /// Restricts matches to function parameter declarations.
    pub is_parameter: bool,
    /// Scope restriction.
    pub qualifiers: Qualifiers,
    /// Patterns that must each match somewhere inside the variable.
    pub contents: Vec<PatternNode>,
}

impl VariablePattern {
    /// Creates a pattern matching any variable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// A class, struct, or class template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassPattern {
    /// Class name.
    pub name: NameRegex,
    /// Template parameters; `None` accepts any.
    pub template_parameters: Option<Vec<ParameterPattern>>,
    /// Scope restriction.
    pub qualifiers: Qualifiers,
    /// Patterns that must each match somewhere inside the class.
    pub contents: Vec<PatternNode>,
}

impl ClassPattern {
    /// Creates a pattern matching any class.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Any node whose spelling matches `text`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPattern {
    /// Spelling regex.
    pub text: NameRegex,
    /// Scope restriction.
    pub qualifiers: Qualifiers,
    /// Patterns that must each match somewhere inside the node.
    pub contents: Vec<PatternNode>,
}

impl SearchPattern {
    /// Creates a pattern matching spellings that start with `text`.
    #[must_use]
    pub fn new(text: NameRegex) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }
}

/// Two patterns joined by an [`Operator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combinator {
    /// The operator.
    pub operator: Operator,
    /// Left operand.
    pub left: Box<PatternNode>,
    /// Right operand.
    pub right: Box<PatternNode>,
}

/// A compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternNode {
    /// `\F`, or `name:ret(params)`.
    Function(FunctionPattern),
    /// `\V`, `\P`, or `name:type`.
    Variable(VariablePattern),
    /// `\T` or `#name`.
    Class(ClassPattern),
    /// A bare regex.
    Search(SearchPattern),
    /// `L op R`.
    Combinator(Combinator),
}

impl PatternNode {
    /// Joins two patterns with `operator`.
    #[must_use]
    pub fn combine(operator: Operator, left: Self, right: Self) -> Self {
        Self::Combinator(Combinator {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Returns the scope restriction, or `None` for a combinator.
    #[must_use]
    pub const fn qualifiers(&self) -> Option<&Qualifiers> {
        match self {
            Self::Function(p) => Some(&p.qualifiers),
            Self::Variable(p) => Some(&p.qualifiers),
            Self::Class(p) => Some(&p.qualifiers),
            Self::Search(p) => Some(&p.qualifiers),
            Self::Combinator(_) => None,
        }
    }

    /// Returns the required nested patterns, empty for a combinator.
    #[must_use]
    pub fn contents(&self) -> &[Self] {
        match self {
            Self::Function(p) => &p.contents,
            Self::Variable(p) => &p.contents,
            Self::Class(p) => &p.contents,
            Self::Search(p) => &p.contents,
            Self::Combinator(_) => &[],
        }
    }

    pub(crate) const fn qualifiers_mut(&mut self) -> Option<&mut Qualifiers> {
        match self {
            Self::Function(p) => Some(&mut p.qualifiers),
            Self::Variable(p) => Some(&mut p.qualifiers),
            Self::Class(p) => Some(&mut p.qualifiers),
            Self::Search(p) => Some(&mut p.qualifiers),
            Self::Combinator(_) => None,
        }
    }

    pub(crate) const fn contents_mut(&mut self) -> Option<&mut Vec<Self>> {
        match self {
            Self::Function(p) => Some(&mut p.contents),
            Self::Variable(p) => Some(&mut p.contents),
            Self::Class(p) => Some(&mut p.contents),
            Self::Search(p) => Some(&mut p.contents),
            Self::Combinator(_) => None,
        }
    }

    /// Returns whether this is an entity pattern rather than a combinator.
    #[must_use]
    pub const fn is_entity(&self) -> bool {
        !matches!(self, Self::Combinator(_))
    }
}

impl From<FunctionPattern> for PatternNode {
    fn from(pattern: FunctionPattern) -> Self {
        Self::Function(pattern)
    }
}

impl From<VariablePattern> for PatternNode {
    fn from(pattern: VariablePattern) -> Self {
        Self::Variable(pattern)
    }
}

impl From<ClassPattern> for PatternNode {
    fn from(pattern: ClassPattern) -> Self {
        Self::Class(pattern)
    }
}

impl From<SearchPattern> for PatternNode {
    fn from(pattern: SearchPattern) -> Self {
        Self::Search(pattern)
    }
}
