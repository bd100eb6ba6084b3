//! Pattern resolution over a source tree.
//!
//! [`resolve`] turns a [`PatternNode`] into a lazy iterator of matching
//! nodes. Entity patterns draw candidates from the qualifier resolver and
//! filter them; combinators compose the iterators of their operands.
//! Nothing is collected eagerly, so a caller that stops early only pays for
//! the nodes it consumed.
//!
//! Some combinators test a single node against a pattern instead of
//! enumerating matches. [`satisfies`] answers that question relative to a
//! scope, mirroring the candidate set resolution would have produced.

use std::iter;

use sas_pattern::{Combinator, Operator, PatternNode};
use sas_syntax::{Node, SourceTree};

use crate::entity::{class_matches, function_matches, search_matches, variable_matches};
use crate::mode::MatchMode;
use crate::qualifier::{candidates, in_scope};

/// A lazy sequence of matched nodes.
pub type Matches<'a> = Box<dyn Iterator<Item = Node<'a>> + 'a>;

/// Resolves a compiled pattern under a fixed [`MatchMode`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'p> {
    pattern: &'p PatternNode,
    mode: MatchMode,
}

impl<'p> Resolver<'p> {
    /// Creates a resolver for `pattern`.
    #[must_use]
    pub const fn new(pattern: &'p PatternNode, mode: MatchMode) -> Self {
        Self { pattern, mode }
    }

    /// Returns the pattern being resolved.
    #[must_use]
    pub const fn pattern(&self) -> &'p PatternNode {
        self.pattern
    }

    /// Returns the mode.
    #[must_use]
    pub const fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Lazily yields every match in `tree`.
    #[must_use]
    pub fn matches<'a>(&self, tree: &'a SourceTree) -> Matches<'a>
    where
        'p: 'a,
    {
        resolve(self.pattern, tree.root(), self.mode)
    }

    /// Lazily yields every match below `scope`.
    #[must_use]
    pub fn matches_in<'a>(&self, scope: Node<'a>) -> Matches<'a>
    where
        'p: 'a,
    {
        resolve(self.pattern, scope, self.mode)
    }
}

/// Lazily yields the nodes below `scope` that match `pattern`.
///
/// The order is pre-order for entity patterns; combinators may repeat a
/// node (`a | a` yields each match twice).
#[must_use]
pub fn resolve<'a>(pattern: &'a PatternNode, scope: Node<'a>, mode: MatchMode) -> Matches<'a> {
    if let PatternNode::Combinator(combinator) = pattern {
        return resolve_combinator(combinator, scope, mode);
    }
    let Some(qualifiers) = pattern.qualifiers() else {
        return Box::new(iter::empty());
    };
    Box::new(candidates(qualifiers, scope).filter(move |node| entity_matches(pattern, *node, mode)))
}

/// Returns whether `node` matches `pattern` when resolved below `scope`.
#[must_use]
pub fn satisfies(pattern: &PatternNode, node: Node<'_>, scope: Node<'_>, mode: MatchMode) -> bool {
    let PatternNode::Combinator(Combinator {
        operator,
        left,
        right,
    }) = pattern
    else {
        return pattern
            .qualifiers()
            .is_some_and(|qualifiers| in_scope(qualifiers, node, scope))
            && entity_matches(pattern, node, mode);
    };
    match operator {
        Operator::Or => {
            satisfies(left, node, scope, mode) || satisfies(right, node, scope, mode)
        }
        Operator::And => {
            satisfies(left, node, scope, mode) && satisfies(right, node, scope, mode)
        }
        Operator::Child | Operator::Constraint => {
            satisfies(left, node, scope, mode) && contains_match(right, node, mode)
        }
        Operator::NotChild => {
            satisfies(left, node, scope, mode) && !contains_match(right, node, mode)
        }
        Operator::Parent => ancestors_within(node, scope).any(|ancestor| {
            satisfies(left, ancestor, scope, mode) && satisfies(right, node, ancestor, mode)
        }),
        Operator::NotParent => {
            satisfies(left, node, scope, mode) && !below_match(right, node, scope, mode)
        }
    }
}

fn resolve_combinator<'a>(
    combinator: &'a Combinator,
    scope: Node<'a>,
    mode: MatchMode,
) -> Matches<'a> {
    let left = resolve(&combinator.left, scope, mode);
    let right: &'a PatternNode = &combinator.right;
    match combinator.operator {
        Operator::Or => Box::new(left.chain(resolve(right, scope, mode))),
        Operator::And => Box::new(left.filter(move |node| satisfies(right, *node, scope, mode))),
        Operator::Child | Operator::Constraint => {
            Box::new(left.filter(move |node| contains_match(right, *node, mode)))
        }
        Operator::NotChild => Box::new(left.filter(move |node| !contains_match(right, *node, mode))),
        Operator::Parent => Box::new(left.flat_map(move |ancestor| resolve(right, ancestor, mode))),
        Operator::NotParent => {
            Box::new(left.filter(move |node| !below_match(right, *node, scope, mode)))
        }
    }
}

/// Kind, name, type, parameter, attribute, definition, and nested-content
/// checks. Qualifiers are handled by the caller.
fn entity_matches(pattern: &PatternNode, node: Node<'_>, mode: MatchMode) -> bool {
    let matched = match pattern {
        PatternNode::Function(function) => function_matches(function, node, mode),
        PatternNode::Variable(variable) => variable_matches(variable, node, mode),
        PatternNode::Class(class) => class_matches(class, node, mode),
        PatternNode::Search(search) => search_matches(search, node),
        PatternNode::Combinator(_) => false,
    };
    matched
        && (!mode.definitions_only() || node.is_definition())
        && pattern
            .contents()
            .iter()
            .all(|inner| contains_match(inner, node, mode))
}

/// Returns whether `pattern` has at least one match below `node`.
fn contains_match(pattern: &PatternNode, node: Node<'_>, mode: MatchMode) -> bool {
    resolve(pattern, node, mode).next().is_some()
}

/// Returns whether some ancestor of `node` strictly below `scope` matches
/// `pattern`.
fn below_match(pattern: &PatternNode, node: Node<'_>, scope: Node<'_>, mode: MatchMode) -> bool {
    ancestors_within(node, scope).any(|ancestor| satisfies(pattern, ancestor, scope, mode))
}

fn ancestors_within<'a>(node: Node<'a>, scope: Node<'a>) -> impl Iterator<Item = Node<'a>> {
    node.ancestors().take_while(move |ancestor| *ancestor != scope)
}
