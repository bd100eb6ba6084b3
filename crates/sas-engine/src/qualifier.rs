//! Qualifier resolution: which nodes below a scope an entity pattern may
//! match.

use std::iter;

use sas_pattern::Qualifiers;
use sas_syntax::{Node, NodeKind};

use crate::resolver::Matches;

/// Returns whether nodes of `kind` can appear in a qualifier chain.
#[must_use]
pub const fn is_scope_kind(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Namespace | NodeKind::ClassDecl | NodeKind::StructDecl | NodeKind::ClassTemplate
    )
}

/// Lazily yields the candidates for `qualifiers` below `scope`.
///
/// A chain expands every sibling scope whose name matches; a chain that
/// names no existing scope yields nothing.
pub(crate) fn candidates<'a>(qualifiers: &'a Qualifiers, scope: Node<'a>) -> Matches<'a> {
    match qualifiers {
        Qualifiers::Anywhere => Box::new(scope.descendants()),
        Qualifiers::FileScope => Box::new(scope.children()),
        Qualifiers::Chain(chain) => {
            let mut scopes: Matches<'a> = Box::new(iter::once(scope));
            for qualifier in chain {
                scopes = Box::new(scopes.flat_map(move |parent| {
                    parent.children().filter(move |child| {
                        is_scope_kind(child.kind()) && qualifier.is_match(child.spelling())
                    })
                }));
            }
            Box::new(scopes.flat_map(Node::children))
        }
    }
}

/// Returns whether `node` is among the candidates [`candidates`] would
/// produce for `qualifiers` below `scope`.
pub(crate) fn in_scope(qualifiers: &Qualifiers, node: Node<'_>, scope: Node<'_>) -> bool {
    match qualifiers {
        Qualifiers::Anywhere => node.is_descendant_of(scope),
        Qualifiers::FileScope => node.parent() == Some(scope),
        Qualifiers::Chain(chain) => {
            let mut current = node.parent();
            for qualifier in chain.iter().rev() {
                match current {
                    Some(parent)
                        if is_scope_kind(parent.kind())
                            && qualifier.is_match(parent.spelling()) =>
                    {
                        current = parent.parent();
                    }
                    _ => return false,
                }
            }
            current == Some(scope)
        }
    }
}
