//! Node-level predicates for entity patterns.
//!
//! Each check runs in order and stops at the first failure: kind, name,
//! type, parameters, template parameters, then attributes. Qualifier and
//! nested-content checks belong to the [resolver](crate::resolver).

use sas_pattern::{
    ClassPattern, FunctionPattern, ParameterPattern, SearchPattern, VariablePattern,
};
use sas_syntax::{Node, NodeKind};

use crate::attributes::matches_attributes;
use crate::mode::MatchMode;
use crate::params::{match_parameters, parameter_matches};

/// Returns whether `kind` is a function declaration kind.
#[must_use]
pub const fn is_function_declaration(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::FunctionDecl
            | NodeKind::CxxMethod
            | NodeKind::FunctionTemplate
            | NodeKind::Constructor
            | NodeKind::Destructor
    )
}

/// Returns whether `kind` is a variable declaration kind.
#[must_use]
pub const fn is_variable_declaration(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::VarDecl | NodeKind::FieldDecl)
}

/// Returns whether `kind` is a variable reference kind.
#[must_use]
pub const fn is_variable_reference(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::DeclRefExpr | NodeKind::MemberRefExpr)
}

/// Returns whether `kind` is a class kind.
#[must_use]
pub const fn is_class(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::ClassDecl | NodeKind::StructDecl | NodeKind::ClassTemplate
    )
}

const fn is_parameter_declaration(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::ParmDecl)
}

/// Applies the mode mask. A pattern marked as an expression only admits
/// expression kinds; otherwise the mode decides.
const fn kind_allowed(
    is_declaration: bool,
    is_expression: bool,
    pattern_is_expression: bool,
    mode: MatchMode,
) -> bool {
    (is_declaration && !pattern_is_expression && mode.includes_declarations())
        || (is_expression && mode.includes_expressions())
}

pub(crate) fn function_matches(pattern: &FunctionPattern, node: Node<'_>, mode: MatchMode) -> bool {
    let kind = node.kind();
    let is_call = kind == NodeKind::CallExpr;
    if !kind_allowed(
        is_function_declaration(kind),
        is_call,
        pattern.is_expression,
        mode,
    ) {
        return false;
    }
    if !pattern.name.is_match(node.spelling())
        || !pattern.return_type.is_match(node.result_type_spelling())
    {
        return false;
    }

    let parameter_kinds: fn(NodeKind) -> bool = if is_call {
        NodeKind::is_expression
    } else {
        is_parameter_declaration
    };
    let parameters_match =
        match_parameters(&pattern.parameters, node.arguments(), |expected, actual| {
            parameter_matches(expected, actual, parameter_kinds)
        });
    parameters_match
        && template_parameters_match(pattern.template_parameters.as_deref(), node)
        && matches_attributes(&pattern.attributes, node)
}

pub(crate) fn variable_matches(pattern: &VariablePattern, node: Node<'_>, mode: MatchMode) -> bool {
    let kind = node.kind();
    let allowed = if pattern.is_parameter {
        is_parameter_declaration(kind) && mode.includes_declarations()
    } else {
        kind_allowed(
            is_variable_declaration(kind),
            is_variable_reference(kind),
            pattern.is_expression,
            mode,
        )
    };
    allowed
        && pattern.name.is_match(node.spelling())
        && pattern.type_name.is_match(node.type_spelling())
        && matches_attributes(&pattern.attributes, node)
}

pub(crate) fn class_matches(pattern: &ClassPattern, node: Node<'_>, mode: MatchMode) -> bool {
    is_class(node.kind())
        && mode.includes_declarations()
        && pattern.name.is_match(node.spelling())
        && template_parameters_match(pattern.template_parameters.as_deref(), node)
}

pub(crate) fn search_matches(pattern: &SearchPattern, node: Node<'_>) -> bool {
    pattern.text.is_match(node.spelling())
}

/// `None` accepts any template arity, including non-templates.
fn template_parameters_match(
    patterns: Option<&[ParameterPattern]>,
    node: Node<'_>,
) -> bool {
    patterns.is_none_or(|patterns| {
        match_parameters(patterns, node.template_parameters(), |expected, actual| {
            parameter_matches(expected, actual, NodeKind::is_template_parameter)
        })
    })
}
