//! Parameter list matching with ellipsis.
//!
//! Patterns and actual parameters are walked left to right. An ellipsis
//! makes the walk lenient: actual parameters that fail the next pattern
//! entry are skipped until one succeeds, and the first success is taken
//! without backtracking. Trailing actual parameters are accepted only while
//! lenient.

use sas_pattern::{ParameterPattern, VariablePattern};
use sas_syntax::{Node, NodeKind};

/// Matches `actual` against `patterns`, testing each pairing with
/// `accepts`.
#[must_use]
pub fn match_parameters<A>(
    patterns: &[ParameterPattern],
    actual: impl IntoIterator<Item = A>,
    mut accepts: impl FnMut(&VariablePattern, A) -> bool,
) -> bool {
    let mut remaining = actual.into_iter();
    let mut lenient = false;
    for entry in patterns {
        let ParameterPattern::Variable(expected) = entry else {
            lenient = true;
            continue;
        };
        loop {
            let Some(candidate) = remaining.next() else {
                return false;
            };
            if accepts(expected, candidate) {
                lenient = false;
                break;
            }
            if !lenient {
                return false;
            }
        }
    }
    lenient || remaining.next().is_none()
}

/// Tests one actual parameter node: its kind must be allowed, and its name
/// and type must match the pattern.
pub(crate) fn parameter_matches(
    expected: &VariablePattern,
    node: Node<'_>,
    allowed: fn(NodeKind) -> bool,
) -> bool {
    allowed(node.kind())
        && expected.name.is_match(node.spelling())
        && expected.type_name.is_match(node.type_spelling())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use sas_pattern::NameRegex;

    fn typed(type_name: &str) -> ParameterPattern {
        ParameterPattern::Variable(VariablePattern {
            type_name: NameRegex::new(type_name, 0).expect("valid regex"),
            ..VariablePattern::new()
        })
    }

    fn run(patterns: &[ParameterPattern], actual: &[&str]) -> bool {
        match_parameters(patterns, actual.iter().copied(), |expected, type_spelling| {
            expected.type_name.is_match(type_spelling)
        })
    }

    #[rstest]
    #[case(&[], true)]
    #[case(&["int"], false)]
    fn empty_list_requires_no_parameters(#[case] actual: &[&str], #[case] expected: bool) {
        assert_eq!(run(&[], actual), expected);
    }

    #[rstest]
    #[case(&[])]
    #[case(&["int"])]
    #[case(&["char", "double", "long"])]
    fn lone_ellipsis_accepts_any_list(#[case] actual: &[&str]) {
        assert!(run(&[ParameterPattern::Ellipsis], actual));
    }

    #[rstest]
    #[case(&["int"], true)]
    #[case(&["int", "char", "char"], true)]
    #[case(&["char", "int"], false)]
    #[case(&[], false)]
    fn leading_parameter_then_ellipsis(#[case] actual: &[&str], #[case] expected: bool) {
        let patterns = [typed("int"), ParameterPattern::Ellipsis];
        assert_eq!(run(&patterns, actual), expected);
    }

    #[rstest]
    #[case(&["int"], true)]
    #[case(&["char", "int"], true)]
    #[case(&["char", "int", "char"], false)]
    #[case(&["char", "char"], false)]
    fn ellipsis_then_parameter_consumes_first_success(
        #[case] actual: &[&str],
        #[case] expected: bool,
    ) {
        let patterns = [ParameterPattern::Ellipsis, typed("int")];
        assert_eq!(run(&patterns, actual), expected);
    }

    #[test]
    fn first_success_is_not_revisited() {
        // The first `int` is consumed by the ellipsis search, so the
        // strict trailing `char` is compared with `int` and fails.
        let patterns = [ParameterPattern::Ellipsis, typed("int"), typed("char")];
        assert!(!run(&patterns, &["int", "int", "char"]));
        assert!(run(&patterns, &["long", "int", "char"]));
    }

    #[test]
    fn exact_lists_require_exact_arity() {
        let patterns = [typed("int"), typed("char")];
        assert!(run(&patterns, &["int", "char"]));
        assert!(!run(&patterns, &["int", "char", "long"]));
        assert!(!run(&patterns, &["int"]));
    }

    #[test]
    fn interior_ellipsis_spans_any_gap() {
        let patterns = [typed("int"), ParameterPattern::Ellipsis, typed("char")];
        assert!(run(&patterns, &["int", "char"]));
        assert!(run(&patterns, &["int", "long", "long", "char"]));
        assert!(!run(&patterns, &["int", "long"]));
    }
}
