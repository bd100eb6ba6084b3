//! Properties of the ellipsis matcher and of combinator resolution.

use std::collections::BTreeSet;

use proptest::prelude::*;

use sas_pattern::{NameRegex, ParameterPattern, VariablePattern};
use sas_syntax::NodeId;

use super::{fixture_tree, pattern};
use crate::{MatchMode, match_parameters, resolve};

const TYPES: [&str; 3] = ["int", "char", "long"];

fn typed(type_name: &str) -> ParameterPattern {
    ParameterPattern::Variable(VariablePattern {
        type_name: NameRegex::new(type_name, 0).expect("valid regex"),
        ..VariablePattern::new()
    })
}

fn matches(patterns: &[ParameterPattern], actual: &[&str]) -> bool {
    match_parameters(patterns, actual.iter().copied(), |expected, type_spelling| {
        expected.type_name.is_match(type_spelling)
    })
}

fn parameter_types() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(TYPES.to_vec()), 0..6)
}

const LEFT: [&str; 5] = [r"\F", r"\V", r"#Box", r"\F[expr]", r"\F = foo | #Box"];
const RIGHT: [&str; 5] = [r"\V = total", r"\F[virtual]", r"\P", "foo", r"\V & size"];
const NAMES: [&str; 4] = ["NS", "Box", "N", "Missing"];

fn ids(query: &str, mode: MatchMode) -> Vec<NodeId> {
    let tree = fixture_tree();
    let compiled = pattern(query);
    let found: Vec<NodeId> = resolve(&compiled, tree.root(), mode)
        .map(|node| node.id())
        .collect();
    found
}

fn modes() -> impl Strategy<Value = MatchMode> {
    prop::sample::select(vec![
        MatchMode::default(),
        MatchMode::DECLARATIONS,
        MatchMode::EXPRESSIONS,
        MatchMode::DEFINITIONS,
    ])
}

proptest! {
    #[test]
    fn empty_list_matches_only_empty(actual in parameter_types()) {
        prop_assert_eq!(matches(&[], &actual), actual.is_empty());
    }

    #[test]
    fn lone_ellipsis_matches_everything(actual in parameter_types()) {
        prop_assert!(matches(&[ParameterPattern::Ellipsis], &actual));
    }

    #[test]
    fn leading_parameter_checks_only_the_first(actual in parameter_types()) {
        let patterns = [typed("int"), ParameterPattern::Ellipsis];
        prop_assert_eq!(matches(&patterns, &actual), actual.first() == Some(&"int"));
    }

    #[test]
    fn trailing_parameter_consumes_the_first_success(actual in parameter_types()) {
        let patterns = [ParameterPattern::Ellipsis, typed("int")];
        let first_int = actual.iter().position(|type_name| *type_name == "int");
        let expected = first_int.is_some_and(|index| index + 1 == actual.len());
        prop_assert_eq!(matches(&patterns, &actual), expected);
    }

    #[test]
    fn child_and_not_child_partition_the_left_matches(
        left in prop::sample::select(LEFT.to_vec()),
        right in prop::sample::select(RIGHT.to_vec()),
        mode in modes(),
    ) {
        let all = ids(left, mode);
        let with = ids(&format!("({left}) > ({right})"), mode);
        let without = ids(&format!("({left}) !> ({right})"), mode);

        let with_set: BTreeSet<_> = with.iter().copied().collect();
        let without_set: BTreeSet<_> = without.iter().copied().collect();
        prop_assert!(with_set.is_disjoint(&without_set));
        prop_assert_eq!(with.len() + without.len(), all.len());

        let union: BTreeSet<_> = with_set.union(&without_set).copied().collect();
        let expected: BTreeSet<_> = all.iter().copied().collect();
        prop_assert_eq!(union, expected);
    }

    #[test]
    fn qualifying_narrows_the_candidates(
        name in prop::sample::select(NAMES.to_vec()),
        mode in modes(),
    ) {
        let unqualified: BTreeSet<_> = ids(r"\F", mode).into_iter().collect();
        let qualified: BTreeSet<_> = ids(&format!(r"{name}::\F"), mode).into_iter().collect();
        prop_assert!(qualified.is_subset(&unqualified));
    }

    #[test]
    fn resolution_is_deterministic(
        query in prop::sample::select(LEFT.iter().chain(RIGHT.iter()).copied().collect::<Vec<_>>()),
        mode in modes(),
    ) {
        prop_assert_eq!(ids(query, mode), ids(query, mode));
    }
}
