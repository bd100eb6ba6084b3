//! Printing a pattern and compiling the text again yields the same tree.

use std::collections::BTreeSet;

use proptest::prelude::*;
use rstest::rstest;

use crate::{
    ClassPattern, FunctionPattern, NameRegex, Operator, ParameterPattern, PatternNode,
    Qualifiers, SearchPattern, VariablePattern, compile_pattern,
};

fn field() -> impl Strategy<Value = NameRegex> {
    prop_oneof![
        Just(NameRegex::any()),
        "[a-z][a-z0-9_]{0,5}".prop_map(|source| NameRegex::new(&source, 0).expect("identifier")),
    ]
}

fn qualifiers() -> impl Strategy<Value = Qualifiers> {
    prop_oneof![
        Just(Qualifiers::Anywhere),
        Just(Qualifiers::FileScope),
        prop::collection::vec(field(), 1..3).prop_map(Qualifiers::Chain),
    ]
}

fn parameter() -> impl Strategy<Value = ParameterPattern> {
    prop_oneof![
        Just(ParameterPattern::Ellipsis),
        (field(), field()).prop_map(|(name, type_name)| {
            ParameterPattern::Variable(VariablePattern {
                name,
                type_name,
                ..VariablePattern::new()
            })
        }),
    ]
}

fn parameters(max: usize) -> impl Strategy<Value = Vec<ParameterPattern>> {
    prop::collection::vec(parameter(), 0..max)
}

fn attributes() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(
        prop::sample::select(vec!["virtual", "static", "const", "public"])
            .prop_map(str::to_owned),
        0..3,
    )
}

fn function() -> impl Strategy<Value = PatternNode> {
    (
        (field(), field(), parameters(4), prop::option::of(parameters(3))),
        (attributes(), any::<bool>(), qualifiers()),
    )
        .prop_map(
            |(
                (name, return_type, params, template_parameters),
                (attributes, is_expression, qualifiers),
            )| {
                FunctionPattern {
                    name,
                    return_type,
                    parameters: params,
                    template_parameters,
                    attributes,
                    is_expression,
                    qualifiers,
                    contents: Vec::new(),
                }
                .into()
            },
        )
}

fn variable() -> impl Strategy<Value = PatternNode> {
    (
        field(),
        field(),
        attributes(),
        any::<bool>(),
        any::<bool>(),
        qualifiers(),
    )
        .prop_map(
            |(name, type_name, attributes, is_expression, is_parameter, qualifiers)| {
                VariablePattern {
                    name,
                    type_name,
                    attributes,
                    is_expression,
                    is_parameter,
                    qualifiers,
                    contents: Vec::new(),
                }
                .into()
            },
        )
}

fn class() -> impl Strategy<Value = PatternNode> {
    (field(), prop::option::of(parameters(3)), qualifiers()).prop_map(
        |(name, template_parameters, qualifiers)| {
            ClassPattern {
                name,
                template_parameters,
                qualifiers,
                contents: Vec::new(),
            }
            .into()
        },
    )
}

fn search() -> impl Strategy<Value = PatternNode> {
    (field(), qualifiers()).prop_map(|(text, qualifiers)| {
        SearchPattern {
            text,
            qualifiers,
            contents: Vec::new(),
        }
        .into()
    })
}

fn entity() -> BoxedStrategy<PatternNode> {
    prop_oneof![function(), variable(), class(), search()].boxed()
}

fn operator() -> impl Strategy<Value = Operator> {
    prop::sample::select(vec![
        Operator::And,
        Operator::Or,
        Operator::Child,
        Operator::Parent,
        Operator::NotChild,
        Operator::NotParent,
    ])
}

fn pattern() -> impl Strategy<Value = PatternNode> {
    entity().prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            (operator(), inner.clone(), inner.clone())
                .prop_map(|(op, left, right)| PatternNode::combine(op, left, right)),
            (entity(), prop::collection::vec(inner, 1..3)).prop_map(|(mut node, nested)| {
                if let Some(contents) = node.contents_mut() {
                    contents.extend(nested);
                }
                node
            }),
        ]
    })
}

proptest! {
    #[test]
    fn printed_patterns_compile_to_the_same_tree(node in pattern()) {
        let text = node.to_string();
        let reparsed = compile_pattern(&text);
        prop_assert!(reparsed.is_ok(), "{text:?} failed: {reparsed:?}");
        prop_assert_eq!(reparsed.ok(), Some(node), "{}", text);
    }
}

#[rstest]
#[case(r"\F=foo", r"\F(...) = /foo/")]
#[case(r"NS::\F[virtual]", r"/NS/::\F(...)[virtual]")]
#[case(r"::x:int", r"::\V:/int/ = /x/")]
#[case(r"#A > \V[expr] | b", r"((#/A/ > \V[expr]) | /b/)")]
#[case(r"\F=foo~\V", r"\F(...) = /foo/ { \V }")]
#[case(r"#Box<T, ...>", r"#/Box/</T/:, ...>")]
fn canonical_text(#[case] input: &str, #[case] expected: &str) {
    let node = compile_pattern(input).expect("compile");
    assert_eq!(node.to_string(), expected);
}
