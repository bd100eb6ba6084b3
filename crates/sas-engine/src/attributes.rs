//! Attribute predicates such as `[virtual, const, public]`.

use std::collections::BTreeSet;

use sas_syntax::{AccessSpecifier, Node};

/// Returns whether `node` has every requested attribute. Unknown attribute
/// names hold vacuously.
pub(crate) fn matches_attributes(attributes: &BTreeSet<String>, node: Node<'_>) -> bool {
    attributes
        .iter()
        .all(|attribute| attribute_holds(attribute, node))
}

fn attribute_holds(attribute: &str, node: Node<'_>) -> bool {
    match attribute {
        "virtual" => node.is_virtual(),
        "static" => node.is_static(),
        "const" => node.is_const(),
        other => AccessSpecifier::from_keyword(other)
            .is_none_or(|access| node.access_specifier() == access),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use sas_syntax::{ChildRole, Extent, NodeData, NodeKind, SourceTree};

    fn method_tree() -> SourceTree {
        let mut tree = SourceTree::new(NodeData::new(
            NodeKind::TranslationUnit,
            "unit",
            Extent::default(),
            0..0,
        ));
        let mut data = NodeData::new(NodeKind::CxxMethod, "draw", Extent::default(), 0..0);
        data.is_virtual = true;
        data.is_const = true;
        data.access = AccessSpecifier::Protected;
        let root = tree.root().id();
        tree.add_child(root, data, ChildRole::Member);
        tree
    }

    fn attributes(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    #[rstest]
    #[case(&[], true)]
    #[case(&["virtual"], true)]
    #[case(&["virtual", "const"], true)]
    #[case(&["static"], false)]
    #[case(&["protected"], true)]
    #[case(&["public"], false)]
    #[case(&["inline"], true)]
    fn checks_each_requested_attribute(#[case] names: &[&str], #[case] expected: bool) {
        let tree = method_tree();
        let method = tree.root().children().next().expect("method");
        assert_eq!(matches_attributes(&attributes(names), method), expected);
    }
}
