//! Arena-backed source tree and the node handle the search engine walks.
//!
//! A [`SourceTree`] owns every node record of one file. Nodes are addressed
//! through [`Node`], a `Copy` handle borrowing the tree, so traversal never
//! clones node data and never needs reference counting.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::position::Extent;

/// Declaration and expression kinds a source tree distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum NodeKind {
    /// The whole file.
    TranslationUnit,
    /// `namespace n { ... }`
    Namespace,
    /// `class C { ... }`
    ClassDecl,
    /// `struct S { ... }`
    StructDecl,
    /// `union U { ... }`
    UnionDecl,
    /// `template <...> class C { ... }`
    ClassTemplate,
    /// `enum E { ... }`
    EnumDecl,
    /// An enumerator inside an enum.
    EnumConstantDecl,
    /// `typedef T name;`
    TypedefDecl,
    /// `using name = T;`
    TypeAliasDecl,
    /// A free function declaration or definition.
    FunctionDecl,
    /// `template <...> R f(...)`
    FunctionTemplate,
    /// A member function.
    CxxMethod,
    /// A constructor.
    Constructor,
    /// A destructor.
    Destructor,
    /// A variable declaration.
    VarDecl,
    /// A data member.
    FieldDecl,
    /// A function parameter.
    ParmDecl,
    /// `typename T` in a template parameter list.
    TemplateTypeParameter,
    /// `int N` in a template parameter list.
    TemplateNonTypeParameter,
    /// `template <...> class T` in a template parameter list.
    TemplateTemplateParameter,
    /// A function or method call.
    CallExpr,
    /// A reference to a named declaration.
    DeclRefExpr,
    /// `object.member` or `pointer->member`.
    MemberRefExpr,
    /// Any other expression.
    UnexposedExpr,
}

impl NodeKind {
    /// Returns the kind name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TranslationUnit => "TranslationUnit",
            Self::Namespace => "Namespace",
            Self::ClassDecl => "ClassDecl",
            Self::StructDecl => "StructDecl",
            Self::UnionDecl => "UnionDecl",
            Self::ClassTemplate => "ClassTemplate",
            Self::EnumDecl => "EnumDecl",
            Self::EnumConstantDecl => "EnumConstantDecl",
            Self::TypedefDecl => "TypedefDecl",
            Self::TypeAliasDecl => "TypeAliasDecl",
            Self::FunctionDecl => "FunctionDecl",
            Self::FunctionTemplate => "FunctionTemplate",
            Self::CxxMethod => "CxxMethod",
            Self::Constructor => "Constructor",
            Self::Destructor => "Destructor",
            Self::VarDecl => "VarDecl",
            Self::FieldDecl => "FieldDecl",
            Self::ParmDecl => "ParmDecl",
            Self::TemplateTypeParameter => "TemplateTypeParameter",
            Self::TemplateNonTypeParameter => "TemplateNonTypeParameter",
            Self::TemplateTemplateParameter => "TemplateTemplateParameter",
            Self::CallExpr => "CallExpr",
            Self::DeclRefExpr => "DeclRefExpr",
            Self::MemberRefExpr => "MemberRefExpr",
            Self::UnexposedExpr => "UnexposedExpr",
        }
    }

    /// Returns whether the kind is an expression.
    #[must_use]
    pub const fn is_expression(self) -> bool {
        matches!(
            self,
            Self::CallExpr | Self::DeclRefExpr | Self::MemberRefExpr | Self::UnexposedExpr
        )
    }

    /// Returns whether the kind names a template parameter.
    #[must_use]
    pub const fn is_template_parameter(self) -> bool {
        matches!(
            self,
            Self::TemplateTypeParameter
                | Self::TemplateNonTypeParameter
                | Self::TemplateTemplateParameter
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// C++ member access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessSpecifier {
    /// Not a class member.
    #[default]
    Invalid,
    /// `public`
    Public,
    /// `protected`
    Protected,
    /// `private`
    Private,
}

impl AccessSpecifier {
    /// Maps an access keyword to a specifier.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "public" => Some(Self::Public),
            "protected" => Some(Self::Protected),
            "private" => Some(Self::Private),
            _ => None,
        }
    }

    /// Returns the access keyword, or `""` for [`Self::Invalid`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "",
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }
}

/// Identifier of a node within its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Attributes recorded for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Kind tag.
    pub kind: NodeKind,
    /// Name, or expression text for unnamed nodes.
    pub spelling: String,
    /// Declared or inferred type; empty when unknown.
    pub type_spelling: String,
    /// Return type of callables and calls; empty otherwise.
    pub result_type_spelling: String,
    /// One-based source extent.
    pub extent: Extent,
    /// Byte range in the source.
    pub byte_range: Range<usize>,
    /// Whether a declaration is also a definition.
    pub is_definition: bool,
    /// `virtual` member function.
    pub is_virtual: bool,
    /// `static` member or storage.
    pub is_static: bool,
    /// `const` member function, or const-qualified variable type.
    pub is_const: bool,
    /// Member access.
    pub access: AccessSpecifier,
}

impl NodeData {
    /// Creates a record with empty types and no flags set.
    #[must_use]
    pub fn new(
        kind: NodeKind,
        spelling: impl Into<String>,
        extent: Extent,
        byte_range: Range<usize>,
    ) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            type_spelling: String::new(),
            result_type_spelling: String::new(),
            extent,
            byte_range,
            is_definition: false,
            is_virtual: false,
            is_static: false,
            is_const: false,
            access: AccessSpecifier::Invalid,
        }
    }
}

/// How a child relates to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRole {
    /// An ordinary child.
    Member,
    /// A parameter of a callable or an argument of a call.
    Argument,
    /// A template parameter.
    TemplateParameter,
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    arguments: Vec<NodeId>,
    template_parameters: Vec<NodeId>,
}

impl Slot {
    const fn new(data: NodeData, parent: Option<NodeId>) -> Self {
        Self {
            data,
            parent,
            children: Vec::new(),
            arguments: Vec::new(),
            template_parameters: Vec::new(),
        }
    }
}

/// A parsed file: an arena of nodes rooted at a translation unit.
///
/// The root is held apart from the other slots so that every tree has one.
/// Identifier `0` names the root; identifier `n` names `descendants[n - 1]`.
#[derive(Debug, Clone)]
pub struct SourceTree {
    root: Slot,
    descendants: Vec<Slot>,
}

impl SourceTree {
    /// Identifier of the root node.
    pub const ROOT: NodeId = NodeId(0);

    /// Creates a tree holding only `root`.
    #[must_use]
    pub fn new(root: NodeData) -> Self {
        Self {
            root: Slot::new(root, None),
            descendants: Vec::new(),
        }
    }

    /// Returns the root node.
    #[must_use]
    pub const fn root(&self) -> Node<'_> {
        Node {
            tree: self,
            id: Self::ROOT,
            slot: &self.root,
        }
    }

    /// Returns the node with `id`, if it belongs to this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        self.slot(id).map(|slot| Node {
            tree: self,
            id,
            slot,
        })
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        match id.0.checked_sub(1) {
            None => Some(&self.root),
            Some(index) => self.descendants.get(index),
        }
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot> {
        match id.0.checked_sub(1) {
            None => Some(&mut self.root),
            Some(index) => self.descendants.get_mut(index),
        }
    }

    /// Returns the number of nodes, including the root.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.descendants.len() + 1
    }

    /// Always `false`: a tree has at least its root.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Appends a child under `parent` and returns its identifier. A parent
    /// outside this tree leaves the new node detached from the root.
    pub fn add_child(&mut self, parent: NodeId, data: NodeData, role: ChildRole) -> NodeId {
        let id = NodeId(self.len());
        let attached = self.slot_mut(parent).map(|slot| {
            slot.children.push(id);
            match role {
                ChildRole::Member => {}
                ChildRole::Argument => slot.arguments.push(id),
                ChildRole::TemplateParameter => slot.template_parameters.push(id),
            }
            parent
        });
        self.descendants.push(Slot::new(data, attached));
        id
    }

    /// Iterates over every node identifier in creation order.
    pub(crate) fn ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.len()).map(NodeId)
    }

    /// Returns a mutable view of a node's record.
    pub fn data_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.slot_mut(id).map(|slot| &mut slot.data)
    }
}

/// A node handle borrowed from a [`SourceTree`].
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t SourceTree,
    id: NodeId,
    slot: &'t Slot,
}

impl<'t> Node<'t> {
    /// Returns the node's identifier.
    #[must_use]
    pub const fn id(self) -> NodeId {
        self.id
    }

    /// Returns the tree this node belongs to.
    #[must_use]
    pub const fn tree(self) -> &'t SourceTree {
        self.tree
    }

    /// Returns the node's full record.
    #[must_use]
    pub const fn data(self) -> &'t NodeData {
        &self.slot.data
    }

    /// Returns the kind tag.
    #[must_use]
    pub const fn kind(self) -> NodeKind {
        self.slot.data.kind
    }

    /// Returns the name.
    #[must_use]
    pub fn spelling(self) -> &'t str {
        &self.slot.data.spelling
    }

    /// Returns the type spelling.
    #[must_use]
    pub fn type_spelling(self) -> &'t str {
        &self.slot.data.type_spelling
    }

    /// Returns the result type spelling of a callable or call.
    #[must_use]
    pub fn result_type_spelling(self) -> &'t str {
        &self.slot.data.result_type_spelling
    }

    /// Returns the one-based extent.
    #[must_use]
    pub const fn extent(self) -> Extent {
        self.slot.data.extent
    }

    /// Returns the byte range.
    #[must_use]
    pub fn byte_range(self) -> Range<usize> {
        self.slot.data.byte_range.clone()
    }

    /// Returns whether the declaration is a definition.
    #[must_use]
    pub const fn is_definition(self) -> bool {
        self.slot.data.is_definition
    }

    /// Returns whether the node is a virtual member function.
    #[must_use]
    pub const fn is_virtual(self) -> bool {
        self.slot.data.is_virtual
    }

    /// Returns whether the node is static.
    #[must_use]
    pub const fn is_static(self) -> bool {
        self.slot.data.is_static
    }

    /// Returns whether the node is const.
    #[must_use]
    pub const fn is_const(self) -> bool {
        self.slot.data.is_const
    }

    /// Returns the member access.
    #[must_use]
    pub const fn access_specifier(self) -> AccessSpecifier {
        self.slot.data.access
    }

    /// Returns the parent, or `None` at the root.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        self.slot.parent.and_then(|id| self.tree.node(id))
    }

    /// Iterates over direct children in source order.
    pub fn children(self) -> impl Iterator<Item = Node<'t>> + 't {
        self.resolve(&self.slot.children)
    }

    /// Iterates over parameters of a callable or arguments of a call.
    pub fn arguments(self) -> impl Iterator<Item = Node<'t>> + 't {
        self.resolve(&self.slot.arguments)
    }

    /// Iterates over template parameters.
    pub fn template_parameters(self) -> impl Iterator<Item = Node<'t>> + 't {
        self.resolve(&self.slot.template_parameters)
    }

    /// Returns whether the node declares template parameters.
    #[must_use]
    pub fn is_template(self) -> bool {
        !self.slot.template_parameters.is_empty()
    }

    /// Iterates over every node below this one in pre-order, excluding the
    /// node itself.
    #[must_use]
    pub fn descendants(self) -> Descendants<'t> {
        let mut stack = Vec::new();
        push_reversed(&mut stack, self);
        Descendants { stack }
    }

    /// Iterates from the parent up to the root.
    #[must_use]
    pub fn ancestors(self) -> Ancestors<'t> {
        Ancestors {
            next: self.parent(),
        }
    }

    /// Returns whether `self` lies strictly inside `other`'s subtree.
    #[must_use]
    pub fn is_descendant_of(self, other: Self) -> bool {
        self.ancestors().any(|ancestor| ancestor == other)
    }

    fn resolve(self, ids: &'t [NodeId]) -> impl Iterator<Item = Node<'t>> + 't {
        let tree = self.tree;
        ids.iter().filter_map(move |id| tree.node(*id))
    }
}

fn push_reversed<'t>(stack: &mut Vec<Node<'t>>, node: Node<'t>) {
    let start = stack.len();
    stack.extend(node.children());
    if let Some(pushed) = stack.get_mut(start..) {
        pushed.reverse();
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id.0)
            .field("kind", &self.kind())
            .field("spelling", &self.spelling())
            .field("extent", &self.extent())
            .finish()
    }
}

/// Pre-order iterator over a subtree, driven by an explicit stack.
#[derive(Debug, Clone)]
pub struct Descendants<'t> {
    stack: Vec<Node<'t>>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        push_reversed(&mut self.stack, node);
        Some(node)
    }
}

/// Iterator from a node's parent up to the root.
#[derive(Debug, Clone)]
pub struct Ancestors<'t> {
    next: Option<Node<'t>>,
}

impl<'t> Iterator for Ancestors<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.parent();
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn data(kind: NodeKind, spelling: &str) -> NodeData {
        NodeData::new(
            kind,
            spelling,
            Extent::new(Position::new(1, 1), Position::new(1, 2)),
            0..1,
        )
    }

    /// root
    /// ├── ns
    /// │   ├── f (params: a, b)
    /// │   └── g
    /// └── x
    fn sample() -> SourceTree {
        let mut tree = SourceTree::new(data(NodeKind::TranslationUnit, "unit"));
        let root = tree.root().id();
        let ns = tree.add_child(root, data(NodeKind::Namespace, "ns"), ChildRole::Member);
        let f = tree.add_child(ns, data(NodeKind::FunctionDecl, "f"), ChildRole::Member);
        tree.add_child(f, data(NodeKind::ParmDecl, "a"), ChildRole::Argument);
        tree.add_child(f, data(NodeKind::ParmDecl, "b"), ChildRole::Argument);
        tree.add_child(ns, data(NodeKind::FunctionDecl, "g"), ChildRole::Member);
        tree.add_child(root, data(NodeKind::VarDecl, "x"), ChildRole::Member);
        tree
    }

    fn spellings<'t>(nodes: impl Iterator<Item = Node<'t>>) -> Vec<&'t str> {
        nodes.map(Node::spelling).collect()
    }

    #[test]
    fn fresh_tree_holds_only_its_root() {
        let mut tree = SourceTree::new(data(NodeKind::TranslationUnit, "unit"));
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.root().id(), SourceTree::ROOT);
        assert_eq!(tree.root().kind(), NodeKind::TranslationUnit);
        assert_eq!(tree.root().parent(), None);
        assert_eq!(tree.node(NodeId(1)).map(Node::spelling), None);

        let child = tree.add_child(SourceTree::ROOT, data(NodeKind::VarDecl, "x"), ChildRole::Member);
        assert_eq!(child.index(), 1);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.ids().collect::<Vec<_>>(), vec![SourceTree::ROOT, child]);
        assert_eq!(spellings(tree.root().children()), vec!["x"]);
        if let Some(root) = tree.data_mut(SourceTree::ROOT) {
            root.spelling = String::from("renamed");
        }
        assert_eq!(tree.root().spelling(), "renamed");
    }

    #[test]
    fn descendants_are_pre_order_and_exclude_self() {
        let tree = sample();
        assert_eq!(
            spellings(tree.root().descendants()),
            vec!["ns", "f", "a", "b", "g", "x"]
        );
    }

    #[test]
    fn arguments_are_also_children() {
        let tree = sample();
        let f = tree
            .root()
            .descendants()
            .find(|node| node.spelling() == "f")
            .expect("f");
        assert_eq!(spellings(f.arguments()), vec!["a", "b"]);
        assert_eq!(spellings(f.children()), vec!["a", "b"]);
        assert!(!f.is_template());
    }

    #[test]
    fn ancestors_walk_to_the_root() {
        let tree = sample();
        let b = tree
            .root()
            .descendants()
            .find(|node| node.spelling() == "b")
            .expect("b");
        assert_eq!(spellings(b.ancestors()), vec!["f", "ns", "unit"]);
        assert!(b.is_descendant_of(tree.root()));
        assert!(!tree.root().is_descendant_of(b));
    }

    #[test]
    fn foreign_parent_leaves_node_detached() {
        let mut tree = sample();
        let before = tree.root().descendants().count();
        let id = tree.add_child(NodeId(usize::MAX), data(NodeKind::VarDecl, "y"), ChildRole::Member);
        let node = tree.node(id).expect("node exists");
        assert_eq!(node.parent(), None);
        assert_eq!(tree.root().descendants().count(), before);
    }
}
