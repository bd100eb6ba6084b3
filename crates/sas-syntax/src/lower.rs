//! Lowering of Tree-sitter C/C++ syntax trees into [`SourceTree`]s.
//!
//! Tree-sitter produces a concrete syntax tree: declarators nest inside each
//! other, types are split across specifier nodes, and expressions carry every
//! token. Lowering keeps only the declarations and expressions a pattern can
//! name, composing type spellings the way a compiler would print them
//! (`const char *`, `int &`, `int [3]`).
//!
//! Reference expressions take the type of the nearest visible declaration of
//! the same name. Anything still untyped after the walk (uses before the
//! declaration, calls to functions declared later) is resolved by name in a
//! final pass.

use std::collections::{HashMap, HashSet};

use tree_sitter::Node as TsNode;

use crate::position::{Extent, node_extent, point_to_position};
use crate::tree::{AccessSpecifier, ChildRole, NodeData, NodeId, NodeKind, SourceTree};

/// Node kinds skipped entirely, along with their subtrees.
const IGNORED_KINDS: &[&str] = &[
    "comment",
    "preproc_include",
    "preproc_def",
    "preproc_function_def",
    "preproc_call",
    "type_descriptor",
    "friend_declaration",
    "using_declaration",
    "namespace_alias_definition",
    "attribute_declaration",
    "attribute_specifier",
    "static_assert_declaration",
    "concept_definition",
    "string_literal",
    "raw_string_literal",
    "char_literal",
];

/// Node kinds with dedicated lowering rules. Every other kind not in
/// [`IGNORED_KINDS`] is transparent: its children are lowered in its place.
const LOWERED_KINDS: &[&str] = &[
    "namespace_definition",
    "class_specifier",
    "struct_specifier",
    "union_specifier",
    "enum_specifier",
    "template_declaration",
    "function_definition",
    "declaration",
    "field_declaration",
    "type_definition",
    "alias_declaration",
    "access_specifier",
    "call_expression",
    "identifier",
    "qualified_identifier",
    "field_expression",
    "compound_statement",
    "preproc_if",
    "preproc_ifdef",
    "preproc_elif",
    "preproc_elifdef",
];

/// Lowers a Tree-sitter tree rooted at a `translation_unit`.
pub(crate) fn lower(root: TsNode<'_>, source: &str, unit_name: &str) -> SourceTree {
    let mut data = NodeData::new(
        NodeKind::TranslationUnit,
        unit_name,
        node_extent(root),
        root.byte_range(),
    );
    data.is_definition = true;
    let mut lowerer = Lowerer {
        source,
        tree: SourceTree::new(data),
        frames: Vec::new(),
        bindings: Vec::new(),
        classes: HashSet::new(),
        results: HashMap::new(),
    };
    let unit = SourceTree::ROOT;
    lowerer.lower_children(root, unit);
    lowerer.resolve_by_name();
    lowerer.tree
}

/// Lexical context of the node being lowered.
#[derive(Debug)]
enum Frame {
    Class { name: String, access: AccessSpecifier },
    Function,
}

/// A name visible in the current scope, with its type spelling.
#[derive(Debug)]
struct Binding {
    name: String,
    type_spelling: String,
}

/// The pieces of a declarator chain such as `*const (&name)[3] = value`.
#[derive(Debug, Default)]
struct Declarator<'t> {
    name: Option<TsNode<'t>>,
    function: Option<TsNode<'t>>,
    value: Option<TsNode<'t>>,
    pointers: String,
    arrays: String,
    outer_pointer_const: Option<bool>,
    function_pointer: Option<String>,
}

impl Declarator<'_> {
    fn compose_type(&self, base: &str) -> String {
        if let Some(signature) = &self.function_pointer {
            format!("{base} {signature}")
        } else if !self.pointers.is_empty() {
            format!("{base} {}{}", self.pointers, self.arrays)
        } else if !self.arrays.is_empty() {
            format!("{base} {}", self.arrays)
        } else {
            base.to_owned()
        }
    }
}

/// The type written before the declarators of a declaration.
#[derive(Debug, Default)]
struct BaseType {
    spelling: String,
    is_const: bool,
}

struct Parameter<'t> {
    node: TsNode<'t>,
    name: String,
    type_spelling: String,
}

struct Lowerer<'s> {
    source: &'s str,
    tree: SourceTree,
    frames: Vec<Frame>,
    bindings: Vec<Binding>,
    classes: HashSet<String>,
    /// Result types of functions seen so far, by name.
    results: HashMap<String, String>,
}

impl<'s> Lowerer<'s> {
    fn text(&self, node: TsNode<'_>) -> &'s str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    fn normalised_text(&self, node: TsNode<'_>) -> String {
        normalise(self.text(node))
    }

    fn push(&mut self, parent: NodeId, role: ChildRole, data: NodeData) -> NodeId {
        self.tree.add_child(parent, data, role)
    }

    fn bind(&mut self, name: &str, type_spelling: &str) {
        if name.is_empty() {
            return;
        }
        self.bindings.push(Binding {
            name: name.to_owned(),
            type_spelling: type_spelling.to_owned(),
        });
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|binding| binding.name == name)
            .map(|binding| binding.type_spelling.as_str())
    }

    /// Runs `body` with bindings it adds dropped afterwards.
    fn scoped(&mut self, body: impl FnOnce(&mut Self)) {
        let mark = self.bindings.len();
        body(self);
        self.bindings.truncate(mark);
    }

    fn member_context(&self) -> Option<(&str, AccessSpecifier)> {
        match self.frames.last() {
            Some(Frame::Class { name, access }) => Some((name.as_str(), *access)),
            Some(Frame::Function) | None => None,
        }
    }

    fn member_access(&self) -> AccessSpecifier {
        self.member_context()
            .map_or(AccessSpecifier::Invalid, |(_, access)| access)
    }

    /// Lowers the named children of `node` under `parent`.
    ///
    /// Transparent wrappers such as operators and parentheses are flattened
    /// through a work stack rather than by recursion, so long expression
    /// chains do not deepen the call stack.
    fn lower_children(&mut self, node: TsNode<'_>, parent: NodeId) {
        let mut pending = Vec::new();
        push_named_children(&mut pending, node);
        while let Some(child) = pending.pop() {
            if is_transparent(child.kind()) {
                push_named_children(&mut pending, child);
            } else {
                self.lower_node(child, parent);
            }
        }
    }

    /// Lowers `node` under `parent`, returning the primary node created.
    fn lower_node(&mut self, node: TsNode<'_>, parent: NodeId) -> Option<NodeId> {
        if is_transparent(node.kind()) {
            self.lower_children(node, parent);
            return None;
        }
        match node.kind() {
            "namespace_definition" => self.lower_namespace(node, parent),
            "class_specifier" | "struct_specifier" | "union_specifier" => {
                self.lower_record(node, parent, None)
            }
            "enum_specifier" => self.lower_enum(node, parent, None),
            "template_declaration" => self.lower_template(node, parent),
            "function_definition" => self.lower_function_definition(node, parent),
            "declaration" | "field_declaration" => self.lower_declaration(node, parent),
            "type_definition" => self.lower_typedef(node, parent),
            "alias_declaration" => self.lower_alias(node, parent),
            "access_specifier" => {
                self.update_access(node);
                None
            }
            "call_expression" | "identifier" | "qualified_identifier" | "field_expression" => {
                self.lower_expression(node, parent, ChildRole::Member)
            }
            "compound_statement" => {
                self.scoped(|this| this.lower_children(node, parent));
                None
            }
            "preproc_if" | "preproc_ifdef" | "preproc_elif" | "preproc_elifdef" => {
                self.lower_preprocessor_branch(node, parent);
                None
            }
            _ => None,
        }
    }

    fn lower_preprocessor_branch(&mut self, node: TsNode<'_>, parent: NodeId) {
        let skipped: Vec<usize> = ["condition", "name"]
            .iter()
            .filter_map(|field| node.child_by_field_name(field))
            .map(|child| child.id())
            .collect();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if !skipped.contains(&child.id()) {
                self.lower_node(child, parent);
            }
        }
    }

    fn update_access(&mut self, node: TsNode<'_>) {
        let keyword = self.text(node).trim();
        if let (Some(Frame::Class { access, .. }), Some(new)) =
            (self.frames.last_mut(), AccessSpecifier::from_keyword(keyword))
        {
            *access = new;
        }
    }

    fn lower_namespace(&mut self, node: TsNode<'_>, parent: NodeId) -> Option<NodeId> {
        let names: Vec<String> = match node.child_by_field_name("name") {
            Some(name) if name.kind() == "nested_namespace_specifier" => self
                .text(name)
                .split("::")
                .map(|segment| segment.trim().trim_start_matches("inline").trim().to_owned())
                .collect(),
            Some(name) => vec![self.normalised_text(name)],
            None => vec![String::new()],
        };

        let mut scope = parent;
        let mut first = None;
        for name in names {
            let mut data = NodeData::new(
                NodeKind::Namespace,
                name,
                node_extent(node),
                node.byte_range(),
            );
            data.is_definition = true;
            scope = self.push(scope, ChildRole::Member, data);
            first.get_or_insert(scope);
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.scoped(|this| this.lower_children(body, scope));
        }
        first
    }

    /// Lowers a class, struct, or union. `fallback_name` names anonymous
    /// records introduced by a typedef.
    fn lower_record(
        &mut self,
        node: TsNode<'_>,
        parent: NodeId,
        fallback_name: Option<&str>,
    ) -> Option<NodeId> {
        let kind = match node.kind() {
            "class_specifier" => NodeKind::ClassDecl,
            "struct_specifier" => NodeKind::StructDecl,
            _ => NodeKind::UnionDecl,
        };
        let name = node
            .child_by_field_name("name")
            .map(|name| self.type_name(name))
            .or_else(|| fallback_name.map(str::to_owned))
            .unwrap_or_default();
        let body = node.child_by_field_name("body");

        let mut data = NodeData::new(kind, name.clone(), node_extent(node), node.byte_range());
        data.type_spelling = record_type_spelling(kind, &name);
        data.is_definition = body.is_some();
        data.access = self.member_access();
        let id = self.push(parent, ChildRole::Member, data);

        if let Some(body) = body {
            if !name.is_empty() {
                self.classes.insert(name.clone());
            }
            let access = if kind == NodeKind::ClassDecl {
                AccessSpecifier::Private
            } else {
                AccessSpecifier::Public
            };
            self.frames.push(Frame::Class { name, access });
            self.scoped(|this| this.lower_children(body, id));
            self.frames.pop();
        }
        Some(id)
    }

    fn lower_enum(
        &mut self,
        node: TsNode<'_>,
        parent: NodeId,
        fallback_name: Option<&str>,
    ) -> Option<NodeId> {
        let name = node
            .child_by_field_name("name")
            .map(|name| self.type_name(name))
            .or_else(|| fallback_name.map(str::to_owned))
            .unwrap_or_default();
        let body = node.child_by_field_name("body");

        let mut data = NodeData::new(
            NodeKind::EnumDecl,
            name.clone(),
            node_extent(node),
            node.byte_range(),
        );
        data.is_definition = body.is_some();
        data.access = self.member_access();
        let id = self.push(parent, ChildRole::Member, data);

        let Some(body) = body else {
            return Some(id);
        };
        let mut cursor = body.walk();
        for enumerator in body.named_children(&mut cursor) {
            if enumerator.kind() != "enumerator" {
                continue;
            }
            let Some(constant) = enumerator.child_by_field_name("name") else {
                continue;
            };
            let spelling = self.normalised_text(constant);
            let mut constant_data = NodeData::new(
                NodeKind::EnumConstantDecl,
                spelling.clone(),
                node_extent(enumerator),
                enumerator.byte_range(),
            );
            constant_data.type_spelling.clone_from(&name);
            constant_data.is_definition = true;
            let constant_id = self.push(id, ChildRole::Member, constant_data);
            self.bind(&spelling, &name);
            if let Some(value) = enumerator.child_by_field_name("value") {
                self.lower_node(value, constant_id);
            }
        }
        Some(id)
    }

    fn lower_template(&mut self, node: TsNode<'_>, parent: NodeId) -> Option<NodeId> {
        let parameters = node.child_by_field_name("parameters");
        let mut cursor = node.walk();
        let inner = node
            .named_children(&mut cursor)
            .find(|child| Some(child.id()) != parameters.map(|p| p.id()) && child.kind() != "comment");
        let id = inner.and_then(|inner| self.lower_node(inner, parent))?;

        let has_parameters = parameters.is_some_and(|list| list.named_child_count() > 0);
        if let Some(data) = self.tree.data_mut(id) {
            if has_parameters {
                data.kind = match data.kind {
                    NodeKind::ClassDecl | NodeKind::StructDecl | NodeKind::UnionDecl => {
                        NodeKind::ClassTemplate
                    }
                    NodeKind::FunctionDecl | NodeKind::CxxMethod => NodeKind::FunctionTemplate,
                    other => other,
                };
            }
            data.extent = node_extent(node);
            data.byte_range = node.byte_range();
        }
        if let Some(list) = parameters {
            self.lower_template_parameters(list, id);
        }
        Some(id)
    }

    fn lower_template_parameters(&mut self, list: TsNode<'_>, owner: NodeId) {
        let mut cursor = list.walk();
        for parameter in list.named_children(&mut cursor) {
            let (kind, name, type_spelling) = match parameter.kind() {
                "type_parameter_declaration" | "variadic_type_parameter_declaration" => {
                    let name = self.first_named_of_kind(parameter, "type_identifier");
                    let type_spelling = name.clone();
                    (NodeKind::TemplateTypeParameter, name, type_spelling)
                }
                "optional_type_parameter_declaration" => {
                    let name = parameter
                        .child_by_field_name("name")
                        .map(|name| self.normalised_text(name))
                        .unwrap_or_default();
                    let type_spelling = name.clone();
                    (NodeKind::TemplateTypeParameter, name, type_spelling)
                }
                "parameter_declaration"
                | "optional_parameter_declaration"
                | "variadic_parameter_declaration" => {
                    let described = self.describe_parameter(parameter);
                    (
                        NodeKind::TemplateNonTypeParameter,
                        described.name,
                        described.type_spelling,
                    )
                }
                "template_template_parameter_declaration" => {
                    let name = last_named_child(parameter)
                        .map(|declared| self.first_named_of_kind(declared, "type_identifier"))
                        .unwrap_or_default();
                    (NodeKind::TemplateTemplateParameter, name, String::new())
                }
                _ => continue,
            };
            let mut data = NodeData::new(kind, name, node_extent(parameter), parameter.byte_range());
            data.type_spelling = type_spelling;
            data.is_definition = true;
            self.push(owner, ChildRole::TemplateParameter, data);
        }
    }

    fn lower_function_definition(&mut self, node: TsNode<'_>, parent: NodeId) -> Option<NodeId> {
        let declarator = node.child_by_field_name("declarator")?;
        let info = self.unwrap_declarator(declarator);
        let function = info.function?;
        let base = self.base_type(node);
        let body = node.child_by_field_name("body");
        Some(self.lower_function(node, &info, function, &base, parent, body))
    }

    fn lower_declaration(&mut self, node: TsNode<'_>, parent: NodeId) -> Option<NodeId> {
        let mut cursor = node.walk();
        let declarators: Vec<TsNode<'_>> =
            node.children_by_field_name("declarator", &mut cursor).collect();

        // `struct S;` declares only its type.
        let type_only = node
            .child_by_field_name("type")
            .filter(|type_node| declarators.is_empty() && is_record_or_enum(type_node.kind()));
        let mut first = inline_type_definition(node)
            .or(type_only)
            .and_then(|type_node| self.lower_node(type_node, parent));

        let base = self.base_type(node);
        for declarator in declarators {
            let info = self.unwrap_declarator(declarator);
            let id = match info.function {
                Some(function) => self.lower_function(node, &info, function, &base, parent, None),
                None => self.lower_variable(node, declarator, &info, &base, parent),
            };
            first.get_or_insert(id);
        }
        first
    }

    fn lower_typedef(&mut self, node: TsNode<'_>, parent: NodeId) -> Option<NodeId> {
        let mut cursor = node.walk();
        let declarators: Vec<TsNode<'_>> =
            node.children_by_field_name("declarator", &mut cursor).collect();
        let first_name = declarators
            .first()
            .and_then(|declarator| self.unwrap_declarator(*declarator).name)
            .map(|name| self.normalised_text(name));

        let mut first =
            inline_type_definition(node).and_then(|type_node| match type_node.kind() {
                "enum_specifier" => self.lower_enum(type_node, parent, first_name.as_deref()),
                _ => self.lower_record(type_node, parent, first_name.as_deref()),
            });

        let base = self.base_type(node);
        for declarator in declarators {
            let info = self.unwrap_declarator(declarator);
            let name = info
                .name
                .map(|name| self.normalised_text(name))
                .unwrap_or_default();
            let underlying = if base.spelling.is_empty() {
                first_name.clone().unwrap_or_default()
            } else {
                info.compose_type(&base.spelling)
            };
            let mut data = NodeData::new(
                NodeKind::TypedefDecl,
                name,
                node_extent(node),
                node.byte_range(),
            );
            data.type_spelling = underlying;
            data.is_definition = true;
            data.access = self.member_access();
            let id = self.push(parent, ChildRole::Member, data);
            first.get_or_insert(id);
        }
        first
    }

    fn lower_alias(&mut self, node: TsNode<'_>, parent: NodeId) -> Option<NodeId> {
        let name = node
            .child_by_field_name("name")
            .map(|name| self.normalised_text(name))
            .unwrap_or_default();
        let mut data = NodeData::new(
            NodeKind::TypeAliasDecl,
            name,
            node_extent(node),
            node.byte_range(),
        );
        data.type_spelling = node
            .child_by_field_name("type")
            .map(|aliased| self.normalised_text(aliased))
            .unwrap_or_default();
        data.is_definition = true;
        data.access = self.member_access();
        Some(self.push(parent, ChildRole::Member, data))
    }

    fn lower_variable(
        &mut self,
        node: TsNode<'_>,
        declarator: TsNode<'_>,
        info: &Declarator<'_>,
        base: &BaseType,
        parent: NodeId,
    ) -> NodeId {
        let is_static = self.has_storage_class(node, "static");
        let in_class = self.member_context().is_some();
        let kind = if in_class && !is_static {
            NodeKind::FieldDecl
        } else {
            NodeKind::VarDecl
        };
        let name = info
            .name
            .map(|name| self.declared_name(name))
            .unwrap_or_default();
        let type_spelling = info.compose_type(&base.spelling);

        let mut data = NodeData::new(
            kind,
            name.clone(),
            span_extent(node, declarator),
            node.start_byte()..declarator.end_byte(),
        );
        data.type_spelling.clone_from(&type_spelling);
        data.is_static = is_static;
        data.is_const = info.outer_pointer_const.unwrap_or(base.is_const);
        data.is_definition = kind == NodeKind::VarDecl && !self.has_storage_class(node, "extern");
        data.access = self.member_access();
        let id = self.push(parent, ChildRole::Member, data);
        self.bind(&name, &type_spelling);

        let value = info.value.or_else(|| node.child_by_field_name("default_value"));
        if let Some(value) = value {
            self.lower_node(value, id);
        }
        id
    }

    fn lower_function(
        &mut self,
        node: TsNode<'_>,
        info: &Declarator<'_>,
        function: TsNode<'_>,
        base: &BaseType,
        parent: NodeId,
        body: Option<TsNode<'_>>,
    ) -> NodeId {
        let (name, kind) = info
            .name
            .map_or((String::new(), NodeKind::FunctionDecl), |name| {
                self.function_name_and_kind(name)
            });
        let result_type = match kind {
            NodeKind::Constructor | NodeKind::Destructor => String::from("void"),
            _ => info.compose_type(&base.spelling),
        };
        let parameters = self.describe_parameters(function);
        let parameter_types: Vec<&str> = parameters
            .iter()
            .map(|parameter| parameter.type_spelling.as_str())
            .collect();

        let mut data = NodeData::new(kind, name.clone(), node_extent(node), node.byte_range());
        data.type_spelling = format!("{result_type} ({})", parameter_types.join(", "));
        data.result_type_spelling.clone_from(&result_type);
        data.is_definition = body.is_some();
        data.is_virtual =
            has_child_kind(node, "virtual") || has_child_kind(node, "virtual_function_specifier");
        data.is_static = self.has_storage_class(node, "static");
        data.is_const = self.has_const_qualifier(function);
        data.access = self.member_access();
        let type_spelling = data.type_spelling.clone();
        let id = self.push(parent, ChildRole::Member, data);
        self.bind(&name, &type_spelling);
        self.results.entry(name).or_insert(result_type);

        let body_scope = self.bindings.len();
        for parameter in parameters {
            let mut parameter_data = NodeData::new(
                NodeKind::ParmDecl,
                parameter.name.clone(),
                node_extent(parameter.node),
                parameter.node.byte_range(),
            );
            parameter_data.type_spelling.clone_from(&parameter.type_spelling);
            parameter_data.is_definition = true;
            let parameter_id = self.push(id, ChildRole::Argument, parameter_data);
            self.bind(&parameter.name, &parameter.type_spelling);
            if let Some(default) = parameter.node.child_by_field_name("default_value") {
                self.lower_node(default, parameter_id);
            }
        }

        if let Some(body) = body {
            self.frames.push(Frame::Function);
            if let Some(initialisers) = first_child_of_kind(node, "field_initializer_list") {
                self.lower_children(initialisers, id);
            }
            self.lower_node(body, id);
            self.frames.pop();
        }
        self.bindings.truncate(body_scope);
        id
    }

    fn describe_parameters<'t>(&self, function: TsNode<'t>) -> Vec<Parameter<'t>> {
        let Some(list) = function.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut cursor = list.walk();
        list.named_children(&mut cursor)
            .filter(|parameter| {
                matches!(
                    parameter.kind(),
                    "parameter_declaration"
                        | "optional_parameter_declaration"
                        | "variadic_parameter_declaration"
                )
            })
            .filter(|parameter| !self.is_void_parameter(*parameter))
            .map(|parameter| self.describe_parameter(parameter))
            .collect()
    }

    fn describe_parameter<'t>(&self, parameter: TsNode<'t>) -> Parameter<'t> {
        let base = self.base_type(parameter);
        let declarator = parameter.child_by_field_name("declarator");
        let info = declarator
            .map(|declarator| self.unwrap_declarator(declarator))
            .unwrap_or_default();
        let name = info
            .name
            .map(|name| self.normalised_text(name))
            .unwrap_or_default();
        let mut type_spelling = info.compose_type(&base.spelling);
        if parameter.kind() == "variadic_parameter_declaration" {
            type_spelling.push_str("...");
        }
        Parameter {
            node: parameter,
            name,
            type_spelling,
        }
    }

    /// `f(void)` declares no parameters.
    fn is_void_parameter(&self, parameter: TsNode<'_>) -> bool {
        parameter.child_by_field_name("declarator").is_none()
            && parameter
                .child_by_field_name("type")
                .is_some_and(|type_node| self.text(type_node) == "void")
    }

    fn lower_expression(
        &mut self,
        node: TsNode<'_>,
        parent: NodeId,
        role: ChildRole,
    ) -> Option<NodeId> {
        match node.kind() {
            "call_expression" => Some(self.lower_call(node, parent, role)),
            "identifier" | "qualified_identifier" => {
                let name = self.declared_name(node);
                let mut data =
                    NodeData::new(NodeKind::DeclRefExpr, name, node_extent(node), node.byte_range());
                data.type_spelling = self.lookup(&data.spelling).unwrap_or_default().to_owned();
                Some(self.push(parent, role, data))
            }
            "field_expression" => {
                let name = node
                    .child_by_field_name("field")
                    .map(|field| self.declared_name(field))
                    .unwrap_or_default();
                let data = NodeData::new(
                    NodeKind::MemberRefExpr,
                    name,
                    node_extent(node),
                    node.byte_range(),
                );
                let id = self.push(parent, role, data);
                if let Some(object) = node.child_by_field_name("argument") {
                    self.lower_node(object, id);
                }
                Some(id)
            }
            _ => None,
        }
    }

    fn lower_call(&mut self, node: TsNode<'_>, parent: NodeId, role: ChildRole) -> NodeId {
        let callee = node.child_by_field_name("function");
        let name = callee
            .map(|callee| self.callee_name(callee))
            .unwrap_or_default();
        let mut data = NodeData::new(NodeKind::CallExpr, name, node_extent(node), node.byte_range());
        if let Some(result) = self.results.get(&data.spelling) {
            data.result_type_spelling.clone_from(result);
            data.type_spelling.clone_from(result);
        }
        let id = self.push(parent, role, data);

        match callee {
            Some(callee) if callee.kind() == "field_expression" => {
                if let Some(object) = callee.child_by_field_name("argument") {
                    self.lower_node(object, id);
                }
            }
            Some(callee)
                if !matches!(
                    callee.kind(),
                    "identifier" | "qualified_identifier" | "template_function"
                ) =>
            {
                self.lower_node(callee, id);
            }
            _ => {}
        }

        if let Some(arguments) = node.child_by_field_name("arguments") {
            let mut cursor = arguments.walk();
            for argument in arguments.named_children(&mut cursor) {
                if argument.kind() != "comment" {
                    self.lower_argument(argument, id);
                }
            }
        }
        id
    }

    fn lower_argument(&mut self, argument: TsNode<'_>, call: NodeId) {
        if self
            .lower_expression(argument, call, ChildRole::Argument)
            .is_some()
        {
            return;
        }
        let mut data = NodeData::new(
            NodeKind::UnexposedExpr,
            self.normalised_text(argument),
            node_extent(argument),
            argument.byte_range(),
        );
        data.type_spelling = literal_type(argument.kind(), self.text(argument)).to_owned();
        let id = self.push(call, ChildRole::Argument, data);
        self.lower_children(argument, id);
    }

    fn callee_name(&self, callee: TsNode<'_>) -> String {
        match callee.kind() {
            "field_expression" => callee
                .child_by_field_name("field")
                .map(|field| self.declared_name(field))
                .unwrap_or_default(),
            "identifier" | "qualified_identifier" | "template_function" => {
                self.declared_name(callee)
            }
            _ => String::new(),
        }
    }

    /// Returns the unqualified name of an identifier-like node, stripping
    /// scopes (`a::b::f` is `f`) and template arguments (`f<int>` is `f`).
    fn declared_name(&self, node: TsNode<'_>) -> String {
        let mut current = node;
        loop {
            match current.kind() {
                "qualified_identifier" | "template_function" | "template_method" => {
                    match current.child_by_field_name("name") {
                        Some(name) => current = name,
                        None => return self.normalised_text(current),
                    }
                }
                _ => return self.normalised_text(current),
            }
        }
    }

    fn type_name(&self, node: TsNode<'_>) -> String {
        match node.kind() {
            "template_type" | "qualified_type_identifier" => node
                .child_by_field_name("name")
                .map_or_else(|| self.normalised_text(node), |name| self.type_name(name)),
            _ => self.normalised_text(node),
        }
    }

    fn function_name_and_kind(&self, name: TsNode<'_>) -> (String, NodeKind) {
        let class = self.member_context().map(|(class, _)| class);
        match name.kind() {
            "destructor_name" => (self.normalised_text(name), NodeKind::Destructor),
            "qualified_identifier" => self.qualified_function(name),
            _ => {
                let spelling = self.declared_name(name);
                let kind = match class {
                    Some(class) if class == spelling => NodeKind::Constructor,
                    Some(_) => NodeKind::CxxMethod,
                    None => NodeKind::FunctionDecl,
                };
                (spelling, kind)
            }
        }
    }

    /// Classifies an out-of-line definition such as `Widget::draw`.
    fn qualified_function(&self, name: TsNode<'_>) -> (String, NodeKind) {
        let mut scope = None;
        let mut current = name;
        while current.kind() == "qualified_identifier" {
            scope = current.child_by_field_name("scope").or(scope);
            match current.child_by_field_name("name") {
                Some(inner) => current = inner,
                None => break,
            }
        }
        let spelling = self.declared_name(current);
        if current.kind() == "destructor_name" {
            return (spelling, NodeKind::Destructor);
        }
        let scope_name = scope.map(|scope| self.type_name(scope)).unwrap_or_default();
        let kind = if !scope_name.is_empty() && scope_name == spelling {
            NodeKind::Constructor
        } else if self.classes.contains(&scope_name) {
            NodeKind::CxxMethod
        } else {
            NodeKind::FunctionDecl
        };
        (spelling, kind)
    }

    /// Follows a declarator chain down to the declared name.
    fn unwrap_declarator<'t>(&self, declarator: TsNode<'t>) -> Declarator<'t> {
        let mut info = Declarator::default();
        let mut current = Some(declarator);
        while let Some(node) = current {
            current = match node.kind() {
                "init_declarator" => {
                    info.value = node.child_by_field_name("value");
                    node.child_by_field_name("declarator")
                }
                "pointer_declarator" | "abstract_pointer_declarator" => {
                    let is_const = self.has_const_qualifier(node);
                    info.outer_pointer_const.get_or_insert(is_const);
                    info.pointers.push('*');
                    if is_const {
                        info.pointers.push_str("const");
                    }
                    node.child_by_field_name("declarator")
                }
                "reference_declarator" | "abstract_reference_declarator" => {
                    let marker = node.child(0).map_or("&", |token| self.text(token));
                    info.pointers.push_str(marker);
                    last_named_child(node)
                }
                "array_declarator" | "abstract_array_declarator" => {
                    let size = node
                        .child_by_field_name("size")
                        .map(|size| self.normalised_text(size))
                        .unwrap_or_default();
                    info.arrays = format!("[{size}]{}", info.arrays);
                    node.child_by_field_name("declarator")
                }
                "parenthesized_declarator" => node.named_child(0),
                "function_declarator" | "abstract_function_declarator" => {
                    let inner = node.child_by_field_name("declarator");
                    if inner.is_some_and(|inner| inner.kind() == "parenthesized_declarator") {
                        // A function pointer: the declared entity is a variable.
                        let parameters = node
                            .child_by_field_name("parameters")
                            .map(|list| self.normalised_text(list))
                            .unwrap_or_default();
                        info.function_pointer = Some(format!("(*){parameters}"));
                    } else {
                        info.function = Some(node);
                    }
                    inner
                }
                _ => {
                    info.name = Some(node);
                    None
                }
            };
        }
        info
    }

    fn base_type(&self, declaration: TsNode<'_>) -> BaseType {
        let mut qualifiers = Vec::new();
        let mut cursor = declaration.walk();
        for child in declaration.named_children(&mut cursor) {
            if child.kind() == "type_qualifier" {
                qualifiers.push(self.normalised_text(child));
            }
        }
        let spelling = declaration
            .child_by_field_name("type")
            .map(|type_node| self.type_text(type_node))
            .unwrap_or_default();
        let is_const = qualifiers.iter().any(|qualifier| qualifier == "const");
        qualifiers.push(spelling);
        qualifiers.retain(|part| !part.is_empty());
        BaseType {
            spelling: qualifiers.join(" "),
            is_const,
        }
    }

    /// Spells a type specifier. Records and enums defined inline are
    /// spelled by name only.
    fn type_text(&self, type_node: TsNode<'_>) -> String {
        if type_node.child_by_field_name("body").is_none() {
            return self.normalised_text(type_node);
        }
        type_node
            .child_by_field_name("name")
            .map(|name| self.type_name(name))
            .unwrap_or_default()
    }

    fn has_storage_class(&self, declaration: TsNode<'_>, keyword: &str) -> bool {
        let mut cursor = declaration.walk();
        declaration
            .named_children(&mut cursor)
            .any(|child| child.kind() == "storage_class_specifier" && self.text(child) == keyword)
    }

    fn has_const_qualifier(&self, node: TsNode<'_>) -> bool {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .any(|child| child.kind() == "type_qualifier" && self.text(child) == "const")
    }

    fn first_named_of_kind(&self, node: TsNode<'_>, kind: &str) -> String {
        first_child_of_kind(node, kind)
            .map(|child| self.normalised_text(child))
            .unwrap_or_default()
    }

    /// Types still unknown after the walk are looked up by name among all
    /// declarations of the file.
    fn resolve_by_name(&mut self) {
        let mut values: HashMap<String, String> = HashMap::new();
        let mut functions: HashMap<String, String> = HashMap::new();
        for node in self.tree.root().descendants() {
            let spelling = node.spelling().to_owned();
            match node.kind() {
                NodeKind::VarDecl
                | NodeKind::FieldDecl
                | NodeKind::ParmDecl
                | NodeKind::EnumConstantDecl => {
                    values
                        .entry(spelling)
                        .or_insert_with(|| node.type_spelling().to_owned());
                }
                NodeKind::FunctionDecl
                | NodeKind::FunctionTemplate
                | NodeKind::CxxMethod
                | NodeKind::Constructor
                | NodeKind::Destructor => {
                    functions
                        .entry(spelling)
                        .or_insert_with(|| node.type_spelling().to_owned());
                }
                _ => {}
            }
        }

        for id in self.tree.ids() {
            let Some(data) = self.tree.data_mut(id) else {
                continue;
            };
            if !data.type_spelling.is_empty() {
                continue;
            }
            match data.kind {
                NodeKind::DeclRefExpr => {
                    if let Some(found) = values
                        .get(&data.spelling)
                        .or_else(|| functions.get(&data.spelling))
                    {
                        data.type_spelling.clone_from(found);
                    }
                }
                NodeKind::MemberRefExpr => {
                    if let Some(found) = values.get(&data.spelling) {
                        data.type_spelling.clone_from(found);
                    }
                }
                NodeKind::CallExpr => {
                    if let Some(found) = self.results.get(&data.spelling) {
                        data.type_spelling.clone_from(found);
                        data.result_type_spelling.clone_from(found);
                    }
                }
                _ => {}
            }
        }
    }
}

fn is_transparent(kind: &str) -> bool {
    !LOWERED_KINDS.contains(&kind) && !IGNORED_KINDS.contains(&kind)
}

/// Pushes the named children of `node` so that they pop in source order.
fn push_named_children<'t>(pending: &mut Vec<TsNode<'t>>, node: TsNode<'t>) {
    let start = pending.len();
    let mut cursor = node.walk();
    pending.extend(node.named_children(&mut cursor));
    if let Some(added) = pending.get_mut(start..) {
        added.reverse();
    }
}

fn normalise(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn record_type_spelling(kind: NodeKind, name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    match kind {
        NodeKind::StructDecl => format!("struct {name}"),
        NodeKind::UnionDecl => format!("union {name}"),
        _ => name.to_owned(),
    }
}

fn literal_type(kind: &str, text: &str) -> &'static str {
    match kind {
        "number_literal" if text.contains(['.', 'e', 'E']) && !text.starts_with("0x") => "double",
        "number_literal" => "int",
        "string_literal" | "concatenated_string" | "raw_string_literal" => "const char *",
        "char_literal" => "char",
        "true" | "false" => "bool",
        "null" | "nullptr" => "std::nullptr_t",
        _ => "",
    }
}

/// Returns the `type` of a declaration when it defines a record or enum
/// inline, as in `struct { int x; } point;`.
fn inline_type_definition(declaration: TsNode<'_>) -> Option<TsNode<'_>> {
    declaration
        .child_by_field_name("type")
        .filter(|type_node| type_node.child_by_field_name("body").is_some())
}

fn is_record_or_enum(kind: &str) -> bool {
    matches!(
        kind,
        "class_specifier" | "struct_specifier" | "union_specifier" | "enum_specifier"
    )
}

fn span_extent(start: TsNode<'_>, end: TsNode<'_>) -> Extent {
    Extent::new(
        point_to_position(start.start_position()),
        point_to_position(end.end_position()),
    )
}

fn has_child_kind(node: TsNode<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|child| child.kind() == kind)
}

fn first_child_of_kind<'t>(node: TsNode<'t>, kind: &str) -> Option<TsNode<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .find(|child| child.kind() == kind)
}

fn last_named_child(node: TsNode<'_>) -> Option<TsNode<'_>> {
    node.named_child_count()
        .checked_sub(1)
        .and_then(|index| node.named_child(index))
}
