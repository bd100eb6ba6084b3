//! End-to-end tests for sas-syntax using insta for snapshot testing.

use std::fmt::Write as _;
use std::path::Path;

use insta::assert_snapshot;

use sas_syntax::{SourceProvider, SourceTree, SyntaxError, TreeSitterProvider};

/// Renders every node below the root, one per line, indented by depth.
fn render(tree: &SourceTree) -> String {
    let mut out = String::new();
    for node in tree.root().descendants() {
        let depth = node.ancestors().count().saturating_sub(1);
        let indent = "  ".repeat(depth);
        let line = if node.type_spelling().is_empty() {
            format!("{indent}{} {}", node.kind(), node.spelling())
        } else {
            format!(
                "{indent}{} {} : {}",
                node.kind(),
                node.spelling(),
                node.type_spelling()
            )
        };
        writeln!(out, "{line}").unwrap_or_else(|err| panic!("write: {err}"));
    }
    out
}

#[test]
fn c_source_lowers_to_declarations_and_expressions() {
    let source = "struct point { int x; int y; };\nint norm(struct point *p) {\n    return p->x + p->y;\n}\n";
    let tree = TreeSitterProvider::new()
        .parse(Path::new("point.c"), source)
        .unwrap_or_else(|err| panic!("lower: {err}"));

    assert_snapshot!(render(&tree), @r"
    StructDecl point : struct point
      FieldDecl x : int
      FieldDecl y : int
    FunctionDecl norm : int (struct point *)
      ParmDecl p : struct point *
      MemberRefExpr x : int
        DeclRefExpr p : struct point *
      MemberRefExpr y : int
        DeclRefExpr p : struct point *
    ");
}

#[test]
fn cpp_source_lowers_classes_and_namespaces() {
    let source = "namespace geo {\nclass Shape {\npublic:\n    virtual double area() const;\n};\n}\n";
    let tree = TreeSitterProvider::new()
        .parse(Path::new("shape.hpp"), source)
        .unwrap_or_else(|err| panic!("lower: {err}"));

    assert_snapshot!(render(&tree), @r"
    Namespace geo
      ClassDecl Shape : Shape
        CxxMethod area : double ()
    ");
}

#[test]
fn serialised_positions_are_one_based() {
    let tree = TreeSitterProvider::new()
        .parse(Path::new("one.c"), "int one;\n")
        .unwrap_or_else(|err| panic!("lower: {err}"));
    let variable = tree
        .root()
        .descendants()
        .next()
        .unwrap_or_else(|| panic!("no declaration"));

    let json = serde_json::to_string(&variable.extent())
        .unwrap_or_else(|err| panic!("serialise: {err}"));
    assert_snapshot!(json, @r#"{"start":{"line":1,"column":1},"end":{"line":1,"column":8}}"#);
}

#[test]
fn unsupported_files_are_reported() {
    let err = TreeSitterProvider::new()
        .parse(Path::new("script.py"), "print('hi')")
        .err()
        .unwrap_or_else(|| panic!("python should be rejected"));
    assert!(matches!(err, SyntaxError::UnsupportedExtension { .. }));
    assert_snapshot!(err.to_string(), @"unsupported file extension: py");
}
