//! End-to-end searches over files on disk.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use insta::assert_snapshot;
use rstest::rstest;
use tempfile::TempDir;

use sas_engine::{Match, MatchMode, ModeConfig, SearchConfig, SearchError, Searcher, search};
use sas_pattern::compile_pattern;
use sas_syntax::{NodeKind, SupportedLanguage, SyntaxError, TreeSitterProvider};

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}")),
        }
    }

    fn write(&self, name: &str, source: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, source).unwrap_or_else(|err| panic!("write {name}: {err}"));
        path
    }
}

fn find(query: &str, path: &Path, mode: MatchMode) -> Vec<Match> {
    let pattern = compile_pattern(query).unwrap_or_else(|err| panic!("compile {query:?}: {err}"));
    Searcher::new(TreeSitterProvider::new(), mode)
        .search_file(&pattern, path)
        .unwrap_or_else(|err| panic!("search {}: {err}", path.display()))
}

fn lines(matches: &[Match]) -> Vec<u32> {
    matches.iter().map(Match::line).collect()
}

fn listing(matches: &[Match]) -> String {
    let mut out = String::new();
    for found in matches {
        writeln!(out, "{} {} {}", found.line(), found.kind, found.spelling)
            .unwrap_or_else(|err| panic!("write: {err}"));
    }
    out
}

#[test]
fn named_function_is_reported_at_its_line() {
    let workspace = Workspace::new();
    let path = workspace.write(
        "named.c",
        "/* one */\n/* two */\n/* three */\n/* four */\nvoid foo(){}\n",
    );

    let matches = find(r"\F=foo", &path, MatchMode::default());
    assert_eq!(lines(&matches), vec![5]);
    assert_eq!(matches.first().map(|found| found.kind), Some(NodeKind::FunctionDecl));
    assert_eq!(matches.first().and_then(|found| found.path.clone()), Some(path));
}

#[test]
fn variable_type_filters_declarations() {
    let workspace = Workspace::new();
    let path = workspace.write("vars.c", "/* globals */\n\nint x;\nfloat y;\n");

    assert_eq!(lines(&find(r"\V:int", &path, MatchMode::default())), vec![3]);
}

#[test]
fn ellipsis_accepts_any_arity() {
    let workspace = Workspace::new();
    let path = workspace.write("arity.c", "void none(void);\nint three(int a, int b, int c);\n");

    let matches = find(r"\F(...)", &path, MatchMode::default());
    let names: Vec<&str> = matches.iter().map(|found| found.spelling.as_str()).collect();
    assert_eq!(names, vec!["none", "three"]);
}

#[test]
fn only_declared_virtual_methods_are_virtual() {
    let workspace = Workspace::new();
    let path = workspace.write(
        "shapes.cpp",
        "class Base {\npublic:\n    virtual void draw();\n};\nclass Derived : public Base {\npublic:\n    void draw();\n};\n",
    );

    let matches = find(r"\F[virtual]", &path, MatchMode::default());
    assert_eq!(lines(&matches), vec![3]);
}

#[test]
fn qualifier_selects_namespaced_function() {
    let workspace = Workspace::new();
    let path = workspace.write("ns.cpp", "namespace NS {\nvoid foo();\n}\nvoid foo();\n");

    assert_eq!(lines(&find(r"NS::\F", &path, MatchMode::default())), vec![2]);
    assert_eq!(lines(&find(r"\F = foo", &path, MatchMode::default())), vec![2, 4]);
}

#[test]
fn definitions_mode_skips_prototypes() {
    let workspace = Workspace::new();
    let path = workspace.write("area.c", "int area(int r);\nint area(int r) { return r; }\n");

    assert_eq!(lines(&find(r"\F = area", &path, MatchMode::DECLARATIONS)), vec![1, 2]);
    assert_eq!(lines(&find(r"\F = area", &path, MatchMode::DEFINITIONS)), vec![2]);
}

#[test]
fn matches_are_listed_in_source_order() {
    let workspace = Workspace::new();
    let path = workspace.write(
        "widget.cpp",
        "class Widget {\npublic:\n    Widget();\n    virtual void draw() const;\n    static int count(int a);\nprivate:\n    int size_;\n};\n\nvoid Widget::draw() const {}\nint main() {\n    Widget w;\n    w.draw();\n    return 0;\n}\n",
    );

    assert_snapshot!(listing(&find(r"\F", &path, MatchMode::default())), @r"
    3 Constructor Widget
    4 CxxMethod draw
    5 CxxMethod count
    10 CxxMethod draw
    11 FunctionDecl main
    13 CallExpr draw
    ");
}

#[test]
fn matches_serialise_with_position_and_range() {
    let pattern = compile_pattern(r"\V").unwrap_or_else(|err| panic!("compile: {err}"));
    let matches = Searcher::new(TreeSitterProvider::new(), MatchMode::default())
        .search_source(&pattern, Path::new("one.c"), "int one;\n")
        .unwrap_or_else(|err| panic!("search: {err}"));
    let found = matches.first().unwrap_or_else(|| panic!("no match"));

    assert_eq!(found.text("int one;\n"), Some("int one"));
    let json = serde_json::to_string(found).unwrap_or_else(|err| panic!("serialise: {err}"));
    assert_snapshot!(json, @r#"{"path":"one.c","kind":"VarDecl","spelling":"one","extent":{"start":{"line":1,"column":1},"end":{"line":1,"column":8}},"byte_range":{"start":0,"end":7}}"#);
    assert_snapshot!(found.to_string(), @"one.c:1:1: VarDecl one");
}

#[test]
fn unreadable_files_do_not_stop_the_search() {
    let workspace = Workspace::new();
    let missing = workspace.dir.path().join("missing.c");
    let present = workspace.write("present.c", "int counter;\n");

    let report = search(r"\V", [&missing, &present], &SearchConfig::default())
        .unwrap_or_else(|err| panic!("search: {err}"));

    assert!(!report.is_complete());
    assert_eq!(report.outcomes.len(), 2);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures.first(),
        Some((path, SyntaxError::Read { .. })) if *path == missing.as_path()
    ));
    let names: Vec<&str> = report.matches().map(|found| found.spelling.as_str()).collect();
    assert_eq!(names, vec!["counter"]);
}

#[rstest]
#[case(false, true)]
#[case(true, false)]
fn syntax_errors_are_tolerated_unless_rejected(#[case] reject: bool, #[case] complete: bool) {
    let workspace = Workspace::new();
    let path = workspace.write("broken.c", "int ok;\nint broken = ;\n");
    let config = SearchConfig {
        reject_syntax_errors: reject,
        ..SearchConfig::default()
    };

    let report = search(r"\V = ok", [&path], &config).unwrap_or_else(|err| panic!("search: {err}"));
    assert_eq!(report.is_complete(), complete);
    if reject {
        assert!(matches!(
            report.failures().next(),
            Some((_, SyntaxError::SyntaxErrors { .. }))
        ));
    }
}

#[test]
fn forced_language_overrides_the_extension() {
    let workspace = Workspace::new();
    let path = workspace.write("query.txt", "int answer;\n");
    let config = SearchConfig {
        language: Some(SupportedLanguage::C),
        ..SearchConfig::default()
    };

    let report = search(r"\V", [&path], &config).unwrap_or_else(|err| panic!("search: {err}"));
    assert_eq!(report.matches().count(), 1);
}

#[test]
fn invalid_queries_abort_before_any_file_is_read() {
    let result = search(r"\F = /foo(/", ["never-read.c"], &SearchConfig::default());
    assert!(matches!(result, Err(SearchError::Pattern(_))));
}

#[test]
fn configurations_without_match_kinds_are_rejected() {
    let config = SearchConfig {
        mode: ModeConfig {
            declarations: false,
            expressions: false,
            definitions_only: false,
        },
        ..SearchConfig::default()
    };
    let result = search(r"\F", ["never-read.c"], &config);
    let err = result.err().unwrap_or_else(|| panic!("mode should be rejected"));
    assert_snapshot!(
        err.to_string(),
        @"invalid configuration: at least one of declarations or expressions must be enabled"
    );
}
