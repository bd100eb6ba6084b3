//! Unit tests for sas-engine.

mod property_tests;
mod search_tests;

use std::path::Path;

use sas_pattern::{PatternNode, compile_pattern};
use sas_syntax::{SourceProvider, SourceTree, TreeSitterProvider};

/// A namespace, a class, prototypes, a definition, and a call.
pub(super) const FIXTURE: &str = "\
namespace NS {
int foo(int a, char *b);
class Box {
public:
    virtual void draw() const;
    static int count(int n);
private:
    int size_;
};
}
int foo(int a);
void run() {
    int total = 1;
    foo(total);
}
";

pub(super) fn fixture_tree() -> SourceTree {
    TreeSitterProvider::new()
        .parse(Path::new("fixture.cpp"), FIXTURE)
        .unwrap_or_else(|err| panic!("failed to lower fixture: {err}"))
}

pub(super) fn pattern(query: &str) -> PatternNode {
    compile_pattern(query).unwrap_or_else(|err| panic!("failed to compile {query:?}: {err}"))
}
