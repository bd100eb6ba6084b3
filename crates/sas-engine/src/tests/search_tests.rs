//! Errors raised by the search entry point.

use rstest::rstest;

use crate::{ModeConfig, SearchConfig, SearchError, search};

fn failure_kind(error: &SearchError) -> &'static str {
    match error {
        SearchError::Pattern(_) => "pattern",
        SearchError::Config(_) => "config",
    }
}

#[rstest]
#[case(r"\F = /foo(/", true, "pattern")]
#[case(r"\F", false, "config")]
fn only_query_and_configuration_abort(
    #[case] query: &str,
    #[case] declarations: bool,
    #[case] expected: &str,
) {
    let config = SearchConfig {
        mode: ModeConfig {
            declarations,
            expressions: false,
            definitions_only: false,
        },
        ..SearchConfig::default()
    };
    let error = search(query, ["never-read.c"], &config)
        .err()
        .unwrap_or_else(|| panic!("{query:?} should abort"));
    assert_eq!(failure_kind(&error), expected);
}

#[test]
fn unreadable_files_are_reported_not_raised() {
    let report = search(r"\F", ["does-not-exist.c"], &SearchConfig::default())
        .unwrap_or_else(|err| panic!("search: {err}"));
    assert_eq!(report.failures().count(), 1);
    assert!(!report.is_complete());
}
