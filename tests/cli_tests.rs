#![cfg(feature = "cli")]

use sieve_expr::cli::{
    CliError, DocCategory, ExplainOptions, FilterOptions, execute_explain, execute_filter, get_doc_category,
    get_docs_overview,
};
use sieve_expr::{Category, to_json};

fn filter(expr: &str, input: &str) -> FilterOptions {
    FilterOptions {
        expr: expr.to_string(),
        input: Some(input.to_string()),
        ..FilterOptions::default()
    }
}

const PIES: &str = r#"[{"temp": 90, "pie": {"filling": "apple"}}, {"temp": 150, "pie": {"filling": "apple"}}]"#;
const PIE_EXPR: &str = r#"["&&", ["<", ".temp", 110], ["==", ".pie.filling", "apple"]]"#;

#[test]
fn test_filter_records() {
    let output = execute_filter(&filter(PIE_EXPR, PIES)).unwrap();
    assert_eq!(to_json(&output), r#"[{"pie":{"filling":"apple"},"temp":90}]"#);
}

#[test]
fn test_filter_indices() {
    let options = FilterOptions {
        indices: true,
        ..filter(PIE_EXPR, PIES)
    };
    assert_eq!(to_json(&execute_filter(&options).unwrap()), "[0]");
}

#[test]
fn test_filter_columns() {
    let options = FilterOptions {
        columnar: true,
        names: vec![".name".to_string(), ".value".to_string()],
        ..filter(
            r#"["&&", ["==", ".name", "a"], [">", ".value", 30]]"#,
            r#"[["a", "b", "a"], [0, 70, 50]]"#,
        )
    };
    assert_eq!(to_json(&execute_filter(&options).unwrap()), r#"[["a"],[50]]"#);

    let options = FilterOptions { indices: true, ..options };
    assert_eq!(to_json(&execute_filter(&options).unwrap()), "[2]");
}

#[test]
fn test_filter_errors() {
    let options = FilterOptions {
        input: None,
        ..filter(PIE_EXPR, PIES)
    };
    assert!(matches!(execute_filter(&options), Err(CliError::NoInput)));

    assert!(matches!(execute_filter(&filter(PIE_EXPR, "{}")), Err(CliError::NotAnArray(_))));
    assert!(matches!(execute_filter(&filter("[", PIES)), Err(CliError::Json(_))));

    let options = FilterOptions {
        strict: true,
        ..filter(r#"["between", ".a", 1]"#, PIES)
    };
    assert!(matches!(execute_filter(&options), Err(CliError::Compile(_))));

    let options = FilterOptions {
        columnar: true,
        ..filter(PIE_EXPR, "[1, 2]")
    };
    assert!(matches!(execute_filter(&options), Err(CliError::NotAnArray(_))));
}

#[test]
fn test_explain() {
    let options = ExplainOptions {
        expr: r#"["||", ["in", ".type", ["a"]], ["/i", ".name", "x"]]"#.to_string(),
        ..ExplainOptions::default()
    };
    assert_eq!(
        execute_explain(&options).unwrap(),
        "($.type in #0 || $.name =~ #1)\n#0 = set[\"a\"]\n#1 = /x/i\n"
    );

    let options = ExplainOptions {
        expr: r#"["==", "[1]", 2]"#.to_string(),
        columnar: true,
        ..ExplainOptions::default()
    };
    assert_eq!(execute_explain(&options).unwrap(), "$[1][$i] == 2\n");
}

#[test]
fn test_docs_overview_lists_every_category() {
    let overview = get_docs_overview();
    for category in Category::ALL {
        assert!(overview.contains(category.name()), "missing {}", category.name());
    }
    assert!(overview.contains("regexpi /i rei"));
}

#[test]
fn test_doc_category() {
    let doc = get_doc_category("range").unwrap();
    assert!(doc.starts_with("RANGE"));
    assert!(doc.contains("[min, max]"));
    assert!(doc.contains("[] -"));
    assert!(doc.contains("min <= value <= max"));
    assert!(!doc.contains("Range("));

    let doc = get_doc_category("pattern").unwrap();
    assert!(doc.contains("ignoring case"));
    assert!(!doc.contains("ignore_case"));

    assert!(get_doc_category("paths").unwrap().contains("null-safe"));
    assert_eq!(DocCategory::parse("type-test"), Some(DocCategory::Operators(Category::TypeTest)));
    assert_eq!(DocCategory::parse("comparisons"), Some(DocCategory::Operators(Category::Comparison)));
    assert!(matches!(get_doc_category("nope"), Err(CliError::UnknownCategory(_))));
}
