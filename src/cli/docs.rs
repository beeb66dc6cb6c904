//! Operator reference, generated from the catalog

use std::fmt::Write;

use super::CliError;
use crate::catalog::{Arity, CATALOG, Category};

/// Documentation categories: one per operator category, plus paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Paths,
    Operators(Category),
}

impl DocCategory {
    /// Parse category name from string
    pub fn parse(s: &str) -> Option<Self> {
        let name = s.to_lowercase().replace('_', "-");
        match name.as_str() {
            "paths" | "path" => return Some(Self::Paths),
            "compare" | "comparisons" => return Some(Self::Operators(Category::Comparison)),
            "types" | "type" => return Some(Self::Operators(Category::TypeTest)),
            "regexp" | "regex" => return Some(Self::Operators(Category::Pattern)),
            _ => {}
        }
        Category::ALL
            .iter()
            .find(|category| category.name() == name || format!("{}s", category.name()) == name)
            .map(|category| Self::Operators(*category))
    }
}

fn example(category: Category) -> &'static str {
    match category {
        Category::Combinator => r#"["&&", ["<", ".temp", 110], ["==", ".pie.filling", "apple"]]"#,
        Category::Comparison => r#"["==", ".pie.filling", "apple"]"#,
        Category::Truthiness => r#"["truthy", ".enabled"]"#,
        Category::Membership => r#"["in", ".type", ["a", "b", "c"]]"#,
        Category::Range => r#"["[]", ".temp", [90, 110]]"#,
        Category::Substring => r#"["startsWith", ".name", "ap"]"#,
        Category::Pattern => r#"["regexpi", ".name", "^app"]"#,
        Category::Quantifier => r#"["some", ".fields", ["==", ".type", "text"]]"#,
        Category::TypeTest => r#"["isInteger", ".count"]"#,
        Category::Custom => r#"["byName", {"name": "abc"}]"#,
    }
}

fn shape(arity: Arity) -> &'static str {
    match arity {
        Arity::Variadic => "[op, node, node, ...]",
        Arity::Unary => "[op, path]",
        Arity::Binary => "[op, path, operand]",
        Arity::Aux => "[op, config]",
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> String {
    let mut out = String::from(
        "SIEVE OPERATOR REFERENCE\n\n\
         Expressions are JSON arrays: [operator, left, right]. A leading `!` on the\n\
         operator negates the node, except for `!`, `!!`, `!=` and `!==`.\n\n\
         DOCUMENTATION CATEGORIES\n\n  paths             field paths, `$`, `$i`, null-safe steps\n",
    );
    for category in Category::ALL {
        let tokens: Vec<&str> = CATALOG
            .iter()
            .filter(|(op, _)| op.category() == category)
            .flat_map(|(_, tokens)| tokens.iter().copied())
            .collect();
        let summary = if tokens.is_empty() {
            "registered by the caller".to_string()
        } else {
            tokens.join(" ")
        };
        let _ = writeln!(out, "  {:<18}{}", category.name(), summary);
    }
    out.push_str("\nRun 'sieve doc <category>' for detailed documentation.\n");
    out
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<String, CliError> {
    match DocCategory::parse(name) {
        Some(DocCategory::Paths) => Ok(PATHS_DOC.to_string()),
        Some(DocCategory::Operators(category)) => Ok(category_doc(category)),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

fn category_doc(category: Category) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", category.name().to_uppercase());
    let _ = writeln!(out, "  shape           {}", shape(category.arity()));
    let _ = writeln!(out, "  right operand   {}", category.right_operand());
    let _ = writeln!(out, "  example         {}\n", example(category));

    let entries: Vec<_> = CATALOG
        .iter()
        .filter(|(op, _)| op.category() == category)
        .collect();
    if !entries.is_empty() {
        out.push_str("TOKENS\n\n");
        for (op, tokens) in entries {
            let _ = writeln!(out, "  {:<16}{}", tokens.join(" "), op.describe());
        }
    }
    out
}

const PATHS_DOC: &str = r#"PATHS

  $                 the record under test
  $i                the position of the record under test
  .a.b              field steps
  .items[0]         index step
  .items[-1]        counted from the end
  .items.length     length of an array or string
  .a?.b             null-safe step: null/absent short-circuits to absent

Only letters, digits and _ . ? [ ] - $ are kept; everything else is
removed before the path is read. Paths must start with `.` or `[`.

In a columnar layout `[k]` addresses column k, or a name table maps
field paths to columns.
"#;
