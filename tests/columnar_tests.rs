use serde_json::json;
use sieve_expr::{
    ColumnarProgram, CompileError, CompileOptions, Value, compile_filter_column_indices, compile_filter_columns,
    compile_matcher_columns,
};

fn columns(data: serde_json::Value) -> Vec<Vec<Value>> {
    let Value::Array(columns) = Value::from(data) else {
        panic!("columns must be an array");
    };
    columns
        .into_iter()
        .map(|column| match column {
            Value::Array(cells) => cells,
            other => panic!("not a column: {:?}", other),
        })
        .collect()
}

fn compile(expr: serde_json::Value, names: Option<&[&str]>) -> ColumnarProgram {
    ColumnarProgram::compile(&expr.into(), names, &CompileOptions::default()).unwrap()
}

const NAMES: [&str; 2] = [".name", ".value"];

#[test]
fn test_scenario_named_columns() {
    let data = columns(json!([["a", "b", "a"], [0, 70, 50]]));
    let expr: Value = json!(["&&", ["==", ".name", "a"], [">", ".value", 30]]).into();

    let filter = compile_filter_column_indices(&expr, Some(&NAMES[..]), &CompileOptions::default()).unwrap();
    assert_eq!(filter.run(&data, None), vec![2]);

    let filter = compile_filter_columns(&expr, Some(&NAMES[..]), &CompileOptions::default()).unwrap();
    let a = Value::from("a");
    let fifty = Value::Integer(50);
    assert_eq!(filter.run(&data, None), vec![vec![&a], vec![&fifty]]);
}

#[test]
fn test_positional_columns() {
    let data = columns(json!([["a", "b", "a"], [0, 70, 50]]));
    let program = compile(json!(["&&", ["==", "[0]", "a"], [">", "[1]", 30]]), None);
    assert_eq!(program.to_string(), r#"($[0][$i] == "a" && $[1][$i] > 30)"#);
    assert_eq!(program.filter_indices().run(&data, None), vec![2]);
}

#[test]
fn test_rewrite_rendering() {
    let program = compile(json!(["&&", ["==", ".name", "a"], [">", ".value", 30]]), Some(&NAMES[..]));
    assert_eq!(program.to_string(), r#"($[0][$i] == "a" && $[1][$i] > 30)"#);
}

#[test]
fn test_longest_name_wins_and_rest_applies_to_cell() {
    let names = [".geo", ".geo.lat"];
    let program = compile(json!(["&&", [">", ".geo.lat", 10], ["==", ".geo.name", "x"]]), Some(&names[..]));
    assert_eq!(program.to_string(), r#"($[1][$i] > 10 && $[0][$i].name == "x")"#);

    let data = columns(json!([[{"name": "x"}, {"name": "y"}], [20, 30]]));
    assert_eq!(program.filter_indices().run(&data, None), vec![0]);
}

#[test]
fn test_hoisted_literals_survive_rewrite() {
    let program = compile(json!(["in", ".name", ["a", "c"]]), Some(&NAMES[..]));
    assert_eq!(program.explain(), "$[0][$i] in #0\n#0 = set[\"a\",\"c\"]\n");

    let data = columns(json!([["a", "b", "c"], [1, 2, 3]]));
    assert_eq!(program.filter_indices().run(&data, None), vec![0, 2]);
}

#[test]
fn test_candidates_and_row_count() {
    let data = columns(json!([["a", "a", "a"], [1, 2]]));
    let program = compile(json!(["==", ".name", "a"]), Some(&NAMES[..]));
    assert_eq!(program.filter_indices().run(&data, Some(&[2, 0, 9][..])), vec![2, 0]);
    assert_eq!(program.filter_indices().run(&data, None), vec![0, 1, 2]);

    let empty: Vec<Vec<Value>> = Vec::new();
    assert_eq!(program.filter_indices().run(&empty, None), Vec::<usize>::new());
}

#[test]
fn test_matcher() {
    let data = columns(json!([["a", "b"], [10, 20]]));
    let matcher = compile_matcher_columns(&json!([">", ".value", 15]).into(), Some(&NAMES[..]), &CompileOptions::default())
        .unwrap();
    assert!(!matcher.matches(&data, 0));
    assert!(matcher.matches(&data, 1));
    assert!(!matcher.matches(&data, 5));
}

#[test]
fn test_index_sentinel_is_the_row() {
    let data = columns(json!([["a", "b", "c"]]));
    let program = compile(json!(["==", "$i", 1]), None);
    assert_eq!(program.to_string(), "$i == 1");
    assert_eq!(program.filter_indices().run(&data, None), vec![1]);
}

#[test]
fn test_quantifier_body_addresses_elements() {
    let program = compile(json!(["some", ".tags", ["==", "$", "x"]]), Some(&[".tags"][..]));
    assert_eq!(program.to_string(), r#"some($[0][$i], $ == "x")"#);

    let data = columns(json!([[["x"], ["y"]]]));
    assert_eq!(program.filter_indices().run(&data, None), vec![0]);
}

#[test]
fn test_unmapped_paths_degrade() {
    let program = compile(json!(["||", ["==", ".other", 1], ["==", ".name", "b"]]), Some(&NAMES[..]));
    assert_eq!(program.to_string(), r#"(never || $[0][$i] == "b")"#);

    let program = compile(json!(["==", ".name", "a"]), None);
    assert_eq!(program.to_string(), "never");

    let program = compile(json!(["truthy", "$"]), Some(&NAMES[..]));
    assert_eq!(program.to_string(), "never");
}

#[test]
fn test_strict_rewrite_errors() {
    let strict = CompileOptions::new().strict(true);
    assert!(matches!(
        ColumnarProgram::compile(&json!(["==", ".other", 1]).into(), Some(&NAMES[..]), &strict),
        Err(CompileError::UnmappedColumn(path)) if path == "$.other"
    ));
    assert!(matches!(
        ColumnarProgram::compile(&json!(["truthy", "$"]).into(), None, &strict),
        Err(CompileError::Unsupported { .. })
    ));

    let strict = strict.op("custom", |_, _, _| true);
    assert!(matches!(
        ColumnarProgram::compile(&json!(["custom"]).into(), None, &strict),
        Err(CompileError::Unsupported { token, .. }) if token == "custom"
    ));
}

#[test]
fn test_bad_name_table_is_rejected() {
    let result = ColumnarProgram::compile(&json!(["==", ".a", 1]).into(), Some(&["name"][..]), &CompileOptions::default());
    assert!(matches!(result, Err(CompileError::InvalidPath(_))));

    let result = ColumnarProgram::compile(&json!(["==", ".a", 1]).into(), Some(&["$"][..]), &CompileOptions::default());
    assert!(matches!(result, Err(CompileError::InvalidPath(_))));
}
