use proptest::prelude::*;
use serde_json::json;
use sieve_expr::{CompileOptions, Program, Value, path::{Path, is_allowed}};

fn program(expr: serde_json::Value) -> Program {
    Program::compile(&expr.into(), &CompileOptions::default()).unwrap()
}

fn arb_scalar() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        (-10i64..10).prop_map(|n| json!(n)),
        (-10.0f64..10.0).prop_map(|n| json!(n)),
        "[a-c]{0,3}".prop_map(|s| json!(s)),
        any::<bool>().prop_map(|b| json!(b)),
        Just(json!(null)),
    ]
}

fn arb_record() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        arb_scalar().prop_map(|a| json!({"a": a})),
        prop::collection::vec(arb_scalar(), 0..4).prop_map(|a| json!({"a": a})),
        Just(json!({})),
        Just(json!({"a": {"b": 1}})),
    ]
}

/// A negatable node: (token, right operand)
fn arb_node() -> impl Strategy<Value = (&'static str, Option<serde_json::Value>)> {
    prop_oneof![
        arb_scalar().prop_map(|v| ("==", Some(v))),
        arb_scalar().prop_map(|v| ("===", Some(v))),
        arb_scalar().prop_map(|v| ("<", Some(v))),
        prop::collection::vec(arb_scalar(), 0..4).prop_map(|v| ("in", Some(json!(v)))),
        Just(("[]", Some(json!([-2, 3])))),
        Just(("()", Some(json!([-2, 3])))),
        Just(("includes", Some(json!("a")))),
        Just(("startsWith", Some(json!("b")))),
        Just(("regexp", Some(json!("^a")))),
        Just(("truthy", None)),
        Just(("isInteger", None)),
        Just(("isArray", None)),
    ]
}

fn node(token: &str, right: &Option<serde_json::Value>) -> serde_json::Value {
    match right {
        Some(right) => json!([token, ".a", right]),
        None => json!([token, ".a"]),
    }
}

/// An expression tree and whether any node in it is malformed
type Tree = (serde_json::Value, bool);

fn arb_leaf() -> impl Strategy<Value = Tree> {
    prop_oneof![
        4 => arb_node().prop_map(|(token, right)| (node(token, &right), false)),
        1 => arb_scalar().prop_map(|v| (json!(["===", "$", v]), false)),
        1 => Just((json!(["[]", ".a", 5]), true)),
        1 => Just((json!(["in", ".a", "x"]), true)),
        1 => Just((json!(["between", ".a", 1]), true)),
        1 => Just((json!(["&&"]), true)),
    ]
}

fn combine(token: &str, children: Vec<Tree>) -> Tree {
    let broken = children.iter().any(|(_, broken)| *broken);
    let mut items = vec![json!(token)];
    items.extend(children.into_iter().map(|(child, _)| child));
    (serde_json::Value::Array(items), broken)
}

fn arb_tree() -> impl Strategy<Value = Tree> {
    arb_leaf().prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(|children| combine("&&", children)),
            prop::collection::vec(inner.clone(), 1..4).prop_map(|children| combine("||", children)),
            inner.clone().prop_map(|(body, broken)| (json!(["some", ".a", body]), broken)),
            inner.prop_map(|(body, broken)| (json!(["every", ".a", body]), broken)),
        ]
    })
}

fn negate(expr: &serde_json::Value) -> serde_json::Value {
    let mut expr = expr.clone();
    if let Some(token) = expr.get_mut(0) {
        *token = json!(format!("!{}", token.as_str().unwrap_or_default()));
    }
    expr
}

/// `!` + `==` is the atomic `!==`, a different operator
fn negatable(expr: &serde_json::Value) -> bool {
    expr.get(0).and_then(|token| token.as_str()) != Some("==")
}

proptest! {
    #[test]
    fn negation_is_the_complement((expr, broken) in arb_tree(), record in arb_record()) {
        prop_assume!(negatable(&expr));
        let plain = program(expr.clone()).matcher();
        let negated = program(negate(&expr)).matcher();
        let record = Value::from(record);

        if broken {
            // a negated node with a malformed operand stays degraded
            prop_assert_eq!(program(negate(&expr)).to_string(), "never");
            prop_assert!(!negated.matches(&record, 0));
            return Ok(());
        }
        match plain.try_matches(&record, 0) {
            Ok(hit) => prop_assert_eq!(negated.try_matches(&record, 0), Ok(!hit)),
            // faults never match either way
            Err(_) => {
                prop_assert!(!plain.matches(&record, 0));
                prop_assert!(!negated.matches(&record, 0));
            }
        }
    }

    #[test]
    fn malformed_leaves_never_match((expr, broken) in arb_leaf(), record in arb_record()) {
        prop_assume!(broken);
        let record = Value::from(record);
        prop_assert!(!program(expr.clone()).matcher().matches(&record, 0));
        prop_assert!(!program(negate(&expr)).matcher().matches(&record, 0));
    }

    #[test]
    fn range_boundaries(a in -50i64..50, width in 0i64..50, x in -60i64..110) {
        let b = a + width;
        let record = Value::from(json!({"t": x}));
        let check = |token: &str| program(json!([token, ".t", [a, b]])).matcher().matches(&record, 0);

        prop_assert_eq!(check("[]"), a <= x && x <= b);
        prop_assert_eq!(check("-"), a <= x && x <= b);
        prop_assert_eq!(check("()"), a < x && x < b);
        prop_assert_eq!(check("[)"), a <= x && x < b);
        prop_assert_eq!(check("(]"), a < x && x <= b);
    }

    #[test]
    fn single_child_combinators_flatten((child, _) in arb_tree(), record in arb_record()) {
        let direct = program(child.clone());
        let record = Value::from(record);

        for combinator in ["&&", "||"] {
            let wrapped = json!([combinator, child.clone()]);
            prop_assert_eq!(program(wrapped.clone()).to_string(), direct.to_string());
            prop_assert_eq!(
                program(wrapped.clone()).matcher().try_matches(&record, 0),
                direct.matcher().try_matches(&record, 0)
            );
            if negatable(&child) {
                prop_assert_eq!(program(negate(&wrapped)).to_string(), program(negate(&child)).to_string());
            }
        }
    }

    #[test]
    fn sanitize_is_idempotent(raw in prop_oneof!["[a-z0-9_.?\\[\\]$-]{0,16}", ".{0,24}"], chain in any::<bool>()) {
        let once = Path::sanitize(&format!(".{}", raw), chain).unwrap().to_string();
        let twice = Path::sanitize(&once, chain).unwrap().to_string();
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn body_never_contains_stripped_characters(raw in ".{0,24}") {
        let body = program(json!(["==", format!(".{}", raw), 1])).to_string();
        let path = body.strip_suffix(" == 1").unwrap_or(&body);
        prop_assert!(path.chars().all(is_allowed), "{:?} rendered as {:?}", raw, path);
    }
}
