//! JSON rendering of values, used for literals in compiled-program listings
//! and for CLI output.
//!
//! Output is deterministic: object keys are sorted. Non-finite floats have no
//! JSON spelling and render as `null`.
//!
//! ```
//! use sieve_expr::Value;
//! use sieve_expr::output::{to_json, to_json_pretty};
//! use serde_json::json;
//!
//! let value = Value::from(json!({"b": [1, 2.5], "a": "x"}));
//! assert_eq!(to_json(&value), r#"{"a":"x","b":[1,2.5]}"#);
//! assert_eq!(to_json_pretty(&Value::Integer(42)), "42");
//! ```

use std::collections::HashMap;

use crate::value::Value;

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, 0);
        out
    }

    fn write_value(&self, out: &mut String, value: &Value, indent: usize) {
        match value {
            Value::Null => out.push_str("null"),
            Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Integer(n) => out.push_str(&n.to_string()),
            Value::Float(n) if n.is_finite() => out.push_str(&n.to_string()),
            Value::Float(_) => out.push_str("null"),
            Value::String(s) => write_string(out, s),
            Value::Array(items) => self.write_array(out, items, indent),
            Value::Object(map) => self.write_object(out, map, indent),
        }
    }

    fn write_array(&self, out: &mut String, items: &[Value], indent: usize) {
        if items.is_empty() {
            out.push_str("[]");
            return;
        }
        out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.newline(out, indent + 1);
            self.write_value(out, item, indent + 1);
        }
        self.newline(out, indent);
        out.push(']');
    }

    fn write_object(&self, out: &mut String, map: &HashMap<String, Value>, indent: usize) {
        if map.is_empty() {
            out.push_str("{}");
            return;
        }
        let mut entries: Vec<_> = map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        out.push('{');
        for (i, (key, value)) in entries.into_iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.newline(out, indent + 1);
            write_string(out, key);
            out.push_str(if self.pretty { ": " } else { ":" });
            self.write_value(out, value, indent + 1);
        }
        self.newline(out, indent);
        out.push('}');
    }

    fn newline(&self, out: &mut String, level: usize) {
        if self.pretty {
            out.push('\n');
            out.push_str(&"  ".repeat(level));
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Compact JSON, no whitespace.
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// JSON with 2-space indentation and one element per line.
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}
