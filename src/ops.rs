//! Caller-registered named predicates.
//!
//! A custom operator receives the record under test, its index, and the
//! node's configuration value (the node's left operand, captured once at
//! compile time):
//!
//! ```
//! use sieve_expr::{CompileOptions, Value, compile_matcher};
//! use serde_json::json;
//!
//! let options = CompileOptions::default().op("byName", |record, _index, config| {
//!     let Value::Object(record) = record else { return false };
//!     let Value::Object(config) = config else { return false };
//!     record.get("name") == config.get("name")
//! });
//!
//! let matcher = compile_matcher(&json!(["byName", {"name": "abc"}]).into(), &options).unwrap();
//! assert!(matcher.matches(&json!({"name": "abc"}).into(), 0));
//! assert!(!matcher.matches(&json!({"name": "def"}).into(), 0));
//! ```

use std::{collections::HashMap, fmt, sync::Arc};

use crate::value::Value;

/// Signature of a custom operator: `(record, index, config) -> bool`.
pub type CustomFn = dyn Fn(&Value, usize, &Value) -> bool + Send + Sync;

/// Named custom operators, consulted before the built-in catalog.
#[derive(Clone, Default)]
pub struct OpRegistry {
    ops: HashMap<String, Arc<CustomFn>>,
}

impl OpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an operator.
    ///
    /// Names that are not identifiers are stored but can never be reached
    /// from an expression.
    pub fn register<F>(&mut self, name: impl Into<String>, op: F) -> &mut Self
    where
        F: Fn(&Value, usize, &Value) -> bool + Send + Sync + 'static,
    {
        self.ops.insert(name.into(), Arc::new(op));
        self
    }

    /// Find the operator a token routes to.
    pub fn get(&self, token: &str) -> Option<&Arc<CustomFn>> {
        if !is_identifier(token) {
            return None;
        }
        self.ops.get(token)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl fmt::Debug for OpRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.ops.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("OpRegistry").field("ops", &names).finish()
    }
}

/// `[A-Za-z_$][A-Za-z0-9_$]*`
pub fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
