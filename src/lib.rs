//! Compile array-encoded filter expressions into reusable predicates.
//!
//! An expression is a tree of `[operator, left, right]` nodes, usually
//! straight from JSON:
//!
//! ```
//! use sieve_expr::{CompileOptions, Value, compile_filter_indices};
//! use serde_json::json;
//!
//! let expr: Value = json!(["&&", ["<", ".temp", 110], ["==", ".pie.filling", "apple"]]).into();
//! let filter = compile_filter_indices(&expr, &CompileOptions::default()).unwrap();
//!
//! let records: Vec<Value> = vec![
//!     json!({"temp": 90, "pie": {"filling": "apple"}}).into(),
//!     json!({"temp": 150, "pie": {"filling": "apple"}}).into(),
//! ];
//! assert_eq!(filter.run(&records, None), vec![0]);
//! ```
//!
//! Compilation walks the tree once, precomputes patterns and membership sets
//! into a hoist table, and produces an immutable [`Program`]. Matchers and
//! filters built from it can be called any number of times, from any number
//! of threads.

pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod columnar;
pub mod compiler;
pub mod error;
mod explain;
pub mod expr;
pub mod hoist;
mod node;
pub mod ops;
pub mod output;
pub mod path;
pub mod predicate;
pub mod value;

pub use catalog::{Category, Operator};
pub use columnar::{
    ColumnarFilter, ColumnarMatcher, ColumnarProgram, compile_filter_column_indices, compile_filter_columns,
    compile_matcher_columns,
};
pub use compiler::CompileOptions;
pub use error::{CompileError, EvalError};
pub use ops::OpRegistry;
pub use output::{to_json, to_json_pretty};
pub use path::Path;
pub use predicate::{
    Filter, FnSource, IndexedFilter, IndexedMatcher, Indices, Matcher, Program, RecordSource, Records,
    compile_filter, compile_filter_indices, compile_matcher,
};
pub use value::Value;
