use thiserror::Error;

/// Errors reported while compiling an expression.
///
/// For expression nodes only strict compilation returns these. Lenient
/// compilation (the default) degrades the offending node to one that never
/// matches and logs the same error as a warning. A bad column name table is
/// rejected either way.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The node does not have the operand shape its operator requires
    #[error("malformed `{token}` node: {reason}")]
    Malformed { token: String, reason: String },

    /// Neither a registered custom operator nor a catalog token
    #[error("unknown operator `{0}`")]
    UnknownOperator(String),

    /// A field path that does not start with `.` or `[`
    #[error("invalid path `{0}`: paths start with `.` or `[`, or are `$` / `$i`")]
    InvalidPath(String),

    /// A pattern operand that is not a valid regular expression
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A path with no column in the columnar layout
    #[error("path `{0}` does not address a column")]
    UnmappedColumn(String),

    /// An operator that has no meaning in the target layout
    #[error("`{token}` is not supported here: {reason}")]
    Unsupported { token: String, reason: String },
}

impl CompileError {
    pub(crate) fn malformed(token: &str, reason: impl Into<String>) -> Self {
        CompileError::Malformed {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

/// Faults raised while evaluating a compiled predicate against a record.
///
/// Surfaced by `try_matches`; every other entry point treats a fault as
/// "no match".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A non-null-safe step applied to null or an absent value
    #[error("cannot read `{step}` of {found} in `{path}`")]
    NullAccess {
        path: String,
        step: String,
        found: &'static str,
    },

    /// An operation applied to a value kind it does not support
    #[error("`{operation}` cannot be applied to {found}")]
    Type {
        operation: &'static str,
        found: &'static str,
    },
}
