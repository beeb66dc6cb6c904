use crate::{error::CompileError, value::Value};

/// Read-only view of one array-encoded expression node.
///
/// Nodes are arrays whose first element is the operator token:
///
/// ```text
/// ["==", ".pie.filling", "apple"]        operator, left, right
/// ["&&", [...], [...]]                   combinator, children
/// ["some", ".fields", ["==", ".t", 1]]   quantifier, path, nested node
/// ["byName", {"name": "abc"}]            custom operator, configuration
/// ```
///
/// The view borrows the tree; compilation never mutates its input.
#[derive(Debug, Clone, Copy)]
pub struct ExprNode<'a> {
    token: &'a str,
    operands: &'a [Value],
}

impl<'a> ExprNode<'a> {
    pub fn parse(value: &'a Value) -> Result<Self, CompileError> {
        match value {
            Value::Array(items) => match items.split_first() {
                Some((Value::String(token), operands)) => Ok(ExprNode { token, operands }),
                Some((other, _)) => Err(CompileError::malformed(
                    other.type_name(),
                    "the first element of a node must be an operator token",
                )),
                None => Err(CompileError::malformed("[]", "empty node")),
            },
            other => Err(CompileError::malformed(
                other.type_name(),
                "a node must be an array",
            )),
        }
    }

    /// The raw token, negation marker included.
    pub fn token(&self) -> &'a str {
        self.token
    }

    /// Everything after the token (combinator children).
    pub fn operands(&self) -> &'a [Value] {
        self.operands
    }

    pub fn left(&self) -> Option<&'a Value> {
        self.operands.first()
    }

    pub fn right(&self) -> Option<&'a Value> {
        self.operands.get(1)
    }
}
