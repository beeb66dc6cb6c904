//! Expression compiler: one recursive pass from the array-encoded tree to a
//! [`Node`] tree plus its hoist table.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::{
    catalog::{Operator, Resolved, TextOp, resolve},
    error::CompileError,
    expr::ExprNode,
    hoist::{HoistTable, Hoisted, Slot},
    node::Node,
    ops::OpRegistry,
    path::Path,
    value::Value,
};

/// Compilation settings.
///
/// | option | effect |
/// |---|---|
/// | `chain` | every path step is null-safe |
/// | `strict` | malformed nodes fail compilation instead of never matching |
/// | `ops` | custom operators, consulted before the built-in catalog |
///
/// Record lookup through an accessor is chosen when binding a compiled
/// program to a [`RecordSource`](crate::predicate::RecordSource), not here.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub chain: bool,
    pub strict: bool,
    pub ops: OpRegistry,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain(mut self, chain: bool) -> Self {
        self.chain = chain;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn ops(mut self, ops: OpRegistry) -> Self {
        self.ops = ops;
        self
    }

    /// Register one custom operator.
    pub fn op<F>(mut self, name: impl Into<String>, op: F) -> Self
    where
        F: Fn(&Value, usize, &Value) -> bool + Send + Sync + 'static,
    {
        self.ops.register(name, op);
        self
    }
}

/// Output of one compilation.
pub(crate) struct Compilation {
    pub root: Node,
    pub hoists: HoistTable,
}

pub(crate) fn compile_tree(expr: &Value, options: &CompileOptions) -> Result<Compilation, CompileError> {
    let mut compiler = Compiler {
        options,
        hoists: HoistTable::new(),
        degraded: 0,
    };
    let root = compiler.compile(expr)?;
    debug!(
        nodes = root.size(),
        hoisted = compiler.hoists.len(),
        chain = options.chain,
        "compiled expression"
    );
    Ok(Compilation {
        root,
        hoists: compiler.hoists,
    })
}

/// Outcome of a node that cannot be compiled: an error when strict, a
/// never-matching node otherwise.
pub(crate) fn degrade(error: CompileError, strict: bool) -> Result<Node, CompileError> {
    if strict {
        return Err(error);
    }
    warn!(%error, "expression node never matches");
    Ok(Node::Never)
}

struct Compiler<'o> {
    options: &'o CompileOptions,
    hoists: HoistTable,
    /// Nodes degraded to `never` so far
    degraded: usize,
}

impl Compiler<'_> {
    fn compile(&mut self, value: &Value) -> Result<Node, CompileError> {
        match self.compile_node(value) {
            Ok(node) => Ok(node),
            Err(error) => {
                self.degraded += 1;
                degrade(error, self.options.strict)
            }
        }
    }

    fn compile_node(&mut self, value: &Value) -> Result<Node, CompileError> {
        let node = ExprNode::parse(value)?;
        let Resolved { token, negated } = resolve(node.token());
        let degraded = self.degraded;

        let compiled = match self.options.ops.get(token) {
            Some(op) => Node::Custom {
                name: token.to_string(),
                op: Arc::clone(op),
                config: node.left().cloned().unwrap_or(Value::Null),
            },
            None => {
                let operator = Operator::lookup(token)
                    .ok_or_else(|| CompileError::UnknownOperator(node.token().to_string()))?;
                self.compile_operator(operator, &node)?
            }
        };

        if !negated {
            return Ok(compiled);
        }
        // a negated node with a degraded operand stays degraded as a whole
        if self.degraded > degraded {
            warn!(token = node.token(), "negated node has a degraded operand and never matches");
            return Ok(Node::Never);
        }
        Ok(Node::Not(Box::new(compiled)))
    }

    fn compile_operator(&mut self, operator: Operator, node: &ExprNode<'_>) -> Result<Node, CompileError> {
        let token = node.token();

        if let Operator::And | Operator::Or = operator {
            let operands = node.operands();
            if operands.is_empty() {
                return Err(CompileError::malformed(token, "a combinator needs at least one child"));
            }
            // children compile left to right, so hoist slots follow source order
            let mut children = Vec::with_capacity(operands.len());
            for child in operands {
                children.push(self.compile(child)?);
            }
            return Ok(match (operator, children.len()) {
                (_, 1) => children.swap_remove(0),
                (Operator::And, _) => Node::All(children),
                _ => Node::Any(children),
            });
        }

        let path = match node.left() {
            Some(Value::String(raw)) => Path::sanitize(raw, self.options.chain)?,
            _ => return Err(CompileError::malformed(token, "the left operand must be a field path")),
        };
        let right = node.right();

        let compiled = match operator {
            Operator::Compare(op) => match right {
                Some(literal @ (Value::Null | Value::Boolean(_) | Value::Integer(_) | Value::Float(_) | Value::String(_))) => {
                    Node::Compare {
                        path,
                        op,
                        literal: literal.clone(),
                    }
                }
                _ => return Err(CompileError::malformed(token, "a comparison needs a scalar literal")),
            },
            Operator::Truthy => Node::Truthy(path),
            Operator::Falsy => Node::Falsy(path),
            Operator::In => match right {
                Some(Value::Array(items)) => Node::Member {
                    path,
                    slot: self.hoist(Hoisted::members(items)),
                },
                _ => return Err(CompileError::malformed(token, "membership needs a literal list")),
            },
            Operator::Range(kind) => match right {
                // bounds past the second are ignored
                Some(Value::Array(bounds)) if bounds.len() >= 2 => Node::Range {
                    path,
                    kind,
                    min: bounds[0].clone(),
                    max: bounds[1].clone(),
                },
                _ => return Err(CompileError::malformed(token, "a range needs [min, max]")),
            },
            Operator::Text(op) => {
                let needle = match right {
                    Some(needle @ Value::String(_)) => needle,
                    // arrays may hold numbers or booleans
                    Some(needle @ (Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Null))
                        if op == TextOp::Includes =>
                    {
                        needle
                    }
                    _ => return Err(CompileError::malformed(token, "a substring test needs a string literal")),
                };
                let text = needle.to_text().map(|text| text.into_owned()).unwrap_or_default();
                Node::Text {
                    path,
                    op,
                    needle: needle.clone(),
                    text,
                }
            }
            Operator::Regexp { ignore_case } => {
                let Some(Value::String(source)) = right else {
                    return Err(CompileError::malformed(token, "a pattern test needs a pattern string"));
                };
                let pattern = Hoisted::pattern(source, ignore_case).map_err(|error| CompileError::Pattern {
                    pattern: source.clone(),
                    source: error,
                })?;
                Node::Pattern {
                    path,
                    slot: self.hoist(pattern),
                }
            }
            Operator::Quantify(quantifier) => {
                let Some(body) = right else {
                    return Err(CompileError::malformed(token, "a quantifier needs a nested node"));
                };
                Node::Quantify {
                    path,
                    quantifier,
                    body: Box::new(self.compile(body)?),
                }
            }
            Operator::Type(test) => Node::Type { path, test },
            Operator::And | Operator::Or => unreachable!("combinators return early"),
        };

        Ok(compiled)
    }

    fn hoist(&mut self, entry: Hoisted) -> Slot {
        let slot = self.hoists.push(entry);
        trace!(slot, "hoisted literal");
        slot
    }
}
