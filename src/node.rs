//! The compiled predicate tree.
//!
//! One tagged variant per operator category; evaluation is a direct match
//! over the variants with hoisted literals looked up by slot.

use std::{borrow::Cow, cmp::Ordering, fmt, sync::Arc};

use crate::{
    catalog::{CompareOp, Quantifier, RangeKind, TextOp, TypeTest},
    error::EvalError,
    hoist::{HoistTable, Slot},
    ops::CustomFn,
    path::Path,
    value::Value,
};

static NULL: Value = Value::Null;

/// What a path resolves against during one evaluation.
pub(crate) trait Frame {
    /// The record bound to `$`, if the layout has one
    fn record(&self) -> Option<&Value>;
    /// The position bound to `$i`
    fn index(&self) -> usize;
    /// Cell of a column at the current position
    fn cell(&self, column: usize) -> Option<&Value>;
}

pub(crate) struct RowFrame<'v> {
    pub record: &'v Value,
    pub index: usize,
}

impl Frame for RowFrame<'_> {
    fn record(&self) -> Option<&Value> {
        Some(self.record)
    }

    fn index(&self) -> usize {
        self.index
    }

    fn cell(&self, _column: usize) -> Option<&Value> {
        None
    }
}

pub(crate) struct ColumnFrame<'c, C> {
    pub columns: &'c [C],
    pub row: usize,
}

impl<C: AsRef<[Value]>> Frame for ColumnFrame<'_, C> {
    fn record(&self) -> Option<&Value> {
        None
    }

    fn index(&self) -> usize {
        self.row
    }

    fn cell(&self, column: usize) -> Option<&Value> {
        self.columns.get(column)?.as_ref().get(self.row)
    }
}

#[derive(Clone)]
pub(crate) enum Node {
    /// Degraded node; never matches
    Never,
    All(Vec<Node>),
    Any(Vec<Node>),
    Not(Box<Node>),
    Compare {
        path: Path,
        op: CompareOp,
        literal: Value,
    },
    Range {
        path: Path,
        kind: RangeKind,
        min: Value,
        max: Value,
    },
    Truthy(Path),
    Falsy(Path),
    Member {
        path: Path,
        slot: Slot,
    },
    Text {
        path: Path,
        op: TextOp,
        needle: Value,
        /// `needle` as a string, computed once
        text: String,
    },
    Pattern {
        path: Path,
        slot: Slot,
    },
    Quantify {
        path: Path,
        quantifier: Quantifier,
        body: Box<Node>,
    },
    Type {
        path: Path,
        test: TypeTest,
    },
    Custom {
        name: String,
        op: Arc<CustomFn>,
        config: Value,
    },
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self)
    }
}

fn found(value: Option<&Value>) -> &'static str {
    value.map_or("undefined", Value::type_name)
}

fn loose_eq(value: Option<&Value>, literal: &Value) -> bool {
    match value {
        Some(value) => value.loose_eq(literal),
        None => matches!(literal, Value::Null),
    }
}

pub(crate) fn compare(value: Option<&Value>, op: CompareOp, literal: &Value) -> bool {
    let ordering = || value.and_then(|v| v.relate(literal));
    match op {
        CompareOp::Eq => loose_eq(value, literal),
        CompareOp::Ne => !loose_eq(value, literal),
        CompareOp::StrictEq => value.is_some_and(|v| v.strict_eq(literal)),
        CompareOp::StrictNe => !value.is_some_and(|v| v.strict_eq(literal)),
        CompareOp::Lt => ordering() == Some(Ordering::Less),
        CompareOp::Le => matches!(ordering(), Some(Ordering::Less | Ordering::Equal)),
        CompareOp::Gt => ordering() == Some(Ordering::Greater),
        CompareOp::Ge => matches!(ordering(), Some(Ordering::Greater | Ordering::Equal)),
    }
}

pub(crate) fn range_ops(kind: RangeKind) -> (CompareOp, CompareOp) {
    let lower = if kind.lower_inclusive() { CompareOp::Ge } else { CompareOp::Gt };
    let upper = if kind.upper_inclusive() { CompareOp::Le } else { CompareOp::Lt };
    (lower, upper)
}

impl Node {
    pub(crate) fn eval<F: Frame + ?Sized>(&self, frame: &F, hoists: &HoistTable) -> Result<bool, EvalError> {
        match self {
            Node::Never => Ok(false),
            Node::All(children) => {
                for child in children {
                    if !child.eval(frame, hoists)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Node::Any(children) => {
                for child in children {
                    if child.eval(frame, hoists)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Node::Not(inner) => Ok(!inner.eval(frame, hoists)?),
            Node::Compare { path, op, literal } => {
                let operand = path.resolve(frame)?;
                Ok(compare(operand.value(), *op, literal))
            }
            Node::Range { path, kind, min, max } => {
                let operand = path.resolve(frame)?;
                let (lower, upper) = range_ops(*kind);
                let value = operand.value();
                Ok(compare(value, lower, min) && compare(value, upper, max))
            }
            Node::Truthy(path) => Ok(path.resolve(frame)?.value().is_some_and(Value::is_truthy)),
            Node::Falsy(path) => Ok(!path.resolve(frame)?.value().is_some_and(Value::is_truthy)),
            Node::Member { path, slot } => {
                let Some(set) = hoists.members(*slot) else {
                    return Ok(false);
                };
                let operand = path.resolve(frame)?;
                Ok(operand.value().is_some_and(|value| set.contains(value)))
            }
            Node::Text {
                path,
                op,
                needle,
                text,
            } => {
                let operand = path.resolve(frame)?;
                match (op, operand.value()) {
                    (TextOp::Includes, Some(Value::String(s))) => Ok(s.contains(text.as_str())),
                    (TextOp::StartsWith, Some(Value::String(s))) => Ok(s.starts_with(text.as_str())),
                    (TextOp::EndsWith, Some(Value::String(s))) => Ok(s.ends_with(text.as_str())),
                    (TextOp::Includes, Some(Value::Array(items))) => {
                        Ok(items.iter().any(|item| item.same_value_zero(needle)))
                    }
                    (op, other) => Err(EvalError::Type {
                        operation: op.name(),
                        found: found(other),
                    }),
                }
            }
            Node::Pattern { path, slot } => {
                let Some(regex) = hoists.pattern(*slot) else {
                    return Ok(false);
                };
                let operand = path.resolve(frame)?;
                let subject = match operand.value() {
                    None => Cow::Borrowed("undefined"),
                    Some(value) => value.to_text().ok_or(EvalError::Type {
                        operation: "pattern test",
                        found: value.type_name(),
                    })?,
                };
                Ok(regex.is_match(&subject))
            }
            Node::Quantify {
                path,
                quantifier,
                body,
            } => {
                let operand = path.resolve(frame)?;
                let Some(Value::Array(items)) = operand.value() else {
                    return Err(EvalError::Type {
                        operation: quantifier.name(),
                        found: found(operand.value()),
                    });
                };
                for (index, item) in items.iter().enumerate() {
                    let hit = body.eval(&RowFrame { record: item, index }, hoists)?;
                    match quantifier {
                        Quantifier::Some if hit => return Ok(true),
                        Quantifier::Every if !hit => return Ok(false),
                        _ => {}
                    }
                }
                Ok(*quantifier == Quantifier::Every)
            }
            Node::Type { path, test } => {
                let operand = path.resolve(frame)?;
                let value = operand.value();
                Ok(match test {
                    TypeTest::IsInteger => match value {
                        Some(Value::Integer(_)) => true,
                        Some(Value::Float(n)) => n.is_finite() && n.fract() == 0.0,
                        _ => false,
                    },
                    TypeTest::IsFinite => match value {
                        Some(Value::Integer(_)) => true,
                        Some(Value::Float(n)) => n.is_finite(),
                        _ => false,
                    },
                    TypeTest::IsNaN => matches!(value, Some(Value::Float(n)) if n.is_nan()),
                    TypeTest::IsArray => matches!(value, Some(Value::Array(_))),
                })
            }
            Node::Custom { op, config, .. } => {
                let record = frame.record().unwrap_or(&NULL);
                Ok((**op)(record, frame.index(), config))
            }
        }
    }

    /// Number of nodes in the tree, quantifier bodies included.
    pub(crate) fn size(&self) -> usize {
        1 + match self {
            Node::All(children) | Node::Any(children) => children.iter().map(Node::size).sum(),
            Node::Not(inner) => inner.size(),
            Node::Quantify { body, .. } => body.size(),
            _ => 0,
        }
    }
}
