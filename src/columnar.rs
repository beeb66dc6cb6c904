//! Predicates over a structure-of-arrays layout.
//!
//! A columnar collection is a list of columns sharing one row index:
//!
//! ```text
//! {name: ["a", "b", "a"], value: [0, 70, 50]}   →   [["a", "b", "a"], [0, 70, 50]]
//! ```
//!
//! Expressions are compiled exactly as for records; a rewrite pass then
//! points every field path at a column cell (`$[k][$i]`). Columns are
//! addressed either positionally (`[1]`, `[1].x`) or through a name table
//! (`.value` → column 1 when the table is `[".name", ".value"]`).
//!
//! ```
//! use sieve_expr::{CompileOptions, Value, compile_filter_column_indices};
//! use serde_json::json;
//!
//! let expr: Value = json!(["&&", ["==", ".name", "a"], [">", ".value", 30]]).into();
//! let names = [".name", ".value"];
//! let filter = compile_filter_column_indices(&expr, Some(&names[..]), &CompileOptions::default()).unwrap();
//!
//! let columns: Vec<Vec<Value>> = vec![
//!     vec!["a".into(), "b".into(), "a".into()],
//!     vec![Value::Integer(0), Value::Integer(70), Value::Integer(50)],
//! ];
//! assert_eq!(filter.run(&columns, None), vec![2]);
//! ```

use std::{fmt, marker::PhantomData};

use tracing::debug;

use crate::{
    compiler::{CompileOptions, compile_tree, degrade},
    error::{CompileError, EvalError},
    hoist::HoistTable,
    node::{ColumnFrame, Node},
    path::{Key, Path, Root, Step},
    predicate::{Indices, Program, Records},
    value::Value,
};

/// Maps record paths to column cells.
struct Layout {
    /// Steps of each named column; `None` for positional addressing
    names: Option<Vec<Vec<Step>>>,
    strict: bool,
}

impl Layout {
    fn new(names: Option<&[&str]>, strict: bool) -> Result<Self, CompileError> {
        let names = match names {
            Some(names) => {
                let mut columns = Vec::with_capacity(names.len());
                for name in names {
                    let path = Path::sanitize(name, false)?;
                    if path.root() != &Root::Record || path.steps().is_empty() {
                        return Err(CompileError::InvalidPath(name.to_string()));
                    }
                    columns.push(path.into_steps());
                }
                Some(columns)
            }
            None => None,
        };
        Ok(Layout { names, strict })
    }

    fn rewrite(&self, node: Node) -> Result<Node, CompileError> {
        match self.rewrite_node(node) {
            Ok(node) => Ok(node),
            Err(error) => degrade(error, self.strict),
        }
    }

    fn rewrite_all(&self, children: Vec<Node>) -> Result<Vec<Node>, CompileError> {
        children.into_iter().map(|child| self.rewrite(child)).collect()
    }

    fn rewrite_node(&self, node: Node) -> Result<Node, CompileError> {
        Ok(match node {
            Node::Never => Node::Never,
            Node::All(children) => Node::All(self.rewrite_all(children)?),
            Node::Any(children) => Node::Any(self.rewrite_all(children)?),
            Node::Not(inner) => Node::Not(Box::new(self.rewrite_node(*inner)?)),
            Node::Compare { path, op, literal } => Node::Compare {
                path: self.column(path)?,
                op,
                literal,
            },
            Node::Range { path, kind, min, max } => Node::Range {
                path: self.column(path)?,
                kind,
                min,
                max,
            },
            Node::Truthy(path) => Node::Truthy(self.column(path)?),
            Node::Falsy(path) => Node::Falsy(self.column(path)?),
            Node::Member { path, slot } => Node::Member {
                path: self.column(path)?,
                slot,
            },
            Node::Text {
                path,
                op,
                needle,
                text,
            } => Node::Text {
                path: self.column(path)?,
                op,
                needle,
                text,
            },
            Node::Pattern { path, slot } => Node::Pattern {
                path: self.column(path)?,
                slot,
            },
            // the body addresses array elements, not columns
            Node::Quantify {
                path,
                quantifier,
                body,
            } => Node::Quantify {
                path: self.column(path)?,
                quantifier,
                body,
            },
            Node::Type { path, test } => Node::Type {
                path: self.column(path)?,
                test,
            },
            Node::Custom { name, .. } => {
                return Err(CompileError::Unsupported {
                    token: name,
                    reason: "custom operators need whole records".to_string(),
                });
            }
        })
    }

    fn column(&self, path: Path) -> Result<Path, CompileError> {
        match path.root() {
            Root::Record if path.is_record() => {
                return Err(CompileError::Unsupported {
                    token: "$".to_string(),
                    reason: "a columnar layout has no whole record".to_string(),
                });
            }
            Root::Record => {}
            Root::Index | Root::Column(_) => return Ok(path),
        }

        let (column, consumed) = match &self.names {
            None => match path.steps().first() {
                Some(Step {
                    key: Key::Index { position, .. },
                    ..
                }) if *position >= 0 => (*position as usize, 1),
                _ => return Err(CompileError::UnmappedColumn(path.to_string())),
            },
            Some(names) => names
                .iter()
                .enumerate()
                .filter(|(_, name)| is_prefix(name, path.steps()))
                .max_by_key(|(_, name)| name.len())
                .map(|(column, name)| (column, name.len()))
                .ok_or_else(|| CompileError::UnmappedColumn(path.to_string()))?,
        };

        let rest = path.into_steps().split_off(consumed);
        Ok(Path::from_parts(Root::Column(column), rest))
    }
}

fn is_prefix(name: &[Step], steps: &[Step]) -> bool {
    name.len() <= steps.len() && name.iter().zip(steps).all(|(a, b)| a.key.same_key(&b.key))
}

/// A program whose paths address column cells.
#[derive(Clone)]
pub struct ColumnarProgram {
    program: Program,
}

impl ColumnarProgram {
    /// Compile for a columnar layout.
    ///
    /// `names` lists the field path of each column, in column order. Without
    /// it, paths must start with a column position (`[0]`, `[2].x`). A name
    /// that is not a field path is always an error, strict or not.
    pub fn compile(expr: &Value, names: Option<&[&str]>, options: &CompileOptions) -> Result<Self, CompileError> {
        let layout = Layout::new(names, options.strict)?;
        let compiled = compile_tree(expr, options)?;
        let root = layout.rewrite(compiled.root)?;
        debug!(
            named = names.map_or(0, <[&str]>::len),
            "rewrote expression for columnar layout"
        );
        Ok(ColumnarProgram {
            program: Program::from_parts(root, compiled.hoists),
        })
    }

    pub fn hoists(&self) -> &HoistTable {
        self.program.hoists()
    }

    pub fn matcher(&self) -> ColumnarMatcher {
        ColumnarMatcher {
            program: self.program.clone(),
        }
    }

    pub fn filter(&self) -> ColumnarFilter<Records> {
        ColumnarFilter::new(self.program.clone())
    }

    pub fn filter_indices(&self) -> ColumnarFilter<Indices> {
        ColumnarFilter::new(self.program.clone())
    }

    pub fn explain(&self) -> String {
        self.program.explain()
    }
}

impl fmt::Display for ColumnarProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)
    }
}

impl fmt::Debug for ColumnarProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ColumnarProgram").field(&self.program).finish()
    }
}

fn row_count<C: AsRef<[Value]>>(columns: &[C]) -> usize {
    columns.first().map_or(0, |column| column.as_ref().len())
}

/// Tests one row of a columnar collection.
#[derive(Debug, Clone)]
pub struct ColumnarMatcher {
    program: Program,
}

impl ColumnarMatcher {
    pub fn matches<C: AsRef<[Value]>>(&self, columns: &[C], row: usize) -> bool {
        self.try_matches(columns, row).unwrap_or(false)
    }

    pub fn try_matches<C: AsRef<[Value]>>(&self, columns: &[C], row: usize) -> Result<bool, EvalError> {
        self.program.eval(&ColumnFrame { columns, row })
    }
}

/// Scans the rows of a columnar collection.
///
/// The row count is the length of the first column.
pub struct ColumnarFilter<E> {
    program: Program,
    emit: PhantomData<E>,
}

impl<E> ColumnarFilter<E> {
    fn new(program: Program) -> Self {
        ColumnarFilter {
            program,
            emit: PhantomData,
        }
    }

    fn rows<C: AsRef<[Value]>>(&self, columns: &[C], candidates: Option<&[usize]>) -> Vec<usize> {
        let rows = row_count(columns);
        let matches = |row: &usize| {
            self.program
                .eval(&ColumnFrame { columns, row: *row })
                .unwrap_or(false)
        };
        match candidates {
            Some(candidates) => candidates
                .iter()
                .copied()
                .filter(|row| *row < rows)
                .filter(matches)
                .collect(),
            None => (0..rows).filter(matches).collect(),
        }
    }
}

impl<E> Clone for ColumnarFilter<E> {
    fn clone(&self) -> Self {
        ColumnarFilter::new(self.program.clone())
    }
}

impl<E> fmt::Debug for ColumnarFilter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnarFilter").field("program", &self.program).finish()
    }
}

impl ColumnarFilter<Records> {
    /// The matching rows, returned column by column.
    pub fn run<'a, C: AsRef<[Value]>>(&self, columns: &'a [C], candidates: Option<&[usize]>) -> Vec<Vec<&'a Value>> {
        let rows = self.rows(columns, candidates);
        columns
            .iter()
            .map(|column| {
                let column = column.as_ref();
                rows.iter().filter_map(|row| column.get(*row)).collect()
            })
            .collect()
    }
}

impl ColumnarFilter<Indices> {
    pub fn run<C: AsRef<[Value]>>(&self, columns: &[C], candidates: Option<&[usize]>) -> Vec<usize> {
        self.rows(columns, candidates)
    }
}

/// Compile a [`ColumnarMatcher`].
pub fn compile_matcher_columns(
    expr: &Value,
    names: Option<&[&str]>,
    options: &CompileOptions,
) -> Result<ColumnarMatcher, CompileError> {
    Ok(ColumnarProgram::compile(expr, names, options)?.matcher())
}

/// Compile a [`ColumnarFilter`] that returns the matching rows column by column.
pub fn compile_filter_columns(
    expr: &Value,
    names: Option<&[&str]>,
    options: &CompileOptions,
) -> Result<ColumnarFilter<Records>, CompileError> {
    Ok(ColumnarProgram::compile(expr, names, options)?.filter())
}

/// Compile a [`ColumnarFilter`] that returns matching row indices.
pub fn compile_filter_column_indices(
    expr: &Value,
    names: Option<&[&str]>,
    options: &CompileOptions,
) -> Result<ColumnarFilter<Indices>, CompileError> {
    Ok(ColumnarProgram::compile(expr, names, options)?.filter_indices())
}
