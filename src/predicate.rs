//! Callables built from a compiled expression.
//!
//! A [`Program`] is compiled once and then wrapped by any number of
//! builders:
//!
//! - [`Matcher`] tests one record
//! - [`Filter`] scans a slice of records, optionally only candidate positions
//! - [`IndexedMatcher`] / [`IndexedFilter`] fetch records through a
//!   [`RecordSource`] instead of indexing a slice
//!
//! Filters emit either the matching records ([`Records`]) or their positions
//! ([`Indices`]). All builders share the program's frozen hoist table and are
//! safe to call from several threads at once.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    marker::PhantomData,
    sync::Arc,
};

use crate::{
    compiler::{CompileOptions, compile_tree},
    error::{CompileError, EvalError},
    explain,
    hoist::HoistTable,
    node::{Frame, Node, RowFrame},
    value::Value,
};

struct Compiled {
    root: Node,
    hoists: HoistTable,
}

/// A compiled expression: the predicate tree plus its hoisted literals.
///
/// Cloning is cheap; clones share the same compiled tree.
#[derive(Clone)]
pub struct Program {
    inner: Arc<Compiled>,
}

impl Program {
    /// Compile an array-encoded expression.
    ///
    /// ```
    /// use sieve_expr::{CompileOptions, Program, Value};
    /// use serde_json::json;
    ///
    /// let expr = Value::from(json!(["==", ".pie.filling", "apple"]));
    /// let program = Program::compile(&expr, &CompileOptions::default()).unwrap();
    ///
    /// assert_eq!(program.to_string(), r#"$.pie.filling == "apple""#);
    /// assert!(program.matcher().matches(&json!({"pie": {"filling": "apple"}}).into(), 0));
    /// ```
    pub fn compile(expr: &Value, options: &CompileOptions) -> Result<Program, CompileError> {
        let compiled = compile_tree(expr, options)?;
        Ok(Program::from_parts(compiled.root, compiled.hoists))
    }

    pub(crate) fn from_parts(root: Node, hoists: HoistTable) -> Self {
        Program {
            inner: Arc::new(Compiled { root, hoists }),
        }
    }

    /// The frozen hoist table.
    pub fn hoists(&self) -> &HoistTable {
        &self.inner.hoists
    }

    pub(crate) fn root(&self) -> &Node {
        &self.inner.root
    }

    pub(crate) fn eval<F: Frame + ?Sized>(&self, frame: &F) -> Result<bool, EvalError> {
        self.inner.root.eval(frame, &self.inner.hoists)
    }

    fn matches_record(&self, record: &Value, index: usize) -> bool {
        self.eval(&RowFrame { record, index }).unwrap_or(false)
    }

    pub fn matcher(&self) -> Matcher {
        Matcher {
            program: self.clone(),
        }
    }

    pub fn filter(&self) -> Filter<Records> {
        Filter::new(self.clone())
    }

    pub fn filter_indices(&self) -> Filter<Indices> {
        Filter::new(self.clone())
    }

    /// Matcher that looks records up through `source`.
    pub fn bind<'s, S: RecordSource + ?Sized>(&self, source: &'s S) -> IndexedMatcher<'s, S> {
        IndexedMatcher {
            program: self.clone(),
            source,
        }
    }

    pub fn filter_source<'s, S: RecordSource + ?Sized>(&self, source: &'s S) -> IndexedFilter<'s, S, Records> {
        IndexedFilter::new(self.clone(), source)
    }

    pub fn filter_source_indices<'s, S: RecordSource + ?Sized>(&self, source: &'s S) -> IndexedFilter<'s, S, Indices> {
        IndexedFilter::new(self.clone(), source)
    }

    /// Compiled body followed by the hoist table.
    pub fn explain(&self) -> String {
        explain::render(self.root(), self.hoists())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.root)
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("body", &self.to_string())
            .field("hoisted", &self.inner.hoists.len())
            .finish()
    }
}

/// Tests one record.
#[derive(Debug, Clone)]
pub struct Matcher {
    program: Program,
}

impl Matcher {
    /// Whether `record` at position `index` matches. Evaluation faults
    /// count as no match.
    pub fn matches(&self, record: &Value, index: usize) -> bool {
        self.program.matches_record(record, index)
    }

    /// Like [`matches`](Self::matches), but reports evaluation faults.
    pub fn try_matches(&self, record: &Value, index: usize) -> Result<bool, EvalError> {
        self.program.eval(&RowFrame { record, index })
    }

    pub fn program(&self) -> &Program {
        &self.program
    }
}

/// Filter output: the matching records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Records;

/// Filter output: the positions of the matching records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Indices;

/// Scans a slice of records.
///
/// With candidate positions, only those positions are tested (in the given
/// order); out-of-range candidates are skipped.
pub struct Filter<E> {
    program: Program,
    emit: PhantomData<E>,
}

impl<E> Filter<E> {
    fn new(program: Program) -> Self {
        Filter {
            program,
            emit: PhantomData,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    fn scan<'a>(&self, records: &'a [Value], candidates: Option<&[usize]>, hit: impl FnMut(usize, &'a Value)) {
        match candidates {
            Some(candidates) => scan(&self.program, records, candidates.iter().copied(), hit),
            None => scan(&self.program, records, 0..records.len(), hit),
        }
    }
}

impl<E> Clone for Filter<E> {
    fn clone(&self) -> Self {
        Filter::new(self.program.clone())
    }
}

impl<E> fmt::Debug for Filter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("program", &self.program).finish()
    }
}

impl Filter<Records> {
    pub fn run<'a>(&self, records: &'a [Value], candidates: Option<&[usize]>) -> Vec<&'a Value> {
        let mut out = Vec::new();
        self.scan(records, candidates, |_, record| out.push(record));
        out
    }
}

impl Filter<Indices> {
    pub fn run(&self, records: &[Value], candidates: Option<&[usize]>) -> Vec<usize> {
        let mut out = Vec::new();
        self.scan(records, candidates, |index, _| out.push(index));
        out
    }
}

fn scan<'a, S, I>(program: &Program, source: &'a S, positions: I, mut hit: impl FnMut(usize, &'a Value))
where
    S: RecordSource + ?Sized,
    I: IntoIterator<Item = usize>,
{
    for index in positions {
        let Some(record) = source.record(index) else {
            continue;
        };
        if program.matches_record(record, index) {
            hit(index, record);
        }
    }
}

/// Index → record lookup used instead of slice indexing.
///
/// Implemented for slices, vectors, maps keyed by position, and any
/// `Fn(usize) -> Option<&Value>` wrapped in [`FnSource`]. Predicates only
/// borrow the source; they never cache what it returns.
pub trait RecordSource {
    fn record(&self, index: usize) -> Option<&Value>;
}

impl RecordSource for [Value] {
    fn record(&self, index: usize) -> Option<&Value> {
        self.get(index)
    }
}

impl RecordSource for Vec<Value> {
    fn record(&self, index: usize) -> Option<&Value> {
        self.get(index)
    }
}

impl RecordSource for HashMap<usize, Value> {
    fn record(&self, index: usize) -> Option<&Value> {
        self.get(&index)
    }
}

impl RecordSource for BTreeMap<usize, Value> {
    fn record(&self, index: usize) -> Option<&Value> {
        self.get(&index)
    }
}

/// A closure used as a [`RecordSource`].
///
/// ```
/// use sieve_expr::{CompileOptions, Program, Value, predicate::FnSource};
/// use serde_json::json;
///
/// let store: Vec<Value> = vec![json!({"n": 1}).into(), json!({"n": 5}).into()];
/// let get = FnSource::new(|i| store.get(i));
///
/// let program = Program::compile(&json!([">", ".n", 2]).into(), &CompileOptions::default()).unwrap();
/// assert_eq!(program.filter_source_indices(&get).run(&[0, 1]), vec![1]);
/// ```
pub struct FnSource<'s, F> {
    get: F,
    records: PhantomData<&'s Value>,
}

impl<'s, F> FnSource<'s, F>
where
    F: Fn(usize) -> Option<&'s Value>,
{
    pub fn new(get: F) -> Self {
        FnSource {
            get,
            records: PhantomData,
        }
    }
}

impl<'s, F> RecordSource for FnSource<'s, F>
where
    F: Fn(usize) -> Option<&'s Value>,
{
    fn record(&self, index: usize) -> Option<&Value> {
        (self.get)(index)
    }
}

/// Tests the record at a position of a [`RecordSource`].
pub struct IndexedMatcher<'s, S: ?Sized> {
    program: Program,
    source: &'s S,
}

impl<S: RecordSource + ?Sized> IndexedMatcher<'_, S> {
    /// Positions with no record never match.
    pub fn matches(&self, index: usize) -> bool {
        self.source
            .record(index)
            .is_some_and(|record| self.program.matches_record(record, index))
    }

    pub fn try_matches(&self, index: usize) -> Result<bool, EvalError> {
        match self.source.record(index) {
            Some(record) => self.program.eval(&RowFrame { record, index }),
            None => Ok(false),
        }
    }
}

/// Scans candidate positions of a [`RecordSource`].
pub struct IndexedFilter<'s, S: ?Sized, E> {
    program: Program,
    source: &'s S,
    emit: PhantomData<E>,
}

impl<'s, S: RecordSource + ?Sized, E> IndexedFilter<'s, S, E> {
    fn new(program: Program, source: &'s S) -> Self {
        IndexedFilter {
            program,
            source,
            emit: PhantomData,
        }
    }
}

impl<'s, S: RecordSource + ?Sized> IndexedFilter<'s, S, Records> {
    pub fn run(&self, candidates: &[usize]) -> Vec<&'s Value> {
        let mut out = Vec::new();
        scan(&self.program, self.source, candidates.iter().copied(), |_, record| {
            out.push(record)
        });
        out
    }
}

impl<S: RecordSource + ?Sized> IndexedFilter<'_, S, Indices> {
    pub fn run(&self, candidates: &[usize]) -> Vec<usize> {
        let mut out = Vec::new();
        scan(&self.program, self.source, candidates.iter().copied(), |index, _| {
            out.push(index)
        });
        out
    }
}

/// Compile a [`Matcher`].
pub fn compile_matcher(expr: &Value, options: &CompileOptions) -> Result<Matcher, CompileError> {
    Ok(Program::compile(expr, options)?.matcher())
}

/// Compile a [`Filter`] that returns matching records.
pub fn compile_filter(expr: &Value, options: &CompileOptions) -> Result<Filter<Records>, CompileError> {
    Ok(Program::compile(expr, options)?.filter())
}

/// Compile a [`Filter`] that returns matching positions.
pub fn compile_filter_indices(expr: &Value, options: &CompileOptions) -> Result<Filter<Indices>, CompileError> {
    Ok(Program::compile(expr, options)?.filter_indices())
}
