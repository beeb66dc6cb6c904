//! Run and explain expressions against JSON input

use super::CliError;
use crate::{
    CompileOptions, Value,
    columnar::ColumnarProgram,
    predicate::Program,
};

/// Options for the filter command
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// The expression, as JSON
    pub expr: String,
    /// JSON input string: an array of records, or of columns
    pub input: Option<String>,
    /// Emit matching positions instead of records
    pub indices: bool,
    pub chain: bool,
    pub strict: bool,
    /// Treat the input as a list of columns
    pub columnar: bool,
    /// Column field paths, in column order
    pub names: Vec<String>,
}

/// Options for the explain command
#[derive(Debug, Clone, Default)]
pub struct ExplainOptions {
    pub expr: String,
    pub chain: bool,
    pub strict: bool,
    pub columnar: bool,
    pub names: Vec<String>,
}

fn compile_options(chain: bool, strict: bool) -> CompileOptions {
    CompileOptions::new().chain(chain).strict(strict)
}

fn parse_expr(expr: &str) -> Result<Value, CliError> {
    let json: serde_json::Value = serde_json::from_str(expr)?;
    Ok(json.into())
}

fn name_table(names: &[String]) -> Option<Vec<&str>> {
    if names.is_empty() {
        None
    } else {
        Some(names.iter().map(String::as_str).collect())
    }
}

/// Filter the input and return the matches as a JSON array.
pub fn execute_filter(options: &FilterOptions) -> Result<Value, CliError> {
    let expr = parse_expr(&options.expr)?;
    let compile = compile_options(options.chain, options.strict);

    let input = options.input.as_ref().ok_or(CliError::NoInput)?;
    let json: serde_json::Value = serde_json::from_str(input)?;
    let Value::Array(items) = Value::from(json) else {
        return Err(CliError::NotAnArray("input"));
    };

    if !options.columnar {
        let program = Program::compile(&expr, &compile)?;
        return Ok(if options.indices {
            indices(program.filter_indices().run(&items, None))
        } else {
            Value::Array(program.filter().run(&items, None).into_iter().cloned().collect())
        });
    }

    let mut columns = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Array(column) => columns.push(column),
            _ => return Err(CliError::NotAnArray("every column")),
        }
    }

    let names = name_table(&options.names);
    let program = ColumnarProgram::compile(&expr, names.as_deref(), &compile)?;
    Ok(if options.indices {
        indices(program.filter_indices().run(&columns, None))
    } else {
        Value::Array(
            program
                .filter()
                .run(&columns, None)
                .into_iter()
                .map(|column| Value::Array(column.into_iter().cloned().collect()))
                .collect(),
        )
    })
}

fn indices(positions: Vec<usize>) -> Value {
    Value::Array(
        positions
            .into_iter()
            .map(|position| Value::Integer(position as i64))
            .collect(),
    )
}

/// Compile the expression and render its body and hoist table.
pub fn execute_explain(options: &ExplainOptions) -> Result<String, CliError> {
    let expr = parse_expr(&options.expr)?;
    let compile = compile_options(options.chain, options.strict);

    if options.columnar {
        let names = name_table(&options.names);
        Ok(ColumnarProgram::compile(&expr, names.as_deref(), &compile)?.explain())
    } else {
        Ok(Program::compile(&expr, &compile)?.explain())
    }
}
