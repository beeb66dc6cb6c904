//! Field paths: sanitizing raw path strings and resolving them against records.
//!
//! A raw path is `$` (the whole record), `$i` (the current index), or a chain
//! of steps starting with `.` or `[`:
//!
//! ```text
//! .pie.filling      field steps
//! .items[0].name    index step
//! .items[-1]        last element
//! .a?.b  .a.?b      null-safe step
//! ```
//!
//! Only `[A-Za-z0-9_.?[]$-]` survives sanitizing; every other character is
//! dropped before the path is parsed. Paths never become executable text, so
//! the allow-list normalizes input rather than guarding an interpreter.

use std::fmt;

use crate::{
    error::{CompileError, EvalError},
    node::Frame,
    value::Value,
};

/// Characters a path may contain after sanitizing.
pub fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '?' | '[' | ']' | '-' | '$')
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'$')
}

/// Where a path starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Root {
    /// `$`, the record under test
    Record,
    /// `$i`, the position of the record under test
    Index,
    /// `$[n][$i]`, a cell of column `n` in a columnar layout
    Column(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Field(String),
    /// Numeric key; `text` is the same key for object lookups
    Index { position: i64, text: String },
}

impl Key {
    fn parse(name: &str) -> Key {
        match name.parse::<i64>() {
            // only canonical spellings, so `[007]` stays an object key
            Ok(position) if position.to_string() == name => Key::Index {
                position,
                text: name.to_string(),
            },
            _ => Key::Field(name.to_string()),
        }
    }

    fn lookup<'v>(&self, value: &'v Value) -> Operand<'v> {
        match (self, value) {
            (Key::Field(name), Value::Object(map)) => map.get(name).map_or(Operand::Absent, Operand::Found),
            (Key::Field(name), Value::Array(items)) if name == "length" => {
                Operand::Owned(Value::Integer(items.len() as i64))
            }
            (Key::Field(name), Value::String(s)) if name == "length" => {
                Operand::Owned(Value::Integer(s.chars().count() as i64))
            }
            (Key::Index { position, .. }, Value::Array(items)) => {
                let len = items.len();
                let index = if *position < 0 {
                    // Negative index: count from end (-1 = last)
                    let abs = position.unsigned_abs() as usize;
                    if abs > len {
                        return Operand::Absent;
                    }
                    len - abs
                } else {
                    *position as usize
                };
                items.get(index).map_or(Operand::Absent, Operand::Found)
            }
            (Key::Index { text, .. }, Value::Object(map)) => map.get(text).map_or(Operand::Absent, Operand::Found),
            _ => Operand::Absent,
        }
    }

    /// Same key, ignoring how it was spelled.
    pub(crate) fn same_key(&self, other: &Key) -> bool {
        match (self, other) {
            (Key::Field(a), Key::Field(b)) => a == b,
            (Key::Index { position: a, .. }, Key::Index { position: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Field(name) => write!(f, "{}", name),
            Key::Index { position, .. } => write!(f, "{}", position),
        }
    }
}

/// One access step of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub key: Key,
    /// Null-safe: short-circuits to absent instead of faulting on null/absent
    pub optional: bool,
}

/// A sanitized field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    root: Root,
    steps: Vec<Step>,
}

/// Result of resolving a path.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand<'v> {
    Found(&'v Value),
    /// Computed on the fly (`$i`, `.length`)
    Owned(Value),
    Absent,
}

impl Operand<'_> {
    pub(crate) fn value(&self) -> Option<&Value> {
        match self {
            Operand::Found(value) => Some(value),
            Operand::Owned(value) => Some(value),
            Operand::Absent => None,
        }
    }
}

impl Path {
    /// `$`
    pub fn record() -> Self {
        Path {
            root: Root::Record,
            steps: Vec::new(),
        }
    }

    /// `$i`
    pub fn index() -> Self {
        Path {
            root: Root::Index,
            steps: Vec::new(),
        }
    }

    /// Sanitize and parse a raw path.
    ///
    /// `$` and `$i` pass through. Anything else must start with `.` or `[`
    /// (optionally behind a leading `$`, so rendered paths parse back to
    /// themselves). With `chain`, every step becomes null-safe.
    ///
    /// ```
    /// use sieve_expr::path::Path;
    ///
    /// let path = Path::sanitize(".hello(); alert(1)", false).unwrap();
    /// assert_eq!(path.to_string(), "$.helloalert1");
    ///
    /// let path = Path::sanitize(".geo[1].foo", true).unwrap();
    /// assert_eq!(path.to_string(), "$?.geo?.[1]?.foo");
    ///
    /// assert!(Path::sanitize("constructor", false).is_err());
    /// ```
    pub fn sanitize(raw: &str, chain: bool) -> Result<Path, CompileError> {
        match raw {
            "$" => return Ok(Path::record()),
            "$i" => return Ok(Path::index()),
            _ => {}
        }

        let body = match raw.strip_prefix('$') {
            Some(rest) if rest.starts_with(['.', '[', '?']) => rest,
            _ if raw.starts_with(['.', '[']) => raw,
            _ => return Err(CompileError::InvalidPath(raw.to_string())),
        };

        let clean: String = body.chars().filter(|c| is_allowed(*c)).collect();
        Ok(Path {
            root: Root::Record,
            steps: parse_steps(&clean, chain),
        })
    }

    pub fn root(&self) -> &Root {
        &self.root
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The whole record, with no steps.
    pub fn is_record(&self) -> bool {
        self.root == Root::Record && self.steps.is_empty()
    }

    pub(crate) fn from_parts(root: Root, steps: Vec<Step>) -> Self {
        Path { root, steps }
    }

    pub(crate) fn into_steps(self) -> Vec<Step> {
        self.steps
    }

    pub(crate) fn resolve<'f, F: Frame + ?Sized>(&self, frame: &'f F) -> Result<Operand<'f>, EvalError> {
        let mut current = match self.root {
            Root::Record => frame.record().map_or(Operand::Absent, Operand::Found),
            Root::Index => Operand::Owned(Value::Integer(frame.index() as i64)),
            Root::Column(column) => frame.cell(column).map_or(Operand::Absent, Operand::Found),
        };

        for step in &self.steps {
            current = match &current {
                Operand::Found(Value::Null) | Operand::Absent => {
                    if step.optional {
                        return Ok(Operand::Absent);
                    }
                    let found = match current {
                        Operand::Absent => "undefined",
                        _ => "null",
                    };
                    return Err(EvalError::NullAccess {
                        path: self.to_string(),
                        step: step.key.to_string(),
                        found,
                    });
                }
                Operand::Found(value) => step.key.lookup(*value),
                // computed integers have no fields
                Operand::Owned(_) => Operand::Absent,
            };
        }

        Ok(current)
    }
}

fn parse_steps(clean: &str, chain: bool) -> Vec<Step> {
    let bytes = clean.as_bytes();
    let len = bytes.len();
    let mut steps = Vec::new();
    let mut optional = false;
    let mut i = 0;

    let mut push = |name: &str, optional: &mut bool| {
        if !name.is_empty() {
            steps.push(Step {
                key: Key::parse(name),
                optional: *optional || chain,
            });
            *optional = false;
        }
    };

    while i < len {
        match bytes[i] {
            b'?' => {
                optional = true;
                i += 1;
            }
            b'[' => {
                i += 1;
                let start = i;
                while i < len && bytes[i] != b']' {
                    i += 1;
                }
                push(&clean[start..i], &mut optional);
                // closing bracket
                i += 1;
            }
            b'.' | b']' => i += 1,
            _ => {
                let start = i;
                while i < len && is_name_byte(bytes[i]) {
                    i += 1;
                }
                if i == start {
                    i += 1;
                    continue;
                }
                push(&clean[start..i], &mut optional);
            }
        }
    }

    steps
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            Root::Record => write!(f, "$")?,
            Root::Index => write!(f, "$i")?,
            Root::Column(column) => write!(f, "$[{}][$i]", column)?,
        }
        for step in &self.steps {
            let plain = match &step.key {
                Key::Field(name) => name.bytes().all(is_name_byte),
                Key::Index { .. } => false,
            };
            match (step.optional, plain) {
                (true, true) => write!(f, "?.{}", step.key)?,
                (true, false) => write!(f, "?.[{}]", step.key)?,
                (false, true) => write!(f, ".{}", step.key)?,
                (false, false) => write!(f, "[{}]", step.key)?,
            }
        }
        Ok(())
    }
}
