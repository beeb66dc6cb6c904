//! Literals precomputed once per compilation.
//!
//! Compiled patterns and membership sets are appended to a [`HoistTable`]
//! while the expression tree is walked; compiled nodes refer to them by slot.
//! The table is frozen inside the compiled program and never rebuilt per
//! invocation.

use std::{collections::HashSet, fmt};

use regex::{Regex, RegexBuilder};

use crate::{output::to_json, value::Value};

/// Position of an entry in the hoist table.
pub type Slot = usize;

/// Numeric set key; integral numbers share one spelling so `1` and `1.0` collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NumberKey {
    Int(i64),
    Bits(u64),
    NaN,
}

impl NumberKey {
    fn of(value: &Value) -> Option<NumberKey> {
        match value {
            Value::Integer(n) => Some(NumberKey::Int(*n)),
            Value::Float(n) if n.is_nan() => Some(NumberKey::NaN),
            Value::Float(n) if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n < i64::MAX as f64 => {
                // -0.0 lands on Int(0)
                Some(NumberKey::Int(*n as i64))
            }
            Value::Float(n) => Some(NumberKey::Bits(n.to_bits())),
            _ => None,
        }
    }
}

/// Set of scalar literals tested with SameValueZero semantics.
///
/// Arrays and objects in the literal list can never equal a record value and
/// are dropped.
#[derive(Debug, Clone, Default)]
pub struct MemberSet {
    strings: HashSet<String>,
    numbers: HashSet<NumberKey>,
    has_null: bool,
    has_true: bool,
    has_false: bool,
    /// Literals as given, for rendering
    source: Vec<Value>,
}

impl MemberSet {
    pub fn new(items: &[Value]) -> Self {
        let mut set = MemberSet {
            source: items.to_vec(),
            ..MemberSet::default()
        };
        for item in items {
            match item {
                Value::Null => set.has_null = true,
                Value::Boolean(true) => set.has_true = true,
                Value::Boolean(false) => set.has_false = true,
                Value::String(s) => {
                    set.strings.insert(s.clone());
                }
                Value::Integer(_) | Value::Float(_) => {
                    if let Some(key) = NumberKey::of(item) {
                        set.numbers.insert(key);
                    }
                }
                Value::Array(_) | Value::Object(_) => {}
            }
        }
        set
    }

    pub fn contains(&self, value: &Value) -> bool {
        match value {
            Value::Null => self.has_null,
            Value::Boolean(true) => self.has_true,
            Value::Boolean(false) => self.has_false,
            Value::String(s) => self.strings.contains(s.as_str()),
            Value::Integer(_) | Value::Float(_) => {
                NumberKey::of(value).is_some_and(|key| self.numbers.contains(&key))
            }
            Value::Array(_) | Value::Object(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.strings.len()
            + self.numbers.len()
            + usize::from(self.has_null)
            + usize::from(self.has_true)
            + usize::from(self.has_false)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One precomputed literal.
#[derive(Debug, Clone)]
pub enum Hoisted {
    Pattern { regex: Regex, ignore_case: bool },
    Members(MemberSet),
}

impl Hoisted {
    /// Compile a pattern operand.
    pub fn pattern(source: &str, ignore_case: bool) -> Result<Hoisted, regex::Error> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(ignore_case)
            .build()?;
        Ok(Hoisted::Pattern { regex, ignore_case })
    }

    pub fn members(items: &[Value]) -> Hoisted {
        Hoisted::Members(MemberSet::new(items))
    }
}

impl fmt::Display for Hoisted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hoisted::Pattern { regex, ignore_case } => {
                write!(f, "/{}/{}", regex.as_str(), if *ignore_case { "i" } else { "" })
            }
            Hoisted::Members(set) => write!(f, "set{}", to_json(&Value::Array(set.source.clone()))),
        }
    }
}

/// Append-only arena of hoisted literals, shared by one compilation.
#[derive(Debug, Clone, Default)]
pub struct HoistTable {
    entries: Vec<Hoisted>,
}

impl HoistTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; slots are assigned in call order.
    pub fn push(&mut self, entry: Hoisted) -> Slot {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn get(&self, slot: Slot) -> Option<&Hoisted> {
        self.entries.get(slot)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hoisted> {
        self.entries.iter()
    }

    pub(crate) fn pattern(&self, slot: Slot) -> Option<&Regex> {
        match self.entries.get(slot) {
            Some(Hoisted::Pattern { regex, .. }) => Some(regex),
            _ => None,
        }
    }

    pub(crate) fn members(&self, slot: Slot) -> Option<&MemberSet> {
        match self.entries.get(slot) {
            Some(Hoisted::Members(set)) => Some(set),
            _ => None,
        }
    }
}

impl fmt::Display for HoistTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (slot, entry) in self.entries.iter().enumerate() {
            writeln!(f, "#{} = {}", slot, entry)?;
        }
        Ok(())
    }
}
