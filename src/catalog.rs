//! The closed table of built-in operator tokens.
//!
//! Every token maps to one [`Operator`]; operators belong to a
//! [`Category`] that fixes the shape of the right operand. A leading `!`
//! negates any token except the atomic ones (`!`, `!!`, `!=`, `!==`), which
//! carry the `!` as part of their identity.

/// Semantic category of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Combinator,
    Comparison,
    Truthiness,
    Membership,
    Range,
    Substring,
    Pattern,
    Quantifier,
    TypeTest,
    /// Caller-registered named predicate
    Custom,
}

impl Category {
    /// Every category, in catalog order
    pub const ALL: [Category; 10] = [
        Category::Combinator,
        Category::Comparison,
        Category::Truthiness,
        Category::Membership,
        Category::Range,
        Category::Substring,
        Category::Pattern,
        Category::Quantifier,
        Category::TypeTest,
        Category::Custom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Combinator => "combinator",
            Category::Comparison => "comparison",
            Category::Truthiness => "truthiness",
            Category::Membership => "membership",
            Category::Range => "range",
            Category::Substring => "substring",
            Category::Pattern => "pattern",
            Category::Quantifier => "quantifier",
            Category::TypeTest => "type-test",
            Category::Custom => "custom",
        }
    }

    /// Operands that follow the token in an expression node.
    pub fn arity(self) -> Arity {
        match self {
            Category::Combinator => Arity::Variadic,
            Category::Truthiness | Category::TypeTest => Arity::Unary,
            Category::Custom => Arity::Aux,
            _ => Arity::Binary,
        }
    }

    /// Shape the right operand must have.
    pub fn right_operand(self) -> &'static str {
        match self {
            Category::Combinator => "list of child nodes",
            Category::Comparison => "scalar literal",
            Category::Truthiness | Category::TypeTest => "none",
            Category::Membership => "literal list",
            Category::Range => "[min, max]",
            Category::Substring => "string literal",
            Category::Pattern => "pattern source string",
            Category::Quantifier => "nested expression node",
            Category::Custom => "caller-defined (left operand is passed as configuration)",
        }
    }
}

/// Operand count of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Any number of child nodes
    Variadic,
    /// A path only
    Unary,
    /// A path and a right operand
    Binary,
    /// One configuration value handed to a custom operator
    Aux,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Ge,
    Le,
    Lt,
    Gt,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::StrictEq => "===",
            CompareOp::StrictNe => "!==",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
        }
    }
}

/// Bracket variant of a range operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeKind {
    /// `-` / `[]`
    Closed,
    /// `()`
    Open,
    /// `[)`
    ClosedOpen,
    /// `(]`
    OpenClosed,
}

impl RangeKind {
    pub fn lower_inclusive(self) -> bool {
        matches!(self, RangeKind::Closed | RangeKind::ClosedOpen)
    }

    pub fn upper_inclusive(self) -> bool {
        matches!(self, RangeKind::Closed | RangeKind::OpenClosed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextOp {
    Includes,
    StartsWith,
    EndsWith,
}

impl TextOp {
    pub fn name(self) -> &'static str {
        match self {
            TextOp::Includes => "includes",
            TextOp::StartsWith => "starts_with",
            TextOp::EndsWith => "ends_with",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    Some,
    Every,
}

impl Quantifier {
    pub fn name(self) -> &'static str {
        match self {
            Quantifier::Some => "some",
            Quantifier::Every => "every",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTest {
    IsInteger,
    IsFinite,
    IsNaN,
    IsArray,
}

impl TypeTest {
    pub fn name(self) -> &'static str {
        match self {
            TypeTest::IsInteger => "is_integer",
            TypeTest::IsFinite => "is_finite",
            TypeTest::IsNaN => "is_nan",
            TypeTest::IsArray => "is_array",
        }
    }
}

/// A built-in operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    And,
    Or,
    Compare(CompareOp),
    Truthy,
    Falsy,
    In,
    Range(RangeKind),
    Text(TextOp),
    Regexp { ignore_case: bool },
    Quantify(Quantifier),
    Type(TypeTest),
}

/// The catalog: every operator with its canonical token first, aliases after.
pub const CATALOG: &[(Operator, &[&str])] = &[
    (Operator::And, &["&&"]),
    (Operator::Or, &["||"]),
    (Operator::Compare(CompareOp::Eq), &["=="]),
    (Operator::Compare(CompareOp::Ne), &["!="]),
    (Operator::Compare(CompareOp::StrictEq), &["==="]),
    (Operator::Compare(CompareOp::StrictNe), &["!=="]),
    (Operator::Compare(CompareOp::Ge), &[">="]),
    (Operator::Compare(CompareOp::Le), &["<="]),
    (Operator::Compare(CompareOp::Lt), &["<"]),
    (Operator::Compare(CompareOp::Gt), &[">"]),
    (Operator::Truthy, &["truthy", "!!"]),
    (Operator::Falsy, &["falsy", "!"]),
    (Operator::In, &["in", ","]),
    (Operator::Range(RangeKind::Closed), &["[]", "-"]),
    (Operator::Range(RangeKind::Open), &["()"]),
    (Operator::Range(RangeKind::ClosedOpen), &["[)"]),
    (Operator::Range(RangeKind::OpenClosed), &["(]"]),
    (Operator::Text(TextOp::Includes), &["includes", "*"]),
    (Operator::Text(TextOp::StartsWith), &["startsWith", "^"]),
    (Operator::Text(TextOp::EndsWith), &["endsWith", "$"]),
    (Operator::Regexp { ignore_case: false }, &["regexp", "/", "re"]),
    (Operator::Regexp { ignore_case: true }, &["regexpi", "/i", "rei"]),
    (Operator::Quantify(Quantifier::Some), &["some"]),
    (Operator::Quantify(Quantifier::Every), &["every"]),
    (Operator::Type(TypeTest::IsInteger), &["isInteger"]),
    (Operator::Type(TypeTest::IsFinite), &["isFinite"]),
    (Operator::Type(TypeTest::IsNaN), &["isNaN"]),
    (Operator::Type(TypeTest::IsArray), &["isArray"]),
];

/// Tokens whose leading `!` is part of the token itself.
const ATOMIC: [&str; 4] = ["!", "!!", "!=", "!=="];

impl Operator {
    /// Look up a bare token (no negation marker).
    pub fn lookup(token: &str) -> Option<Operator> {
        CATALOG
            .iter()
            .find(|(_, tokens)| tokens.contains(&token))
            .map(|(op, _)| *op)
    }

    /// One-line meaning, as listed by `sieve doc`.
    pub fn describe(self) -> &'static str {
        match self {
            Operator::And => "every child matches",
            Operator::Or => "at least one child matches",
            Operator::Compare(CompareOp::Eq) => "loosely equal",
            Operator::Compare(CompareOp::Ne) => "not loosely equal",
            Operator::Compare(CompareOp::StrictEq) => "same type and value",
            Operator::Compare(CompareOp::StrictNe) => "different type or value",
            Operator::Compare(CompareOp::Ge) => "greater than or equal",
            Operator::Compare(CompareOp::Le) => "less than or equal",
            Operator::Compare(CompareOp::Lt) => "less than",
            Operator::Compare(CompareOp::Gt) => "greater than",
            Operator::Truthy => "value is truthy",
            Operator::Falsy => "value is falsy",
            Operator::In => "value is one of the listed literals",
            Operator::Range(RangeKind::Closed) => "min <= value <= max",
            Operator::Range(RangeKind::Open) => "min < value < max",
            Operator::Range(RangeKind::ClosedOpen) => "min <= value < max",
            Operator::Range(RangeKind::OpenClosed) => "min < value <= max",
            Operator::Text(TextOp::Includes) => "string or array contains the needle",
            Operator::Text(TextOp::StartsWith) => "string starts with the needle",
            Operator::Text(TextOp::EndsWith) => "string ends with the needle",
            Operator::Regexp { ignore_case: false } => "display text matches the pattern",
            Operator::Regexp { ignore_case: true } => "display text matches the pattern, ignoring case",
            Operator::Quantify(Quantifier::Some) => "at least one element matches the body",
            Operator::Quantify(Quantifier::Every) => "every element matches the body",
            Operator::Type(TypeTest::IsInteger) => "number with no fractional part",
            Operator::Type(TypeTest::IsFinite) => "finite number",
            Operator::Type(TypeTest::IsNaN) => "value is NaN",
            Operator::Type(TypeTest::IsArray) => "array",
        }
    }

    pub fn category(self) -> Category {
        match self {
            Operator::And | Operator::Or => Category::Combinator,
            Operator::Compare(_) => Category::Comparison,
            Operator::Truthy | Operator::Falsy => Category::Truthiness,
            Operator::In => Category::Membership,
            Operator::Range(_) => Category::Range,
            Operator::Text(_) => Category::Substring,
            Operator::Regexp { .. } => Category::Pattern,
            Operator::Quantify(_) => Category::Quantifier,
            Operator::Type(_) => Category::TypeTest,
        }
    }

    /// Canonical token followed by its aliases.
    pub fn tokens(self) -> &'static [&'static str] {
        CATALOG
            .iter()
            .find(|(op, _)| *op == self)
            .map(|(_, tokens)| *tokens)
            .unwrap_or(&[])
    }
}

/// Whether the token's leading `!` belongs to the token.
pub fn is_atomic(token: &str) -> bool {
    ATOMIC.contains(&token)
}

/// A token with its negation marker resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<'t> {
    /// The token without the negation marker
    pub token: &'t str,
    /// Whether the node's result is inverted
    pub negated: bool,
}

/// Strip one leading negation marker unless the token is atomic.
///
/// ```
/// use sieve_expr::catalog::resolve;
///
/// assert!(resolve("!includes").negated);
/// assert_eq!(resolve("!includes").token, "includes");
/// assert!(!resolve("!=").negated);
/// assert!(!resolve("!!").negated);
/// ```
pub fn resolve(token: &str) -> Resolved<'_> {
    match token.strip_prefix('!') {
        Some(rest) if !rest.is_empty() && !is_atomic(token) => Resolved {
            token: rest,
            negated: true,
        },
        _ => Resolved {
            token,
            negated: false,
        },
    }
}
