//! Stable textual rendering of compiled programs.
//!
//! ```text
//! ($.temp < 110 && $.pie.filling == "apple")
//! !($.type in #0)
//! some($.fields, $.t == 1)
//! $[1][$i] > 30
//! ```
//!
//! Hoisted literals are referred to by slot (`#0`, `#1`, ...) and listed by
//! [`render`] after the body.

use std::fmt;

use crate::{
    hoist::HoistTable,
    node::{Node, range_ops},
    output::to_json,
};

fn join(f: &mut fmt::Formatter<'_>, children: &[Node], separator: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", separator)?;
        }
        write!(f, "{}", child)?;
    }
    write!(f, ")")
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Never => write!(f, "never"),
            Node::All(children) => join(f, children, "&&"),
            Node::Any(children) => join(f, children, "||"),
            Node::Not(inner) => write!(f, "!({})", inner),
            Node::Compare { path, op, literal } => {
                write!(f, "{} {} {}", path, op.symbol(), to_json(literal))
            }
            Node::Range { path, kind, min, max } => {
                let (lower, upper) = range_ops(*kind);
                write!(
                    f,
                    "{} {} {} && {} {} {}",
                    path,
                    lower.symbol(),
                    to_json(min),
                    path,
                    upper.symbol(),
                    to_json(max)
                )
            }
            Node::Truthy(path) => write!(f, "truthy({})", path),
            Node::Falsy(path) => write!(f, "falsy({})", path),
            Node::Member { path, slot } => write!(f, "{} in #{}", path, slot),
            Node::Text { path, op, needle, .. } => {
                write!(f, "{}({}, {})", op.name(), path, to_json(needle))
            }
            Node::Pattern { path, slot } => write!(f, "{} =~ #{}", path, slot),
            Node::Quantify {
                path,
                quantifier,
                body,
            } => write!(f, "{}({}, {})", quantifier.name(), path, body),
            Node::Type { path, test } => write!(f, "{}({})", test.name(), path),
            Node::Custom { name, config, .. } => write!(f, "{}($, $i, {})", name, to_json(config)),
        }
    }
}

/// Body on the first line, then one `#n = ...` line per hoisted literal.
pub(crate) fn render(root: &Node, hoists: &HoistTable) -> String {
    let mut out = root.to_string();
    out.push('\n');
    out.push_str(&hoists.to_string());
    out
}
