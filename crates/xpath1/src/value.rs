use crate::errors::Error;
use crate::model::XPathNode;
use crate::nodeset::NodeSet;

/// Result of evaluating an expression: one of the four XPath 1.0 kinds.
#[derive(Debug, Clone)]
pub enum Value<N: XPathNode> {
    String(String),
    Number(f64),
    Boolean(bool),
    Nodes(NodeSet<N>),
}

impl<N: XPathNode> Value<N> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Nodes(_) => "node-set",
        }
    }

    /// Coerce to String. For node-sets this is the string-value of the first
    /// node in document order (empty string for the empty set), so it may
    /// fail if the adapter cannot order the nodes.
    pub fn string_value(&self) -> Result<String, Error> {
        match self {
            Self::String(s) => Ok(s.clone()),
            Self::Number(n) => Ok(format_number(*n)),
            Self::Boolean(b) => Ok(if *b { "true".into() } else { "false".into() }),
            Self::Nodes(ns) => Ok(ns.first()?.map(|n| n.string_value()).unwrap_or_default()),
        }
    }

    /// Coerce to Number; unparsable strings become NaN, booleans become
    /// 1 or 0, node-sets go through their string form first.
    pub fn number_value(&self) -> Result<f64, Error> {
        match self {
            Self::String(s) => Ok(parse_number(s)),
            Self::Number(n) => Ok(*n),
            Self::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Self::Nodes(_) => Ok(parse_number(&self.string_value()?)),
        }
    }

    /// Coerce to Boolean: non-zero non-NaN numbers, non-empty strings and
    /// non-empty node-sets are true.
    pub fn boolean_value(&self) -> bool {
        match self {
            Self::String(s) => !s.is_empty(),
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Boolean(b) => *b,
            Self::Nodes(ns) => !ns.is_empty(),
        }
    }

    /// Node-sets pass through; scalar kinds never convert.
    pub fn into_node_set(self) -> Result<NodeSet<N>, Error> {
        match self {
            Self::Nodes(ns) => Ok(ns),
            other => Err(Error::type_conversion(other.kind_name(), "node-set")),
        }
    }

    pub fn as_node_set(&self) -> Result<&NodeSet<N>, Error> {
        match self {
            Self::Nodes(ns) => Ok(ns),
            other => Err(Error::type_conversion(other.kind_name(), "node-set")),
        }
    }
}

/// Comparison operators of the expression grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,
}

impl Comparison {
    pub fn is_equality(self) -> bool {
        matches!(self, Self::Equals | Self::NotEquals)
    }

    fn numeric(self, a: f64, b: f64) -> bool {
        match self {
            Self::Equals => a == b,
            Self::NotEquals => a != b,
            Self::LessThan => a < b,
            Self::GreaterThan => a > b,
            Self::LessOrEqual => a <= b,
            Self::GreaterOrEqual => a >= b,
        }
    }

    /// Native string comparison, only meaningful for equality operators.
    fn string(self, a: &str, b: &str) -> bool {
        match self {
            Self::Equals => a == b,
            Self::NotEquals => a != b,
            _ => self.numeric(parse_number(a), parse_number(b)),
        }
    }

    fn boolean(self, a: bool, b: bool) -> bool {
        match self {
            Self::Equals => a == b,
            Self::NotEquals => a != b,
            _ => self.numeric(if a { 1.0 } else { 0.0 }, if b { 1.0 } else { 0.0 }),
        }
    }
}

/// The full comparison matrix.
///
/// Node-sets compare existentially: the comparison holds if any member (or
/// member pair) satisfies it. Equality against a scalar compares in the
/// scalar's native kind; relational operators always compare numerically.
/// A node-set against a boolean first collapses to its effective boolean.
pub fn compare_values<N: XPathNode>(
    op: Comparison,
    left: &Value<N>,
    right: &Value<N>,
) -> Result<bool, Error> {
    use Value::{Boolean, Nodes, Number, String};
    match (left, right) {
        (Nodes(l), Nodes(r)) => {
            for ln in l.iter() {
                let ls = ln.string_value();
                for rn in r.iter() {
                    let holds = if op.is_equality() {
                        op.string(&ls, &rn.string_value())
                    } else {
                        op.numeric(parse_number(&ls), parse_number(&rn.string_value()))
                    };
                    if holds {
                        return Ok(true);
                    }
                }
            }
            Ok(false)
        }
        (Nodes(ns), Boolean(b)) => Ok(op.boolean(!ns.is_empty(), *b)),
        (Boolean(b), Nodes(ns)) => Ok(op.boolean(*b, !ns.is_empty())),
        (Nodes(ns), Number(n)) => {
            for node in ns.iter() {
                if op.numeric(parse_number(&node.string_value()), *n) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        (Number(n), Nodes(ns)) => {
            for node in ns.iter() {
                if op.numeric(*n, parse_number(&node.string_value())) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        (Nodes(ns), String(s)) => {
            for node in ns.iter() {
                if op.string(&node.string_value(), s) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        (String(s), Nodes(ns)) => {
            for node in ns.iter() {
                if op.string(s, &node.string_value()) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        (Boolean(_), _) | (_, Boolean(_)) => {
            Ok(op.boolean(left.boolean_value(), right.boolean_value()))
        }
        (Number(_), _) | (_, Number(_)) => {
            Ok(op.numeric(left.number_value()?, right.number_value()?))
        }
        (String(a), String(b)) => Ok(op.string(a, b)),
    }
}

/// Arithmetic operators of the expression grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arithmetic {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

/// Numeric arithmetic with IEEE-754 semantics: division by zero yields an
/// infinity, `0 div 0` yields NaN, `mod` keeps the sign of the dividend.
pub fn arithmetic<N: XPathNode>(
    op: Arithmetic,
    left: &Value<N>,
    right: &Value<N>,
) -> Result<f64, Error> {
    let a = left.number_value()?;
    let b = right.number_value()?;
    Ok(match op {
        Arithmetic::Add => a + b,
        Arithmetic::Subtract => a - b,
        Arithmetic::Multiply => a * b,
        Arithmetic::Divide => a / b,
        Arithmetic::Modulo => a % b,
    })
}

/// Parse a string as an XPath number.
///
/// The accepted pattern is `-? (digits ('.' digits*)? | '.' digits)`,
/// surrounded by optional XML whitespace. Exponent notation, a leading `+`
/// and anything else yield NaN.
#[must_use]
pub fn parse_number(s: &str) -> f64 {
    let t = s.trim_matches([' ', '\t', '\r', '\n']);
    let body = t.strip_prefix('-').unwrap_or(t);
    if body.is_empty() {
        return f64::NAN;
    }
    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (body, None),
    };
    let digits_only = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    let valid = match frac_part {
        // ".5" is a number, "." alone and "1.2.3" are not.
        Some(f) => {
            digits_only(int_part)
                && digits_only(f)
                && (!int_part.is_empty() || !f.is_empty())
        }
        None => !int_part.is_empty() && digits_only(int_part),
    };
    if valid {
        t.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Format a number as XPath string conversion requires: `NaN`, signed
/// `Infinity`, integers without a decimal point, and plain positional
/// notation for everything else (never exponent form; `f64`'s `Display`
/// already expands large and small magnitudes).
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".into() } else { "-Infinity".into() }
    } else if n == 0.0 {
        // Covers negative zero.
        "0".into()
    } else {
        format!("{n}")
    }
}

/// Rounding used by `round()` and the `substring()` index arithmetic:
/// nearest integer, ties away from zero; NaN and infinities pass through.
#[must_use]
pub fn round_number(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() { n } else { n.round() }
}
