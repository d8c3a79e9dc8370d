use core::fmt;

/// Expression tree produced by the parser. Immutable once built; a compiled
/// expression can be evaluated any number of times against different
/// contexts.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    /// `$name` or `$prefix:name`.
    Variable {
        prefix: Option<String>,
        local: String,
    },
    /// Unary minus.
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `name(arg, …)` or `prefix:name(arg, …)`.
    FunctionCall {
        prefix: Option<String>,
        local: String,
        args: Vec<Expr>,
    },
    Path(LocationPath),
    /// A primary expression filtered by predicates, optionally continued by
    /// a relative location path: `(expr)[pred]…/step/…`.
    Filter {
        input: Box<Expr>,
        predicates: Vec<Expr>,
        steps: Vec<Step>,
    },
}

/// Literals are converted to their value at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Union,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessOrEqual => "<=",
            Self::GreaterOrEqual => ">=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "div",
            Self::Modulo => "mod",
            Self::Union => "|",
        }
    }
}

/// `/a/b[1]` — a sequence of steps, optionally anchored at the root.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

impl Step {
    pub fn new(axis: Axis, test: NodeTest) -> Self {
        Self {
            axis,
            test,
            predicates: Vec::new(),
        }
    }

    /// The `..` abbreviation.
    pub fn parent_shorthand() -> Self {
        Self::new(Axis::Parent, NodeTest::AnyNode)
    }

    /// The `.` abbreviation.
    pub fn self_shorthand() -> Self {
        Self::new(Axis::SelfAxis, NodeTest::AnyNode)
    }

    /// The step `//` desugars to.
    pub fn descendant_or_self_shorthand() -> Self {
        Self::new(Axis::DescendantOrSelf, NodeTest::AnyNode)
    }
}

/// The thirteen XPath 1.0 axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Ancestor,
    AncestorOrSelf,
    Attribute,
    Child,
    Descendant,
    DescendantOrSelf,
    Following,
    FollowingSibling,
    Namespace,
    Parent,
    Preceding,
    PrecedingSibling,
    SelfAxis,
}

impl Axis {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "ancestor" => Self::Ancestor,
            "ancestor-or-self" => Self::AncestorOrSelf,
            "attribute" => Self::Attribute,
            "child" => Self::Child,
            "descendant" => Self::Descendant,
            "descendant-or-self" => Self::DescendantOrSelf,
            "following" => Self::Following,
            "following-sibling" => Self::FollowingSibling,
            "namespace" => Self::Namespace,
            "parent" => Self::Parent,
            "preceding" => Self::Preceding,
            "preceding-sibling" => Self::PrecedingSibling,
            "self" => Self::SelfAxis,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ancestor => "ancestor",
            Self::AncestorOrSelf => "ancestor-or-self",
            Self::Attribute => "attribute",
            Self::Child => "child",
            Self::Descendant => "descendant",
            Self::DescendantOrSelf => "descendant-or-self",
            Self::Following => "following",
            Self::FollowingSibling => "following-sibling",
            Self::Namespace => "namespace",
            Self::Parent => "parent",
            Self::Preceding => "preceding",
            Self::PrecedingSibling => "preceding-sibling",
            Self::SelfAxis => "self",
        }
    }

    /// Axes that walk towards the start of the document. Their candidate
    /// lists are produced nearest-first, which is what positional
    /// predicates count along.
    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            Self::Ancestor | Self::AncestorOrSelf | Self::Preceding | Self::PrecedingSibling
        )
    }
}

/// What a step selects from its axis candidates.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeTest {
    /// `*` — any node of the axis's principal kind.
    AnyName,
    /// `prefix:*` — principal kind within a namespace.
    PrefixWildcard(String),
    /// `name` or `prefix:name`.
    Name {
        prefix: Option<String>,
        local: String,
    },
    /// `node()`.
    AnyNode,
    /// `text()`.
    Text,
    /// `comment()`.
    Comment,
    /// `processing-instruction()`.
    AnyProcessingInstruction,
    /// `processing-instruction("target")`.
    ProcessingInstruction(String),
}

// Canonical serialization: non-abbreviated steps, parenthesized operators.
// Reparsing the output yields a structurally equal tree.

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => lit.fmt(f),
            Self::Variable { prefix, local } => match prefix {
                Some(p) => write!(f, "${p}:{local}"),
                None => write!(f, "${local}"),
            },
            Self::Negate(inner) => write!(f, "-({inner})"),
            Self::Binary { op, left, right } => {
                write!(f, "({left} {} {right})", op.symbol())
            }
            Self::FunctionCall {
                prefix,
                local,
                args,
            } => {
                match prefix {
                    Some(p) => write!(f, "{p}:{local}(")?,
                    None => write!(f, "{local}(")?,
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    arg.fmt(f)?;
                }
                f.write_str(")")
            }
            Self::Path(path) => path.fmt(f),
            Self::Filter {
                input,
                predicates,
                steps,
            } => {
                if matches!(
                    **input,
                    Self::Literal(_) | Self::Variable { .. } | Self::FunctionCall { .. }
                ) {
                    input.fmt(f)?;
                } else {
                    write!(f, "({input})")?;
                }
                for predicate in predicates {
                    write!(f, "[{predicate}]")?;
                }
                for step in steps {
                    write!(f, "/{step}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&crate::value::format_number(*n)),
            Self::String(s) => {
                // A literal can never contain both quote kinds.
                if s.contains('"') {
                    write!(f, "'{s}'")
                } else {
                    write!(f, "\"{s}\"")
                }
            }
        }
    }
}

impl fmt::Display for LocationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            if self.steps.is_empty() {
                return f.write_str("/");
            }
            f.write_str("/")?;
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            step.fmt(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.axis.name(), self.test)?;
        for predicate in &self.predicates {
            write!(f, "[{predicate}]")?;
        }
        Ok(())
    }
}

impl fmt::Display for NodeTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnyName => f.write_str("*"),
            Self::PrefixWildcard(prefix) => write!(f, "{prefix}:*"),
            Self::Name { prefix, local } => match prefix {
                Some(p) => write!(f, "{p}:{local}"),
                None => f.write_str(local),
            },
            Self::AnyNode => f.write_str("node()"),
            Self::Text => f.write_str("text()"),
            Self::Comment => f.write_str("comment()"),
            Self::AnyProcessingInstruction => f.write_str("processing-instruction()"),
            Self::ProcessingInstruction(target) => {
                write!(f, "processing-instruction(\"{target}\")")
            }
        }
    }
}
