use std::sync::Arc;

/// Error raised while compiling or evaluating an XPath expression.
///
/// Compile-time failures (lexical and grammar errors) mean the expression
/// itself is invalid; everything else is an evaluation failure against a
/// particular document. Use [`Error::is_compile_error`] to distinguish the
/// two. Each taxonomy entry carries a stable numeric [`Error::code`], and an
/// optional chained cause is available through `std::error::Error::source`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    /// Illegal character or unterminated string literal. Fatal at compile
    /// time, no AST is produced.
    #[error("lexical error at offset {position}: {message}")]
    Lex { message: String, position: usize },
    /// Grammar violation. Fatal at compile time.
    #[error("syntax error at token {position}: {message}")]
    Syntax { message: String, position: usize },
    /// Function name unresolved against the active resolver chain.
    #[error("unknown function {name}()")]
    UnknownFunction { name: String },
    /// Variable name unresolved against the variable resolver.
    #[error("undeclared variable ${name}")]
    UndeclaredVariable { name: String },
    /// A namespace prefix has no binding.
    #[error("no namespace binding for prefix '{prefix}'")]
    UnresolvableQName { prefix: String },
    /// A node-set was required where a scalar was given, or vice versa.
    #[error("cannot convert {from} to {to}")]
    TypeConversion {
        from: &'static str,
        to: &'static str,
    },
    /// A standard function was called with the wrong argument count/shape.
    #[error("{function}() expects {expected}, got {found} argument(s)")]
    InvalidArity {
        function: String,
        expected: &'static str,
        found: usize,
    },
    /// Descriptive generic evaluation failure.
    #[error("{0}")]
    Evaluation(String),
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub fn lex(message: impl Into<String>, position: usize) -> Self {
        Self::new(ErrorKind::Lex {
            message: message.into(),
            position,
        })
    }

    pub fn syntax(message: impl Into<String>, position: usize) -> Self {
        Self::new(ErrorKind::Syntax {
            message: message.into(),
            position,
        })
    }

    pub fn unknown_function(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownFunction { name: name.into() })
    }

    pub fn undeclared_variable(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndeclaredVariable { name: name.into() })
    }

    pub fn unresolvable_qname(prefix: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnresolvableQName {
            prefix: prefix.into(),
        })
    }

    pub fn type_conversion(from: &'static str, to: &'static str) -> Self {
        Self::new(ErrorKind::TypeConversion { from, to })
    }

    pub fn invalid_arity(function: impl Into<String>, expected: &'static str, found: usize) -> Self {
        Self::new(ErrorKind::InvalidArity {
            function: function.into(),
            expected,
            found,
        })
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Evaluation(message.into()))
    }

    /// Attach a chained cause.
    pub fn with_source(mut self, source: Arc<dyn std::error::Error + Send + Sync>) -> Self {
        self.source = Some(source);
        self
    }

    /// Stable numeric code for the taxonomy entry.
    pub fn code(&self) -> u16 {
        match &self.kind {
            ErrorKind::Lex { .. } => 101,
            ErrorKind::Syntax { .. } => 102,
            ErrorKind::UnknownFunction { .. } => 201,
            ErrorKind::UndeclaredVariable { .. } => 202,
            ErrorKind::UnresolvableQName { .. } => 203,
            ErrorKind::TypeConversion { .. } => 204,
            ErrorKind::InvalidArity { .. } => 205,
            ErrorKind::Evaluation(_) => 500,
        }
    }

    /// True for failures that mean the expression text itself is invalid.
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Lex { .. } | ErrorKind::Syntax { .. }
        )
    }
}
