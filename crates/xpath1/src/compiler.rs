//! Compile-once, evaluate-many entry points and the evaluation options
//! builder.

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::engine::context::{
    Context, FunctionImpl, FunctionResolver, MapFunctions, MapNamespaces, MapVariables,
    NamespaceResolver, VariableResolver,
};
use crate::engine::evaluator;
use crate::errors::Error;
use crate::model::XPathNode;
use crate::nodeset::NodeSet;
use crate::parser::ast::Expr;
use crate::parser::parse_expression;
use crate::value::Value;

/// Compile an expression string into a reusable [`CompiledExpression`].
///
/// # Errors
///
/// Lexical and syntax errors (`Error::is_compile_error()` is true).
pub fn compile(source: &str) -> Result<CompiledExpression, Error> {
    trace!(source, "compiling expression");
    let expr = parse_expression(source).inspect_err(|error| {
        trace!(source, %error, "compilation failed");
    })?;
    Ok(CompiledExpression {
        source: source.to_string(),
        expr,
    })
}

/// One-shot compile and evaluate.
///
/// # Errors
///
/// Compile errors of the source plus evaluation errors against the context.
pub fn evaluate<N: XPathNode>(source: &str, ctx: &Context<N>) -> Result<Value<N>, Error> {
    compile(source)?.evaluate(ctx)
}

/// A parsed expression, independent of any document. Evaluation never
/// mutates the expression, so one compiled expression can be shared and
/// evaluated concurrently against separate contexts.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    source: String,
    expr: Expr,
}

impl CompiledExpression {
    /// The original expression text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate to whichever of the four kinds the expression produces.
    pub fn evaluate<N: XPathNode>(&self, ctx: &Context<N>) -> Result<Value<N>, Error> {
        trace!(source = self.source.as_str(), "evaluating expression");
        evaluator::evaluate(&self.expr, ctx)
    }

    /// Evaluate and coerce the result to a string.
    pub fn evaluate_string<N: XPathNode>(&self, ctx: &Context<N>) -> Result<String, Error> {
        self.evaluate(ctx)?.string_value()
    }

    /// Evaluate and coerce the result to a number.
    pub fn evaluate_number<N: XPathNode>(&self, ctx: &Context<N>) -> Result<f64, Error> {
        self.evaluate(ctx)?.number_value()
    }

    /// Evaluate and take the result's effective boolean.
    pub fn evaluate_boolean<N: XPathNode>(&self, ctx: &Context<N>) -> Result<bool, Error> {
        Ok(self.evaluate(ctx)?.boolean_value())
    }

    /// Evaluate to a node-set; scalar results are a type error.
    pub fn evaluate_node_set<N: XPathNode>(&self, ctx: &Context<N>) -> Result<NodeSet<N>, Error> {
        self.evaluate(ctx)?.into_node_set()
    }

    /// Evaluate to a node-set and materialize it in document order.
    pub fn select<N: XPathNode>(&self, ctx: &Context<N>) -> Result<Vec<N>, Error> {
        self.evaluate_node_set(ctx)?.ordered()
    }

    /// First node of the result in document order, if any.
    pub fn select1<N: XPathNode>(&self, ctx: &Context<N>) -> Result<Option<N>, Error> {
        self.evaluate_node_set(ctx)?.first()
    }
}

impl fmt::Display for CompiledExpression {
    /// Canonical (non-abbreviated) form; reparsing it yields an equal tree.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.expr.fmt(f)
    }
}

/// Builder for an evaluation [`Context`].
///
/// Namespaces, variables and functions each accept individual entries, a
/// whole map, or a resolver (object or closure); map entries are consulted
/// before the resolver.
pub struct EvalOptions<N: XPathNode> {
    node: N,
    namespace_map: HashMap<String, String>,
    namespace_resolver: Option<Arc<dyn NamespaceResolver>>,
    variable_map: HashMap<String, Value<N>>,
    variable_resolver: Option<Arc<dyn VariableResolver<N>>>,
    function_map: HashMap<String, FunctionImpl<N>>,
    function_resolver: Option<Arc<dyn FunctionResolver<N>>>,
    html: bool,
    any_namespace_for_no_prefix: bool,
    virtual_root: Option<N>,
}

impl<N: XPathNode + 'static> EvalOptions<N> {
    pub fn new(node: N) -> Self {
        Self {
            node,
            namespace_map: HashMap::new(),
            namespace_resolver: None,
            variable_map: HashMap::new(),
            variable_resolver: None,
            function_map: HashMap::new(),
            function_resolver: None,
            html: false,
            any_namespace_for_no_prefix: false,
            virtual_root: None,
        }
    }

    #[must_use]
    pub fn namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespace_map.insert(prefix.into(), uri.into());
        self
    }

    #[must_use]
    pub fn namespaces(mut self, map: HashMap<String, String>) -> Self {
        self.namespace_map.extend(map);
        self
    }

    #[must_use]
    pub fn namespace_resolver(mut self, resolver: Arc<dyn NamespaceResolver>) -> Self {
        self.namespace_resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, value: Value<N>) -> Self {
        self.variable_map.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn variables(mut self, map: HashMap<String, Value<N>>) -> Self {
        self.variable_map.extend(map);
        self
    }

    #[must_use]
    pub fn variable_resolver(mut self, resolver: Arc<dyn VariableResolver<N>>) -> Self {
        self.variable_resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&Context<N>, &[Expr]) -> Result<Value<N>, Error> + Send + Sync + 'static,
    {
        self.function_map.insert(name.into(), Arc::new(function));
        self
    }

    #[must_use]
    pub fn function_resolver(mut self, resolver: Arc<dyn FunctionResolver<N>>) -> Self {
        self.function_resolver = Some(resolver);
        self
    }

    /// HTML mode: case-insensitive name tests and permissive matching of
    /// unprefixed names.
    #[must_use]
    pub fn html(mut self, html: bool) -> Self {
        self.html = html;
        self
    }

    /// Let unprefixed name tests match elements in any namespace.
    #[must_use]
    pub fn any_namespace_for_no_prefix(mut self, allow: bool) -> Self {
        self.any_namespace_for_no_prefix = allow;
        self
    }

    /// Scope evaluation to the subtree under this node: absolute paths
    /// start here, and upward traversal stops here.
    #[must_use]
    pub fn virtual_root(mut self, root: N) -> Self {
        self.virtual_root = Some(root);
        self
    }

    /// Build the immutable evaluation context.
    #[must_use]
    pub fn build(self) -> Context<N> {
        let mut ctx = Context::new(self.node);
        ctx.namespaces = match (self.namespace_map.is_empty(), self.namespace_resolver) {
            (true, resolver) => resolver,
            (false, None) => Some(Arc::new(MapNamespaces(self.namespace_map))),
            (false, Some(fallback)) => Some(Arc::new(ChainedNamespaces {
                map: MapNamespaces(self.namespace_map),
                fallback,
            })),
        };
        ctx.variables = match (self.variable_map.is_empty(), self.variable_resolver) {
            (true, resolver) => resolver,
            (false, None) => Some(Arc::new(MapVariables(self.variable_map))),
            (false, Some(fallback)) => Some(Arc::new(ChainedVariables {
                map: MapVariables(self.variable_map),
                fallback,
            })),
        };
        ctx.functions = match (self.function_map.is_empty(), self.function_resolver) {
            (true, resolver) => resolver,
            (false, None) => Some(Arc::new(MapFunctions(self.function_map))),
            (false, Some(fallback)) => Some(Arc::new(ChainedFunctions {
                map: MapFunctions(self.function_map),
                fallback,
            })),
        };
        ctx.case_insensitive = self.html;
        ctx.any_namespace_for_no_prefix = self.any_namespace_for_no_prefix || self.html;
        ctx.virtual_root = self.virtual_root;
        ctx
    }
}

// Map entries win over the fallback resolver.

struct ChainedNamespaces {
    map: MapNamespaces,
    fallback: Arc<dyn NamespaceResolver>,
}

impl NamespaceResolver for ChainedNamespaces {
    fn resolve_prefix(&self, prefix: &str) -> Option<String> {
        self.map
            .resolve_prefix(prefix)
            .or_else(|| self.fallback.resolve_prefix(prefix))
    }
}

struct ChainedVariables<N: XPathNode> {
    map: MapVariables<N>,
    fallback: Arc<dyn VariableResolver<N>>,
}

impl<N: XPathNode> VariableResolver<N> for ChainedVariables<N> {
    fn resolve_variable(&self, ns_uri: Option<&str>, local: &str) -> Option<Value<N>> {
        self.map
            .resolve_variable(ns_uri, local)
            .or_else(|| self.fallback.resolve_variable(ns_uri, local))
    }
}

struct ChainedFunctions<N: XPathNode> {
    map: MapFunctions<N>,
    fallback: Arc<dyn FunctionResolver<N>>,
}

impl<N: XPathNode> FunctionResolver<N> for ChainedFunctions<N> {
    fn resolve_function(&self, ns_uri: Option<&str>, local: &str) -> Option<FunctionImpl<N>> {
        self.map
            .resolve_function(ns_uri, local)
            .or_else(|| self.fallback.resolve_function(ns_uri, local))
    }
}
