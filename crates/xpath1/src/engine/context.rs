use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::Error;
use crate::model::XPathNode;
use crate::parser::ast::Expr;
use crate::value::Value;

/// Namespace URI the `xml` prefix is implicitly bound to.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
/// Namespace URI the `xmlns` prefix is implicitly bound to.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// A resolved function callable.
///
/// Functions receive the call-site context and their *unevaluated* argument
/// expressions; ordinary functions evaluate each argument themselves, while
/// `last()` and `position()` only read the context.
pub type FunctionImpl<N> =
    Arc<dyn Fn(&Context<N>, &[Expr]) -> Result<Value<N>, Error> + Send + Sync>;

/// Resolves `$variable` references by expanded name.
pub trait VariableResolver<N: XPathNode>: Send + Sync {
    fn resolve_variable(&self, ns_uri: Option<&str>, local: &str) -> Option<Value<N>>;
}

/// Resolves namespace prefixes to URIs.
pub trait NamespaceResolver: Send + Sync {
    fn resolve_prefix(&self, prefix: &str) -> Option<String>;
}

/// Resolves function names to callables. Misses fall back to the built-in
/// library.
pub trait FunctionResolver<N: XPathNode>: Send + Sync {
    fn resolve_function(&self, ns_uri: Option<&str>, local: &str) -> Option<FunctionImpl<N>>;
}

impl<N, F> VariableResolver<N> for F
where
    N: XPathNode,
    F: Fn(Option<&str>, &str) -> Option<Value<N>> + Send + Sync,
{
    fn resolve_variable(&self, ns_uri: Option<&str>, local: &str) -> Option<Value<N>> {
        self(ns_uri, local)
    }
}

impl<F> NamespaceResolver for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn resolve_prefix(&self, prefix: &str) -> Option<String> {
        self(prefix)
    }
}

impl<N, F> FunctionResolver<N> for F
where
    N: XPathNode,
    F: Fn(Option<&str>, &str) -> Option<FunctionImpl<N>> + Send + Sync,
{
    fn resolve_function(&self, ns_uri: Option<&str>, local: &str) -> Option<FunctionImpl<N>> {
        self(ns_uri, local)
    }
}

/// Map-backed variable resolver. Keys are local names without a namespace.
pub struct MapVariables<N: XPathNode>(pub HashMap<String, Value<N>>);

impl<N: XPathNode> VariableResolver<N> for MapVariables<N> {
    fn resolve_variable(&self, ns_uri: Option<&str>, local: &str) -> Option<Value<N>> {
        if ns_uri.is_some() {
            return None;
        }
        self.0.get(local).cloned()
    }
}

/// Map-backed prefix-to-URI resolver.
pub struct MapNamespaces(pub HashMap<String, String>);

impl NamespaceResolver for MapNamespaces {
    fn resolve_prefix(&self, prefix: &str) -> Option<String> {
        self.0.get(prefix).cloned()
    }
}

/// Map-backed function resolver. Keys are local names without a namespace.
pub struct MapFunctions<N: XPathNode>(pub HashMap<String, FunctionImpl<N>>);

impl<N: XPathNode> FunctionResolver<N> for MapFunctions<N> {
    fn resolve_function(&self, ns_uri: Option<&str>, local: &str) -> Option<FunctionImpl<N>> {
        if ns_uri.is_some() {
            return None;
        }
        self.0.get(local).cloned()
    }
}

/// Evaluation context: the context node, its 1-based position and the
/// context size, plus the resolver chain and matching options.
///
/// Contexts are immutable. Predicate and argument scopes derive a fresh
/// context with [`Context::with_position`]; resolvers are shared by `Arc`,
/// so derivation is cheap.
pub struct Context<N: XPathNode> {
    pub node: N,
    pub position: usize,
    pub size: usize,
    pub variables: Option<Arc<dyn VariableResolver<N>>>,
    pub namespaces: Option<Arc<dyn NamespaceResolver>>,
    pub functions: Option<Arc<dyn FunctionResolver<N>>>,
    /// Element and attribute name tests compare case-insensitively.
    pub case_insensitive: bool,
    /// Unprefixed name tests match elements in any namespace.
    pub any_namespace_for_no_prefix: bool,
    /// Root for absolute paths and the upper bound for ancestor, following
    /// and preceding traversal. Defaults to the context node's tree root.
    pub virtual_root: Option<N>,
}

impl<N: XPathNode> Clone for Context<N> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            position: self.position,
            size: self.size,
            variables: self.variables.clone(),
            namespaces: self.namespaces.clone(),
            functions: self.functions.clone(),
            case_insensitive: self.case_insensitive,
            any_namespace_for_no_prefix: self.any_namespace_for_no_prefix,
            virtual_root: self.virtual_root.clone(),
        }
    }
}

impl<N: XPathNode> Context<N> {
    pub fn new(node: N) -> Self {
        Self {
            node,
            position: 1,
            size: 1,
            variables: None,
            namespaces: None,
            functions: None,
            case_insensitive: false,
            any_namespace_for_no_prefix: false,
            virtual_root: None,
        }
    }

    /// Derive the context for one candidate of a predicate or step scope.
    #[must_use]
    pub fn with_position(&self, node: N, position: usize, size: usize) -> Self {
        let mut derived = self.clone();
        derived.node = node;
        derived.position = position;
        derived.size = size;
        derived
    }

    /// The evaluation root: the virtual root if set, the context node's
    /// tree root otherwise.
    pub fn root(&self) -> N {
        self.virtual_root
            .clone()
            .unwrap_or_else(|| self.node.root())
    }

    /// Resolve a prefix to a namespace URI. The `xml` and `xmlns` prefixes
    /// are implicitly bound; everything else goes through the resolver.
    ///
    /// # Errors
    ///
    /// `UnresolvableQName` when the prefix has no binding.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<String, Error> {
        match prefix {
            "xml" => return Ok(XML_NAMESPACE.to_string()),
            "xmlns" => return Ok(XMLNS_NAMESPACE.to_string()),
            _ => {}
        }
        self.namespaces
            .as_ref()
            .and_then(|r| r.resolve_prefix(prefix))
            .ok_or_else(|| Error::unresolvable_qname(prefix))
    }

    /// Resolve `$prefix:local` to its bound value.
    ///
    /// # Errors
    ///
    /// `UnresolvableQName` for an unbound prefix, `UndeclaredVariable` when
    /// the resolver has no binding for the name.
    pub fn resolve_variable(
        &self,
        prefix: Option<&str>,
        local: &str,
    ) -> Result<Value<N>, Error> {
        let ns_uri = match prefix {
            Some(p) => Some(self.resolve_prefix(p)?),
            None => None,
        };
        self.variables
            .as_ref()
            .and_then(|r| r.resolve_variable(ns_uri.as_deref(), local))
            .ok_or_else(|| match prefix {
                Some(p) => Error::undeclared_variable(format!("{p}:{local}")),
                None => Error::undeclared_variable(local),
            })
    }
}
