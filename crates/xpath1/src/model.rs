use core::cmp::Ordering;

use crate::errors::Error;

/// The seven node kinds an XPath 1.0 data model distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
    Namespace,
}

/// Expanded name of an element, attribute, processing instruction or
/// namespace node. `prefix` is the lexical prefix as written in the source
/// document (kept for the `name()` function); matching is done on
/// `local` + `ns_uri`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub ns_uri: Option<String>,
}

impl QName {
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
            ns_uri: None,
        }
    }

    pub fn prefixed(
        prefix: impl Into<String>,
        local: impl Into<String>,
        ns_uri: impl Into<String>,
    ) -> Self {
        Self {
            prefix: Some(prefix.into()),
            local: local.into(),
            ns_uri: Some(ns_uri.into()),
        }
    }

    /// `prefix:local` when a prefix is present, plain local name otherwise.
    pub fn lexical(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{p}:{}", self.local),
            None => self.local.clone(),
        }
    }
}

/// Host-tree adapter trait. The engine never owns or mutates the tree; it
/// navigates whatever the adapter exposes through these methods.
///
/// Handles must be cheap to clone and identity-comparable: two handles are
/// `==` exactly when they designate the same node.
///
/// The optional capabilities come with default implementations:
/// - `namespace_declarations` defaults to no declarations (the namespace
///   axis is then empty),
/// - `element_by_id` defaults to `None`, which makes the `id()` function
///   fall back to a subtree walk over `id` attributes,
/// - `compare_document_order` defaults to the ancestry-based fallback, which
///   only orders nodes under a common root. Adapters with multi-root models
///   or native position information should override it with a total order.
pub trait XPathNode: Clone + Eq + core::fmt::Debug + Send + Sync {
    fn kind(&self) -> NodeKind;

    /// Expanded name; `None` for document, text and comment nodes.
    fn name(&self) -> Option<QName>;

    /// XPath string-value: text content for text nodes, attribute value for
    /// attributes, concatenated descendant text for elements and documents.
    fn string_value(&self) -> String;

    fn parent(&self) -> Option<Self>;
    fn children(&self) -> Vec<Self>;
    fn attributes(&self) -> Vec<Self>;

    /// Namespace nodes declared directly on this node. In-scope bindings
    /// are computed by the engine via an ancestor walk.
    fn namespace_declarations(&self) -> Vec<Self> {
        Vec::new()
    }

    /// Native by-id lookup from the document this node belongs to.
    fn element_by_id(&self, _id: &str) -> Option<Self> {
        None
    }

    /// Compare two nodes in document order.
    fn compare_document_order(&self, other: &Self) -> Result<Ordering, Error> {
        compare_by_ancestry(self, other)
    }

    /// Topmost ancestor (the document node for a rooted tree).
    fn root(&self) -> Self {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }
}

/// Fallback comparator for document order based on ancestry and stable
/// sibling ordering.
///
/// - If one node is an ancestor of the other, the ancestor precedes the
///   descendant.
/// - Among siblings, attributes come first, then namespace declarations,
///   then child nodes; within each group the order provided by the adapter
///   is preserved.
/// - Nodes from different roots cannot be ordered and report an evaluation
///   error; adapters with multi-root trees must override
///   `XPathNode::compare_document_order`.
pub fn compare_by_ancestry<N: XPathNode>(a: &N, b: &N) -> Result<Ordering, Error> {
    if a == b {
        return Ok(Ordering::Equal);
    }
    fn path_to_root<N: XPathNode>(mut n: N) -> Vec<N> {
        let mut path = vec![n.clone()];
        while let Some(parent) = n.parent() {
            path.push(parent.clone());
            n = parent;
        }
        path.reverse();
        path
    }
    let pa = path_to_root(a.clone());
    let pb = path_to_root(b.clone());
    let len = core::cmp::min(pa.len(), pb.len());
    let mut i = 0usize;
    while i < len && pa[i] == pb[i] {
        i += 1;
    }
    if i == len {
        // One path is a prefix of the other: the shorter one is the ancestor.
        return Ok(if pa.len() < pb.len() {
            Ordering::Less
        } else {
            Ordering::Greater
        });
    }
    if i == 0 {
        return Err(Error::evaluation(
            "document order requires adapter: nodes from different roots",
        ));
    }
    // Diverged under a common parent: order by sibling position.
    let parent = &pa[i - 1];
    let mut siblings: Vec<N> = Vec::new();
    siblings.extend(parent.attributes());
    siblings.extend(parent.namespace_declarations());
    siblings.extend(parent.children());
    let pos_a = siblings.iter().position(|n| n == &pa[i]);
    let pos_b = siblings.iter().position(|n| n == &pb[i]);
    match (pos_a, pos_b) {
        (Some(ia), Some(ib)) => Ok(ia.cmp(&ib)),
        _ => Err(Error::evaluation(
            "document order requires adapter: node not reachable from its parent",
        )),
    }
}
