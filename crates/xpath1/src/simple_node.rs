//! Simple in-memory tree implementing [`XPathNode`], for tests and quick
//! prototypes.
//!
//! - Ergonomic builder for fixture trees (`doc`, `elem`, `attr`, `text`,
//!   `comment`, `pi`, `ns` helpers)
//! - Stable document order via the ancestry fallback comparator
//! - Thread-safe handles (Arc + RwLock)
//!
//! ```
//! use xpath1::simple_node::{attr, elem, text};
//! use xpath1::XPathNode;
//!
//! // <root id="r"><child>Hello</child></root>
//! let root = elem("root")
//!     .attr(attr("id", "r"))
//!     .child(elem("child").child(text("Hello")))
//!     .build();
//!
//! assert_eq!(root.name().unwrap().local, "root");
//! assert_eq!(root.string_value(), "Hello");
//! ```

use std::fmt;
use std::sync::{Arc, RwLock, Weak};

use crate::model::{NodeKind, QName, XPathNode};

#[derive(Debug)]
struct Inner {
    kind: NodeKind,
    name: Option<QName>,
    // Text / attribute / comment / PI content.
    value: RwLock<Option<String>>,
    parent: RwLock<Option<Weak<Inner>>>,
    attributes: RwLock<Vec<SimpleNode>>,
    namespaces: RwLock<Vec<SimpleNode>>,
    children: RwLock<Vec<SimpleNode>>,
    // Memoized string value for element/document nodes.
    cached_text: RwLock<Option<String>>,
}

/// An Arc-backed node handle; equality is node identity.
#[derive(Clone)]
pub struct SimpleNode(Arc<Inner>);

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for SimpleNode {}

impl std::hash::Hash for SimpleNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleNode")
            .field("kind", &self.0.kind)
            .field("name", &self.0.name)
            .field("value", &self.0.value)
            .finish()
    }
}

impl SimpleNode {
    fn new(kind: NodeKind, name: Option<QName>, value: Option<String>) -> Self {
        Self(Arc::new(Inner {
            kind,
            name,
            value: RwLock::new(value),
            parent: RwLock::new(None),
            attributes: RwLock::new(Vec::new()),
            namespaces: RwLock::new(Vec::new()),
            children: RwLock::new(Vec::new()),
            cached_text: RwLock::new(None),
        }))
    }

    pub fn document() -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Document, None, None)
    }

    pub fn element(name: &str) -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Element, Some(QName::local(name)), None)
    }

    pub fn element_in(prefix: &str, local: &str, ns_uri: &str) -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(
            NodeKind::Element,
            Some(QName::prefixed(prefix, local, ns_uri)),
            None,
        )
    }

    pub fn attribute(name: &str, value: &str) -> Self {
        Self::new(
            NodeKind::Attribute,
            Some(QName::local(name)),
            Some(value.to_string()),
        )
    }

    pub fn attribute_in(prefix: &str, local: &str, ns_uri: &str, value: &str) -> Self {
        Self::new(
            NodeKind::Attribute,
            Some(QName::prefixed(prefix, local, ns_uri)),
            Some(value.to_string()),
        )
    }

    pub fn text_node(value: &str) -> Self {
        Self::new(NodeKind::Text, None, Some(value.to_string()))
    }

    pub fn comment_node(value: &str) -> Self {
        Self::new(NodeKind::Comment, None, Some(value.to_string()))
    }

    pub fn processing_instruction(target: &str, data: &str) -> Self {
        Self::new(
            NodeKind::ProcessingInstruction,
            Some(QName::local(target)),
            Some(data.to_string()),
        )
    }

    /// A namespace node; its name's local part is the declared prefix, its
    /// string-value the URI.
    pub fn namespace_node(prefix: &str, uri: &str) -> Self {
        Self::new(
            NodeKind::Namespace,
            Some(QName::local(prefix)),
            Some(uri.to_string()),
        )
    }

    /// Merge adjacent text children into one node, recursively, the
    /// maintenance step after tree edits. Never runs implicitly; callers
    /// decide when the tree is stable enough to normalize.
    pub fn coalesce_text(&self) {
        {
            let mut children = self.0.children.write().unwrap();
            let mut merged: Vec<SimpleNode> = Vec::with_capacity(children.len());
            for child in children.drain(..) {
                if child.kind() == NodeKind::Text
                    && merged.last().is_some_and(|prev| prev.kind() == NodeKind::Text)
                {
                    let prev = merged.last().unwrap();
                    let mut prev_value = prev.0.value.write().unwrap();
                    let addition = child.0.value.read().unwrap().clone().unwrap_or_default();
                    match prev_value.as_mut() {
                        Some(existing) => existing.push_str(&addition),
                        None => *prev_value = Some(addition),
                    }
                } else {
                    merged.push(child);
                }
            }
            *children = merged;
        }
        *self.0.cached_text.write().unwrap() = None;
        for child in self.children() {
            if matches!(child.kind(), NodeKind::Element | NodeKind::Document) {
                child.coalesce_text();
            }
        }
    }
}

/// Builder finalizing parent links on `build()`.
pub struct SimpleNodeBuilder {
    node: SimpleNode,
    pending_children: Vec<SimpleNode>,
    pending_attributes: Vec<SimpleNode>,
    pending_namespaces: Vec<SimpleNode>,
}

impl SimpleNodeBuilder {
    fn new(kind: NodeKind, name: Option<QName>, value: Option<String>) -> Self {
        Self {
            node: SimpleNode::new(kind, name, value),
            pending_children: Vec::new(),
            pending_attributes: Vec::new(),
            pending_namespaces: Vec::new(),
        }
    }

    #[must_use]
    pub fn child(mut self, child: impl Into<SimpleNodeOrBuilder>) -> Self {
        self.pending_children.push(child.into().into_node());
        self
    }

    #[must_use]
    pub fn attr(mut self, attribute: SimpleNode) -> Self {
        debug_assert!(attribute.kind() == NodeKind::Attribute);
        self.pending_attributes.push(attribute);
        self
    }

    #[must_use]
    pub fn namespace(mut self, declaration: SimpleNode) -> Self {
        debug_assert!(declaration.kind() == NodeKind::Namespace);
        self.pending_namespaces.push(declaration);
        self
    }

    pub fn build(self) -> SimpleNode {
        let parent = Arc::downgrade(&self.node.0);
        {
            let mut attributes = self.node.0.attributes.write().unwrap();
            for a in &self.pending_attributes {
                *a.0.parent.write().unwrap() = Some(parent.clone());
            }
            attributes.extend(self.pending_attributes);
        }
        {
            let mut namespaces = self.node.0.namespaces.write().unwrap();
            for n in &self.pending_namespaces {
                *n.0.parent.write().unwrap() = Some(parent.clone());
            }
            namespaces.extend(self.pending_namespaces);
        }
        {
            let mut children = self.node.0.children.write().unwrap();
            for c in &self.pending_children {
                *c.0.parent.write().unwrap() = Some(parent.clone());
            }
            children.extend(self.pending_children);
        }
        self.node
    }
}

pub enum SimpleNodeOrBuilder {
    Built(SimpleNode),
    Builder(SimpleNodeBuilder),
}

impl SimpleNodeOrBuilder {
    fn into_node(self) -> SimpleNode {
        match self {
            Self::Built(node) => node,
            Self::Builder(builder) => builder.build(),
        }
    }
}

impl From<SimpleNode> for SimpleNodeOrBuilder {
    fn from(node: SimpleNode) -> Self {
        Self::Built(node)
    }
}

impl From<SimpleNodeBuilder> for SimpleNodeOrBuilder {
    fn from(builder: SimpleNodeBuilder) -> Self {
        Self::Builder(builder)
    }
}

// Helpers for concise fixture code.

pub fn doc() -> SimpleNodeBuilder {
    SimpleNode::document()
}

pub fn elem(name: &str) -> SimpleNodeBuilder {
    SimpleNode::element(name)
}

pub fn elem_in(prefix: &str, local: &str, ns_uri: &str) -> SimpleNodeBuilder {
    SimpleNode::element_in(prefix, local, ns_uri)
}

pub fn attr(name: &str, value: &str) -> SimpleNode {
    SimpleNode::attribute(name, value)
}

pub fn text(value: &str) -> SimpleNode {
    SimpleNode::text_node(value)
}

pub fn comment(value: &str) -> SimpleNode {
    SimpleNode::comment_node(value)
}

pub fn pi(target: &str, data: &str) -> SimpleNode {
    SimpleNode::processing_instruction(target, data)
}

pub fn ns(prefix: &str, uri: &str) -> SimpleNode {
    SimpleNode::namespace_node(prefix, uri)
}

impl XPathNode for SimpleNode {
    fn kind(&self) -> NodeKind {
        self.0.kind
    }

    fn name(&self) -> Option<QName> {
        self.0.name.clone()
    }

    fn string_value(&self) -> String {
        match self.kind() {
            NodeKind::Text
            | NodeKind::Attribute
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction
            | NodeKind::Namespace => self.0.value.read().unwrap().clone().unwrap_or_default(),
            NodeKind::Element | NodeKind::Document => {
                if let Some(cached) = self.0.cached_text.read().unwrap().clone() {
                    return cached;
                }
                fn dfs(node: &SimpleNode, out: &mut String) {
                    if node.kind() == NodeKind::Text {
                        if let Some(v) = &*node.0.value.read().unwrap() {
                            out.push_str(v);
                        }
                    }
                    for child in node.children() {
                        dfs(&child, out);
                    }
                }
                let mut out = String::new();
                dfs(self, &mut out);
                *self.0.cached_text.write().unwrap() = Some(out.clone());
                out
            }
        }
    }

    fn parent(&self) -> Option<Self> {
        self.0
            .parent
            .read()
            .ok()?
            .as_ref()
            .and_then(Weak::upgrade)
            .map(SimpleNode)
    }

    fn children(&self) -> Vec<Self> {
        self.0.children.read().unwrap().clone()
    }

    fn attributes(&self) -> Vec<Self> {
        self.0.attributes.read().unwrap().clone()
    }

    fn namespace_declarations(&self) -> Vec<Self> {
        self.0.namespaces.read().unwrap().clone()
    }

    fn element_by_id(&self, id: &str) -> Option<Self> {
        fn walk(node: &SimpleNode, id: &str) -> Option<SimpleNode> {
            if node.kind() == NodeKind::Element
                && node.attributes().iter().any(|a| {
                    a.name().is_some_and(|q| q.local == "id") && a.string_value() == id
                })
            {
                return Some(node.clone());
            }
            for child in node.children() {
                if let Some(found) = walk(&child, id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.root(), id)
    }
}
