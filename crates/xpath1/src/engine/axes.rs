//! Axis evaluation: candidate production for the thirteen axes, node-test
//! filtering and per-candidate predicate application.

use smallvec::SmallVec;

use crate::engine::context::Context;
use crate::engine::evaluator;
use crate::errors::Error;
use crate::model::{NodeKind, XPathNode};
use crate::nodeset::NodeSet;
use crate::parser::ast::{Axis, Expr, LocationPath, NodeTest, Step};
use crate::value::Value;

type Candidates<N> = SmallVec<[N; 8]>;

/// Evaluate a location path from the context node (or the evaluation root
/// for absolute paths). Step results are concatenated per input node in
/// axis order; duplicates only collapse in the final node-set.
pub fn evaluate_path<N: XPathNode>(
    path: &LocationPath,
    ctx: &Context<N>,
) -> Result<NodeSet<N>, Error> {
    let mut current: Vec<N> = if path.absolute {
        vec![ctx.root()]
    } else {
        vec![ctx.node.clone()]
    };
    for step in &path.steps {
        current = apply_step(&current, step, ctx)?;
    }
    Ok(NodeSet::from_nodes(current))
}

/// Apply one step to a list of input nodes.
pub fn apply_step<N: XPathNode>(
    input: &[N],
    step: &Step,
    ctx: &Context<N>,
) -> Result<Vec<N>, Error> {
    let mut output = Vec::new();
    for node in input {
        let candidates = axis_candidates(node, step.axis, ctx);
        let mut kept: Vec<N> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if matches_node_test(&candidate, step.axis, &step.test, ctx)? {
                kept.push(candidate);
            }
        }
        for predicate in &step.predicates {
            kept = apply_predicate(kept, predicate, ctx)?;
        }
        output.extend(kept);
    }
    Ok(output)
}

/// Filter nodes through one predicate. Every candidate gets a fresh context
/// whose size is the candidate count and whose position is the candidate's
/// 1-based index in axis order. A numeric predicate value is the positional
/// shortcut; anything else is taken as its effective boolean.
pub fn apply_predicate<N: XPathNode>(
    nodes: Vec<N>,
    predicate: &Expr,
    ctx: &Context<N>,
) -> Result<Vec<N>, Error> {
    let size = nodes.len();
    let mut kept = Vec::new();
    for (index, node) in nodes.into_iter().enumerate() {
        let position = index + 1;
        let scope = ctx.with_position(node.clone(), position, size);
        let value = evaluator::evaluate(predicate, &scope)?;
        #[allow(clippy::cast_precision_loss)]
        let keep = match value {
            Value::Number(n) => n == position as f64,
            other => other.boolean_value(),
        };
        if keep {
            kept.push(node);
        }
    }
    Ok(kept)
}

/// Produce the raw candidate list for an axis, in axis order (reverse axes
/// nearest-first). Ancestor, following and preceding traversal never leaves
/// the subtree under the evaluation root.
fn axis_candidates<N: XPathNode>(node: &N, axis: Axis, ctx: &Context<N>) -> Candidates<N> {
    let mut out = Candidates::new();
    match axis {
        Axis::SelfAxis => out.push(node.clone()),
        Axis::Child => out.extend(node.children()),
        Axis::Attribute => out.extend(node.attributes()),
        Axis::Namespace => collect_namespace_nodes(node, &mut out),
        Axis::Parent => {
            if let Some(parent) = bounded_parent(node, ctx) {
                out.push(parent);
            }
        }
        Axis::Ancestor => collect_ancestors(node, ctx, &mut out),
        Axis::AncestorOrSelf => {
            out.push(node.clone());
            collect_ancestors(node, ctx, &mut out);
        }
        Axis::Descendant => {
            for child in node.children() {
                push_subtree(&child, &mut out);
            }
        }
        Axis::DescendantOrSelf => push_subtree(node, &mut out),
        Axis::FollowingSibling => {
            let (_, after) = split_siblings(node);
            out.extend(after);
        }
        Axis::PrecedingSibling => {
            let (before, _) = split_siblings(node);
            // Reverse axis: nearest sibling first.
            out.extend(before.into_iter().rev());
        }
        Axis::Following => {
            let mut current = node.clone();
            loop {
                let (_, after) = split_siblings(&current);
                for sibling in after {
                    push_subtree(&sibling, &mut out);
                }
                match bounded_parent(&current, ctx) {
                    Some(parent) => current = parent,
                    None => break,
                }
            }
        }
        Axis::Preceding => {
            let mut current = node.clone();
            loop {
                let (before, _) = split_siblings(&current);
                for sibling in before.into_iter().rev() {
                    push_subtree_reverse(&sibling, &mut out);
                }
                match bounded_parent(&current, ctx) {
                    Some(parent) => current = parent,
                    None => break,
                }
            }
        }
    }
    out
}

/// Parent link, cut at the evaluation root.
fn bounded_parent<N: XPathNode>(node: &N, ctx: &Context<N>) -> Option<N> {
    if let Some(root) = &ctx.virtual_root
        && node == root
    {
        return None;
    }
    node.parent()
}

fn collect_ancestors<N: XPathNode>(node: &N, ctx: &Context<N>, out: &mut Candidates<N>) {
    let mut current = node.clone();
    while let Some(parent) = bounded_parent(&current, ctx) {
        out.push(parent.clone());
        current = parent;
    }
}

/// Preorder walk: the node itself, then its children's subtrees.
fn push_subtree<N: XPathNode>(node: &N, out: &mut Candidates<N>) {
    out.push(node.clone());
    for child in node.children() {
        push_subtree(&child, out);
    }
}

/// Reverse document order walk for the preceding axis: children's subtrees
/// last-first, then the node itself.
fn push_subtree_reverse<N: XPathNode>(node: &N, out: &mut Candidates<N>) {
    for child in node.children().into_iter().rev() {
        push_subtree_reverse(&child, out);
    }
    out.push(node.clone());
}

/// Siblings before and after the node, in document order. Attribute and
/// namespace nodes have no siblings.
fn split_siblings<N: XPathNode>(node: &N) -> (Vec<N>, Vec<N>) {
    if matches!(node.kind(), NodeKind::Attribute | NodeKind::Namespace) {
        return (Vec::new(), Vec::new());
    }
    let Some(parent) = node.parent() else {
        return (Vec::new(), Vec::new());
    };
    let siblings = parent.children();
    let Some(index) = siblings.iter().position(|s| s == node) else {
        return (Vec::new(), Vec::new());
    };
    let mut before = siblings;
    let after = before.split_off(index + 1);
    before.pop();
    (before, after)
}

/// In-scope namespace nodes: declarations on the node and its ancestors,
/// nearest declaration winning per prefix.
fn collect_namespace_nodes<N: XPathNode>(node: &N, out: &mut Candidates<N>) {
    let mut seen: Vec<String> = Vec::new();
    let mut current = Some(node.clone());
    while let Some(n) = current {
        for decl in n.namespace_declarations() {
            let prefix = decl.name().map(|q| q.local).unwrap_or_default();
            if !seen.contains(&prefix) {
                seen.push(prefix);
                out.push(decl);
            }
        }
        current = n.parent();
    }
}

/// The kind of node a name test selects on this axis.
fn principal_kind(axis: Axis) -> NodeKind {
    match axis {
        Axis::Attribute => NodeKind::Attribute,
        Axis::Namespace => NodeKind::Namespace,
        _ => NodeKind::Element,
    }
}

fn matches_node_test<N: XPathNode>(
    node: &N,
    axis: Axis,
    test: &NodeTest,
    ctx: &Context<N>,
) -> Result<bool, Error> {
    let kind = node.kind();
    match test {
        NodeTest::AnyNode => Ok(true),
        NodeTest::Text => Ok(kind == NodeKind::Text),
        NodeTest::Comment => Ok(kind == NodeKind::Comment),
        NodeTest::AnyProcessingInstruction => Ok(kind == NodeKind::ProcessingInstruction),
        NodeTest::ProcessingInstruction(target) => Ok(kind == NodeKind::ProcessingInstruction
            && node.name().is_some_and(|q| q.local == *target)),
        NodeTest::AnyName => Ok(kind == principal_kind(axis)),
        NodeTest::PrefixWildcard(prefix) => {
            if kind != principal_kind(axis) {
                return Ok(false);
            }
            let uri = ctx.resolve_prefix(prefix)?;
            Ok(node.name().is_some_and(|q| q.ns_uri.as_deref() == Some(&*uri)))
        }
        NodeTest::Name { prefix, local } => {
            if kind != principal_kind(axis) {
                return Ok(false);
            }
            let Some(name) = node.name() else {
                return Ok(false);
            };
            let local_matches = if ctx.case_insensitive {
                name.local.eq_ignore_ascii_case(local)
            } else {
                name.local == *local
            };
            if !local_matches {
                return Ok(false);
            }
            match prefix {
                Some(p) => {
                    let uri = ctx.resolve_prefix(p)?;
                    Ok(name.ns_uri.as_deref() == Some(&*uri))
                }
                // An unprefixed test matches the null namespace, or any
                // namespace in permissive/HTML mode.
                None => Ok(ctx.any_namespace_for_no_prefix
                    || ctx.case_insensitive
                    || name.ns_uri.is_none()),
            }
        }
    }
}
