//! Node-set functions: last, position, count, id, local-name,
//! namespace-uri, name.

use super::{check_arity, check_optional_arg, eval_arg};
use crate::engine::context::Context;
use crate::errors::Error;
use crate::model::{NodeKind, XPathNode};
use crate::nodeset::NodeSet;
use crate::parser::ast::Expr;
use crate::value::Value;

#[allow(clippy::cast_precision_loss)]
pub(super) fn last<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_arity("last", args, 0)?;
    Ok(Value::Number(ctx.size as f64))
}

#[allow(clippy::cast_precision_loss)]
pub(super) fn position<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_arity("position", args, 0)?;
    Ok(Value::Number(ctx.position as f64))
}

#[allow(clippy::cast_precision_loss)]
pub(super) fn count<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_arity("count", args, 1)?;
    let set = eval_arg(ctx, args, 0)?.into_node_set()?;
    Ok(Value::Number(set.len() as f64))
}

/// `id(object)`: whitespace-split the string form (or each node's
/// string-value for a node-set argument) into tokens and look every token
/// up in the document. Adapters with native id maps answer through
/// `element_by_id`; otherwise the subtree under the evaluation root is
/// scanned for `id` attributes.
pub(super) fn id<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_arity("id", args, 1)?;
    let mut tokens: Vec<String> = Vec::new();
    match eval_arg(ctx, args, 0)? {
        Value::Nodes(set) => {
            for node in set.iter() {
                collect_id_tokens(&node.string_value(), &mut tokens);
            }
        }
        other => collect_id_tokens(&other.string_value()?, &mut tokens),
    }
    let root = ctx.root();
    let mut result = NodeSet::new();
    for token in &tokens {
        if let Some(found) = root.element_by_id(token) {
            result.insert(found);
        } else if let Some(found) = find_by_id_attribute(&root, token) {
            result.insert(found);
        }
    }
    Ok(Value::Nodes(result))
}

fn collect_id_tokens(s: &str, out: &mut Vec<String>) {
    for token in s.split([' ', '\t', '\r', '\n']) {
        if !token.is_empty() {
            out.push(token.to_string());
        }
    }
}

fn find_by_id_attribute<N: XPathNode>(node: &N, id: &str) -> Option<N> {
    if node.kind() == NodeKind::Element
        && node.attributes().iter().any(|a| {
            a.name().is_some_and(|q| q.local == "id" && q.ns_uri.is_none())
                && a.string_value() == id
        })
    {
        return Some(node.clone());
    }
    for child in node.children() {
        if let Some(found) = find_by_id_attribute(&child, id) {
            return Some(found);
        }
    }
    None
}

/// The node whose name the `name` family reports: the context node without
/// an argument, the first node in document order otherwise.
fn name_target<N: XPathNode>(
    ctx: &Context<N>,
    args: &[Expr],
    function: &str,
) -> Result<Option<N>, Error> {
    check_optional_arg(function, args)?;
    if args.is_empty() {
        Ok(Some(ctx.node.clone()))
    } else {
        eval_arg(ctx, args, 0)?.into_node_set()?.first()
    }
}

pub(super) fn local_name<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    let target = name_target(ctx, args, "local-name")?;
    Ok(Value::String(
        target
            .and_then(|n| n.name())
            .map(|q| q.local)
            .unwrap_or_default(),
    ))
}

pub(super) fn namespace_uri<N: XPathNode>(
    ctx: &Context<N>,
    args: &[Expr],
) -> Result<Value<N>, Error> {
    let target = name_target(ctx, args, "namespace-uri")?;
    Ok(Value::String(
        target
            .and_then(|n| n.name())
            .and_then(|q| q.ns_uri)
            .unwrap_or_default(),
    ))
}

pub(super) fn name<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    let target = name_target(ctx, args, "name")?;
    Ok(Value::String(
        target
            .and_then(|n| n.name())
            .map(|q| q.lexical())
            .unwrap_or_default(),
    ))
}
