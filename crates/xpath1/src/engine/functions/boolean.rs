//! Boolean functions: boolean, not, true, false, lang.

use super::{check_arity, eval_arg};
use crate::engine::context::{Context, XML_NAMESPACE};
use crate::errors::Error;
use crate::model::XPathNode;
use crate::parser::ast::Expr;
use crate::value::Value;

pub(super) fn boolean<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_arity("boolean", args, 1)?;
    Ok(Value::Boolean(eval_arg(ctx, args, 0)?.boolean_value()))
}

pub(super) fn not<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_arity("not", args, 1)?;
    Ok(Value::Boolean(!eval_arg(ctx, args, 0)?.boolean_value()))
}

pub(super) fn true_fn<N: XPathNode>(_ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_arity("true", args, 0)?;
    Ok(Value::Boolean(true))
}

pub(super) fn false_fn<N: XPathNode>(_ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_arity("false", args, 0)?;
    Ok(Value::Boolean(false))
}

/// `lang(s)`: the nearest `xml:lang` on the context node or an ancestor
/// matches when it equals the argument case-insensitively, or is the
/// argument followed by a hyphenated subtag (`lang('en')` matches
/// `xml:lang="en-US"`).
pub(super) fn lang<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_arity("lang", args, 1)?;
    let target = eval_arg(ctx, args, 0)?.string_value()?;
    let mut current = Some(ctx.node.clone());
    while let Some(node) = current {
        for attribute in node.attributes() {
            let Some(name) = attribute.name() else {
                continue;
            };
            let is_xml_lang = name.local == "lang"
                && (name.ns_uri.as_deref() == Some(XML_NAMESPACE)
                    || name.prefix.as_deref() == Some("xml"));
            if is_xml_lang {
                return Ok(Value::Boolean(lang_matches(&attribute.string_value(), &target)));
            }
        }
        current = node.parent();
    }
    Ok(Value::Boolean(false))
}

fn lang_matches(declared: &str, target: &str) -> bool {
    if declared.eq_ignore_ascii_case(target) {
        return true;
    }
    declared.len() > target.len()
        && declared.is_char_boundary(target.len())
        && declared.as_bytes()[target.len()] == b'-'
        && declared[..target.len()].eq_ignore_ascii_case(target)
}
