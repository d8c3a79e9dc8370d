//! Number functions: number, sum, floor, ceiling, round.

use super::{check_arity, check_optional_arg, eval_arg};
use crate::engine::context::Context;
use crate::errors::Error;
use crate::model::XPathNode;
use crate::parser::ast::Expr;
use crate::value::{Value, parse_number, round_number};

pub(super) fn number<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_optional_arg("number", args)?;
    if args.is_empty() {
        return Ok(Value::Number(parse_number(&ctx.node.string_value())));
    }
    Ok(Value::Number(eval_arg(ctx, args, 0)?.number_value()?))
}

/// Sum of the numeric string-values of a node-set.
pub(super) fn sum<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_arity("sum", args, 1)?;
    let set = eval_arg(ctx, args, 0)?.into_node_set()?;
    let mut total = 0.0;
    for node in set.iter() {
        total += parse_number(&node.string_value());
    }
    Ok(Value::Number(total))
}

pub(super) fn floor<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_arity("floor", args, 1)?;
    Ok(Value::Number(eval_arg(ctx, args, 0)?.number_value()?.floor()))
}

pub(super) fn ceiling<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_arity("ceiling", args, 1)?;
    Ok(Value::Number(eval_arg(ctx, args, 0)?.number_value()?.ceil()))
}

pub(super) fn round<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_arity("round", args, 1)?;
    Ok(Value::Number(round_number(
        eval_arg(ctx, args, 0)?.number_value()?,
    )))
}
