//! The built-in XPath 1.0 function library, grouped by return domain.
//!
//! Every function receives the call-site context and its unevaluated
//! argument expressions, and evaluates what it needs itself. Arity is
//! checked per call.

mod boolean;
mod node_set;
mod number;
mod string;

use crate::engine::context::Context;
use crate::engine::evaluator;
use crate::errors::Error;
use crate::model::XPathNode;
use crate::parser::ast::Expr;
use crate::value::Value;

/// Dispatch a built-in by name. `None` means the name is not part of the
/// library (the caller reports the unknown-function error).
pub(crate) fn call_builtin<N: XPathNode>(
    name: &str,
    ctx: &Context<N>,
    args: &[Expr],
) -> Option<Result<Value<N>, Error>> {
    Some(match name {
        "last" => node_set::last(ctx, args),
        "position" => node_set::position(ctx, args),
        "count" => node_set::count(ctx, args),
        "id" => node_set::id(ctx, args),
        "local-name" => node_set::local_name(ctx, args),
        "namespace-uri" => node_set::namespace_uri(ctx, args),
        "name" => node_set::name(ctx, args),
        "string" => string::string(ctx, args),
        "concat" => string::concat(ctx, args),
        "starts-with" => string::starts_with(ctx, args),
        "contains" => string::contains(ctx, args),
        "substring-before" => string::substring_before(ctx, args),
        "substring-after" => string::substring_after(ctx, args),
        "substring" => string::substring(ctx, args),
        "string-length" => string::string_length(ctx, args),
        "normalize-space" => string::normalize_space(ctx, args),
        "translate" => string::translate(ctx, args),
        "boolean" => boolean::boolean(ctx, args),
        "not" => boolean::not(ctx, args),
        "true" => boolean::true_fn(ctx, args),
        "false" => boolean::false_fn(ctx, args),
        "lang" => boolean::lang(ctx, args),
        "number" => number::number(ctx, args),
        "sum" => number::sum(ctx, args),
        "floor" => number::floor(ctx, args),
        "ceiling" => number::ceiling(ctx, args),
        "round" => number::round(ctx, args),
        _ => return None,
    })
}

/// Exact-arity guard.
fn check_arity(name: &str, args: &[Expr], expected: usize) -> Result<(), Error> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::invalid_arity(
            name,
            match expected {
                0 => "no arguments",
                1 => "exactly 1 argument",
                2 => "exactly 2 arguments",
                _ => "exactly 3 arguments",
            },
            args.len(),
        ))
    }
}

/// Guard for the zero-or-one argument functions.
fn check_optional_arg(name: &str, args: &[Expr]) -> Result<(), Error> {
    if args.len() <= 1 {
        Ok(())
    } else {
        Err(Error::invalid_arity(name, "at most 1 argument", args.len()))
    }
}

fn eval_arg<N: XPathNode>(ctx: &Context<N>, args: &[Expr], index: usize) -> Result<Value<N>, Error> {
    evaluator::evaluate(&args[index], ctx)
}

/// String form of the optional argument, defaulting to the context node's
/// string-value.
fn optional_string_arg<N: XPathNode>(
    ctx: &Context<N>,
    args: &[Expr],
) -> Result<String, Error> {
    if args.is_empty() {
        Ok(ctx.node.string_value())
    } else {
        eval_arg(ctx, args, 0)?.string_value()
    }
}
