//! Expression walker producing a [`Value`] from an AST and a context.

use crate::engine::axes;
use crate::engine::context::Context;
use crate::engine::functions;
use crate::errors::Error;
use crate::model::XPathNode;
use crate::nodeset::NodeSet;
use crate::parser::ast::{BinaryOp, Expr, Literal};
use crate::value::{self, Arithmetic, Comparison, Value};

/// Evaluate an expression against a context.
pub fn evaluate<N: XPathNode>(expr: &Expr, ctx: &Context<N>) -> Result<Value<N>, Error> {
    match expr {
        Expr::Literal(Literal::String(s)) => Ok(Value::String(s.clone())),
        Expr::Literal(Literal::Number(n)) => Ok(Value::Number(*n)),
        Expr::Variable { prefix, local } => ctx.resolve_variable(prefix.as_deref(), local),
        Expr::Negate(inner) => {
            let n = evaluate(inner, ctx)?.number_value()?;
            Ok(Value::Number(-n))
        }
        Expr::Binary { op, left, right } => evaluate_binary(*op, left, right, ctx),
        Expr::FunctionCall {
            prefix,
            local,
            args,
        } => evaluate_function_call(prefix.as_deref(), local, args, ctx),
        Expr::Path(path) => Ok(Value::Nodes(axes::evaluate_path(path, ctx)?)),
        Expr::Filter {
            input,
            predicates,
            steps,
        } => {
            let input_value = evaluate(input, ctx)?;
            let set = input_value.into_node_set()?;
            // Predicates over a filter count along document order.
            let mut nodes = set.ordered()?;
            for predicate in predicates {
                nodes = axes::apply_predicate(nodes, predicate, ctx)?;
            }
            for step in steps {
                nodes = axes::apply_step(&nodes, step, ctx)?;
            }
            Ok(Value::Nodes(NodeSet::from_nodes(nodes)))
        }
    }
}

fn evaluate_binary<N: XPathNode>(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    ctx: &Context<N>,
) -> Result<Value<N>, Error> {
    match op {
        // `and` and `or` short-circuit on the left operand's boolean.
        BinaryOp::Or => {
            if evaluate(left, ctx)?.boolean_value() {
                return Ok(Value::Boolean(true));
            }
            Ok(Value::Boolean(evaluate(right, ctx)?.boolean_value()))
        }
        BinaryOp::And => {
            if !evaluate(left, ctx)?.boolean_value() {
                return Ok(Value::Boolean(false));
            }
            Ok(Value::Boolean(evaluate(right, ctx)?.boolean_value()))
        }
        BinaryOp::Union => {
            let mut set = evaluate(left, ctx)?.into_node_set()?;
            let right_set = evaluate(right, ctx)?.into_node_set()?;
            set.merge(&right_set);
            Ok(Value::Nodes(set))
        }
        BinaryOp::Equals
        | BinaryOp::NotEquals
        | BinaryOp::LessThan
        | BinaryOp::GreaterThan
        | BinaryOp::LessOrEqual
        | BinaryOp::GreaterOrEqual => {
            let comparison = match op {
                BinaryOp::Equals => Comparison::Equals,
                BinaryOp::NotEquals => Comparison::NotEquals,
                BinaryOp::LessThan => Comparison::LessThan,
                BinaryOp::GreaterThan => Comparison::GreaterThan,
                BinaryOp::LessOrEqual => Comparison::LessOrEqual,
                _ => Comparison::GreaterOrEqual,
            };
            let lv = evaluate(left, ctx)?;
            let rv = evaluate(right, ctx)?;
            Ok(Value::Boolean(value::compare_values(comparison, &lv, &rv)?))
        }
        BinaryOp::Add
        | BinaryOp::Subtract
        | BinaryOp::Multiply
        | BinaryOp::Divide
        | BinaryOp::Modulo => {
            let arith = match op {
                BinaryOp::Add => Arithmetic::Add,
                BinaryOp::Subtract => Arithmetic::Subtract,
                BinaryOp::Multiply => Arithmetic::Multiply,
                BinaryOp::Divide => Arithmetic::Divide,
                _ => Arithmetic::Modulo,
            };
            let lv = evaluate(left, ctx)?;
            let rv = evaluate(right, ctx)?;
            Ok(Value::Number(value::arithmetic(arith, &lv, &rv)?))
        }
    }
}

/// Custom resolver first, then the built-in library for unprefixed names.
fn evaluate_function_call<N: XPathNode>(
    prefix: Option<&str>,
    local: &str,
    args: &[Expr],
    ctx: &Context<N>,
) -> Result<Value<N>, Error> {
    let ns_uri = match prefix {
        Some(p) => Some(ctx.resolve_prefix(p)?),
        None => None,
    };
    if let Some(resolver) = &ctx.functions
        && let Some(function) = resolver.resolve_function(ns_uri.as_deref(), local)
    {
        return function(ctx, args);
    }
    if ns_uri.is_none()
        && let Some(result) = functions::call_builtin(local, ctx, args)
    {
        return result;
    }
    Err(Error::unknown_function(match prefix {
        Some(p) => format!("{p}:{local}"),
        None => local.to_string(),
    }))
}
