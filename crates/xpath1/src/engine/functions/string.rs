//! String functions: string, concat, starts-with, contains,
//! substring-before, substring-after, substring, string-length,
//! normalize-space, translate.

use super::{check_arity, check_optional_arg, eval_arg, optional_string_arg};
use crate::engine::context::Context;
use crate::errors::Error;
use crate::model::XPathNode;
use crate::parser::ast::Expr;
use crate::value::{Value, round_number};

pub(super) fn string<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_optional_arg("string", args)?;
    Ok(Value::String(optional_string_arg(ctx, args)?))
}

pub(super) fn concat<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    if args.len() < 2 {
        return Err(Error::invalid_arity(
            "concat",
            "at least 2 arguments",
            args.len(),
        ));
    }
    let mut out = String::new();
    for index in 0..args.len() {
        out.push_str(&eval_arg(ctx, args, index)?.string_value()?);
    }
    Ok(Value::String(out))
}

pub(super) fn starts_with<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_arity("starts-with", args, 2)?;
    let haystack = eval_arg(ctx, args, 0)?.string_value()?;
    let prefix = eval_arg(ctx, args, 1)?.string_value()?;
    Ok(Value::Boolean(haystack.starts_with(&prefix)))
}

pub(super) fn contains<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_arity("contains", args, 2)?;
    let haystack = eval_arg(ctx, args, 0)?.string_value()?;
    let needle = eval_arg(ctx, args, 1)?.string_value()?;
    Ok(Value::Boolean(haystack.contains(&needle)))
}

pub(super) fn substring_before<N: XPathNode>(
    ctx: &Context<N>,
    args: &[Expr],
) -> Result<Value<N>, Error> {
    check_arity("substring-before", args, 2)?;
    let haystack = eval_arg(ctx, args, 0)?.string_value()?;
    let needle = eval_arg(ctx, args, 1)?.string_value()?;
    Ok(Value::String(
        haystack
            .split_once(&needle)
            .map(|(before, _)| before.to_string())
            .unwrap_or_default(),
    ))
}

pub(super) fn substring_after<N: XPathNode>(
    ctx: &Context<N>,
    args: &[Expr],
) -> Result<Value<N>, Error> {
    check_arity("substring-after", args, 2)?;
    let haystack = eval_arg(ctx, args, 0)?.string_value()?;
    let needle = eval_arg(ctx, args, 1)?.string_value()?;
    Ok(Value::String(
        haystack
            .split_once(&needle)
            .map(|(_, after)| after.to_string())
            .unwrap_or_default(),
    ))
}

/// `substring(s, start[, length])` with 1-based character positions. Start
/// and length round to the nearest integer (ties away from zero); a NaN in
/// either yields the empty string. Characters are kept when their position
/// is at least the rounded start and, with a length, below start + length.
#[allow(clippy::cast_precision_loss)]
pub(super) fn substring<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    if args.len() != 2 && args.len() != 3 {
        return Err(Error::invalid_arity(
            "substring",
            "2 or 3 arguments",
            args.len(),
        ));
    }
    let source = eval_arg(ctx, args, 0)?.string_value()?;
    let start = round_number(eval_arg(ctx, args, 1)?.number_value()?);
    if start.is_nan() {
        return Ok(Value::String(String::new()));
    }
    let end = if args.len() == 3 {
        let length = round_number(eval_arg(ctx, args, 2)?.number_value()?);
        if length.is_nan() {
            return Ok(Value::String(String::new()));
        }
        start + length
    } else {
        f64::INFINITY
    };
    let out: String = source
        .chars()
        .enumerate()
        .filter(|(index, _)| {
            let position = (index + 1) as f64;
            position >= start && position < end
        })
        .map(|(_, c)| c)
        .collect();
    Ok(Value::String(out))
}

#[allow(clippy::cast_precision_loss)]
pub(super) fn string_length<N: XPathNode>(
    ctx: &Context<N>,
    args: &[Expr],
) -> Result<Value<N>, Error> {
    check_optional_arg("string-length", args)?;
    let s = optional_string_arg(ctx, args)?;
    Ok(Value::Number(s.chars().count() as f64))
}

/// Strip leading/trailing XML whitespace and collapse internal runs to a
/// single space.
pub(super) fn normalize_space<N: XPathNode>(
    ctx: &Context<N>,
    args: &[Expr],
) -> Result<Value<N>, Error> {
    check_optional_arg("normalize-space", args)?;
    let s = optional_string_arg(ctx, args)?;
    let normalized = s
        .split([' ', '\t', '\r', '\n'])
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(Value::String(normalized))
}

/// `translate(s, from, to)`: replace each character of `s` listed in `from`
/// with the character at the same index in `to`; characters of `from`
/// beyond the length of `to` are deleted. The first occurrence in `from`
/// wins for repeated characters.
pub(super) fn translate<N: XPathNode>(ctx: &Context<N>, args: &[Expr]) -> Result<Value<N>, Error> {
    check_arity("translate", args, 3)?;
    let source = eval_arg(ctx, args, 0)?.string_value()?;
    let from: Vec<char> = eval_arg(ctx, args, 1)?.string_value()?.chars().collect();
    let to: Vec<char> = eval_arg(ctx, args, 2)?.string_value()?.chars().collect();
    let mut out = String::with_capacity(source.len());
    for c in source.chars() {
        match from.iter().position(|&f| f == c) {
            Some(index) => {
                if let Some(&replacement) = to.get(index) {
                    out.push(replacement);
                }
            }
            None => out.push(c),
        }
    }
    Ok(Value::String(out))
}
