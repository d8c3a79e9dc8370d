use std::collections::HashMap;
use std::sync::Arc;

use xpath1::engine::evaluator;
use xpath1::simple_node::{SimpleNode, doc, elem, elem_in, text};
use xpath1::{EvalOptions, Value, VariableResolver, XPathNode, compile, evaluate};

const SVG: &str = "http://www.w3.org/2000/svg";

fn svg_doc() -> SimpleNode {
    doc()
        .child(
            elem("root")
                .child(elem_in("svg", "item", SVG).child(text("vector")))
                .child(elem("item").child(text("plain"))),
        )
        .build()
}

#[test]
fn variables_resolve_from_map_entries() {
    let document = svg_doc();
    let ctx = EvalOptions::new(document)
        .variable("x", Value::Number(5.0))
        .variable("name", Value::String("plain".into()))
        .build();
    assert_eq!(
        compile("$x + 1").unwrap().evaluate_number(&ctx).unwrap(),
        6.0
    );
    assert_eq!(
        compile("//item[. = $name]")
            .unwrap()
            .evaluate_string(&ctx)
            .unwrap(),
        "plain"
    );
}

#[test]
fn variable_resolver_closure_backs_the_map() {
    let document = svg_doc();
    let fallback: Arc<dyn VariableResolver<SimpleNode>> = Arc::new(
        |_ns: Option<&str>, local: &str| -> Option<Value<SimpleNode>> {
            (local == "fallback").then(|| Value::Number(9.0))
        },
    );
    let ctx = EvalOptions::new(document)
        .variable("x", Value::Number(1.0))
        .variable_resolver(fallback)
        .build();
    // Map entry wins, resolver fills the rest.
    assert_eq!(compile("$x").unwrap().evaluate_number(&ctx).unwrap(), 1.0);
    assert_eq!(
        compile("$fallback").unwrap().evaluate_number(&ctx).unwrap(),
        9.0
    );
    assert!(compile("$other").unwrap().evaluate(&ctx).is_err());
}

#[test]
fn namespace_bindings_gate_prefixed_tests() {
    let document = svg_doc();
    let bound = EvalOptions::new(document.clone())
        .namespace("s", SVG)
        .build();
    assert_eq!(
        compile("string(//s:item)")
            .unwrap()
            .evaluate_string(&bound)
            .unwrap(),
        "vector"
    );
    assert_eq!(
        compile("count(//s:*)")
            .unwrap()
            .evaluate_number(&bound)
            .unwrap(),
        1.0
    );

    let unbound = EvalOptions::new(document).build();
    assert!(compile("//s:item").unwrap().evaluate(&unbound).is_err());
}

#[test]
fn namespaces_accept_whole_maps() {
    let document = svg_doc();
    let mut map = HashMap::new();
    map.insert("s".to_string(), SVG.to_string());
    let ctx = EvalOptions::new(document).namespaces(map).build();
    assert_eq!(
        compile("count(//s:item)")
            .unwrap()
            .evaluate_number(&ctx)
            .unwrap(),
        1.0
    );
}

#[test]
fn unprefixed_tests_skip_namespaced_elements_by_default() {
    let document = svg_doc();
    let strict = EvalOptions::new(document.clone()).build();
    assert_eq!(
        compile("count(//item)")
            .unwrap()
            .evaluate_number(&strict)
            .unwrap(),
        1.0
    );

    let permissive = EvalOptions::new(document)
        .any_namespace_for_no_prefix(true)
        .build();
    assert_eq!(
        compile("count(//item)")
            .unwrap()
            .evaluate_number(&permissive)
            .unwrap(),
        2.0
    );
}

#[test]
fn html_mode_matches_names_case_insensitively() {
    let document = doc()
        .child(elem("HTML").child(elem("BODY").child(elem("p").child(text("hi")))))
        .build();
    let ctx = EvalOptions::new(document.clone()).html(true).build();
    assert_eq!(
        compile("/html/body/P").unwrap().evaluate_string(&ctx).unwrap(),
        "hi"
    );
    let strict = EvalOptions::new(document).build();
    assert_eq!(
        compile("count(/html)").unwrap().evaluate_number(&strict).unwrap(),
        0.0
    );
}

#[test]
fn custom_functions_evaluate_their_own_arguments() {
    let document = svg_doc();
    let ctx = EvalOptions::new(document)
        .function("double", |ctx, args| {
            let n = evaluator::evaluate(&args[0], ctx)?.number_value()?;
            Ok(Value::Number(n * 2.0))
        })
        .build();
    assert_eq!(
        compile("double(21)").unwrap().evaluate_number(&ctx).unwrap(),
        42.0
    );
    // Built-ins stay reachable.
    assert_eq!(
        compile("double(count(//*))")
            .unwrap()
            .evaluate_number(&ctx)
            .unwrap(),
        6.0
    );
}

#[test]
fn virtual_root_bounds_absolute_paths_and_upward_axes() {
    let document = svg_doc();
    let root = document.children()[0].clone();
    let plain = root.children()[1].clone();
    let ctx = EvalOptions::new(plain.clone())
        .virtual_root(root.clone())
        .build();

    // Absolute paths start at the virtual root instead of the document.
    let expr = compile("/item");
    assert_eq!(
        expr.unwrap().select(&ctx).unwrap(),
        vec![plain.clone()]
    );
    // Upward traversal stops at the boundary.
    assert_eq!(
        compile("count(ancestor::node())")
            .unwrap()
            .evaluate_number(&ctx)
            .unwrap(),
        1.0
    );
}

#[test]
fn select_and_select1() {
    let document = svg_doc();
    let root = document.children()[0].clone();
    let svg_item = root.children()[0].clone();
    let plain = root.children()[1].clone();
    let ctx = EvalOptions::new(document.clone())
        .any_namespace_for_no_prefix(true)
        .build();

    let expr = compile("//item").unwrap();
    assert_eq!(expr.select(&ctx).unwrap(), vec![svg_item, plain.clone()]);
    assert_eq!(expr.select1(&ctx).unwrap(), Some(root.children()[0].clone()));
    assert_eq!(
        compile("//missing").unwrap().select1(&ctx).unwrap(),
        None
    );
    // Scalar results refuse node-set access.
    assert!(compile("1 + 1").unwrap().select(&ctx).is_err());
}

#[test]
fn one_shot_evaluate() {
    let document = svg_doc();
    let ctx = EvalOptions::new(document).build();
    let value = evaluate("count(//*)", &ctx).unwrap();
    assert_eq!(value.number_value().unwrap(), 3.0);
}
