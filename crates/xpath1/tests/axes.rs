use xpath1::simple_node::{SimpleNode, attr, doc, elem, ns, text};
use xpath1::{EvalOptions, XPathNode, compile};

struct Tree {
    document: SimpleNode,
    a: SimpleNode,
    b: SimpleNode,
    c: SimpleNode,
    d: SimpleNode,
}

// <a><b/><c><d/></c></a>
fn tree() -> Tree {
    let document = doc()
        .child(
            elem("a")
                .attr(attr("id", "root"))
                .child(elem("b"))
                .child(elem("c").child(elem("d"))),
        )
        .build();
    let a = document.children()[0].clone();
    let b = a.children()[0].clone();
    let c = a.children()[1].clone();
    let d = c.children()[0].clone();
    Tree { document, a, b, c, d }
}

fn select_from(node: &SimpleNode, source: &str) -> Vec<SimpleNode> {
    let ctx = EvalOptions::new(node.clone()).build();
    compile(source).unwrap().select(&ctx).unwrap()
}

#[test]
fn child_and_descendant() {
    let t = tree();
    assert_eq!(select_from(&t.a, "*"), vec![t.b.clone(), t.c.clone()]);
    assert_eq!(
        select_from(&t.a, "descendant::*"),
        vec![t.b.clone(), t.c.clone(), t.d.clone()]
    );
    assert_eq!(
        select_from(&t.document, "descendant-or-self::node()").len(),
        5
    );
}

#[test]
fn parent_and_ancestors() {
    let t = tree();
    assert_eq!(select_from(&t.d, ".."), vec![t.c.clone()]);
    assert_eq!(
        select_from(&t.d, "ancestor::*"),
        vec![t.a.clone(), t.c.clone()]
    );
    assert_eq!(select_from(&t.d, "ancestor::node()").len(), 3);
    assert_eq!(
        select_from(&t.d, "ancestor-or-self::*"),
        vec![t.a.clone(), t.c.clone(), t.d.clone()]
    );
}

#[test]
fn following_excludes_descendants() {
    let t = tree();
    assert_eq!(
        select_from(&t.b, "following::*"),
        vec![t.c.clone(), t.d.clone()]
    );
    assert_eq!(select_from(&t.c, "following::*"), vec![]);
    assert_eq!(select_from(&t.b, "following-sibling::*"), vec![t.c.clone()]);
}

#[test]
fn preceding_excludes_ancestors() {
    let t = tree();
    assert_eq!(select_from(&t.d, "preceding::*"), vec![t.b.clone()]);
    assert_eq!(select_from(&t.c, "preceding-sibling::*"), vec![t.b.clone()]);
    assert_eq!(select_from(&t.b, "preceding::*"), vec![]);
}

#[test]
fn reverse_axes_count_nearest_first() {
    let t = tree();
    // ancestor::*[1] is the nearest ancestor, not the root.
    assert_eq!(select_from(&t.d, "ancestor::*[1]"), vec![t.c.clone()]);
    assert_eq!(select_from(&t.d, "ancestor::*[2]"), vec![t.a.clone()]);
}

#[test]
fn attribute_axis() {
    let t = tree();
    let ctx = EvalOptions::new(t.a.clone()).build();
    assert_eq!(
        compile("@id").unwrap().evaluate_string(&ctx).unwrap(),
        "root"
    );
    assert_eq!(select_from(&t.a, "@*").len(), 1);
    assert_eq!(select_from(&t.b, "@*").len(), 0);
}

#[test]
fn absolute_paths_start_at_root() {
    let t = tree();
    assert_eq!(select_from(&t.d, "/a/b"), vec![t.b.clone()]);
    assert_eq!(select_from(&t.d, "/"), vec![t.document.clone()]);
    assert_eq!(select_from(&t.d, "//d"), vec![t.d.clone()]);
}

#[test]
fn positional_predicates() {
    let list = doc()
        .child(
            elem("list")
                .child(elem("item").child(text("1")))
                .child(elem("item").child(text("2")))
                .child(elem("item").child(text("3"))),
        )
        .build();
    let ctx = EvalOptions::new(list.clone()).build();
    let eval = |s: &str| compile(s).unwrap().evaluate_string(&ctx).unwrap();
    assert_eq!(eval("//item[2]"), "2");
    assert_eq!(eval("//item[last()]"), "3");
    assert_eq!(eval("count(//item[position() > 1])"), "2");
    // Chained predicates refilter with fresh positions.
    assert_eq!(eval("//item[position() > 1][1]"), "2");
}

#[test]
fn step_results_concatenate_and_only_the_set_dedups() {
    let t = tree();
    // Both b and c contribute their ancestor a; the set folds them.
    assert_eq!(select_from(&t.a, "*/ancestor::*"), vec![t.a.clone()]);
    let ctx = EvalOptions::new(t.a.clone()).build();
    assert_eq!(
        compile("count(*/ancestor::*)")
            .unwrap()
            .evaluate_string(&ctx)
            .unwrap(),
        "1"
    );
}

#[test]
fn namespace_axis_nearest_declaration_wins() {
    let document = doc()
        .child(
            elem("root")
                .namespace(ns("p", "urn:one"))
                .child(elem("inner").namespace(ns("p", "urn:two")).child(elem("leaf"))),
        )
        .build();
    let root = document.children()[0].clone();
    let inner = root.children()[0].clone();
    let leaf = inner.children()[0].clone();

    let eval = |node: &SimpleNode, s: &str| {
        let ctx = EvalOptions::new(node.clone()).build();
        compile(s).unwrap().evaluate_string(&ctx).unwrap()
    };
    assert_eq!(eval(&root, "string(namespace::p)"), "urn:one");
    assert_eq!(eval(&leaf, "string(namespace::p)"), "urn:two");
    assert_eq!(eval(&leaf, "count(namespace::*)"), "1");
}

#[test]
fn processing_instruction_selection() {
    let document = doc()
        .child(xpath1::simple_node::pi("style", "href=a.css"))
        .child(xpath1::simple_node::pi("other", ""))
        .child(elem("root"))
        .build();
    let ctx = EvalOptions::new(document).build();
    let eval = |s: &str| compile(s).unwrap().evaluate_string(&ctx).unwrap();
    assert_eq!(eval("count(processing-instruction())"), "2");
    assert_eq!(eval("string(processing-instruction('style'))"), "href=a.css");
}
