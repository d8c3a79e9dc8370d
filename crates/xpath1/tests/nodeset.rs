use xpath1::nodeset::NodeSet;
use xpath1::simple_node::{SimpleNode, attr, doc, elem};
use xpath1::{EvalOptions, XPathNode, compile};

struct Tree {
    document: SimpleNode,
    a: SimpleNode,
    b: SimpleNode,
    c: SimpleNode,
    d: SimpleNode,
}

// <a id="x"><b/><c><d/></c></a>
fn tree() -> Tree {
    let document = doc()
        .child(
            elem("a")
                .attr(attr("id", "x"))
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

fn select(document: &SimpleNode, source: &str) -> Vec<SimpleNode> {
    let ctx = EvalOptions::new(document.clone()).build();
    compile(source).unwrap().select(&ctx).unwrap()
}

#[test]
fn union_results_come_back_in_document_order() {
    let t = tree();
    assert_eq!(
        select(&t.document, "/a/c/d | /a/b"),
        vec![t.b.clone(), t.d.clone()]
    );
    assert_eq!(
        select(&t.document, "//d | //b | //c"),
        vec![t.b.clone(), t.c.clone(), t.d.clone()]
    );
}

#[test]
fn union_folds_duplicates() {
    let t = tree();
    assert_eq!(select(&t.document, "//b | //b"), vec![t.b.clone()]);
    let ctx = EvalOptions::new(t.document.clone()).build();
    assert_eq!(
        compile("count(//* | /a/*)")
            .unwrap()
            .evaluate_number(&ctx)
            .unwrap(),
        4.0
    );
}

#[test]
fn attributes_order_before_children_of_their_element() {
    let t = tree();
    let id = t.a.attributes()[0].clone();
    assert_eq!(
        select(&t.document, "//@id | //b"),
        vec![id, t.b.clone()]
    );
}

#[test]
fn insert_dedups_by_identity() {
    let t = tree();
    let mut set = NodeSet::new();
    set.insert(t.b.clone());
    set.insert(t.b.clone());
    set.insert(t.d.clone());
    assert_eq!(set.len(), 2);
    assert!(set.contains(&t.b));
    assert!(!set.contains(&t.c));
}

#[test]
fn from_nodes_dedups_and_orders_lazily() {
    let t = tree();
    // Out of document order on purpose.
    let set = NodeSet::from_nodes(vec![
        t.d.clone(),
        t.b.clone(),
        t.d.clone(),
        t.a.clone(),
    ]);
    assert_eq!(set.len(), 3);
    assert_eq!(
        set.ordered().unwrap(),
        vec![t.a.clone(), t.b.clone(), t.d.clone()]
    );
    // Cached permutation serves repeat calls.
    assert_eq!(set.first().unwrap(), Some(t.a.clone()));
}

#[test]
fn merge_unions_in_place() {
    let t = tree();
    let mut left = NodeSet::from_nodes(vec![t.c.clone(), t.b.clone()]);
    let right = NodeSet::from_nodes(vec![t.b.clone(), t.d.clone()]);
    left.merge(&right);
    assert_eq!(left.len(), 3);
    assert_eq!(
        left.ordered().unwrap(),
        vec![t.b.clone(), t.c.clone(), t.d.clone()]
    );
}

#[test]
fn empty_set_behaviour() {
    let set: NodeSet<SimpleNode> = NodeSet::new();
    assert!(set.is_empty());
    assert_eq!(set.ordered().unwrap(), vec![]);
    assert_eq!(set.first().unwrap(), None);
}

#[test]
fn ordering_nodes_from_disjoint_trees_fails() {
    let t = tree();
    let other = tree();
    let set = NodeSet::from_nodes(vec![t.b.clone(), other.b.clone()]);
    assert!(set.ordered().is_err());
}
