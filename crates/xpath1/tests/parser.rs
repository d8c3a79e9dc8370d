use rstest::rstest;
use xpath1::parser::ast::{Axis, BinaryOp, Expr, Literal, LocationPath, NodeTest, Step};
use xpath1::parser::parse_expression;

fn step(axis: Axis, test: NodeTest) -> Step {
    Step::new(axis, test)
}

fn name_test(local: &str) -> NodeTest {
    NodeTest::Name {
        prefix: None,
        local: local.to_string(),
    }
}

#[test]
fn bare_name_is_child_step() {
    let expr = parse_expression("item").unwrap();
    assert_eq!(
        expr,
        Expr::Path(LocationPath {
            absolute: false,
            steps: vec![step(Axis::Child, name_test("item"))],
        })
    );
}

#[test]
fn double_slash_desugars() {
    let expr = parse_expression("//item[2]").unwrap();
    let mut indexed = step(Axis::Child, name_test("item"));
    indexed.predicates.push(Expr::Literal(Literal::Number(2.0)));
    assert_eq!(
        expr,
        Expr::Path(LocationPath {
            absolute: true,
            steps: vec![
                Step::new(Axis::DescendantOrSelf, NodeTest::AnyNode),
                indexed
            ],
        })
    );
}

#[test]
fn root_alone() {
    assert_eq!(
        parse_expression("/").unwrap(),
        Expr::Path(LocationPath {
            absolute: true,
            steps: vec![],
        })
    );
}

#[test]
fn abbreviations_expand() {
    let expr = parse_expression("../@id").unwrap();
    assert_eq!(
        expr,
        Expr::Path(LocationPath {
            absolute: false,
            steps: vec![
                Step::new(Axis::Parent, NodeTest::AnyNode),
                step(Axis::Attribute, name_test("id")),
            ],
        })
    );
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let expr = parse_expression("1 + 2 * 3").unwrap();
    let Expr::Binary { op, right, .. } = expr else {
        panic!("expected binary expression");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(
        *right,
        Expr::Binary {
            op: BinaryOp::Multiply,
            ..
        }
    ));
}

#[test]
fn unary_minus_binds_tighter_than_addition() {
    let expr = parse_expression("-3 + 2").unwrap();
    let Expr::Binary { op, left, .. } = expr else {
        panic!("expected binary expression");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(*left, Expr::Negate(_)));
}

#[test]
fn union_of_paths() {
    let expr = parse_expression("a/b | c").unwrap();
    assert!(matches!(
        expr,
        Expr::Binary {
            op: BinaryOp::Union,
            ..
        }
    ));
}

#[test]
fn processing_instruction_tests() {
    let expr = parse_expression("processing-instruction()").unwrap();
    assert_eq!(
        expr,
        Expr::Path(LocationPath {
            absolute: false,
            steps: vec![Step::new(Axis::Child, NodeTest::AnyProcessingInstruction)],
        })
    );
    let expr = parse_expression("processing-instruction('style')").unwrap();
    assert_eq!(
        expr,
        Expr::Path(LocationPath {
            absolute: false,
            steps: vec![Step::new(
                Axis::Child,
                NodeTest::ProcessingInstruction("style".to_string())
            )],
        })
    );
}

#[test]
fn filter_predicates_accumulate() {
    // ($x[1])[2] keeps one filter with both predicates.
    let expr = parse_expression("($x[1])[2]").unwrap();
    let Expr::Filter {
        input, predicates, ..
    } = expr
    else {
        panic!("expected filter expression");
    };
    assert!(matches!(
        *input,
        Expr::Variable {
            prefix: None,
            ..
        }
    ));
    assert_eq!(predicates.len(), 2);
}

#[test]
fn filter_with_trailing_steps() {
    let expr = parse_expression("(a | b)/c").unwrap();
    let Expr::Filter {
        predicates, steps, ..
    } = expr
    else {
        panic!("expected filter expression");
    };
    assert!(predicates.is_empty());
    assert_eq!(steps, vec![step(Axis::Child, name_test("c"))]);
}

#[rstest]
#[case("")]
#[case("count(")]
#[case("a[")]
#[case("a]")]
#[case("@")]
#[case("1 +")]
#[case("a/")]
#[case("ancestor-or-wrong::a")]
#[case("processing-instruction(2)")]
#[case("\"unterminated")]
#[case("a # b")]
fn rejects_invalid_input(#[case] input: &str) {
    let error = parse_expression(input).unwrap_err();
    assert!(error.is_compile_error(), "{input}: {error}");
}

#[rstest]
#[case("item")]
#[case("//item[2]")]
#[case("a/b | c/d")]
#[case("(a)[1]/b")]
#[case("-(2 + 2)")]
#[case("substring('12345', 2)")]
#[case("child::*[position() > 1]")]
#[case("$x + 1")]
#[case("@*")]
#[case("namespace::*")]
#[case("svg:*")]
#[case("processing-instruction('t')")]
#[case(".")]
#[case("..")]
#[case("/")]
#[case("string-length(normalize-space(' a  b '))")]
fn canonical_form_round_trips(#[case] input: &str) {
    let parsed = parse_expression(input).unwrap();
    let canonical = parsed.to_string();
    let reparsed = parse_expression(&canonical)
        .unwrap_or_else(|e| panic!("canonical form '{canonical}' failed to parse: {e}"));
    assert_eq!(parsed, reparsed, "via '{canonical}'");
}
