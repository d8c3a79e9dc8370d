use rstest::rstest;
use xpath1::simple_node::{SimpleNode, doc, elem, text};
use xpath1::value::{format_number, parse_number};
use xpath1::{EvalOptions, compile};

fn store() -> SimpleNode {
    // <store><price>5</price><price>15</price></store>
    doc()
        .child(
            elem("store")
                .child(elem("price").child(text("5")))
                .child(elem("price").child(text("15"))),
        )
        .build()
}

fn eval_bool(document: &SimpleNode, source: &str) -> bool {
    let ctx = EvalOptions::new(document.clone()).build();
    compile(source).unwrap().evaluate_boolean(&ctx).unwrap()
}

fn eval_string(document: &SimpleNode, source: &str) -> String {
    let ctx = EvalOptions::new(document.clone()).build();
    compile(source).unwrap().evaluate_string(&ctx).unwrap()
}

#[rstest]
#[case("12.5", 12.5)]
#[case("  42 ", 42.0)]
#[case(".5", 0.5)]
#[case("-3", -3.0)]
#[case("1.", 1.0)]
fn number_parsing_accepts(#[case] input: &str, #[case] expected: f64) {
    assert_eq!(parse_number(input), expected);
}

#[rstest]
#[case("1e3")]
#[case("+5")]
#[case("1.2.3")]
#[case("")]
#[case("-")]
#[case(".")]
#[case("five")]
fn number_parsing_rejects(#[case] input: &str) {
    assert!(parse_number(input).is_nan(), "{input}");
}

#[rstest]
#[case(0.0, "0")]
#[case(-0.0, "0")]
#[case(42.0, "42")]
#[case(4.5, "4.5")]
#[case(-3.25, "-3.25")]
#[case(f64::NAN, "NaN")]
#[case(f64::INFINITY, "Infinity")]
#[case(f64::NEG_INFINITY, "-Infinity")]
// Magnitudes that would take exponent form in scientific notation are
// expanded to plain positional notation.
#[case(0.000_000_01, "0.00000001")]
#[case(123_000_000_000_000_000_000.0, "123000000000000000000")]
fn number_formatting(#[case] input: f64, #[case] expected: &str) {
    assert_eq!(format_number(input), expected);
}

#[test]
fn scalar_coercions() {
    let document = store();
    assert_eq!(eval_string(&document, "string(1 div 0)"), "Infinity");
    assert_eq!(eval_string(&document, "string(0 div 0)"), "NaN");
    assert_eq!(eval_string(&document, "string(true())"), "true");
    assert_eq!(eval_string(&document, "string(10 mod 3)"), "1");
    assert_eq!(eval_string(&document, "string(5 div 2)"), "2.5");
    assert!(!eval_bool(&document, "0"));
    assert!(!eval_bool(&document, "''"));
    assert!(eval_bool(&document, "'0'"));
    assert!(eval_bool(&document, "-1"));
}

#[test]
fn node_set_to_string_takes_first_in_document_order() {
    let document = store();
    assert_eq!(eval_string(&document, "string(//price)"), "5");
    assert_eq!(eval_string(&document, "string(//missing)"), "");
}

#[test]
fn existential_comparisons() {
    let document = store();
    assert!(eval_bool(&document, "//price < 10"));
    assert!(eval_bool(&document, "//price > 10"));
    assert!(!eval_bool(&document, "//price > 20"));
    assert!(eval_bool(&document, "//price = 15"));
    assert!(eval_bool(&document, "'5' = //price"));
    // A set holding 5 and 15 is both less than and greater than 10.
    assert!(eval_bool(&document, "//price < 10 and //price > 10"));
}

#[test]
fn node_set_against_boolean_collapses_first() {
    let document = store();
    // Empty set never satisfies existential comparison against a string...
    assert!(!eval_bool(&document, "//missing = ''"));
    // ...but compares as its effective boolean against booleans.
    assert!(eval_bool(&document, "//missing = false()"));
    assert!(eval_bool(&document, "//price = true()"));
}

#[test]
fn equality_prefers_native_kind_relational_goes_numeric() {
    let document = store();
    // Native string equality: no numeric coercion.
    assert!(!eval_bool(&document, "'3' = '3.0'"));
    // Relational comparison is always numeric.
    assert!(eval_bool(&document, "'3' < '12'"));
    assert!(eval_bool(&document, "'3' = 3"));
    // Boolean on either side wins for equality.
    assert!(eval_bool(&document, "true() = '0'"));
}

#[test]
fn nan_never_compares() {
    let document = store();
    assert!(!eval_bool(&document, "number('x') = number('x')"));
    assert!(!eval_bool(&document, "number('x') < 1"));
    assert!(eval_bool(&document, "number('x') != number('x')"));
}
