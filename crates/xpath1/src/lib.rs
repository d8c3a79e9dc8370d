//! XPath 1.0 expression compiler and evaluator for generic node trees.
//!
//! The engine is document-model agnostic: anything implementing
//! [`XPathNode`] can be queried. Expressions are compiled once and
//! evaluated any number of times against immutable evaluation contexts.
//!
//! ```
//! use xpath1::simple_node::{doc, elem, text};
//! use xpath1::{EvalOptions, compile};
//!
//! let document = doc()
//!     .child(elem("a").child(elem("b").child(text("hi"))).child(elem("c")))
//!     .build();
//!
//! let expr = compile("/a/b").unwrap();
//! let ctx = EvalOptions::new(document).build();
//! assert_eq!(expr.evaluate_string(&ctx).unwrap(), "hi");
//! ```

pub mod compiler;
pub mod engine;
pub mod errors;
pub mod model;
pub mod nodeset;
pub mod parser;
pub mod simple_node;
pub mod value;

pub use compiler::{CompiledExpression, EvalOptions, compile, evaluate};
pub use engine::context::{
    Context, FunctionImpl, FunctionResolver, NamespaceResolver, VariableResolver,
};
pub use errors::{Error, ErrorKind};
pub use model::{NodeKind, QName, XPathNode};
pub use nodeset::NodeSet;
pub use parser::parse_expression;
pub use value::Value;
