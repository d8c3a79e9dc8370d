//! Evaluation engine: context and resolvers, axis traversal, the AST
//! walker, and the built-in function library.

pub mod axes;
pub mod context;
pub mod evaluator;
pub(crate) mod functions;
