//! Expression parser: tokenizer plus a recursive-descent grammar walker
//! mirroring the XPath 1.0 productions. Operator precedence, loosest first:
//! `or`, `and`, equality, relational, additive, multiplicative, unary
//! minus, union, path/filter/primary.

pub mod ast;
pub mod lexer;

use compact_str::CompactString;

use crate::errors::Error;
use ast::{Axis, BinaryOp, Expr, Literal, LocationPath, NodeTest, Step};
use lexer::{Lexer, Token};

/// Parse an expression string into its AST.
///
/// # Errors
///
/// Lexical and syntax errors; both satisfy `Error::is_compile_error`.
pub fn parse_expression(input: &str) -> Result<Expr, Error> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, what: &str) -> Result<(), Error> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {what}")))
        }
    }

    fn error(&self, message: &str) -> Error {
        let detail = match self.peek() {
            Some(token) => format!("{message}, found '{token}'"),
            None => format!("{message}, found end of input"),
        };
        Error::syntax(detail, self.pos)
    }

    // --- precedence ladder ---

    fn parse_or(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_and()?;
        while self.eat(&Token::Or) {
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_equality()?;
        while self.eat(&Token::And) {
            let right = self.parse_equality()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Some(Token::Equal) => BinaryOp::Equals,
                Some(Token::NotEqual) => BinaryOp::NotEquals,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_relational()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::LessThan) => BinaryOp::LessThan,
                Some(Token::LessThanEqual) => BinaryOp::LessOrEqual,
                Some(Token::GreaterThan) => BinaryOp::GreaterThan,
                Some(Token::GreaterThanEqual) => BinaryOp::GreaterOrEqual,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Subtract,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Multiply,
                Some(Token::Div) => BinaryOp::Divide,
                Some(Token::Mod) => BinaryOp::Modulo,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, Error> {
        if self.eat(&Token::Minus) {
            let inner = self.parse_unary()?;
            Ok(Expr::Negate(Box::new(inner)))
        } else {
            self.parse_union()
        }
    }

    fn parse_union(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_path()?;
        while self.eat(&Token::Pipe) {
            let right = self.parse_path()?;
            left = binary(BinaryOp::Union, left, right);
        }
        Ok(left)
    }

    // --- paths, filters, primaries ---

    fn parse_path(&mut self) -> Result<Expr, Error> {
        match self.peek() {
            Some(
                Token::Slash
                | Token::DoubleSlash
                | Token::Dot
                | Token::DotDot
                | Token::At
                | Token::AxisName(_)
                | Token::Name(_)
                | Token::Wildcard
                | Token::NamespaceWildcard(_)
                | Token::NodeType(_)
                | Token::PiWithLiteral,
            ) => Ok(Expr::Path(self.parse_location_path()?)),
            Some(
                Token::Variable(_)
                | Token::Literal(_)
                | Token::Number(_)
                | Token::FunctionName(_)
                | Token::LeftParen,
            ) => self.parse_filter(),
            _ => Err(self.error("expected expression")),
        }
    }

    fn parse_location_path(&mut self) -> Result<LocationPath, Error> {
        let mut steps = Vec::new();
        let absolute = match self.peek() {
            Some(Token::Slash) => {
                self.pos += 1;
                // `/` alone selects the document root.
                if !self.at_step_start() {
                    return Ok(LocationPath {
                        absolute: true,
                        steps,
                    });
                }
                true
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                steps.push(Step::descendant_or_self_shorthand());
                true
            }
            _ => false,
        };
        steps.push(self.parse_step()?);
        loop {
            if self.eat(&Token::Slash) {
                steps.push(self.parse_step()?);
            } else if self.eat(&Token::DoubleSlash) {
                steps.push(Step::descendant_or_self_shorthand());
                steps.push(self.parse_step()?);
            } else {
                break;
            }
        }
        Ok(LocationPath { absolute, steps })
    }

    fn at_step_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Dot
                    | Token::DotDot
                    | Token::At
                    | Token::AxisName(_)
                    | Token::Name(_)
                    | Token::Wildcard
                    | Token::NamespaceWildcard(_)
                    | Token::NodeType(_)
                    | Token::PiWithLiteral,
            )
        )
    }

    fn parse_step(&mut self) -> Result<Step, Error> {
        // Abbreviated steps take no node test and no predicates.
        if self.eat(&Token::Dot) {
            return Ok(Step::self_shorthand());
        }
        if self.eat(&Token::DotDot) {
            return Ok(Step::parent_shorthand());
        }
        let axis = if self.eat(&Token::At) {
            Axis::Attribute
        } else if let Some(Token::AxisName(name)) = self.peek() {
            let axis = Axis::from_name(name)
                .ok_or_else(|| self.error("expected axis name"))?;
            self.pos += 1;
            self.expect(&Token::ColonColon, "'::' after axis name")?;
            axis
        } else {
            Axis::Child
        };
        let test = self.parse_node_test()?;
        let mut step = Step::new(axis, test);
        while self.eat(&Token::LeftBracket) {
            step.predicates.push(self.parse_or()?);
            self.expect(&Token::RightBracket, "']' after predicate")?;
        }
        Ok(step)
    }

    fn parse_node_test(&mut self) -> Result<NodeTest, Error> {
        let start = self.pos;
        match self.bump() {
            Some(Token::Wildcard) => Ok(NodeTest::AnyName),
            Some(Token::NamespaceWildcard(prefix)) => {
                Ok(NodeTest::PrefixWildcard(prefix.to_string()))
            }
            Some(Token::Name(name)) => {
                let (prefix, local) = split_qname(&name);
                Ok(NodeTest::Name { prefix, local })
            }
            Some(Token::NodeType(name)) => {
                self.expect(&Token::LeftParen, "'(' after node type")?;
                self.expect(&Token::RightParen, "')' after node type")?;
                Ok(match name.as_str() {
                    "node" => NodeTest::AnyNode,
                    "text" => NodeTest::Text,
                    "comment" => NodeTest::Comment,
                    _ => NodeTest::AnyProcessingInstruction,
                })
            }
            Some(Token::PiWithLiteral) => {
                self.expect(&Token::LeftParen, "'(' after processing-instruction")?;
                let target = match self.peek() {
                    Some(Token::Literal(target)) => target.to_string(),
                    _ => return Err(self.error("expected string literal as target")),
                };
                self.pos += 1;
                self.expect(&Token::RightParen, "')' after target")?;
                Ok(NodeTest::ProcessingInstruction(target))
            }
            _ => {
                self.pos = start;
                Err(self.error("expected node test"))
            }
        }
    }

    fn parse_filter(&mut self) -> Result<Expr, Error> {
        let primary = self.parse_primary()?;
        let mut predicates = Vec::new();
        while self.eat(&Token::LeftBracket) {
            predicates.push(self.parse_or()?);
            self.expect(&Token::RightBracket, "']' after predicate")?;
        }
        let mut steps = Vec::new();
        loop {
            if self.eat(&Token::Slash) {
                steps.push(self.parse_step()?);
            } else if self.eat(&Token::DoubleSlash) {
                steps.push(Step::descendant_or_self_shorthand());
                steps.push(self.parse_step()?);
            } else {
                break;
            }
        }
        if predicates.is_empty() && steps.is_empty() {
            return Ok(primary);
        }
        // Predicates on an already-filtered parenthesized expression extend
        // its predicate list instead of nesting another filter.
        match primary {
            Expr::Filter {
                input,
                predicates: mut existing,
                steps: inner_steps,
            } if inner_steps.is_empty() => {
                existing.extend(predicates);
                Ok(Expr::Filter {
                    input,
                    predicates: existing,
                    steps,
                })
            }
            other => Ok(Expr::Filter {
                input: Box::new(other),
                predicates,
                steps,
            }),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, Error> {
        let start = self.pos;
        match self.bump() {
            Some(Token::Variable(name)) => {
                let (prefix, local) = split_qname(&name);
                Ok(Expr::Variable { prefix, local })
            }
            Some(Token::Literal(s)) => Ok(Expr::Literal(Literal::String(s.to_string()))),
            Some(Token::Number(n)) => Ok(Expr::Literal(Literal::Number(n))),
            Some(Token::LeftParen) => {
                let inner = self.parse_or()?;
                self.expect(&Token::RightParen, "')'")?;
                Ok(inner)
            }
            Some(Token::FunctionName(name)) => {
                let (prefix, local) = split_qname(&name);
                self.expect(&Token::LeftParen, "'(' after function name")?;
                let mut args = Vec::new();
                if self.peek() != Some(&Token::RightParen) {
                    args.push(self.parse_or()?);
                    while self.eat(&Token::Comma) {
                        args.push(self.parse_or()?);
                    }
                }
                self.expect(&Token::RightParen, "')' after arguments")?;
                Ok(Expr::FunctionCall {
                    prefix,
                    local,
                    args,
                })
            }
            _ => {
                self.pos = start;
                Err(self.error("expected primary expression"))
            }
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn split_qname(name: &CompactString) -> (Option<String>, String) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, name.to_string()),
    }
}
