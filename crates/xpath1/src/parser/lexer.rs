use core::fmt;

use compact_str::CompactString;

use crate::errors::Error;

/// Node type names that form node tests rather than function calls when
/// followed by `(`.
const NODE_TYPE_NAMES: &[&str] = &["comment", "text", "processing-instruction", "node"];

/// A token of the expression grammar.
///
/// Raw scanning emits `Name` for every name and `Star` for every `*`; the
/// disambiguation pass reclassifies them from one token of context.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Dot,
    DotDot,
    At,
    Comma,
    ColonColon,
    Slash,
    DoubleSlash,
    Pipe,
    Plus,
    Minus,
    /// Multiply operator.
    Star,
    /// `*` name test.
    Wildcard,
    /// `prefix:*` name test.
    NamespaceWildcard(CompactString),
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    And,
    Or,
    Mod,
    Div,
    Number(f64),
    Literal(CompactString),
    /// `name` or `prefix:name` used as a name test.
    Name(CompactString),
    /// `$name` / `$prefix:name`, without the `$`.
    Variable(CompactString),
    /// A name that appeared before `(` and is not a node type.
    FunctionName(CompactString),
    /// `comment`, `text`, `node`, or `processing-instruction` before `()`.
    NodeType(CompactString),
    /// `processing-instruction` before `(` with a target literal inside.
    PiWithLiteral,
    /// A name that appeared before `::`.
    AxisName(CompactString),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeftParen => f.write_str("("),
            Self::RightParen => f.write_str(")"),
            Self::LeftBracket => f.write_str("["),
            Self::RightBracket => f.write_str("]"),
            Self::Dot => f.write_str("."),
            Self::DotDot => f.write_str(".."),
            Self::At => f.write_str("@"),
            Self::Comma => f.write_str(","),
            Self::ColonColon => f.write_str("::"),
            Self::Slash => f.write_str("/"),
            Self::DoubleSlash => f.write_str("//"),
            Self::Pipe => f.write_str("|"),
            Self::Plus => f.write_str("+"),
            Self::Minus => f.write_str("-"),
            Self::Star => f.write_str("*"),
            Self::Wildcard => f.write_str("*"),
            Self::NamespaceWildcard(prefix) => write!(f, "{prefix}:*"),
            Self::Equal => f.write_str("="),
            Self::NotEqual => f.write_str("!="),
            Self::LessThan => f.write_str("<"),
            Self::LessThanEqual => f.write_str("<="),
            Self::GreaterThan => f.write_str(">"),
            Self::GreaterThanEqual => f.write_str(">="),
            Self::And => f.write_str("and"),
            Self::Or => f.write_str("or"),
            Self::Mod => f.write_str("mod"),
            Self::Div => f.write_str("div"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Literal(s) => write!(f, "\"{s}\""),
            Self::Name(s) | Self::FunctionName(s) | Self::NodeType(s) | Self::AxisName(s) => {
                write!(f, "{s}")
            }
            Self::PiWithLiteral => f.write_str("processing-instruction"),
            Self::Variable(s) => write!(f, "${s}"),
        }
    }
}

/// Expression tokenizer.
///
/// Scans raw tokens left to right, then applies the one-token-lookback
/// disambiguation pass: `*` after an operand-ending token is multiplication,
/// otherwise a wildcard; `and`/`or`/`mod`/`div` after an operand-ending
/// token are operators, otherwise plain names; a name before `(` is a
/// function name or a node type; a name before `::` is an axis name.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenize the whole input.
    ///
    /// # Errors
    ///
    /// Lexical errors (illegal character, unterminated literal, `:` or `!`
    /// without their second half) carry the byte offset of the offending
    /// character.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Error> {
        let mut raw = Vec::new();
        loop {
            self.skip_whitespace();
            if self.pos >= self.input.len() {
                break;
            }
            raw.push(self.next_raw_token()?);
        }
        Ok(disambiguate(raw))
    }

    fn next_raw_token(&mut self) -> Result<Token, Error> {
        let ch = self
            .peek_char()
            .ok_or_else(|| Error::lex("unexpected end of input", self.pos))?;
        match ch {
            '(' => Ok(self.single(Token::LeftParen)),
            ')' => Ok(self.single(Token::RightParen)),
            '[' => Ok(self.single(Token::LeftBracket)),
            ']' => Ok(self.single(Token::RightBracket)),
            '@' => Ok(self.single(Token::At)),
            ',' => Ok(self.single(Token::Comma)),
            '|' => Ok(self.single(Token::Pipe)),
            '+' => Ok(self.single(Token::Plus)),
            '-' => Ok(self.single(Token::Minus)),
            '=' => Ok(self.single(Token::Equal)),
            '*' => Ok(self.single(Token::Star)),
            ':' => self.read_colon_colon(),
            '.' => Ok(self.read_dot_or_number()),
            '/' => Ok(self.read_slash()),
            '!' => self.read_not_equal(),
            '<' => Ok(self.read_comparison(Token::LessThan, Token::LessThanEqual)),
            '>' => Ok(self.read_comparison(Token::GreaterThan, Token::GreaterThanEqual)),
            '"' | '\'' => self.read_string_literal(ch),
            '$' => self.read_variable(),
            '0'..='9' => Ok(self.read_number()),
            c if is_name_start(c) => Ok(self.read_name()),
            c => Err(Error::lex(format!("unexpected character '{c}'"), self.pos)),
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn read_dot_or_number(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1;
        if self.peek_char() == Some('.') {
            self.pos += 1;
            return Token::DotDot;
        }
        if self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance_while(|c| c.is_ascii_digit());
            // The scanned slice is `.digits`, a subset of f64 syntax.
            let value = self.input[start..self.pos].parse::<f64>().unwrap_or(f64::NAN);
            return Token::Number(value);
        }
        Token::Dot
    }

    fn read_slash(&mut self) -> Token {
        self.pos += 1;
        if self.peek_char() == Some('/') {
            self.pos += 1;
            Token::DoubleSlash
        } else {
            Token::Slash
        }
    }

    fn read_colon_colon(&mut self) -> Result<Token, Error> {
        let start = self.pos;
        self.pos += 1;
        if self.peek_char() == Some(':') {
            self.pos += 1;
            Ok(Token::ColonColon)
        } else {
            Err(Error::lex("expected ':' after ':'", start))
        }
    }

    fn read_not_equal(&mut self) -> Result<Token, Error> {
        let start = self.pos;
        self.pos += 1;
        if self.peek_char() == Some('=') {
            self.pos += 1;
            Ok(Token::NotEqual)
        } else {
            Err(Error::lex("expected '=' after '!'", start))
        }
    }

    fn read_comparison(&mut self, bare: Token, with_equal: Token) -> Token {
        self.pos += 1;
        if self.peek_char() == Some('=') {
            self.pos += 1;
            with_equal
        } else {
            bare
        }
    }

    fn read_string_literal(&mut self, quote: char) -> Result<Token, Error> {
        let start = self.pos;
        self.pos += 1;
        let content_start = self.pos;
        self.advance_while(|c| c != quote);
        if self.pos >= self.input.len() {
            return Err(Error::lex("unterminated string literal", start));
        }
        let content = CompactString::from(&self.input[content_start..self.pos]);
        self.pos += 1;
        Ok(Token::Literal(content))
    }

    fn read_variable(&mut self) -> Result<Token, Error> {
        let start = self.pos;
        self.pos += 1;
        if !self.peek_char().is_some_and(is_name_start) {
            return Err(Error::lex("expected name after '$'", start));
        }
        let name_start = self.pos;
        self.scan_qname();
        Ok(Token::Variable(CompactString::from(
            &self.input[name_start..self.pos],
        )))
    }

    /// Numbers are `digits ('.' digits?)?`; exponent notation is not part
    /// of the grammar, so `1e3` lexes as a number followed by a name.
    fn read_number(&mut self) -> Token {
        let start = self.pos;
        self.advance_while(|c| c.is_ascii_digit());
        if self.peek_char() == Some('.')
            && self.peek_char_at(self.pos + 1) != Some('.')
        {
            self.pos += 1;
            self.advance_while(|c| c.is_ascii_digit());
        }
        let value = self.input[start..self.pos].parse::<f64>().unwrap_or(f64::NAN);
        Token::Number(value)
    }

    fn read_name(&mut self) -> Token {
        let start = self.pos;
        self.advance_while(is_name_char);
        // `prefix:*` is a single name-test token.
        if self.peek_char() == Some(':') && self.peek_char_at(self.pos + 1) == Some('*') {
            let prefix = CompactString::from(&self.input[start..self.pos]);
            self.pos += 2;
            return Token::NamespaceWildcard(prefix);
        }
        // `prefix:local`, but not `prefix::axis`.
        if self.peek_char() == Some(':')
            && self.peek_char_at(self.pos + 1).is_some_and(is_name_start)
        {
            self.pos += 1;
            self.advance_while(is_name_char);
        }
        Token::Name(CompactString::from(&self.input[start..self.pos]))
    }

    fn scan_qname(&mut self) {
        self.advance_while(is_name_char);
        if self.peek_char() == Some(':')
            && self.peek_char_at(self.pos + 1).is_some_and(is_name_start)
        {
            self.pos += 1;
            self.advance_while(is_name_char);
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, pos: usize) -> Option<char> {
        self.input.get(pos..).and_then(|rest| rest.chars().next())
    }

    fn advance_while<F: Fn(char) -> bool>(&mut self, pred: F) {
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        self.advance_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
    }
}

/// One-token-lookback reclassification of `*`, keyword operators and names.
fn disambiguate(raw: Vec<Token>) -> Vec<Token> {
    let len = raw.len();
    let mut result: Vec<Token> = Vec::with_capacity(len);
    let mut i = 0usize;
    while i < len {
        let after_operand = result.last().is_some_and(is_operand_ending);
        match &raw[i] {
            Token::Star if !after_operand => result.push(Token::Wildcard),
            Token::Name(name) => {
                if after_operand {
                    result.push(match name.as_str() {
                        "and" => Token::And,
                        "or" => Token::Or,
                        "mod" => Token::Mod,
                        "div" => Token::Div,
                        _ => Token::Name(name.clone()),
                    });
                } else if raw.get(i + 1) == Some(&Token::LeftParen) {
                    if name == "processing-instruction" {
                        // Node type only with an immediately closing paren;
                        // with a target literal it is a distinct token.
                        if raw.get(i + 2) == Some(&Token::RightParen) {
                            result.push(Token::NodeType(name.clone()));
                        } else {
                            result.push(Token::PiWithLiteral);
                        }
                    } else if NODE_TYPE_NAMES.contains(&name.as_str()) {
                        result.push(Token::NodeType(name.clone()));
                    } else {
                        result.push(Token::FunctionName(name.clone()));
                    }
                } else if raw.get(i + 1) == Some(&Token::ColonColon) {
                    result.push(Token::AxisName(name.clone()));
                } else {
                    result.push(Token::Name(name.clone()));
                }
            }
            other => result.push(other.clone()),
        }
        i += 1;
    }
    result
}

/// Whether a token can end an operand, which makes a following `*` the
/// multiply operator and a following keyword name an operator.
fn is_operand_ending(token: &Token) -> bool {
    matches!(
        token,
        Token::RightParen
            | Token::RightBracket
            | Token::Dot
            | Token::DotDot
            | Token::Number(_)
            | Token::Literal(_)
            | Token::Name(_)
            | Token::Wildcard
            | Token::NamespaceWildcard(_)
            | Token::Variable(_)
    )
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '\u{b7}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize().unwrap()
    }

    #[test]
    fn explicit_axis_step() {
        assert_eq!(
            tokenize("child::p"),
            vec![
                Token::AxisName("child".into()),
                Token::ColonColon,
                Token::Name("p".into()),
            ]
        );
    }

    #[test]
    fn star_is_wildcard_without_preceding_operand() {
        assert_eq!(tokenize("*"), vec![Token::Wildcard]);
        assert_eq!(tokenize("/*"), vec![Token::Slash, Token::Wildcard]);
        assert_eq!(
            tokenize("a[*]"),
            vec![
                Token::Name("a".into()),
                Token::LeftBracket,
                Token::Wildcard,
                Token::RightBracket,
            ]
        );
    }

    #[test]
    fn star_is_multiply_after_operand() {
        assert_eq!(
            tokenize("a * b"),
            vec![Token::Name("a".into()), Token::Star, Token::Name("b".into())]
        );
        assert_eq!(
            tokenize("count(x) * 2"),
            vec![
                Token::FunctionName("count".into()),
                Token::LeftParen,
                Token::Name("x".into()),
                Token::RightParen,
                Token::Star,
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn consecutive_stars_alternate() {
        // First * is a wildcard operand, second is multiply, third a wildcard.
        assert_eq!(
            tokenize("* * *"),
            vec![Token::Wildcard, Token::Star, Token::Wildcard]
        );
    }

    #[test]
    fn keywords_only_after_operand() {
        assert_eq!(
            tokenize("a and b"),
            vec![Token::Name("a".into()), Token::And, Token::Name("b".into())]
        );
        // A leading `div` is an element name.
        assert_eq!(
            tokenize("div div div"),
            vec![
                Token::Name("div".into()),
                Token::Div,
                Token::Name("div".into()),
            ]
        );
    }

    #[test]
    fn name_before_paren_is_function_or_node_type() {
        assert_eq!(
            tokenize("text()"),
            vec![
                Token::NodeType("text".into()),
                Token::LeftParen,
                Token::RightParen,
            ]
        );
        assert_eq!(
            tokenize("last()"),
            vec![
                Token::FunctionName("last".into()),
                Token::LeftParen,
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn processing_instruction_splits_on_target() {
        assert_eq!(
            tokenize("processing-instruction()"),
            vec![
                Token::NodeType("processing-instruction".into()),
                Token::LeftParen,
                Token::RightParen,
            ]
        );
        assert_eq!(
            tokenize("processing-instruction('xml-stylesheet')"),
            vec![
                Token::PiWithLiteral,
                Token::LeftParen,
                Token::Literal("xml-stylesheet".into()),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn namespace_wildcard() {
        assert_eq!(
            tokenize("svg:*"),
            vec![Token::NamespaceWildcard("svg".into())]
        );
        assert_eq!(tokenize("svg:rect"), vec![Token::Name("svg:rect".into())]);
    }

    #[test]
    fn numbers() {
        assert_eq!(tokenize("42"), vec![Token::Number(42.0)]);
        assert_eq!(tokenize(".5"), vec![Token::Number(0.5)]);
        assert_eq!(tokenize("3.5"), vec![Token::Number(3.5)]);
        // `..` after digits is not a fraction.
        assert_eq!(
            tokenize("1..self::a"),
            vec![
                Token::Number(1.0),
                Token::DotDot,
                Token::AxisName("self".into()),
                Token::ColonColon,
                Token::Name("a".into()),
            ]
        );
    }

    #[test]
    fn string_literals_and_variables() {
        assert_eq!(tokenize("\"hi\""), vec![Token::Literal("hi".into())]);
        assert_eq!(tokenize("'hi'"), vec![Token::Literal("hi".into())]);
        assert_eq!(tokenize("$x"), vec![Token::Variable("x".into())]);
        assert_eq!(tokenize("$ns:var"), vec![Token::Variable("ns:var".into())]);
    }

    #[test]
    fn lexical_errors() {
        assert!(Lexer::new("\"open").tokenize().unwrap_err().is_compile_error());
        assert!(Lexer::new("!x").tokenize().is_err());
        assert!(Lexer::new("a # b").tokenize().is_err());
        assert!(Lexer::new("$ ").tokenize().is_err());
    }

    #[test]
    fn empty_input_gives_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \t\n").is_empty());
    }
}
