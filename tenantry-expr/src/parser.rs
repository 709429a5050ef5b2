//! Recursive-descent parser producing the expression AST.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! program     := "return"? expression ";"*
//! expression  := conditional
//! conditional := or ("?" expression ":" expression)?
//! or          := and ("||" and)*
//! and         := equality ("&&" equality)*
//! equality    := comparison (("==" | "!=" | "===" | "!==") comparison)*
//! comparison  := additive (("<" | "<=" | ">" | ">=") additive)*
//! additive    := term (("+" | "-") term)*
//! term        := unary (("*" | "/" | "%") unary)*
//! unary       := ("!" | "-" | "+") unary | postfix
//! postfix     := primary ("." ident | "[" expression "]" | "(" args ")")*
//! primary     := number | string | literal | ident | "(" expression ")"
//!              | "[" elements "]" | "{" entries "}"
//! ```

use crate::error::{ExprError, Result};
use crate::lexer::{Lexer, SpannedToken, Token};
use crate::value::Value;
use crate::Limits;

/// Tallest expression tree accepted, counted in nodes from root to leaf.
/// Evaluation recurses once per level, so this bounds its stack use.
pub const MAX_TREE_HEIGHT: usize = 256;

/// Deepest paren, unary or object nesting accepted regardless of the
/// configured limit. Each level costs a full descent through the grammar.
const NESTING_CEILING: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    LooseEq,
    LooseNe,
    StrictEq,
    StrictNe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    Ident(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Member {
        object: Box<Expr>,
        property: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
}

/// Parse source text into an [`Expr`], enforcing `limits`.
pub fn parse(input: &str, limits: &Limits) -> Result<Expr> {
    if input.len() > limits.max_input_bytes {
        return Err(ExprError::InputTooLarge {
            max_bytes: limits.max_input_bytes,
            actual_bytes: input.len(),
        });
    }
    let tokens = Lexer::new(input).lex()?;
    let mut parser = Parser {
        tokens,
        index: 0,
        nesting: 0,
        max_depth: limits.max_depth.min(NESTING_CEILING),
    };
    parser.parse_program().map(|node| node.expr)
}

/// A parsed subtree and its height.
struct Node {
    expr: Expr,
    height: usize,
}

impl Node {
    fn leaf(expr: Expr) -> Self {
        Self { expr, height: 1 }
    }
}

struct Parser<'a> {
    tokens: Vec<SpannedToken<'a>>,
    index: usize,
    nesting: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn parse_program(&mut self) -> Result<Node> {
        if self.current().token == Token::Ident("return") {
            self.advance();
        }
        let node = self.parse_expression()?;
        while self.matches(&Token::Semicolon) {}
        if self.current().token != Token::Eof {
            return Err(ExprError::TrailingInput {
                position: self.current().position,
            });
        }
        Ok(node)
    }

    fn parse_expression(&mut self) -> Result<Node> {
        let position = self.current().position;
        self.with_nesting(position, Self::parse_conditional)
    }

    fn parse_conditional(&mut self) -> Result<Node> {
        let test = self.parse_or()?;
        let position = self.current().position;
        if !self.matches(&Token::Question) {
            return Ok(test);
        }
        let consequent = self.parse_expression()?;
        self.expect(&Token::Colon, "`:`")?;
        let alternate = self.parse_expression()?;
        let children = test.height.max(consequent.height).max(alternate.height);
        let expr = Expr::Conditional {
            test: Box::new(test.expr),
            consequent: Box::new(consequent.expr),
            alternate: Box::new(alternate.expr),
        };
        self.branch(expr, children, position)
    }

    fn parse_or(&mut self) -> Result<Node> {
        let mut left = self.parse_and()?;
        loop {
            let position = self.current().position;
            if !self.matches(&Token::OrOr) {
                return Ok(left);
            }
            let right = self.parse_and()?;
            left = self.logical(LogicalOp::Or, left, right, position)?;
        }
    }

    fn parse_and(&mut self) -> Result<Node> {
        let mut left = self.parse_equality()?;
        loop {
            let position = self.current().position;
            if !self.matches(&Token::AndAnd) {
                return Ok(left);
            }
            let right = self.parse_equality()?;
            left = self.logical(LogicalOp::And, left, right, position)?;
        }
    }

    fn parse_equality(&mut self) -> Result<Node> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.current().token {
                Token::EqEq => BinaryOp::LooseEq,
                Token::NotEq => BinaryOp::LooseNe,
                Token::EqEqEq => BinaryOp::StrictEq,
                Token::NotEqEq => BinaryOp::StrictNe,
                _ => return Ok(left),
            };
            let position = self.current().position;
            self.advance();
            let right = self.parse_comparison()?;
            left = self.binary(op, left, right, position)?;
        }
    }

    fn parse_comparison(&mut self) -> Result<Node> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.current().token {
                Token::Lt => BinaryOp::Lt,
                Token::Le => BinaryOp::Le,
                Token::Gt => BinaryOp::Gt,
                Token::Ge => BinaryOp::Ge,
                _ => return Ok(left),
            };
            let position = self.current().position;
            self.advance();
            let right = self.parse_additive()?;
            left = self.binary(op, left, right, position)?;
        }
    }

    fn parse_additive(&mut self) -> Result<Node> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current().token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            let position = self.current().position;
            self.advance();
            let right = self.parse_term()?;
            left = self.binary(op, left, right, position)?;
        }
    }

    fn parse_term(&mut self) -> Result<Node> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current().token {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Rem,
                _ => return Ok(left),
            };
            let position = self.current().position;
            self.advance();
            let right = self.parse_unary()?;
            left = self.binary(op, left, right, position)?;
        }
    }

    fn parse_unary(&mut self) -> Result<Node> {
        let op = match self.current().token {
            Token::Bang => UnaryOp::Not,
            Token::Minus => UnaryOp::Negate,
            Token::Plus => UnaryOp::Plus,
            _ => return self.parse_postfix(),
        };
        let position = self.current().position;
        self.advance();
        let operand = self.with_nesting(position, Self::parse_unary)?;
        let expr = Expr::Unary {
            op,
            operand: Box::new(operand.expr),
        };
        self.branch(expr, operand.height, position)
    }

    fn parse_postfix(&mut self) -> Result<Node> {
        let mut node = self.parse_primary()?;
        loop {
            let position = self.current().position;
            match self.current().token {
                Token::Dot => {
                    self.advance();
                    let property = self.expect_ident()?;
                    let height = node.height;
                    let expr = Expr::Member {
                        object: Box::new(node.expr),
                        property,
                    };
                    node = self.branch(expr, height, position)?;
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(&Token::RBracket, "`]`")?;
                    let children = node.height.max(index.height);
                    let expr = Expr::Index {
                        object: Box::new(node.expr),
                        index: Box::new(index.expr),
                    };
                    node = self.branch(expr, children, position)?;
                }
                Token::LParen => {
                    self.advance();
                    let (args, args_height) = self.parse_list(&Token::RParen, "`,` or `)`")?;
                    let children = node.height.max(args_height);
                    let expr = Expr::Call {
                        callee: Box::new(node.expr),
                        args,
                    };
                    node = self.branch(expr, children, position)?;
                }
                _ => return Ok(node),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Node> {
        let SpannedToken { token, position } = self.current().clone();
        match token {
            Token::Number(raw) => {
                self.advance();
                raw.parse::<f64>()
                    .map(|n| Node::leaf(Expr::Literal(Value::Number(n))))
                    .map_err(|_| ExprError::InvalidNumber {
                        raw: raw.to_string(),
                        position,
                    })
            }
            Token::Str(s) => {
                self.advance();
                Ok(Node::leaf(Expr::Literal(Value::String(s))))
            }
            Token::Ident(name) => {
                self.advance();
                Ok(Node::leaf(match name {
                    "true" => Expr::Literal(Value::Bool(true)),
                    "false" => Expr::Literal(Value::Bool(false)),
                    "null" | "undefined" => Expr::Literal(Value::Null),
                    _ => Expr::Ident(name.to_string()),
                }))
            }
            Token::LParen => {
                self.advance();
                let node = self.parse_expression()?;
                self.expect(&Token::RParen, "`)`")?;
                Ok(node)
            }
            Token::LBracket => {
                self.advance();
                let (items, height) = self.parse_list(&Token::RBracket, "`,` or `]`")?;
                self.branch(Expr::Array(items), height, position)
            }
            Token::LBrace => {
                self.advance();
                self.with_nesting(position, |parser| parser.parse_object(position))
            }
            other => Err(ExprError::UnexpectedToken {
                expected: "an expression",
                found: other.describe(),
                position,
            }),
        }
    }

    /// Comma-separated expressions up to `close`, with the tallest item's
    /// height. The opener is consumed.
    fn parse_list(
        &mut self,
        close: &Token<'a>,
        expected: &'static str,
    ) -> Result<(Vec<Expr>, usize)> {
        let mut items = Vec::new();
        let mut height = 0;
        if self.matches(close) {
            return Ok((items, height));
        }
        loop {
            let item = self.parse_expression()?;
            height = height.max(item.height);
            items.push(item.expr);
            if self.matches(close) {
                return Ok((items, height));
            }
            if !self.matches(&Token::Comma) {
                return Err(self.unexpected(expected));
            }
            // Trailing comma.
            if self.matches(close) {
                return Ok((items, height));
            }
        }
    }

    fn parse_object(&mut self, position: usize) -> Result<Node> {
        let mut entries = Vec::new();
        let mut height = 0;
        if !self.matches(&Token::RBrace) {
            loop {
                let key = match self.current().token.clone() {
                    Token::Str(s) => s,
                    Token::Ident(name) => name.to_string(),
                    _ => return Err(self.unexpected("an object key")),
                };
                self.advance();
                self.expect(&Token::Colon, "`:`")?;
                let value = self.parse_expression()?;
                height = height.max(value.height);
                entries.push((key, value.expr));
                if self.matches(&Token::RBrace) {
                    break;
                }
                if !self.matches(&Token::Comma) {
                    return Err(self.unexpected("`,` or `}`"));
                }
            }
        }
        self.branch(Expr::Object(entries), height, position)
    }

    fn with_nesting<T>(
        &mut self,
        position: usize,
        parse: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.nesting >= self.max_depth {
            return Err(ExprError::NestingTooDeep {
                max_depth: self.max_depth,
                position,
            });
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    /// Wrap `expr` as a node one level above its tallest child.
    fn branch(&self, expr: Expr, children: usize, position: usize) -> Result<Node> {
        let height = children + 1;
        if height > MAX_TREE_HEIGHT {
            return Err(ExprError::NestingTooDeep {
                max_depth: MAX_TREE_HEIGHT,
                position,
            });
        }
        Ok(Node { expr, height })
    }

    fn binary(&self, op: BinaryOp, left: Node, right: Node, position: usize) -> Result<Node> {
        let children = left.height.max(right.height);
        let expr = Expr::Binary {
            op,
            left: Box::new(left.expr),
            right: Box::new(right.expr),
        };
        self.branch(expr, children, position)
    }

    fn logical(&self, op: LogicalOp, left: Node, right: Node, position: usize) -> Result<Node> {
        let children = left.height.max(right.height);
        let expr = Expr::Logical {
            op,
            left: Box::new(left.expr),
            right: Box::new(right.expr),
        };
        self.branch(expr, children, position)
    }

    fn current(&self) -> &SpannedToken<'a> {
        // The lexer always terminates the stream with Eof and the parser
        // never advances past it.
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    fn matches(&mut self, token: &Token<'a>) -> bool {
        if &self.current().token == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token<'a>, expected: &'static str) -> Result<()> {
        if self.matches(token) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        if let Token::Ident(name) = self.current().token {
            self.advance();
            Ok(name.to_string())
        } else {
            Err(self.unexpected("a property name"))
        }
    }

    fn unexpected(&self, expected: &'static str) -> ExprError {
        ExprError::UnexpectedToken {
            expected,
            found: self.current().token.describe(),
            position: self.current().position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(input: &str) -> Result<Expr> {
        parse(input, &Limits::default())
    }

    fn num(n: f64) -> Expr {
        Expr::Literal(Value::Number(n))
    }

    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn precedence_multiplication_binds_tighter() {
        assert_eq!(
            p("1 + 2 * 3").unwrap(),
            binary(BinaryOp::Add, num(1.0), binary(BinaryOp::Mul, num(2.0), num(3.0)))
        );
    }

    #[test]
    fn left_associative_subtraction() {
        assert_eq!(
            p("10 - 4 - 3").unwrap(),
            binary(BinaryOp::Sub, binary(BinaryOp::Sub, num(10.0), num(4.0)), num(3.0))
        );
    }

    #[test]
    fn ternary_nests_right() {
        let expr = p("a ? 1 : b ? 2 : 3").unwrap();
        let Expr::Conditional { alternate, .. } = expr else {
            panic!("expected conditional");
        };
        assert!(matches!(*alternate, Expr::Conditional { .. }));
    }

    #[test]
    fn member_index_and_call_chain() {
        let expr = p("data.tags[0].toUpperCase()").unwrap();
        let Expr::Call { callee, args } = expr else {
            panic!("expected call");
        };
        assert!(args.is_empty());
        assert!(matches!(*callee, Expr::Member { ref property, .. } if property == "toUpperCase"));
    }

    #[test]
    fn return_prefix_and_semicolons_are_accepted() {
        assert_eq!(p("return value > 0;").unwrap(), p("value > 0").unwrap());
        assert_eq!(p("1;;").unwrap(), num(1.0));
    }

    #[test]
    fn literals() {
        assert_eq!(p("null").unwrap(), Expr::Literal(Value::Null));
        assert_eq!(p("undefined").unwrap(), Expr::Literal(Value::Null));
        assert_eq!(p("true").unwrap(), Expr::Literal(Value::Bool(true)));
        assert_eq!(
            p("[1, 'a',]").unwrap(),
            Expr::Array(vec![num(1.0), Expr::Literal(Value::from("a"))])
        );
        assert_eq!(
            p(r#"{"street": "Main", zip: 5}"#).unwrap(),
            Expr::Object(vec![
                ("street".into(), Expr::Literal(Value::from("Main"))),
                ("zip".into(), num(5.0)),
            ])
        );
    }

    #[test]
    fn unresolved_placeholder_is_a_parse_error() {
        assert!(p("{price} * 2").is_err());
    }

    #[test]
    fn trailing_input_is_rejected() {
        assert_eq!(
            p("1 2").unwrap_err(),
            ExprError::TrailingInput { position: 2 }
        );
    }

    #[test]
    fn missing_close_paren_reports_position() {
        let err = p("SUM(1, 2").unwrap_err();
        assert!(matches!(err, ExprError::UnexpectedToken { position: 8, .. }));
    }

    #[test]
    fn nesting_limit_enforced() {
        let limits = Limits {
            max_input_bytes: 1024,
            max_depth: 4,
        };
        assert!(parse("((1))", &limits).is_ok());
        assert!(matches!(
            parse("((((((1))))))", &limits),
            Err(ExprError::NestingTooDeep { max_depth: 4, .. })
        ));
        assert!(matches!(
            parse("!!!!!!!!true", &limits),
            Err(ExprError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn long_operator_chains_are_bounded() {
        let ok = vec!["1"; 200].join(" + ");
        assert!(p(&ok).is_ok());
        let too_long = vec!["1"; 300].join(" + ");
        assert!(matches!(
            p(&too_long),
            Err(ExprError::NestingTooDeep {
                max_depth: MAX_TREE_HEIGHT,
                ..
            })
        ));
    }

    #[test]
    fn chains_across_precedence_levels_count_toward_height() {
        // Each level stays short on its own but the left spine grows through all of them.
        let mut source = String::from("(value)");
        for op in ["*", "+", "<", "&&", "||"] {
            source.push_str(&format!("{op}1").repeat(128));
        }
        assert!(source.len() < 2048);
        assert!(matches!(
            p(&source),
            Err(ExprError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn chains_inside_groups_count_toward_height() {
        let inner = vec!["x"; 100].join(" * ");
        let source = format!("({inner}) + ({inner}) * (({inner}) + ({inner}) * ({inner}))");
        assert!(p(&source).is_ok());
        let nested = (0..4).fold(inner.clone(), |acc, _| format!("({acc}) * {inner}"));
        assert!(matches!(
            p(&nested),
            Err(ExprError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn configured_depth_is_capped() {
        let limits = Limits {
            max_input_bytes: 1024 * 1024,
            max_depth: usize::MAX,
        };
        let source = format!("{}1{}", "(".repeat(5_000), ")".repeat(5_000));
        assert!(matches!(
            parse(&source, &limits),
            Err(ExprError::NestingTooDeep {
                max_depth: NESTING_CEILING,
                ..
            })
        ));
    }

    #[test]
    fn size_limit_enforced() {
        let limits = Limits {
            max_input_bytes: 8,
            max_depth: 32,
        };
        assert_eq!(
            parse("1 + 2 + 3 + 4", &limits).unwrap_err(),
            ExprError::InputTooLarge {
                max_bytes: 8,
                actual_bytes: 13
            }
        );
    }
}
