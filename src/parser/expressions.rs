//! Expression parsing implementation
//!
//! Precedence tiers, loosest first:
//!
//! ```text
//! assignment  ::= conditional [ assign_op conditional ]
//! conditional ::= log_or [ "?" expression ":" assignment ]
//! log_or      ::= log_and ( ("||" | "or") log_and )*
//! log_and     ::= bin_or ( ("&&" | "and") bin_or )*
//! bin_or      ::= bin_xor ( "|" bin_xor )*
//! bin_xor     ::= bin_and ( "^" bin_and )*
//! bin_and     ::= equality ( "&" equality )*
//! equality    ::= relational ( ("==" | "!=") relational )*
//! relational  ::= shift ( ("<" | "<=" | ">" | ">=") shift )*
//! shift       ::= additive ( ("<<" | ">>") additive )*
//! additive    ::= multiplicative ( ("+" | "-") multiplicative )*
//! multiplicative ::= unary ( ("*" | "/" | "%" | "**") unary )*
//! unary       ::= ("!" | "not" | "-" | "~" | "++" | "--") unary | postfix
//! postfix     ::= primary ( "++" | "--" | "(" args ")" | "[" expression "]" | "." NAME )*
//! primary     ::= INTEGER | FLOAT | STRING | NAME | "true" | "false" | "null"
//!               | "(" expression ")" | "[" [ expression ( "," expression )* ] "]"
//! ```
//!
//! The ten binary tiers are parsed by precedence climbing over
//! [`binary_op`]: one method handles every tier, and each operand only
//! descends into strictly tighter tiers. All binary tiers are
//! left-associative.

use crate::parser::ast::*;
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::parse::{ParseError, Parser};

/// Loosest binary precedence
const LOWEST_PRECEDENCE: u8 = 1;

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::LeftShiftAssign => AssignOp::LeftShiftAssign,
        TokenKind::RightShiftAssign => AssignOp::RightShiftAssign,
        TokenKind::PlusAssign => AssignOp::PlusAssign,
        TokenKind::MinusAssign => AssignOp::MinusAssign,
        TokenKind::MultiplyAssign => AssignOp::MultiplyAssign,
        TokenKind::PowAssign => AssignOp::PowAssign,
        TokenKind::DivideAssign => AssignOp::DivideAssign,
        TokenKind::ModuloAssign => AssignOp::ModuloAssign,
        TokenKind::BinAndAssign => AssignOp::BinAndAssign,
        TokenKind::BinOrAssign => AssignOp::BinOrAssign,
        TokenKind::BinXorAssign => AssignOp::BinXorAssign,
        TokenKind::BinNotAssign => AssignOp::BinNotAssign,
        _ => return None,
    };
    Some(op)
}

/// Binary operator for `kind` with its precedence; higher binds tighter
fn binary_op(kind: TokenKind) -> Option<(BinOp, u8)> {
    let entry = match kind {
        TokenKind::LogOr => (BinOp::LogOr, 1),
        TokenKind::LogAnd => (BinOp::LogAnd, 2),
        TokenKind::BinOr => (BinOp::BinOr, 3),
        TokenKind::BinXor => (BinOp::BinXor, 4),
        TokenKind::BinAnd => (BinOp::BinAnd, 5),
        TokenKind::Equal => (BinOp::Equal, 6),
        TokenKind::NotEqual => (BinOp::NotEqual, 6),
        TokenKind::Lesser => (BinOp::Lesser, 7),
        TokenKind::LesserEqual => (BinOp::LesserEqual, 7),
        TokenKind::Greater => (BinOp::Greater, 7),
        TokenKind::GreaterEqual => (BinOp::GreaterEqual, 7),
        TokenKind::LeftShift => (BinOp::LeftShift, 8),
        TokenKind::RightShift => (BinOp::RightShift, 8),
        TokenKind::Plus => (BinOp::Plus, 9),
        TokenKind::Minus => (BinOp::Minus, 9),
        TokenKind::Multiply => (BinOp::Multiply, 10),
        TokenKind::Divide => (BinOp::Divide, 10),
        TokenKind::Modulo => (BinOp::Modulo, 10),
        TokenKind::Pow => (BinOp::Pow, 10),
        _ => return None,
    };
    Some(entry)
}

fn prefix_op(kind: TokenKind) -> Option<UnOp> {
    let op = match kind {
        TokenKind::LogNot => UnOp::Not,
        TokenKind::Minus => UnOp::Neg,
        TokenKind::BinNot => UnOp::BitNot,
        TokenKind::Increment => UnOp::PreIncrement,
        TokenKind::Decrement => UnOp::PreDecrement,
        _ => return None,
    };
    Some(op)
}

/// Literal for a token that starts a primary expression
fn literal(token: &Token) -> Result<Literal, ParseError> {
    let literal = match token.kind {
        TokenKind::Integer => {
            let lexeme = token.lexeme();
            let value = lexeme.parse::<i32>().map_err(|_| ParseError::InvalidNumber {
                lexeme: lexeme.to_string(),
                location: token.location,
            })?;
            Literal::Integer(value)
        }
        TokenKind::Float => {
            let lexeme = token.lexeme();
            let value = lexeme
                .parse::<f32>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| ParseError::InvalidNumber {
                    lexeme: lexeme.to_string(),
                    location: token.location,
                })?;
            Literal::Float(value)
        }
        TokenKind::String => Literal::String(token.lexeme().to_string()),
        TokenKind::Identifier => Literal::Identifier(token.lexeme().to_string()),
        TokenKind::True => Literal::Boolean(true),
        TokenKind::False => Literal::Boolean(false),
        TokenKind::Null => Literal::Null,
        found => {
            return Err(ParseError::ExpectedExpression {
                found,
                location: token.location,
            })
        }
    };
    Ok(literal)
}

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_assignment()
    }

    /// Constant expression: the conditional tier, used for case labels and
    /// parameter defaults
    pub(crate) fn parse_const_expression(&mut self) -> Result<Expression, ParseError> {
        self.nested(Self::parse_conditional)
    }

    /// Parse assignment; at most one operator, the right side is a conditional
    fn parse_assignment(&mut self) -> Result<Expression, ParseError> {
        self.nested(|parser| {
            let target = parser.parse_conditional()?;

            let Some(op) = assign_op(parser.peek().kind) else {
                return Ok(target);
            };

            if target.is_condition() {
                return Err(ParseError::ConditionAssignmentStatementMixed {
                    location: parser.current_location(),
                });
            }

            parser.advance()?;
            let value = parser.parse_conditional()?;

            Ok(Expression::Assignment {
                op,
                target: Box::new(target),
                value: Box::new(value),
            })
        })
    }

    /// Parse ternary: condition ? then_expr : else_expr
    fn parse_conditional(&mut self) -> Result<Expression, ParseError> {
        let condition = self.parse_binary(LOWEST_PRECEDENCE)?;

        if !self.match_token(TokenKind::QuestionMark)? {
            return Ok(condition);
        }

        let then_expr = self.parse_assignment()?;
        self.expect_token(TokenKind::Colon)?;
        let else_expr = self.parse_assignment()?;

        Ok(Expression::Condition {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    /// Parse binary operators binding at least as tight as `min_precedence`
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expression, ParseError> {
        let mut chain = self.open_chain();
        let mut left = self.parse_unary()?;

        while let Some((op, precedence)) = binary_op(self.peek().kind) {
            if precedence < min_precedence {
                break;
            }

            let location = self.current_location();
            self.advance()?;
            let right = self.parse_binary(precedence + 1)?;
            self.extend_chain(&mut chain, location)?;

            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.close_chain(chain);
        Ok(left)
    }

    /// Parse prefix operators: `!`, `not`, `-`, `~`, `++`, `--`
    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let Some(op) = prefix_op(self.peek().kind) else {
            return self.parse_postfix();
        };

        self.advance()?;
        let operand = self.nested(Self::parse_unary)?;

        Ok(Expression::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// Parse postfix chain: `++`, `--`, calls, indexing, member access
    fn parse_postfix(&mut self) -> Result<Expression, ParseError> {
        let mut chain = self.open_chain();
        let mut expr = self.parse_primary()?;

        loop {
            let location = self.current_location();
            expr = match self.peek().kind {
                TokenKind::Increment => {
                    self.advance()?;
                    Expression::Unary {
                        op: UnOp::PostIncrement,
                        operand: Box::new(expr),
                    }
                }
                TokenKind::Decrement => {
                    self.advance()?;
                    Expression::Unary {
                        op: UnOp::PostDecrement,
                        operand: Box::new(expr),
                    }
                }
                TokenKind::OpenParen => {
                    self.advance()?;
                    let arguments = self.parse_expression_list(TokenKind::CloseParen)?;
                    Expression::Call {
                        callee: Box::new(expr),
                        arguments,
                    }
                }
                TokenKind::OpenBracket => {
                    self.advance()?;
                    let index = self.parse_assignment()?;
                    self.expect_token(TokenKind::CloseBracket)?;
                    Expression::ArrayAccess {
                        array: Box::new(expr),
                        index: Box::new(index),
                    }
                }
                TokenKind::Period => {
                    self.advance()?;
                    let member = self.expect_identifier()?;
                    Expression::MemberAccess {
                        object: Box::new(expr),
                        member,
                    }
                }
                _ => break,
            };
            self.extend_chain(&mut chain, location)?;
        }

        self.close_chain(chain);
        Ok(expr)
    }

    /// Parse primary expression: literals, identifiers, groups, array literals
    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        match self.peek().kind {
            TokenKind::OpenParen => {
                self.advance()?;
                let expr = self.parse_assignment()?;
                self.expect_token(TokenKind::CloseParen)?;
                Ok(expr)
            }
            TokenKind::OpenBracket => {
                self.advance()?;
                let elements = self.parse_expression_list(TokenKind::CloseBracket)?;
                Ok(Expression::Array(elements))
            }
            _ => {
                let value = literal(self.peek())?;
                self.advance()?;
                Ok(Expression::Literal(value))
            }
        }
    }

    /// Comma-separated expressions up to and including `close`
    fn parse_expression_list(&mut self, close: TokenKind) -> Result<Vec<Expression>, ParseError> {
        let mut items = Vec::new();

        if self.match_token(close)? {
            return Ok(items);
        }

        loop {
            items.push(self.parse_assignment()?);
            if !self.match_token(TokenKind::Comma)? {
                break;
            }
        }

        self.expect_token(close)?;
        Ok(items)
    }
}
