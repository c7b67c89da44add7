//! Statement parsing implementation
//!
//! This module handles statement dispatch and the control-flow statements:
//!
//! - Control flow: `if`, `switch`, `for`, `for-in`, `while`, `do-while`
//! - Jump statements: `return`, `break`, `continue`
//! - Expression statements and the empty statement `;`
//! - Bodies: `{ ... }` or a single statement
//!
//! # Grammar
//!
//! ```text
//! statement ::= function_decl | import_decl | var_decl | if_stmt | switch_stmt
//!             | for_stmt | foreach_stmt | while_stmt | do_while_stmt
//!             | return_stmt | break_stmt | continue_stmt | ";" | expr_stmt
//! return_stmt  ::= "return" expression ( ":" expression )* ";"
//! foreach_stmt ::= "for" "(" NAME "in" expression ")" body
//! for_stmt     ::= "for" "(" [ var_decl | expression ";" | ";" ] [ expression ] ";" [ expression ] ")" body
//! body         ::= "{" statement* "}" | statement
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse statements until `}` or end of input
    pub(crate) fn parse_block_statements(&mut self) -> Result<Compound, ParseError> {
        let mut compound = Compound::default();

        while !self.check(TokenKind::CloseBrace) && !self.is_at_end() {
            if let Some(statement) = self.parse_statement()? {
                compound.statements.push(statement);
            }
        }

        Ok(compound)
    }

    /// Parse a statement; `None` for the empty statement
    pub(crate) fn parse_statement(&mut self) -> Result<Option<Statement>, ParseError> {
        let statement = match self.peek().kind {
            TokenKind::Semicolon => {
                self.advance()?;
                return Ok(None);
            }
            TokenKind::Function => Statement::Function(self.parse_function_statement()?),
            TokenKind::Import => Statement::Import(self.parse_import_statement()?),
            TokenKind::Var | TokenKind::Const => {
                Statement::Declaration(self.parse_declaration_statement()?)
            }
            TokenKind::Break => {
                self.advance()?;
                self.expect_token(TokenKind::Semicolon)?;
                Statement::Break
            }
            TokenKind::Continue => {
                self.advance()?;
                self.expect_token(TokenKind::Semicolon)?;
                Statement::Continue
            }
            TokenKind::Return => self.parse_return_statement()?,
            TokenKind::If => Statement::If(self.parse_if_statement()?),
            TokenKind::Switch => Statement::Switch(self.parse_switch_statement()?),
            TokenKind::For => self.parse_for_statement()?,
            TokenKind::While => Statement::While(self.parse_while_statement()?),
            TokenKind::Do => Statement::DoWhile(self.parse_do_while_statement()?),
            _ => {
                let expr = self.parse_expression()?;
                self.expect_token(TokenKind::Semicolon)?;
                Statement::Expression(expr)
            }
        };

        Ok(Some(statement))
    }

    /// Parse body: a braced block or a single statement
    pub(crate) fn parse_body(&mut self) -> Result<Compound, ParseError> {
        self.nested(|parser| {
            if parser.match_token(TokenKind::OpenBrace)? {
                let compound = parser.parse_block_statements()?;
                parser.expect_token(TokenKind::CloseBrace)?;
                return Ok(compound);
            }

            let statements = parser.parse_statement()?.into_iter().collect();
            Ok(Compound::new(statements))
        })
    }

    /// `( expression )` after `if`, `while`, `switch`
    fn parse_parenthesized(&mut self) -> Result<Expression, ParseError> {
        self.expect_token(TokenKind::OpenParen)?;
        let expr = self.parse_expression()?;
        self.expect_token(TokenKind::CloseParen)?;
        Ok(expr)
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect_token(TokenKind::Return)?;

        let mut values = vec![self.parse_expression()?];
        while self.match_token(TokenKind::Colon)? {
            values.push(self.parse_expression()?);
        }

        self.expect_token(TokenKind::Semicolon)?;
        Ok(Statement::Return(values))
    }

    /// Parse if statement; `else if` chains are read iteratively
    fn parse_if_statement(&mut self) -> Result<IfStatement, ParseError> {
        let mut chain = Vec::new();
        let mut else_body = None;

        loop {
            self.expect_token(TokenKind::If)?;
            let condition = self.parse_parenthesized()?;
            let body = self.parse_body()?;
            chain.push((condition, body));

            if !self.match_token(TokenKind::Else)? {
                break;
            }
            if !self.check(TokenKind::If) {
                else_body = Some(self.parse_body()?);
                break;
            }
        }

        let mut else_branch = else_body.map(ElseBranch::Else);
        let mut node = None;
        while let Some((condition, body)) = chain.pop() {
            if let Some(inner) = node.take() {
                else_branch = Some(ElseBranch::ElseIf(Box::new(inner)));
            }
            node = Some(IfStatement {
                condition,
                body,
                else_branch: else_branch.take(),
            });
        }

        node.ok_or_else(|| self.wrong_token(TokenKind::If))
    }

    /// Parse switch statement
    fn parse_switch_statement(&mut self) -> Result<SwitchStatement, ParseError> {
        self.expect_token(TokenKind::Switch)?;
        let subject = self.parse_parenthesized()?;
        self.expect_token(TokenKind::OpenBrace)?;

        let mut cases = Vec::new();
        let mut default = None;

        while !self.check(TokenKind::CloseBrace) && !self.is_at_end() {
            if self.match_token(TokenKind::Case)? {
                let const_expr = self.parse_const_expression()?;
                self.expect_token(TokenKind::Colon)?;
                let body = self.parse_case_body()?;
                cases.push(CaseLine { const_expr, body });
            } else if self.check(TokenKind::Default) {
                if default.is_some() {
                    return Err(ParseError::MultipleDefaults {
                        location: self.current_location(),
                    });
                }
                self.advance()?;
                self.expect_token(TokenKind::Colon)?;
                default = Some(self.parse_case_body()?);
            } else {
                return Err(self.wrong_token(TokenKind::Case));
            }
        }

        self.expect_token(TokenKind::CloseBrace)?;

        Ok(SwitchStatement {
            subject,
            cases,
            default,
        })
    }

    /// Statements of one `case`/`default` block, up to the next label or `}`
    fn parse_case_body(&mut self) -> Result<Compound, ParseError> {
        self.nested(|parser| {
            let mut compound = Compound::default();

            while !parser.check(TokenKind::Case)
                && !parser.check(TokenKind::Default)
                && !parser.check(TokenKind::CloseBrace)
                && !parser.is_at_end()
            {
                if let Some(statement) = parser.parse_statement()? {
                    compound.statements.push(statement);
                }
            }

            Ok(compound)
        })
    }

    /// Parse `for` or `for-in`, told apart by `NAME in` after the parenthesis
    fn parse_for_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect_token(TokenKind::For)?;
        self.expect_token(TokenKind::OpenParen)?;

        if self.check(TokenKind::Identifier) && self.peek_ahead(1)? == TokenKind::In {
            let binding = self.expect_identifier()?;
            self.expect_token(TokenKind::In)?;
            let source = self.parse_expression()?;
            self.expect_token(TokenKind::CloseParen)?;
            let body = self.parse_body()?;

            return Ok(Statement::ForEach(ForEachStatement {
                binding,
                source,
                body,
            }));
        }

        // Init (optional); a declaration consumes its own `;`
        let init = match self.peek().kind {
            TokenKind::Semicolon => {
                self.advance()?;
                None
            }
            TokenKind::Var | TokenKind::Const => {
                Some(ForInit::Declaration(self.parse_declaration_statement()?))
            }
            _ => {
                let expr = self.parse_expression()?;
                self.expect_token(TokenKind::Semicolon)?;
                Some(ForInit::Expression(expr))
            }
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_token(TokenKind::Semicolon)?;

        let increment = if self.check(TokenKind::CloseParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_token(TokenKind::CloseParen)?;

        let body = self.parse_body()?;

        Ok(Statement::For(ForStatement {
            init,
            condition,
            increment,
            body,
        }))
    }

    /// Parse while statement
    fn parse_while_statement(&mut self) -> Result<WhileStatement, ParseError> {
        self.expect_token(TokenKind::While)?;
        let condition = self.parse_parenthesized()?;
        let body = self.parse_body()?;

        Ok(WhileStatement { condition, body })
    }

    /// Parse do-while statement
    fn parse_do_while_statement(&mut self) -> Result<DoWhileStatement, ParseError> {
        self.expect_token(TokenKind::Do)?;
        let body = self.parse_body()?;
        self.expect_token(TokenKind::While)?;
        let condition = self.parse_parenthesized()?;
        self.expect_token(TokenKind::Semicolon)?;

        Ok(DoWhileStatement { body, condition })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::constants::DEFAULT_MAX_NESTING_DEPTH;
    use crate::parser::lexer::TokenKind;
    use crate::parser::parse::{ParseError, Parser};

    fn parse(source: &str) -> Result<SyntaxTree, ParseError> {
        Parser::new(source)?.parse_program()
    }

    fn single(source: &str) -> Statement {
        let tree = parse(source).unwrap();
        assert_eq!(tree.statements().len(), 1, "{source}");
        tree.root.statements.into_iter().next().unwrap()
    }

    fn id(name: &str) -> Expression {
        Expression::identifier(name)
    }

    #[test]
    fn test_if_else_if_chain() {
        let Statement::If(stmt) = single("if (a) x; else if (b) y; else if (c) z; else w;") else {
            panic!("Expected if statement");
        };

        assert_eq!(stmt.condition, id("a"));
        assert!(stmt.else_body().is_none());
        let second = stmt.else_if().unwrap();
        assert_eq!(second.condition, id("b"));
        let third = second.else_if().unwrap();
        assert_eq!(third.condition, id("c"));
        assert!(third.else_if().is_none());
        assert_eq!(
            third.else_body().unwrap().statements,
            vec![Statement::Expression(id("w"))]
        );
    }

    #[test]
    fn test_if_without_else() {
        let Statement::If(stmt) = single("if (a) { x; y; }") else {
            panic!("Expected if statement");
        };
        assert_eq!(stmt.body.len(), 2);
        assert!(stmt.else_branch.is_none());
    }

    #[test]
    fn test_long_else_if_chain() {
        let mut source = String::from("if (x == 0) a;");
        for i in 1..2000 {
            source.push_str(&format!(" else if (x == {i}) a;"));
        }
        assert!(parse(&source).is_ok());
    }

    #[test]
    fn test_very_long_else_if_chain_compares_and_drops() {
        let source = format!("if (a) x;{} else y;", " else if (a) x;".repeat(50_000));
        let first = parse(&source).unwrap();
        let second = parse(&source).unwrap();
        assert!(first == second);

        let shorter = format!("if (a) x;{} else y;", " else if (a) x;".repeat(49_999));
        assert!(parse(&shorter).unwrap() != first);
    }

    #[test]
    fn test_switch() {
        let source = "switch (x) { case 1: a; b; case 2: default: c; }";
        let Statement::Switch(stmt) = single(source) else {
            panic!("Expected switch statement");
        };

        assert_eq!(stmt.subject, id("x"));
        assert_eq!(stmt.cases.len(), 2);
        assert_eq!(stmt.cases[0].const_expr, Expression::integer(1));
        assert_eq!(stmt.cases[0].body.len(), 2);
        assert!(stmt.cases[1].body.is_empty());
        assert_eq!(stmt.default.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_switch_multiple_defaults() {
        let err = parse("switch (x) { default: a; case 1: b; default: c; }").unwrap_err();
        assert_eq!(
            err,
            ParseError::MultipleDefaults {
                location: SourceLocation::new(1, 37),
            }
        );
    }

    #[test]
    fn test_second_default_reported_before_its_body() {
        let err = parse("switch (x) { default: a; default: b = ; }").unwrap_err();
        assert_eq!(
            err,
            ParseError::MultipleDefaults {
                location: SourceLocation::new(1, 26),
            }
        );
    }

    #[test]
    fn test_switch_requires_labels() {
        let err = parse("switch (x) { a; }").unwrap_err();
        assert!(matches!(
            err,
            ParseError::WrongToken {
                expected: TokenKind::Case,
                found: TokenKind::Identifier,
                ..
            }
        ));
    }

    #[test]
    fn test_foreach() {
        let stmt = single("for (x in list) { break; }");
        assert_eq!(
            stmt,
            Statement::ForEach(ForEachStatement {
                binding: "x".to_string(),
                source: id("list"),
                body: Compound::new(vec![Statement::Break]),
            })
        );
    }

    #[test]
    fn test_classic_for() {
        let Statement::For(stmt) = single("for (var \"i\" = 0; i < 10; i++) continue;") else {
            panic!("Expected for statement");
        };

        assert!(matches!(stmt.init, Some(ForInit::Declaration(ref decl)) if decl.name == "i"));
        assert!(stmt.condition.is_some());
        assert!(stmt.increment.is_some());
        assert_eq!(stmt.body.statements, vec![Statement::Continue]);
    }

    #[test]
    fn test_for_with_expression_init() {
        let Statement::For(stmt) = single("for (i = 0; ; ) x;") else {
            panic!("Expected for statement");
        };
        assert!(matches!(stmt.init, Some(ForInit::Expression(_))));
        assert!(stmt.condition.is_none());
        assert!(stmt.increment.is_none());
    }

    #[test]
    fn test_for_all_clauses_empty() {
        let stmt = single("for (;;) {}");
        assert_eq!(
            stmt,
            Statement::For(ForStatement {
                init: None,
                condition: None,
                increment: None,
                body: Compound::default(),
            })
        );
    }

    #[test]
    fn test_for_identifier_not_followed_by_in() {
        let Statement::For(stmt) = single("for (x; x; x) {}") else {
            panic!("Expected for statement");
        };
        assert_eq!(stmt.init, Some(ForInit::Expression(id("x"))));
    }

    #[test]
    fn test_while_and_do_while() {
        assert_eq!(
            single("while (a) ;"),
            Statement::While(WhileStatement {
                condition: id("a"),
                body: Compound::default(),
            })
        );
        assert_eq!(
            single("do { a; } while (b);"),
            Statement::DoWhile(DoWhileStatement {
                body: Compound::new(vec![Statement::Expression(id("a"))]),
                condition: id("b"),
            })
        );
    }

    #[test]
    fn test_do_while_requires_semicolon() {
        assert!(matches!(
            parse("do a; while (b)").unwrap_err(),
            ParseError::WrongToken {
                expected: TokenKind::Semicolon,
                found: TokenKind::Eof,
                ..
            }
        ));
    }

    #[test]
    fn test_return_list() {
        assert_eq!(
            single("return a : b : 1;"),
            Statement::Return(vec![id("a"), id("b"), Expression::integer(1)])
        );
    }

    #[test]
    fn test_return_needs_expression() {
        assert!(matches!(
            parse("return;").unwrap_err(),
            ParseError::ExpectedExpression {
                found: TokenKind::Semicolon,
                ..
            }
        ));
    }

    #[test]
    fn test_break_needs_semicolon() {
        assert!(matches!(
            parse("break").unwrap_err(),
            ParseError::WrongToken {
                expected: TokenKind::Semicolon,
                ..
            }
        ));
    }

    #[test]
    fn test_unclosed_block() {
        assert!(matches!(
            parse("while (a) { b;").unwrap_err(),
            ParseError::WrongToken {
                expected: TokenKind::CloseBrace,
                found: TokenKind::Eof,
                ..
            }
        ));
    }

    #[test]
    fn test_deeply_nested_bodies() {
        let source = format!("{}x;", "while (a) ".repeat(500));
        assert!(matches!(
            parse(&source).unwrap_err(),
            ParseError::NestingTooDeep {
                limit: DEFAULT_MAX_NESTING_DEPTH,
                ..
            }
        ));
    }

    #[test]
    fn test_deepest_accepted_bodies() {
        // Each body takes one level, the innermost expression one more
        let source = format!("{}x;", "while (a) ".repeat(DEFAULT_MAX_NESTING_DEPTH - 1));
        assert!(parse(&source).is_ok());

        let source = format!("{}x;", "while (a) ".repeat(DEFAULT_MAX_NESTING_DEPTH));
        assert!(matches!(
            parse(&source).unwrap_err(),
            ParseError::NestingTooDeep { .. }
        ));
    }
}
