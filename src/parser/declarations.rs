//! Declaration parsing implementation
//!
//! This module handles the declaring statements:
//!
//! - Function declarations: `function name(params) { ... }` or `function name(params);`
//! - Imports: `import a.b.*;`
//! - Variables and constants: `var "name" = expr;`, `const "name" = expr;`
//!
//! # Grammar
//!
//! ```text
//! function_decl ::= "function" NAME "(" [ param ( "," param )* ] ")" ( ";" | body )
//! param         ::= NAME [ "=" const_expr ] | "..."
//! import_decl   ::= "import" NAME ( "." ( NAME | "*" ) )* ";"
//! var_decl      ::= ( "var" | "const" ) STRING "=" expression ";"
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse function declaration or forward declaration
    pub(crate) fn parse_function_statement(&mut self) -> Result<FunctionStatement, ParseError> {
        self.expect_token(TokenKind::Function)?;
        let name = self.expect_identifier()?;

        self.expect_token(TokenKind::OpenParen)?;
        let parameters = self.parse_parameters()?;
        self.expect_token(TokenKind::CloseParen)?;

        let body = if self.match_token(TokenKind::Semicolon)? {
            None
        } else {
            Some(self.parse_body()?)
        };

        Ok(FunctionStatement {
            name,
            parameters,
            body,
        })
    }

    /// Parse parameter list (without the parentheses)
    fn parse_parameters(&mut self) -> Result<Vec<FunctionParameter>, ParseError> {
        let mut parameters = Vec::new();
        let mut seen_variadic = false;
        let mut seen_default = false;

        if self.check(TokenKind::CloseParen) {
            return Ok(parameters);
        }

        loop {
            let location = self.current_location();

            if self.match_token(TokenKind::Ellipses)? {
                if seen_variadic {
                    return Err(ParseError::EllipsesInvalidCount { location });
                }
                seen_variadic = true;
                parameters.push(FunctionParameter::Variadic);
            } else {
                if seen_variadic && self.check(TokenKind::Identifier) {
                    return Err(ParseError::EllipsesNotLast { location });
                }

                let name = self.expect_identifier()?;
                let default = if self.match_token(TokenKind::Assign)? {
                    seen_default = true;
                    Some(self.parse_const_expression()?)
                } else if seen_default {
                    return Err(ParseError::NonDefaultAfterDefault {
                        parameter: name,
                        location,
                    });
                } else {
                    None
                };

                parameters.push(FunctionParameter::Named { name, default });
            }

            if !self.match_token(TokenKind::Comma)? {
                break;
            }
        }

        Ok(parameters)
    }

    /// Parse import path
    pub(crate) fn parse_import_statement(&mut self) -> Result<ImportStatement, ParseError> {
        self.expect_token(TokenKind::Import)?;

        let mut path = vec![ImportSegment::Name(self.expect_identifier()?)];

        while self.check(TokenKind::Period) {
            if path.last() == Some(&ImportSegment::Wildcard) {
                return Err(ParseError::EntryAfterAllAccess {
                    location: self.current_location(),
                });
            }
            self.advance()?;

            if self.match_token(TokenKind::Multiply)? {
                path.push(ImportSegment::Wildcard);
            } else {
                path.push(ImportSegment::Name(self.expect_identifier()?));
            }
        }

        self.expect_token(TokenKind::Semicolon)?;
        Ok(ImportStatement { path })
    }

    /// Parse `var`/`const` declaration including the trailing `;`
    pub(crate) fn parse_declaration_statement(
        &mut self,
    ) -> Result<DeclarationExpression, ParseError> {
        let is_const = if self.match_token(TokenKind::Const)? {
            true
        } else {
            self.expect_token(TokenKind::Var)?;
            false
        };

        let name = self
            .expect_token(TokenKind::String)?
            .lexeme
            .unwrap_or_default();
        self.expect_token(TokenKind::Assign)?;
        let initializer = self.parse_expression()?;
        self.expect_token(TokenKind::Semicolon)?;

        Ok(DeclarationExpression {
            name,
            initializer,
            is_const,
        })
    }
}
