//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, configuration, helper methods, and the main parse
//! entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: functions, imports and `var`/`const` declarations
//! - `statements`: control flow and statement dispatch
//! - `expressions`: assignment, conditional, precedence climbing, unary and postfix
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! The parser holds exactly one token of lookahead (`current`) and asks the
//! lexer to replay further tokens on demand through [`Lexer::look`].

use crate::parser::ast::*;
use crate::parser::constants::DEFAULT_MAX_NESTING_DEPTH;
use crate::parser::lexer::{LexError, Lexer, Token, TokenKind};
use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("Parse error at {location}: expected {expected}, found {found}")]
    WrongToken {
        expected: TokenKind,
        found: TokenKind,
        location: SourceLocation,
    },

    #[error("Parse error at {location}: only one '...' parameter is allowed")]
    EllipsesInvalidCount { location: SourceLocation },

    #[error("Parse error at {location}: '...' must be the last parameter")]
    EllipsesNotLast { location: SourceLocation },

    #[error("Parse error at {location}: parameter '{parameter}' needs a default value because an earlier parameter has one")]
    NonDefaultAfterDefault {
        parameter: String,
        location: SourceLocation,
    },

    #[error("Parse error at {location}: nothing may follow '*' in an import path")]
    EntryAfterAllAccess { location: SourceLocation },

    #[error("Parse error at {location}: switch statement has more than one default block")]
    MultipleDefaults { location: SourceLocation },

    #[error("Parse error at {location}: a conditional expression cannot be assigned to")]
    ConditionAssignmentStatementMixed { location: SourceLocation },

    #[error("Parse error at {location}: expected expression, found {found}")]
    ExpectedExpression {
        found: TokenKind,
        location: SourceLocation,
    },

    #[error("Parse error at {location}: number literal '{lexeme}' is out of range")]
    InvalidNumber {
        lexeme: String,
        location: SourceLocation,
    },

    #[error("Parse error at {location}: nesting deeper than {limit} levels")]
    NestingTooDeep {
        limit: usize,
        location: SourceLocation,
    },
}

impl ParseError {
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::Lex(err) => err.location(),
            ParseError::WrongToken { location, .. }
            | ParseError::EllipsesInvalidCount { location }
            | ParseError::EllipsesNotLast { location }
            | ParseError::NonDefaultAfterDefault { location, .. }
            | ParseError::EntryAfterAllAccess { location }
            | ParseError::MultipleDefaults { location }
            | ParseError::ConditionAssignmentStatementMixed { location }
            | ParseError::ExpectedExpression { location, .. }
            | ParseError::InvalidNumber { location, .. }
            | ParseError::NestingTooDeep { location, .. } => *location,
        }
    }

    /// Stable variant name, lexer errors report their own name
    pub fn name(&self) -> &'static str {
        match self {
            ParseError::Lex(err) => err.name(),
            ParseError::WrongToken { .. } => "WrongToken",
            ParseError::EllipsesInvalidCount { .. } => "EllipsesInvalidCount",
            ParseError::EllipsesNotLast { .. } => "EllipsesNotLast",
            ParseError::NonDefaultAfterDefault { .. } => "NonDefaultAfterDefault",
            ParseError::EntryAfterAllAccess { .. } => "EntryAfterAllAccess",
            ParseError::MultipleDefaults { .. } => "MultipleDefaults",
            ParseError::ConditionAssignmentStatementMixed { .. } => {
                "ConditionAssignmentStatementMixed"
            }
            ParseError::ExpectedExpression { .. } => "ExpectedExpression",
            ParseError::InvalidNumber { .. } => "InvalidNumber",
            ParseError::NestingTooDeep { .. } => "NestingTooDeep",
        }
    }
}

/// Tunables for a single parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    pub max_depth: usize,
}

impl ParserConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Recursive descent parser for script source
pub struct Parser {
    pub(crate) lexer: Lexer,
    pub(crate) current: Token,
    config: ParserConfig,
    depth: usize,
    /// Deepest level reached inside the innermost open operator chain
    peak: usize,
}

/// An operator chain being folded into a left-deep tree
pub(crate) struct Chain {
    outer_peak: usize,
    links: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        Self::with_config(source, ParserConfig::default())
    }

    pub fn with_config(source: &str, config: ParserConfig) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            config,
            depth: 0,
            peak: 0,
        })
    }

    /// Parse the entire program (top-level statement list)
    #[tracing::instrument(skip_all)]
    pub fn parse_program(&mut self) -> Result<SyntaxTree, ParseError> {
        let mut root = Compound::default();

        while !self.is_at_end() {
            if let Some(statement) = self.parse_statement()? {
                root.statements.push(statement);
            }
        }

        tracing::trace!(statements = root.len(), "parsed program");
        Ok(SyntaxTree::new(root))
    }

    // ===== Helper methods =====

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume the current token and return it
    pub(crate) fn advance(&mut self) -> Result<Token, ParseError> {
        if self.is_at_end() {
            return Ok(self.current.clone());
        }
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.current
    }

    /// Kind of the token `n` places after the current one
    pub(crate) fn peek_ahead(&mut self, n: usize) -> Result<TokenKind, ParseError> {
        Ok(self.lexer.look(n)?.kind)
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.current.location
    }

    pub(crate) fn expect_token(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(self.wrong_token(kind))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        let token = self.expect_token(TokenKind::Identifier)?;
        Ok(token.lexeme.unwrap_or_default())
    }

    pub(crate) fn wrong_token(&self, expected: TokenKind) -> ParseError {
        ParseError::WrongToken {
            expected,
            found: self.current.kind,
            location: self.current_location(),
        }
    }

    fn too_deep(&self, location: SourceLocation) -> ParseError {
        ParseError::NestingTooDeep {
            limit: self.config.max_depth,
            location,
        }
    }

    /// Run `parse` one nesting level deeper, failing once the configured
    /// depth is exceeded
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= self.config.max_depth {
            return Err(self.too_deep(self.current_location()));
        }

        self.depth += 1;
        self.peak = self.peak.max(self.depth);
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Start an operator chain at the current depth
    ///
    /// Binary operators and postfix operators are folded in a loop, so the
    /// tree grows one level per link without any recursion. Links are
    /// counted on top of the deepest operand, which bounds the height of the
    /// finished tree by the same limit as [`Parser::nested`].
    pub(crate) fn open_chain(&mut self) -> Chain {
        Chain {
            outer_peak: std::mem::replace(&mut self.peak, self.depth),
            links: 0,
        }
    }

    /// Count one more link of `chain`, whose operator sits at `location`
    pub(crate) fn extend_chain(
        &mut self,
        chain: &mut Chain,
        location: SourceLocation,
    ) -> Result<(), ParseError> {
        chain.links += 1;
        if self.peak + chain.links > self.config.max_depth {
            return Err(self.too_deep(location));
        }
        Ok(())
    }

    pub(crate) fn close_chain(&mut self, chain: Chain) {
        self.peak = chain.outer_peak.max(self.peak + chain.links);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<SyntaxTree, ParseError> {
        Parser::new(source)?.parse_program()
    }

    #[test]
    fn test_parse_empty_program() {
        let tree = parse("").unwrap();
        assert!(tree.root.is_empty());

        let tree = parse("  # only a comment\n ;;; ").unwrap();
        assert!(tree.root.is_empty());
    }

    #[test]
    fn test_parse_simple_function() {
        let tree = parse("function main() { return 0; }").unwrap();

        assert_eq!(tree.statements().len(), 1);
        match &tree.statements()[0] {
            Statement::Function(function) => {
                assert_eq!(function.name, "main");
                assert!(function.parameters.is_empty());
                let body = function.body.as_ref().unwrap();
                assert_eq!(
                    body.statements,
                    vec![Statement::Return(vec![Expression::integer(0)])]
                );
            }
            other => panic!("Expected function statement, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_expression_statement() {
        let tree = parse("x = 1 + 2 * 3;").unwrap();

        let expected = Expression::Assignment {
            op: AssignOp::Assign,
            target: Box::new(Expression::identifier("x")),
            value: Box::new(Expression::Binary {
                op: BinOp::Plus,
                left: Box::new(Expression::integer(1)),
                right: Box::new(Expression::Binary {
                    op: BinOp::Multiply,
                    left: Box::new(Expression::integer(2)),
                    right: Box::new(Expression::integer(3)),
                }),
            }),
        };
        assert_eq!(tree.statements(), [Statement::Expression(expected)]);
    }

    #[test]
    fn test_wrong_token_points_at_found_token() {
        let err = parse("while (x {").unwrap_err();
        assert_eq!(
            err,
            ParseError::WrongToken {
                expected: TokenKind::CloseParen,
                found: TokenKind::OpenBrace,
                location: SourceLocation::new(1, 10),
            }
        );
        assert_eq!(err.name(), "WrongToken");
    }

    #[test]
    fn test_lex_error_surfaces_through_parser() {
        let err = parse("x = \"open;").unwrap_err();
        assert!(matches!(err, ParseError::Lex(LexError::StringNotClosed { .. })));
        assert_eq!(err.name(), "StringNotClosed");
    }

    #[test]
    fn test_lex_error_on_first_token() {
        assert!(matches!(
            Parser::new("@"),
            Err(ParseError::Lex(LexError::UnknownCharacter { character: '@', .. }))
        ));
    }

    #[test]
    fn test_nesting_limit_from_config() {
        let config = ParserConfig::default().with_max_depth(4);

        let mut shallow = Parser::with_config("((1));", config).unwrap();
        assert!(shallow.parse_program().is_ok());

        let mut deep = Parser::with_config("((((((1))))));", config).unwrap();
        assert!(matches!(
            deep.parse_program(),
            Err(ParseError::NestingTooDeep { limit: 4, .. })
        ));
    }

    fn nested_parens(levels: usize) -> String {
        format!("{}1{};", "(".repeat(levels), ")".repeat(levels))
    }

    #[test]
    fn test_default_nesting_limit() {
        let err = parse(&nested_parens(1000)).unwrap_err();
        assert!(matches!(
            err,
            ParseError::NestingTooDeep {
                limit: DEFAULT_MAX_NESTING_DEPTH,
                ..
            }
        ));
    }

    #[test]
    fn test_deepest_accepted_nesting() {
        // The statement's expression takes one level, each parenthesis another
        let tree = parse(&nested_parens(DEFAULT_MAX_NESTING_DEPTH - 1)).unwrap();
        assert_eq!(tree.statements(), [Statement::Expression(Expression::integer(1))]);

        assert!(matches!(
            parse(&nested_parens(DEFAULT_MAX_NESTING_DEPTH)),
            Err(ParseError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn test_chain_links_count_toward_limit() {
        let config = ParserConfig::default().with_max_depth(4);

        // Three links on top of the statement level
        let mut parser = Parser::with_config("a + b + c + d;", config).unwrap();
        assert!(parser.parse_program().is_ok());

        let mut parser = Parser::with_config("a + b + c + d + e;", config).unwrap();
        assert_eq!(
            parser.parse_program().unwrap_err(),
            ParseError::NestingTooDeep {
                limit: 4,
                location: SourceLocation::new(1, 15),
            }
        );
    }

    #[test]
    fn test_chain_counts_from_deepest_operand() {
        let config = ParserConfig::default().with_max_depth(4);

        // `(b + c)` reaches level 3, the two outer links stack on top of it
        let mut parser = Parser::with_config("a + (b + c);", config).unwrap();
        assert!(parser.parse_program().is_ok());

        let mut parser = Parser::with_config("a + (b + c) + d;", config).unwrap();
        assert!(matches!(
            parser.parse_program(),
            Err(ParseError::NestingTooDeep { limit: 4, .. })
        ));
    }

    #[test]
    fn test_depth_is_released_between_statements() {
        let config = ParserConfig::default().with_max_depth(3);
        let source = "((1)); ((2)); ((3)); ((4));";
        let mut parser = Parser::with_config(source, config).unwrap();
        assert_eq!(parser.parse_program().unwrap().statements().len(), 4);
    }
}
