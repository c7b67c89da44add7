//! # Introduction
//!
//! pscript is the front end of a small embeddable scripting language: it
//! turns source text into an owned, immutable syntax tree and can print any
//! tree back to source.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → SyntaxTree → (host: evaluation, tooling)
//!                              ↓
//!                           Printer → Source
//! ```
//!
//! 1. [`parser::lexer`]: pull-based tokenizer with non-destructive lookahead.
//! 2. [`parser::parse`]: recursive descent parser; fails fast with a single
//!    [`ParseError`].
//! 3. [`parser::ast`]: the tree: statements, expressions, compounds.
//! 4. [`parser::printer`]: prints a tree so that it re-parses to an equal tree.
//! 5. [`diagnostics`]: sinks that receive the error of a failed parse.
//!
//! ## Example
//!
//! ```
//! use pscript::parse_source;
//! use pscript::parser::ast::Statement;
//!
//! let tree = parse_source("for (x in list) { break; }").unwrap();
//! assert!(matches!(tree.statements()[0], Statement::ForEach(_)));
//! ```
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod diagnostics;
pub mod parser;

pub use diagnostics::{CollectingDiagnostics, Diagnostics, TracingDiagnostics};
pub use parser::ast::SyntaxTree;
pub use parser::lexer::{LexError, Lexer, Token, TokenKind};
pub use parser::parse::{ParseError, Parser, ParserConfig};
pub use parser::printer::print_tree;

/// Parse `source` with the default configuration
pub fn parse_source(source: &str) -> Result<SyntaxTree, ParseError> {
    let mut sink = CollectingDiagnostics::new();
    parse_source_with(source, ParserConfig::default(), &mut sink)
}

/// Parse `source`, reporting a failure to `diagnostics` before returning it
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn parse_source_with(
    source: &str,
    config: ParserConfig,
    diagnostics: &mut dyn Diagnostics,
) -> Result<SyntaxTree, ParseError> {
    let result = Parser::with_config(source, config).and_then(|mut parser| parser.parse_program());

    match &result {
        Ok(tree) => {
            tracing::debug!(statements = tree.statements().len(), "parse succeeded");
        }
        Err(err) => {
            let location = err.location();
            tracing::debug!(
                kind = err.name(),
                line = location.line,
                column = location.column,
                "parse failed"
            );
            diagnostics.report(err);
        }
    }

    result
}
