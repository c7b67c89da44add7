//! Script source code parser
//!
//! This module transforms script source text into an Abstract Syntax Tree (AST)
//! and back:
//! - [`lexer`]: Tokenization (source text → tokens), pulled one token at a time
//! - [`parse`]: Parsing (tokens → AST), split over `statements`,
//!   `declarations` and `expressions`
//! - [`ast`]: AST node definitions
//! - [`printer`]: AST → source text
//!
//! # Language
//!
//! A small C-like scripting language:
//! - Literals: integers, floats, strings in `"` or `'`, `true`, `false`, `null`,
//!   array literals `[a, b]`
//! - Declarations: `var "name" = expr;`, `const "name" = expr;`, `function`, `import`
//! - Statements: `if`/`else`, `switch`, `for`, `for (x in xs)`, `while`,
//!   `do`-`while`, `return a : b;`, `break`, `continue`
//! - Expressions: assignment and compound assignment, ternary, logical,
//!   bitwise, comparison, arithmetic including `**`, calls, indexing,
//!   member access
//! - Comments: `#` to end of line
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser; binary operators use precedence climbing.
//! No external parser generator dependencies.

pub mod ast;
pub mod constants;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
pub mod printer;
mod statements;
