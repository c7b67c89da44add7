//! Source printer for syntax trees
//!
//! Turns an AST back into script source. Expressions are printed fully
//! parenthesized so that precedence never depends on the reader, and
//! statements are printed one per line with explicit braces. Parsing the
//! printed text yields a tree equal to the one printed.

use crate::parser::ast::*;
use crate::parser::constants::INDENT_WIDTH;
use std::fmt::{self, Write};

/// Print a whole tree, one top-level statement per line
pub fn print_tree(tree: &SyntaxTree) -> String {
    let mut writer = SourceWriter::new();
    writer.statements(&tree.root);
    writer.finish()
}

/// Output buffer that tracks indentation
struct SourceWriter {
    output: String,
    indent_level: usize,
    at_line_start: bool,
}

impl SourceWriter {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            at_line_start: true,
        }
    }

    fn finish(self) -> String {
        self.output
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Write a string, indenting first if at line start
    fn write(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if self.at_line_start {
            let width = self.indent_level * INDENT_WIDTH;
            self.output.extend(std::iter::repeat(' ').take(width));
            self.at_line_start = false;
        }
        self.output.push_str(s);
    }

    fn writeln(&mut self, s: &str) {
        self.write(s);
        self.newline();
    }

    fn newline(&mut self) {
        self.output.push('\n');
        self.at_line_start = true;
    }

    fn statements(&mut self, compound: &Compound) {
        for statement in &compound.statements {
            self.statement(statement);
        }
    }

    /// `{`, indented body, `}` without the trailing newline
    fn block(&mut self, body: &Compound) {
        self.writeln("{");
        self.indent();
        self.statements(body);
        self.dedent();
        self.write("}");
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Expression(expr) => self.writeln(&format!("{};", expr)),
            Statement::Declaration(decl) => self.writeln(&format!("{};", decl)),
            Statement::If(stmt) => {
                self.if_chain(stmt);
                self.newline();
            }
            Statement::Switch(stmt) => self.switch(stmt),
            Statement::ForEach(stmt) => {
                self.write(&format!("for ({} in {}) ", stmt.binding, stmt.source));
                self.block(&stmt.body);
                self.newline();
            }
            Statement::For(stmt) => {
                let init = match &stmt.init {
                    Some(ForInit::Declaration(decl)) => format!("{};", decl),
                    Some(ForInit::Expression(expr)) => format!("{};", expr),
                    None => ";".to_string(),
                };
                let condition = optional(&stmt.condition);
                let increment = optional(&stmt.increment);
                self.write(&format!("for ({} {}; {}) ", init, condition, increment));
                self.block(&stmt.body);
                self.newline();
            }
            Statement::While(stmt) => {
                self.write(&format!("while ({}) ", stmt.condition));
                self.block(&stmt.body);
                self.newline();
            }
            Statement::DoWhile(stmt) => {
                self.write("do ");
                self.block(&stmt.body);
                self.writeln(&format!(" while ({});", stmt.condition));
            }
            Statement::Break => self.writeln("break;"),
            Statement::Continue => self.writeln("continue;"),
            Statement::Return(values) => {
                self.writeln(&format!("return {};", join(values, " : ")));
            }
            Statement::Function(function) => self.function(function),
            Statement::Import(import) => {
                let path: Vec<&str> = import
                    .path
                    .iter()
                    .map(|segment| match segment {
                        ImportSegment::Name(name) => name.as_str(),
                        ImportSegment::Wildcard => "*",
                    })
                    .collect();
                self.writeln(&format!("import {};", path.join(".")));
            }
        }
    }

    /// Walk an `else if` chain without recursing into it
    fn if_chain(&mut self, stmt: &IfStatement) {
        let mut current = stmt;
        loop {
            self.write(&format!("if ({}) ", current.condition));
            self.block(&current.body);

            match &current.else_branch {
                None => return,
                Some(ElseBranch::Else(body)) => {
                    self.write(" else ");
                    self.block(body);
                    return;
                }
                Some(ElseBranch::ElseIf(next)) => {
                    self.write(" else ");
                    current = next;
                }
            }
        }
    }

    fn switch(&mut self, stmt: &SwitchStatement) {
        self.writeln(&format!("switch ({}) {{", stmt.subject));
        self.indent();

        for case in &stmt.cases {
            self.writeln(&format!("case {}:", case.const_expr));
            self.indent();
            self.statements(&case.body);
            self.dedent();
        }

        if let Some(body) = &stmt.default {
            self.writeln("default:");
            self.indent();
            self.statements(body);
            self.dedent();
        }

        self.dedent();
        self.writeln("}");
    }

    fn function(&mut self, function: &FunctionStatement) {
        let parameters: Vec<String> = function
            .parameters
            .iter()
            .map(|parameter| match parameter {
                FunctionParameter::Named {
                    name,
                    default: Some(default),
                } => format!("{} = {}", name, default),
                FunctionParameter::Named { name, default: None } => name.clone(),
                FunctionParameter::Variadic => "...".to_string(),
            })
            .collect();
        let header = format!("function {}({})", function.name, parameters.join(", "));

        match &function.body {
            None => self.writeln(&format!("{};", header)),
            Some(body) => {
                self.write(&header);
                self.write(" ");
                self.block(body);
                self.newline();
            }
        }
    }
}

fn optional(expr: &Option<Expression>) -> String {
    expr.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn join(items: &[Expression], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_char('"')?;
    for ch in text.chars() {
        if ch == '"' || ch == '\\' {
            f.write_char('\\')?;
        }
        f.write_char(ch)?;
    }
    f.write_char('"')
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(value) => write!(f, "{}", value),
            Literal::Float(value) => {
                let text = value.to_string();
                if text.contains('.') {
                    f.write_str(&text)
                } else {
                    write!(f, "{}.0", text)
                }
            }
            Literal::String(text) => write_quoted(f, text),
            Literal::Identifier(name) => f.write_str(name),
            Literal::Boolean(value) => write!(f, "{}", value),
            Literal::Null => f.write_str("null"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(literal) => write!(f, "{}", literal),
            Expression::Unary { op, operand } if op.is_postfix() => {
                write!(f, "({}{})", operand, op.symbol())
            }
            Expression::Unary { op, operand } => write!(f, "({}{})", op.symbol(), operand),
            Expression::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expression::Assignment { op, target, value } => {
                write!(f, "({} {} {})", target, op.symbol(), value)
            }
            Expression::Condition {
                condition,
                then_expr,
                else_expr,
            } => write!(f, "({} ? {} : {})", condition, then_expr, else_expr),
            Expression::Call { callee, arguments } => {
                write!(f, "{}({})", callee, join(arguments, ", "))
            }
            Expression::ArrayAccess { array, index } => write!(f, "{}[{}]", array, index),
            Expression::MemberAccess { object, member } => match object.as_ref() {
                Expression::Literal(Literal::Integer(_) | Literal::Float(_)) => {
                    write!(f, "({}).{}", object, member)
                }
                _ => write!(f, "{}.{}", object, member),
            },
            Expression::Array(elements) => write!(f, "[{}]", join(elements, ", ")),
        }
    }
}

impl fmt::Display for DeclarationExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_const { "const " } else { "var " })?;
        write_quoted(f, &self.name)?;
        write!(f, " = {}", self.initializer)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut writer = SourceWriter::new();
        writer.statement(self);
        f.write_str(writer.finish().trim_end())
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut writer = SourceWriter::new();
        writer.block(self);
        f.write_str(&writer.finish())
    }
}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print_tree(self))
    }
}
