// Integration tests for the script front end

use pscript::parser::ast::*;
use pscript::parser::constants::DEFAULT_MAX_NESTING_DEPTH;
use pscript::{
    parse_source, parse_source_with, print_tree, CollectingDiagnostics, LexError, ParseError,
    ParserConfig, TokenKind,
};

fn parse_err(source: &str) -> ParseError {
    parse_source(source).expect_err("Parsing should have failed")
}

#[test]
fn test_foreach_with_break() {
    let tree = parse_source("for (x in list) { break; }").expect("Parsing failed");

    assert_eq!(
        tree.statements(),
        [Statement::ForEach(ForEachStatement {
            binding: "x".to_string(),
            source: Expression::identifier("list"),
            body: Compound::new(vec![Statement::Break]),
        })]
    );
}

#[test]
fn test_function_with_default_and_variadic() {
    let tree = parse_source("function f(a, b = 1, ...) { return a : b; }").expect("Parsing failed");

    let Statement::Function(function) = &tree.statements()[0] else {
        panic!("Expected function statement");
    };
    assert_eq!(function.name, "f");
    assert_eq!(function.parameters.len(), 3);
    assert_eq!(function.parameters[0].name(), Some("a"));
    assert!(function.parameters[0].default().is_none());
    assert_eq!(function.parameters[1].name(), Some("b"));
    assert_eq!(function.parameters[1].default(), Some(&Expression::integer(1)));
    assert!(function.parameters[2].is_variadic());

    let body = function.body.as_ref().expect("Function should have a body");
    assert_eq!(
        body.statements,
        vec![Statement::Return(vec![
            Expression::identifier("a"),
            Expression::identifier("b"),
        ])]
    );
}

#[test]
fn test_complete_script() {
    let source = r#"
        # Prime sieve
        import std.io.*;
        import std.math;

        const "LIMIT" = 100;

        function is_prime(n, divisor = 2) {
            if (n < 2) return false;
            else if (divisor * divisor > n) return true;
            else if (n % divisor == 0) return false;
            return is_prime(n, divisor + 1);
        }

        function report(label, ...);

        var "primes" = [];
        for (var "i" = 0; i < LIMIT; i++) {
            if (is_prime(i)) primes.push(i);
        }

        for (p in primes) {
            switch (p % 4) {
                case 1:
                    report('1 mod 4', p);
                    break;
                case 3:
                    report("3 mod 4", p);
                    break;
                default:
                    continue;
            }
        }

        var "count" = 0;
        do {
            count += 1;
        } while (count < 10 and not done);

        var "sign" = count > 5 ? 1 : -1;
        while (true) { break; }
    "#;

    let tree = parse_source(source).expect("Parsing failed");
    let kinds: Vec<&str> = tree
        .statements()
        .iter()
        .map(|statement| match statement {
            Statement::Import(_) => "import",
            Statement::Declaration(_) => "declaration",
            Statement::Function(_) => "function",
            Statement::For(_) => "for",
            Statement::ForEach(_) => "foreach",
            Statement::DoWhile(_) => "do-while",
            Statement::While(_) => "while",
            _ => "other",
        })
        .collect();

    assert_eq!(
        kinds,
        [
            "import",
            "import",
            "declaration",
            "function",
            "function",
            "declaration",
            "for",
            "foreach",
            "declaration",
            "do-while",
            "declaration",
            "while",
        ]
    );

    let Statement::Function(report) = &tree.statements()[4] else {
        panic!("Expected function statement");
    };
    assert!(report.is_forward_declaration());
}

#[test]
fn test_brace_cannot_start_expression() {
    assert!(matches!(
        parse_err("var \"shapes\" = [1, {}.x];"),
        ParseError::ExpectedExpression {
            found: TokenKind::OpenBrace,
            ..
        }
    ));
}

#[test]
fn test_assignment_does_not_chain() {
    assert!(matches!(
        parse_err("x <<= y >>= z;"),
        ParseError::WrongToken {
            expected: TokenKind::Semicolon,
            found: TokenKind::RightShiftAssign,
            ..
        }
    ));
    assert!(parse_source("x <<= (y >>= z);").is_ok());
}

#[test]
fn test_printed_script_reparses_equal() {
    let source = r#"
        function area(w, h = w) { return w * h : "units"; }
        var "shapes" = [area(2), area(2, 3.5), (1).x, 'q"uote'];
        if (a) if (b) c; else d; else e;
        x <<= (y >>= z);
    "#;

    let tree = parse_source(source).expect("Parsing failed");
    let printed = print_tree(&tree);
    let reparsed = parse_source(&printed).expect("Printed source should parse");
    assert_eq!(reparsed, tree);
    assert_eq!(print_tree(&reparsed), printed);
}

#[test]
fn test_dangling_else_binds_to_nearest_if() {
    let tree = parse_source("if (a) if (b) c; else d;").expect("Parsing failed");

    let Statement::If(outer) = &tree.statements()[0] else {
        panic!("Expected if statement");
    };
    assert!(outer.else_branch.is_none());
    let Statement::If(inner) = &outer.body.statements[0] else {
        panic!("Expected nested if statement");
    };
    assert!(inner.else_body().is_some());
}

#[test]
fn test_if_never_has_both_branches() {
    let tree = parse_source("if (a) x; else if (b) y; else z;").expect("Parsing failed");
    let Statement::If(stmt) = &tree.statements()[0] else {
        panic!("Expected if statement");
    };

    let mut current = Some(stmt);
    while let Some(node) = current {
        assert!(!(node.else_if().is_some() && node.else_body().is_some()));
        current = node.else_if();
    }
}

#[test]
fn test_expression_kinds() {
    let tree = parse_source("a.b[c](d) ? -e : f++;").expect("Parsing failed");
    let Statement::Expression(expr) = &tree.statements()[0] else {
        panic!("Expected expression statement");
    };

    assert_eq!(expr.kind(), ExpressionKind::Condition);
    let children = expr.children();
    assert_eq!(children.len(), 3);
    assert_eq!(children[0].kind(), ExpressionKind::Call);
    assert_eq!(children[1].kind(), ExpressionKind::Minus);
    assert_eq!(children[1].children().len(), 1);
    assert_eq!(children[2].kind(), ExpressionKind::IncrementPost);
}

// ===== Errors =====

#[test]
fn test_lexer_errors_surface() {
    assert_eq!(parse_err("x = 'abc").name(), "StringNotClosed");
    assert_eq!(parse_err("x = a $ b;").name(), "UnknownCharacter");
    assert_eq!(parse_err("x = 1.2.3;").name(), "UnknownIdentifier");
    assert_eq!(parse_err("x = \"abc\\").name(), "InvalidOperator");
    assert!(matches!(
        parse_err("x = a..b;"),
        ParseError::Lex(LexError::UnknownCharacter { character: '.', .. })
    ));
}

#[test]
fn test_structural_errors() {
    let cases = [
        ("function f(..., ...) {}", "EllipsesInvalidCount"),
        ("function f(..., a) {}", "EllipsesNotLast"),
        ("function f(a = 1, b) {}", "NonDefaultAfterDefault"),
        ("import a.*.b;", "EntryAfterAllAccess"),
        ("switch (x) { default: default: }", "MultipleDefaults"),
        ("(a ? b : c) += 1;", "ConditionAssignmentStatementMixed"),
        ("x = ;", "ExpectedExpression"),
        ("x = 4294967296;", "InvalidNumber"),
        ("var x = 1;", "WrongToken"),
    ];

    for (source, name) in cases {
        assert_eq!(parse_err(source).name(), name, "{source}");
    }
}

#[test]
fn test_error_location_and_message() {
    let err = parse_err("var \"x\" = 1;\nwhile (x) {\n    x = x +;\n}");
    assert_eq!(err.location(), SourceLocation::new(3, 12));
    assert_eq!(
        err.to_string(),
        "Parse error at line 3, column 12: expected expression, found ';'"
    );
}

#[test]
fn test_nesting_limit() {
    let deep = format!("x = {}1{};", "[".repeat(300), "]".repeat(300));
    assert!(matches!(
        parse_err(&deep),
        ParseError::NestingTooDeep {
            limit: DEFAULT_MAX_NESTING_DEPTH,
            ..
        }
    ));

    let mut sink = CollectingDiagnostics::new();
    let config = ParserConfig::default().with_max_depth(512);
    let shallow = format!("x = {}1;", "- ".repeat(200));
    assert!(parse_source_with(&shallow, config, &mut sink).is_ok());
    assert!(!sink.has_errors());
}

#[test]
fn test_long_operator_chains_fail_cleanly() {
    let sum = format!("x = 1{};", " + 1".repeat(200_000));
    assert_eq!(parse_err(&sum).name(), "NestingTooDeep");

    let members = format!("x{};", ".a".repeat(100_000));
    assert_eq!(parse_err(&members).name(), "NestingTooDeep");
}

#[test]
fn test_deepest_accepted_chain_prints_and_reparses() {
    // The assignment takes one level, each `+` one more
    let source = format!("x = 1{};", " + 1".repeat(DEFAULT_MAX_NESTING_DEPTH - 1));
    let tree = parse_source(&source).expect("Parsing failed");

    // Printing wraps every link in parentheses, which costs a level each
    let printed = print_tree(&tree);
    let config = ParserConfig::default().with_max_depth(2 * DEFAULT_MAX_NESTING_DEPTH + 2);
    let mut sink = CollectingDiagnostics::new();
    let reparsed = parse_source_with(&printed, config, &mut sink).expect("Printed source should parse");
    assert_eq!(reparsed, tree);
}

#[test]
fn test_diagnostics_receive_error_once() {
    let mut sink = CollectingDiagnostics::new();
    let result = parse_source_with("switch (x) { case 1: ", ParserConfig::default(), &mut sink);

    let err = result.expect_err("Parsing should have failed");
    assert_eq!(sink.errors(), [err]);
}

#[test]
fn test_diagnostics_untouched_on_success() {
    let mut sink = CollectingDiagnostics::new();
    let tree = parse_source_with("x;", ParserConfig::default(), &mut sink).expect("Parsing failed");
    assert_eq!(tree.statements().len(), 1);
    assert!(sink.errors().is_empty());
}
