//! Tree-walking code generator: lowers the AST into target source text.
//!
//! Lowering is a recursive dispatch on node kind, exhaustive over the
//! closed node set — the match arms below are checked by the compiler, so
//! an unhandled kind cannot slip through as silent empty output. The
//! generator never mutates the AST; it assumes every node reaching it was
//! fully constructed by the parser and runs only when the diagnostic count
//! is zero.
//!
//! Variable operations lower to the runtime's calling convention:
//! `declare("name", "type_tag", "expr")` and `assign("name", "expr")`,
//! with the expression serialized as text and left unevaluated — the
//! runtime, not the generator, evaluates it against the live frame stack.

use canto_lexer::TokenKind;
use canto_parser::{Block, Expr, Stmt};

/// The three ordered output sections consumed by the packaging
/// collaborator: imports first, then function definitions, then the
/// top-level statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeSections {
    pub imports: String,
    pub functions: String,
    pub top_level: String,
}

/// Lower a whole program, routing each top-level statement to its section.
pub fn lower_program(program: &Block) -> CodeSections {
    let mut sections = CodeSections::default();
    for stmt in &program.stmts {
        let text = lower_stmt(stmt);
        let target = match stmt {
            Stmt::Import { .. } => &mut sections.imports,
            Stmt::FunctionDecl { .. } | Stmt::ClassDecl { .. } => &mut sections.functions,
            _ => &mut sections.top_level,
        };
        target.push_str(&text);
        target.push('\n');
    }
    sections
}

/// Lower one statement to target text.
pub fn lower_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::VarDecl {
            name,
            type_tag,
            value,
            ..
        } => format!(
            "declare(\"{}\", \"{}\", \"{}\");",
            name,
            type_tag,
            lower_expr(value)
        ),
        Stmt::VarAssign {
            name, op, value, ..
        } => {
            // Compound operators serialize as one ordinary expression:
            // `x += e` becomes assign("x", "(x + e)").
            let serialized = if op.lexeme == "=" {
                lower_expr(value)
            } else {
                let base = op.lexeme.trim_end_matches('=');
                format!("({} {} {})", name, base, lower_expr(value))
            };
            format!("assign(\"{}\", \"{}\");", name, serialized)
        }
        Stmt::If { cond, body, .. } => {
            format!("if ({}) {}", lower_expr(cond), lower_block(body))
        }
        Stmt::Elif { cond, body, .. } => {
            format!("elif ({}) {}", lower_expr(cond), lower_block(body))
        }
        Stmt::Else { body, .. } => format!("else {}", lower_block(body)),
        Stmt::While { cond, body, .. } => {
            format!("while ({}) {}", lower_expr(cond), lower_block(body))
        }
        Stmt::For {
            iter_name,
            iterable,
            body,
            ..
        } => format!(
            "for ({} : {}) {}",
            iter_name,
            lower_expr(iterable),
            lower_block(body)
        ),
        Stmt::FunctionDecl {
            name, params, body, ..
        } => format!("def {}({}) {}", name, params.join(", "), lower_block(body)),
        Stmt::ClassDecl { name, body, .. } => {
            format!("class {} {}", name, lower_block(body))
        }
        Stmt::Import { module, .. } => format!("import {};", module),
        Stmt::Break { .. } => "break;".to_string(),
        Stmt::Return { value, .. } => match value {
            Some(expr) => format!("return {};", lower_expr(expr)),
            None => "return;".to_string(),
        },
        Stmt::Expr(expr) => format!("{};", lower_expr(expr)),
    }
}

/// Lower a block: brace-delimited, one statement per line, in declaration
/// order.
pub fn lower_block(block: &Block) -> String {
    let mut out = String::from("{\n");
    for stmt in &block.stmts {
        out.push_str(&lower_stmt(stmt));
        out.push('\n');
    }
    out.push('}');
    out
}

/// Lower an expression to target text. Binary expressions are always
/// parenthesized so precedence is explicit in the output regardless of the
/// source grouping.
pub fn lower_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal(tok) => {
            if tok.kind == TokenKind::Str {
                // The lexer stripped the quotes; restore them so the text
                // round-trips through the runtime's expression evaluator.
                format!("\"{}\"", tok.lexeme)
            } else {
                tok.lexeme.clone()
            }
        }
        Expr::Binary { op, left, right } => {
            format!("({} {} {})", lower_expr(left), op.lexeme, lower_expr(right))
        }
        Expr::Call { name, args, .. } => {
            let parts: Vec<String> = args.iter().map(lower_expr).collect();
            format!("{}({})", name, parts.join(", "))
        }
        Expr::Group(inner) => format!("({})", lower_expr(inner)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canto_lexer::tokenize;
    use canto_parser::{parse_program, ParseContext};

    fn lower_src(src: &str) -> CodeSections {
        let tokens = tokenize(src).unwrap();
        let mut ctx = ParseContext::new();
        let program = parse_program(&tokens, &mut ctx);
        assert_eq!(ctx.error_count(), 0, "unexpected diagnostics for {}", src);
        lower_program(&program)
    }

    fn count(haystack: &str, needle: char) -> usize {
        haystack.chars().filter(|&c| c == needle).count()
    }

    #[test]
    fn test_var_decl_lowering() {
        let out = lower_src("x = 5;");
        assert_eq!(out.top_level, "declare(\"x\", \"int\", \"5\");\n");
    }

    #[test]
    fn test_var_decl_unevaluated_initializer() {
        let out = lower_src("x = 2 + 3 * 4;");
        assert_eq!(
            out.top_level,
            "declare(\"x\", \"auto\", \"(2 + (3 * 4))\");\n"
        );
    }

    #[test]
    fn test_var_assign_lowering() {
        let out = lower_src("x = 1; x = x + 1;");
        assert!(out.top_level.contains("assign(\"x\", \"(x + 1)\");"));
    }

    #[test]
    fn test_compound_assign_serializes_as_one_expr() {
        let out = lower_src("x = 1; x += 2;");
        assert!(out.top_level.contains("assign(\"x\", \"(x + 2)\");"));
    }

    #[test]
    fn test_string_initializer_requoted() {
        let out = lower_src("s = \"hi\";");
        assert_eq!(out.top_level, "declare(\"s\", \"str\", \"\"hi\"\");\n");
    }

    #[test]
    fn test_binary_always_parenthesized() {
        let out = lower_src("y = 1; y = (y) + 2;");
        assert!(out.top_level.contains("\"((y) + 2)\""));
    }

    #[test]
    fn test_if_elif_else_mirrored() {
        let out = lower_src(
            "a = 1; if a > 0 { b = 1; } elif a == 0 { b = 2; } else { b = 3; }",
        );
        let text = &out.top_level;
        assert!(text.contains("if ((a > 0)) {"));
        assert!(text.contains("elif ((a == 0)) {"));
        assert!(text.contains("else {"));
        // Three blocks, each wrapping exactly one lowered statement.
        assert_eq!(text.matches("declare(\"b\"").count(), 1);
        assert_eq!(text.matches("assign(\"b\"").count(), 2);
        let if_pos = text.find("if (").unwrap();
        let elif_pos = text.find("elif (").unwrap();
        let else_pos = text.find("else {").unwrap();
        assert!(if_pos < elif_pos && elif_pos < else_pos);
    }

    #[test]
    fn test_loops_mirrored() {
        let out = lower_src("i = 0; while i < 3 { i = i + 1; } for j in range(3) { print(j); }");
        assert!(out.top_level.contains("while ((i < 3)) {"));
        assert!(out.top_level.contains("for (j : range(3)) {"));
    }

    #[test]
    fn test_function_goes_to_functions_section() {
        let out = lower_src("def add(a, b) { return a + b; } x = add(1, 2);");
        assert!(out.functions.contains("def add(a, b) {"));
        assert!(out.functions.contains("return (a + b);"));
        assert!(out.top_level.contains("declare(\"x\", \"auto\", \"add(1, 2)\");"));
        assert!(!out.top_level.contains("def "));
    }

    #[test]
    fn test_class_goes_to_functions_section() {
        let out = lower_src("class Point { x = 0; }");
        assert!(out.functions.starts_with("class Point {"));
    }

    #[test]
    fn test_import_goes_to_imports_section() {
        let out = lower_src("import math; x = 1;");
        assert_eq!(out.imports, "import math;\n");
        assert!(!out.top_level.contains("import"));
    }

    #[test]
    fn test_brace_balance_property() {
        let out = lower_src(
            "def f(a) { if a > 0 { return 1; } else { return 0; } } \
             k = 0; while k < 2 { k = k + 1; }",
        );
        for text in [&out.functions, &out.top_level] {
            assert_eq!(count(text, '{'), count(text, '}'));
        }
    }

    #[test]
    fn test_paren_balance_in_binaries() {
        let out = lower_src("z = (1 + 2) * (3 - 4) / 5;");
        assert_eq!(count(&out.top_level, '('), count(&out.top_level, ')'));
    }

    #[test]
    fn test_call_statement() {
        let out = lower_src("print(1, 2);");
        assert_eq!(out.top_level, "print(1, 2);\n");
    }

    #[test]
    fn test_break_and_return() {
        let out = lower_src("i = 0; while i < 9 { break; }");
        assert!(out.top_level.contains("break;"));
    }

    #[test]
    fn test_statement_order_preserved() {
        let out = lower_src("a = 1; b = 2; c = 3;");
        let a = out.top_level.find("\"a\"").unwrap();
        let b = out.top_level.find("\"b\"").unwrap();
        let c = out.top_level.find("\"c\"").unwrap();
        assert!(a < b && b < c);
    }
}
