//! Statement parser for Canto.
//!
//! Each statement-token group is classified by keyword presence and shape,
//! in a fixed priority order, and built into the matching AST node. Bodies
//! of compound statements recursively re-enter the segmenter and parser.
//! Parsing is error-tolerant: a malformed group records a diagnostic and is
//! skipped, so one pass surfaces every independent error.

use crate::ast::{Block, Expr, Stmt};
use crate::context::ParseContext;
use crate::segment::segment;
use canto_lexer::{Token, TokenKind};

/// Segment and parse a whole token stream into a top-level block.
pub fn parse_program(tokens: &[Token], ctx: &mut ParseContext) -> Block {
    let mut block = Block::new();
    for group in segment(tokens, ctx) {
        if let Some(stmt) = parse_statement(&group, ctx) {
            block.push(stmt);
        }
    }
    block
}

/// Classify and parse one statement group. Returns `None` (after recording
/// a diagnostic) when the group is malformed; no partially-built node is
/// ever returned.
pub fn parse_statement(group: &[Token], ctx: &mut ParseContext) -> Option<Stmt> {
    if group.is_empty() {
        return None;
    }

    // Fixed classification priority, by keyword presence.
    if has_keyword(group, "def") {
        return parse_function_decl(group, ctx);
    }
    if has_keyword(group, "class") {
        return parse_class_decl(group, ctx);
    }
    if has_keyword(group, "for") {
        return parse_for(group, ctx);
    }
    if has_keyword(group, "while") {
        return parse_while(group, ctx);
    }
    if has_keyword(group, "if") {
        return parse_conditional(group, ctx, "if");
    }
    if has_keyword(group, "elif") {
        return parse_conditional(group, ctx, "elif");
    }
    if has_keyword(group, "else") {
        return parse_else(group, ctx);
    }
    if has_keyword(group, "import") {
        return parse_import(group, ctx);
    }
    if has_keyword(group, "break") {
        return Some(Stmt::Break {
            line: group[0].line,
        });
    }
    if has_keyword(group, "return") {
        return parse_return(group, ctx);
    }

    // IDENT ASSIGN_OP <expr> is a declaration or an assignment, decided by
    // the declared-names set.
    if is_assignment_shape(group) {
        return parse_assignment(group, ctx);
    }

    // Anything else is a free-standing expression statement.
    match parse_expr_tokens(group) {
        Ok(expr) => Some(Stmt::Expr(expr)),
        Err((line, msg)) => {
            ctx.error(line, format!("unclassifiable statement: {}", msg));
            None
        }
    }
}

fn has_keyword(group: &[Token], kw: &str) -> bool {
    group.iter().any(|t| t.is_keyword(kw))
}

fn keyword_index(group: &[Token], kw: &str) -> usize {
    group.iter().position(|t| t.is_keyword(kw)).unwrap_or(0)
}

fn is_assignment_shape(group: &[Token]) -> bool {
    group.len() >= 3
        && group[0].kind == TokenKind::Ident
        && group[1].kind == TokenKind::AssignOp
        && group[2].kind != TokenKind::AssignOp
}

// =========================================================================
// Statement builders
// =========================================================================

fn parse_assignment(group: &[Token], ctx: &mut ParseContext) -> Option<Stmt> {
    let name = group[0].lexeme.clone();
    let op = group[1].clone();
    let line = group[0].line;

    let value = match parse_expr_tokens(&group[2..]) {
        Ok(expr) => expr,
        Err((line, msg)) => {
            ctx.error(line, format!("bad expression in assignment: {}", msg));
            return None;
        }
    };

    if ctx.is_declared(&name) {
        Some(Stmt::VarAssign {
            name,
            op,
            value,
            line,
        })
    } else if op.lexeme != "=" {
        // A compound operator needs an existing value to combine with.
        ctx.error(
            line,
            format!("compound assignment to undeclared name `{}`", name),
        );
        None
    } else {
        ctx.declare(&name);
        let type_tag = infer_type_tag(&value);
        Some(Stmt::VarDecl {
            name,
            type_tag,
            value,
            line,
        })
    }
}

/// Infer a declaration's type tag from its initializer's leading literal.
fn infer_type_tag(value: &Expr) -> String {
    match value {
        Expr::Literal(tok) => match tok.kind {
            TokenKind::Number if tok.lexeme.contains('.') => "float".to_string(),
            TokenKind::Number => "int".to_string(),
            TokenKind::Str => "str".to_string(),
            _ => "auto".to_string(),
        },
        _ => "auto".to_string(),
    }
}

fn parse_function_decl(group: &[Token], ctx: &mut ParseContext) -> Option<Stmt> {
    let idx = keyword_index(group, "def");
    let line = group[idx].line;

    let name = match group.get(idx + 1) {
        Some(tok) if tok.kind == TokenKind::Ident => tok.lexeme.clone(),
        _ => {
            ctx.error(line, "expected function name after `def`");
            return None;
        }
    };

    if !group.get(idx + 2).is_some_and(|t| t.is_symbol("(")) {
        ctx.error(line, "expected `(` after function name");
        return None;
    }

    // Parameter list: identifiers separated by commas, up to `)`.
    let mut params = Vec::new();
    let mut pos = idx + 3;
    while let Some(tok) = group.get(pos) {
        if tok.is_symbol(")") {
            break;
        }
        if tok.kind == TokenKind::Ident {
            params.push(tok.lexeme.clone());
        } else if !tok.is_symbol(",") {
            ctx.error(tok.line, "expected parameter name");
            return None;
        }
        pos += 1;
    }
    if !group.get(pos).is_some_and(|t| t.is_symbol(")")) {
        ctx.error(line, "unterminated parameter list");
        return None;
    }

    let body = parse_body(group, ctx, line)?;
    Some(Stmt::FunctionDecl {
        name,
        params,
        body,
        line,
    })
}

fn parse_class_decl(group: &[Token], ctx: &mut ParseContext) -> Option<Stmt> {
    let idx = keyword_index(group, "class");
    let line = group[idx].line;

    let name = match group.get(idx + 1) {
        Some(tok) if tok.kind == TokenKind::Ident => tok.lexeme.clone(),
        _ => {
            ctx.error(line, "expected class name after `class`");
            return None;
        }
    };

    let body = parse_body(group, ctx, line)?;
    Some(Stmt::ClassDecl { name, body, line })
}

fn parse_for(group: &[Token], ctx: &mut ParseContext) -> Option<Stmt> {
    let idx = keyword_index(group, "for");
    let line = group[idx].line;

    let iter_name = match group.get(idx + 1) {
        Some(tok) if tok.kind == TokenKind::Ident => tok.lexeme.clone(),
        _ => {
            ctx.error(line, "expected loop variable after `for`");
            return None;
        }
    };

    if !group.get(idx + 2).is_some_and(|t| t.is_keyword("in")) {
        ctx.error(line, "expected `in` after loop variable");
        return None;
    }

    let (open, _) = match brace_region(group) {
        Some(region) => region,
        None => {
            ctx.error(line, "expected `{` to open loop body");
            return None;
        }
    };
    if open < idx + 3 {
        ctx.error(line, "expected iterable before `{`");
        return None;
    }

    let iterable = match parse_expr_tokens(&group[idx + 3..open]) {
        Ok(expr) => expr,
        Err((line, msg)) => {
            ctx.error(line, format!("bad loop iterable: {}", msg));
            return None;
        }
    };

    let body = parse_body(group, ctx, line)?;
    Some(Stmt::For {
        iter_name,
        iterable,
        body,
        line,
    })
}

fn parse_while(group: &[Token], ctx: &mut ParseContext) -> Option<Stmt> {
    let idx = keyword_index(group, "while");
    let line = group[idx].line;
    let cond = parse_condition(group, ctx, idx, line)?;
    let body = parse_body(group, ctx, line)?;
    Some(Stmt::While { cond, body, line })
}

fn parse_conditional(group: &[Token], ctx: &mut ParseContext, kw: &str) -> Option<Stmt> {
    let idx = keyword_index(group, kw);
    let line = group[idx].line;
    let cond = parse_condition(group, ctx, idx, line)?;
    let body = parse_body(group, ctx, line)?;
    if kw == "if" {
        Some(Stmt::If { cond, body, line })
    } else {
        Some(Stmt::Elif { cond, body, line })
    }
}

fn parse_else(group: &[Token], ctx: &mut ParseContext) -> Option<Stmt> {
    let idx = keyword_index(group, "else");
    let line = group[idx].line;

    let (open, _) = match brace_region(group) {
        Some(region) => region,
        None => {
            ctx.error(line, "expected `{` to open else body");
            return None;
        }
    };
    if open != idx + 1 {
        ctx.error(line, "unexpected tokens between `else` and `{`");
        return None;
    }

    let body = parse_body(group, ctx, line)?;
    Some(Stmt::Else { body, line })
}

fn parse_import(group: &[Token], ctx: &mut ParseContext) -> Option<Stmt> {
    let idx = keyword_index(group, "import");
    let line = group[idx].line;
    match group.get(idx + 1) {
        Some(tok) if tok.kind == TokenKind::Ident => Some(Stmt::Import {
            module: tok.lexeme.clone(),
            line,
        }),
        _ => {
            ctx.error(line, "expected module name after `import`");
            None
        }
    }
}

fn parse_return(group: &[Token], ctx: &mut ParseContext) -> Option<Stmt> {
    let idx = keyword_index(group, "return");
    let line = group[idx].line;
    let rest = &group[idx + 1..];
    if rest.is_empty() {
        return Some(Stmt::Return { value: None, line });
    }
    match parse_expr_tokens(rest) {
        Ok(expr) => Some(Stmt::Return {
            value: Some(expr),
            line,
        }),
        Err((line, msg)) => {
            ctx.error(line, format!("bad return value: {}", msg));
            None
        }
    }
}

/// Condition tokens sit between the keyword and the opening brace.
fn parse_condition(
    group: &[Token],
    ctx: &mut ParseContext,
    kw_idx: usize,
    line: usize,
) -> Option<Expr> {
    let (open, _) = match brace_region(group) {
        Some(region) => region,
        None => {
            ctx.error(line, "expected `{` to open body");
            return None;
        }
    };
    // A bare-brace group can carry the keyword inside its body, putting
    // the first `{` left of the keyword.
    if open <= kw_idx {
        ctx.error(line, "expected condition before `{`");
        return None;
    }
    match parse_expr_tokens(&group[kw_idx + 1..open]) {
        Ok(expr) => Some(expr),
        Err((line, msg)) => {
            ctx.error(line, format!("bad condition: {}", msg));
            None
        }
    }
}

/// Parse the brace-enclosed region of a compound statement into a block by
/// recursively re-entering the segmenter and parser.
fn parse_body(group: &[Token], ctx: &mut ParseContext, line: usize) -> Option<Block> {
    let (open, close) = match brace_region(group) {
        Some(region) => region,
        None => {
            ctx.error(line, "expected `{` to open body");
            return None;
        }
    };
    Some(parse_program(&group[open + 1..close], ctx))
}

/// Locate the first `{` and its matching `}` by depth scan.
fn brace_region(group: &[Token]) -> Option<(usize, usize)> {
    let open = group.iter().position(|t| t.is_symbol("{"))?;
    let mut depth = 0;
    for (i, tok) in group.iter().enumerate().skip(open) {
        if tok.is_symbol("{") {
            depth += 1;
        } else if tok.is_symbol("}") {
            depth -= 1;
            if depth == 0 {
                return Some((open, i));
            }
        }
    }
    None
}

// =========================================================================
// Expression parsing (precedence climbing)
// =========================================================================

type ExprError = (usize, String);

/// Parse a full expression from a token slice; every token must be
/// consumed.
pub fn parse_expr_tokens(tokens: &[Token]) -> Result<Expr, ExprError> {
    if tokens.is_empty() {
        return Err((0, "empty expression".to_string()));
    }
    let mut parser = ExprParser { tokens, pos: 0 };
    let expr = parser.parse_binding(0)?;
    if parser.pos != tokens.len() {
        let tok = &tokens[parser.pos];
        return Err((tok.line, format!("unexpected token `{}`", tok.lexeme)));
    }
    Ok(expr)
}

/// Binding power for a binary operator lexeme; 0 means "not binary".
fn binding_power(op: &str) -> u8 {
    match op {
        "==" | "!=" => 1,
        "<" | ">" | "<=" | ">=" => 2,
        "+" | "-" => 3,
        "*" | "/" | "%" => 4,
        _ => 0,
    }
}

struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> ExprParser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        self.pos += 1;
        tok
    }

    fn parse_binding(&mut self, min_bp: u8) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_primary()?;

        while let Some(tok) = self.peek() {
            if tok.kind != TokenKind::Operator {
                break;
            }
            let bp = binding_power(&tok.lexeme);
            if bp == 0 || bp < min_bp {
                break;
            }
            let op = tok.clone();
            self.pos += 1;
            let rhs = self.parse_binding(bp + 1)?;
            lhs = Expr::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let tok = match self.advance() {
            Some(tok) => tok,
            None => {
                let line = self.tokens.last().map(|t| t.line).unwrap_or(0);
                return Err((line, "expression ends unexpectedly".to_string()));
            }
        };

        match tok.kind {
            TokenKind::Number | TokenKind::Str => Ok(Expr::Literal(tok.clone())),
            TokenKind::Ident => {
                if self.peek().is_some_and(|t| t.is_symbol("(")) {
                    self.parse_call(tok)
                } else {
                    Ok(Expr::Literal(tok.clone()))
                }
            }
            // `print` is a keyword but parses as an ordinary call; it
            // passes through code generation untranslated.
            TokenKind::Keyword
                if tok.lexeme == "print" && self.peek().is_some_and(|t| t.is_symbol("(")) =>
            {
                self.parse_call(tok)
            }
            TokenKind::Symbol if tok.lexeme == "(" => {
                let inner = self.parse_binding(0)?;
                match self.advance() {
                    // Binary nodes parenthesize themselves when displayed
                    // and lowered; wrapping one in a Group would double
                    // the parentheses in the output.
                    Some(close) if close.is_symbol(")") => Ok(match inner {
                        inner @ Expr::Binary { .. } => inner,
                        other => Expr::Group(Box::new(other)),
                    }),
                    _ => Err((tok.line, "expected `)`".to_string())),
                }
            }
            _ => Err((tok.line, format!("unexpected token `{}`", tok.lexeme))),
        }
    }

    fn parse_call(&mut self, name_tok: &Token) -> Result<Expr, ExprError> {
        self.pos += 1; // consume '('
        let mut args = Vec::new();

        if self.peek().is_some_and(|t| t.is_symbol(")")) {
            self.pos += 1;
        } else {
            loop {
                args.push(self.parse_binding(0)?);
                match self.advance() {
                    Some(tok) if tok.is_symbol(",") => continue,
                    Some(tok) if tok.is_symbol(")") => break,
                    _ => {
                        return Err((
                            name_tok.line,
                            format!("unterminated argument list for `{}`", name_tok.lexeme),
                        ))
                    }
                }
            }
        }

        Ok(Expr::Call {
            name: name_tok.lexeme.clone(),
            args,
            line: name_tok.line,
        })
    }
}
