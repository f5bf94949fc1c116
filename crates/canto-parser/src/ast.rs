//! AST node types for the Canto parser.
//!
//! The tree is a closed tagged-variant design: one variant per statement or
//! expression kind, each carrying only the fields relevant to it. Ownership
//! is single-owner throughout — a `Block` exclusively owns its statements,
//! compound statements exclusively own their condition sub-expressions and
//! body blocks, expression nodes exclusively own their operands. No node is
//! ever referenced from two parents, so destruction is automatic and
//! bottom-up.

use canto_lexer::Token;
use std::fmt;

/// Expression nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal or bare identifier, carried as its source token.
    Literal(Token),
    /// Binary expression with owned operands.
    Binary {
        op: Token,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Function call: `name(arg, arg, ...)`.
    Call {
        name: String,
        args: Vec<Expr>,
        line: usize,
    },
    /// Parenthesized source grouping.
    Group(Box<Expr>),
}

impl Expr {
    /// Source line of the leftmost token in this expression.
    pub fn line(&self) -> usize {
        match self {
            Expr::Literal(tok) => tok.line,
            Expr::Binary { left, .. } => left.line(),
            Expr::Call { line, .. } => *line,
            Expr::Group(inner) => inner.line(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(tok) => write!(f, "{}", tok.lexeme),
            Expr::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.lexeme, right)
            }
            Expr::Call { name, args, .. } => {
                let parts: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", name, parts.join(", "))
            }
            Expr::Group(inner) => write!(f, "({})", inner),
        }
    }
}

/// Statement nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// First sighting of a name: `x = expr;`
    VarDecl {
        name: String,
        type_tag: String,
        value: Expr,
        line: usize,
    },
    /// Re-assignment of an already-declared name.
    VarAssign {
        name: String,
        op: Token,
        value: Expr,
        line: usize,
    },
    If {
        cond: Expr,
        body: Block,
        line: usize,
    },
    Elif {
        cond: Expr,
        body: Block,
        line: usize,
    },
    Else {
        body: Block,
        line: usize,
    },
    For {
        iter_name: String,
        iterable: Expr,
        body: Block,
        line: usize,
    },
    While {
        cond: Expr,
        body: Block,
        line: usize,
    },
    FunctionDecl {
        name: String,
        params: Vec<String>,
        body: Block,
        line: usize,
    },
    ClassDecl {
        name: String,
        body: Block,
        line: usize,
    },
    /// Recorded but not semantically resolved.
    Import {
        module: String,
        line: usize,
    },
    Break {
        line: usize,
    },
    Return {
        value: Option<Expr>,
        line: usize,
    },
    /// Free-standing expression statement (typically a call).
    Expr(Expr),
}

impl Stmt {
    /// Source line of this statement, for diagnostics.
    pub fn line(&self) -> usize {
        match self {
            Stmt::VarDecl { line, .. }
            | Stmt::VarAssign { line, .. }
            | Stmt::If { line, .. }
            | Stmt::Elif { line, .. }
            | Stmt::Else { line, .. }
            | Stmt::For { line, .. }
            | Stmt::While { line, .. }
            | Stmt::FunctionDecl { line, .. }
            | Stmt::ClassDecl { line, .. }
            | Stmt::Import { line, .. }
            | Stmt::Break { line }
            | Stmt::Return { line, .. } => *line,
            Stmt::Expr(e) => e.line(),
        }
    }
}

/// An ordered sequence of statements. Order is source declaration order
/// and is semantically significant (sequential execution).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new() -> Self {
        Self { stmts: Vec::new() }
    }

    pub fn push(&mut self, stmt: Stmt) {
        self.stmts.push(stmt);
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canto_lexer::TokenKind;

    fn num(lexeme: &str, line: usize) -> Expr {
        Expr::Literal(Token::new(TokenKind::Number, lexeme, line))
    }

    #[test]
    fn test_expr_display() {
        let expr = Expr::Binary {
            op: Token::new(TokenKind::Operator, "+", 1),
            left: Box::new(num("1", 1)),
            right: Box::new(Expr::Group(Box::new(num("2", 1)))),
        };
        assert_eq!(expr.to_string(), "(1 + (2))");
    }

    #[test]
    fn test_call_display() {
        let call = Expr::Call {
            name: "print".to_string(),
            args: vec![num("1", 2), num("2", 2)],
            line: 2,
        };
        assert_eq!(call.to_string(), "print(1, 2)");
        assert_eq!(call.line(), 2);
    }

    #[test]
    fn test_stmt_line() {
        let stmt = Stmt::Break { line: 7 };
        assert_eq!(stmt.line(), 7);
        let stmt = Stmt::Expr(num("3", 4));
        assert_eq!(stmt.line(), 4);
    }

    #[test]
    fn test_block_order_preserved() {
        let mut block = Block::new();
        block.push(Stmt::Break { line: 1 });
        block.push(Stmt::Break { line: 2 });
        assert_eq!(block.len(), 2);
        assert_eq!(block.stmts[0].line(), 1);
        assert_eq!(block.stmts[1].line(), 2);
    }
}
