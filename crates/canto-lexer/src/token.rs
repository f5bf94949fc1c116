//! Token types for the Canto lexer.

use std::fmt;

/// Token kinds for the Canto language.
///
/// Classification is coarse by design: the statement parser works on the
/// shape of a token group (keyword presence, `IDENT ASSIGN_OP ...`), not on
/// per-keyword kinds, so keywords share a single kind and carry their text
/// in the lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    /// Identifier-shaped run that is not a keyword.
    Ident,
    /// One of the fixed keyword set (`def`, `for`, `if`, ...).
    Keyword,
    /// Single-character structural token: `( ) { } [ ] ; ,`
    Symbol,
    /// Arithmetic/comparison operator.
    Operator,
    /// Assignment operator: `=` `+=` `-=` `*=` `/=`
    AssignOp,
    /// Integer or floating point literal.
    Number,
    /// Double-quote delimited string literal.
    Str,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Ident => "IDENT",
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Symbol => "SYMBOL",
            TokenKind::Operator => "OPERATOR",
            TokenKind::AssignOp => "ASSIGN_OP",
            TokenKind::Number => "NUMBER",
            TokenKind::Str => "STRING",
        };
        write!(f, "{}", s)
    }
}

/// The fixed keyword set, checked by exact match against identifier-shaped
/// runs.
pub const KEYWORDS: &[&str] = &[
    "def", "class", "for", "while", "if", "elif", "else", "import", "break", "return", "in",
    "print",
];

/// Check whether an identifier-shaped run is a keyword.
pub fn is_keyword(ident: &str) -> bool {
    KEYWORDS.contains(&ident)
}

/// A token produced by the lexer. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The literal source text (for `Str`, the unquoted contents).
    pub lexeme: String,
    /// 1-indexed source line, for diagnostics.
    pub line: usize,
}

impl Token {
    /// Create a new Token.
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }

    /// True if this token is the given keyword.
    pub fn is_keyword(&self, kw: &str) -> bool {
        self.kind == TokenKind::Keyword && self.lexeme == kw
    }

    /// True if this token is the given symbol.
    pub fn is_symbol(&self, sym: &str) -> bool {
        self.kind == TokenKind::Symbol && self.lexeme == sym
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.lexeme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_keyword() {
        assert!(is_keyword("def"));
        assert!(is_keyword("elif"));
        assert!(is_keyword("import"));
        assert!(!is_keyword("foo"));
        assert!(!is_keyword("definitely"));
    }

    #[test]
    fn test_token_predicates() {
        let tok = Token::new(TokenKind::Keyword, "while", 3);
        assert!(tok.is_keyword("while"));
        assert!(!tok.is_keyword("for"));
        assert!(!tok.is_symbol("while"));

        let sym = Token::new(TokenKind::Symbol, "{", 3);
        assert!(sym.is_symbol("{"));
        assert!(!sym.is_keyword("{"));
    }
}
