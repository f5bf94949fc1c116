//! Compile-context state threaded through segmentation and parsing.
//!
//! The declared-names set and the shared error record are per-compilation
//! values passed explicitly, never held as ambient globals, so independent
//! compilations cannot interfere.

use std::collections::HashSet;
use std::fmt;

/// Delimiter kinds named in imbalance diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterKind {
    Paren,
    Bracket,
    Brace,
}

impl DelimiterKind {
    pub fn open(&self) -> &'static str {
        match self {
            DelimiterKind::Paren => "(",
            DelimiterKind::Bracket => "[",
            DelimiterKind::Brace => "{",
        }
    }

    pub fn close(&self) -> &'static str {
        match self {
            DelimiterKind::Paren => ")",
            DelimiterKind::Bracket => "]",
            DelimiterKind::Brace => "}",
        }
    }
}

impl fmt::Display for DelimiterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DelimiterKind::Paren => "parentheses",
            DelimiterKind::Bracket => "square brackets",
            DelimiterKind::Brace => "curly braces",
        };
        write!(f, "{}", s)
    }
}

/// One parse- or lex-level problem: a `(line, message)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at line {}: {}", self.line, self.message)
    }
}

/// Per-compilation parse state.
///
/// `declared` is the declared-names set used to disambiguate `VarDecl` from
/// `VarAssign`. It grows monotonically and never shrinks within one
/// compilation unit — declaration tracking is compilation-unit-global, not
/// scope-local (shadowing is a runtime concern handled by variable frames).
#[derive(Debug, Default)]
pub struct ParseContext {
    declared: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and keep going.
    pub fn error(&mut self, line: usize, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            line,
            message: message.into(),
        });
    }

    /// Record an imbalance diagnostic naming the delimiter kind.
    pub fn delimiter_error(&mut self, line: usize, kind: DelimiterKind) {
        self.error(line, format!("{} aren't properly closed", kind));
    }

    /// True if `name` has already been declared in this compilation unit.
    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    /// Mark `name` declared. Returns false if it already was.
    pub fn declare(&mut self, name: &str) -> bool {
        self.declared.insert(name.to_string())
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the context, yielding the collected diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
