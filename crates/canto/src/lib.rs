//! Canto - a small compiled language front end for Rust.
//!
//! Canto source is tokenized, segmented into statements, parsed into an
//! AST, and lowered to target source text whose variable operations call
//! into the Canto runtime. This crate ties the pipeline stages together.
//!
//! # Example
//!
//! ```
//! use canto::compile;
//!
//! let sections = compile("x = 5; x += 1;").unwrap();
//! assert_eq!(
//!     sections.top_level,
//!     "declare(\"x\", \"int\", \"5\");\nassign(\"x\", \"(x + 1)\");\n"
//! );
//! ```

pub use canto_codegen as codegen;
pub use canto_lexer as lexer;
pub use canto_parser as parser;
pub use canto_runtime as runtime;

// Re-export commonly used types
pub use canto_codegen::{lower_program, CodeSections};
pub use canto_lexer::{tokenize, Lexer, LexerError, Token, TokenKind};
pub use canto_parser::{parse_program, Block, Diagnostic, Expr, ParseContext, Stmt};
pub use canto_runtime::{Cell, Heap, Runtime, RuntimeError};

/// The collected problems of a failed compilation.
///
/// Code generation never runs over a program with recorded errors, so a
/// compilation either yields complete output sections or this report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }
}

impl std::fmt::Display for CompileReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for d in &self.diagnostics {
            writeln!(f, "error {}", d)?;
        }
        write!(f, "could not compile: {} error(s)", self.diagnostics.len())
    }
}

impl std::error::Error for CompileReport {}

/// Compile Canto source to target output sections.
///
/// Runs the full pipeline: tokenize, segment, parse, then lower the AST.
/// Any recorded diagnostic aborts before lowering.
///
/// # Example
///
/// ```
/// use canto::compile;
///
/// let sections = compile("import math; x = 1;").unwrap();
/// assert_eq!(sections.imports, "import math;\n");
/// assert_eq!(sections.top_level, "declare(\"x\", \"int\", \"1\");\n");
/// ```
pub fn compile(source: &str) -> Result<CodeSections, CompileReport> {
    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(LexerError::UnterminatedString { line }) => {
            return Err(CompileReport {
                diagnostics: vec![Diagnostic {
                    line,
                    message: "unterminated string literal".to_string(),
                }],
            });
        }
    };

    let mut ctx = ParseContext::new();
    let program = parse_program(&tokens, &mut ctx);
    if ctx.error_count() > 0 {
        return Err(CompileReport {
            diagnostics: ctx.into_diagnostics(),
        });
    }

    Ok(lower_program(&program))
}
