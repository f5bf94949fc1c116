//! Canto parser - statement segmentation, parsing, and the AST model.
//!
//! This crate turns a token stream into an abstract syntax tree. The
//! segmenter splits tokens into statement-sized groups on structural
//! delimiters; the parser classifies each group by keyword and shape and
//! builds the matching AST node, recursively parsing nested blocks.
//!
//! # Example
//!
//! ```
//! use canto_lexer::tokenize;
//! use canto_parser::{parse_program, ParseContext};
//!
//! let tokens = tokenize("x = 5; x = x + 1;").unwrap();
//! let mut ctx = ParseContext::new();
//! let program = parse_program(&tokens, &mut ctx);
//! assert_eq!(ctx.error_count(), 0);
//! assert_eq!(program.len(), 2);
//! ```

pub mod ast;
pub mod context;
pub mod parser;
pub mod segment;

pub use ast::{Block, Expr, Stmt};
pub use context::{DelimiterKind, Diagnostic, ParseContext};
pub use parser::{parse_expr_tokens, parse_program, parse_statement};
pub use segment::segment;
