//! Canto lexer - tokenization for the Canto language.
//!
//! This crate converts Canto source text into a sequence of classified
//! lexemes with line numbers, for the statement segmenter and parser.
//!
//! # Example
//!
//! ```
//! use canto_lexer::{tokenize, TokenKind};
//!
//! let tokens = tokenize("x = 42;").unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::Ident);
//! assert_eq!(tokens[0].lexeme, "x");
//! ```

pub mod lexer;
pub mod token;

pub use lexer::{tokenize, Lexer, LexerError};
pub use token::{is_keyword, Token, TokenKind, KEYWORDS};
