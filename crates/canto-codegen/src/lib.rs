//! Canto code generator - AST lowering to target source text.
//!
//! This crate lowers a parsed Canto program into three ordered text
//! sections (imports, function definitions, top-level statements) whose
//! variable operations call into the Canto runtime's declare/assign
//! primitives.

pub mod codegen;

pub use codegen::{lower_block, lower_expr, lower_program, lower_stmt, CodeSections};
