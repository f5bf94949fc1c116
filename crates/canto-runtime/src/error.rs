//! Runtime error types.

use thiserror::Error;

/// Errors raised by the runtime primitives that generated code calls.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("name `{name}` already declared in this frame")]
    NameAlreadyDeclaredInFrame { name: String },

    #[error("undeclared name `{name}`")]
    UndeclaredName { name: String },

    #[error("heap slot {id} already freed")]
    HeapSlotFreed { id: usize },

    #[error("empty expression")]
    EmptyExpression,

    #[error("unexpected token `{lexeme}` in expression")]
    UnexpectedToken { lexeme: String },

    #[error("invalid number literal `{0}`")]
    InvalidNumber(String),

    #[error("cannot apply `{op}` to {lhs} and {rhs}")]
    TypeMismatch {
        op: String,
        lhs: &'static str,
        rhs: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in `{op}`")]
    IntegerOverflow { op: String },

    #[error("frame stack is empty")]
    FrameStackEmpty,

    #[error("lexical error in expression: {0}")]
    Lexical(#[from] canto_lexer::LexerError),
}
