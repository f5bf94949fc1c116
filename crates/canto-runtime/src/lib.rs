//! Runtime value and memory model for generated Canto programs.
//!
//! Generated code calls into this crate to declare and assign variables,
//! evaluate serialized expression text, and print values. Values are
//! tagged cells; strings live on a reference-counted heap; variables live
//! in a stack of lexical frames.

mod cell;
mod error;
mod eval;
mod frame;

pub use cell::{Cell, Heap, HeapId};
pub use error::RuntimeError;
pub use eval::{evaluate, EvalValue};
pub use frame::{Frame, Runtime};
