//! Scoped variable frames and the runtime calling convention.
//!
//! Generated code drives variables through three primitives: `declare`
//! allocates a cell in the innermost frame, `assign` resolves a name
//! outward and replaces its value, `print` evaluates and displays. Frames
//! are pushed on entry to a block, function, or loop body and popped on
//! exit; popping a frame releases every heap-backed cell it owns.

use std::collections::HashMap;

use crate::cell::{Cell, Heap};
use crate::error::RuntimeError;
use crate::eval::{evaluate, EvalValue};

/// One lexical scope's live variables.
#[derive(Debug, Default)]
pub struct Frame {
    vars: HashMap<String, Cell>,
}

impl Frame {
    fn new() -> Self {
        Self::default()
    }
}

/// The frame stack plus the heap the frames' cells point into.
#[derive(Debug)]
pub struct Runtime {
    frames: Vec<Frame>,
    heap: Heap,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// Create a runtime with a single (global) frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new()],
            heap: Heap::new(),
        }
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Number of live frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Enter a new scope.
    pub fn push_frame(&mut self) {
        self.frames.push(Frame::new());
    }

    /// Leave the current scope, releasing every heap-backed cell it owns.
    pub fn pop_frame(&mut self) -> Result<(), RuntimeError> {
        let frame = self.frames.pop().ok_or(RuntimeError::FrameStackEmpty)?;
        for cell in frame.vars.values() {
            if let Some(id) = cell.heap_id() {
                self.heap.release(id)?;
            }
        }
        Ok(())
    }

    /// Resolve a name, searching the innermost frame first, then outward.
    pub fn lookup(&self, name: &str) -> Option<&Cell> {
        self.frames.iter().rev().find_map(|f| f.vars.get(name))
    }

    /// Declare a new variable in the innermost frame.
    ///
    /// The expression text is evaluated here, against the current frame
    /// stack — the generator hands it over unevaluated. The type tag
    /// travels with the declaration for tooling; the stored cell is tagged
    /// by its evaluated value.
    pub fn declare(
        &mut self,
        name: &str,
        _type_tag: &str,
        expr_text: &str,
    ) -> Result<(), RuntimeError> {
        let innermost = self.frames.last().ok_or(RuntimeError::FrameStackEmpty)?;
        if innermost.vars.contains_key(name) {
            return Err(RuntimeError::NameAlreadyDeclaredInFrame {
                name: name.to_string(),
            });
        }

        let value = evaluate(self, expr_text)?;
        let cell = self.store(value)?;
        self.frames
            .last_mut()
            .ok_or(RuntimeError::FrameStackEmpty)?
            .vars
            .insert(name.to_string(), cell);
        Ok(())
    }

    /// Replace the value of an already-declared variable, resolving the
    /// name outward through enclosing frames.
    pub fn assign(&mut self, name: &str, expr_text: &str) -> Result<(), RuntimeError> {
        let frame_idx = self
            .frames
            .iter()
            .rposition(|f| f.vars.contains_key(name))
            .ok_or_else(|| RuntimeError::UndeclaredName {
                name: name.to_string(),
            })?;

        // Retain the new value before releasing the old one, so
        // self-assignment of a heap value never drops it to zero.
        let value = evaluate(self, expr_text)?;
        let new_cell = self.store(value)?;
        let old = self.frames[frame_idx]
            .vars
            .insert(name.to_string(), new_cell);
        if let Some(id) = old.and_then(|c| c.heap_id()) {
            self.heap.release(id)?;
        }
        Ok(())
    }

    /// Evaluate expression text and return its display form.
    pub fn display(&self, expr_text: &str) -> Result<String, RuntimeError> {
        let value = evaluate(self, expr_text)?;
        Ok(match value {
            EvalValue::Int(n) => n.to_string(),
            EvalValue::Float(n) => n.to_string(),
            EvalValue::NewStr(s) => s,
            EvalValue::SharedStr(id) => self.heap.get(id)?.to_string(),
        })
    }

    /// Evaluate expression text and write its display form to stdout.
    pub fn print(&self, expr_text: &str) -> Result<(), RuntimeError> {
        println!("{}", self.display(expr_text)?);
        Ok(())
    }

    /// Turn an evaluated value into a stored cell, retaining shared heap
    /// slots and allocating fresh ones for new strings.
    fn store(&mut self, value: EvalValue) -> Result<Cell, RuntimeError> {
        Ok(match value {
            EvalValue::Int(n) => Cell::Int(n),
            EvalValue::Float(n) => Cell::Float(n),
            EvalValue::NewStr(s) => Cell::Str(self.heap.alloc(s)),
            EvalValue::SharedStr(id) => {
                self.heap.retain(id)?;
                Cell::Str(id)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_lookup() {
        let mut rt = Runtime::new();
        rt.declare("x", "int", "5").unwrap();
        assert_eq!(rt.lookup("x"), Some(&Cell::Int(5)));
        assert_eq!(rt.display("x + 1").unwrap(), "6");
    }

    #[test]
    fn test_redeclare_in_same_frame_fails() {
        let mut rt = Runtime::new();
        rt.declare("x", "int", "1").unwrap();
        assert_eq!(
            rt.declare("x", "int", "2"),
            Err(RuntimeError::NameAlreadyDeclaredInFrame {
                name: "x".to_string()
            })
        );
    }

    #[test]
    fn test_shadowing_in_inner_frame_allowed() {
        let mut rt = Runtime::new();
        rt.declare("x", "int", "1").unwrap();
        rt.push_frame();
        rt.declare("x", "int", "2").unwrap();
        assert_eq!(rt.lookup("x"), Some(&Cell::Int(2)));
        rt.pop_frame().unwrap();
        assert_eq!(rt.lookup("x"), Some(&Cell::Int(1)));
    }

    #[test]
    fn test_assign_resolves_outward() {
        let mut rt = Runtime::new();
        rt.declare("x", "int", "1").unwrap();
        rt.push_frame();
        rt.assign("x", "x + 9").unwrap();
        rt.pop_frame().unwrap();
        assert_eq!(rt.lookup("x"), Some(&Cell::Int(10)));
    }

    #[test]
    fn test_assign_undeclared_fails() {
        let mut rt = Runtime::new();
        assert_eq!(
            rt.assign("ghost", "1"),
            Err(RuntimeError::UndeclaredName {
                name: "ghost".to_string()
            })
        );
    }

    #[test]
    fn test_frame_pop_releases_strings() {
        let mut rt = Runtime::new();
        rt.push_frame();
        rt.declare("s", "str", "\"temp\"").unwrap();
        let id = rt.lookup("s").unwrap().heap_id().unwrap();
        assert_eq!(rt.heap().ref_count(id), Some(1));
        rt.pop_frame().unwrap();
        assert!(!rt.heap().is_live(id));
        assert_eq!(rt.heap().freed_count(), 1);
    }

    #[test]
    fn test_reference_count_round_trip() {
        // Second name on a shared heap value -> count 2; pop the frame
        // holding the second name -> 1; pop the frame holding the first
        // -> 0, released exactly once and never earlier.
        let mut rt = Runtime::new();
        rt.push_frame();
        rt.declare("a", "str", "\"shared\"").unwrap();
        let id = rt.lookup("a").unwrap().heap_id().unwrap();
        assert_eq!(rt.heap().ref_count(id), Some(1));

        rt.push_frame();
        rt.declare("b", "str", "a").unwrap();
        assert_eq!(rt.heap().ref_count(id), Some(2));
        assert_eq!(rt.lookup("b").unwrap().heap_id(), Some(id));

        rt.pop_frame().unwrap();
        assert_eq!(rt.heap().ref_count(id), Some(1));
        assert!(rt.heap().is_live(id));
        assert_eq!(rt.heap().freed_count(), 0);

        rt.pop_frame().unwrap();
        assert!(!rt.heap().is_live(id));
        assert_eq!(rt.heap().freed_count(), 1);
    }

    #[test]
    fn test_self_assignment_keeps_heap_value() {
        let mut rt = Runtime::new();
        rt.declare("s", "str", "\"keep\"").unwrap();
        let id = rt.lookup("s").unwrap().heap_id().unwrap();
        rt.assign("s", "s").unwrap();
        assert_eq!(rt.heap().ref_count(id), Some(1));
        assert_eq!(rt.display("s").unwrap(), "keep");
    }

    #[test]
    fn test_assign_replaces_heap_value() {
        let mut rt = Runtime::new();
        rt.declare("s", "str", "\"old\"").unwrap();
        let old_id = rt.lookup("s").unwrap().heap_id().unwrap();
        rt.assign("s", "\"new\"").unwrap();
        assert!(!rt.heap().is_live(old_id) || old_id == rt.lookup("s").unwrap().heap_id().unwrap());
        assert_eq!(rt.display("s").unwrap(), "new");
    }

    #[test]
    fn test_concat_allocates_new_string() {
        let mut rt = Runtime::new();
        rt.declare("a", "str", "\"foo\"").unwrap();
        rt.declare("b", "str", "a + \"bar\"").unwrap();
        let a_id = rt.lookup("a").unwrap().heap_id().unwrap();
        let b_id = rt.lookup("b").unwrap().heap_id().unwrap();
        assert_ne!(a_id, b_id);
        assert_eq!(rt.heap().ref_count(a_id), Some(1));
        assert_eq!(rt.display("b").unwrap(), "foobar");
    }

    #[test]
    fn test_pop_empty_stack_fails() {
        let mut rt = Runtime::new();
        rt.pop_frame().unwrap();
        assert_eq!(rt.pop_frame(), Err(RuntimeError::FrameStackEmpty));
    }
}
