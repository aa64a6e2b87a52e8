//! Operand stack
//!
//! Adapters communicate with the VM exclusively through this stack: pop
//! arguments in reverse push order, push results on top. Every typed pop
//! returns `Result`: a wrong depth or value type is a reported error, not
//! undefined behavior.

use crate::handle::{Handle, HandleKind};
use crate::value::{NumberCell, RuntimeError, Value};
use std::sync::Arc;

/// Typed LIFO value stack.
#[derive(Default)]
pub struct OperandStack {
    values: Vec<Value>,
}

impl OperandStack {
    pub fn new() -> Self {
        Self {
            values: Vec::with_capacity(64),
        }
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    pub fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.values.pop().ok_or(RuntimeError::StackUnderflow)
    }

    pub fn pop_number(&mut self) -> Result<f64, RuntimeError> {
        match self.pop()? {
            Value::Number(n) => Ok(n),
            other => Err(RuntimeError::TypeError {
                expected: "number",
                got: other.type_name(),
            }),
        }
    }

    pub fn pop_string(&mut self) -> Result<Arc<String>, RuntimeError> {
        match self.pop()? {
            Value::String(s) => Ok(s),
            other => Err(RuntimeError::TypeError {
                expected: "string",
                got: other.type_name(),
            }),
        }
    }

    pub fn pop_ref(&mut self) -> Result<NumberCell, RuntimeError> {
        match self.pop()? {
            Value::Ref(cell) => Ok(cell),
            other => Err(RuntimeError::TypeError {
                expected: "ref",
                got: other.type_name(),
            }),
        }
    }

    /// Pop a native handle and check its kind tag at the boundary.
    pub fn pop_handle(&mut self, expected: HandleKind) -> Result<Handle, RuntimeError> {
        match self.pop()? {
            Value::Handle(h) => {
                // raw_as performs the kind and liveness checks.
                h.raw_as(expected)?;
                Ok(h)
            }
            other => Err(RuntimeError::TypeError {
                expected: "handle",
                got: other.type_name(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
